//! Payload encodings understood by the remote account api.

use crate::*;
use base64::prelude::*;

/// Encoding of the account data payload on the wire.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub enum Encoding {
    /// Base58 text. Byte oriented and slow; the remote api refuses it
    /// for larger accounts.
    #[serde(rename = "base58")]
    Base58,

    /// Standard alphabet base64 text.
    #[serde(rename = "base64")]
    Base64,

    /// A zstd frame, rendered as standard alphabet base64 text.
    #[serde(rename = "base64+zstd")]
    Base64Zstd,
}

impl std::fmt::Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Base58 => "base58",
            Self::Base64 => "base64",
            Self::Base64Zstd => "base64+zstd",
        })
    }
}

impl Encoding {
    /// True for the weak encoding, which should not be picked on a
    /// caller's behalf when anything else is available.
    pub fn is_weak(&self) -> bool {
        matches!(self, Self::Base58)
    }

    /// Decode payload text into raw account bytes.
    pub fn decode(&self, data: &str) -> LoaderResult<Vec<u8>> {
        match self {
            Self::Base58 => bs58::decode(data)
                .into_vec()
                .map_err(|e| LoaderError::codec_src("decode base58", e)),
            Self::Base64 => BASE64_STANDARD
                .decode(data)
                .map_err(|e| LoaderError::codec_src("decode base64", e)),
            Self::Base64Zstd => {
                let frame = BASE64_STANDARD.decode(data).map_err(|e| {
                    LoaderError::codec_src("decode base64+zstd", e)
                })?;
                zstd::stream::decode_all(frame.as_slice()).map_err(|e| {
                    LoaderError::codec_src("decompress base64+zstd", e)
                })
            }
        }
    }

    /// Encode raw account bytes into payload text.
    pub fn encode(&self, data: &[u8]) -> LoaderResult<String> {
        match self {
            Self::Base58 => Ok(bs58::encode(data).into_string()),
            Self::Base64 => Ok(BASE64_STANDARD.encode(data)),
            Self::Base64Zstd => {
                let frame = zstd::stream::encode_all(data, 0).map_err(|e| {
                    LoaderError::codec_src("compress base64+zstd", e)
                })?;
                Ok(BASE64_STANDARD.encode(frame))
            }
        }
    }
}
