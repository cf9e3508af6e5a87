//! Identity of remotely stored account records.

macro_rules! imp_deref {
    ($i:ty, $t:ty) => {
        impl std::ops::Deref for $i {
            type Target = $t;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }
    };
}

macro_rules! imp_from {
    ($a:ty, $b:ty, $i:ident => $e:expr) => {
        impl From<$b> for $a {
            fn from($i: $b) -> Self {
                $e
            }
        }
    };
}

/// The address of a remote account record.
///
/// This is the key every lookup is coalesced by. The loader treats the
/// bytes as opaque; they are only ever rendered as base58 text, which
/// is also the serialized form.
#[derive(
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct Address(
    #[serde(with = "crate::serde_bytes_base58")] pub bytes::Bytes,
);

imp_deref!(Address, bytes::Bytes);
imp_from!(Address, bytes::Bytes, b => Address(b));
imp_from!(Address, [u8; 32], b => Address(bytes::Bytes::copy_from_slice(&b)));

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&bs58::encode(&self.0).into_string())
    }
}

impl std::fmt::Debug for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

impl std::str::FromStr for Address {
    type Err = crate::LoaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        bs58::decode(s)
            .into_vec()
            .map(|v| Address(bytes::Bytes::from(v)))
            .map_err(|e| {
                crate::LoaderError::other_src(
                    format!("invalid address {s:?}"),
                    e,
                )
            })
    }
}
