#![deny(missing_docs)]
//! Account loader API contains the loader and gateway module traits and
//! the basic types required to define the api of those traits.
//!
//! If you want a working loader, please see the account_loader_core crate.

/// Boxed future type.
pub type BoxFut<'a, T> =
    std::pin::Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

pub(crate) mod serde_bytes_base58 {
    pub fn serialize<S>(
        b: &bytes::Bytes,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&bs58::encode(b).into_string())
    }

    pub fn deserialize<'de, D, T: From<bytes::Bytes>>(
        deserializer: D,
    ) -> Result<T, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s: std::borrow::Cow<'de, str> =
            serde::Deserialize::deserialize(deserializer)?;
        bs58::decode(s.as_ref())
            .into_vec()
            .map(|v| bytes::Bytes::from(v).into())
            .map_err(serde::de::Error::custom)
    }
}

mod error;
pub use error::*;

mod address;
pub use address::*;

mod encoding;
pub use encoding::*;

mod account;
pub use account::*;

mod handle;
pub use handle::*;

pub mod config;
pub use config::Config;

pub mod builder;
pub use builder::Builder;

pub mod gateway;
pub use gateway::*;

pub mod loader;
pub use loader::*;
