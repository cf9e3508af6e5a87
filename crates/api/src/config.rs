//! Types for use when configuring account loader modules.

use crate::*;

/// helper transcode function
fn tc<S: serde::Serialize, D: serde::de::DeserializeOwned>(
    s: &S,
) -> LoaderResult<D> {
    serde_json::from_str(
        &serde_json::to_string(s)
            .map_err(|e| LoaderError::other_src("encode", e))?,
    )
    .map_err(|e| LoaderError::other_src("decode", e))
}

/// Denotes a type used to configure a specific module.
///
/// A module config is a struct with a single camelCase field named after
/// the module, so that all module configs can live side by side in one
/// [Config] object. The serialization should be tolerant to missing
/// properties (`#[serde(default)]`), setting sane defaults, as the config
/// may be loaded from disk and edited by humans.
pub trait ModConfig:
    'static
    + Sized
    + Default
    + std::fmt::Debug
    + serde::Serialize
    + serde::de::DeserializeOwned
    + Send
    + Sync
{
}

impl<M> ModConfig for M where
    M: 'static
        + Sized
        + Default
        + std::fmt::Debug
        + serde::Serialize
        + serde::de::DeserializeOwned
        + Send
        + Sync
{
}

/// Loader configuration.
#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct Config(serde_json::Map<String, serde_json::Value>);

impl Config {
    /// Parse a config from json text, e.g. the content of a config file.
    pub fn from_json(json: &str) -> LoaderResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| LoaderError::other_src("parse config", e))
    }

    /// Write the properties of a module config into this config,
    /// overwriting any previous values for that module.
    ///
    /// Module factories call this from `default_config` to publish their
    /// defaults.
    pub fn set_module_config<M: ModConfig>(
        &mut self,
        module_config: &M,
    ) -> LoaderResult<()> {
        let serde_json::Value::Object(props) =
            tc::<M, serde_json::Value>(module_config)?
        else {
            return Err(LoaderError::other(format!(
                "module config must serialize to an object: {module_config:?}"
            )));
        };
        self.0.extend(props);
        Ok(())
    }

    /// Extract a module config. Properties missing from this config take
    /// the module's defaults, and properties of other modules are ignored.
    pub fn get_module_config<M: ModConfig>(&self) -> LoaderResult<M> {
        tc(&self.0)
    }
}
