//! Builder-related types.

use crate::*;
use std::sync::Arc;

/// The account loader builder.
/// This contains both configuration and factory instances,
/// allowing construction of runtime module instances.
#[derive(Debug)]
pub struct Builder {
    /// The module configuration to be used when building modules.
    /// This can be loaded from disk or modified before building.
    pub config: Config,

    /// The [GatewayFactory] to be used for creating the
    /// [Gateway] instance.
    pub gateway: DynGatewayFactory,

    /// The [LoaderFactory] to be used for creating the
    /// [Loader] instance.
    pub loader: DynLoaderFactory,
}

impl Builder {
    /// Construct a default config given the configured module factories.
    pub fn set_default_config(&mut self) -> LoaderResult<()> {
        let Self {
            config,
            gateway,
            loader,
        } = self;

        gateway.default_config(config)?;
        loader.default_config(config)?;

        Ok(())
    }

    /// Same as [Builder::set_default_config], in builder style.
    pub fn with_default_config(mut self) -> LoaderResult<Self> {
        self.set_default_config()?;
        Ok(self)
    }

    /// Generate a loader instance backed by a freshly created gateway.
    pub async fn build(self) -> LoaderResult<DynLoader> {
        let builder = Arc::new(self);
        let gateway = builder.gateway.create(builder.clone()).await?;
        builder.loader.create(builder.clone(), gateway).await
    }
}
