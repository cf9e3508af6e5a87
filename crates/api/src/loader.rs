//! The account loader module.
//!
//! A loader buffers lookups for one scheduling window and, when the
//! window is closed with [Loader::flush], serves all of them with as few
//! gateway calls as it can.

use crate::*;
use std::sync::Arc;

/// Batching, coalescing account lookups.
pub trait Loader: 'static + Send + Sync + std::fmt::Debug {
    /// Submit one lookup for the current window.
    ///
    /// Never blocks and never fails at call time; errors are delivered
    /// through the returned handle. The handle settles only after the
    /// window is flushed, unless the request is rejected outright.
    fn load(&self, address: Address, params: FetchParams) -> DeferredHandle;

    /// Submit one lookup per address with shared parameters.
    /// Handles are returned in input order.
    fn load_many(
        &self,
        addresses: Vec<Address>,
        params: FetchParams,
    ) -> Vec<DeferredHandle> {
        addresses
            .into_iter()
            .map(|address| self.load(address, params))
            .collect()
    }

    /// Number of lookups buffered in the current window.
    fn pending_count(&self) -> usize;

    /// Close the current window.
    ///
    /// The buffered lookups are coalesced immediately, so anything
    /// submitted after this call belongs to the next window. The returned
    /// future performs the gateway calls and resolves once every lookup
    /// of the closed window has been settled.
    fn flush(&self) -> BoxFut<'static, ()>;
}

/// Trait-object [Loader].
pub type DynLoader = Arc<dyn Loader>;

/// A factory for creating Loader instances.
pub trait LoaderFactory: 'static + Send + Sync + std::fmt::Debug {
    /// Help the builder construct a default config from the chosen
    /// module factories.
    fn default_config(&self, config: &mut Config) -> LoaderResult<()>;

    /// Construct a loader instance on top of a gateway.
    fn create(
        &self,
        builder: Arc<Builder>,
        gateway: DynGateway,
    ) -> BoxFut<'static, LoaderResult<DynLoader>>;
}

/// Trait-object [LoaderFactory].
pub type DynLoaderFactory = Arc<dyn LoaderFactory>;
