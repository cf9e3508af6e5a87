//! The remote fetch api the loader dispatches to.
//!
//! The gateway owns transport, codec and retry concerns. The loader only
//! decides which calls to make and maps their results back to callers.

use crate::*;
use std::sync::Arc;

/// Single-key and multi-key account retrieval.
#[cfg_attr(any(test, feature = "mockall"), mockall::automock)]
pub trait Gateway: 'static + Send + Sync + std::fmt::Debug {
    /// Fetch one account.
    fn fetch_one(
        &self,
        address: Address,
        params: FetchParams,
    ) -> BoxFut<'_, LoaderResult<AccountValue>>;

    /// Fetch several accounts in one call.
    ///
    /// The outer result fails if the call as a whole failed. Otherwise
    /// the returned list must line up with `addresses`, one entry per
    /// address, each of which may carry its own error.
    fn fetch_many(
        &self,
        addresses: Vec<Address>,
        params: FetchParams,
    ) -> BoxFut<'_, LoaderResult<Vec<LoaderResult<AccountValue>>>>;
}

/// Trait-object [Gateway].
pub type DynGateway = Arc<dyn Gateway>;

/// A factory for creating Gateway instances.
pub trait GatewayFactory: 'static + Send + Sync + std::fmt::Debug {
    /// Help the builder construct a default config from the chosen
    /// module factories.
    fn default_config(&self, config: &mut Config) -> LoaderResult<()>;

    /// Construct a gateway instance.
    fn create(
        &self,
        builder: Arc<Builder>,
    ) -> BoxFut<'static, LoaderResult<DynGateway>>;
}

/// Trait-object [GatewayFactory].
pub type DynGatewayFactory = Arc<dyn GatewayFactory>;
