#![deny(missing_docs)]
//! Request coalescing and batching for remote account lookups.
//!
//! See [factories::core_loader] for how a window of lookups is turned
//! into gateway calls.

use account_loader_api::*;

/// Construct a production-ready default builder on top of a gateway.
///
/// - `loader` - The default loader module is [factories::CoreLoaderFactory].
pub fn default_builder(gateway: DynGatewayFactory) -> Builder {
    Builder {
        config: Config::default(),
        gateway,
        loader: factories::CoreLoaderFactory::create(),
    }
}

/// Construct a default builder for testing.
///
/// - `gateway` - The default gateway is [factories::MemGatewayFactory].
pub fn default_test_builder() -> Builder {
    default_builder(factories::MemGatewayFactory::create())
}

pub mod factories;
