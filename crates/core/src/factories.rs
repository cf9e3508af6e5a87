//! Factories for generating instances of account loader modules.

pub mod core_loader;
pub use core_loader::CoreLoaderFactory;

pub mod mem_gateway;
pub use mem_gateway::{MemAccount, MemGateway, MemGatewayFactory};
