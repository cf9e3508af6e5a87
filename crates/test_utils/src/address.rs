//! Test utilities associated with addresses.

use account_loader_api::Address;
use bytes::Bytes;

use crate::random_bytes;

/// Create a random address.
pub fn random_address() -> Address {
    Address(Bytes::from(random_bytes(32)))
}

/// Create a list of distinct random addresses.
pub fn random_address_list(count: usize) -> Vec<Address> {
    let mut out = Vec::with_capacity(count);
    while out.len() < count {
        let address = random_address();
        if !out.contains(&address) {
            out.push(address);
        }
    }
    out
}
