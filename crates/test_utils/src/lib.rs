#![deny(missing_docs)]
//! Test utilities to be used for testing account loader modules.

pub mod address;

/// Enable tracing with the RUST_LOG environment variable.
///
/// This is intended to be used in tests, so it defaults to DEBUG level.
pub fn enable_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(tracing::Level::DEBUG.into())
                .from_env_lossy(),
        )
        .try_init();
}

/// Create random bytes of a specified length.
pub fn random_bytes(length: u16) -> Vec<u8> {
    use rand::Rng;

    let mut rng = rand::thread_rng();
    let mut bytes = vec![0; length as usize];
    rng.fill(&mut bytes[..]);
    bytes
}

/// Bytes counting up from 0, wrapping at 256. Handy for checking that a
/// slice landed at the right offset.
pub fn sequential_bytes(length: usize) -> Vec<u8> {
    (0..length).map(|i| (i % 256) as u8).collect()
}
