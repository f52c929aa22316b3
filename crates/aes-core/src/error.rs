//! Errors raised while preparing key material.

/// Failure to build a key schedule from raw key bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    /// The raw key is not 16, 24 or 32 bytes long.
    #[error("invalid AES key length: {0} bytes (expected 16, 24 or 32)")]
    InvalidLength(usize),
}
