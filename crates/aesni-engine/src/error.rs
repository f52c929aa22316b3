//! Engine error type.

/// Errors surfaced while setting up an engine call.
///
/// The drivers themselves cannot fail once a token, a schedule and an
/// [`InOut`](crate::InOut) exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The CPU does not implement the AES-NI instructions.
    #[error("the CPU does not support the AES-NI instruction set")]
    Unsupported,
    /// A byte buffer handed to a block mode is not a whole number of blocks.
    #[error("buffer length {len} is not a multiple of the 16-byte block size")]
    NotBlockAligned {
        /// Offending length in bytes.
        len: usize,
    },
    /// Input and output buffers have different lengths.
    #[error("input and output lengths differ: {input} vs {output}")]
    LengthMismatch {
        /// Input length in elements.
        input: usize,
        /// Output length in elements.
        output: usize,
    },
    /// A built-in known-answer test produced the wrong output.
    #[error("known-answer test failed: {0}")]
    KatFailure(&'static str),
}
