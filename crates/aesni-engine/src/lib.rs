//! Hardware AES engine built on the x86 AES-NI round instructions.
//!
//! This crate provides:
//! - A block core that runs one 128-bit block through `AESENC`/`AESDEC`
//!   rounds for 128, 192 and 256-bit keys.
//! - ECB, CBC, CTR and XTS drivers over caller-owned buffers, in place or
//!   between two buffers ([`InOut`]).
//! - An [`AesNi`] capability token; every operation is a method on it.
//!
//! Key expansion lives in [`aes_core`]. The drivers never allocate, keep no
//! state between calls and have no failure modes once their arguments exist.
//!
//! ```no_run
//! use aes_core::AesKeySchedule;
//! use aesni_engine::AesNi;
//!
//! let ni = AesNi::detect().expect("AES-NI");
//! let key = AesKeySchedule::new(&[0u8; 16]).unwrap();
//! let mut data = *b"sixteen byte msg and some more!!";
//! ni.apply_ctr(&key, &[0u8; 16], &mut data);
//! ```

#![deny(missing_docs)]

#[cfg(aesni_eligible)]
mod block;
#[cfg(aesni_eligible)]
mod cbc;
pub mod ctr;
#[cfg(aesni_eligible)]
mod ecb;
#[cfg(aesni_eligible)]
mod engine;
mod error;
mod inout;
pub mod kat;
pub mod xts;

pub use aes_core::{AesKeySchedule, Block, KeySize, BLOCK_SIZE};

#[cfg(aesni_eligible)]
pub use crate::engine::AesNi;
pub use crate::error::EngineError;
pub use crate::inout::{as_blocks, as_blocks_mut, InOut};

/// Token for tests; `None` skips hardware-dependent tests on CPUs without AES-NI.
#[cfg(all(test, aesni_eligible))]
pub(crate) fn test_engine() -> Option<AesNi> {
    AesNi::detect().ok()
}
