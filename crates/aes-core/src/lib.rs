//! AES key material shared across the `aesni-rs` workspace.
//!
//! This crate provides:
//! - Key-size classes and FIPS-197 key expansion for 128, 192 and 256-bit keys.
//! - The equivalent-inverse schedule consumed by inverse-round instructions.
//! - A portable reference block cipher used to cross-check the hardware engine.
//!
//! The reference cipher uses lookup tables and is not side-channel hardened.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod block;
mod cipher;
mod error;
mod key;
mod round;
mod sbox;

pub use crate::block::{xor, xor_in_place, Block, BLOCK_SIZE};
pub use crate::cipher::{decrypt_block, encrypt_block, expand_key, invert_schedule};
pub use crate::error::KeyError;
pub use crate::key::{AesKeySchedule, Direction, KeySize, RoundKeys, MAX_ROUND_KEYS};
pub use crate::sbox::{inv_sbox, sbox};
