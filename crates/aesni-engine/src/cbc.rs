//! CBC: ciphertext feedback chaining.
//!
//! Encryption is strictly sequential. Decryption of block `i` only needs
//! ciphertext blocks `i - 1` and `i`, so callers may split it freely.

use aes_core::{Block, RoundKeys};

use crate::block::{load, to_block, Rounds};
use crate::inout::InOut;

#[cfg(target_arch = "x86")]
use core::arch::x86::_mm_xor_si128;
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::_mm_xor_si128;

#[target_feature(enable = "aes")]
pub(crate) unsafe fn encrypt<const NR: usize>(
    schedule: &RoundKeys,
    iv: &Block,
    mut buf: InOut<'_, Block>,
) {
    let rounds = Rounds::<NR>::new(schedule);
    let mut feedback = load(iv);
    for i in 0..buf.len() {
        let m = _mm_xor_si128(load(&buf.read(i)), feedback);
        feedback = rounds.encrypt(m);
        buf.write(i, to_block(feedback));
    }
}

#[target_feature(enable = "aes")]
pub(crate) unsafe fn decrypt<const NR: usize>(
    schedule: &RoundKeys,
    iv: &Block,
    mut buf: InOut<'_, Block>,
) {
    let rounds = Rounds::<NR>::new(schedule);
    let mut feedback = load(iv);
    for i in 0..buf.len() {
        // Captured before the output write, which may alias it.
        let c = load(&buf.read(i));
        let p = _mm_xor_si128(rounds.decrypt(c), feedback);
        buf.write(i, to_block(p));
        feedback = c;
    }
}
