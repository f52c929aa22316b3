//! XTS: tweaked codebook over whole blocks (no ciphertext stealing).
//!
//! The sector tweak is encrypted once under the tweak key, advanced to the
//! starting block by repeated doubling in GF(2^128), and then every data
//! block is processed as `E(P ^ T) ^ T` with `T` doubled after each block.

use aes_core::Block;
#[cfg(aesni_eligible)]
use aes_core::RoundKeys;

#[cfg(aesni_eligible)]
use crate::block::{load, to_block, Rounds};
#[cfg(aesni_eligible)]
use crate::inout::InOut;

#[cfg(all(aesni_eligible, target_arch = "x86"))]
use core::arch::x86::_mm_xor_si128;
#[cfg(all(aesni_eligible, target_arch = "x86_64"))]
use core::arch::x86_64::_mm_xor_si128;

/// Low byte of the reduction polynomial x^128 + x^7 + x^2 + x + 1.
const GF_128_FDBK: u8 = 0x87;

/// Multiplies a tweak by `x` in GF(2^128).
///
/// The tweak is a little-endian 128-bit integer: shift left by one bit and,
/// when the top bit falls off, fold `0x87` into the low byte.
#[inline]
pub fn double_tweak(tweak: &Block) -> Block {
    let t = u128::from_le_bytes(*tweak);
    let carry = (t >> 127) as u8;
    ((t << 1) ^ u128::from(GF_128_FDBK * carry)).to_le_bytes()
}

/// Doubles `tweak` `steps` times, giving the tweak of block `steps`.
pub fn advance_tweak(tweak: &Block, steps: u32) -> Block {
    (0..steps).fold(*tweak, |t, _| double_tweak(&t))
}

#[cfg(aesni_eligible)]
#[target_feature(enable = "aes")]
pub(crate) unsafe fn encrypt<const NR: usize>(
    data_key: &RoundKeys,
    start_tweak: &Block,
    mut buf: InOut<'_, Block>,
) {
    let rounds = Rounds::<NR>::new(data_key);
    let mut tweak = *start_tweak;
    for i in 0..buf.len() {
        let t = load(&tweak);
        let m = _mm_xor_si128(load(&buf.read(i)), t);
        buf.write(i, to_block(_mm_xor_si128(rounds.encrypt(m), t)));
        tweak = double_tweak(&tweak);
    }
}

#[cfg(aesni_eligible)]
#[target_feature(enable = "aes")]
pub(crate) unsafe fn decrypt<const NR: usize>(
    data_key: &RoundKeys,
    start_tweak: &Block,
    mut buf: InOut<'_, Block>,
) {
    let rounds = Rounds::<NR>::new(data_key);
    let mut tweak = *start_tweak;
    for i in 0..buf.len() {
        let t = load(&tweak);
        let c = _mm_xor_si128(load(&buf.read(i)), t);
        buf.write(i, to_block(_mm_xor_si128(rounds.decrypt(c), t)));
        tweak = double_tweak(&tweak);
    }
}
