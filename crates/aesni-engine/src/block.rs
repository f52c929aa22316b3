//! Block core: one 128-bit block through the AES-NI round instructions.
//!
//! A schedule is copied into registers once per driver call ([`Rounds::new`])
//! and then reused for every block of that call. `NR` is the round count of
//! the schedule's key-size class, so each class gets its own unrolled
//! instruction sequence.

#[cfg(target_arch = "x86")]
use core::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::*;

use aes_core::{Block, RoundKeys, MAX_ROUND_KEYS};

#[inline]
#[target_feature(enable = "sse2")]
pub(crate) unsafe fn load(block: &Block) -> __m128i {
    _mm_loadu_si128(block.as_ptr().cast())
}

#[inline]
#[target_feature(enable = "sse2")]
pub(crate) unsafe fn to_block(value: __m128i) -> Block {
    let mut out = [0u8; 16];
    _mm_storeu_si128(out.as_mut_ptr().cast(), value);
    out
}

/// Round keys of one direction, preloaded into registers.
#[derive(Clone, Copy)]
pub(crate) struct Rounds<const NR: usize> {
    keys: [__m128i; MAX_ROUND_KEYS],
}

impl<const NR: usize> Rounds<NR> {
    #[inline]
    #[target_feature(enable = "aes")]
    pub(crate) unsafe fn new(schedule: &RoundKeys) -> Self {
        debug_assert_eq!(schedule.rounds(), NR);
        let mut keys = [_mm_setzero_si128(); MAX_ROUND_KEYS];
        for (reg, round_key) in keys.iter_mut().zip(schedule.as_blocks()) {
            *reg = load(round_key);
        }
        Self { keys }
    }

    /// Whitening, `NR - 1` full rounds, one last round.
    #[inline]
    #[target_feature(enable = "aes")]
    pub(crate) unsafe fn encrypt(&self, block: __m128i) -> __m128i {
        let mut state = _mm_xor_si128(block, self.keys[0]);
        for key in &self.keys[1..NR] {
            state = _mm_aesenc_si128(state, *key);
        }
        _mm_aesenclast_si128(state, self.keys[NR])
    }

    /// Inverse rounds; requires an equivalent-inverse schedule.
    #[inline]
    #[target_feature(enable = "aes")]
    pub(crate) unsafe fn decrypt(&self, block: __m128i) -> __m128i {
        let mut state = _mm_xor_si128(block, self.keys[0]);
        for key in &self.keys[1..NR] {
            state = _mm_aesdec_si128(state, *key);
        }
        _mm_aesdeclast_si128(state, self.keys[NR])
    }
}

#[target_feature(enable = "aes")]
pub(crate) unsafe fn encrypt_block<const NR: usize>(schedule: &RoundKeys, block: &Block) -> Block {
    let rounds = Rounds::<NR>::new(schedule);
    to_block(rounds.encrypt(load(block)))
}

#[target_feature(enable = "aes")]
pub(crate) unsafe fn decrypt_block<const NR: usize>(schedule: &RoundKeys, block: &Block) -> Block {
    let rounds = Rounds::<NR>::new(schedule);
    to_block(rounds.decrypt(load(block)))
}

#[cfg(test)]
mod tests {
    use aes_core::{AesKeySchedule, KeySize};
    use rand::{RngCore, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    use crate::kat::{block, FIPS_197_BLOCKS, FIPS_197_PLAIN};
    use crate::test_engine;

    #[test]
    fn block_core_matches_fips_197() {
        let Some(ni) = test_engine() else { return };
        for vector in FIPS_197_BLOCKS {
            let key = AesKeySchedule::new(&hex::decode(vector.key).unwrap()).unwrap();
            let plain = block(FIPS_197_PLAIN).unwrap();
            let cipher = block(vector.cipher).unwrap();
            assert_eq!(ni.encrypt_block(&key, &plain), cipher, "{}", key.key_size());
            assert_eq!(ni.decrypt_block(&key, &cipher), plain, "{}", key.key_size());
        }
    }

    #[test]
    fn zero_key_zero_block_ecb() {
        let Some(ni) = test_engine() else { return };
        let key = AesKeySchedule::new(&[0u8; 16]).unwrap();
        let mut data = [[0u8; 16]];
        ni.encrypt_ecb(&key, &mut data);
        assert_eq!(data[0], block("66e94bd4ef8a2c3b884cfa59ca342b2e").unwrap());
    }

    #[test]
    fn matches_reference_cipher_for_every_key_size() {
        let Some(ni) = test_engine() else { return };
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        for size in [KeySize::Aes128, KeySize::Aes192, KeySize::Aes256] {
            for _ in 0..64 {
                let mut raw = vec![0u8; size.key_len()];
                let mut plain = [0u8; 16];
                rng.fill_bytes(&mut raw);
                rng.fill_bytes(&mut plain);
                let key = AesKeySchedule::new(&raw).unwrap();

                let cipher = ni.encrypt_block(&key, &plain);
                assert_eq!(cipher, aes_core::encrypt_block(&plain, &key));
                assert_eq!(ni.decrypt_block(&key, &cipher), plain);
            }
        }
    }
}
