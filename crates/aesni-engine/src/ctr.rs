//! CTR: keystream from an incrementing 128-bit counter.
//!
//! The counter block travels big-endian on the wire and is incremented as
//! one 128-bit integer, wrapping at 2^128. Encryption and decryption are the
//! same operation.

use aes_core::Block;
#[cfg(aesni_eligible)]
use aes_core::{RoundKeys, BLOCK_SIZE};

#[cfg(aesni_eligible)]
use crate::block::{load, to_block, Rounds};
#[cfg(aesni_eligible)]
use crate::inout::InOut;

#[cfg(all(aesni_eligible, target_arch = "x86"))]
use core::arch::x86::_mm_xor_si128;
#[cfg(all(aesni_eligible, target_arch = "x86_64"))]
use core::arch::x86_64::_mm_xor_si128;

/// Wire counter block to integer.
#[inline]
pub fn counter_from_block(block: &Block) -> u128 {
    u128::from_be_bytes(*block)
}

/// Integer to wire counter block.
#[inline]
pub fn counter_to_block(counter: u128) -> Block {
    counter.to_be_bytes()
}

/// Counter block used for block index `blocks` of a stream seeded with `iv`.
pub fn offset_counter(iv: &Block, blocks: u128) -> Block {
    counter_to_block(counter_from_block(iv).wrapping_add(blocks))
}

#[cfg(aesni_eligible)]
#[target_feature(enable = "aes")]
pub(crate) unsafe fn apply<const NR: usize>(schedule: &RoundKeys, iv: &Block, mut buf: InOut<'_, u8>) {
    let rounds = Rounds::<NR>::new(schedule);
    let mut counter = counter_from_block(iv);
    let full_blocks = buf.len() / BLOCK_SIZE;
    let tail = buf.len() % BLOCK_SIZE;

    let mut chunk = [0u8; BLOCK_SIZE];
    for i in 0..full_blocks {
        let offset = i * BLOCK_SIZE;
        buf.read_into(offset, &mut chunk);
        let keystream = rounds.encrypt(load(&counter_to_block(counter)));
        chunk = to_block(_mm_xor_si128(load(&chunk), keystream));
        buf.write_from(offset, &chunk);
        counter = counter.wrapping_add(1);
    }

    if tail != 0 {
        let offset = full_blocks * BLOCK_SIZE;
        let mut padded = [0u8; BLOCK_SIZE];
        buf.read_into(offset, &mut padded[..tail]);
        let keystream = rounds.encrypt(load(&counter_to_block(counter)));
        padded = to_block(_mm_xor_si128(load(&padded), keystream));
        buf.write_from(offset, &padded[..tail]);
    }
}


#[cfg(all(test, aesni_eligible))]
mod engine_tests {
    use aes_core::{AesKeySchedule, Block};
    use rand::{Rng, RngCore, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    use super::offset_counter;
    use crate::kat::{block, CTR_VECTORS};
    use crate::{test_engine, InOut};

    #[test]
    fn sp800_38a_vectors() {
        let Some(ni) = test_engine() else { return };
        for vector in CTR_VECTORS {
            let key = AesKeySchedule::new(&hex::decode(vector.key).unwrap()).unwrap();
            let iv = block(vector.iv).unwrap();
            let plain = hex::decode(vector.plain).unwrap();
            let cipher = hex::decode(vector.cipher).unwrap();

            let mut out = vec![0u8; plain.len()];
            ni.apply_ctr(&key, &iv, InOut::split(&plain, &mut out).unwrap());
            assert_eq!(out, cipher);

            ni.apply_ctr(&key, &iv, &mut out[..]);
            assert_eq!(out, plain);
        }
    }

    #[test]
    fn deterministic_and_keystream_reuse_xor() {
        let Some(ni) = test_engine() else { return };
        let mut rng = ChaCha20Rng::seed_from_u64(41);
        let key = AesKeySchedule::new(&[0x24; 32]).unwrap();
        let iv: Block = rng.gen();
        let mut p1 = vec![0u8; 77];
        let mut p2 = vec![0u8; 77];
        rng.fill_bytes(&mut p1);
        rng.fill_bytes(&mut p2);

        let mut c1 = p1.clone();
        let mut c1_again = p1.clone();
        let mut c2 = p2.clone();
        ni.apply_ctr(&key, &iv, &mut c1[..]);
        ni.apply_ctr(&key, &iv, &mut c1_again[..]);
        ni.apply_ctr(&key, &iv, &mut c2[..]);

        assert_eq!(c1, c1_again);
        let ct_xor: Vec<u8> = c1.iter().zip(&c2).map(|(a, b)| a ^ b).collect();
        let pt_xor: Vec<u8> = p1.iter().zip(&p2).map(|(a, b)| a ^ b).collect();
        assert_eq!(ct_xor, pt_xor);
    }

    #[test]
    fn partial_block_uses_keystream_prefix_only() {
        let Some(ni) = test_engine() else { return };
        let key = AesKeySchedule::new(&[0x11; 16]).unwrap();
        let iv = [0x5c; 16];
        let k0 = ni.encrypt_block(&key, &iv);
        for n in 1..16 {
            let input: Vec<u8> = (0..n as u8).map(|b| b.wrapping_mul(37)).collect();
            let mut output = [0xeeu8; 16];
            ni.apply_ctr(&key, &iv, InOut::split(&input, &mut output[..n]).unwrap());
            for i in 0..n {
                assert_eq!(output[i], input[i] ^ k0[i]);
            }
            assert!(output[n..].iter().all(|&b| b == 0xee), "wrote past {n}");
        }
    }

    #[test]
    fn tail_after_full_blocks_uses_next_counter() {
        let Some(ni) = test_engine() else { return };
        let key = AesKeySchedule::new(&[0x33; 24]).unwrap();
        let iv = [0xa0; 16];
        let mut data = vec![0u8; 2 * 16 + 5];
        ni.apply_ctr(&key, &iv, &mut data[..]);

        assert_eq!(data[..16], ni.encrypt_block(&key, &iv));
        assert_eq!(data[16..32], ni.encrypt_block(&key, &offset_counter(&iv, 1)));
        assert_eq!(data[32..], ni.encrypt_block(&key, &offset_counter(&iv, 2))[..5]);
    }

    #[test]
    fn counter_carry_crosses_64_bits() {
        let Some(ni) = test_engine() else { return };
        let key = AesKeySchedule::new(&[0x01; 16]).unwrap();
        let mut iv = [0u8; 16];
        iv[8..].fill(0xff);
        let mut next = [0u8; 16];
        next[7] = 1;

        let mut data = [0u8; 32];
        ni.apply_ctr(&key, &iv, &mut data);
        assert_eq!(data[16..], ni.encrypt_block(&key, &next));
    }

    #[test]
    fn counter_wraps_to_zero() {
        let Some(ni) = test_engine() else { return };
        let key = AesKeySchedule::new(&[0x02; 32]).unwrap();
        let mut data = [0u8; 32];
        ni.apply_ctr(&key, &[0xff; 16], &mut data);
        assert_eq!(data[..16], ni.encrypt_block(&key, &[0xff; 16]));
        assert_eq!(data[16..], ni.encrypt_block(&key, &[0u8; 16]));
    }

    #[test]
    fn zero_length_input() {
        let Some(ni) = test_engine() else { return };
        let key = AesKeySchedule::new(&[0u8; 16]).unwrap();
        let mut empty: [u8; 0] = [];
        ni.apply_ctr(&key, &[0u8; 16], &mut empty);
    }

    #[test]
    fn blocks_can_be_processed_out_of_order() {
        let Some(ni) = test_engine() else { return };
        let mut rng = ChaCha20Rng::seed_from_u64(42);
        let key = AesKeySchedule::new(&[0x77; 16]).unwrap();
        let iv: Block = rng.gen();
        let mut plain = vec![0u8; 16 * 6];
        rng.fill_bytes(&mut plain);

        let mut whole = plain.clone();
        ni.apply_ctr(&key, &iv, &mut whole[..]);

        let mut pieces = plain.clone();
        for (i, chunk) in pieces.chunks_mut(16).enumerate().rev() {
            ni.apply_ctr(&key, &offset_counter(&iv, i as u128), chunk);
        }
        assert_eq!(pieces, whole);
    }

    #[test]
    fn round_trip_random_lengths() {
        let Some(ni) = test_engine() else { return };
        let mut rng = ChaCha20Rng::seed_from_u64(43);
        for key_len in [16, 24, 32] {
            let mut raw = vec![0u8; key_len];
            rng.fill_bytes(&mut raw);
            let key = AesKeySchedule::new(&raw).unwrap();
            for len in [0usize, 1, 15, 16, 17, 31, 32, 100] {
                let iv: Block = rng.gen();
                let mut data = vec![0u8; len];
                rng.fill_bytes(&mut data);
                let original = data.clone();
                ni.apply_ctr(&key, &iv, &mut data[..]);
                if len >= 16 {
                    assert_ne!(data, original);
                }
                ni.apply_ctr(&key, &iv, &mut data[..]);
                assert_eq!(data, original);
            }
        }
    }
}
