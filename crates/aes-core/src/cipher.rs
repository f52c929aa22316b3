//! FIPS-197 key expansion, inverse-schedule derivation and a portable
//! reference block cipher.
//!
//! The reference cipher is slow and table-driven; it exists to cross-check
//! hardware implementations, not to be used on data paths.

use zeroize::Zeroize;

use crate::block::Block;
use crate::error::KeyError;
use crate::key::{AesKeySchedule, Direction, KeySize, RoundKeys, MAX_ROUND_KEYS};
use crate::round::{
    add_round_key, inv_mix_columns, inv_shift_rows, inv_sub_bytes, mix_columns, shift_rows,
    sub_bytes,
};
use crate::sbox::sbox;

const RCON: [u8; 10] = [0x01, 0x02, 0x04, 0x08, 0x10, 0x20, 0x40, 0x80, 0x1b, 0x36];

fn rot_word(word: u32) -> u32 {
    word.rotate_left(8)
}

fn sub_word(word: u32) -> u32 {
    let [b0, b1, b2, b3] = word.to_be_bytes();
    u32::from_be_bytes([sbox(b0), sbox(b1), sbox(b2), sbox(b3)])
}

/// Expands a 16, 24 or 32-byte key into its forward round-key schedule.
pub fn expand_key(key: &[u8]) -> Result<RoundKeys, KeyError> {
    let size = KeySize::from_key_len(key.len())?;
    let nk = size.key_len() / 4;
    let total = 4 * size.round_keys();

    let mut w = [0u32; 4 * MAX_ROUND_KEYS];
    for (word, chunk) in w.iter_mut().zip(key.chunks_exact(4)) {
        *word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }

    for i in nk..total {
        let mut temp = w[i - 1];
        if i % nk == 0 {
            temp = sub_word(rot_word(temp)) ^ (u32::from(RCON[i / nk - 1]) << 24);
        } else if nk > 6 && i % nk == 4 {
            temp = sub_word(temp);
        }
        w[i] = w[i - nk] ^ temp;
    }

    let mut keys = [[0u8; 16]; MAX_ROUND_KEYS];
    for (round_key, words) in keys.iter_mut().zip(w[..total].chunks_exact(4)) {
        for (dst, word) in round_key.chunks_exact_mut(4).zip(words) {
            dst.copy_from_slice(&word.to_be_bytes());
        }
    }
    w.zeroize();

    let schedule = RoundKeys::new(size, Direction::Encrypt, keys);
    keys.zeroize();
    Ok(schedule)
}

/// Derives the equivalent-inverse schedule from a forward schedule.
///
/// ```text
/// dec[0]  = enc[Nr]
/// dec[i]  = InvMixColumns(enc[Nr - i])   for 0 < i < Nr
/// dec[Nr] = enc[0]
/// ```
pub fn invert_schedule(enc: &RoundKeys) -> RoundKeys {
    debug_assert_eq!(enc.direction(), Direction::Encrypt);
    let nr = enc.rounds();
    let mut keys = [[0u8; 16]; MAX_ROUND_KEYS];

    keys[0] = *enc.get(nr);
    for (i, slot) in keys.iter_mut().enumerate().take(nr).skip(1) {
        *slot = *enc.get(nr - i);
        inv_mix_columns(slot);
    }
    keys[nr] = *enc.get(0);

    let schedule = RoundKeys::new(enc.key_size(), Direction::Decrypt, keys);
    keys.zeroize();
    schedule
}

/// Encrypts a single 16-byte block with the forward schedule.
pub fn encrypt_block(block: &Block, key: &AesKeySchedule) -> Block {
    let round_keys = key.encryption();
    let nr = round_keys.rounds();
    let mut state = *block;

    add_round_key(&mut state, round_keys.get(0));
    for round in 1..nr {
        sub_bytes(&mut state);
        shift_rows(&mut state);
        mix_columns(&mut state);
        add_round_key(&mut state, round_keys.get(round));
    }
    sub_bytes(&mut state);
    shift_rows(&mut state);
    add_round_key(&mut state, round_keys.get(nr));

    state
}

/// Decrypts a single 16-byte block with the equivalent-inverse schedule.
///
/// Uses the same round structure as the hardware inverse-round instruction,
/// so it also validates [`invert_schedule`].
pub fn decrypt_block(block: &Block, key: &AesKeySchedule) -> Block {
    let round_keys = key.decryption();
    let nr = round_keys.rounds();
    let mut state = *block;

    add_round_key(&mut state, round_keys.get(0));
    for round in 1..nr {
        inv_shift_rows(&mut state);
        inv_sub_bytes(&mut state);
        inv_mix_columns(&mut state);
        add_round_key(&mut state, round_keys.get(round));
    }
    inv_shift_rows(&mut state);
    inv_sub_bytes(&mut state);
    add_round_key(&mut state, round_keys.get(nr));

    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{RngCore, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    fn block(hex_str: &str) -> Block {
        hex::decode(hex_str).unwrap().try_into().unwrap()
    }

    fn schedule(hex_str: &str) -> AesKeySchedule {
        AesKeySchedule::new(&hex::decode(hex_str).unwrap()).unwrap()
    }

    const FIPS_PLAIN: &str = "00112233445566778899aabbccddeeff";

    // FIPS-197 Appendix C.
    const APPENDIX_C: [(&str, &str); 3] = [
        (
            "000102030405060708090a0b0c0d0e0f",
            "69c4e0d86a7b0430d8cdb78070b4c55a",
        ),
        (
            "000102030405060708090a0b0c0d0e0f1011121314151617",
            "dda97ca4864cdfe06eaf70a0ec0d7191",
        ),
        (
            "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f",
            "8ea2b7ca516745bfeafc49904b496089",
        ),
    ];

    #[test]
    fn encrypt_matches_fips_vectors() {
        for (key_hex, cipher_hex) in APPENDIX_C {
            let key = schedule(key_hex);
            assert_eq!(encrypt_block(&block(FIPS_PLAIN), &key), block(cipher_hex));
        }
    }

    #[test]
    fn decrypt_matches_fips_vectors() {
        for (key_hex, cipher_hex) in APPENDIX_C {
            let key = schedule(key_hex);
            assert_eq!(decrypt_block(&block(cipher_hex), &key), block(FIPS_PLAIN));
        }
    }

    #[test]
    fn zero_key_zero_block() {
        let key = AesKeySchedule::new(&[0u8; 16]).unwrap();
        assert_eq!(
            encrypt_block(&[0u8; 16], &key),
            block("66e94bd4ef8a2c3b884cfa59ca342b2e")
        );
    }

    // FIPS-197 Appendix A.1 and A.3: last round key.
    #[test]
    fn expansion_last_round_key() {
        let enc = expand_key(&hex::decode("2b7e151628aed2a6abf7158809cf4f3c").unwrap()).unwrap();
        assert_eq!(enc.rounds(), 10);
        assert_eq!(*enc.get(10), block("d014f9a8c9ee2589e13f0cc8b6630ca6"));

        let enc = expand_key(
            &hex::decode("603deb1015ca71be2b73aef0857d77811f352c073b6108d72d9810a30914dff4")
                .unwrap(),
        )
        .unwrap();
        assert_eq!(enc.rounds(), 14);
        assert_eq!(*enc.get(14), block("fe4890d1e6188d0b046df344706c631e"));
    }

    #[test]
    fn first_round_key_is_the_raw_key() {
        let raw = hex::decode("000102030405060708090a0b0c0d0e0f1011121314151617").unwrap();
        let enc = expand_key(&raw).unwrap();
        assert_eq!(&enc.get(0)[..], &raw[..16]);
        assert_eq!(&enc.get(1)[..8], &raw[16..]);
    }

    #[test]
    fn inverse_schedule_swaps_endpoints() {
        let key = schedule(APPENDIX_C[2].0);
        let (enc, dec) = (key.encryption(), key.decryption());
        assert_eq!(dec.get(0), enc.get(14));
        assert_eq!(dec.get(14), enc.get(0));
        assert_ne!(dec.get(1), enc.get(13));
        assert_eq!(dec.direction(), Direction::Decrypt);
    }

    #[test]
    fn encrypt_decrypt_round_trip_random() {
        let mut rng = ChaCha20Rng::seed_from_u64(0x5eed);
        for len in [16usize, 24, 32] {
            for _ in 0..50 {
                let mut key_bytes = vec![0u8; len];
                let mut block = [0u8; 16];
                rng.fill_bytes(&mut key_bytes);
                rng.fill_bytes(&mut block);
                let key = AesKeySchedule::new(&key_bytes).unwrap();
                let ct = encrypt_block(&block, &key);
                assert_ne!(ct, block);
                assert_eq!(decrypt_block(&ct, &key), block);
            }
        }
    }
}
