//! Encrypts a short message with every mode and checks it against the
//! portable reference cipher.

use aes_core::{encrypt_block, AesKeySchedule};
use aesni_engine::{as_blocks_mut, AesNi, InOut};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

fn main() {
    let ni = match AesNi::detect() {
        Ok(ni) => ni,
        Err(err) => {
            eprintln!("{err}");
            return;
        }
    };
    ni.self_test().expect("known-answer tests");

    // Deterministic seed for reproducibility in the example.
    let mut rng = ChaCha20Rng::from_seed([1u8; 32]);
    let mut raw = [0u8; 32];
    rng.fill_bytes(&mut raw);
    let key = AesKeySchedule::new(&raw[..16]).unwrap();
    let tweak_key = AesKeySchedule::new(&raw[16..]).unwrap();

    let mut message = [0u8; 32];
    message[..16].copy_from_slice(b"first block here");
    message[16..].copy_from_slice(b"second blockhere");

    let mut ecb = message;
    ni.encrypt_ecb(&key, as_blocks_mut(&mut ecb).unwrap());
    let expected_first = encrypt_block(&message[..16].try_into().unwrap(), &key);
    let expected_second = encrypt_block(&message[16..].try_into().unwrap(), &key);
    assert_eq!(&ecb[..16], &expected_first);
    assert_eq!(&ecb[16..], &expected_second);

    let iv = [0x42u8; 16];
    let mut cbc = message;
    ni.encrypt_cbc(&key, &iv, as_blocks_mut(&mut cbc).unwrap());
    ni.decrypt_cbc(&key, &iv, as_blocks_mut(&mut cbc).unwrap());
    assert_eq!(cbc, message);

    let text = b"counter mode takes any length";
    let mut ctr = vec![0u8; text.len()];
    ni.apply_ctr(&key, &iv, InOut::split(text, &mut ctr).unwrap());
    ni.apply_ctr(&key, &iv, &mut ctr[..]);
    assert_eq!(ctr, text);

    let mut xts = message;
    ni.encrypt_xts(&key, &tweak_key, &iv, 0, as_blocks_mut(&mut xts).unwrap());
    println!("xts ciphertext: {}", hex::encode(xts));
    ni.decrypt_xts(&key, &tweak_key, &iv, 0, as_blocks_mut(&mut xts).unwrap());
    assert_eq!(xts, message);

    println!("example succeeded; every mode round-trips and ECB matches the reference");
}
