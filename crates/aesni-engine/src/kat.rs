//! Known-answer tests for the block core and every mode driver.
//!
//! Vectors come from FIPS-197 Appendix C, NIST SP 800-38A and IEEE 1619-2007
//! Annex B. [`AesNi::self_test`](crate::AesNi::self_test) runs all of them
//! without allocating.

use aes_core::{Block, BLOCK_SIZE};

use crate::error::EngineError;

/// Single-block vector: key and expected ciphertext of [`FIPS_197_PLAIN`].
pub struct BlockVector {
    /// Raw key, hex.
    pub key: &'static str,
    /// Expected ciphertext, hex.
    pub cipher: &'static str,
}

/// Multi-block mode vector.
pub struct ModeVector {
    /// Human-readable name used in failure reports.
    pub name: &'static str,
    /// Raw key, hex.
    pub key: &'static str,
    /// IV or initial counter block, hex (empty for ECB).
    pub iv: &'static str,
    /// Plaintext, hex.
    pub plain: &'static str,
    /// Ciphertext, hex.
    pub cipher: &'static str,
}

/// XTS vector with separate data and tweak keys.
pub struct XtsVector {
    /// Human-readable name used in failure reports.
    pub name: &'static str,
    /// Data-unit key (key 1), hex.
    pub data_key: &'static str,
    /// Tweak key (key 2), hex.
    pub tweak_key: &'static str,
    /// Sector tweak before encryption, hex.
    pub tweak: &'static str,
    /// Plaintext, hex.
    pub plain: &'static str,
    /// Ciphertext, hex.
    pub cipher: &'static str,
}

/// FIPS-197 Appendix C plaintext.
pub const FIPS_197_PLAIN: &str = "00112233445566778899aabbccddeeff";

/// FIPS-197 Appendix C.1 to C.3.
pub const FIPS_197_BLOCKS: [BlockVector; 3] = [
    BlockVector {
        key: "000102030405060708090a0b0c0d0e0f",
        cipher: "69c4e0d86a7b0430d8cdb78070b4c55a",
    },
    BlockVector {
        key: "000102030405060708090a0b0c0d0e0f1011121314151617",
        cipher: "dda97ca4864cdfe06eaf70a0ec0d7191",
    },
    BlockVector {
        key: "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f",
        cipher: "8ea2b7ca516745bfeafc49904b496089",
    },
];

const SP800_38A_PLAIN: &str = "6bc1bee22e409f96e93d7e117393172a\
                               ae2d8a571e03ac9c9eb76fac45af8e51\
                               30c81c46a35ce411e5fbc1191a0a52ef\
                               f69f2445df4f9b17ad2b417be66c3710";

/// SP 800-38A F.1.1, F.1.3 (first block), F.1.5 (first block).
pub const ECB_VECTORS: [ModeVector; 3] = [
    ModeVector {
        name: "ECB-AES128",
        key: "2b7e151628aed2a6abf7158809cf4f3c",
        iv: "",
        plain: SP800_38A_PLAIN,
        cipher: "3ad77bb40d7a3660a89ecaf32466ef97\
                 f5d3d58503b9699de785895a96fdbaaf\
                 43b1cd7f598ece23881b00e3ed030688\
                 7b0c785e27e8ad3f8223207104725dd4",
    },
    ModeVector {
        name: "ECB-AES192",
        key: "8e73b0f7da0e6452c810f32b809079e562f8ead2522c6b7b",
        iv: "",
        plain: "6bc1bee22e409f96e93d7e117393172a",
        cipher: "bd334f1d6e45f25ff712a214571fa5cc",
    },
    ModeVector {
        name: "ECB-AES256",
        key: "603deb1015ca71be2b73aef0857d77811f352c073b6108d72d9810a30914dff4",
        iv: "",
        plain: "6bc1bee22e409f96e93d7e117393172a",
        cipher: "f3eed1bdb5d2a03c064b5a7e3db181f8",
    },
];

/// SP 800-38A F.2.1.
pub const CBC_VECTORS: [ModeVector; 1] = [ModeVector {
    name: "CBC-AES128",
    key: "2b7e151628aed2a6abf7158809cf4f3c",
    iv: "000102030405060708090a0b0c0d0e0f",
    plain: SP800_38A_PLAIN,
    cipher: "7649abac8119b246cee98e9b12e9197d\
             5086cb9b507219ee95db113a917678b2\
             73bed6b8e3c1743b7116e69e22229516\
             3ff1caa1681fac09120eca307586e1a7",
}];

/// SP 800-38A F.5.1, plus the same stream cut to a partial final block.
pub const CTR_VECTORS: [ModeVector; 2] = [
    ModeVector {
        name: "CTR-AES128",
        key: "2b7e151628aed2a6abf7158809cf4f3c",
        iv: "f0f1f2f3f4f5f6f7f8f9fafbfcfdfeff",
        plain: SP800_38A_PLAIN,
        cipher: "874d6191b620e3261bef6864990db6ce\
                 9806f66b7970fdff8617187bb9fffdff\
                 5ae4df3edbd5d35e5b4f09020db03eab\
                 1e031dda2fbe03d1792170a0f3009cee",
    },
    ModeVector {
        name: "CTR-AES128-partial",
        key: "2b7e151628aed2a6abf7158809cf4f3c",
        iv: "f0f1f2f3f4f5f6f7f8f9fafbfcfdfeff",
        plain: "6bc1bee22e409f96e93d7e117393172aae2d8a",
        cipher: "874d6191b620e3261bef6864990db6ce9806f6",
    },
];

/// IEEE 1619-2007 Annex B, vectors 1 and 2.
pub const XTS_VECTORS: [XtsVector; 2] = [
    XtsVector {
        name: "XTS-AES128-1",
        data_key: "00000000000000000000000000000000",
        tweak_key: "00000000000000000000000000000000",
        tweak: "00000000000000000000000000000000",
        plain: "0000000000000000000000000000000000000000000000000000000000000000",
        cipher: "917cf69ebd68b2ec9b9fe9a3eadda692cd43d2f59598ed858c02c2652fbf922e",
    },
    XtsVector {
        name: "XTS-AES128-2",
        data_key: "11111111111111111111111111111111",
        tweak_key: "22222222222222222222222222222222",
        tweak: "33333333330000000000000000000000",
        plain: "4444444444444444444444444444444444444444444444444444444444444444",
        cipher: "c454185e6a16936e39334038acef838bfb186fff7480adc4289382ecd6d394f0",
    },
];

/// Largest vector payload, in bytes.
const MAX_PAYLOAD: usize = 4 * BLOCK_SIZE;

/// Decodes a hex block.
pub fn block(hex_str: &str) -> Result<Block, EngineError> {
    let mut out = [0u8; BLOCK_SIZE];
    hex::decode_to_slice(hex_str, &mut out).map_err(|_| EngineError::KatFailure("malformed vector"))?;
    Ok(out)
}

/// Decodes hex into a fixed buffer, returning it with the decoded length.
fn payload(hex_str: &str) -> Result<([u8; MAX_PAYLOAD], usize), EngineError> {
    let len = hex_str.len() / 2;
    let mut out = [0u8; MAX_PAYLOAD];
    let dst = out
        .get_mut(..len)
        .ok_or(EngineError::KatFailure("vector too long"))?;
    hex::decode_to_slice(hex_str, dst).map_err(|_| EngineError::KatFailure("malformed vector"))?;
    Ok((out, len))
}

#[cfg(test)]
pub(crate) fn blocks(hex_str: &str) -> Vec<Block> {
    hex::decode(hex_str)
        .unwrap()
        .chunks_exact(BLOCK_SIZE)
        .map(|chunk| chunk.try_into().unwrap())
        .collect()
}

#[cfg(aesni_eligible)]
pub(crate) use self::run::run_all;

#[cfg(aesni_eligible)]
mod run {
    use aes_core::AesKeySchedule;

    use super::*;
    use crate::inout::{as_blocks, as_blocks_mut, InOut};
    use crate::AesNi;

    fn key(hex_str: &str) -> Result<AesKeySchedule, EngineError> {
        let (raw, len) = payload(hex_str)?;
        AesKeySchedule::new(&raw[..len]).map_err(|_| EngineError::KatFailure("bad vector key"))
    }

    fn check(ok: bool, name: &'static str) -> Result<(), EngineError> {
        if ok {
            Ok(())
        } else {
            Err(EngineError::KatFailure(name))
        }
    }

    /// Runs every vector; returns on the first failure.
    pub(crate) fn run_all(ni: AesNi) -> Result<(), EngineError> {
        block_core(ni)?;
        ecb(ni)?;
        cbc(ni)?;
        ctr(ni)?;
        xts(ni)?;
        Ok(())
    }

    fn block_core(ni: AesNi) -> Result<(), EngineError> {
        let plain = block(FIPS_197_PLAIN)?;
        for vector in &FIPS_197_BLOCKS {
            let key = key(vector.key)?;
            let cipher = block(vector.cipher)?;
            check(ni.encrypt_block(&key, &plain) == cipher, "FIPS-197 encrypt")?;
            check(ni.decrypt_block(&key, &cipher) == plain, "FIPS-197 decrypt")?;
        }
        Ok(())
    }

    fn ecb(ni: AesNi) -> Result<(), EngineError> {
        for vector in &ECB_VECTORS {
            let key = key(vector.key)?;
            let (plain, len) = payload(vector.plain)?;
            let (cipher, _) = payload(vector.cipher)?;
            let mut out = plain;
            let data = as_blocks_mut(&mut out[..len])?;
            ni.encrypt_ecb(&key, &mut *data);
            check(as_blocks(&cipher[..len])? == &*data, vector.name)?;
            ni.decrypt_ecb(&key, &mut *data);
            check(as_blocks(&plain[..len])? == &*data, vector.name)?;
        }
        Ok(())
    }

    fn cbc(ni: AesNi) -> Result<(), EngineError> {
        for vector in &CBC_VECTORS {
            let key = key(vector.key)?;
            let iv = block(vector.iv)?;
            let (plain, len) = payload(vector.plain)?;
            let (cipher, _) = payload(vector.cipher)?;
            let mut out = [0u8; MAX_PAYLOAD];
            let out_blocks = as_blocks_mut(&mut out[..len])?;
            ni.encrypt_cbc(&key, &iv, InOut::split(as_blocks(&plain[..len])?, out_blocks)?);
            check(out[..len] == cipher[..len], vector.name)?;
            ni.decrypt_cbc(&key, &iv, as_blocks_mut(&mut out[..len])?);
            check(out[..len] == plain[..len], vector.name)?;
        }
        Ok(())
    }

    fn ctr(ni: AesNi) -> Result<(), EngineError> {
        for vector in &CTR_VECTORS {
            let key = key(vector.key)?;
            let iv = block(vector.iv)?;
            let (plain, len) = payload(vector.plain)?;
            let (cipher, _) = payload(vector.cipher)?;
            let mut out = plain;
            ni.apply_ctr(&key, &iv, &mut out[..len]);
            check(out[..len] == cipher[..len], vector.name)?;
            ni.apply_ctr(&key, &iv, &mut out[..len]);
            check(out[..len] == plain[..len], vector.name)?;
        }
        Ok(())
    }

    fn xts(ni: AesNi) -> Result<(), EngineError> {
        for vector in &XTS_VECTORS {
            let data_key = key(vector.data_key)?;
            let tweak_key = key(vector.tweak_key)?;
            let tweak = block(vector.tweak)?;
            let (plain, len) = payload(vector.plain)?;
            let (cipher, _) = payload(vector.cipher)?;
            let mut out = plain;
            ni.encrypt_xts(&data_key, &tweak_key, &tweak, 0, as_blocks_mut(&mut out[..len])?);
            check(out[..len] == cipher[..len], vector.name)?;
            ni.decrypt_xts(&data_key, &tweak_key, &tweak, 0, as_blocks_mut(&mut out[..len])?);
            check(out[..len] == plain[..len], vector.name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vectors_decode() {
        assert_eq!(block(FIPS_197_PLAIN).unwrap()[15], 0xff);
        assert!(block("00").is_err());
        let (_, len) = payload(SP800_38A_PLAIN).unwrap();
        assert_eq!(len, MAX_PAYLOAD);
        assert_eq!(blocks(CTR_VECTORS[0].cipher).len(), 4);
        assert!(payload(&"00".repeat(MAX_PAYLOAD + 1)).is_err());
    }

    #[cfg(aesni_eligible)]
    #[test]
    fn self_test_passes() {
        let Some(ni) = crate::test_engine() else { return };
        assert_eq!(ni.self_test(), Ok(()));
    }
}
