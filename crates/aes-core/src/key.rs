//! Key-size classes and round-key schedules.
//!
//! A raw key is expanded once into an [`AesKeySchedule`], which carries two
//! views of the same key: the forward schedule consumed by `AESENC`-style
//! rounds and the equivalent-inverse schedule consumed by `AESDEC`-style
//! rounds.

use core::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::block::Block;
use crate::cipher::{expand_key, invert_schedule};
use crate::error::KeyError;

/// Longest schedule: AES-256 uses 14 rounds plus the initial whitening key.
pub const MAX_ROUND_KEYS: usize = 15;

/// The three AES key-size classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeySize {
    /// 128-bit key, 10 rounds.
    Aes128,
    /// 192-bit key, 12 rounds.
    Aes192,
    /// 256-bit key, 14 rounds.
    Aes256,
}

impl KeySize {
    /// Maps a raw key length in bytes to its class.
    pub fn from_key_len(len: usize) -> Result<Self, KeyError> {
        match len {
            16 => Ok(Self::Aes128),
            24 => Ok(Self::Aes192),
            32 => Ok(Self::Aes256),
            other => Err(KeyError::InvalidLength(other)),
        }
    }

    /// Raw key length in bytes.
    pub const fn key_len(self) -> usize {
        match self {
            Self::Aes128 => 16,
            Self::Aes192 => 24,
            Self::Aes256 => 32,
        }
    }

    /// Number of cipher rounds (`Nr`).
    pub const fn rounds(self) -> usize {
        match self {
            Self::Aes128 => 10,
            Self::Aes192 => 12,
            Self::Aes256 => 14,
        }
    }

    /// Number of round keys in a schedule (`Nr + 1`).
    pub const fn round_keys(self) -> usize {
        self.rounds() + 1
    }

    /// Key size in bits.
    pub const fn bits(self) -> usize {
        self.key_len() * 8
    }
}

impl fmt::Display for KeySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AES-{}", self.bits())
    }
}

/// Which round instruction family a schedule is laid out for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Forward cipher schedule.
    Encrypt,
    /// Equivalent inverse cipher schedule.
    Decrypt,
}

/// Round keys for one direction of one key.
///
/// Only the first [`KeySize::round_keys`] entries are meaningful; the rest
/// stay zero.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct RoundKeys {
    #[zeroize(skip)]
    size: KeySize,
    #[zeroize(skip)]
    direction: Direction,
    keys: [Block; MAX_ROUND_KEYS],
}

impl RoundKeys {
    pub(crate) fn new(size: KeySize, direction: Direction, keys: [Block; MAX_ROUND_KEYS]) -> Self {
        Self {
            size,
            direction,
            keys,
        }
    }

    /// Key-size class this schedule was expanded for.
    #[inline]
    pub fn key_size(&self) -> KeySize {
        self.size
    }

    /// Direction this schedule is laid out for.
    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Number of cipher rounds.
    #[inline]
    pub fn rounds(&self) -> usize {
        self.size.rounds()
    }

    /// Returns the round key at the requested index (`0..=rounds()`).
    #[inline]
    pub fn get(&self, round: usize) -> &Block {
        &self.as_blocks()[round]
    }

    /// The meaningful round keys, in the order the rounds consume them.
    #[inline]
    pub fn as_blocks(&self) -> &[Block] {
        &self.keys[..self.size.round_keys()]
    }
}

impl fmt::Debug for RoundKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoundKeys")
            .field("size", &self.size)
            .field("direction", &self.direction)
            .finish_non_exhaustive()
    }
}

/// Both schedules of one AES key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AesKeySchedule {
    enc: RoundKeys,
    dec: RoundKeys,
}

impl AesKeySchedule {
    /// Expands a 16, 24 or 32-byte key.
    pub fn new(key: &[u8]) -> Result<Self, KeyError> {
        let enc = expand_key(key)?;
        let dec = invert_schedule(&enc);
        Ok(Self { enc, dec })
    }

    /// Key-size class of this key.
    #[inline]
    pub fn key_size(&self) -> KeySize {
        self.enc.key_size()
    }

    /// Forward schedule.
    #[inline]
    pub fn encryption(&self) -> &RoundKeys {
        &self.enc
    }

    /// Equivalent inverse schedule.
    #[inline]
    pub fn decryption(&self) -> &RoundKeys {
        &self.dec
    }

    /// Returns the view for `direction`.
    #[inline]
    pub fn view(&self, direction: Direction) -> &RoundKeys {
        match direction {
            Direction::Encrypt => &self.enc,
            Direction::Decrypt => &self.dec,
        }
    }
}

impl TryFrom<&[u8]> for AesKeySchedule {
    type Error = KeyError;

    fn try_from(key: &[u8]) -> Result<Self, Self::Error> {
        Self::new(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_size_classes() {
        assert_eq!(KeySize::from_key_len(16), Ok(KeySize::Aes128));
        assert_eq!(KeySize::from_key_len(24), Ok(KeySize::Aes192));
        assert_eq!(KeySize::from_key_len(32), Ok(KeySize::Aes256));
        assert_eq!(KeySize::from_key_len(0), Err(KeyError::InvalidLength(0)));
        assert_eq!(KeySize::from_key_len(17), Err(KeyError::InvalidLength(17)));
        assert_eq!(KeySize::Aes192.round_keys(), 13);
        assert_eq!(KeySize::Aes256.to_string(), "AES-256");
    }

    #[test]
    fn schedule_rejects_bad_lengths() {
        assert!(AesKeySchedule::new(&[0u8; 15]).is_err());
        assert!(AesKeySchedule::try_from(&[0u8; 33][..]).is_err());
    }

    #[test]
    fn views_have_matching_length_and_direction() {
        for len in [16, 24, 32] {
            let schedule = AesKeySchedule::new(&vec![0x5a; len]).unwrap();
            let size = schedule.key_size();
            assert_eq!(size.key_len(), len);
            assert_eq!(schedule.encryption().as_blocks().len(), size.round_keys());
            assert_eq!(schedule.decryption().as_blocks().len(), size.round_keys());
            assert_eq!(schedule.view(Direction::Encrypt).direction(), Direction::Encrypt);
            assert_eq!(schedule.view(Direction::Decrypt).direction(), Direction::Decrypt);
        }
    }

    #[test]
    fn debug_output_hides_round_keys() {
        let schedule = AesKeySchedule::new(&[0xab; 16]).unwrap();
        let rendered = format!("{schedule:?}");
        assert!(rendered.contains("Aes128"));
        assert!(!rendered.contains("171"));
    }
}
