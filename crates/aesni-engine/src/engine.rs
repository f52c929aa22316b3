//! The `AesNi` capability token and the public entry points.

use aes_core::{AesKeySchedule, Block, KeySize};

use crate::error::EngineError;
use crate::inout::InOut;
use crate::{block, cbc, ctr, ecb, kat, xts};

cpufeatures::new!(aes_intrinsics, "aes", "sse2");

/// Runs `$body` with `$nr` bound to the round count of `$size` as a const.
macro_rules! per_key_size {
    ($size:expr, $nr:ident => $body:expr) => {
        match $size {
            KeySize::Aes128 => {
                const $nr: usize = KeySize::Aes128.rounds();
                $body
            }
            KeySize::Aes192 => {
                const $nr: usize = KeySize::Aes192.rounds();
                $body
            }
            KeySize::Aes256 => {
                const $nr: usize = KeySize::Aes256.rounds();
                $body
            }
        }
    };
}

/// Proof that the running CPU implements the AES-NI instructions.
///
/// Every cipher operation is a method on this token, so holding one is the
/// only precondition the drivers have beyond well-formed arguments.
#[derive(Clone, Copy, Debug)]
pub struct AesNi {
    _private: (),
}

impl AesNi {
    /// Checks CPUID for AES-NI.
    pub fn detect() -> Result<Self, EngineError> {
        if aes_intrinsics::get() {
            Ok(Self { _private: () })
        } else {
            tracing::debug!("CPUID reports no AES-NI support");
            Err(EngineError::Unsupported)
        }
    }

    /// Creates a token without checking the CPU.
    ///
    /// # Safety
    ///
    /// The caller must guarantee that the CPU supports the `aes` and `sse2`
    /// target features; using the token otherwise executes illegal
    /// instructions.
    pub unsafe fn new_unchecked() -> Self {
        Self { _private: () }
    }

    /// Runs the built-in known-answer tests against this CPU.
    pub fn self_test(self) -> Result<(), EngineError> {
        kat::run_all(self)
    }

    /// Encrypts one block.
    pub fn encrypt_block(self, key: &AesKeySchedule, input: &Block) -> Block {
        let schedule = key.encryption();
        // SAFETY: `self` proves AES-NI support.
        per_key_size!(key.key_size(), NR => unsafe { block::encrypt_block::<NR>(schedule, input) })
    }

    /// Decrypts one block.
    pub fn decrypt_block(self, key: &AesKeySchedule, input: &Block) -> Block {
        let schedule = key.decryption();
        // SAFETY: `self` proves AES-NI support.
        per_key_size!(key.key_size(), NR => unsafe { block::decrypt_block::<NR>(schedule, input) })
    }

    /// ECB encryption of every block in `buf`.
    pub fn encrypt_ecb<'a>(self, key: &AesKeySchedule, buf: impl Into<InOut<'a, Block>>) {
        let (schedule, buf) = (key.encryption(), buf.into());
        // SAFETY: `self` proves AES-NI support.
        per_key_size!(key.key_size(), NR => unsafe { ecb::encrypt::<NR>(schedule, buf) })
    }

    /// ECB decryption of every block in `buf`.
    pub fn decrypt_ecb<'a>(self, key: &AesKeySchedule, buf: impl Into<InOut<'a, Block>>) {
        let (schedule, buf) = (key.decryption(), buf.into());
        // SAFETY: `self` proves AES-NI support.
        per_key_size!(key.key_size(), NR => unsafe { ecb::decrypt::<NR>(schedule, buf) })
    }

    /// CBC encryption starting from `iv`.
    ///
    /// To continue a stream in a later call, pass the last ciphertext block
    /// as the next `iv`.
    pub fn encrypt_cbc<'a>(
        self,
        key: &AesKeySchedule,
        iv: &Block,
        buf: impl Into<InOut<'a, Block>>,
    ) {
        let (schedule, buf) = (key.encryption(), buf.into());
        // SAFETY: `self` proves AES-NI support.
        per_key_size!(key.key_size(), NR => unsafe { cbc::encrypt::<NR>(schedule, iv, buf) })
    }

    /// CBC decryption starting from `iv`.
    pub fn decrypt_cbc<'a>(
        self,
        key: &AesKeySchedule,
        iv: &Block,
        buf: impl Into<InOut<'a, Block>>,
    ) {
        let (schedule, buf) = (key.decryption(), buf.into());
        // SAFETY: `self` proves AES-NI support.
        per_key_size!(key.key_size(), NR => unsafe { cbc::decrypt::<NR>(schedule, iv, buf) })
    }

    /// XORs `buf` with the CTR keystream seeded by the big-endian counter
    /// block `iv`. Any length is accepted; the same call decrypts.
    pub fn apply_ctr<'a>(self, key: &AesKeySchedule, iv: &Block, buf: impl Into<InOut<'a, u8>>) {
        let (schedule, buf) = (key.encryption(), buf.into());
        // SAFETY: `self` proves AES-NI support.
        per_key_size!(key.key_size(), NR => unsafe { ctr::apply::<NR>(schedule, iv, buf) })
    }

    /// XTS encryption of whole blocks.
    ///
    /// `tweak` is the raw sector tweak; it is encrypted under `tweak_key` and
    /// advanced by `start_block` doublings before the first block of `buf`.
    pub fn encrypt_xts<'a>(
        self,
        data_key: &AesKeySchedule,
        tweak_key: &AesKeySchedule,
        tweak: &Block,
        start_block: u32,
        buf: impl Into<InOut<'a, Block>>,
    ) {
        let start = self.start_tweak(tweak_key, tweak, start_block);
        let (schedule, buf) = (data_key.encryption(), buf.into());
        // SAFETY: `self` proves AES-NI support.
        per_key_size!(data_key.key_size(), NR => unsafe { xts::encrypt::<NR>(schedule, &start, buf) })
    }

    /// XTS decryption of whole blocks; the mirror of [`AesNi::encrypt_xts`].
    pub fn decrypt_xts<'a>(
        self,
        data_key: &AesKeySchedule,
        tweak_key: &AesKeySchedule,
        tweak: &Block,
        start_block: u32,
        buf: impl Into<InOut<'a, Block>>,
    ) {
        let start = self.start_tweak(tweak_key, tweak, start_block);
        let (schedule, buf) = (data_key.decryption(), buf.into());
        // SAFETY: `self` proves AES-NI support.
        per_key_size!(data_key.key_size(), NR => unsafe { xts::decrypt::<NR>(schedule, &start, buf) })
    }

    /// The tweak is always encrypted, in both directions.
    fn start_tweak(self, tweak_key: &AesKeySchedule, tweak: &Block, start_block: u32) -> Block {
        xts::advance_tweak(&self.encrypt_block(tweak_key, tweak), start_block)
    }
}
