//! Command-line interface for `aesni-engine`.

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
compile_error!("the aesni binary needs an x86 or x86_64 target");

use std::fs;
use std::path::{Path, PathBuf};

use aes_core::{AesKeySchedule, Block, KeySize, BLOCK_SIZE};
use aesni_engine::{as_blocks_mut, ctr, AesNi};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rand::{CryptoRng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use tracing::{debug, info};

/// AES-NI cipher CLI.
#[derive(Parser)]
#[command(
    name = "aesni",
    version,
    author,
    about = "AES-NI block cipher engine: ECB, CBC, CTR and XTS"
)]
struct Cli {
    /// Log at debug level.
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    Ecb,
    Cbc,
    Ctr,
    Xts,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Bits {
    #[value(name = "128")]
    B128,
    #[value(name = "192")]
    B192,
    #[value(name = "256")]
    B256,
}

impl From<Bits> for KeySize {
    fn from(bits: Bits) -> Self {
        match bits {
            Bits::B128 => KeySize::Aes128,
            Bits::B192 => KeySize::Aes192,
            Bits::B256 => KeySize::Aes256,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Op {
    Encrypt,
    Decrypt,
}

#[derive(clap::Args)]
struct CipherArgs {
    /// Block cipher mode.
    #[arg(long, value_enum, default_value_t = Mode::Cbc)]
    mode: Mode,
    /// AES key as 32, 48 or 64 hex characters.
    #[arg(long, value_name = "HEX")]
    key_hex: String,
    /// IV (CBC), initial counter block (CTR) or sector tweak (XTS).
    #[arg(long, value_name = "HEX")]
    iv_hex: Option<String>,
    /// Second key for XTS tweak encryption.
    #[arg(long, value_name = "HEX")]
    tweak_key_hex: Option<String>,
    /// Index of the first block in the stream (CTR and XTS).
    #[arg(long, default_value_t = 0)]
    start_block: u32,
    /// Input file.
    #[arg(long, value_name = "FILE")]
    input: PathBuf,
    /// Output file.
    #[arg(long, value_name = "FILE")]
    output: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a file.
    Enc(CipherArgs),
    /// Decrypt a file.
    Dec(CipherArgs),
    /// Run the built-in known-answer tests on this CPU.
    Check,
    /// Print a random key as hex.
    Keygen {
        /// Key size in bits.
        #[arg(long, value_enum, default_value_t = Bits::B128)]
        bits: Bits,
        /// Optional RNG seed for reproducibility.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Run a local demo: random key, IV and data through every mode and back.
    Demo {
        /// Optional RNG seed for reproducibility.
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Enc(args) => cmd_cipher(Op::Encrypt, &args),
        Commands::Dec(args) => cmd_cipher(Op::Decrypt, &args),
        Commands::Check => cmd_check(),
        Commands::Keygen { bits, seed } => cmd_keygen(bits, seed),
        Commands::Demo { seed } => cmd_demo(seed),
    }
}

/// Key material and parameters for one run over a buffer.
struct Params {
    mode: Mode,
    key: AesKeySchedule,
    iv: Option<Block>,
    tweak_key: Option<AesKeySchedule>,
    start_block: u32,
}

impl Params {
    fn from_args(args: &CipherArgs) -> Result<Self> {
        let key = parse_key_hex(&args.key_hex)?;
        let iv = args.iv_hex.as_deref().map(parse_block_hex).transpose()?;
        let tweak_key = args
            .tweak_key_hex
            .as_deref()
            .map(parse_key_hex)
            .transpose()?;
        Ok(Self {
            mode: args.mode,
            key,
            iv,
            tweak_key,
            start_block: args.start_block,
        })
    }

    fn iv(&self) -> Result<&Block> {
        self.iv
            .as_ref()
            .with_context(|| format!("{:?} mode requires --iv-hex", self.mode))
    }
}

fn cmd_cipher(op: Op, args: &CipherArgs) -> Result<()> {
    let ni = AesNi::detect().context("detect AES-NI")?;
    let params = Params::from_args(args)?;
    let mut data = read_file(&args.input)?;
    info!(
        mode = ?params.mode,
        key = %params.key.key_size(),
        bytes = data.len(),
        "{}",
        match op {
            Op::Encrypt => "encrypting",
            Op::Decrypt => "decrypting",
        }
    );
    run(ni, op, &params, &mut data)?;
    fs::write(&args.output, &data).with_context(|| format!("write {}", args.output.display()))?;
    debug!(output = %args.output.display(), "done");
    Ok(())
}

/// Runs `params.mode` over `data` in place.
fn run(ni: AesNi, op: Op, params: &Params, data: &mut [u8]) -> Result<()> {
    if params.mode == Mode::Ctr {
        let counter = ctr::offset_counter(params.iv()?, u128::from(params.start_block));
        ni.apply_ctr(&params.key, &counter, data);
        return Ok(());
    }

    if data.len() % BLOCK_SIZE != 0 {
        bail!(
            "{:?} input length must be a multiple of {BLOCK_SIZE} bytes",
            params.mode
        );
    }
    let blocks = as_blocks_mut(data)?;
    match (params.mode, op) {
        (Mode::Ecb, Op::Encrypt) => ni.encrypt_ecb(&params.key, blocks),
        (Mode::Ecb, Op::Decrypt) => ni.decrypt_ecb(&params.key, blocks),
        (Mode::Cbc, Op::Encrypt) => ni.encrypt_cbc(&params.key, params.iv()?, blocks),
        (Mode::Cbc, Op::Decrypt) => ni.decrypt_cbc(&params.key, params.iv()?, blocks),
        (Mode::Xts, op) => {
            let tweak_key = params
                .tweak_key
                .as_ref()
                .context("XTS mode requires --tweak-key-hex")?;
            let tweak = params.iv()?;
            if op == Op::Encrypt {
                ni.encrypt_xts(&params.key, tweak_key, tweak, params.start_block, blocks);
            } else {
                ni.decrypt_xts(&params.key, tweak_key, tweak, params.start_block, blocks);
            }
        }
        (Mode::Ctr, _) => unreachable!("handled above"),
    }
    Ok(())
}

fn cmd_check() -> Result<()> {
    let ni = AesNi::detect().context("detect AES-NI")?;
    ni.self_test().context("known-answer tests")?;
    println!("all known-answer tests passed");
    Ok(())
}

fn cmd_keygen(bits: Bits, seed: Option<u64>) -> Result<()> {
    let size = KeySize::from(bits);
    let mut rng = seeded_rng(seed);
    let mut key = vec![0u8; size.key_len()];
    rng.fill_bytes(&mut key);
    debug!(key_size = %size, "generated key");
    println!("{}", hex::encode(&key));
    Ok(())
}

fn cmd_demo(seed: Option<u64>) -> Result<()> {
    let ni = AesNi::detect().context("detect AES-NI")?;
    let mut rng = seeded_rng(seed);

    let mut key_bytes = [0u8; 32];
    let mut tweak_key_bytes = [0u8; 32];
    let mut iv = [0u8; BLOCK_SIZE];
    rng.fill_bytes(&mut key_bytes);
    rng.fill_bytes(&mut tweak_key_bytes);
    rng.fill_bytes(&mut iv);

    let mut plaintext = [0u8; 4 * BLOCK_SIZE];
    rng.fill_bytes(&mut plaintext);
    println!("demo key: {}", hex::encode(key_bytes));
    println!("iv: {}", hex::encode(iv));
    println!("plaintext: {}", hex::encode(plaintext));

    for mode in [Mode::Ecb, Mode::Cbc, Mode::Ctr, Mode::Xts] {
        let params = Params {
            mode,
            key: AesKeySchedule::new(&key_bytes)?,
            iv: Some(iv),
            tweak_key: Some(AesKeySchedule::new(&tweak_key_bytes)?),
            start_block: 0,
        };
        let mut data = plaintext;
        run(ni, Op::Encrypt, &params, &mut data)?;
        println!("{:?} ciphertext: {}", mode, hex::encode(data));
        run(ni, Op::Decrypt, &params, &mut data)?;
        if data != plaintext {
            bail!("{mode:?} demo roundtrip failed");
        }
    }
    println!("decrypted: {}", hex::encode(plaintext));
    Ok(())
}

fn parse_key_hex(hex_str: &str) -> Result<AesKeySchedule> {
    let bytes = hex::decode(hex_str.trim()).context("decode key hex")?;
    AesKeySchedule::new(&bytes).context("AES key must be 16, 24 or 32 bytes")
}

fn parse_block_hex(hex_str: &str) -> Result<Block> {
    let mut block = [0u8; BLOCK_SIZE];
    hex::decode_to_slice(hex_str.trim(), &mut block)
        .with_context(|| format!("IV must be {BLOCK_SIZE} bytes of hex"))?;
    Ok(block)
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("read {}", path.display()))
}

fn seeded_rng(seed: Option<u64>) -> impl RngCore + CryptoRng {
    let mut seed_bytes = [0u8; 32];
    match seed {
        Some(value) => seed_bytes[..8].copy_from_slice(&value.to_le_bytes()),
        None => rand::rngs::OsRng.fill_bytes(&mut seed_bytes),
    }
    ChaCha20Rng::from_seed(seed_bytes)
}
