use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

use meterframe_frame::{ChecksumKind, DEFAULT_MAX_FRAME_SIZE, DEFAULT_READ_CHUNK_SIZE};

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod checksum;
pub mod header;
pub mod reassemble;
pub mod scan;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Delimit frames in a captured byte stream.
    Scan(ScanArgs),
    /// Encode or decode a command header.
    Header(HeaderArgs),
    /// Compute a checksum over hex input.
    Checksum(ChecksumArgs),
    /// Reassemble a fragmented transfer.
    Reassemble(ReassembleArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Scan(args) => scan::run(args, format),
        Command::Header(args) => header::run(args, format),
        Command::Checksum(args) => checksum::run(args, format),
        Command::Reassemble(args) => reassemble::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum ChecksumArg {
    Crc16,
    Crc32,
    Lrc,
}

impl From<ChecksumArg> for ChecksumKind {
    fn from(arg: ChecksumArg) -> Self {
        match arg {
            ChecksumArg::Crc16 => ChecksumKind::Crc16,
            ChecksumArg::Crc32 => ChecksumKind::Crc32,
            ChecksumArg::Lrc => ChecksumKind::Lrc,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum FragmentKind {
    /// Data segments (1-byte session, index/count flags).
    Segment,
    /// Command fragments (2-byte session, index, count/last).
    Fragment,
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Hex-encoded capture.
    #[arg(long, conflicts_with = "file")]
    pub hex: Option<String>,
    /// Read a binary capture from file. Default: stdin.
    #[arg(long, conflicts_with = "hex")]
    pub file: Option<PathBuf>,
    /// Trailer checksum.
    #[arg(long, default_value = "crc16")]
    pub checksum: ChecksumArg,
    /// Maximum wire size of a frame.
    #[arg(long, default_value_t = DEFAULT_MAX_FRAME_SIZE)]
    pub max_frame_size: usize,
    /// Bytes requested per read from --file or stdin.
    #[arg(long, default_value_t = DEFAULT_READ_CHUNK_SIZE)]
    pub read_chunk_size: usize,
    /// Disable byte stuffing.
    #[arg(long)]
    pub no_escape: bool,
    /// Exit with code 60 if any frame fails its checksum.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args, Debug)]
pub struct HeaderArgs {
    #[command(subcommand)]
    pub action: HeaderAction,
}

#[derive(Subcommand, Debug)]
pub enum HeaderAction {
    /// Encode a header for a command id and body size.
    Encode {
        /// Command id, decimal or 0x-prefixed hex.
        #[arg(long, value_parser = parse_id)]
        id: u16,
        /// Body size in bytes.
        #[arg(long)]
        size: u8,
    },
    /// Decode a hex-encoded header.
    Decode {
        /// Hex bytes starting with the header.
        hex: String,
    },
}

#[derive(Args, Debug)]
pub struct ChecksumArgs {
    /// Checksum algorithm.
    #[arg(long, default_value = "crc16")]
    pub kind: ChecksumArg,
    /// Hex-encoded input.
    pub hex: String,
}

#[derive(Args, Debug)]
pub struct ReassembleArgs {
    /// Fragment layout.
    #[arg(long, default_value = "segment")]
    pub kind: FragmentKind,
    /// Hex-encoded fragment bodies, in arrival order.
    #[arg(required = true)]
    pub fragments: Vec<String>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Decode hex input, ignoring whitespace and an optional `0x` prefix.
pub fn parse_hex(input: &str) -> CliResult<Vec<u8>> {
    let cleaned: String = input.split_whitespace().collect();
    let digits = cleaned
        .strip_prefix("0x")
        .or_else(|| cleaned.strip_prefix("0X"))
        .unwrap_or(&cleaned);
    hex::decode(digits).map_err(|err| CliError::new(USAGE, format!("invalid hex input: {err}")))
}

fn parse_id(input: &str) -> Result<u16, String> {
    let input = input.trim();
    let parsed = match input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        Some(digits) => u16::from_str_radix(digits, 16),
        None => input.parse(),
    };
    parsed.map_err(|err| format!("invalid command id {input}: {err}"))
}
