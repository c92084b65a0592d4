//! Marker-delimited, checksummed framing for metering device links.
//!
//! Every frame on the wire is:
//! - a START marker (`0x7E` by default)
//! - the payload followed by a big-endian checksum trailer (CRC-16/X-25,
//!   CRC-32 or LRC), byte-stuffed so no marker appears inside
//! - a STOP marker (`0x7E` by default)
//!
//! A payload is a sequence of command records, each prefixed by a 1–3 byte
//! header carrying the command id and body size.
//!
//! Malformed or overlong runs in a live stream are dropped and the scanner
//! resynchronises on the next START marker; nothing here panics on bad input.

pub mod checksum;
pub mod codec;
pub mod command;
pub mod error;
pub mod header;
pub mod markers;
pub mod reader;
pub mod scanner;
pub mod writer;

#[cfg(feature = "async")]
pub mod async_codec;

pub use checksum::{
    append_crc16, append_crc32, append_lrc, crc16_x25, crc32_ieee, lrc, parse_with_crc16,
    parse_with_crc32, parse_with_lrc, Checked, ChecksumCheck, ChecksumKind, LRC_SEED,
};
pub use codec::{
    encode_frame, parse_single_frame, Frame, FrameConfig, DEFAULT_MAX_FRAME_SIZE,
    DEFAULT_READ_CHUNK_SIZE,
};
pub use command::{decode_commands, encode_command, encode_commands, Command, CommandIter};
pub use error::{FrameError, Result};
pub use header::{decode_header, encode_header, Header, HeaderError};
pub use markers::{ESCAPE, START, STOP};
pub use reader::FrameReader;
pub use scanner::{ScanState, ScannerStats, StreamScanner};
pub use writer::FrameWriter;

#[cfg(feature = "async")]
pub use async_codec::MeterCodec;
