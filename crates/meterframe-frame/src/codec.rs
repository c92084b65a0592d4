use bytes::{BufMut, Bytes, BytesMut};

use crate::checksum::{ChecksumCheck, ChecksumKind};
use crate::command::CommandIter;
use crate::error::{FrameError, Result};
use crate::markers::{needs_escape, ESCAPE, ESCAPE_XOR, START, STOP};

/// Default maximum frame size on the wire, markers included.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 256;

/// Default number of bytes [`FrameReader`](crate::FrameReader) asks its
/// source for per read.
pub const DEFAULT_READ_CHUNK_SIZE: usize = 512;

/// A delimited frame whose trailer has been checked.
///
/// A frame with a checksum mismatch is still returned; whether to drop it is
/// the caller's decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Wire bytes, markers and escapes included.
    pub raw: Bytes,
    /// Unescaped payload without trailer.
    pub payload: Bytes,
    /// Trailer check result.
    pub checksum: ChecksumCheck,
}

impl Frame {
    /// True if the trailer matches the payload.
    pub fn is_valid(&self) -> bool {
        self.checksum.is_valid()
    }

    /// The command records carried in the payload.
    pub fn commands(&self) -> CommandIter {
        CommandIter::new(self.payload.clone())
    }

    /// The total wire size of this frame.
    pub fn wire_size(&self) -> usize {
        self.raw.len()
    }
}

/// Configuration for the frame codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameConfig {
    /// Byte opening a frame. Default: `0x7E`.
    pub start_marker: u8,
    /// Byte closing a frame. Default: `0x7E`.
    pub stop_marker: u8,
    /// Escape byte for marker transparency. `None` disables stuffing, in
    /// which case payloads must not contain the STOP marker.
    pub escape: Option<u8>,
    /// Trailer family. Default: CRC-16/X-25.
    pub checksum: ChecksumKind,
    /// Maximum wire size of a frame. Default: 256 bytes.
    pub max_frame_size: usize,
    /// Bytes requested per read by blocking readers. Default: 512; zero is
    /// treated as one.
    pub read_chunk_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            start_marker: START,
            stop_marker: STOP,
            escape: Some(ESCAPE),
            checksum: ChecksumKind::Crc16,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
        }
    }
}

impl FrameConfig {
    /// Smallest well-formed frame: markers, one payload byte and the trailer.
    pub fn min_frame_size(&self) -> usize {
        2 + 1 + self.checksum.trailer_len()
    }

    fn is_escaped(&self, byte: u8) -> bool {
        self.escape
            .is_some_and(|escape| needs_escape(byte, self.start_marker, self.stop_marker, escape))
    }
}

/// Encode a payload into the wire format.
///
/// Wire format:
/// ```text
/// ┌─────────┬──────────────────────────────────────┬─────────┐
/// │ START   │ stuffed(payload ++ trailer)          │ STOP    │
/// │ 0x7E    │ 0x7E/0x7D → 0x7D, byte ^ 0x20        │ 0x7E    │
/// └─────────┴──────────────────────────────────────┴─────────┘
/// ```
pub fn encode_frame(payload: &[u8], config: &FrameConfig, dst: &mut BytesMut) -> Result<()> {
    if payload.is_empty() {
        return Err(FrameError::EmptyPayload);
    }

    let mut body = BytesMut::with_capacity(payload.len() + config.checksum.trailer_len());
    config.checksum.append(payload, &mut body);

    let escaped = body.iter().filter(|byte| config.is_escaped(**byte)).count();
    let size = 2 + body.len() + escaped;
    if size > config.max_frame_size {
        return Err(FrameError::FrameTooLarge {
            size,
            max: config.max_frame_size,
        });
    }

    dst.reserve(size);
    dst.put_u8(config.start_marker);
    for &byte in body.iter() {
        match config.escape {
            Some(escape) if config.is_escaped(byte) => {
                dst.put_u8(escape);
                dst.put_u8(byte ^ ESCAPE_XOR);
            }
            _ => dst.put_u8(byte),
        }
    }
    dst.put_u8(config.stop_marker);
    Ok(())
}

/// Parse a buffer that holds exactly one frame, markers included.
///
/// Missing markers, a dangling escape and frames too short to carry a
/// payload and trailer are reported as errors. A checksum mismatch is not.
pub fn parse_single_frame(raw: &[u8], config: &FrameConfig) -> Result<Frame> {
    parse_raw(Bytes::copy_from_slice(raw), config)
}

pub(crate) fn parse_raw(raw: Bytes, config: &FrameConfig) -> Result<Frame> {
    let min = config.min_frame_size();
    if raw.len() < 2 {
        return Err(FrameError::FrameTooShort {
            size: raw.len(),
            min,
        });
    }
    if raw[0] != config.start_marker {
        return Err(FrameError::MissingStartMarker {
            expected: config.start_marker,
        });
    }
    if raw[raw.len() - 1] != config.stop_marker {
        return Err(FrameError::MissingStopMarker {
            expected: config.stop_marker,
        });
    }

    let body = unstuff(&raw[1..raw.len() - 1], config.escape)?;
    if body.len() < 1 + config.checksum.trailer_len() {
        return Err(FrameError::FrameTooShort {
            size: raw.len(),
            min,
        });
    }

    let checked = config.checksum.split(&body)?;
    let checksum = checked.check;
    let payload_len = checked.payload.len();
    let payload = body.freeze().split_to(payload_len);

    Ok(Frame {
        raw,
        payload,
        checksum,
    })
}

fn unstuff(src: &[u8], escape: Option<u8>) -> Result<BytesMut> {
    let mut out = BytesMut::with_capacity(src.len());
    let Some(escape) = escape else {
        out.put_slice(src);
        return Ok(out);
    };

    let mut bytes = src.iter();
    while let Some(&byte) = bytes.next() {
        if byte == escape {
            let next = bytes.next().ok_or(FrameError::DanglingEscape)?;
            out.put_u8(next ^ ESCAPE_XOR);
        } else {
            out.put_u8(byte);
        }
    }
    Ok(out)
}
