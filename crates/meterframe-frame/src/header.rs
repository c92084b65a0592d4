//! Variable-length command header.
//!
//! A command header packs a command id and a body size into 1, 2 or 3 bytes:
//!
//! ```text
//! short form    ┌─────────┬──────────┐
//! (1 byte)      │ id 7..5 │ size 4..0│          id ∈ {0x20, 0x40, .., 0xE0}, size ≤ 0x1F
//!               └─────────┴──────────┘
//! 2-byte form   ┌──────────────┬──────┐
//!               │ 000 id(4..0) │ size │         id ∈ 0x01..=0x1E
//!               └──────────────┴──────┘
//! extended form ┌──────┬─────────┬──────┐
//! (3 bytes)     │ 0x1F │ id >> 8 │ size │       id = 0xNN1F, including 0x001F
//!               └──────┴─────────┴──────┘
//! ```
//!
//! Extended ids always carry `0x1F` as their low byte; only the high byte
//! travels on the wire. A lone `0x1F` first byte always opens the extended
//! form, so id `0x1F` is written as `[0x1F, 0x00, size]`.

use bytes::{BufMut, BytesMut};

/// Largest body size expressible in the short form.
pub const SHORT_FORM_MAX_SIZE: u8 = 0x1F;

/// Low bits marking an extended header; also the fixed low byte of extended ids.
pub const EXTENDED_MARKER: u8 = 0x1F;

const SHORT_MASK: u8 = 0xE0;
const LOW_BITS: u8 = 0x1F;

/// Errors produced by the header codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HeaderError {
    /// Not enough bytes to decode the header.
    #[error("header truncated (need {needed} bytes, have {available})")]
    Truncated { needed: usize, available: usize },

    /// The body size does not fit the 5-bit size field of a short-form id.
    #[error("body size {size} too large for short-form command 0x{id:02X} (max 31)")]
    SizeTooLargeForShortForm { id: u16, size: u8 },

    /// The id has no header representation (zero, a short-form id above
    /// `0xE0`, or an extended id whose low byte is not `0x1F`).
    #[error("command id 0x{0:04X} cannot be encoded")]
    InvalidCommandId(u16),
}

/// A decoded command header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Bytes occupied by the header itself (1, 2 or 3).
    pub header_size: usize,
    /// Command identifier.
    pub id: u16,
    /// Declared body length in bytes.
    pub body_size: u8,
}

impl Header {
    /// Header plus declared body length.
    pub fn record_size(&self) -> usize {
        self.header_size + usize::from(self.body_size)
    }
}

/// Number of header bytes `id` needs, without validating the body size.
pub fn header_size_for(id: u16) -> Result<usize, HeaderError> {
    if id == 0 {
        return Err(HeaderError::InvalidCommandId(id));
    }
    if id & 0xFF == u16::from(EXTENDED_MARKER) {
        return Ok(3);
    }
    if id & u16::from(LOW_BITS) == 0 {
        if id > u16::from(SHORT_MASK) {
            return Err(HeaderError::InvalidCommandId(id));
        }
        return Ok(1);
    }
    if id > u16::from(LOW_BITS) {
        return Err(HeaderError::InvalidCommandId(id));
    }
    Ok(2)
}

/// Encode a command header into `dst`, returning the number of bytes written.
pub fn encode_header(id: u16, body_size: u8, dst: &mut BytesMut) -> Result<usize, HeaderError> {
    let width = header_size_for(id)?;
    dst.reserve(width);

    match width {
        1 => {
            if body_size > SHORT_FORM_MAX_SIZE {
                return Err(HeaderError::SizeTooLargeForShortForm { id, size: body_size });
            }
            dst.put_u8(id as u8 | body_size);
        }
        3 => {
            dst.put_u8(EXTENDED_MARKER);
            dst.put_u8((id >> 8) as u8);
            dst.put_u8(body_size);
        }
        _ => {
            dst.put_u8(id as u8);
            dst.put_u8(body_size);
        }
    }

    Ok(width)
}

/// Decode the header at the start of `src`.
///
/// A first byte with any of the top three bits set is a complete short-form
/// header; its low five bits are the body size.
pub fn decode_header(src: &[u8]) -> Result<Header, HeaderError> {
    let Some(&first) = src.first() else {
        return Err(HeaderError::Truncated {
            needed: 1,
            available: 0,
        });
    };

    let short = first & SHORT_MASK;
    let low = first & LOW_BITS;

    if short != 0 {
        return Ok(Header {
            header_size: 1,
            id: u16::from(short),
            body_size: low,
        });
    }

    if low == EXTENDED_MARKER {
        require(src, 3)?;
        return Ok(Header {
            header_size: 3,
            id: (u16::from(src[1]) << 8) | u16::from(EXTENDED_MARKER),
            body_size: src[2],
        });
    }

    require(src, 2)?;
    Ok(Header {
        header_size: 2,
        id: u16::from(low),
        body_size: src[1],
    })
}

fn require(src: &[u8], needed: usize) -> Result<(), HeaderError> {
    if src.len() < needed {
        return Err(HeaderError::Truncated {
            needed,
            available: src.len(),
        });
    }
    Ok(())
}
