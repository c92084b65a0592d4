//! Generic data-segment transfer.
//!
//! ```text
//! ┌────────────┬──────────────────────────────────────┬──────────┐
//! │ session u8 │ flags: last(7) count(6..4) index(2..0)│ data …   │
//! └────────────┴──────────────────────────────────────┴──────────┘
//! ```
//!
//! Bit 3 of the flag byte is reserved and written as zero.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::Result;
use crate::fragment::{check_range, chunks, require, Fragment};

/// Header bytes before the segment data.
pub const SEGMENT_HEADER_SIZE: usize = 2;

/// Largest segment index and count (3-bit fields).
pub const MAX_SEGMENTS: usize = 0x07;

const INDEX_MASK: u8 = 0x07;
const COUNT_SHIFT: u8 = 4;
const LAST_FLAG: u8 = 0x80;

/// One segment of a data-segment transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSegment {
    pub session_id: u8,
    /// 1-based segment index.
    pub index: u8,
    pub count: u8,
    pub is_last: bool,
    pub data: Bytes,
}

impl DataSegment {
    /// Decode a segment from a command body.
    pub fn decode(body: &[u8]) -> Result<Self> {
        require(body, SEGMENT_HEADER_SIZE)?;
        let flags = body[1];

        Ok(Self {
            session_id: body[0],
            index: flags & INDEX_MASK,
            count: (flags >> COUNT_SHIFT) & INDEX_MASK,
            is_last: flags & LAST_FLAG != 0,
            data: Bytes::copy_from_slice(&body[SEGMENT_HEADER_SIZE..]),
        })
    }

    /// Encode the segment as a command body.
    pub fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        check_range("index", usize::from(self.index), MAX_SEGMENTS)?;
        check_range("count", usize::from(self.count), MAX_SEGMENTS)?;

        let mut flags = self.index | (self.count << COUNT_SHIFT);
        if self.is_last {
            flags |= LAST_FLAG;
        }

        dst.reserve(SEGMENT_HEADER_SIZE + self.data.len());
        dst.put_u8(self.session_id);
        dst.put_u8(flags);
        dst.put_slice(&self.data);
        Ok(())
    }

    /// Split `payload` into segments carrying at most `max_chunk` bytes each.
    pub fn split(payload: &[u8], session_id: u8, max_chunk: usize) -> Result<Vec<Self>> {
        Ok(chunks(payload, max_chunk, MAX_SEGMENTS)?
            .into_iter()
            .map(|(index, count, chunk)| Self {
                session_id,
                index: index as u8,
                count: count as u8,
                is_last: index == count,
                data: Bytes::copy_from_slice(chunk),
            })
            .collect())
    }
}

impl Fragment for DataSegment {
    type SessionId = u8;

    fn session_id(&self) -> u8 {
        self.session_id
    }

    fn ordinal(&self) -> u32 {
        u32::from(self.index)
    }

    fn count(&self) -> u32 {
        u32::from(self.count)
    }

    fn is_last(&self) -> bool {
        self.is_last
    }

    fn data(&self) -> &[u8] {
        &self.data
    }
}
