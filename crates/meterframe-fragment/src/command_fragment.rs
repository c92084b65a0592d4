//! Meter-command fragment transfer.
//!
//! ```text
//! ┌────────────────┬──────────┬──────────────────────┬──────────┐
//! │ session u16 LE │ index u8 │ last(7) count(6..0)  │ data …   │
//! └────────────────┴──────────┴──────────────────────┴──────────┘
//! ```

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::Result;
use crate::fragment::{check_range, chunks, require, Fragment};

/// Header bytes before the fragment data.
pub const FRAGMENT_HEADER_SIZE: usize = 4;

/// Largest fragment count (7-bit field).
pub const MAX_FRAGMENTS: usize = 0x7F;

const COUNT_MASK: u8 = 0x7F;
const LAST_FLAG: u8 = 0x80;

/// One fragment of a meter command transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFragment {
    pub session_id: u16,
    /// 1-based fragment index.
    pub index: u8,
    pub count: u8,
    pub is_last: bool,
    pub data: Bytes,
}

impl CommandFragment {
    /// Decode a fragment from a command body.
    pub fn decode(body: &[u8]) -> Result<Self> {
        require(body, FRAGMENT_HEADER_SIZE)?;

        Ok(Self {
            session_id: u16::from_le_bytes([body[0], body[1]]),
            index: body[2],
            count: body[3] & COUNT_MASK,
            is_last: body[3] & LAST_FLAG != 0,
            data: Bytes::copy_from_slice(&body[FRAGMENT_HEADER_SIZE..]),
        })
    }

    /// Encode the fragment as a command body.
    pub fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        check_range("count", usize::from(self.count), MAX_FRAGMENTS)?;

        let mut tail = self.count;
        if self.is_last {
            tail |= LAST_FLAG;
        }

        dst.reserve(FRAGMENT_HEADER_SIZE + self.data.len());
        dst.put_u16_le(self.session_id);
        dst.put_u8(self.index);
        dst.put_u8(tail);
        dst.put_slice(&self.data);
        Ok(())
    }

    /// Split `payload` into fragments carrying at most `max_chunk` bytes each.
    pub fn split(payload: &[u8], session_id: u16, max_chunk: usize) -> Result<Vec<Self>> {
        Ok(chunks(payload, max_chunk, MAX_FRAGMENTS)?
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

impl Fragment for CommandFragment {
    type SessionId = u16;

    fn session_id(&self) -> u16 {
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
