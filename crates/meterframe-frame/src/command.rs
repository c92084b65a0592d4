//! Slicing a frame payload into command records.
//!
//! A payload is a plain concatenation of `header | body` records. Per-command
//! body layouts are decoded elsewhere; this module only yields the id and the
//! undecoded body bytes.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};
use crate::header::{decode_header, encode_header, header_size_for, HeaderError, SHORT_FORM_MAX_SIZE};

/// One command record cut out of a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Command identifier.
    pub id: u16,
    /// Bytes taken by the header (1, 2 or 3).
    pub header_size: usize,
    /// Undecoded body; its length equals the declared size.
    pub body: Bytes,
}

impl Command {
    /// Build a record, checking that `id` and the body length can be encoded.
    pub fn new(id: u16, body: impl Into<Bytes>) -> Result<Self> {
        let body = body.into();
        let header_size = header_size_for(id)?;
        let size = u8::try_from(body.len()).map_err(|_| FrameError::BodyTooLarge { size: body.len() })?;
        if header_size == 1 && size > SHORT_FORM_MAX_SIZE {
            return Err(HeaderError::SizeTooLargeForShortForm { id, size }.into());
        }

        Ok(Self {
            id,
            header_size,
            body,
        })
    }

    /// Declared body size.
    pub fn size(&self) -> usize {
        self.body.len()
    }
}

/// Lazily yields command records from a payload.
///
/// Iteration stops after the first error.
#[derive(Debug, Clone)]
pub struct CommandIter {
    rest: Bytes,
    failed: bool,
}

impl CommandIter {
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            rest: payload.into(),
            failed: false,
        }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> &[u8] {
        &self.rest
    }

    fn next_record(&mut self) -> Result<Command> {
        let header = decode_header(&self.rest)?;
        let available = self.rest.len() - header.header_size;
        let declared = usize::from(header.body_size);

        if available < declared {
            return Err(FrameError::TruncatedBody {
                id: header.id,
                declared,
                available,
            });
        }

        let mut record = self.rest.split_to(header.record_size());
        let body = record.split_off(header.header_size);

        Ok(Command {
            id: header.id,
            header_size: header.header_size,
            body,
        })
    }
}

impl Iterator for CommandIter {
    type Item = Result<Command>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.rest.is_empty() {
            return None;
        }

        let item = self.next_record();
        if item.is_err() {
            self.failed = true;
        }
        Some(item)
    }
}

/// Decode every command record in `payload`.
pub fn decode_commands(payload: impl Into<Bytes>) -> Result<Vec<Command>> {
    CommandIter::new(payload).collect()
}

/// Encode one `header | body` record into `dst`.
pub fn encode_command(id: u16, body: &[u8], dst: &mut BytesMut) -> Result<()> {
    let size = u8::try_from(body.len()).map_err(|_| FrameError::BodyTooLarge { size: body.len() })?;
    encode_header(id, size, dst)?;
    dst.put_slice(body);
    Ok(())
}

/// Encode a sequence of commands back to back.
pub fn encode_commands<'a, I>(commands: I, dst: &mut BytesMut) -> Result<()>
where
    I: IntoIterator<Item = &'a Command>,
{
    for command in commands {
        encode_command(command.id, &command.body, dst)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slices_mixed_header_widths() {
        let mut buf = BytesMut::new();
        encode_command(0x40, &[0x01, 0x02], &mut buf).unwrap();
        encode_command(0x07, &[0xAA; 40], &mut buf).unwrap();
        encode_command(0x021F, &[], &mut buf).unwrap();

        let commands = decode_commands(buf.freeze()).unwrap();
        assert_eq!(commands.len(), 3);

        assert_eq!(commands[0].id, 0x40);
        assert_eq!(commands[0].header_size, 1);
        assert_eq!(commands[0].body.as_ref(), &[0x01, 0x02]);

        assert_eq!(commands[1].id, 0x07);
        assert_eq!(commands[1].size(), 40);

        assert_eq!(commands[2].id, 0x021F);
        assert_eq!(commands[2].header_size, 3);
        assert!(commands[2].body.is_empty());
    }

    #[test]
    fn empty_payload_has_no_commands() {
        assert!(decode_commands(Bytes::new()).unwrap().is_empty());
    }

    #[test]
    fn truncated_body_is_reported() {
        let err = decode_commands(Bytes::from_static(&[0x05, 0x04, 0x01, 0x02])).unwrap_err();
        assert!(matches!(
            err,
            FrameError::TruncatedBody {
                id: 0x05,
                declared: 4,
                available: 2
            }
        ));
    }

    #[test]
    fn truncated_header_is_reported() {
        let err = decode_commands(Bytes::from_static(&[0x41, 0xFF, 0x1F])).unwrap_err();
        assert!(matches!(
            err,
            FrameError::Header(HeaderError::Truncated {
                needed: 3,
                available: 1
            })
        ));
    }

    #[test]
    fn iterator_stops_after_error() {
        let mut iter = CommandIter::new(Bytes::from_static(&[0x21, 0x09, 0x05]));
        assert_eq!(iter.next().unwrap().unwrap().id, 0x20);
        assert!(iter.next().unwrap().is_err());
        assert!(iter.next().is_none());
        assert_eq!(iter.remaining(), &[0x05]);
    }

    #[test]
    fn body_over_255_bytes_rejected() {
        let mut buf = BytesMut::new();
        let err = encode_command(0x07, &[0u8; 256], &mut buf).unwrap_err();
        assert!(matches!(err, FrameError::BodyTooLarge { size: 256 }));
    }

    #[test]
    fn encode_commands_concatenates() {
        let commands = vec![
            Command::new(0x60, vec![0x01]).unwrap(),
            Command::new(0x0A, vec![0x02]).unwrap(),
        ];
        assert_eq!(commands[0].header_size, 1);
        assert_eq!(commands[1].header_size, 2);

        let mut buf = BytesMut::new();
        encode_commands(&commands, &mut buf).unwrap();
        assert_eq!(buf.as_ref(), &[0x61, 0x01, 0x0A, 0x01, 0x02]);
    }

    #[test]
    fn new_rejects_unencodable_records() {
        assert!(matches!(
            Command::new(0x25, vec![0x01]),
            Err(FrameError::Header(HeaderError::InvalidCommandId(0x25)))
        ));
        assert!(matches!(
            Command::new(0x60, vec![0u8; 32]),
            Err(FrameError::Header(HeaderError::SizeTooLargeForShortForm { id: 0x60, size: 32 }))
        ));
        assert!(matches!(
            Command::new(0x07, vec![0u8; 256]),
            Err(FrameError::BodyTooLarge { size: 256 })
        ));

        let command = Command::new(0x1F, vec![0xAA]).unwrap();
        assert_eq!(command.header_size, 3);
    }
}
