//! Checksum primitives and frame trailer handling.
//!
//! Three trailer families are in use on metering links:
//! - CRC-16/X-25 (2 bytes, big-endian), the default for radio frames
//! - CRC-32/IEEE 802.3 (4 bytes, big-endian)
//! - XOR LRC seeded with `0x55` (1 byte)

use bytes::{BufMut, Bytes, BytesMut};
use crc::{Crc, CRC_16_IBM_SDLC, CRC_32_ISO_HDLC};

use crate::error::{FrameError, Result};

/// CRC-16/X-25: reflected 0x1021, seed 0xFFFF, complemented output.
const X25: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_SDLC);

/// CRC-32/IEEE 802.3: reflected 0x04C11DB7 (0xEDB88320), seed and output complemented.
const IEEE: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// Default LRC seed.
pub const LRC_SEED: u8 = 0x55;

/// CRC-16/X-25 over `data`. The empty input yields `0x0000`.
pub fn crc16_x25(data: &[u8]) -> u16 {
    X25.checksum(data)
}

/// CRC-32/IEEE over `data`.
pub fn crc32_ieee(data: &[u8]) -> u32 {
    IEEE.checksum(data)
}

/// Running XOR of `data` starting from `initial`.
pub fn lrc(data: &[u8], initial: u8) -> u8 {
    data.iter().fold(initial, |acc, byte| acc ^ byte)
}

/// Trailer family appended to a frame payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ChecksumKind {
    #[default]
    Crc16,
    Crc32,
    Lrc,
}

impl ChecksumKind {
    /// Width of the trailer in bytes.
    pub fn trailer_len(self) -> usize {
        match self {
            Self::Crc16 => 2,
            Self::Crc32 => 4,
            Self::Lrc => 1,
        }
    }

    /// Compute the checksum of `data`, widened to `u32`.
    pub fn compute(self, data: &[u8]) -> u32 {
        match self {
            Self::Crc16 => u32::from(crc16_x25(data)),
            Self::Crc32 => crc32_ieee(data),
            Self::Lrc => u32::from(lrc(data, LRC_SEED)),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Crc16 => "crc16",
            Self::Crc32 => "crc32",
            Self::Lrc => "lrc",
        }
    }

    /// Write `payload` followed by its big-endian trailer into `dst`.
    ///
    /// An empty payload writes nothing: no trailer is ever attached to it.
    pub fn append(self, payload: &[u8], dst: &mut BytesMut) {
        if payload.is_empty() {
            return;
        }

        let value = self.compute(payload);
        dst.reserve(payload.len() + self.trailer_len());
        dst.put_slice(payload);
        match self {
            Self::Crc16 => dst.put_u16(value as u16),
            Self::Crc32 => dst.put_u32(value),
            Self::Lrc => dst.put_u8(value as u8),
        }
    }

    /// Split `bytes` into payload and trailer and check the trailer.
    ///
    /// A mismatch is not an error; it is reported through
    /// [`ChecksumCheck::is_valid`] and left to the caller's policy.
    pub fn split(self, bytes: &[u8]) -> Result<Checked<'_>> {
        let width = self.trailer_len();
        if bytes.len() < width {
            return Err(FrameError::FrameTooShort {
                size: bytes.len(),
                min: width,
            });
        }

        let (payload, trailer) = bytes.split_at(bytes.len() - width);
        let received = trailer
            .iter()
            .fold(0u32, |acc, byte| (acc << 8) | u32::from(*byte));

        Ok(Checked {
            payload,
            check: ChecksumCheck {
                kind: self,
                calculated: self.compute(payload),
                received,
            },
        })
    }
}

/// Calculated vs received trailer value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChecksumCheck {
    pub kind: ChecksumKind,
    pub calculated: u32,
    pub received: u32,
}

impl ChecksumCheck {
    pub fn is_valid(&self) -> bool {
        self.calculated == self.received
    }
}

/// A payload split off its trailer, borrowed from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checked<'a> {
    pub payload: &'a [u8],
    pub check: ChecksumCheck,
}

/// `payload ++ crc16_be(payload)`, or empty for an empty payload.
pub fn append_crc16(payload: &[u8]) -> Bytes {
    append_with(ChecksumKind::Crc16, payload)
}

/// `payload ++ crc32_be(payload)`, or empty for an empty payload.
pub fn append_crc32(payload: &[u8]) -> Bytes {
    append_with(ChecksumKind::Crc32, payload)
}

/// `payload ++ lrc(payload)`, or empty for an empty payload.
pub fn append_lrc(payload: &[u8]) -> Bytes {
    append_with(ChecksumKind::Lrc, payload)
}

/// Split the trailing CRC-16 off `bytes`.
pub fn parse_with_crc16(bytes: &[u8]) -> Result<Checked<'_>> {
    ChecksumKind::Crc16.split(bytes)
}

/// Split the trailing CRC-32 off `bytes`.
pub fn parse_with_crc32(bytes: &[u8]) -> Result<Checked<'_>> {
    ChecksumKind::Crc32.split(bytes)
}

/// Split the trailing LRC byte off `bytes`.
pub fn parse_with_lrc(bytes: &[u8]) -> Result<Checked<'_>> {
    ChecksumKind::Lrc.split(bytes)
}

fn append_with(kind: ChecksumKind, payload: &[u8]) -> Bytes {
    let mut dst = BytesMut::new();
    kind.append(payload, &mut dst);
    dst.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequence() -> Vec<u8> {
        (0x00..=0x0F).collect()
    }

    #[test]
    fn crc16_known_vectors() {
        assert_eq!(crc16_x25(&sequence()), 0x13E9);
        assert_eq!(crc16_x25(b"123456789"), 0x906E);
        assert_eq!(crc16_x25(&[]), 0x0000);
    }

    #[test]
    fn crc32_known_vectors() {
        assert_eq!(crc32_ieee(&sequence()), 0xCECE_E288);
        assert_eq!(crc32_ieee(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn lrc_known_vectors() {
        assert_eq!(lrc(&[], LRC_SEED), 0x55);

        let mut data = sequence();
        data.push(0x55);
        assert_eq!(lrc(&data, LRC_SEED), 0x00);
        assert_eq!(lrc(&[0xAA], 0x00), 0xAA);
    }

    #[test]
    fn append_crc16_is_big_endian() {
        let framed = append_crc16(&sequence());
        assert_eq!(framed.len(), 18);
        assert_eq!(&framed[16..], &[0x13, 0xE9]);
    }

    #[test]
    fn append_to_empty_payload_adds_no_trailer() {
        assert!(append_crc16(&[]).is_empty());
        assert!(append_crc32(&[]).is_empty());
        assert!(append_lrc(&[]).is_empty());
    }

    #[test]
    fn parse_with_crc16_reports_match() {
        let framed = append_crc16(b"meter");
        let checked = parse_with_crc16(&framed).unwrap();
        assert_eq!(checked.payload, b"meter");
        assert!(checked.check.is_valid());
    }

    #[test]
    fn parse_with_crc16_reports_mismatch_without_failing() {
        let mut framed = append_crc16(b"meter").to_vec();
        framed[0] ^= 0x01;

        let checked = parse_with_crc16(&framed).unwrap();
        assert!(!checked.check.is_valid());
        assert_eq!(checked.check.received, u32::from(crc16_x25(b"meter")));
        assert_eq!(checked.check.calculated, u32::from(crc16_x25(b"leter")));
    }

    #[test]
    fn parse_with_crc16_on_trailer_only() {
        let checked = parse_with_crc16(&[0x00, 0x00]).unwrap();
        assert!(checked.payload.is_empty());
        assert!(checked.check.is_valid());
    }

    #[test]
    fn parse_truncated_trailer_fails() {
        assert!(matches!(
            parse_with_crc16(&[0x01]),
            Err(FrameError::FrameTooShort { size: 1, min: 2 })
        ));
        assert!(matches!(
            parse_with_crc32(&[0x01, 0x02, 0x03]),
            Err(FrameError::FrameTooShort { size: 3, min: 4 })
        ));
        assert!(matches!(
            parse_with_lrc(&[]),
            Err(FrameError::FrameTooShort { size: 0, min: 1 })
        ));
    }

    #[test]
    fn crc32_and_lrc_trailers_validate() {
        let framed = append_crc32(b"payload");
        assert_eq!(framed.len(), 11);
        assert!(parse_with_crc32(&framed).unwrap().check.is_valid());

        let framed = append_lrc(b"payload");
        assert_eq!(framed.len(), 8);
        let checked = parse_with_lrc(&framed).unwrap();
        assert_eq!(checked.payload, b"payload");
        assert!(checked.check.is_valid());
    }
}
