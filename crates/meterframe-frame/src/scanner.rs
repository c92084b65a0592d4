//! Incremental frame delimiting over a live byte stream.
//!
//! The scanner holds at most `max_frame_size` bytes. A run that grows past
//! that without a STOP marker is discarded and the scanner waits for the next
//! START marker; there is no reliable resync point inside an overlong run.

use bytes::{BufMut, BytesMut};
use tracing::{debug, trace};

use crate::codec::{parse_raw, Frame, FrameConfig};

/// Scanner state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Buffer empty, waiting for a START marker.
    Idle,
    /// Inside a frame, waiting for the STOP marker.
    Accumulating,
}

/// Counters describing what the scanner has seen.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScannerStats {
    /// Frames handed to the caller.
    pub frames_emitted: u64,
    /// Runs dropped for exceeding the maximum frame size.
    pub overflows: u64,
    /// Delimited runs that could not be parsed into a frame.
    pub malformed: u64,
    /// Bytes seen outside any frame.
    pub bytes_ignored: u64,
}

/// Splits a byte stream into frames.
///
/// One scanner belongs to one byte source; it is not meant to be shared.
#[derive(Debug)]
pub struct StreamScanner {
    buf: BytesMut,
    config: FrameConfig,
    stats: ScannerStats,
}

impl Default for StreamScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamScanner {
    /// Create a scanner with default configuration.
    pub fn new() -> Self {
        Self::with_config(FrameConfig::default())
    }

    /// Create a scanner with explicit configuration.
    pub fn with_config(config: FrameConfig) -> Self {
        Self {
            buf: BytesMut::with_capacity(config.max_frame_size),
            config,
            stats: ScannerStats::default(),
        }
    }

    /// Feed `bytes` and return every frame completed by them.
    ///
    /// Frames are not retained between calls.
    pub fn process(&mut self, bytes: &[u8]) -> Vec<Frame> {
        bytes
            .iter()
            .filter_map(|byte| self.push_byte(*byte))
            .collect()
    }

    /// Feed a single byte.
    pub fn push_byte(&mut self, byte: u8) -> Option<Frame> {
        match self.state() {
            ScanState::Idle => {
                if byte == self.config.start_marker {
                    self.buf.put_u8(byte);
                } else {
                    self.stats.bytes_ignored += 1;
                }
                None
            }
            ScanState::Accumulating if byte == self.config.stop_marker => self.finish(byte),
            ScanState::Accumulating => {
                self.buf.put_u8(byte);
                if self.buf.len() >= self.config.max_frame_size {
                    debug!(
                        max = self.config.max_frame_size,
                        "no stop marker within maximum frame size, discarding run"
                    );
                    self.stats.overflows += 1;
                    self.buf.clear();
                }
                None
            }
        }
    }

    fn finish(&mut self, stop: u8) -> Option<Frame> {
        // Back-to-back flags: the second one opens the next frame.
        if self.buf.len() == 1 && self.config.start_marker == self.config.stop_marker {
            trace!("empty run between flags");
            return None;
        }

        self.buf.put_u8(stop);
        let raw = self.buf.split().freeze();

        match parse_raw(raw, &self.config) {
            Ok(frame) => {
                trace!(
                    size = frame.wire_size(),
                    valid = frame.is_valid(),
                    "frame delimited"
                );
                self.stats.frames_emitted += 1;
                Some(frame)
            }
            Err(err) => {
                debug!(error = %err, "dropping malformed frame");
                self.stats.malformed += 1;
                None
            }
        }
    }

    /// Current state.
    pub fn state(&self) -> ScanState {
        if self.buf.is_empty() {
            ScanState::Idle
        } else {
            ScanState::Accumulating
        }
    }

    /// Bytes buffered for the frame in progress.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Drop any partial frame and return to [`ScanState::Idle`].
    pub fn reset(&mut self) {
        self.buf.clear();
    }

    pub fn stats(&self) -> &ScannerStats {
        &self.stats
    }

    /// Current scanner configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;

    use super::*;
    use crate::checksum::ChecksumKind;
    use crate::codec::encode_frame;

    fn wire(payload: &[u8]) -> Vec<u8> {
        let mut buf = BytesMut::new();
        encode_frame(payload, &FrameConfig::default(), &mut buf).unwrap();
        buf.to_vec()
    }

    #[test]
    fn single_frame_in_one_call() {
        let mut scanner = StreamScanner::new();
        let frames = scanner.process(&wire(b"hello"));

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].payload.as_ref(), b"hello");
        assert!(frames[0].is_valid());
        assert_eq!(scanner.state(), ScanState::Idle);
    }

    #[test]
    fn frame_split_across_calls() {
        let bytes = wire(b"split");
        let mut scanner = StreamScanner::new();

        assert!(scanner.process(&bytes[..3]).is_empty());
        assert_eq!(scanner.state(), ScanState::Accumulating);

        let frames = scanner.process(&bytes[3..]);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].payload.as_ref(), b"split");
    }

    #[test]
    fn byte_by_byte_feed() {
        let bytes = wire(&[0x7E, 0x7D, 0x00]);
        let mut scanner = StreamScanner::new();

        let frames: Vec<Frame> = bytes.iter().filter_map(|b| scanner.push_byte(*b)).collect();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].payload.as_ref(), &[0x7E, 0x7D, 0x00]);
    }

    #[test]
    fn multiple_frames_and_noise() {
        let mut stream = vec![0x00, 0x11, 0x22];
        stream.extend(wire(b"one"));
        stream.extend([0x33, 0x44]);
        stream.extend(wire(b"two"));

        let mut scanner = StreamScanner::new();
        let frames = scanner.process(&stream);

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].payload.as_ref(), b"one");
        assert_eq!(frames[1].payload.as_ref(), b"two");
        assert_eq!(scanner.stats().bytes_ignored, 5);
        assert_eq!(scanner.stats().frames_emitted, 2);
    }

    #[test]
    fn frames_do_not_persist_across_calls() {
        let mut scanner = StreamScanner::new();
        assert_eq!(scanner.process(&wire(b"a")).len(), 1);
        assert!(scanner.process(&[]).is_empty());
        assert!(scanner.process(&[0x01, 0x02]).is_empty());
    }

    #[test]
    fn overflow_discards_run() {
        let mut scanner = StreamScanner::new();
        let mut stream = vec![0x7E];
        stream.extend(std::iter::repeat(0x00).take(256));

        assert!(scanner.process(&stream).is_empty());
        assert_eq!(scanner.state(), ScanState::Idle);
        assert_eq!(scanner.stats().overflows, 1);
    }

    #[test]
    fn overflow_then_recovers_on_next_frame() {
        let config = FrameConfig {
            max_frame_size: 16,
            ..FrameConfig::default()
        };
        let mut scanner = StreamScanner::with_config(config.clone());

        let mut stream = vec![0x7E];
        stream.extend([0xAA; 20]);
        let mut good = BytesMut::new();
        encode_frame(b"ok", &config, &mut good).unwrap();
        stream.extend_from_slice(&good);

        let frames = scanner.process(&stream);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].payload.as_ref(), b"ok");
    }

    #[test]
    fn frame_of_exactly_max_size_is_emitted() {
        let config = FrameConfig {
            max_frame_size: 8,
            ..FrameConfig::default()
        };
        let mut wire = BytesMut::new();
        encode_frame(&[1, 2, 3, 4], &config, &mut wire).unwrap();
        assert_eq!(wire.len(), 8);

        let mut scanner = StreamScanner::with_config(config);
        assert_eq!(scanner.process(&wire).len(), 1);
    }

    #[test]
    fn empty_input_is_idempotent() {
        let mut scanner = StreamScanner::new();
        assert!(scanner.process(&[]).is_empty());
        assert_eq!(scanner.state(), ScanState::Idle);

        scanner.process(&[0x7E, 0x01]);
        assert!(scanner.process(&[]).is_empty());
        assert_eq!(scanner.state(), ScanState::Accumulating);
        assert_eq!(scanner.buffered(), 2);
    }

    #[test]
    fn repeated_flags_open_next_frame() {
        let mut stream = vec![0x7E, 0x7E, 0x7E];
        stream.extend(&wire(b"fill")[1..]);

        let mut scanner = StreamScanner::new();
        let frames = scanner.process(&stream);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].payload.as_ref(), b"fill");
    }

    #[test]
    fn malformed_run_is_dropped_silently() {
        let mut scanner = StreamScanner::new();
        let frames = scanner.process(&[0x7E, 0x01, 0x7E]);

        assert!(frames.is_empty());
        assert_eq!(scanner.state(), ScanState::Idle);
        assert_eq!(scanner.stats().malformed, 1);
    }

    #[test]
    fn corrupted_frame_is_emitted_invalid() {
        let mut bytes = wire(b"data");
        bytes[2] ^= 0x01;

        let mut scanner = StreamScanner::new();
        let frames = scanner.process(&bytes);
        assert_eq!(frames.len(), 1);
        assert!(!frames[0].is_valid());
    }

    #[test]
    fn distinct_markers_and_lrc() {
        let config = FrameConfig {
            start_marker: 0x02,
            stop_marker: 0x03,
            escape: None,
            checksum: ChecksumKind::Lrc,
            ..FrameConfig::default()
        };
        let mut wire = BytesMut::new();
        encode_frame(b"ab", &config, &mut wire).unwrap();

        let mut stream = vec![0x03, 0x41];
        stream.extend_from_slice(&wire);

        let mut scanner = StreamScanner::with_config(config);
        let frames = scanner.process(&stream);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].payload.as_ref(), b"ab");
        assert!(frames[0].is_valid());
    }

    #[test]
    fn reset_returns_to_idle() {
        let mut scanner = StreamScanner::new();
        scanner.process(&[0x7E, 0x01, 0x02]);
        scanner.reset();
        assert_eq!(scanner.state(), ScanState::Idle);
        assert_eq!(scanner.buffered(), 0);
    }
}
