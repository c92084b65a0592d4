//! `tokio_util::codec` adapter over [`StreamScanner`] and [`encode_frame`].

use std::collections::VecDeque;

use bytes::{Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{encode_frame, Frame, FrameConfig};
use crate::error::FrameError;
use crate::scanner::StreamScanner;

/// Frame codec for `FramedRead`/`FramedWrite`.
///
/// Every byte handed to `decode` is consumed by the scanner; frames beyond the
/// first are queued and returned by subsequent calls.
#[derive(Debug, Default)]
pub struct MeterCodec {
    scanner: StreamScanner,
    pending: VecDeque<Frame>,
}

impl MeterCodec {
    pub fn new(config: FrameConfig) -> Self {
        Self {
            scanner: StreamScanner::with_config(config),
            pending: VecDeque::new(),
        }
    }

    pub fn scanner(&self) -> &StreamScanner {
        &self.scanner
    }
}

impl Decoder for MeterCodec {
    type Item = Frame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, FrameError> {
        if !src.is_empty() {
            let chunk = src.split();
            self.pending.extend(self.scanner.process(&chunk));
        }
        Ok(self.pending.pop_front())
    }
}

impl Encoder<Bytes> for MeterCodec {
    type Error = FrameError;

    fn encode(&mut self, payload: Bytes, dst: &mut BytesMut) -> Result<(), FrameError> {
        encode_frame(&payload, self.scanner.config(), dst)
    }
}

impl Encoder<&[u8]> for MeterCodec {
    type Error = FrameError;

    fn encode(&mut self, payload: &[u8], dst: &mut BytesMut) -> Result<(), FrameError> {
        encode_frame(payload, self.scanner.config(), dst)
    }
}
