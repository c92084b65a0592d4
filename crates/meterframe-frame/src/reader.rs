use std::collections::VecDeque;
use std::io::{ErrorKind, Read};

use crate::codec::{Frame, FrameConfig};
use crate::error::{FrameError, Result};
use crate::scanner::{ScannerStats, StreamScanner};

/// Reads complete frames from any `Read` byte source.
///
/// Handles partial reads and inter-frame noise internally; callers always get
/// complete frames.
pub struct FrameReader<T> {
    inner: T,
    scanner: StreamScanner,
    pending: VecDeque<Frame>,
    chunk: Vec<u8>,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            chunk: vec![0u8; config.read_chunk_size.max(1)],
            scanner: StreamScanner::with_config(config),
            pending: VecDeque::new(),
        }
    }

    /// Read the next complete frame (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached. A
    /// partial frame buffered at EOF is discarded.
    pub fn read_frame(&mut self) -> Result<Frame> {
        loop {
            if let Some(frame) = self.pending.pop_front() {
                return Ok(frame);
            }

            let read = match self.inner.read(&mut self.chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                self.scanner.reset();
                return Err(FrameError::ConnectionClosed);
            }

            self.pending
                .extend(self.scanner.process(&self.chunk[..read]));
        }
    }

    /// Read frames until EOF, returning everything delimited so far.
    pub fn read_to_end(&mut self) -> Result<Vec<Frame>> {
        let mut frames = Vec::new();
        loop {
            match self.read_frame() {
                Ok(frame) => frames.push(frame),
                Err(FrameError::ConnectionClosed) => return Ok(frames),
                Err(err) => return Err(err),
            }
        }
    }

    /// Borrow the underlying source.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying source.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner source.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Scanner counters for this source.
    pub fn stats(&self) -> &ScannerStats {
        self.scanner.stats()
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        self.scanner.config()
    }
}
