use crate::header::HeaderError;

/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The command header could not be encoded or decoded.
    #[error("header error: {0}")]
    Header(#[from] HeaderError),

    /// The buffer does not begin with the configured START marker.
    #[error("missing start marker (expected 0x{expected:02X})")]
    MissingStartMarker { expected: u8 },

    /// The buffer does not end with the configured STOP marker.
    #[error("missing stop marker (expected 0x{expected:02X})")]
    MissingStopMarker { expected: u8 },

    /// The frame is too short to hold its markers and checksum trailer.
    #[error("frame too short ({size} bytes, need at least {min})")]
    FrameTooShort { size: usize, min: usize },

    /// The frame ends in the middle of an escape sequence.
    #[error("dangling escape byte at end of frame")]
    DanglingEscape,

    /// Empty payloads carry no trailer and cannot be framed.
    #[error("cannot frame an empty payload")]
    EmptyPayload,

    /// The encoded frame exceeds the configured maximum size.
    #[error("frame too large ({size} bytes, max {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// A command body is shorter than its header declares.
    #[error("command 0x{id:04X} body truncated ({available} of {declared} bytes)")]
    TruncatedBody {
        id: u16,
        declared: usize,
        available: usize,
    },

    /// A command body is longer than a header can describe.
    #[error("command body too large ({size} bytes, max 255)")]
    BodyTooLarge { size: usize },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The byte source was closed before another complete frame was received.
    #[error("connection closed (no further frames)")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
