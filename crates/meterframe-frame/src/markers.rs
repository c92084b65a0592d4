//! Built-in framing bytes.
//!
//! The defaults follow the HDLC convention used on the meter serial and
//! radio links: the same flag byte opens and closes a frame, and an escape
//! byte keeps flag values out of the frame body.

/// Frame START marker.
pub const START: u8 = 0x7E;

/// Frame STOP marker.
pub const STOP: u8 = 0x7E;

/// Escape byte introducing a transposed data byte.
pub const ESCAPE: u8 = 0x7D;

/// Value XOR-ed into an escaped byte.
pub const ESCAPE_XOR: u8 = 0x20;

/// Returns true if `byte` must be escaped inside a frame using these markers.
pub fn needs_escape(byte: u8, start: u8, stop: u8, escape: u8) -> bool {
    byte == start || byte == stop || byte == escape
}
