//! Framing, command headers and fragment reassembly for metering device links.
//!
//! meterframe decodes the binary traffic exchanged with gas, water and
//! electricity meters over constrained links such as LoRaWAN.
//!
//! # Crate Structure
//!
//! - [`frame`] — Checksums, command headers, frame delimiting and stream scanning
//! - [`fragment`] — Session-aware reassembly of segmented transfers
//!
//! # Pipeline
//!
//! ```
//! use meterframe::fragment::{DataSegment, Reassembler};
//! use meterframe::frame::{decode_commands, StreamScanner};
//!
//! # let wire: Vec<u8> = Vec::new();
//! let mut scanner = StreamScanner::new();
//! let mut reassembler = Reassembler::<DataSegment>::default();
//!
//! for frame in scanner.process(&wire) {
//!     if !frame.is_valid() {
//!         continue;
//!     }
//!     for command in decode_commands(frame.payload.clone()).unwrap_or_default() {
//!         if let Ok(segment) = DataSegment::decode(&command.body) {
//!             if let Some(payload) = reassembler.push(segment) {
//!                 println!("reassembled {} bytes", payload.len());
//!             }
//!         }
//!     }
//! }
//! ```

/// Re-export frame types.
pub mod frame {
    pub use meterframe_frame::*;
}

/// Re-export fragment types.
pub mod fragment {
    pub use meterframe_fragment::*;
}
