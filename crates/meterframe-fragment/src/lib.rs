//! Session-aware reassembly of segmented meter transfers.
//!
//! Both transfer families in use (generic data segments and meter-command
//! fragments) run through the same [`Reassembler`], parameterized by the
//! [`Fragment`] trait.
//!
//! ```
//! use meterframe_fragment::{DataSegment, Reassembler};
//!
//! let mut reassembler = Reassembler::default();
//! let segments = DataSegment::split(b"reading", 0x2A, 3).unwrap();
//!
//! let mut payload = None;
//! for segment in segments.into_iter().rev() {
//!     payload = reassembler.push(segment);
//! }
//! assert_eq!(payload.as_deref(), Some(&b"reading"[..]));
//! ```

pub mod command_fragment;
pub mod error;
pub mod fragment;
pub mod reassembler;
pub mod segment;

pub use command_fragment::{CommandFragment, FRAGMENT_HEADER_SIZE, MAX_FRAGMENTS};
pub use error::{FragmentError, Result};
pub use fragment::Fragment;
pub use reassembler::{Reassembler, ReassemblerConfig, ReassemblerStats, ResetReason};
pub use segment::{DataSegment, MAX_SEGMENTS, SEGMENT_HEADER_SIZE};
