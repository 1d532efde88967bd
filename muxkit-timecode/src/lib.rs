//! External Timecode Handling for muxkit
//!
//! This crate turns externally authored timing (a timecode file in one of
//! three versioned text formats, or a forced constant duration) into exact
//! nanosecond presentation timestamps for a track's frame stream during
//! multiplexing.
//!
//! Supported inputs:
//!
//! - **v1**: `start,end,fps` frame ranges with a declared default rate
//! - **v2**: one explicit timestamp per frame
//! - **v3**: cumulative `fps,duration[,gap]` entries, the only format that
//!   can express timeline discontinuities
//! - **forced**: no file, a nominal duration adjusted by a rational
//!   sync-correction factor
//!
//! # Quick Start
//!
//! ```rust
//! use std::io::Cursor;
//! use muxkit_core::Packet;
//! use muxkit_timecode::TimecodeFactory;
//!
//! let file = "# timecode format v2\n0\n40000000\n80000000\n";
//! let mut factory =
//!     TimecodeFactory::from_reader(Cursor::new(file), "a.tc", "reader", 1).unwrap();
//!
//! let mut packet = Packet::empty();
//! let gap_follows = factory.get_next(&mut packet);
//! assert!(!gap_follows);
//! assert_eq!(packet.assigned_pts.as_ns(), 0);
//!
//! factory.get_next(&mut packet);
//! assert_eq!(packet.assigned_pts.as_ns(), 40_000_000);
//! ```
//!
//! # Gaps
//!
//! A v3 file can advance the timeline without emitting a frame. Consumers
//! check [`TimecodeFactory::contains_gap`] once at track setup; when it is
//! true, the flag returned by every `get_next` call tells them to close
//! the current output segment before writing the frame:
//!
//! ```rust
//! use std::io::Cursor;
//! use muxkit_core::Packet;
//! use muxkit_timecode::TimecodeFactory;
//!
//! let file = "# timecode format v3\n25,1000000,\n25,500000,gap\n25,1000000,\n";
//! let mut factory =
//!     TimecodeFactory::from_reader(Cursor::new(file), "b.tc", "reader", 1).unwrap();
//! assert!(factory.contains_gap());
//!
//! let mut packet = Packet::empty();
//! assert!(!factory.get_next(&mut packet));
//! assert_eq!(packet.assigned_pts.as_ns(), 0);
//!
//! // The 500us gap is consumed internally and reported here.
//! assert!(factory.get_next(&mut packet));
//! assert_eq!(packet.assigned_pts.as_ns(), 1_500_000);
//! ```
//!
//! # Forced durations
//!
//! ```rust
//! use muxkit_core::{Duration, Packet, Rational};
//! use muxkit_timecode::TimecodeFactory;
//!
//! // 25 fps nominal, NTSC 1001/1000 pulldown correction.
//! let mut factory = TimecodeFactory::create_forced(
//!     Duration::from_ns(40_000_000),
//!     Rational::new(1001, 1000),
//!     "reader",
//!     1,
//! );
//! assert_eq!(
//!     factory.get_default_duration(Duration::ZERO),
//!     Duration::from_ns(40_040_000)
//! );
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(missing_docs)]

pub mod error;
mod factory;
mod forced;
mod v1;
mod v2;
mod v3;

pub use error::{Result, TimecodeError};
pub use factory::{FormatVersion, TimecodeFactory};
pub use v1::TimecodeRange;
pub use v3::TimecodeDuration;
