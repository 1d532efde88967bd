//! # muxkit Core
//!
//! Core types shared across the muxkit multiplexing components:
//! - Error handling types
//! - Nanosecond timestamp and duration arithmetic
//! - Rational numbers for frame rates and sync-correction factors
//! - The packet abstraction whose timing fields the muxer assigns

pub mod error;
pub mod packet;
pub mod rational;
pub mod timestamp;

pub use error::{Error, Result};
pub use packet::{Packet, PacketFlags};
pub use rational::Rational;
pub use timestamp::{Duration, Timestamp};
