//! Nanosecond timestamp and duration handling.
//!
//! Presentation timestamps in muxkit are integer nanoseconds. Frame rates
//! arrive as floating point values, but once a timestamp is computed it is
//! stored and compared exactly.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub};

/// Nanoseconds per second.
pub const NS_PER_SECOND: i64 = 1_000_000_000;

/// A presentation timestamp in nanoseconds.
///
/// `Timestamp::NONE` marks a timestamp that has not been assigned yet; it
/// sorts before every valid timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Sentinel for an unassigned timestamp.
    pub const NONE: Timestamp = Timestamp(i64::MIN);

    /// Timestamp zero.
    pub const ZERO: Timestamp = Timestamp(0);

    /// Create a timestamp from nanoseconds.
    pub const fn from_ns(ns: i64) -> Self {
        Self(ns)
    }

    /// Get the raw nanosecond value.
    pub const fn as_ns(&self) -> i64 {
        self.0
    }

    /// Check if this timestamp is assigned.
    pub fn is_valid(&self) -> bool {
        self.0 != i64::MIN
    }

    /// Create a timestamp from seconds, rounding to the nearest nanosecond.
    pub fn from_seconds(seconds: f64) -> Self {
        Self((seconds * NS_PER_SECOND as f64).round() as i64)
    }

    /// Convert to seconds, or `None` for an unassigned timestamp.
    pub fn to_seconds(&self) -> Option<f64> {
        self.is_valid().then(|| self.0 as f64 / NS_PER_SECOND as f64)
    }

    /// Create a timestamp from milliseconds.
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis * 1_000_000)
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::NONE
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_seconds() {
            Some(secs) => {
                let sign = if secs < 0.0 { "-" } else { "" };
                let secs = secs.abs();
                let hours = (secs / 3600.0) as u32;
                let mins = ((secs % 3600.0) / 60.0) as u32;
                let secs = secs % 60.0;
                write!(f, "{}{:02}:{:02}:{:06.3}", sign, hours, mins, secs)
            }
            None => write!(f, "NONE"),
        }
    }
}

/// A span of time in nanoseconds.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Duration(i64);

impl Duration {
    /// The zero duration.
    pub const ZERO: Duration = Duration(0);

    /// Create a duration from nanoseconds.
    pub const fn from_ns(ns: i64) -> Self {
        Self(ns)
    }

    /// Get the raw nanosecond value.
    pub const fn as_ns(&self) -> i64 {
        self.0
    }

    /// Check if this duration is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Check if this duration is a usable frame spacing (strictly positive).
    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Create a duration from seconds, rounding to the nearest nanosecond.
    pub fn from_seconds(seconds: f64) -> Self {
        Self((seconds * NS_PER_SECOND as f64).round() as i64)
    }

    /// Convert to seconds.
    pub fn to_seconds(&self) -> f64 {
        self.0 as f64 / NS_PER_SECOND as f64
    }

    /// The spacing of one frame at the given rate, rounded to nanoseconds.
    ///
    /// Returns `None` for non-positive rates.
    pub fn from_fps(fps: f64) -> Option<Self> {
        (fps > 0.0).then(|| Self((NS_PER_SECOND as f64 / fps).round() as i64))
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ns", self.0)
    }
}

impl Add for Duration {
    type Output = Duration;

    fn add(self, rhs: Self) -> Self::Output {
        Duration(self.0 + rhs.0)
    }
}

impl Sub for Duration {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Self::Output {
        Duration(self.0 - rhs.0)
    }
}

impl Add<Duration> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: Duration) -> Self::Output {
        if !self.is_valid() {
            return self;
        }
        Timestamp(self.0 + rhs.0)
    }
}

impl AddAssign<Duration> for Timestamp {
    fn add_assign(&mut self, rhs: Duration) {
        *self = *self + rhs;
    }
}

impl Sub for Timestamp {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Self::Output {
        if !self.is_valid() || !rhs.is_valid() {
            return Duration::ZERO;
        }
        Duration(self.0 - rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_sorts_first() {
        assert!(Timestamp::NONE < Timestamp::from_ns(i64::MIN + 1));
        assert!(Timestamp::NONE < Timestamp::ZERO);
    }

    #[test]
    fn test_from_seconds_rounds() {
        assert_eq!(Timestamp::from_seconds(0.04).as_ns(), 40_000_000);
        assert_eq!(Duration::from_seconds(1.0 / 3.0).as_ns(), 333_333_333);
    }

    #[test]
    fn test_from_fps() {
        assert_eq!(Duration::from_fps(25.0), Some(Duration::from_ns(40_000_000)));
        assert_eq!(
            Duration::from_fps(30000.0 / 1001.0),
            Some(Duration::from_ns(33_366_667))
        );
        assert_eq!(Duration::from_fps(0.0), None);
        assert_eq!(Duration::from_fps(-24.0), None);
    }

    #[test]
    fn test_timestamp_arithmetic() {
        let ts = Timestamp::from_ns(1_000) + Duration::from_ns(500);
        assert_eq!(ts.as_ns(), 1_500);
        assert_eq!(ts - Timestamp::from_ns(1_000), Duration::from_ns(500));

        // NONE is absorbing
        assert_eq!(Timestamp::NONE + Duration::from_ns(500), Timestamp::NONE);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            format!("{}", Timestamp::from_millis(3_723_500)),
            "01:02:03.500"
        );
        assert_eq!(format!("{}", Timestamp::NONE), "NONE");
    }
}
