//! Fixed-duration timestamp generation without a backing file.
//!
//! Used when a track has a sync correction but no external timecode
//! file: frames are spaced by a constant, correction-adjusted duration,
//! so the consumer never needs to special-case the absence of a file.

use muxkit_core::{Duration, Packet, Rational, Timestamp};

/// Factory that spaces every frame by one fixed duration.
#[derive(Debug, Clone)]
pub(crate) struct FixedDurationFactory {
    duration: i64,
    current_pts: i64,
}

impl FixedDurationFactory {
    /// Build from a nominal frame duration and a sync-correction factor.
    ///
    /// The corrected duration is `round(nominal * factor)` computed in
    /// integer arithmetic.
    pub(crate) fn new(default_duration: Duration, sync: Rational) -> Self {
        Self {
            duration: sync.scale_round(default_duration.as_ns()),
            current_pts: 0,
        }
    }

    /// Assign the next frame's timestamp. Never signals a gap.
    pub(crate) fn get_next(&mut self, packet: &mut Packet) -> bool {
        packet.assigned_pts = Timestamp::from_ns(self.current_pts);
        self.current_pts += self.duration;
        false
    }

    /// The corrected per-frame duration, regardless of any proposal.
    pub(crate) fn get_default_duration(&self) -> Duration {
        Duration::from_ns(self.duration)
    }
}
