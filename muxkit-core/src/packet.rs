//! Packet abstractions for encoded media data.
//!
//! A packet carries one encoded frame of a track through the muxing
//! pipeline. Timestamp assignment only touches the timing fields; the
//! payload is opaque to the timing subsystem.

use crate::timestamp::{Duration, Timestamp};
use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Flags for packet properties.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PacketFlags: u32 {
        /// This packet contains a keyframe.
        const KEYFRAME = 0x0001;
        /// Packet should be discarded.
        const DISCARD = 0x0002;
    }
}

/// An encoded media packet.
#[derive(Clone)]
pub struct Packet {
    /// The packet payload.
    data: Vec<u8>,
    /// Track this packet belongs to.
    pub track_id: i64,
    /// Presentation timestamp proposed by the original stream.
    pub pts: Timestamp,
    /// Frame duration proposed by the original stream; zero when the
    /// source did not supply one.
    pub duration: Duration,
    /// Presentation timestamp assigned by the timing subsystem.
    pub assigned_pts: Timestamp,
    /// Packet flags.
    pub flags: PacketFlags,
}

impl Packet {
    /// Create a new packet with the given payload.
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            track_id: 0,
            pts: Timestamp::NONE,
            duration: Duration::ZERO,
            assigned_pts: Timestamp::NONE,
            flags: PacketFlags::empty(),
        }
    }

    /// Create an empty packet.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Get the packet payload.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get the size of the payload.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Check if this is a keyframe packet.
    pub fn is_keyframe(&self) -> bool {
        self.flags.contains(PacketFlags::KEYFRAME)
    }

    /// Set the keyframe flag.
    pub fn set_keyframe(&mut self, keyframe: bool) {
        if keyframe {
            self.flags.insert(PacketFlags::KEYFRAME);
        } else {
            self.flags.remove(PacketFlags::KEYFRAME);
        }
    }

    /// Create a new packet with the specified track id.
    pub fn with_track_id(mut self, track_id: i64) -> Self {
        self.track_id = track_id;
        self
    }

    /// Create a new packet with the specified proposed timestamp.
    pub fn with_pts(mut self, pts: Timestamp) -> Self {
        self.pts = pts;
        self
    }

    /// Create a new packet with the specified proposed duration.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Create a new packet with the specified flags.
    pub fn with_flags(mut self, flags: PacketFlags) -> Self {
        self.flags = flags;
        self
    }
}

impl fmt::Debug for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Packet")
            .field("size", &self.size())
            .field("track_id", &self.track_id)
            .field("pts", &self.pts)
            .field("duration", &self.duration)
            .field("assigned_pts", &self.assigned_pts)
            .field("flags", &self.flags)
            .finish()
    }
}

impl Default for Packet {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packet_creation() {
        let packet = Packet::new(vec![0u8; 100]);
        assert_eq!(packet.size(), 100);
        assert!(!packet.pts.is_valid());
        assert!(!packet.assigned_pts.is_valid());
    }

    #[test]
    fn test_packet_keyframe() {
        let mut packet = Packet::empty();
        assert!(!packet.is_keyframe());
        packet.set_keyframe(true);
        assert!(packet.is_keyframe());
    }

    #[test]
    fn test_packet_builders() {
        let packet = Packet::empty()
            .with_track_id(3)
            .with_pts(Timestamp::from_ns(1_000))
            .with_duration(Duration::from_ns(40_000_000));
        assert_eq!(packet.track_id, 3);
        assert_eq!(packet.pts.as_ns(), 1_000);
        assert_eq!(packet.duration.as_ns(), 40_000_000);
    }
}
