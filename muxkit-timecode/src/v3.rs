//! Version 3 timecode files: a cumulative list of durations and gaps.
//!
//! Each `fps,duration[,gap]` line advances the timeline by exactly
//! `duration` nanoseconds. Ordinary entries correspond to one emitted
//! frame each; `gap` entries advance the clock without a frame and tell
//! the consumer to start a new contiguous segment.

use muxkit_core::{Packet, Timestamp};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, TimecodeError};
use crate::factory::FactoryContext;

/// One timeline entry of a v3 file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimecodeDuration {
    /// Nominal frame rate of the entry. Retained as metadata; the
    /// timeline advances by `duration` regardless.
    pub fps: f64,
    /// Elapsed nanoseconds contributed by this entry.
    pub duration: i64,
    /// Gap entries advance the clock without an emitted frame.
    pub is_gap: bool,
}

/// Factory backed by an ordered duration/gap list.
#[derive(Debug, Clone)]
pub(crate) struct DurationListFactory {
    entries: Vec<TimecodeDuration>,
    current: usize,
    current_pts: i64,
    last_duration: i64,
}

impl DurationListFactory {
    /// Parse the data lines following a v3 header.
    ///
    /// Like v2, malformed lines are fatal: each non-gap entry maps to one
    /// frame, so skipping would desynchronize the timeline.
    pub(crate) fn parse(ctx: &FactoryContext, lines: &[String], first_line: usize) -> Result<Self> {
        let mut entries = Vec::new();

        for (offset, raw) in lines.iter().enumerate() {
            let line_no = first_line + offset;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if line.starts_with("assume ") {
                // v1 leftover; the line format here already carries a rate.
                warn!(
                    file = %ctx.file_name,
                    track = ctx.track_id,
                    line = line_no,
                    "ignoring 'assume' directive in a v3 timecode file"
                );
                continue;
            }

            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            if fields.len() < 2 || fields.len() > 3 {
                return Err(TimecodeError::parse(
                    line_no,
                    format!("expected 'fps,duration[,gap]', got {line:?}"),
                ));
            }

            let fps: f64 = fields[0].parse().map_err(|_| {
                TimecodeError::parse(line_no, format!("invalid frame rate {:?}", fields[0]))
            })?;
            if fps <= 0.0 {
                return Err(TimecodeError::parse(
                    line_no,
                    format!("frame rate must be positive, got {fps}"),
                ));
            }

            let duration: i64 = fields[1].parse().map_err(|_| {
                TimecodeError::parse(line_no, format!("invalid duration {:?}", fields[1]))
            })?;
            if duration < 0 {
                return Err(TimecodeError::parse(
                    line_no,
                    format!("duration must not be negative, got {duration}"),
                ));
            }

            let is_gap = match fields.get(2).copied() {
                None | Some("") => false,
                Some("gap") => true,
                Some(other) => {
                    return Err(TimecodeError::parse(
                        line_no,
                        format!("unknown entry marker {other:?}"),
                    ));
                }
            };

            entries.push(TimecodeDuration {
                fps,
                duration,
                is_gap,
            });
        }

        Ok(Self {
            entries,
            current: 0,
            current_pts: 0,
            last_duration: 0,
        })
    }

    /// Assign the next frame's timestamp.
    ///
    /// Pending gap entries are consumed first; when any were, the return
    /// value is `true` and the consumer must break output continuity
    /// before writing this frame.
    pub(crate) fn get_next(&mut self, packet: &mut Packet) -> bool {
        let mut gap_consumed = false;
        while let Some(entry) = self.entries.get(self.current) {
            if !entry.is_gap {
                break;
            }
            self.current_pts += entry.duration;
            self.current += 1;
            gap_consumed = true;
        }

        packet.assigned_pts = Timestamp::from_ns(self.current_pts);
        match self.entries.get(self.current) {
            Some(entry) => {
                self.current_pts += entry.duration;
                self.last_duration = entry.duration;
                self.current += 1;
            }
            None => {
                // Past the authored timeline: keep spacing frames by the
                // proposal, or by the last authored duration.
                let spacing = if packet.duration.is_positive() {
                    packet.duration.as_ns()
                } else {
                    self.last_duration
                };
                self.current_pts += spacing;
            }
        }
        gap_consumed
    }
}
