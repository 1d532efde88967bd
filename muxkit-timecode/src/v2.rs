//! Version 2 timecode files: one explicit timestamp per frame.
//!
//! A v2 file lists the presentation timestamp of every frame on its own
//! line, in frame order. Integer values are nanoseconds; decimal values
//! are seconds and are normalized to nanoseconds. An optional
//! `default <duration>` directive declares the track's default frame
//! duration.

use muxkit_core::{Duration, Packet, Timestamp};
use tracing::warn;

use crate::error::{Result, TimecodeError};
use crate::factory::FactoryContext;

/// Factory backed by a flat, file-ordered timestamp table.
#[derive(Debug, Clone)]
pub(crate) struct ExplicitListFactory {
    timecodes: Vec<i64>,
    frameno: usize,
    last_pts: i64,
    default_duration: i64,
    warned_non_monotonic: bool,
}

/// Normalize a timestamp field to nanoseconds. Integers are taken as
/// nanoseconds, decimal values as seconds.
fn normalize_ns(field: &str) -> Option<i64> {
    if field.contains('.') {
        let seconds: f64 = field.parse().ok()?;
        Some((seconds * 1_000_000_000.0).round() as i64)
    } else {
        field.parse().ok()
    }
}

impl ExplicitListFactory {
    /// Parse the data lines following a v2 header.
    ///
    /// Unlike v1, a malformed line here is fatal: every line maps to one
    /// frame, so skipping would silently shift all later frames.
    pub(crate) fn parse(ctx: &FactoryContext, lines: &[String], first_line: usize) -> Result<Self> {
        let mut timecodes = Vec::new();
        let mut default_duration = 0_i64;
        let mut warned_non_monotonic = false;

        for (offset, raw) in lines.iter().enumerate() {
            let line_no = first_line + offset;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(rest) = line.strip_prefix("default ") {
                default_duration = normalize_ns(rest.trim()).ok_or_else(|| {
                    TimecodeError::parse(line_no, format!("invalid default duration {rest:?}"))
                })?;
                continue;
            }

            let pts = normalize_ns(line).ok_or_else(|| {
                TimecodeError::parse(line_no, format!("invalid timestamp {line:?}"))
            })?;

            if let Some(&prev) = timecodes.last() {
                if pts <= prev && !warned_non_monotonic {
                    // Tolerated, but reported once per file so broken
                    // authoring tools do not flood the log.
                    warn!(
                        file = %ctx.file_name,
                        source = %ctx.source_name,
                        track = ctx.track_id,
                        line = line_no,
                        "timestamp {pts} is not bigger than the previous one ({prev}); \
                         further non-monotonic timestamps in this file will not be reported"
                    );
                    warned_non_monotonic = true;
                }
            }
            timecodes.push(pts);
        }

        Ok(Self {
            timecodes,
            frameno: 0,
            last_pts: 0,
            default_duration,
            warned_non_monotonic,
        })
    }

    /// Assign the next frame's timestamp. Never signals a gap.
    ///
    /// Past the end of the table the timeline is extrapolated from the
    /// last assigned timestamp using the packet's proposed duration, or
    /// the declared default duration when the packet has none.
    pub(crate) fn get_next(&mut self, packet: &mut Packet) -> bool {
        let pts = match self.timecodes.get(self.frameno) {
            Some(&pts) => pts,
            None => {
                let spacing = if packet.duration.is_positive() {
                    packet.duration.as_ns()
                } else {
                    self.default_duration
                };
                self.last_pts + spacing
            }
        };
        packet.assigned_pts = Timestamp::from_ns(pts);
        self.last_pts = pts;
        self.frameno += 1;
        false
    }

    pub(crate) fn get_default_duration(&self, proposal: Duration) -> Duration {
        if self.default_duration != 0 {
            Duration::from_ns(self.default_duration)
        } else {
            proposal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> FactoryContext {
        FactoryContext {
            file_name: "test.tc".into(),
            source_name: "test".into(),
            track_id: 0,
        }
    }

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    fn assigned(factory: &mut ExplicitListFactory, packet: &mut Packet) -> i64 {
        assert!(!factory.get_next(packet));
        packet.assigned_pts.as_ns()
    }

    #[test]
    fn test_table_values_in_order() {
        let mut factory =
            ExplicitListFactory::parse(&ctx(), &lines("0\n40000000\n80000000"), 2).unwrap();
        let mut packet = Packet::empty();
        assert_eq!(assigned(&mut factory, &mut packet), 0);
        assert_eq!(assigned(&mut factory, &mut packet), 40_000_000);
        assert_eq!(assigned(&mut factory, &mut packet), 80_000_000);
    }

    #[test]
    fn test_decimal_seconds_are_normalized() {
        let mut factory = ExplicitListFactory::parse(&ctx(), &lines("0.0\n0.04"), 2).unwrap();
        let mut packet = Packet::empty();
        assert_eq!(assigned(&mut factory, &mut packet), 0);
        assert_eq!(assigned(&mut factory, &mut packet), 40_000_000);
    }

    #[test]
    fn test_extrapolation_past_table_end() {
        let mut factory = ExplicitListFactory::parse(&ctx(), &lines("0\n40000000"), 2).unwrap();
        let mut packet = Packet::empty().with_duration(Duration::from_ns(40_000_000));
        assert_eq!(assigned(&mut factory, &mut packet), 0);
        assert_eq!(assigned(&mut factory, &mut packet), 40_000_000);
        assert_eq!(assigned(&mut factory, &mut packet), 80_000_000);
        assert_eq!(assigned(&mut factory, &mut packet), 120_000_000);
    }

    #[test]
    fn test_extrapolation_uses_default_duration_fallback() {
        let mut factory =
            ExplicitListFactory::parse(&ctx(), &lines("default 25000000\n0"), 2).unwrap();
        let mut packet = Packet::empty();
        assert_eq!(assigned(&mut factory, &mut packet), 0);
        assert_eq!(assigned(&mut factory, &mut packet), 25_000_000);
    }

    #[test]
    fn test_non_monotonic_warns_once_only() {
        let mut factory =
            ExplicitListFactory::parse(&ctx(), &lines("0\n50\n40\n30"), 2).unwrap();
        assert!(factory.warned_non_monotonic);
        // Still consumable in file order.
        let mut packet = Packet::empty();
        assert_eq!(assigned(&mut factory, &mut packet), 0);
        assert_eq!(assigned(&mut factory, &mut packet), 50);
        assert_eq!(assigned(&mut factory, &mut packet), 40);
    }

    #[test]
    fn test_malformed_line_is_fatal() {
        let err = ExplicitListFactory::parse(&ctx(), &lines("0\nbogus"), 2).unwrap_err();
        assert!(matches!(err, TimecodeError::Parse { line: 3, .. }));
    }

    #[test]
    fn test_default_duration_query() {
        let factory =
            ExplicitListFactory::parse(&ctx(), &lines("default 40000000\n0"), 2).unwrap();
        assert_eq!(
            factory.get_default_duration(Duration::from_ns(7)),
            Duration::from_ns(40_000_000)
        );

        let factory = ExplicitListFactory::parse(&ctx(), &lines("0"), 2).unwrap();
        assert_eq!(
            factory.get_default_duration(Duration::from_ns(7)),
            Duration::from_ns(7)
        );
    }
}
