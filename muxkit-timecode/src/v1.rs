//! Version 1 timecode files: frame-index ranges with constant rates.
//!
//! A v1 file declares a default frame rate with an `assume` line and then
//! lists `start,end,fps` ranges. Frames outside every range run at the
//! default rate, continuing linearly from the nearest range boundary.

use muxkit_core::{Duration, Packet, Timestamp};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, TimecodeError};
use crate::factory::FactoryContext;

/// One contiguous stretch of frames running at a constant rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimecodeRange {
    /// First frame covered by this range (inclusive).
    pub start_frame: u64,
    /// Last frame covered by this range (inclusive).
    pub end_frame: u64,
    /// Frame rate within the range.
    pub fps: f64,
    /// Presentation timestamp of `start_frame` in nanoseconds.
    pub base_pts: i64,
}

/// Factory backed by a sorted table of [`TimecodeRange`] entries.
#[derive(Debug, Clone)]
pub(crate) struct RangeListFactory {
    ranges: Vec<TimecodeRange>,
    current_range: usize,
    frameno: u64,
    default_fps: f64,
}

/// Elapsed nanoseconds for `frames` frames at `fps`, rounded.
fn frame_span_ns(frames: u64, fps: f64) -> i64 {
    (frames as f64 / fps * 1_000_000_000.0).round() as i64
}

impl RangeListFactory {
    /// Parse the data lines following a v1 header.
    ///
    /// `first_line` is the one-based file line number of `lines[0]`, used
    /// for diagnostics. Malformed range lines are skipped with a warning;
    /// overlapping ranges are a hard parse error.
    pub(crate) fn parse(ctx: &FactoryContext, lines: &[String], first_line: usize) -> Result<Self> {
        let mut default_fps = 0.0_f64;
        // (range, has explicit base, source line)
        let mut parsed: Vec<(TimecodeRange, bool, usize)> = Vec::new();

        for (offset, raw) in lines.iter().enumerate() {
            let line_no = first_line + offset;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(rest) = line.strip_prefix("assume ") {
                let fps: f64 = rest.trim().parse().map_err(|_| {
                    TimecodeError::parse(line_no, format!("invalid default frame rate {rest:?}"))
                })?;
                if fps <= 0.0 {
                    return Err(TimecodeError::parse(
                        line_no,
                        format!("default frame rate must be positive, got {fps}"),
                    ));
                }
                default_fps = fps;
                continue;
            }

            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            match Self::parse_range(&fields) {
                Some((range, has_base)) => parsed.push((range, has_base, line_no)),
                None => {
                    warn!(
                        file = %ctx.file_name,
                        track = ctx.track_id,
                        line = line_no,
                        "skipping malformed timecode range line {line:?}"
                    );
                }
            }
        }

        parsed.sort_by_key(|(range, _, _)| range.start_frame);

        for pair in parsed.windows(2) {
            let (prev, _, _) = pair[0];
            let (next, _, line_no) = pair[1];
            if next.start_frame <= prev.end_frame {
                return Err(TimecodeError::parse(
                    line_no,
                    format!(
                        "range starting at frame {} overlaps the range ending at frame {}",
                        next.start_frame, prev.end_frame
                    ),
                ));
            }
        }

        let ranges = Self::accumulate_bases(parsed, default_fps);
        if ranges.is_empty() {
            debug!(
                file = %ctx.file_name,
                track = ctx.track_id,
                "v1 timecode file contains no usable ranges, passing proposals through"
            );
        }

        Ok(Self {
            ranges,
            current_range: 0,
            frameno: 0,
            default_fps,
        })
    }

    fn parse_range(fields: &[&str]) -> Option<(TimecodeRange, bool)> {
        if fields.len() < 3 || fields.len() > 4 {
            return None;
        }
        let start_frame: u64 = fields[0].parse().ok()?;
        let end_frame: u64 = fields[1].parse().ok()?;
        let fps: f64 = fields[2].parse().ok()?;
        if start_frame > end_frame || fps <= 0.0 {
            return None;
        }
        let (base_pts, has_base) = match fields.get(3) {
            Some(f) => (f.parse().ok()?, true),
            None => (0, false),
        };
        Some((
            TimecodeRange {
                start_frame,
                end_frame,
                fps,
                base_pts,
            },
            has_base,
        ))
    }

    /// Assign base timestamps cumulatively. Stretches between ranges (and
    /// before the first) elapse at the default rate, or at the upcoming
    /// range's rate when no default was declared.
    fn accumulate_bases(
        parsed: Vec<(TimecodeRange, bool, usize)>,
        default_fps: f64,
    ) -> Vec<TimecodeRange> {
        let mut pts: i64 = 0;
        let mut next_frame: u64 = 0;
        let mut ranges = Vec::with_capacity(parsed.len());

        for (mut range, has_base, _) in parsed {
            if range.start_frame > next_frame {
                let filler_fps = if default_fps > 0.0 { default_fps } else { range.fps };
                pts += frame_span_ns(range.start_frame - next_frame, filler_fps);
            }
            if has_base {
                pts = range.base_pts;
            } else {
                range.base_pts = pts;
            }
            pts = range.base_pts
                + frame_span_ns(range.end_frame - range.start_frame + 1, range.fps);
            next_frame = range.end_frame + 1;
            ranges.push(range);
        }

        ranges
    }

    /// Assign the next frame's timestamp. Never signals a gap.
    pub(crate) fn get_next(&mut self, packet: &mut Packet) -> bool {
        packet.assigned_pts = match self.pts_at(self.frameno) {
            Some(ns) => Timestamp::from_ns(ns),
            // Empty table: pass the proposed timestamp through.
            None => packet.pts,
        };
        self.frameno += 1;
        false
    }

    fn pts_at(&mut self, frame: u64) -> Option<i64> {
        if self.ranges.is_empty() {
            return None;
        }
        while self.current_range + 1 < self.ranges.len()
            && frame > self.ranges[self.current_range].end_frame
        {
            self.current_range += 1;
        }
        let range = self.ranges[self.current_range];

        if frame >= range.start_frame && frame <= range.end_frame {
            return Some(range.base_pts + frame_span_ns(frame - range.start_frame, range.fps));
        }

        let fallback = self.fallback_fps(range.fps);
        if frame < range.start_frame {
            // Uncovered stretch before the cursor's range: count back from
            // its base at the fallback rate.
            return Some(range.base_pts - frame_span_ns(range.start_frame - frame, fallback));
        }

        // Past the last range.
        let end_pts =
            range.base_pts + frame_span_ns(range.end_frame - range.start_frame + 1, range.fps);
        Some(end_pts + frame_span_ns(frame - range.end_frame - 1, fallback))
    }

    fn fallback_fps(&self, neighbor_fps: f64) -> f64 {
        if self.default_fps > 0.0 {
            self.default_fps
        } else {
            neighbor_fps
        }
    }

    pub(crate) fn get_default_duration(&self, proposal: Duration) -> Duration {
        Duration::from_fps(self.default_fps).unwrap_or(proposal)
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

    fn assigned(factory: &mut RangeListFactory) -> i64 {
        let mut packet = Packet::empty();
        assert!(!factory.get_next(&mut packet));
        packet.assigned_pts.as_ns()
    }

    #[test]
    fn test_single_range_linear() {
        let mut factory =
            RangeListFactory::parse(&ctx(), &lines("assume 25\n0,99,25"), 2).unwrap();
        assert_eq!(assigned(&mut factory), 0);
        assert_eq!(assigned(&mut factory), 40_000_000);
        assert_eq!(assigned(&mut factory), 80_000_000);
    }

    #[test]
    fn test_rates_switch_between_ranges() {
        let mut factory =
            RangeListFactory::parse(&ctx(), &lines("assume 25\n0,1,25\n2,3,50"), 2).unwrap();
        assert_eq!(assigned(&mut factory), 0);
        assert_eq!(assigned(&mut factory), 40_000_000);
        assert_eq!(assigned(&mut factory), 80_000_000);
        assert_eq!(assigned(&mut factory), 100_000_000);
    }

    #[test]
    fn test_default_fps_fills_between_ranges() {
        // Frames 2..=3 are uncovered and run at the assumed 10 fps.
        let mut factory =
            RangeListFactory::parse(&ctx(), &lines("assume 10\n0,1,25\n4,5,25"), 2).unwrap();
        assert_eq!(assigned(&mut factory), 0);
        assert_eq!(assigned(&mut factory), 40_000_000);
        assert_eq!(assigned(&mut factory), 80_000_000);
        assert_eq!(assigned(&mut factory), 180_000_000);
        assert_eq!(assigned(&mut factory), 280_000_000);
        assert_eq!(assigned(&mut factory), 320_000_000);
    }

    #[test]
    fn test_past_last_range_uses_default_fps() {
        let mut factory =
            RangeListFactory::parse(&ctx(), &lines("assume 10\n0,0,25"), 2).unwrap();
        assert_eq!(assigned(&mut factory), 0);
        assert_eq!(assigned(&mut factory), 40_000_000);
        assert_eq!(assigned(&mut factory), 140_000_000);
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let mut factory =
            RangeListFactory::parse(&ctx(), &lines("assume 25\n2,3,50\n0,1,25"), 2).unwrap();
        assert_eq!(assigned(&mut factory), 0);
        assert_eq!(assigned(&mut factory), 40_000_000);
        assert_eq!(assigned(&mut factory), 80_000_000);
    }

    #[test]
    fn test_overlap_is_fatal() {
        let err =
            RangeListFactory::parse(&ctx(), &lines("assume 25\n0,10,25\n5,20,25"), 2).unwrap_err();
        assert!(matches!(err, TimecodeError::Parse { line: 4, .. }));
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let mut factory = RangeListFactory::parse(
            &ctx(),
            &lines("assume 25\nnot,a,range\n0,0,-25\n0,99,25"),
            2,
        )
        .unwrap();
        assert_eq!(factory.ranges.len(), 1);
        assert_eq!(assigned(&mut factory), 0);
    }

    #[test]
    fn test_empty_table_passes_proposal_through() {
        let mut factory = RangeListFactory::parse(&ctx(), &lines("assume 25"), 2).unwrap();
        let mut packet = Packet::empty().with_pts(Timestamp::from_ns(123));
        assert!(!factory.get_next(&mut packet));
        assert_eq!(packet.assigned_pts.as_ns(), 123);
    }

    #[test]
    fn test_default_duration() {
        let factory = RangeListFactory::parse(&ctx(), &lines("assume 25\n0,0,25"), 2).unwrap();
        assert_eq!(
            factory.get_default_duration(Duration::ZERO),
            Duration::from_ns(40_000_000)
        );

        let factory = RangeListFactory::parse(&ctx(), &lines("0,0,25"), 2).unwrap();
        assert_eq!(
            factory.get_default_duration(Duration::from_ns(7)),
            Duration::from_ns(7)
        );
    }

    #[test]
    fn test_explicit_base_override() {
        let mut factory =
            RangeListFactory::parse(&ctx(), &lines("assume 25\n0,1,25,1000000000"), 2).unwrap();
        assert_eq!(assigned(&mut factory), 1_000_000_000);
        assert_eq!(assigned(&mut factory), 1_040_000_000);
    }
}
