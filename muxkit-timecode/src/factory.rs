//! Timecode factory construction and the uniform per-track interface.
//!
//! One factory is created per track before muxing starts. File-backed
//! factories read and parse their whole file during construction, so a
//! successfully created factory is always ready for `get_next`; there is
//! no separate "parsed" state to get wrong.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use muxkit_core::{Duration, Packet, Rational};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, TimecodeError};
use crate::forced::FixedDurationFactory;
use crate::v1::RangeListFactory;
use crate::v2::ExplicitListFactory;
use crate::v3::DurationListFactory;

/// Timecode file format versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormatVersion {
    /// Frame-index ranges with constant rates.
    V1,
    /// One explicit timestamp per frame.
    V2,
    /// Cumulative duration/gap list.
    V3,
    /// No file; constant corrected duration.
    Forced,
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V1 => write!(f, "v1"),
            Self::V2 => write!(f, "v2"),
            Self::V3 => write!(f, "v3"),
            Self::Forced => write!(f, "forced"),
        }
    }
}

/// Diagnostic identity of a factory: which file, which source, which track.
#[derive(Debug, Clone)]
pub(crate) struct FactoryContext {
    pub file_name: String,
    pub source_name: String,
    pub track_id: i64,
}

#[derive(Debug, Clone)]
enum Variant {
    Ranges(RangeListFactory),
    Explicit(ExplicitListFactory),
    Durations(DurationListFactory),
    Fixed(FixedDurationFactory),
}

impl Variant {
    fn version(&self) -> FormatVersion {
        match self {
            Self::Ranges(_) => FormatVersion::V1,
            Self::Explicit(_) => FormatVersion::V2,
            Self::Durations(_) => FormatVersion::V3,
            Self::Fixed(_) => FormatVersion::Forced,
        }
    }
}

/// Per-track timestamp factory.
///
/// Converts an externally supplied timing specification (a timecode file
/// in one of three versioned formats, or a forced constant duration)
/// into exact presentation timestamps for a sequential frame stream.
///
/// `get_next` must be called once per frame in frame order; the caller
/// owns frame sequencing.
#[derive(Debug, Clone)]
pub struct TimecodeFactory {
    ctx: FactoryContext,
    preserve_duration: bool,
    inner: Variant,
}

/// Recognized header prefixes. v1 and v3 share most of their line
/// vocabulary, so the version marker is the only thing that
/// disambiguates them; the content is never sniffed.
const HEADER_PREFIXES: [&str; 2] = ["# timecode format v", "# timestamp format v"];

fn detect_version(header: &str) -> Option<u32> {
    let lowered = header.trim().to_ascii_lowercase();
    HEADER_PREFIXES
        .iter()
        .find_map(|prefix| lowered.strip_prefix(prefix))
        .and_then(|rest| rest.trim().parse().ok())
}

impl TimecodeFactory {
    /// Open and fully parse a timecode file, auto-detecting its version.
    ///
    /// Fails with [`TimecodeError::UnrecognizedFormat`] when the first
    /// non-empty line carries no known version tag, and with
    /// [`TimecodeError::Parse`] on malformed content. Both abort track
    /// setup; nothing is retried.
    pub fn create(
        path: impl AsRef<Path>,
        source_name: impl Into<String>,
        track_id: i64,
    ) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|err| TimecodeError::Io(format!("{}: {err}", path.display())))?;
        Self::from_reader(
            BufReader::new(file),
            path.display().to_string(),
            source_name,
            track_id,
        )
    }

    /// Fully parse a timecode file from any buffered reader.
    ///
    /// `file_name` is used for diagnostics only.
    pub fn from_reader(
        reader: impl BufRead,
        file_name: impl Into<String>,
        source_name: impl Into<String>,
        track_id: i64,
    ) -> Result<Self> {
        let ctx = FactoryContext {
            file_name: file_name.into(),
            source_name: source_name.into(),
            track_id,
        };

        let lines: Vec<String> = reader.lines().collect::<std::io::Result<_>>()?;
        let header_idx = lines
            .iter()
            .position(|line| !line.trim().is_empty())
            .ok_or_else(|| TimecodeError::unrecognized(""))?;
        let header = &lines[header_idx];

        let version = detect_version(header)
            .ok_or_else(|| TimecodeError::unrecognized(header.trim()))?;

        // Data starts on the line after the header; line numbers in
        // diagnostics are one-based.
        let data = &lines[header_idx + 1..];
        let first_line = header_idx + 2;

        let inner = match version {
            1 => Variant::Ranges(RangeListFactory::parse(&ctx, data, first_line)?),
            2 => Variant::Explicit(ExplicitListFactory::parse(&ctx, data, first_line)?),
            3 => Variant::Durations(DurationListFactory::parse(&ctx, data, first_line)?),
            _ => return Err(TimecodeError::unrecognized(header.trim())),
        };

        debug!(
            file = %ctx.file_name,
            source = %ctx.source_name,
            track = ctx.track_id,
            version = %inner.version(),
            "timecode file parsed"
        );

        Ok(Self {
            ctx,
            preserve_duration: false,
            inner,
        })
    }

    /// Build a file-less factory from a nominal frame duration and a
    /// rational sync-correction factor.
    pub fn create_forced(
        default_duration: Duration,
        sync: Rational,
        source_name: impl Into<String>,
        track_id: i64,
    ) -> Self {
        Self {
            ctx: FactoryContext {
                file_name: String::new(),
                source_name: source_name.into(),
                track_id,
            },
            preserve_duration: false,
            inner: Variant::Fixed(FixedDurationFactory::new(default_duration, sync)),
        }
    }

    /// Assign the next frame's timestamp, overwriting
    /// `packet.assigned_pts` and advancing the frame cursor by one.
    ///
    /// Returns `true` when a timeline gap was crossed before this frame;
    /// only factories for which [`contains_gap`](Self::contains_gap) is
    /// true ever return `true`, and the consumer must then break output
    /// continuity (e.g. start a new cluster) before writing the frame.
    pub fn get_next(&mut self, packet: &mut Packet) -> bool {
        match &mut self.inner {
            Variant::Ranges(factory) => factory.get_next(packet),
            Variant::Explicit(factory) => factory.get_next(packet),
            Variant::Durations(factory) => factory.get_next(packet),
            Variant::Fixed(factory) => factory.get_next(packet),
        }
    }

    /// The duration to use for frames whose native duration is unknown.
    ///
    /// Pure query: calling it never advances the frame cursor.
    pub fn get_default_duration(&self, proposal: Duration) -> Duration {
        match &self.inner {
            Variant::Ranges(factory) => factory.get_default_duration(proposal),
            Variant::Explicit(factory) => factory.get_default_duration(proposal),
            Variant::Durations(_) => proposal,
            Variant::Fixed(factory) => factory.get_default_duration(),
        }
    }

    /// Whether this factory can ever report a gap from `get_next`.
    ///
    /// Queried once at track setup so consumers of gapless variants can
    /// skip checking the per-call flag.
    pub fn contains_gap(&self) -> bool {
        matches!(self.inner, Variant::Durations(_))
    }

    /// Advise the consumer whether original packet durations should
    /// override factory-computed spacing. Stored, not interpreted here.
    pub fn set_preserve_duration(&mut self, preserve_duration: bool) {
        self.preserve_duration = preserve_duration;
    }

    /// The stored preserve-duration advice.
    pub fn preserve_duration(&self) -> bool {
        self.preserve_duration
    }

    /// The detected (or forced) format version.
    pub fn version(&self) -> FormatVersion {
        self.inner.version()
    }

    /// The backing file name; empty for forced factories.
    pub fn file_name(&self) -> &str {
        &self.ctx.file_name
    }

    /// The source (demuxer/reader) name, for diagnostics.
    pub fn source_name(&self) -> &str {
        &self.ctx.source_name
    }

    /// The track this factory assigns timestamps for.
    pub fn track_id(&self) -> i64 {
        self.ctx.track_id
    }
}
