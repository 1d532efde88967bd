//! Error types for timecode file handling.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for timecode operations.
pub type Result<T> = std::result::Result<T, TimecodeError>;

/// Errors that can occur while opening or parsing a timecode file.
///
/// All of these are construction-time failures: a factory that was built
/// successfully never returns errors from per-frame queries.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum TimecodeError {
    /// The first line of the file carries no recognized version tag.
    #[error("Unrecognized timecode file header: {tag:?}")]
    UnrecognizedFormat {
        /// The offending header line.
        tag: String,
    },

    /// A line could not be parsed into a valid entry.
    #[error("Parse error in line {line}: {message}")]
    Parse {
        /// One-based line number in the timecode file.
        line: usize,
        /// Description of what is wrong with the line.
        message: String,
    },

    /// The file could not be opened or read.
    #[error("I/O error: {0}")]
    Io(String),
}

impl TimecodeError {
    /// Create an unrecognized-format error.
    pub fn unrecognized(tag: impl Into<String>) -> Self {
        Self::UnrecognizedFormat { tag: tag.into() }
    }

    /// Create a parse error for the given one-based line number.
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for TimecodeError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Convert TimecodeError to muxkit_core::Error.
impl From<TimecodeError> for muxkit_core::Error {
    fn from(err: TimecodeError) -> Self {
        match err {
            TimecodeError::Io(msg) => muxkit_core::Error::Io(std::io::Error::other(msg)),
            other => muxkit_core::Error::Timing(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TimecodeError::parse(4, "expected 3 fields, got 2");
        assert_eq!(
            err.to_string(),
            "Parse error in line 4: expected 3 fields, got 2"
        );

        let err = TimecodeError::unrecognized("# frame list v9");
        assert_eq!(
            err.to_string(),
            "Unrecognized timecode file header: \"# frame list v9\""
        );
    }

    #[test]
    fn test_error_serialization() {
        let err = TimecodeError::parse(2, "bad fps");
        let json = serde_json::to_string(&err).unwrap();
        let decoded: TimecodeError = serde_json::from_str(&json).unwrap();
        assert_eq!(err, decoded);
    }

    #[test]
    fn test_conversion_to_core_error() {
        let err: muxkit_core::Error = TimecodeError::unrecognized("bogus").into();
        assert!(matches!(err, muxkit_core::Error::Timing(_)));

        let err: muxkit_core::Error = TimecodeError::Io("gone".into()).into();
        assert!(matches!(err, muxkit_core::Error::Io(_)));
    }
}
