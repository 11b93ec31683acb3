//! # Error Types Module
//!
//! Centralized error handling for the Arteria application.
//! Provides custom error types for each module with proper context and error chaining.
//!
//! ## Error Types
//! - `CorpusError`: HDF5 recording access failures
//! - `AnnotationError`: ARTF annotation file I/O and parsing errors
//! - `GeneratorError`: invalid synthesis parameters
//! - `ConfigError`: Configuration file I/O and parsing errors
//!
//! ## Why Custom Errors
//! - Better error messages for users and developers
//! - Type-safe error handling with match expressions
//! - Easier debugging with context preservation
//! - Enables proper error recovery strategies

use std::fmt;
use std::path::PathBuf;

/// Errors that can occur while accessing an HDF5 recording
#[derive(Debug)]
pub enum CorpusError {
    /// Failed to open the HDF5 file
    OpenFailed { path: PathBuf, reason: String },
    /// The file has no `waves` group
    MissingWaves(PathBuf),
    /// A signal dataset has no `.index` dataset and no `index` attribute
    MissingIndex(String),
    /// The requested signal is not present in the file
    SignalNotFound(String),
    /// A dataset read or write failed
    Io { context: String, reason: String },
}

impl fmt::Display for CorpusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorpusError::OpenFailed { path, reason } => {
                write!(f, "Failed to open recording {}: {}", path.display(), reason)
            }
            CorpusError::MissingWaves(path) => {
                write!(f, "Recording {} has no 'waves' group", path.display())
            }
            CorpusError::MissingIndex(signal) => {
                write!(f, "Signal '{}' has no index metadata", signal)
            }
            CorpusError::SignalNotFound(signal) => {
                write!(f, "Signal '{}' not present in the recording", signal)
            }
            CorpusError::Io { context, reason } => {
                write!(f, "{}: {}", context, reason)
            }
        }
    }
}

impl std::error::Error for CorpusError {}

/// Errors that can occur during annotation handling
#[derive(Debug)]
pub enum AnnotationError {
    /// Failed to read an ARTF file
    ReadFailed(std::io::Error),
    /// Failed to parse an ARTF file as XML
    ParseFailed(quick_xml::DeError),
    /// The ARTF file references a different HDF5 file
    FileMismatch { expected: String, found: String },
    /// An artefact timestamp could not be parsed
    InvalidTimestamp(String),
    /// The signal has not been annotated yet
    NotAnnotated(String),
}

impl fmt::Display for AnnotationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnotationError::ReadFailed(e) => {
                write!(f, "Failed to read ARTF file: {}", e)
            }
            AnnotationError::ParseFailed(e) => {
                write!(f, "Failed to parse ARTF file: {}", e)
            }
            AnnotationError::FileMismatch { expected, found } => {
                write!(
                    f,
                    "ARTF file is associated with '{}', not '{}'",
                    found, expected
                )
            }
            AnnotationError::InvalidTimestamp(ts) => {
                write!(f, "Invalid artefact timestamp '{}'", ts)
            }
            AnnotationError::NotAnnotated(signal) => {
                write!(f, "Signal '{}' has not been annotated yet", signal)
            }
        }
    }
}

impl std::error::Error for AnnotationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AnnotationError::ReadFailed(e) => Some(e),
            AnnotationError::ParseFailed(e) => Some(e),
            _ => None,
        }
    }
}

/// Errors that can occur when validating generator parameters
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratorError {
    /// Pulse rate outside the supported band
    InvalidPulseRate(f64),
    /// Pulse pressure must be positive
    InvalidPulsePressure(f64),
    /// Requested duration resolves to zero windows
    EmptyDuration,
    /// An anomaly interval falls outside the generated signal
    AnomalyOutOfRange { start_s: f64, duration_s: f64 },
}

impl fmt::Display for GeneratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneratorError::InvalidPulseRate(bpm) => {
                write!(f, "Pulse rate {} bpm is outside the supported range", bpm)
            }
            GeneratorError::InvalidPulsePressure(mmhg) => {
                write!(f, "Pulse pressure {} mmHg must be positive", mmhg)
            }
            GeneratorError::EmptyDuration => {
                write!(f, "Requested duration produces no windows")
            }
            GeneratorError::AnomalyOutOfRange { start_s, duration_s } => {
                write!(
                    f,
                    "Anomaly at {:.1}s (+{:.1}s) is outside the generated signal",
                    start_s, duration_s
                )
            }
        }
    }
}

impl std::error::Error for GeneratorError {}

/// Errors that can occur during configuration operations
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read config file
    ReadFailed(std::io::Error),
    /// Failed to write config file
    WriteFailed(std::io::Error),
    /// Failed to parse config file
    ParseFailed(toml::de::Error),
    /// Failed to serialize config
    SerializeFailed(toml::ser::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ReadFailed(e) => {
                write!(f, "Failed to read config file: {}", e)
            }
            ConfigError::WriteFailed(e) => {
                write!(f, "Failed to write config file: {}", e)
            }
            ConfigError::ParseFailed(e) => {
                write!(f, "Failed to parse config file: {}", e)
            }
            ConfigError::SerializeFailed(e) => {
                write!(f, "Failed to serialize config: {}", e)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ReadFailed(e) => Some(e),
            ConfigError::WriteFailed(e) => Some(e),
            ConfigError::ParseFailed(e) => Some(e),
            ConfigError::SerializeFailed(e) => Some(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corpus_error_display() {
        let err = CorpusError::SignalNotFound("abp".to_string());
        assert!(err.to_string().contains("abp"));
    }

    #[test]
    fn test_annotation_file_mismatch_display() {
        let err = AnnotationError::FileMismatch {
            expected: "TBI_001.hdf5".to_string(),
            found: "TBI_002.hdf5".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("TBI_001.hdf5"));
        assert!(msg.contains("TBI_002.hdf5"));
    }

    #[test]
    fn test_generator_error_display() {
        let err = GeneratorError::InvalidPulseRate(300.0);
        assert!(err.to_string().contains("300"));
    }

    #[test]
    fn test_config_error_chain() {
        use std::error::Error;
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = ConfigError::ReadFailed(io_err);
        assert!(err.source().is_some());
    }
}
