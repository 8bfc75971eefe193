//! Error types for jar-sizer.
//!
//! Only [`ConfigError`] is fatal. [`ItemError`] is isolated to one artifact by
//! the dispatcher and [`MalformedPath`] is a classification result rather than
//! a failure.

use std::path::PathBuf;

use thiserror::Error;

use crate::models::ArtifactCoordinate;

/// Startup configuration errors. Reported before any traversal begins.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable {var}")]
    MissingEnv { var: &'static str },

    #[error("Invalid value '{value}' for {var}: {reason}")]
    InvalidEnv {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid table name '{0}': only ASCII letters, digits and '_' are allowed")]
    InvalidTable(String),

    #[error("Concurrency must be at least 1")]
    ZeroConcurrency,

    #[error("Root path '{0}' is not a directory")]
    InvalidRoot(PathBuf),
}

/// Errors raised by a metadata sink.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A failure processing a single artifact.
#[derive(Error, Debug)]
pub enum ItemError {
    #[error("Failed to measure '{path}': {source}")]
    Measure {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to update {coordinate}: {source}")]
    Sink {
        coordinate: ArtifactCoordinate,
        source: SinkError,
    },

    #[error("No record for {coordinate}")]
    Unmatched { coordinate: ArtifactCoordinate },
}

/// Why a suffix-matching path could not be turned into a coordinate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedPath {
    #[error("anchor segment '{anchor}' not found")]
    AnchorMissing { anchor: String },

    #[error("expected at least 3 segments after the anchor, found {found}")]
    TooFewSegments { found: usize },

    #[error("path is not valid UTF-8")]
    NonUtf8,
}
