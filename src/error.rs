//! Error types for generation passes, element input and export.
//!
//! Only pass-level preconditions and encoder failures are errors. Problems with
//! a single element or a single exported object are logged and counted instead.

use thiserror::Error;

/// Fatal preconditions of a generation pass.
#[derive(Debug, Error, PartialEq)]
pub enum PassError {
    /// The selection region is empty, inverted or out of range.
    #[error(
        "invalid bounding box (north {north}, south {south}, east {east}, west {west}): {reason}"
    )]
    InvalidBoundingBox {
        north: f64,
        south: f64,
        east: f64,
        west: f64,
        reason: &'static str,
    },

    /// The projection scale must be finite and positive.
    #[error("invalid projection scale: {0}")]
    InvalidScale(f64),

    /// The terrain slab could not be built, so no baseline exists.
    #[error("terrain baseline could not be established: {0}")]
    NoBaseline(&'static str),
}

/// Failures while encoding an export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("XML encoding failed: {0}")]
    Xml(String),

    #[error("archive packaging failed: {0}")]
    Archive(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures while loading a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Failures while reading an element document.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("malformed element document: {0}")]
    Json(#[from] serde_json::Error),
}
