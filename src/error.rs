//! Error types for loading frames, sidecar files and capture devices.
//!
//! Decode failures are not errors at this level: they are folded into
//! [`crate::DecodeOutcome`] by the orchestrator.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias for scan front end operations
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors raised outside the symbol reader
#[derive(Debug, Error)]
pub enum ScanError {
    /// Pixel buffer does not match the declared dimensions
    #[error("invalid frame: {width}x{height} needs {expected} bytes, got {actual}")]
    InvalidFrame {
        /// Declared width
        width: usize,
        /// Declared height
        height: usize,
        /// Bytes required by the dimensions
        expected: usize,
        /// Bytes supplied
        actual: usize,
    },

    /// Image file could not be opened or decoded
    #[error("unable to open image {}: {source}", path.display())]
    Image {
        /// Image path
        path: PathBuf,
        /// Decoder error
        #[source]
        source: image::ImageError,
    },

    /// Sidecar file exists but could not be read
    #[error("unable to read expected value {}: {source}", path.display())]
    Sidecar {
        /// Sidecar path
        path: PathBuf,
        /// I/O error
        #[source]
        source: std::io::Error,
    },

    /// Capture device failure
    #[error("camera error: {0}")]
    Camera(String),

    /// Installing the Ctrl+C handler failed
    #[error("unable to install interrupt handler: {0}")]
    Interrupt(#[from] ctrlc::Error),
}
