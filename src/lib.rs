//! qrscan - QR decode-attempt front end
//!
//! Turns gray frames into bitmaps with one of two binarization strategies,
//! hands them to a symbol reader, classifies every failure into a small
//! taxonomy with stable status codes, and optionally validates decoded text
//! against sidecar ground truth files.
//!
//! ```no_run
//! use qrscan::{RqrrReader, ScanConfig, Scanner};
//!
//! let scanner = Scanner::new(RqrrReader::new(), ScanConfig::default());
//! let mut out = std::io::stdout();
//! let summary = scanner.scan_files(&mut out, &["code.png"]).unwrap();
//! std::process::exit(summary.status);
//! ```

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Run configuration (flags, strategy selection)
pub mod config;
/// Error types
pub mod error;
/// Core data structures (Frame, BitMatrix, Point, DecodeResult)
pub mod models;
/// Single decode attempts and failure classification
pub mod orchestrator;
/// Symbol reader boundary
pub mod reader;
/// Per-frame reporting and batch processing
pub mod scan;
/// Frame sources (image files, cameras) and the capture loop
pub mod source;
/// Dataset and statistics helpers for the CLI tools
pub mod tools;
/// Utility functions (grayscale, binarization)
pub mod utils;
/// Sidecar loading and expected-value validation
pub mod validate;

pub use config::{BinarizerSelection, ScanConfig};
pub use error::{ScanError, ScanResult};
pub use models::{BarcodeFormat, BitMatrix, DecodeResult, Frame, LuminanceSource, Point};
pub use orchestrator::{BinarizationStrategy, DecodeOutcome, FailureKind, Orchestrator};
pub use reader::{DecodeHints, ReaderError, RqrrReader, SymbolReader};
pub use scan::{AttemptReport, BatchSummary, FrameReport, Scanner, VALIDATION_FAILED};
pub use validate::{ExpectedValue, ValidationVerdict, validate};
