//! One decode attempt: binarize with a chosen strategy, run the symbol
//! reader, and fold whatever happens into a [`DecodeOutcome`].

use crate::models::{BitMatrix, DecodeResult, LuminanceSource};
use crate::reader::{DecodeHints, ReaderError, SymbolReader};
use crate::utils::binarization::{global_histogram_binarize, hybrid_binarize};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;
use tracing::{debug, trace};

/// How a gray frame is turned into a bitmap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinarizationStrategy {
    /// One histogram-derived threshold for the whole frame
    Global,
    /// Block-local thresholds
    Hybrid,
}

impl BinarizationStrategy {
    /// Name used in report lines
    pub fn name(&self) -> &'static str {
        match self {
            BinarizationStrategy::Global => "Global",
            BinarizationStrategy::Hybrid => "Hybrid",
        }
    }

    /// Binarize `source`, rejecting buffers that disagree with its dimensions
    pub fn binarize(&self, source: &dyn LuminanceSource) -> Result<BitMatrix, ReaderError> {
        let (width, height) = (source.width(), source.height());
        let gray = source.luminance();
        if width == 0 || height == 0 {
            return Err(ReaderError::IllegalArgument(format!(
                "frame must not be empty ({width}x{height})"
            )));
        }
        if gray.len() != width * height {
            return Err(ReaderError::IllegalArgument(format!(
                "luminance buffer holds {} bytes, {width}x{height} needs {}",
                gray.len(),
                width * height
            )));
        }

        Ok(match self {
            BinarizationStrategy::Global => global_histogram_binarize(gray, width, height),
            BinarizationStrategy::Hybrid => hybrid_binarize(gray, width, height),
        })
    }
}

impl fmt::Display for BinarizationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Classified reason a decode attempt produced nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// No symbol located, or its format could not be read
    NotFound,
    /// The reader rejected the image or options
    InvalidArgument,
    /// Any other reader failure (corrupt data, failed error correction)
    LibraryError,
    /// Failure outside the reader's taxonomy
    Unknown,
}

impl FailureKind {
    /// Per-attempt status code for this failure
    pub fn status(&self) -> i32 {
        match self {
            FailureKind::NotFound => -2,
            FailureKind::InvalidArgument => -3,
            FailureKind::LibraryError => -4,
            FailureKind::Unknown => -5,
        }
    }

    /// Prefix used in failure messages
    pub fn label(&self) -> &'static str {
        match self {
            FailureKind::NotFound => "not found",
            FailureKind::InvalidArgument => "invalid argument",
            FailureKind::LibraryError => "reader error",
            FailureKind::Unknown => "unknown error",
        }
    }

    /// Map a reader error onto the taxonomy
    pub fn classify(err: &ReaderError) -> Self {
        match err {
            ReaderError::NotFound(_) | ReaderError::Format(_) => FailureKind::NotFound,
            ReaderError::IllegalArgument(_) => FailureKind::InvalidArgument,
            ReaderError::Checksum(_) | ReaderError::Other(_) => FailureKind::LibraryError,
        }
    }
}

/// Result of one decode attempt
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeOutcome {
    /// Decoding finished; results in reader order
    Success(Vec<DecodeResult>),
    /// Decoding failed with a classified reason and a readable message
    Failure(FailureKind, String),
}

impl DecodeOutcome {
    /// Build a failure whose message carries the kind label
    pub fn failure(kind: FailureKind, detail: impl fmt::Display) -> Self {
        DecodeOutcome::Failure(kind, format!("{}: {}", kind.label(), detail))
    }

    /// Status code: 0 on success, the failure's code otherwise
    pub fn status(&self) -> i32 {
        match self {
            DecodeOutcome::Success(_) => 0,
            DecodeOutcome::Failure(kind, _) => kind.status(),
        }
    }

    /// Decoded results, empty on failure
    pub fn results(&self) -> &[DecodeResult] {
        match self {
            DecodeOutcome::Success(results) => results,
            DecodeOutcome::Failure(..) => &[],
        }
    }
}

impl From<ReaderError> for DecodeOutcome {
    fn from(err: ReaderError) -> Self {
        DecodeOutcome::failure(FailureKind::classify(&err), err)
    }
}

/// Runs decode attempts against a [`SymbolReader`].
///
/// Holds no per-attempt state: the same frame, strategy and options always
/// produce the same outcome.
#[derive(Debug, Clone, Default)]
pub struct Orchestrator<R> {
    reader: R,
}

impl<R: SymbolReader> Orchestrator<R> {
    /// Wrap a reader
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// The wrapped reader
    pub fn reader(&self) -> &R {
        &self.reader
    }

    /// Binarize `frame` with `strategy` and decode one symbol, or every
    /// distinct symbol when `multi_symbol` is set.
    pub fn attempt(
        &self,
        frame: &dyn LuminanceSource,
        strategy: BinarizationStrategy,
        hints: &DecodeHints,
        multi_symbol: bool,
    ) -> DecodeOutcome {
        let start = Instant::now();

        let run = || -> Result<Vec<DecodeResult>, ReaderError> {
            let bitmap = strategy.binarize(frame)?;
            trace!(
                %strategy,
                dark = bitmap.count_dark(),
                elapsed_us = start.elapsed().as_micros() as u64,
                "binarized frame"
            );
            if multi_symbol {
                self.reader.decode_multiple(&bitmap, hints)
            } else {
                self.reader.decode(&bitmap, hints).map(|result| vec![result])
            }
        };

        let outcome = match panic::catch_unwind(AssertUnwindSafe(run)) {
            Ok(Ok(results)) => DecodeOutcome::Success(results),
            Ok(Err(err)) => DecodeOutcome::from(err),
            Err(payload) => DecodeOutcome::failure(FailureKind::Unknown, panic_message(&*payload)),
        };

        debug!(
            %strategy,
            multi_symbol,
            status = outcome.status(),
            results = outcome.results().len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "decode attempt finished"
        );
        outcome
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("panic: {msg}")
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("panic: {msg}")
    } else {
        "panic with non-string payload".to_string()
    }
}
