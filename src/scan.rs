//! Reporting front end: runs the enabled strategies on each frame, validates
//! in test mode, and prints report lines to a caller-supplied writer.

use crate::config::ScanConfig;
use crate::models::LuminanceSource;
use crate::orchestrator::{BinarizationStrategy, DecodeOutcome, FailureKind, Orchestrator};
use crate::reader::SymbolReader;
use crate::source::load_frame;
use crate::validate::{ExpectedValue, ValidationVerdict, validate};
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, warn};

/// Status of an attempt whose decoded text failed validation
pub const VALIDATION_FAILED: i32 = -6;

/// One strategy's attempt on one frame
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptReport {
    /// Strategy used
    pub strategy: BinarizationStrategy,
    /// What the orchestrator returned
    pub outcome: DecodeOutcome,
    /// Final status after validation
    pub status: i32,
}

impl AttemptReport {
    /// Whether the attempt ended with status 0
    pub fn passed(&self) -> bool {
        self.status == 0
    }
}

/// All attempts made on one frame, in run order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameReport {
    /// Attempts in run order
    pub attempts: Vec<AttemptReport>,
}

impl FrameReport {
    /// 0 when any attempt passed, otherwise the first attempt's status
    pub fn status(&self) -> i32 {
        if self.attempts.iter().any(AttemptReport::passed) {
            return 0;
        }
        self.attempts.first().map_or(0, |a| a.status)
    }

    /// Whether `strategy` ran and passed
    pub fn passed_on(&self, strategy: BinarizationStrategy) -> bool {
        self.attempts
            .iter()
            .any(|a| a.strategy == strategy && a.passed())
    }
}

/// Per-strategy pass counters over a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    /// Images scanned
    pub total: usize,
    /// Images passing on at least one strategy
    pub passed: usize,
    /// Images passing on global only
    pub global_only: usize,
    /// Images passing on hybrid only
    pub hybrid_only: usize,
    /// Images passing on both strategies
    pub both: usize,
    /// Images passing on no strategy
    pub neither: usize,
    /// Status of the first failing image, 0 if none failed
    pub status: i32,
}

impl BatchSummary {
    /// Count one scanned frame
    pub fn record(&mut self, report: &FrameReport) {
        self.total += 1;
        let global = report.passed_on(BinarizationStrategy::Global);
        let hybrid = report.passed_on(BinarizationStrategy::Hybrid);
        match (global, hybrid) {
            (true, true) => self.both += 1,
            (true, false) => self.global_only += 1,
            (false, true) => self.hybrid_only += 1,
            (false, false) => self.neither += 1,
        }
        if global || hybrid {
            self.passed += 1;
        }
        self.note_status(report.status());
    }

    /// Count an image that could not be loaded. It is not part of the
    /// totals but still fails the batch.
    pub fn record_unloadable(&mut self) {
        self.note_status(FailureKind::Unknown.status());
    }

    fn note_status(&mut self, status: i32) {
        if self.status == 0 {
            self.status = status;
        }
    }

    /// Print the test-mode summary block
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "Summary:")?;
        writeln!(out, " {} images tested total,", self.total)?;
        writeln!(out, " {} passed,", self.passed)?;
        writeln!(out, " {} passed only on global,", self.global_only)?;
        writeln!(out, " {} passed only on hybrid,", self.hybrid_only)?;
        writeln!(out, " {} passed on both,", self.both)?;
        writeln!(out, " {} passed on neither.", self.neither)
    }
}

/// Applies a [`ScanConfig`] to frames and files
#[derive(Debug, Clone)]
pub struct Scanner<R> {
    orchestrator: Orchestrator<R>,
    config: ScanConfig,
}

impl<R: SymbolReader> Scanner<R> {
    /// Scanner over `reader` with a fixed configuration
    pub fn new(reader: R, config: ScanConfig) -> Self {
        Self {
            orchestrator: Orchestrator::new(reader),
            config,
        }
    }

    /// Run one attempt, validate it in test mode, and print its report lines.
    pub fn read_image<W: Write>(
        &self,
        out: &mut W,
        frame: &dyn LuminanceSource,
        strategy: BinarizationStrategy,
        expected: &ExpectedValue,
    ) -> io::Result<AttemptReport> {
        let config = &self.config;
        let outcome = self
            .orchestrator
            .attempt(frame, strategy, &config.hints(), config.search_multi);
        let mut status = outcome.status();
        let mut message = match &outcome {
            DecodeOutcome::Failure(_, message) => message.clone(),
            DecodeOutcome::Success(_) => String::new(),
        };

        if config.test_mode {
            if let ExpectedValue::Unreadable(err) = expected {
                let kind = FailureKind::Unknown;
                status = kind.status();
                message = format!("{}: {err}", kind.label());
            } else if status == 0 {
                match validate(&outcome, expected.text()) {
                    ValidationVerdict::Match => {}
                    ValidationVerdict::MissingExpectation { detected } => {
                        write_missing(out, std::slice::from_ref(&detected))?;
                        status = VALIDATION_FAILED;
                        message = "expected value missing".to_string();
                    }
                    ValidationVerdict::NotCompared { detected } => {
                        write_missing(out, &detected)?;
                        status = VALIDATION_FAILED;
                        message = format!("{} results cannot be validated", detected.len());
                    }
                    ValidationVerdict::Mismatch { expected, detected } => {
                        writeln!(out, "  Expected: {expected}")?;
                        writeln!(out, "  Detected: {detected}")?;
                        status = VALIDATION_FAILED;
                        message = "data did not match".to_string();
                    }
                }
            }
        }

        if status != 0 {
            if config.reports_failures() {
                writeln!(out, "{strategy} binarizer failed: {message}")?;
            }
        } else if !config.test_mode {
            if config.verbose {
                writeln!(out, "{strategy} binarizer succeeded: ")?;
            }
            for result in outcome.results() {
                if config.more {
                    writeln!(out, "  Format: {}", result.format)?;
                    for (i, point) in result.points.iter().enumerate() {
                        writeln!(out, "  Point[{i}]: {} {}", point.x, point.y)?;
                    }
                }
                if config.verbose {
                    write!(out, "    ")?;
                }
                writeln!(out, "{}", result.text)?;
            }
        }

        Ok(AttemptReport {
            strategy,
            outcome,
            status,
        })
    }

    /// Run every enabled strategy on `frame`
    pub fn scan_frame<W: Write>(
        &self,
        out: &mut W,
        frame: &dyn LuminanceSource,
        expected: &ExpectedValue,
    ) -> io::Result<FrameReport> {
        let mut report = FrameReport::default();
        for strategy in self.config.binarizers.strategies() {
            report
                .attempts
                .push(self.read_image(out, frame, strategy, expected)?);
        }
        Ok(report)
    }

    /// Scan image files in order. Files that fail to load are logged and
    /// skipped. Prints the summary block in test mode.
    pub fn scan_files<W, P>(&self, out: &mut W, paths: &[P]) -> io::Result<BatchSummary>
    where
        W: Write,
        P: AsRef<Path>,
    {
        let mut summary = BatchSummary::default();
        let show_names = !self.config.test_mode && paths.len() > 1;

        for path in paths {
            let path = path.as_ref();
            if show_names {
                writeln!(out, "{}", path.display())?;
            }

            let frame = match load_frame(path) {
                Ok(frame) => frame,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "skipping image");
                    summary.record_unloadable();
                    continue;
                }
            };
            let expected = if self.config.test_mode {
                ExpectedValue::for_image(path)
            } else {
                ExpectedValue::Absent
            };

            let report = self.scan_frame(out, &frame, &expected)?;
            debug!(path = %path.display(), status = report.status(), "image scanned");
            summary.record(&report);
        }

        if self.config.test_mode {
            summary.write_to(out)?;
        }
        Ok(summary)
    }
}

fn write_missing<W: Write>(out: &mut W, detected: &[String]) -> io::Result<()> {
    writeln!(out, "  Expected text or binary data for image missing.")?;
    for text in detected {
        writeln!(out, "  Detected: {text}")?;
    }
    Ok(())
}
