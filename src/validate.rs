//! Test-mode comparison of decoded text against sidecar ground truth.

use crate::error::{ScanError, ScanResult};
use crate::orchestrator::DecodeOutcome;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Verdict of comparing one attempt with its expected value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationVerdict {
    /// The single decoded text equals the expectation
    Match,
    /// The single decoded text differs from the expectation
    Mismatch {
        /// Ground truth
        expected: String,
        /// Decoded text
        detected: String,
    },
    /// One text was decoded but there is nothing to compare it with
    MissingExpectation {
        /// Decoded text
        detected: String,
    },
    /// The attempt failed, or did not produce exactly one result
    NotCompared {
        /// Decoded texts, if any
        detected: Vec<String>,
    },
}

impl ValidationVerdict {
    /// Whether the attempt passes validation
    pub fn is_match(&self) -> bool {
        matches!(self, ValidationVerdict::Match)
    }
}

/// Compare `outcome` with `expected`, byte for byte.
pub fn validate(outcome: &DecodeOutcome, expected: Option<&str>) -> ValidationVerdict {
    let results = match outcome {
        DecodeOutcome::Success(results) if results.len() == 1 => results,
        other => {
            return ValidationVerdict::NotCompared {
                detected: other.results().iter().map(|r| r.text.clone()).collect(),
            };
        }
    };

    let detected = results[0].text.clone();
    match expected {
        None => ValidationVerdict::MissingExpectation { detected },
        Some(expected) if expected == detected => ValidationVerdict::Match,
        Some(expected) => ValidationVerdict::Mismatch {
            expected: expected.to_string(),
            detected,
        },
    }
}

/// Ground truth for one image in test mode
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExpectedValue {
    /// No sidecar, or an empty one
    #[default]
    Absent,
    /// Sidecar contents
    Text(String),
    /// A sidecar exists but reading it failed
    Unreadable(String),
}

impl ExpectedValue {
    /// Load the sidecar for `image`, folding read errors into `Unreadable`
    pub fn for_image(image: &Path) -> Self {
        match read_expected(image) {
            Ok(Some(text)) => ExpectedValue::Text(text),
            Ok(None) => ExpectedValue::Absent,
            Err(err) => ExpectedValue::Unreadable(err.to_string()),
        }
    }

    /// Expected text, if known
    pub fn text(&self) -> Option<&str> {
        match self {
            ExpectedValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Read the expected text for `image`: `<stem>.txt`, else `<stem>.bin`.
///
/// Returns `None` when neither file exists or the file found is empty.
/// Contents are decoded as lossy UTF-8.
pub fn read_expected(image: &Path) -> ScanResult<Option<String>> {
    for ext in ["txt", "bin"] {
        let path = image.with_extension(ext);
        match fs::read(&path) {
            Ok(bytes) if bytes.is_empty() => return Ok(None),
            Ok(bytes) => return Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(err) if err.kind() == ErrorKind::NotFound => continue,
            Err(source) => return Err(ScanError::Sidecar { path, source }),
        }
    }
    Ok(None)
}
