//! Run configuration, fixed at startup and passed explicitly to every attempt.

use crate::orchestrator::BinarizationStrategy;
use crate::reader::DecodeHints;
use std::env;

/// Which binarization strategies run per image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BinarizerSelection {
    /// Global, then Hybrid
    #[default]
    Both,
    /// Global only
    GlobalOnly,
    /// Hybrid only
    HybridOnly,
}

impl BinarizerSelection {
    /// Selection from the `--global` / `--hybrid` flags; neither or both
    /// flags enable both strategies.
    pub fn from_flags(global: bool, hybrid: bool) -> Self {
        match (global, hybrid) {
            (true, false) => BinarizerSelection::GlobalOnly,
            (false, true) => BinarizerSelection::HybridOnly,
            _ => BinarizerSelection::Both,
        }
    }

    /// Whether the global strategy runs
    pub fn use_global(&self) -> bool {
        !matches!(self, BinarizerSelection::HybridOnly)
    }

    /// Whether the hybrid strategy runs
    pub fn use_hybrid(&self) -> bool {
        !matches!(self, BinarizerSelection::GlobalOnly)
    }

    /// Enabled strategies in run order
    pub fn strategies(&self) -> Vec<BinarizationStrategy> {
        let mut out = Vec::with_capacity(2);
        if self.use_global() {
            out.push(BinarizationStrategy::Global);
        }
        if self.use_hybrid() {
            out.push(BinarizationStrategy::Hybrid);
        }
        out
    }

    /// True when exactly one strategy was asked for
    pub fn is_single(&self) -> bool {
        self.use_global() ^ self.use_hybrid()
    }
}

/// Immutable scan settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanConfig {
    /// Print format and corner points with each result
    pub more: bool,
    /// Validate against sidecar files instead of printing results
    pub test_mode: bool,
    /// Ask the reader to search harder
    pub try_harder: bool,
    /// Treat images as tightly cropped symbols
    pub pure_barcode: bool,
    /// Decode every symbol in an image rather than one
    pub search_multi: bool,
    /// Strategies to run
    pub binarizers: BinarizerSelection,
    /// Report every attempt, successful or not
    pub verbose: bool,
}

impl ScanConfig {
    /// Reader hints derived from this configuration
    pub fn hints(&self) -> DecodeHints {
        DecodeHints {
            try_harder: self.try_harder,
            pure_barcode: self.pure_barcode,
        }
    }

    /// Whether a failed attempt gets a "binarizer failed" line
    pub fn reports_failures(&self) -> bool {
        self.verbose || self.binarizers.is_single()
    }
}

/// Longest image side allowed before downscaling, from `QR_MAX_DIM`.
/// Unset, unparsable or `0` disables downscaling.
pub fn max_dim_from_env() -> Option<u32> {
    env::var("QR_MAX_DIM")
        .ok()
        .and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|&v| v != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_from_flags() {
        assert_eq!(BinarizerSelection::from_flags(false, false), BinarizerSelection::Both);
        assert_eq!(BinarizerSelection::from_flags(true, true), BinarizerSelection::Both);
        assert_eq!(
            BinarizerSelection::from_flags(true, false),
            BinarizerSelection::GlobalOnly
        );
        assert_eq!(
            BinarizerSelection::from_flags(false, true),
            BinarizerSelection::HybridOnly
        );
    }

    #[test]
    fn test_strategy_order() {
        assert_eq!(
            BinarizerSelection::Both.strategies(),
            vec![BinarizationStrategy::Global, BinarizationStrategy::Hybrid]
        );
        assert_eq!(
            BinarizerSelection::HybridOnly.strategies(),
            vec![BinarizationStrategy::Hybrid]
        );
    }

    #[test]
    fn test_reports_failures_matrix() {
        let cases = [
            (BinarizerSelection::Both, false, false),
            (BinarizerSelection::Both, true, true),
            (BinarizerSelection::GlobalOnly, false, true),
            (BinarizerSelection::GlobalOnly, true, true),
            (BinarizerSelection::HybridOnly, false, true),
            (BinarizerSelection::HybridOnly, true, true),
        ];
        for (binarizers, verbose, expected) in cases {
            let config = ScanConfig {
                binarizers,
                verbose,
                ..ScanConfig::default()
            };
            assert_eq!(config.reports_failures(), expected, "{binarizers:?} verbose={verbose}");
        }
    }

    #[test]
    fn test_hints() {
        let config = ScanConfig {
            try_harder: true,
            ..ScanConfig::default()
        };
        assert_eq!(config.hints(), DecodeHints::try_harder());
    }
}
