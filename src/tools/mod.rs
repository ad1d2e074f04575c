//! Helpers shared by `qrtool` and the benches: dataset discovery, image
//! statistics and reading-rate scoring.

use crate::config::BinarizerSelection;
use crate::models::BitMatrix;
use crate::orchestrator::{BinarizationStrategy, Orchestrator};
use crate::reader::{DecodeHints, SymbolReader};
use crate::source::load_frame;
use crate::validate::{read_expected, validate};
use rayon::prelude::*;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Summary statistics for grayscale data.
#[derive(Debug, Clone, Copy)]
pub struct GrayStats {
    /// Minimum grayscale value.
    pub min: u8,
    /// Maximum grayscale value.
    pub max: u8,
    /// Average grayscale value.
    pub avg: u8,
}

/// Summary statistics for a binary matrix.
#[derive(Debug, Clone, Copy)]
pub struct BinaryStats {
    /// Count of dark pixels.
    pub dark_pixels: usize,
    /// Total pixels in the matrix.
    pub total_pixels: usize,
    /// Ratio of dark pixels to total pixels.
    pub dark_ratio: f64,
}

/// Compute min/max/avg for grayscale values.
pub fn grayscale_stats(gray: &[u8]) -> GrayStats {
    let mut min = u8::MAX;
    let mut max = u8::MIN;
    let mut sum: u64 = 0;
    for &v in gray {
        min = min.min(v);
        max = max.max(v);
        sum += v as u64;
    }
    if gray.is_empty() {
        return GrayStats {
            min: 0,
            max: 0,
            avg: 0,
        };
    }
    GrayStats {
        min,
        max,
        avg: (sum / gray.len() as u64) as u8,
    }
}

/// Compute dark pixel stats for a binary matrix.
pub fn binary_stats(binary: &BitMatrix) -> BinaryStats {
    let dark = binary.count_dark();
    let total = binary.width() * binary.height();
    let ratio = if total == 0 {
        0.0
    } else {
        dark as f64 / total as f64
    };
    BinaryStats {
        dark_pixels: dark,
        total_pixels: total,
        dark_ratio: ratio,
    }
}

/// Default dataset root from `QR_DATASET_ROOT`.
pub fn dataset_root_from_env() -> PathBuf {
    env::var("QR_DATASET_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("testdata"))
}

/// Image limit from `QR_BENCH_LIMIT`.
///
/// Returns `None` (full dataset) when unset or set to `0`.
pub fn bench_limit_from_env() -> Option<usize> {
    env::var("QR_BENCH_LIMIT")
        .ok()
        .and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|&v| v != 0)
}

/// Smoke test flag from `QR_SMOKE`.
pub fn smoke_from_env() -> bool {
    matches!(
        env::var("QR_SMOKE").as_deref(),
        Ok("1") | Ok("true") | Ok("TRUE") | Ok("yes") | Ok("YES")
    )
}

/// Iterate dataset image paths with optional smoke list and limit.
///
/// With `smoke`, paths listed in `<root>/_smoke.txt` are used when that
/// file names at least one existing image.
pub fn dataset_iter<P: AsRef<Path>>(
    root: P,
    limit: Option<usize>,
    smoke: bool,
) -> impl Iterator<Item = PathBuf> {
    let root = root.as_ref();
    let mut images = if smoke {
        load_smoke_list(root).unwrap_or_else(|| collect_images(root))
    } else {
        collect_images(root)
    };

    images.sort();
    if let Some(limit) = limit {
        images.truncate(limit);
    }
    images.into_iter()
}

fn load_smoke_list(root: &Path) -> Option<Vec<PathBuf>> {
    let contents = fs::read_to_string(root.join("_smoke.txt")).ok()?;
    let mut paths = Vec::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let candidate = Path::new(line);
        let path = if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            root.join(candidate)
        };
        if path.exists() {
            paths.push(path);
        }
    }
    if paths.is_empty() { None } else { Some(paths) }
}

fn collect_images(root: &Path) -> Vec<PathBuf> {
    let mut stack = vec![root.to_path_buf()];
    let mut images = Vec::new();

    while let Some(dir) = stack.pop() {
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
                continue;
            }
            if let Some(ext) = path.extension() {
                let ext = ext.to_string_lossy().to_lowercase();
                if matches!(ext.as_str(), "png" | "jpg" | "jpeg" | "gif" | "bmp" | "pgm") {
                    images.push(path);
                }
            }
        }
    }

    images
}

/// How one dataset image fared under each strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageScore {
    /// No sidecar, so the image is not scored
    Unlabeled,
    /// The image could not be loaded
    LoadFailed,
    /// Whether each strategy decoded exactly the expected text
    Scored {
        /// Global strategy matched
        global: bool,
        /// Hybrid strategy matched
        hybrid: bool,
        /// Time spent decoding
        elapsed: Duration,
    },
}

/// Score one image: decode with each enabled strategy and compare with its
/// sidecar.
pub fn score_image<R: SymbolReader>(
    orchestrator: &Orchestrator<R>,
    hints: &DecodeHints,
    binarizers: BinarizerSelection,
    path: &Path,
) -> ImageScore {
    let expected = match read_expected(path) {
        Ok(Some(text)) => text,
        _ => return ImageScore::Unlabeled,
    };
    let Ok(frame) = load_frame(path) else {
        return ImageScore::LoadFailed;
    };

    let start = Instant::now();
    let hit = |strategy: BinarizationStrategy| {
        let outcome = orchestrator.attempt(&frame, strategy, hints, false);
        validate(&outcome, Some(&expected)).is_match()
    };
    let global = binarizers.use_global() && hit(BinarizationStrategy::Global);
    let hybrid = binarizers.use_hybrid() && hit(BinarizationStrategy::Hybrid);
    ImageScore::Scored {
        global,
        hybrid,
        elapsed: start.elapsed(),
    }
}

/// Score images on the rayon pool. Scores come back in input order.
pub fn score_images<R>(
    orchestrator: &Orchestrator<R>,
    hints: &DecodeHints,
    binarizers: BinarizerSelection,
    images: &[PathBuf],
) -> Vec<ImageScore>
where
    R: SymbolReader + Sync,
{
    images
        .par_iter()
        .map(|path| score_image(orchestrator, hints, binarizers, path))
        .collect()
}

/// Aggregated reading-rate counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadingRate {
    /// Images with a sidecar
    pub labeled: usize,
    /// Labeled images that failed to load
    pub load_failed: usize,
    /// Matches with the global strategy
    pub global: usize,
    /// Matches with the hybrid strategy
    pub hybrid: usize,
    /// Images matched by at least one strategy
    pub either: usize,
    /// Total decode time
    pub elapsed: Duration,
}

impl ReadingRate {
    /// Tally scores
    pub fn from_scores(scores: &[ImageScore]) -> Self {
        let mut rate = ReadingRate::default();
        for score in scores {
            match *score {
                ImageScore::Unlabeled => {}
                ImageScore::LoadFailed => {
                    rate.labeled += 1;
                    rate.load_failed += 1;
                }
                ImageScore::Scored {
                    global,
                    hybrid,
                    elapsed,
                } => {
                    rate.labeled += 1;
                    rate.global += global as usize;
                    rate.hybrid += hybrid as usize;
                    rate.either += (global || hybrid) as usize;
                    rate.elapsed += elapsed;
                }
            }
        }
        rate
    }

    /// `hits` as a percentage of labeled images
    pub fn percent(&self, hits: usize) -> f64 {
        if self.labeled == 0 {
            0.0
        } else {
            hits as f64 / self.labeled as f64 * 100.0
        }
    }
}
