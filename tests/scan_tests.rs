//! End-to-end tests on synthesized QR images: orchestration, multi-symbol
//! search, and test-mode validation through the batch front end.

use qrcode::{Color, QrCode};
use qrscan::{
    BatchSummary, BinarizationStrategy, BinarizerSelection, DecodeHints, DecodeOutcome,
    ExpectedValue, FailureKind, Frame, LuminanceSource, Orchestrator, RqrrReader, ScanConfig,
    Scanner, VALIDATION_FAILED,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

const SCALE: usize = 6;
const QUIET_MODULES: usize = 4;
const LIGHT: u8 = 245;
const DARK: u8 = 15;

static TEMP_DIR_COUNTER: AtomicU64 = AtomicU64::new(0);

fn temp_dir() -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before UNIX epoch")
        .as_nanos();
    let sequence = TEMP_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
    let dir = std::env::temp_dir().join(format!("qrscan_it_{nanos}_{sequence}"));
    fs::create_dir_all(&dir).expect("failed to create temp dir");
    dir
}

/// Render `text` as a QR symbol with a quiet zone, `SCALE` pixels per module
fn render(text: &str) -> (Vec<u8>, usize) {
    render_with(text, LIGHT, DARK)
}

fn render_with(text: &str, light: u8, dark: u8) -> (Vec<u8>, usize) {
    let code = QrCode::new(text.as_bytes()).expect("encodable text");
    let modules = code.width();
    let colors = code.to_colors();
    let side = (modules + 2 * QUIET_MODULES) * SCALE;

    let mut gray = vec![light; side * side];
    for y in 0..side {
        for x in 0..side {
            let mx = (x / SCALE).checked_sub(QUIET_MODULES);
            let my = (y / SCALE).checked_sub(QUIET_MODULES);
            if let (Some(mx), Some(my)) = (mx, my) {
                if mx < modules && my < modules && colors[my * modules + mx] == Color::Dark {
                    gray[y * side + x] = dark;
                }
            }
        }
    }
    (gray, side)
}

fn single_frame(text: &str) -> Frame {
    let (gray, side) = render(text);
    Frame::new(side, side, gray).expect("consistent frame")
}

/// Two symbols side by side, separated by a light gap
fn pair_frame(left: &str, right: &str) -> Frame {
    let (left_gray, left_side) = render(left);
    let (right_gray, right_side) = render(right);
    let gap = 40;
    let width = left_side + gap + right_side;
    let height = left_side.max(right_side);

    let mut gray = vec![LIGHT; width * height];
    for y in 0..left_side {
        let row = &left_gray[y * left_side..(y + 1) * left_side];
        gray[y * width..y * width + left_side].copy_from_slice(row);
    }
    let offset = left_side + gap;
    for y in 0..right_side {
        let row = &right_gray[y * right_side..(y + 1) * right_side];
        gray[y * width + offset..y * width + offset + right_side].copy_from_slice(row);
    }
    Frame::new(width, height, gray).expect("consistent frame")
}

/// A low-contrast symbol beside a black area covering most of the frame.
/// The frame-wide histogram splits at the black area, so one global
/// threshold leaves every module light, while block-local thresholds
/// around the symbol never see the black pixels.
fn shadowed_frame(text: &str) -> Frame {
    let (symbol, side) = render_with(text, 255, 135);
    let gap = 48;
    let shadow = side * 3 / 2;
    let width = side + gap + shadow;

    let mut gray = vec![255; width * side];
    for y in 0..side {
        let row = &mut gray[y * width..(y + 1) * width];
        row[..side].copy_from_slice(&symbol[y * side..(y + 1) * side]);
        row[side + gap..].fill(0);
    }
    Frame::new(width, side, gray).expect("consistent frame")
}

fn save_png(path: &Path, frame: Frame) {
    let (width, height) = (frame.width() as u32, frame.height() as u32);
    let image = image::GrayImage::from_raw(width, height, frame.into_raw()).expect("sized buffer");
    image.save(path).expect("failed to write png");
}

const STRATEGIES: [BinarizationStrategy; 2] =
    [BinarizationStrategy::Global, BinarizationStrategy::Hybrid];

#[test]
fn decodes_single_symbol_with_both_strategies() {
    let orchestrator = Orchestrator::new(RqrrReader::new());
    let frame = single_frame("HELLO QRSCAN");
    for strategy in STRATEGIES {
        let outcome = orchestrator.attempt(&frame, strategy, &DecodeHints::default(), false);
        match outcome {
            DecodeOutcome::Success(results) => {
                assert_eq!(results.len(), 1, "{strategy}");
                assert_eq!(results[0].text, "HELLO QRSCAN");
                assert_eq!(results[0].points.len(), 4);
            }
            other => panic!("{strategy}: expected success, got {other:?}"),
        }
    }
}

#[test]
fn blank_frame_is_not_found() {
    let orchestrator = Orchestrator::new(RqrrReader::new());
    let frame = Frame::filled(120, 90, 230);
    for strategy in STRATEGIES {
        for hints in [DecodeHints::default(), DecodeHints::try_harder()] {
            let outcome = orchestrator.attempt(&frame, strategy, &hints, false);
            assert!(
                matches!(outcome, DecodeOutcome::Failure(FailureKind::NotFound, _)),
                "{strategy}: {outcome:?}"
            );
            assert_eq!(outcome.status(), -2);
        }
    }
}

#[test]
fn attempts_are_idempotent_and_independent() {
    let orchestrator = Orchestrator::new(RqrrReader::new());
    let frame = single_frame("same input, same answer");
    let hints = DecodeHints::default();

    let global_first = orchestrator.attempt(&frame, BinarizationStrategy::Global, &hints, false);
    let hybrid = orchestrator.attempt(&frame, BinarizationStrategy::Hybrid, &hints, false);
    let global_again = orchestrator.attempt(&frame, BinarizationStrategy::Global, &hints, false);
    let hybrid_again = orchestrator.attempt(&frame, BinarizationStrategy::Hybrid, &hints, false);

    assert_eq!(global_first, global_again);
    assert_eq!(hybrid, hybrid_again);
    let texts = |outcome: &DecodeOutcome| -> Vec<String> {
        outcome.results().iter().map(|r| r.text.clone()).collect()
    };
    assert_eq!(texts(&global_first), texts(&hybrid));
}

#[test]
fn only_hybrid_reads_shadowed_symbol() {
    let orchestrator = Orchestrator::new(RqrrReader::new());
    let frame = shadowed_frame("only hybrid");
    let hints = DecodeHints::default();

    let global = orchestrator.attempt(&frame, BinarizationStrategy::Global, &hints, false);
    assert!(
        matches!(global, DecodeOutcome::Failure(FailureKind::NotFound, _)),
        "{global:?}"
    );
    let hybrid = orchestrator.attempt(&frame, BinarizationStrategy::Hybrid, &hints, false);
    assert_eq!(hybrid.results().len(), 1, "{hybrid:?}");
    assert_eq!(hybrid.results()[0].text, "only hybrid");
}

#[test]
fn one_passing_strategy_passes_the_frame() {
    let scanner = Scanner::new(RqrrReader::new(), ScanConfig::default());
    let frame = shadowed_frame("only hybrid");

    let mut out = Vec::new();
    let report = scanner
        .scan_frame(&mut out, &frame, &ExpectedValue::Absent)
        .unwrap();

    // Only the successful attempt prints; the global failure stays quiet
    assert_eq!(String::from_utf8(out).unwrap(), "only hybrid\n");
    assert_eq!(report.attempts.len(), 2);
    assert_eq!(report.attempts[0].strategy, BinarizationStrategy::Global);
    assert_eq!(report.attempts[0].status, -2);
    assert_eq!(report.attempts[1].outcome.results().len(), 1);
    assert_eq!(report.status(), 0);
    assert!(report.passed_on(BinarizationStrategy::Hybrid));
    assert!(!report.passed_on(BinarizationStrategy::Global));

    let mut summary = BatchSummary::default();
    summary.record(&report);
    assert_eq!(summary.passed, 1);
    assert_eq!(summary.hybrid_only, 1);
    assert_eq!(summary.both + summary.global_only + summary.neither, 0);
    assert_eq!(summary.status, 0);
}

#[test]
fn multi_symbol_finds_both_disjoint_codes() {
    let orchestrator = Orchestrator::new(RqrrReader::new());
    let frame = pair_frame("left code", "right code");

    let outcome = orchestrator.attempt(
        &frame,
        BinarizationStrategy::Hybrid,
        &DecodeHints::default(),
        true,
    );
    let results = outcome.results();
    assert_eq!(results.len(), 2, "{outcome:?}");

    let mut texts: Vec<&str> = results.iter().map(|r| r.text.as_str()).collect();
    texts.sort();
    assert_eq!(texts, vec!["left code", "right code"]);

    let (a_min, a_max) = results[0].bounds().expect("corner points");
    let (b_min, b_max) = results[1].bounds().expect("corner points");
    let disjoint =
        a_max.x < b_min.x || b_max.x < a_min.x || a_max.y < b_min.y || b_max.y < a_min.y;
    assert!(disjoint, "symbol bounds overlap");
}

#[test]
fn single_mode_returns_one_of_two_codes() {
    let orchestrator = Orchestrator::new(RqrrReader::new());
    let frame = pair_frame("first", "second");
    let outcome = orchestrator.attempt(
        &frame,
        BinarizationStrategy::Global,
        &DecodeHints::default(),
        false,
    );
    assert_eq!(outcome.results().len(), 1, "{outcome:?}");
}

#[test]
fn test_mode_without_sidecar_fails_validation() {
    let config = ScanConfig {
        test_mode: true,
        binarizers: BinarizerSelection::GlobalOnly,
        ..ScanConfig::default()
    };
    let scanner = Scanner::new(RqrrReader::new(), config);
    let frame = single_frame("no ground truth");

    let mut out = Vec::new();
    let report = scanner
        .read_image(
            &mut out,
            &frame,
            BinarizationStrategy::Global,
            &ExpectedValue::Absent,
        )
        .unwrap();
    assert_eq!(report.status, VALIDATION_FAILED);
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "  Expected text or binary data for image missing.\n  Detected: no ground truth\n\
         Global binarizer failed: expected value missing\n"
    );
}

#[test]
fn batch_test_mode_counts_and_exit_status() {
    let dir = temp_dir();
    let good = dir.join("good.png");
    let wrong = dir.join("wrong.png");
    let blank = dir.join("blank.png");
    save_png(&good, single_frame("ground truth"));
    fs::write(dir.join("good.txt"), "ground truth").unwrap();
    save_png(&wrong, single_frame("actual"));
    fs::write(dir.join("wrong.bin"), "expected").unwrap();
    save_png(&blank, Frame::filled(100, 100, 240));

    let config = ScanConfig {
        test_mode: true,
        ..ScanConfig::default()
    };
    let scanner = Scanner::new(RqrrReader::new(), config);
    let mut out = Vec::new();
    let summary = scanner
        .scan_files(&mut out, &[good.clone(), wrong.clone(), blank.clone()])
        .unwrap();

    assert_eq!(summary.total, 3);
    assert_eq!(summary.passed, 1);
    assert_eq!(summary.both, 1);
    assert_eq!(summary.neither, 2);
    assert_eq!(summary.status, VALIDATION_FAILED);

    let printed = String::from_utf8(out).unwrap();
    // Both strategies report the mismatch; failures stay quiet without --verbose
    assert_eq!(printed.matches("  Expected: expected\n  Detected: actual\n").count(), 2);
    assert!(!printed.contains("binarizer failed"));
    assert!(printed.ends_with(
        "Summary:\n 3 images tested total,\n 1 passed,\n 0 passed only on global,\n \
         0 passed only on hybrid,\n 1 passed on both,\n 2 passed on neither.\n"
    ));
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn batch_prints_names_and_results() {
    let dir = temp_dir();
    let first = dir.join("first.png");
    let second = dir.join("second.png");
    save_png(&first, single_frame("one"));
    save_png(&second, single_frame("two"));

    let config = ScanConfig {
        binarizers: BinarizerSelection::HybridOnly,
        ..ScanConfig::default()
    };
    let scanner = Scanner::new(RqrrReader::new(), config);
    let mut out = Vec::new();
    let summary = scanner
        .scan_files(&mut out, &[first.clone(), second.clone()])
        .unwrap();

    assert_eq!(summary.status, 0);
    assert_eq!(
        String::from_utf8(out).unwrap(),
        format!("{}\none\n{}\ntwo\n", first.display(), second.display())
    );
    let _ = fs::remove_dir_all(dir);
}
