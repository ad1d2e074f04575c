use clap::{Args, Parser, Subcommand};
use qrscan::tools::{
    ImageScore, ReadingRate, bench_limit_from_env, binary_stats, dataset_iter,
    dataset_root_from_env, grayscale_stats, score_images, smoke_from_env,
};
use qrscan::{
    BinarizationStrategy, BinarizerSelection, DecodeHints, DecodeOutcome, LuminanceSource,
    Orchestrator, RqrrReader,
};
use qrscan::source::load_frame;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "qrtool", version, about = "qrscan dataset tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct DatasetArgs {
    /// Dataset root (defaults to QR_DATASET_ROOT)
    #[arg(long)]
    root: Option<PathBuf>,
    /// Maximum number of images (defaults to QR_BENCH_LIMIT)
    #[arg(long)]
    limit: Option<usize>,
    /// Use the images listed in <root>/_smoke.txt
    #[arg(long)]
    smoke: bool,
}

impl DatasetArgs {
    fn images(&self) -> Option<(PathBuf, Vec<PathBuf>)> {
        let root = self.root.clone().unwrap_or_else(dataset_root_from_env);
        let limit = self.limit.or_else(bench_limit_from_env);
        let smoke = self.smoke || smoke_from_env();

        if !root.exists() {
            eprintln!("Dataset root not found: {}", root.display());
            return None;
        }
        let images: Vec<PathBuf> = dataset_iter(&root, limit, smoke).collect();
        if images.is_empty() {
            println!("No images found under {}", root.display());
            return None;
        }
        Some((root, images))
    }
}

#[derive(Subcommand)]
enum Command {
    /// Print grayscale/binary stats and both decode attempts for an image
    Stats {
        #[arg(long)]
        image: PathBuf,
        #[arg(long)]
        try_harder: bool,
    },
    /// Compute per-binarizer reading rate on images with sidecar files
    ReadingRate {
        #[command(flatten)]
        dataset: DatasetArgs,
        /// Score only the global binarizer
        #[arg(long)]
        global: bool,
        /// Score only the hybrid binarizer
        #[arg(long)]
        hybrid: bool,
        #[arg(long)]
        try_harder: bool,
    },
    /// Time one attempt per binarizer on every dataset image
    DatasetBench {
        #[command(flatten)]
        dataset: DatasetArgs,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Stats { image, try_harder } => stats_cmd(&image, try_harder),
        Command::ReadingRate {
            dataset,
            global,
            hybrid,
            try_harder,
        } => reading_rate_cmd(
            &dataset,
            BinarizerSelection::from_flags(global, hybrid),
            try_harder,
        ),
        Command::DatasetBench { dataset } => dataset_bench_cmd(&dataset),
    }
}

fn hints(try_harder: bool) -> DecodeHints {
    DecodeHints {
        try_harder,
        ..DecodeHints::default()
    }
}

fn stats_cmd(image: &Path, try_harder: bool) {
    let frame = match load_frame(image) {
        Ok(frame) => frame,
        Err(err) => {
            eprintln!("Failed to load image {}: {}", image.display(), err);
            return;
        }
    };

    println!(
        "Image: {} ({}x{})",
        image.display(),
        frame.width(),
        frame.height()
    );

    let gray_stats = grayscale_stats(frame.luminance());
    println!(
        "Grayscale range: {}-{}, average: {}",
        gray_stats.min, gray_stats.max, gray_stats.avg
    );

    let orchestrator = Orchestrator::new(RqrrReader::new());
    for strategy in [BinarizationStrategy::Global, BinarizationStrategy::Hybrid] {
        match strategy.binarize(&frame) {
            Ok(binary) => {
                let stats = binary_stats(&binary);
                println!(
                    "{strategy}: dark_pixels={} total={} dark_ratio={:.2}%",
                    stats.dark_pixels,
                    stats.total_pixels,
                    stats.dark_ratio * 100.0
                );
            }
            Err(err) => println!("{strategy}: binarization failed: {err}"),
        }

        let start = Instant::now();
        let outcome = orchestrator.attempt(&frame, strategy, &hints(try_harder), true);
        let elapsed = start.elapsed();
        match &outcome {
            DecodeOutcome::Success(results) => {
                println!("  status 0, {} results ({elapsed:.2?})", results.len());
                for (i, result) in results.iter().enumerate() {
                    println!(
                        "  [{i}] version={:?} bounds={:?} text={:?}",
                        result.version,
                        result.bounds(),
                        result.text
                    );
                }
            }
            DecodeOutcome::Failure(_, message) => {
                println!("  status {}: {message} ({elapsed:.2?})", outcome.status());
            }
        }
    }
}

fn reading_rate_cmd(dataset: &DatasetArgs, binarizers: BinarizerSelection, try_harder: bool) {
    let Some((root, images)) = dataset.images() else {
        return;
    };

    println!("qrscan Reading Rate: {}", root.display());
    println!("=====================================\n");

    let orchestrator = Orchestrator::new(RqrrReader::new());
    let scores = score_images(&orchestrator, &hints(try_harder), binarizers, &images);

    let mut index = 0usize;
    for (path, score) in images.iter().zip(&scores) {
        let verdict = match score {
            ImageScore::Unlabeled => continue,
            ImageScore::LoadFailed => "load_failed".to_string(),
            ImageScore::Scored {
                global,
                hybrid,
                elapsed,
            } => format!(
                "global={} hybrid={} ({elapsed:.2?})",
                hit_or_miss(*global),
                hit_or_miss(*hybrid)
            ),
        };
        index += 1;
        println!("  [{index}] {} -> {verdict}", path.display());
    }

    let rate = ReadingRate::from_scores(&scores);
    if rate.labeled == 0 {
        println!("No labeled images found under {}", root.display());
        return;
    }

    println!("\n=====================================");
    if binarizers.use_global() {
        println!(
            "Global: {}/{} = {:.2}%",
            rate.global,
            rate.labeled,
            rate.percent(rate.global)
        );
    }
    if binarizers.use_hybrid() {
        println!(
            "Hybrid: {}/{} = {:.2}%",
            rate.hybrid,
            rate.labeled,
            rate.percent(rate.hybrid)
        );
    }
    println!(
        "Either: {}/{} = {:.2}%",
        rate.either,
        rate.labeled,
        rate.percent(rate.either)
    );
    if rate.load_failed > 0 {
        println!("Load failures: {}", rate.load_failed);
    }
    println!("Decode time: {:.2?}", rate.elapsed);
    println!("=====================================");
}

fn hit_or_miss(hit: bool) -> &'static str {
    if hit { "hit" } else { "miss" }
}

fn dataset_bench_cmd(dataset: &DatasetArgs) {
    let Some((_, images)) = dataset.images() else {
        return;
    };

    let orchestrator = Orchestrator::new(RqrrReader::new());
    let hints = DecodeHints::default();
    let mut totals = [Duration::default(); 2];
    let strategies = [BinarizationStrategy::Global, BinarizationStrategy::Hybrid];

    for path in images {
        let frame = match load_frame(&path) {
            Ok(frame) => frame,
            Err(err) => {
                eprintln!("Failed to load {}: {}", path.display(), err);
                continue;
            }
        };

        let mut line = format!("{}: {}x{}", path.display(), frame.width(), frame.height());
        for (total, strategy) in totals.iter_mut().zip(strategies) {
            let start = Instant::now();
            let outcome = orchestrator.attempt(&frame, strategy, &hints, false);
            let elapsed = start.elapsed();
            *total += elapsed;
            line.push_str(&format!(
                " | {strategy} status {} ({elapsed:.2?})",
                outcome.status()
            ));
        }
        println!("{line}");
    }

    for (total, strategy) in totals.iter().zip(strategies) {
        println!("{strategy} total time: {total:.2?}");
    }
}
