use clap::Parser;
use qrscan::{BinarizerSelection, RqrrReader, ScanConfig, Scanner};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[cfg_attr(not(feature = "camera"), allow(dead_code))]
#[command(name = "qrscan", version, about = "Decode QR codes with selectable binarizers")]
struct Cli {
    /// Print format and corner points for each result
    #[arg(long)]
    more: bool,
    /// Compare results against <image>.txt / <image>.bin and print a summary
    #[arg(long)]
    test_mode: bool,
    /// Search harder for symbols (slower)
    #[arg(long)]
    try_harder: bool,
    /// Decode every symbol in an image
    #[arg(long)]
    search_multi: bool,
    /// Use only the hybrid binarizer
    #[arg(long)]
    hybrid: bool,
    /// Use only the global binarizer
    #[arg(long)]
    global: bool,
    /// Report every attempt
    #[arg(long)]
    verbose: bool,
    /// Images contain one tightly cropped symbol
    #[arg(long)]
    pure_barcode: bool,
    /// Scan frames from a camera instead of files
    #[arg(long)]
    camera: bool,
    /// Camera index (/dev/video<N>)
    #[arg(long, default_value_t = 0, requires = "camera")]
    device: usize,
    /// Requested capture width
    #[arg(long, default_value_t = 640, requires = "camera")]
    width: u32,
    /// Requested capture height
    #[arg(long, default_value_t = 480, requires = "camera")]
    height: u32,
    /// Image files
    #[arg(required_unless_present = "camera")]
    images: Vec<PathBuf>,
}

impl Cli {
    fn config(&self) -> ScanConfig {
        ScanConfig {
            more: self.more,
            test_mode: self.test_mode,
            try_harder: self.try_harder,
            pure_barcode: self.pure_barcode,
            search_multi: self.search_multi,
            binarizers: BinarizerSelection::from_flags(self.global, self.hybrid),
            verbose: self.verbose,
        }
    }
}

fn main() {
    // Logs go to stderr so stdout only carries report lines
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();
    let scanner = Scanner::new(RqrrReader::new(), cli.config());

    let status = if cli.camera {
        run_camera(&scanner, &cli)
    } else {
        run_files(&scanner, &cli.images)
    };

    match status {
        Ok(status) => process::exit(status),
        Err(err) => {
            eprintln!("qrscan: {err}");
            process::exit(1);
        }
    }
}

fn run_files(
    scanner: &Scanner<RqrrReader>,
    images: &[PathBuf],
) -> Result<i32, Box<dyn std::error::Error>> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let summary = scanner.scan_files(&mut out, images)?;
    out.flush()?;
    Ok(summary.status)
}

#[cfg(feature = "camera")]
fn run_camera(
    scanner: &Scanner<RqrrReader>,
    cli: &Cli,
) -> Result<i32, Box<dyn std::error::Error>> {
    use qrscan::ExpectedValue;
    use qrscan::source::camera::V4lCamera;
    use qrscan::source::{LoopExit, interrupt_flag, open_and_capture};

    let stop = interrupt_flag()?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut write_error = None;
    let exit = open_and_capture(
        || V4lCamera::open(cli.device, cli.width, cli.height),
        &stop,
        |frame| {
            if write_error.is_some() {
                return;
            }
            let written = scanner
                .scan_frame(&mut out, frame, &ExpectedValue::Absent)
                .and_then(|_| out.flush());
            if let Err(err) = written {
                // stdout is gone, nothing left to report to
                write_error = Some(err);
                stop.store(true, std::sync::atomic::Ordering::SeqCst);
            }
        },
    );

    if let Some(err) = write_error {
        return Err(err.into());
    }
    match exit {
        LoopExit::Unavailable => tracing::warn!(device = cli.device, "camera unavailable"),
        LoopExit::SourceLost => tracing::warn!(device = cli.device, "camera lost, exiting"),
        LoopExit::Cancelled => {}
    }
    Ok(exit.status())
}

#[cfg(not(feature = "camera"))]
fn run_camera(
    _scanner: &Scanner<RqrrReader>,
    _cli: &Cli,
) -> Result<i32, Box<dyn std::error::Error>> {
    Err("qrscan was built without the `camera` feature".into())
}
