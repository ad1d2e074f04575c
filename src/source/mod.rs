//! Frame sources and the capture loop.
//!
//! - Still images from disk ([`load_frame`])
//! - V4L2 cameras behind the `camera` feature
//! - [`run_capture_loop`]: read, reopen once on failure, stop on request
//! - [`open_and_capture`]: the same, treating an unopenable source as lost

#[cfg(feature = "camera")]
pub mod camera;
mod file;

pub use file::load_frame;

use crate::error::ScanResult;
use crate::models::Frame;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

/// Something that produces gray frames one at a time
pub trait FrameSource {
    /// Block until the next frame is available
    fn read_frame(&mut self) -> ScanResult<Frame>;

    /// Close and reopen the underlying device
    fn reopen(&mut self) -> ScanResult<()>;
}

/// Why [`run_capture_loop`] returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// The stop flag was raised
    Cancelled,
    /// A read failed, and reopening or the read after it failed as well
    SourceLost,
    /// The source could not be opened at all
    Unavailable,
}

impl LoopExit {
    /// Process status for this exit. Losing the source is not an error.
    pub fn status(&self) -> i32 {
        match self {
            LoopExit::Cancelled | LoopExit::SourceLost | LoopExit::Unavailable => 0,
        }
    }
}

/// Feed frames from `source` to `on_frame` until `stop` is raised.
///
/// `stop` is checked once per iteration. A failed read triggers one reopen
/// and one more read; if either fails the loop ends.
pub fn run_capture_loop<S, F>(source: &mut S, stop: &AtomicBool, mut on_frame: F) -> LoopExit
where
    S: FrameSource + ?Sized,
    F: FnMut(&Frame),
{
    while !stop.load(Ordering::SeqCst) {
        let frame = match source.read_frame() {
            Ok(frame) => frame,
            Err(err) => {
                warn!(error = %err, "frame read failed, reopening source");
                match source.reopen().and_then(|()| source.read_frame()) {
                    Ok(frame) => frame,
                    Err(err) => {
                        warn!(error = %err, "frame source lost");
                        return LoopExit::SourceLost;
                    }
                }
            }
        };
        on_frame(&frame);
    }
    info!("capture loop cancelled");
    LoopExit::Cancelled
}

/// Open a source with `open`, then run [`run_capture_loop`] on it.
pub fn open_and_capture<S, O, F>(open: O, stop: &AtomicBool, on_frame: F) -> LoopExit
where
    S: FrameSource,
    O: FnOnce() -> ScanResult<S>,
    F: FnMut(&Frame),
{
    let mut source = match open() {
        Ok(source) => source,
        Err(err) => {
            warn!(error = %err, "frame source unavailable");
            return LoopExit::Unavailable;
        }
    };
    run_capture_loop(&mut source, stop, on_frame)
}

/// Stop flag raised by Ctrl+C
pub fn interrupt_flag() -> ScanResult<Arc<AtomicBool>> {
    let stop = Arc::new(AtomicBool::new(false));
    let handler_flag = stop.clone();
    ctrlc::set_handler(move || {
        handler_flag.store(true, Ordering::SeqCst);
    })?;
    Ok(stop)
}
