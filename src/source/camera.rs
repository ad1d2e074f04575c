//! V4L2 camera capture.
//!
//! Frames are requested as YUYV so the luma plane can be taken directly
//! without a color conversion.

use super::FrameSource;
use crate::error::{ScanError, ScanResult};
use crate::models::Frame;
use crate::utils::grayscale::yuyv_to_grayscale;
use tracing::info;
use v4l::buffer::Type;
use v4l::io::mmap::Stream;
use v4l::io::traits::CaptureStream;
use v4l::prelude::*;
use v4l::video::Capture;
use v4l::{Format, FourCC};

const CAPTURE_BUFFERS: u32 = 4;

/// Camera at `/dev/video<index>`
pub struct V4lCamera {
    index: usize,
    width: u32,
    height: u32,
    stream: Option<Stream<'static>>,
    format: Format,
}

impl V4lCamera {
    /// Open the device and start streaming at the requested size.
    /// The driver may pick a different size; frames use what it reports.
    pub fn open(index: usize, width: u32, height: u32) -> ScanResult<Self> {
        let (stream, format) = open_stream(index, width, height)?;
        Ok(Self {
            index,
            width,
            height,
            stream: Some(stream),
            format,
        })
    }
}

impl FrameSource for V4lCamera {
    fn read_frame(&mut self) -> ScanResult<Frame> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| ScanError::Camera("stream is not open".into()))?;
        let (buf, _meta) = stream
            .next()
            .map_err(|e| ScanError::Camera(format!("capture failed: {e}")))?;

        let width = self.format.width as usize;
        let height = self.format.height as usize;
        let stride = match self.format.stride as usize {
            0 => width * 2,
            stride => stride,
        };
        Frame::new(width, height, yuyv_to_grayscale(buf, width, height, stride))
    }

    fn reopen(&mut self) -> ScanResult<()> {
        // Release the old stream first, the device refuses a second one
        self.stream = None;
        let (stream, format) = open_stream(self.index, self.width, self.height)?;
        self.stream = Some(stream);
        self.format = format;
        Ok(())
    }
}

fn open_stream(index: usize, width: u32, height: u32) -> ScanResult<(Stream<'static>, Format)> {
    let dev = Device::new(index)
        .map_err(|e| ScanError::Camera(format!("failed to open /dev/video{index}: {e}")))?;

    let yuyv = FourCC::new(b"YUYV");
    let format = dev
        .set_format(&Format::new(width, height, yuyv))
        .map_err(|e| ScanError::Camera(format!("failed to set format: {e}")))?;
    if format.fourcc != yuyv {
        return Err(ScanError::Camera(format!(
            "device does not deliver YUYV (got {})",
            format.fourcc
        )));
    }

    let stream = Stream::with_buffers(&dev, Type::VideoCapture, CAPTURE_BUFFERS)
        .map_err(|e| ScanError::Camera(format!("failed to create stream: {e}")))?;

    info!(
        index,
        width = format.width,
        height = format.height,
        stride = format.stride,
        "camera streaming"
    );
    Ok((stream, format))
}
