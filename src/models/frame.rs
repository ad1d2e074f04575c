use crate::error::{ScanError, ScanResult};

/// Read access to an 8-bit gray image.
///
/// Implemented by [`Frame`]; capture backends may implement it directly over
/// their own buffers.
pub trait LuminanceSource {
    /// Image width in pixels
    fn width(&self) -> usize;
    /// Image height in pixels
    fn height(&self) -> usize;
    /// Row-major luminance, one byte per pixel (0 = black)
    fn luminance(&self) -> &[u8];
}

/// Owned gray-scale frame for one capture/decode cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl Frame {
    /// Wrap a row-major gray buffer, checking it matches the dimensions
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> ScanResult<Self> {
        let expected = width * height;
        if data.len() != expected {
            return Err(ScanError::InvalidFrame {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Uniform frame, mostly useful for tests and benches
    pub fn filled(width: usize, height: usize, value: u8) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Consume the frame and return its buffer
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }
}

impl LuminanceSource for Frame {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn luminance(&self) -> &[u8] {
        &self.data
    }
}
