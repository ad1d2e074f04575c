//! Symbol reader seam.
//!
//! A [`SymbolReader`] turns a binarized bitmap into decoded symbols. The
//! production reader is [`RqrrReader`]; tests substitute their own.

mod rqrr_reader;

pub use rqrr_reader::RqrrReader;

use crate::models::{BitMatrix, DecodeResult};
use thiserror::Error;

/// Options passed to a reader for one decode attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeHints {
    /// Spend more effort searching (slower)
    pub try_harder: bool,
    /// The image holds a single tightly cropped symbol
    pub pure_barcode: bool,
}

impl DecodeHints {
    /// Hints with `try_harder` set
    pub fn try_harder() -> Self {
        Self {
            try_harder: true,
            ..Self::default()
        }
    }
}

/// Failure taxonomy reported by a symbol reader
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReaderError {
    /// No symbol was located
    #[error("{0}")]
    NotFound(String),
    /// A symbol was located but its format information is unreadable
    #[error("{0}")]
    Format(String),
    /// Symbol data failed error correction
    #[error("{0}")]
    Checksum(String),
    /// The reader was handed an unusable image or option
    #[error("{0}")]
    IllegalArgument(String),
    /// Any other reader failure
    #[error("{0}")]
    Other(String),
}

/// Locates and decodes symbols in a bitmap
pub trait SymbolReader {
    /// Decode exactly one symbol
    fn decode(&self, image: &BitMatrix, hints: &DecodeHints) -> Result<DecodeResult, ReaderError>;

    /// Decode every distinct symbol in the image
    fn decode_multiple(
        &self,
        image: &BitMatrix,
        hints: &DecodeHints,
    ) -> Result<Vec<DecodeResult>, ReaderError>;
}

impl<R: SymbolReader + ?Sized> SymbolReader for &R {
    fn decode(&self, image: &BitMatrix, hints: &DecodeHints) -> Result<DecodeResult, ReaderError> {
        (**self).decode(image, hints)
    }

    fn decode_multiple(
        &self,
        image: &BitMatrix,
        hints: &DecodeHints,
    ) -> Result<Vec<DecodeResult>, ReaderError> {
        (**self).decode_multiple(image, hints)
    }
}
