use super::{DecodeHints, ReaderError, SymbolReader};
use crate::models::{BarcodeFormat, BitMatrix, DecodeResult, Point};
use rqrr::{DeQRError, PreparedImage};
use tracing::{debug, trace};

/// Light border added around the bitmap for `pure_barcode` images
const QUIET_ZONE: usize = 8;

/// QR reader backed by the `rqrr` crate.
///
/// rqrr locates finder patterns, samples the grid and runs error correction;
/// this type only feeds it our bitmap and maps its results and errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct RqrrReader;

impl RqrrReader {
    /// Create a reader
    pub fn new() -> Self {
        Self
    }

    fn scan(
        &self,
        image: &BitMatrix,
        hints: &DecodeHints,
    ) -> Result<Vec<DecodeResult>, ReaderError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(ReaderError::IllegalArgument(format!(
                "bitmap must not be empty ({}x{})",
                image.width(),
                image.height()
            )));
        }

        let border = if hints.pure_barcode { QUIET_ZONE } else { 0 };
        let (results, mut error) = scan_bitmap(image, border);
        if !results.is_empty() {
            return Ok(results);
        }

        if hints.try_harder {
            trace!("no symbol on direct pass, retrying inverted");
            let (results, inverted_error) = scan_bitmap(&image.inverted(), border);
            if !results.is_empty() {
                return Ok(results);
            }
            error = error.or(inverted_error);
        }

        Err(error.unwrap_or_else(|| ReaderError::NotFound("no QR code found".to_string())))
    }
}

impl SymbolReader for RqrrReader {
    fn decode(&self, image: &BitMatrix, hints: &DecodeHints) -> Result<DecodeResult, ReaderError> {
        self.scan(image, hints)?
            .into_iter()
            .next()
            .ok_or_else(|| ReaderError::NotFound("no QR code found".to_string()))
    }

    fn decode_multiple(
        &self,
        image: &BitMatrix,
        hints: &DecodeHints,
    ) -> Result<Vec<DecodeResult>, ReaderError> {
        let mut distinct: Vec<DecodeResult> = Vec::new();
        for result in self.scan(image, hints)? {
            if !distinct.iter().any(|seen| seen.text == result.text) {
                distinct.push(result);
            }
        }
        Ok(distinct)
    }
}

/// Run rqrr over `image` padded by `border` light pixels. Returns every
/// decoded grid plus the first grid error.
fn scan_bitmap(image: &BitMatrix, border: usize) -> (Vec<DecodeResult>, Option<ReaderError>) {
    let width = image.width() + 2 * border;
    let height = image.height() + 2 * border;
    let mut prepared = PreparedImage::prepare_from_bitmap(width, height, |x, y| {
        let (ix, iy) = (x.wrapping_sub(border), y.wrapping_sub(border));
        if ix >= image.width() || iy >= image.height() {
            return false;
        }
        image.get(ix, iy)
    });

    let grids = prepared.detect_grids();
    trace!(grids = grids.len(), border, "located candidate grids");

    let offset = -(border as f32);
    let mut results = Vec::with_capacity(grids.len());
    let mut error = None;
    for grid in grids {
        match grid.decode() {
            Ok((meta, text)) => {
                let points = grid
                    .bounds
                    .iter()
                    .map(|p| Point::from(p).translate(offset, offset))
                    .collect();
                results.push(DecodeResult {
                    text,
                    format: BarcodeFormat::QrCode,
                    points,
                    version: Some(meta.version.0),
                });
            }
            Err(err) => {
                debug!(error = %err, "QR grid failed to decode");
                error.get_or_insert_with(|| classify(err));
            }
        }
    }

    (results, error)
}

fn classify(err: DeQRError) -> ReaderError {
    let message = err.to_string();
    match err {
        DeQRError::FormatEcc | DeQRError::InvalidVersion | DeQRError::InvalidGridSize => {
            ReaderError::Format(message)
        }
        DeQRError::DataEcc => ReaderError::Checksum(message),
        _ => ReaderError::Other(message),
    }
}
