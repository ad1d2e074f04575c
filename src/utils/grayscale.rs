//! Pixel format to luminance conversion.
//!
//! Y = 0.299*R + 0.587*G + 0.114*B, computed in fixed point as
//! Y = (76*R + 150*G + 29*B) >> 8

use rayon::prelude::*;

/// Coefficients for grayscale conversion: Y = (76*R + 150*G + 29*B) >> 8
const COEF_R: u32 = 76;
const COEF_G: u32 = 150;
const COEF_B: u32 = 29;

#[inline]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    let lum = (COEF_R * r as u32 + COEF_G * g as u32 + COEF_B * b as u32) >> 8;
    lum.min(255) as u8
}

/// Convert packed RGB to grayscale, rows in parallel
pub fn rgb_to_grayscale(rgb: &[u8], width: usize, height: usize) -> Vec<u8> {
    let mut gray = vec![0u8; width * height];
    if width == 0 {
        return gray;
    }

    gray.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        let row_start = y * width * 3;
        for (x, out) in row.iter_mut().enumerate() {
            let idx = row_start + x * 3;
            *out = luma(rgb[idx], rgb[idx + 1], rgb[idx + 2]);
        }
    });

    gray
}

/// Extract the luma plane of a packed YUYV (YUY2) buffer.
///
/// `stride` is the length of one row in bytes; pass `width * 2` for
/// unpadded buffers. Short buffers yield black rows for the missing tail.
pub fn yuyv_to_grayscale(yuyv: &[u8], width: usize, height: usize, stride: usize) -> Vec<u8> {
    let mut gray = vec![0u8; width * height];
    for y in 0..height {
        let row_start = y * stride;
        let Some(row) = yuyv.get(row_start..row_start + width * 2) else {
            break;
        };
        for (out, px) in gray[y * width..(y + 1) * width]
            .iter_mut()
            .zip(row.chunks_exact(2))
        {
            *out = px[0];
        }
    }
    gray
}
