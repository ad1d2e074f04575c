//! Gray-scale to bitmap conversion.
//!
//! Two thresholding policies back the two binarization strategies:
//! a single histogram-derived threshold for the whole frame, and a
//! block-local threshold that tolerates uneven lighting.

use crate::models::BitMatrix;

/// Block edge for local thresholding is `1 << BLOCK_SIZE_POWER` pixels
const BLOCK_SIZE_POWER: usize = 3;
const BLOCK_SIZE: usize = 1 << BLOCK_SIZE_POWER;
/// Frames narrower or shorter than this fall back to the global threshold
const MINIMUM_DIMENSION: usize = BLOCK_SIZE * 5;
/// Blocks whose min/max spread is at or below this are treated as flat
const MIN_DYNAMIC_RANGE: u32 = 24;

/// Binarize with a single threshold chosen by Otsu's method over the
/// luminance histogram. Pixels strictly below the threshold are dark.
pub fn global_histogram_binarize(gray: &[u8], width: usize, height: usize) -> BitMatrix {
    let threshold = calculate_otsu_threshold(gray);
    let mut binary = BitMatrix::new(width, height);

    for y in 0..height {
        let row = &gray[y * width..(y + 1) * width];
        for (x, &pixel) in row.iter().enumerate() {
            if pixel < threshold {
                binary.set(x, y, true);
            }
        }
    }

    binary
}

/// Otsu's threshold: the split maximising between-class variance.
/// Returns 128 for single-valued images.
pub fn calculate_otsu_threshold(gray: &[u8]) -> u8 {
    let mut histogram = [0u32; 256];
    for &pixel in gray {
        histogram[pixel as usize] += 1;
    }

    let total_pixels = gray.len() as f64;
    let total_sum: f64 = histogram
        .iter()
        .enumerate()
        .map(|(intensity, &count)| intensity as f64 * count as f64)
        .sum();

    let mut class1_pixels = 0.0f64;
    let mut class1_sum = 0.0f64;
    let mut max_variance = 0.0;
    let mut optimal_threshold = 128u8;

    // class 1 holds intensities strictly below `threshold`
    for threshold in 1..=255usize {
        let count = histogram[threshold - 1] as f64;
        class1_pixels += count;
        class1_sum += count * (threshold - 1) as f64;

        let class2_pixels = total_pixels - class1_pixels;
        if class1_pixels == 0.0 || class2_pixels == 0.0 {
            continue;
        }

        let class1_mean = class1_sum / class1_pixels;
        let class2_mean = (total_sum - class1_sum) / class2_pixels;
        let weight1 = class1_pixels / total_pixels;
        let weight2 = class2_pixels / total_pixels;
        let variance = weight1 * weight2 * (class1_mean - class2_mean).powi(2);

        if variance > max_variance {
            max_variance = variance;
            optimal_threshold = threshold as u8;
        }
    }

    optimal_threshold
}

/// Binarize with per-block thresholds.
///
/// The frame is cut into 8x8 blocks. Each block gets a black point (its mean,
/// or for low-contrast blocks a value derived from its minimum and its
/// already-visited neighbours), and every block is thresholded at the mean
/// black point of the surrounding 5x5 blocks. Pixels at or below the
/// threshold are dark. Small frames use [`global_histogram_binarize`].
pub fn hybrid_binarize(gray: &[u8], width: usize, height: usize) -> BitMatrix {
    if width < MINIMUM_DIMENSION || height < MINIMUM_DIMENSION {
        return global_histogram_binarize(gray, width, height);
    }

    let sub_width = width.div_ceil(BLOCK_SIZE);
    let sub_height = height.div_ceil(BLOCK_SIZE);
    let black_points = calculate_black_points(gray, sub_width, sub_height, width, height);

    let mut binary = BitMatrix::new(width, height);
    let max_x_offset = width - BLOCK_SIZE;
    let max_y_offset = height - BLOCK_SIZE;

    for y in 0..sub_height {
        let y_offset = (y << BLOCK_SIZE_POWER).min(max_y_offset);
        let top = cap(y, sub_height - 3);
        for x in 0..sub_width {
            let x_offset = (x << BLOCK_SIZE_POWER).min(max_x_offset);
            let left = cap(x, sub_width - 3);

            let mut sum = 0u32;
            for row in top - 2..=top + 2 {
                let base = row * sub_width;
                sum += black_points[base + left - 2..=base + left + 2]
                    .iter()
                    .sum::<u32>();
            }
            let threshold = sum / 25;

            threshold_block(gray, x_offset, y_offset, threshold, width, &mut binary);
        }
    }

    binary
}

fn cap(value: usize, max: usize) -> usize {
    if value < 2 { 2 } else { value.min(max) }
}

fn calculate_black_points(
    gray: &[u8],
    sub_width: usize,
    sub_height: usize,
    width: usize,
    height: usize,
) -> Vec<u32> {
    let max_x_offset = width - BLOCK_SIZE;
    let max_y_offset = height - BLOCK_SIZE;
    let mut black_points = vec![0u32; sub_width * sub_height];

    for y in 0..sub_height {
        let y_offset = (y << BLOCK_SIZE_POWER).min(max_y_offset);
        for x in 0..sub_width {
            let x_offset = (x << BLOCK_SIZE_POWER).min(max_x_offset);

            let mut sum = 0u32;
            let mut min = u32::from(u8::MAX);
            let mut max = 0u32;
            for yy in 0..BLOCK_SIZE {
                let start = (y_offset + yy) * width + x_offset;
                for &pixel in &gray[start..start + BLOCK_SIZE] {
                    let pixel = u32::from(pixel);
                    sum += pixel;
                    min = min.min(pixel);
                    max = max.max(pixel);
                }
            }

            let average = if max - min > MIN_DYNAMIC_RANGE {
                sum >> (BLOCK_SIZE_POWER * 2)
            } else {
                // Flat block: assume background unless the neighbours say otherwise
                let mut average = min / 2;
                if y > 0 && x > 0 {
                    let neighbor = (black_points[(y - 1) * sub_width + x]
                        + 2 * black_points[y * sub_width + x - 1]
                        + black_points[(y - 1) * sub_width + x - 1])
                        / 4;
                    if min < neighbor {
                        average = neighbor;
                    }
                }
                average
            };
            black_points[y * sub_width + x] = average;
        }
    }

    black_points
}

fn threshold_block(
    gray: &[u8],
    x_offset: usize,
    y_offset: usize,
    threshold: u32,
    width: usize,
    binary: &mut BitMatrix,
) {
    for yy in 0..BLOCK_SIZE {
        let y = y_offset + yy;
        let start = y * width + x_offset;
        for (xx, &pixel) in gray[start..start + BLOCK_SIZE].iter().enumerate() {
            if u32::from(pixel) <= threshold {
                binary.set(x_offset + xx, y, true);
            }
        }
    }
}
