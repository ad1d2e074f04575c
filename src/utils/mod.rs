//! Utility functions for image processing
//!
//! - Grayscale conversion (RGB and YUYV to luminance)
//! - Binarization (global histogram and block-local thresholds)

pub mod binarization;
pub mod grayscale;
