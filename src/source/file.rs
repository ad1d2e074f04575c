use crate::config::max_dim_from_env;
use crate::error::{ScanError, ScanResult};
use crate::models::Frame;
use crate::utils::grayscale::rgb_to_grayscale;
use image::GenericImageView;
use std::path::Path;
use tracing::debug;

/// Load an image file as a gray frame.
///
/// Images whose longest side exceeds `QR_MAX_DIM` are downscaled first.
pub fn load_frame<P: AsRef<Path>>(path: P) -> ScanResult<Frame> {
    let path = path.as_ref();
    let img = image::open(path).map_err(|source| ScanError::Image {
        path: path.to_path_buf(),
        source,
    })?;

    let rgb = match max_dim_from_env() {
        Some(max_dim) if img.width().max(img.height()) > max_dim => {
            let (orig_w, orig_h) = img.dimensions();
            let resized = img.resize(max_dim, max_dim, image::imageops::FilterType::Triangle);
            debug!(
                path = %path.display(),
                orig_w,
                orig_h,
                width = resized.width(),
                height = resized.height(),
                "downscaled image"
            );
            resized.to_rgb8()
        }
        _ => img.to_rgb8(),
    };

    let (width, height) = (rgb.width() as usize, rgb.height() as usize);
    let gray = rgb_to_grayscale(rgb.as_raw(), width, height);
    Frame::new(width, height, gray)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LuminanceSource;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_load_frame_converts_to_gray() {
        let path = std::env::temp_dir().join(format!(
            "qrscan_file_source_{}.png",
            std::process::id()
        ));
        let mut img = RgbImage::from_pixel(4, 3, Rgb([255, 255, 255]));
        img.put_pixel(1, 2, Rgb([0, 0, 0]));
        img.save(&path).unwrap();

        let frame = load_frame(&path).unwrap();
        assert_eq!((frame.width(), frame.height()), (4, 3));
        assert_eq!(frame.luminance()[2 * 4 + 1], 0);
        assert_eq!(frame.luminance()[0], 254);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_load_frame_missing_file() {
        let err = load_frame("/definitely/not/here.png").unwrap_err();
        assert!(matches!(err, ScanError::Image { .. }));
    }
}
