use super::Point;
use std::fmt;

/// Symbology of a decoded symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BarcodeFormat {
    /// QR Code (Model 2)
    QrCode,
}

impl BarcodeFormat {
    /// Upper-case name used in reports
    pub fn name(&self) -> &'static str {
        match self {
            BarcodeFormat::QrCode => "QR_CODE",
        }
    }
}

impl fmt::Display for BarcodeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One decoded symbol
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeResult {
    /// Decoded content
    pub text: String,
    /// Symbology
    pub format: BarcodeFormat,
    /// Corner points in frame coordinates, in reader order
    pub points: Vec<Point>,
    /// Symbol version when the reader reports one
    pub version: Option<usize>,
}

impl DecodeResult {
    /// Create a result without version information
    pub fn new(text: impl Into<String>, format: BarcodeFormat, points: Vec<Point>) -> Self {
        Self {
            text: text.into(),
            format,
            points,
            version: None,
        }
    }

    /// Axis-aligned bounds of the result points as `(min, max)`
    pub fn bounds(&self) -> Option<(Point, Point)> {
        let first = self.points.first()?;
        let mut min = *first;
        let mut max = *first;
        for p in &self.points[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some((min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_name() {
        assert_eq!(BarcodeFormat::QrCode.to_string(), "QR_CODE");
    }

    #[test]
    fn test_bounds() {
        let result = DecodeResult::new(
            "x",
            BarcodeFormat::QrCode,
            vec![
                Point::new(10.0, 5.0),
                Point::new(30.0, 6.0),
                Point::new(29.0, 25.0),
                Point::new(9.0, 24.0),
            ],
        );
        let (min, max) = result.bounds().unwrap();
        assert_eq!(min, Point::new(9.0, 5.0));
        assert_eq!(max, Point::new(30.0, 25.0));

        let empty = DecodeResult::new("y", BarcodeFormat::QrCode, Vec::new());
        assert!(empty.bounds().is_none());
    }
}
