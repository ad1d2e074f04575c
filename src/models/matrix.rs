/// Packed binarized bitmap handed from a binarizer to a symbol reader.
///
/// `true` marks a dark pixel, `false` a light one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitMatrix {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl BitMatrix {
    /// Create an all-light bitmap with the given dimensions
    pub fn new(width: usize, height: usize) -> Self {
        let bytes_needed = (width * height).div_ceil(8);
        Self {
            width,
            height,
            data: vec![0; bytes_needed],
        }
    }

    /// Bitmap width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Bitmap height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether the pixel at (x, y) is dark. Out-of-range reads are light.
    pub fn get(&self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let index = y * self.width + x;
        (self.data[index / 8] >> (index % 8)) & 1 == 1
    }

    /// Set the pixel at (x, y); out-of-range writes are ignored
    pub fn set(&mut self, x: usize, y: usize, value: bool) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = y * self.width + x;
        let byte_index = index / 8;
        let bit_index = index % 8;
        if value {
            self.data[byte_index] |= 1 << bit_index;
        } else {
            self.data[byte_index] &= !(1 << bit_index);
        }
    }

    /// Copy of this bitmap with dark and light swapped
    pub fn inverted(&self) -> Self {
        let mut out = Self::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                out.set(x, y, !self.get(x, y));
            }
        }
        out
    }

    /// Number of dark pixels
    pub fn count_dark(&self) -> usize {
        self.data.iter().map(|b| b.count_ones() as usize).sum()
    }
}

impl Default for BitMatrix {
    fn default() -> Self {
        Self::new(0, 0)
    }
}
