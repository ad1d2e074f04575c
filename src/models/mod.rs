pub mod frame;
pub mod matrix;
pub mod point;
pub mod result;

pub use frame::{Frame, LuminanceSource};
pub use matrix::BitMatrix;
pub use point::Point;
pub use result::{BarcodeFormat, DecodeResult};
