//! One-sided border padding ahead of a convolution.
//!
//! The pad is asymmetric: one replicated column is appended on the right and
//! one replicated row at the bottom. The top row and left column are not
//! duplicated.

use crate::error::Result;
use crate::image_arithmetic::{PixelBuffer, PixelTransform};

#[derive(Debug, Default, Clone, Copy)]
pub struct EdgeExtender;

impl PixelTransform for EdgeExtender {
    fn transform(&self, input: &PixelBuffer) -> Result<PixelBuffer> {
        return extend(input);
    }
}

/// Pads `img` to `(width + 1) x (height + 1)` by repeating its last column and row.
pub fn extend(img: &PixelBuffer) -> Result<PixelBuffer> {
    let (width, height) = img.dimensions();
    let mut extended = PixelBuffer::new(width + 1, height + 1, img.layout())?;
    for y in 0..=height {
        for x in 0..=width {
            let source = img.pixel(x.min(width - 1), y.min(height - 1));
            extended.pixel_mut(x, y).copy_from_slice(source);
        }
    }
    return Ok(extended);
}
