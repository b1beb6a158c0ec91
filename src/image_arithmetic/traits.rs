use super::PixelBuffer;
use crate::error::Result;

/// A pure stage of the pipeline: reads a buffer and returns a new one.
pub trait PixelTransform {
    fn transform(&self, input: &PixelBuffer) -> Result<PixelBuffer>;
}
