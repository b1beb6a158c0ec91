//! Binary thresholding of intensity buffers.

use tracing::{debug, warn};

use crate::error::Result;
use crate::image_arithmetic::{Layout, PixelBuffer, PixelTransform};

pub const DEFAULT_CUTOFF: i32 = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholder {
    pub cutoff: i32,
}

impl Default for Thresholder {
    fn default() -> Self {
        Self { cutoff: DEFAULT_CUTOFF }
    }
}

impl Thresholder {
    pub fn new(cutoff: i32) -> Self {
        Self { cutoff }
    }
}

impl PixelTransform for Thresholder {
    fn transform(&self, input: &PixelBuffer) -> Result<PixelBuffer> {
        return threshold(input, self.cutoff);
    }
}

/// Maps every sample strictly above `cutoff` to 255 and everything else to 0.
///
/// Cutoffs outside `[0, 255]` are accepted and give a constant image.
pub fn threshold(gray: &PixelBuffer, cutoff: i32) -> Result<PixelBuffer> {
    gray.expect_layout(Layout::Gray)?;
    if !(0..=255).contains(&cutoff) {
        warn!(cutoff, "threshold cutoff outside [0, 255], output will be constant");
    }
    debug!(width = gray.width(), height = gray.height(), cutoff, "thresholding");
    let samples =
        gray.samples().iter().map(|&v| if i32::from(v) > cutoff { 255 } else { 0 }).collect();
    return PixelBuffer::from_raw(gray.width(), gray.height(), Layout::Gray, samples);
}
