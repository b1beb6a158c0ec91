//! Runs a source image through grayscale conversion, thresholding and the
//! Sobel filter.

use tracing::debug;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::grayscale::GrayscaleConverter;
use crate::image_arithmetic::{PixelBuffer, PixelTransform};
use crate::sobel_filter::SobelFilter;
use crate::thresholding::Thresholder;

/// Buffers produced by one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub grayscale: PixelBuffer,
    pub thresholded: PixelBuffer,
    pub edges: PixelBuffer,
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    pub grayscale: GrayscaleConverter,
    pub thresholder: Thresholder,
    pub sobel: SobelFilter,
}

impl Pipeline {
    pub fn new(
        grayscale: GrayscaleConverter, thresholder: Thresholder, sobel: SobelFilter,
    ) -> Self {
        Self { grayscale, thresholder, sobel }
    }

    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        let sobel =
            SobelFilter::standard(config.filter_params())?.with_parallelity(config.parallelity)?;
        return Ok(Self::new(
            GrayscaleConverter::new(config.grayscale),
            Thresholder::new(config.threshold),
            sobel,
        ));
    }

    /// Both the threshold and the Sobel stage read the same grayscale buffer.
    pub fn run(&self, source: &PixelBuffer) -> Result<PipelineOutput> {
        debug!(width = source.width(), height = source.height(), "pipeline run");
        let grayscale = self.grayscale.transform(source)?;
        let thresholded = self.thresholder.transform(&grayscale)?;
        let edges = self.sobel.transform(&grayscale)?;
        return Ok(PipelineOutput { grayscale, thresholded, edges });
    }

    /// Replaces the thresholded buffer of a previous run using a new cutoff.
    ///
    /// The grayscale and edge buffers are left as they are.
    pub fn rethreshold(&mut self, output: &mut PipelineOutput, cutoff: i32) -> Result<()> {
        let thresholder = Thresholder::new(cutoff);
        output.thresholded = thresholder.transform(&output.grayscale)?;
        self.thresholder = thresholder;
        return Ok(());
    }
}
