//! RGBA to single-channel intensity conversion.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::image_arithmetic::{clamp_to_sample, Layout, PixelBuffer, PixelTransform};

/// Channel weights used to collapse red, green and blue into one intensity.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrayscaleWeights {
    /// Unweighted mean `(R + G + B) / 3`.
    #[default]
    Average,
    /// Perceptual luma `0.299 R + 0.587 G + 0.114 B`.
    Luma,
}

impl GrayscaleWeights {
    pub fn weights(self) -> [f64; 3] {
        match self {
            GrayscaleWeights::Average => [1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0],
            GrayscaleWeights::Luma => [0.299, 0.587, 0.114],
        }
    }

    pub fn intensity(self, r: u8, g: u8, b: u8) -> u8 {
        let value = match self {
            // Divide the exact sum so thirds never pick up float error.
            GrayscaleWeights::Average => (r as f64 + g as f64 + b as f64) / 3.0,
            GrayscaleWeights::Luma => {
                let [wr, wg, wb] = self.weights();
                wr * r as f64 + wg * g as f64 + wb * b as f64
            }
        };
        return clamp_to_sample(value);
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct GrayscaleConverter {
    pub weights: GrayscaleWeights,
}

impl GrayscaleConverter {
    pub fn new(weights: GrayscaleWeights) -> Self {
        Self { weights }
    }
}

impl PixelTransform for GrayscaleConverter {
    fn transform(&self, input: &PixelBuffer) -> Result<PixelBuffer> {
        return convert(input, self.weights);
    }
}

/// Collapses an RGBA buffer into a gray buffer; alpha is dropped.
pub fn convert(rgba: &PixelBuffer, weights: GrayscaleWeights) -> Result<PixelBuffer> {
    rgba.expect_layout(Layout::Rgba)?;
    debug!(width = rgba.width(), height = rgba.height(), ?weights, "grayscale conversion");
    let samples = rgba
        .samples()
        .chunks_exact(Layout::Rgba.channels())
        .map(|px| weights.intensity(px[0], px[1], px[2]))
        .collect();
    return PixelBuffer::from_raw(rgba.width(), rgba.height(), Layout::Gray, samples);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FilterError;

    fn rgba(pixels: &[[u8; 4]], width: u32) -> PixelBuffer {
        let height = pixels.len() as u32 / width;
        PixelBuffer::from_raw(width, height, Layout::Rgba, pixels.concat()).unwrap()
    }

    #[test]
    fn average_is_unweighted_mean() {
        let img = rgba(&[[30, 60, 90, 255], [255, 255, 255, 0], [1, 1, 2, 10]], 3);
        let gray = convert(&img, GrayscaleWeights::Average).unwrap();
        assert_eq!(gray.layout(), Layout::Gray);
        assert_eq!(gray.samples(), &[60, 255, 1]);
    }

    #[test]
    fn luma_uses_perceptual_weights() {
        let img = rgba(&[[255, 0, 0, 255], [0, 255, 0, 255], [0, 0, 255, 255]], 3);
        let gray = convert(&img, GrayscaleWeights::Luma).unwrap();
        // 76.245, 149.685, 29.07
        assert_eq!(gray.samples(), &[76, 150, 29]);
    }

    #[test]
    fn alpha_does_not_contribute() {
        let opaque = rgba(&[[10, 20, 30, 255]], 1);
        let clear = rgba(&[[10, 20, 30, 0]], 1);
        assert_eq!(
            convert(&opaque, GrayscaleWeights::Luma).unwrap(),
            convert(&clear, GrayscaleWeights::Luma).unwrap()
        );
    }

    #[test]
    fn rejects_gray_input() {
        let gray = PixelBuffer::new(2, 2, Layout::Gray).unwrap();
        let err = GrayscaleConverter::default().transform(&gray).unwrap_err();
        assert!(matches!(err, FilterError::InvalidShape(_)));
    }
}
