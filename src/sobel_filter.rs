//! Sobel gradient-magnitude filter.
//!
//! Convolves a gray buffer with a horizontal and a vertical kernel, combines
//! the two signed responses into an edge strength and maps it through
//! `offset + gain * strength`, clamped to [0, 255]. Output pixels are opaque
//! RGBA with the value in all three color channels.
//!
//! Border handling is selected by [`BorderPolicy`]:
//! - `Skip` leaves the outer `radius` pixels as `[0, 0, 0, 0]`.
//! - `Extend` pads the input with [`crate::edge_extension::extend`] first, so
//!   the output is one pixel wider and taller than the input.
//! - `Replicate` clamps neighbour coordinates into the image and processes
//!   every pixel.
//!
//! Rows are split into bands that are filtered on scoped threads. Every pixel
//! only reads the input, so the result does not depend on the band count.

use std::borrow::Cow;
use std::thread;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::edge_extension;
use crate::error::{FilterError, Result};
use crate::image_arithmetic::{
    clamp_to_sample, replicate_coordinate, Kernel, Layout, PixelBuffer, PixelTransform,
};

pub const DEFAULT_GAIN: f64 = 0.25;
pub const DEFAULT_OFFSET: f64 = 0.0;

/// How the horizontal and vertical responses become one edge strength.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombineMode {
    /// `sqrt(gx^2 + gy^2)`
    #[default]
    Euclidean,
    /// `|gx|`; the vertical kernel does not contribute.
    SingleAxis,
}

#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorderPolicy {
    #[default]
    Skip,
    Extend,
    Replicate,
}

#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterParams {
    /// Multiplier `B` applied to the combined response.
    pub gain: f64,
    /// Constant `A` added after the gain.
    pub offset: f64,
    pub combine: CombineMode,
    pub border: BorderPolicy,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            gain: DEFAULT_GAIN,
            offset: DEFAULT_OFFSET,
            combine: CombineMode::default(),
            border: BorderPolicy::default(),
        }
    }
}

impl FilterParams {
    /// Rejects gains that are negative or not finite and offsets that are not finite.
    pub fn validate(&self) -> Result<()> {
        if !self.gain.is_finite() || self.gain < 0.0 {
            return Err(FilterError::OutOfRangeParameter {
                name: "gain",
                value: self.gain.to_string(),
                reason: "must be finite and non-negative".to_string(),
            });
        }
        if !self.offset.is_finite() {
            return Err(FilterError::OutOfRangeParameter {
                name: "offset",
                value: self.offset.to_string(),
                reason: "must be finite".to_string(),
            });
        }
        return Ok(());
    }

    pub fn with_gain(mut self, gain: f64) -> Self {
        self.gain = gain;
        self
    }

    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_combine(mut self, combine: CombineMode) -> Self {
        self.combine = combine;
        self
    }

    pub fn with_border(mut self, border: BorderPolicy) -> Self {
        self.border = border;
        self
    }
}

/// Named combinations of combine mode and border policy.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterPreset {
    /// Euclidean magnitude, unprocessed border.
    #[default]
    Reference,
    /// `|gx|` only, unprocessed border.
    SingleAxis,
    /// Euclidean magnitude over the one-sided extended image.
    Extended,
    /// Euclidean magnitude with clamped neighbour reads.
    Replicated,
}

impl FilterPreset {
    pub fn params(self) -> FilterParams {
        let params = FilterParams::default();
        match self {
            FilterPreset::Reference => params,
            FilterPreset::SingleAxis => params.with_combine(CombineMode::SingleAxis),
            FilterPreset::Extended => params.with_border(BorderPolicy::Extend),
            FilterPreset::Replicated => params.with_border(BorderPolicy::Replicate),
        }
    }
}

/// Raw signed responses of the two kernels at one pixel.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub(crate) struct Gradient {
    pub gx: i64,
    pub gy: i64,
}

impl Gradient {
    pub fn combine(self, mode: CombineMode) -> f64 {
        match mode {
            CombineMode::Euclidean => {
                let (gx, gy) = (self.gx as f64, self.gy as f64);
                (gx * gx + gy * gy).sqrt()
            }
            CombineMode::SingleAxis => (self.gx as f64).abs(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SobelFilter {
    kernel_x: Kernel,
    kernel_y: Kernel,
    params: FilterParams,
    parallelity: usize,
}

impl SobelFilter {
    /// Validates the kernels and parameters.
    ///
    /// `parallelity` is the number of row bands filtered concurrently and
    /// defaults to the available hardware parallelism.
    pub fn new(
        kernel_x: Kernel, kernel_y: Kernel, params: FilterParams, parallelity: Option<usize>,
    ) -> Result<Self> {
        validate_kernels(&kernel_x, &kernel_y)?;
        params.validate()?;
        if parallelity == Some(0) {
            return Err(FilterError::OutOfRangeParameter {
                name: "parallelity",
                value: "0".to_string(),
                reason: "at least one worker is needed".to_string(),
            });
        }
        let parallelity =
            parallelity.unwrap_or(thread::available_parallelism().map_or(1, |x| x.get()));
        return Ok(Self { kernel_x, kernel_y, params, parallelity });
    }

    /// Filter with the standard 3x3 Sobel pair.
    pub fn standard(params: FilterParams) -> Result<Self> {
        return Self::new(Kernel::sobel_x(), Kernel::sobel_y(), params, None);
    }

    pub fn from_preset(preset: FilterPreset) -> Result<Self> {
        return Self::standard(preset.params());
    }

    pub fn with_parallelity(self, parallelity: Option<usize>) -> Result<Self> {
        return Self::new(self.kernel_x, self.kernel_y, self.params, parallelity);
    }

    pub fn params(&self) -> &FilterParams {
        &self.params
    }

    pub fn parallelity(&self) -> usize {
        self.parallelity
    }

    /// Filters a gray buffer into an RGBA edge-strength buffer.
    pub fn apply(&self, gray: &PixelBuffer) -> Result<PixelBuffer> {
        gray.expect_layout(Layout::Gray)?;
        let source = match self.params.border {
            BorderPolicy::Extend => Cow::Owned(edge_extension::extend(gray)?),
            BorderPolicy::Skip | BorderPolicy::Replicate => Cow::Borrowed(gray),
        };
        let source = source.as_ref();
        let (width, height) = (source.width() as usize, source.height() as usize);
        debug!(
            width,
            height,
            gain = self.params.gain,
            offset = self.params.offset,
            combine = ?self.params.combine,
            border = ?self.params.border,
            "sobel filter"
        );

        let mut output = PixelBuffer::new(source.width(), source.height(), Layout::Rgba)?;
        let row_len = width * Layout::Rgba.channels();
        let mut parallelity = self.parallelity;
        if parallelity > height {
            parallelity = 1;
        }
        if parallelity == 1 {
            self.filter_band(source, 0, output.samples_mut());
            return Ok(output);
        }

        let band_rows = height.div_ceil(parallelity);
        thread::scope(|scope| {
            for (i, band) in output.samples_mut().chunks_mut(band_rows * row_len).enumerate() {
                scope.spawn(move || self.filter_band(source, i * band_rows, band));
            }
        });
        return Ok(output);
    }

    /// Half-open ranges of columns and rows that receive a filtered value.
    fn processed_ranges(&self, width: usize, height: usize) -> ((usize, usize), (usize, usize)) {
        if self.params.border == BorderPolicy::Replicate {
            return ((0, width), (0, height));
        }
        let n = self.kernel_x.radius();
        return ((n, width.saturating_sub(n)), (n, height.saturating_sub(n)));
    }

    fn filter_band(&self, source: &PixelBuffer, first_row: usize, band: &mut [u8]) {
        let (width, height) = (source.width() as usize, source.height() as usize);
        let ((x_lo, x_hi), (y_lo, y_hi)) = self.processed_ranges(width, height);
        let channels = Layout::Rgba.channels();
        for (dy, row) in band.chunks_exact_mut(width * channels).enumerate() {
            let y = first_row + dy;
            if y < y_lo || y >= y_hi {
                continue;
            }
            for x in x_lo..x_hi {
                let strength = self.gradient_at(source, x, y).combine(self.params.combine);
                let value = clamp_to_sample(self.params.offset + self.params.gain * strength);
                row[x * channels..(x + 1) * channels].copy_from_slice(&[value, value, value, 255]);
            }
        }
    }

    pub(crate) fn gradient_at(&self, source: &PixelBuffer, x: usize, y: usize) -> Gradient {
        let (width, height) = (source.width() as usize, source.height() as usize);
        let samples = source.samples();
        let n = self.kernel_x.radius() as i64;
        let mut gradient = Gradient { gx: 0, gy: 0 };
        for j in -n..=n {
            let sy = replicate_coordinate(y, j, height);
            for i in -n..=n {
                let sx = replicate_coordinate(x, i, width);
                let sample = i64::from(samples[sy * width + sx]);
                gradient.gx += sample * i64::from(self.kernel_x.at(i, j));
                gradient.gy += sample * i64::from(self.kernel_y.at(i, j));
            }
        }
        return gradient;
    }
}

impl PixelTransform for SobelFilter {
    fn transform(&self, input: &PixelBuffer) -> Result<PixelBuffer> {
        return self.apply(input);
    }
}

fn validate_kernels(kernel_x: &Kernel, kernel_y: &Kernel) -> Result<()> {
    kernel_x.expect_centered()?;
    kernel_y.expect_centered()?;
    if kernel_x.rows() != kernel_y.rows() {
        return Err(FilterError::ShapeMismatch {
            expected: format!("{}x{}", kernel_x.rows(), kernel_x.cols()),
            got: format!("{}x{}", kernel_y.rows(), kernel_y.cols()),
        });
    }
    return Ok(());
}

/// Single-threaded filter run with explicit kernels.
pub fn apply(
    gray: &PixelBuffer, kernel_x: &Kernel, kernel_y: &Kernel, params: &FilterParams,
) -> Result<PixelBuffer> {
    let filter = SobelFilter::new(kernel_x.clone(), kernel_y.clone(), *params, Some(1))?;
    return filter.apply(gray);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray_from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> u8) -> PixelBuffer {
        PixelBuffer::from_fn(width, height, Layout::Gray, |x, y| vec![f(x, y)]).unwrap()
    }

    fn vertical_step(width: u32, height: u32, edge: u32) -> PixelBuffer {
        gray_from_fn(width, height, |x, _| if x < edge { 0 } else { 255 })
    }

    fn sequential(params: FilterParams) -> SobelFilter {
        SobelFilter::new(Kernel::sobel_x(), Kernel::sobel_y(), params, Some(1)).unwrap()
    }

    #[test]
    fn flat_image_has_zero_interior() {
        let flat = gray_from_fn(5, 5, |_, _| 100);
        let out = sequential(FilterParams::default()).apply(&flat).unwrap();
        assert_eq!(out.dimensions(), (5, 5));
        for y in 1..4 {
            for x in 1..4 {
                assert_eq!(out.pixel(x, y), &[0, 0, 0, 255]);
            }
        }
    }

    #[test]
    fn skipped_border_stays_transparent_black() {
        let out = sequential(FilterParams::default()).apply(&vertical_step(5, 5, 2)).unwrap();
        for i in 0..5 {
            assert_eq!(out.pixel(i, 0), &[0, 0, 0, 0]);
            assert_eq!(out.pixel(i, 4), &[0, 0, 0, 0]);
            assert_eq!(out.pixel(0, i), &[0, 0, 0, 0]);
            assert_eq!(out.pixel(4, i), &[0, 0, 0, 0]);
        }
    }

    #[test]
    fn vertical_step_saturates_at_boundary() {
        let gray = vertical_step(5, 5, 2);
        let filter = sequential(FilterParams::default());
        assert_eq!(filter.gradient_at(&gray, 1, 2), Gradient { gx: 1020, gy: 0 });
        assert_eq!(filter.gradient_at(&gray, 2, 2), Gradient { gx: 1020, gy: 0 });
        assert_eq!(filter.gradient_at(&gray, 3, 2), Gradient { gx: 0, gy: 0 });

        let out = filter.apply(&gray).unwrap();
        for y in 1..4 {
            assert_eq!(out.pixel(1, y), &[255, 255, 255, 255]);
            assert_eq!(out.pixel(2, y), &[255, 255, 255, 255]);
            assert_eq!(out.pixel(3, y), &[0, 0, 0, 255]);
        }
    }

    #[test]
    fn gain_and_offset_are_linear_before_clamping() {
        // Rows 0..1 at 0 and the rest at 20: |gy| = 80 on the boundary rows.
        let gray = gray_from_fn(5, 5, |_, y| if y < 2 { 0 } else { 20 });
        let params = FilterParams::default().with_gain(0.5).with_offset(3.0);
        let out = sequential(params).apply(&gray).unwrap();
        assert_eq!(out.pixel(2, 1)[0], 43);
        assert_eq!(out.pixel(2, 3)[0], 3);

        let negative = FilterParams::default().with_offset(-500.0);
        let out = sequential(negative).apply(&gray).unwrap();
        assert_eq!(out.pixel(2, 1), &[0, 0, 0, 255]);
    }

    #[test]
    fn single_axis_ignores_vertical_response() {
        let gray = gray_from_fn(5, 5, |_, y| if y < 2 { 0 } else { 255 });
        let euclidean = sequential(FilterParams::default()).apply(&gray).unwrap();
        let single = sequential(FilterPreset::SingleAxis.params()).apply(&gray).unwrap();
        assert_eq!(euclidean.pixel(2, 2)[0], 255);
        assert_eq!(single.pixel(2, 2), &[0, 0, 0, 255]);

        let out = sequential(FilterPreset::SingleAxis.params())
            .apply(&vertical_step(5, 5, 2))
            .unwrap();
        assert_eq!(out.pixel(1, 2)[0], 255);
    }

    #[test]
    fn extend_policy_reaches_last_column() {
        let gray = vertical_step(5, 5, 4);
        let skipped = sequential(FilterParams::default()).apply(&gray).unwrap();
        assert_eq!(skipped.pixel(3, 2)[0], 255);
        assert_eq!(skipped.pixel(4, 2), &[0, 0, 0, 0]);

        let extended = sequential(FilterPreset::Extended.params()).apply(&gray).unwrap();
        assert_eq!(extended.dimensions(), (6, 6));
        assert_eq!(extended.pixel(4, 2), &[255, 255, 255, 255]);
        assert_eq!(extended.pixel(4, 4), &[255, 255, 255, 255]);
        assert_eq!(extended.pixel(0, 2), &[0, 0, 0, 0]);
        assert_eq!(extended.pixel(5, 2), &[0, 0, 0, 0]);
        assert_eq!(extended.pixel(2, 5), &[0, 0, 0, 0]);
    }

    #[test]
    fn replicate_policy_fills_every_pixel() {
        let out = sequential(FilterPreset::Replicated.params())
            .apply(&vertical_step(5, 5, 2))
            .unwrap();
        assert_eq!(out.dimensions(), (5, 5));
        for y in 0..5 {
            assert_eq!(out.pixel(0, y), &[0, 0, 0, 255]);
            assert_eq!(out.pixel(1, y), &[255, 255, 255, 255]);
            assert_eq!(out.pixel(4, y), &[0, 0, 0, 255]);
        }
    }

    #[test]
    fn too_small_for_interior_is_all_zero() {
        let gray = vertical_step(2, 7, 1);
        let out = sequential(FilterParams::default()).apply(&gray).unwrap();
        assert!(out.samples().iter().all(|&v| v == 0));
    }

    #[test]
    fn larger_kernels_use_their_radius() {
        let mut identity = vec![0; 25];
        identity[12] = 1;
        let kernel = Kernel::new(5, 5, identity).unwrap();
        let params = FilterParams::default().with_gain(1.0).with_combine(CombineMode::SingleAxis);
        let gray = gray_from_fn(6, 6, |x, y| (x * 7 + y * 3) as u8);
        let out = apply(&gray, &kernel, &kernel, &params).unwrap();
        assert_eq!(out.pixel(2, 3)[0], gray.get(2, 3));
        assert_eq!(out.pixel(3, 2)[0], gray.get(3, 2));
        assert_eq!(out.pixel(1, 3), &[0, 0, 0, 0]);
        assert_eq!(out.pixel(4, 3), &[0, 0, 0, 0]);
    }

    #[test]
    fn rejects_even_kernels() {
        let gray = gray_from_fn(5, 5, |_, _| 0);
        let params = FilterParams::default();
        let two = Kernel::square(&[1, 0, 0, -1]).unwrap();
        let four = Kernel::square(&[0; 16]).unwrap();
        assert!(matches!(apply(&gray, &two, &two, &params), Err(FilterError::InvalidShape(_))));
        assert!(matches!(apply(&gray, &four, &four, &params), Err(FilterError::InvalidShape(_))));
    }

    #[test]
    fn rejects_mismatched_kernels() {
        let gray = gray_from_fn(5, 5, |_, _| 0);
        let five = Kernel::square(&[0; 25]).unwrap();
        let err = apply(&gray, &Kernel::sobel_x(), &five, &FilterParams::default()).unwrap_err();
        assert!(matches!(err, FilterError::ShapeMismatch { .. }));
    }

    #[test]
    fn rejects_rgba_input() {
        let rgba = PixelBuffer::new(5, 5, Layout::Rgba).unwrap();
        let err = sequential(FilterParams::default()).apply(&rgba).unwrap_err();
        assert!(matches!(err, FilterError::InvalidShape(_)));
    }

    #[test]
    fn rejects_invalid_parameters() {
        for params in [
            FilterParams::default().with_gain(-0.1),
            FilterParams::default().with_gain(f64::INFINITY),
            FilterParams::default().with_offset(f64::NAN),
        ] {
            let err = SobelFilter::standard(params).unwrap_err();
            assert!(matches!(err, FilterError::OutOfRangeParameter { .. }));
        }
        let err = sequential(FilterParams::default()).with_parallelity(Some(0)).unwrap_err();
        assert!(matches!(err, FilterError::OutOfRangeParameter { name: "parallelity", .. }));
    }

    #[test]
    fn row_bands_match_sequential_result() {
        let gray = gray_from_fn(31, 17, |x, y| ((x * 37 + y * 91) % 256) as u8);
        for preset in [FilterPreset::Reference, FilterPreset::Extended, FilterPreset::Replicated] {
            let expected = sequential(preset.params()).apply(&gray).unwrap();
            for workers in [2, 3, 8, 64] {
                let filter = sequential(preset.params()).with_parallelity(Some(workers)).unwrap();
                assert_eq!(filter.apply(&gray).unwrap(), expected, "{:?} x{}", preset, workers);
            }
        }
    }
}
