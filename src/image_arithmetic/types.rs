use image::{DynamicImage, GrayImage, Luma, Rgba, RgbaImage};

use crate::error::{FilterError, Result};

/// Sample arrangement of a [`PixelBuffer`].
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Layout {
    /// One intensity sample per pixel.
    Gray,
    /// Red, green, blue and alpha samples per pixel.
    Rgba,
}

impl Layout {
    pub const fn channels(self) -> usize {
        match self {
            Layout::Gray => 1,
            Layout::Rgba => 4,
        }
    }
}

/// Owned row-major grid of 8-bit samples.
///
/// Width and height are always positive and the sample count always equals
/// `width * height * layout.channels()`.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    layout: Layout,
    samples: Vec<u8>,
}

impl PixelBuffer {
    /// Zero-filled buffer of the given size.
    pub fn new(width: u32, height: u32, layout: Layout) -> Result<Self> {
        let len = Self::expected_len(width, height, layout)?;
        return Ok(Self { width, height, layout, samples: vec![0; len] });
    }

    pub fn from_raw(width: u32, height: u32, layout: Layout, samples: Vec<u8>) -> Result<Self> {
        let len = Self::expected_len(width, height, layout)?;
        if samples.len() != len {
            return Err(FilterError::InvalidShape(format!(
                "{}x{} {:?} buffer needs {} samples, got {}",
                width,
                height,
                layout,
                len,
                samples.len()
            )));
        }
        return Ok(Self { width, height, layout, samples });
    }

    /// Builds a buffer by evaluating `f` for every coordinate.
    ///
    /// Fails with `InvalidShape` if `f` returns the wrong number of samples.
    pub fn from_fn<F>(width: u32, height: u32, layout: Layout, mut f: F) -> Result<Self>
    where
        F: FnMut(u32, u32) -> Vec<u8>,
    {
        let mut buffer = Self::new(width, height, layout)?;
        for y in 0..height {
            for x in 0..width {
                let pixel = f(x, y);
                if pixel.len() != layout.channels() {
                    return Err(FilterError::InvalidShape(format!(
                        "pixel ({}, {}) of a {:?} buffer needs {} samples, got {}",
                        x,
                        y,
                        layout,
                        layout.channels(),
                        pixel.len()
                    )));
                }
                buffer.pixel_mut(x, y).copy_from_slice(&pixel);
            }
        }
        return Ok(buffer);
    }

    pub fn from_rgba_image(img: &RgbaImage) -> Result<Self> {
        return Self::from_raw(img.width(), img.height(), Layout::Rgba, img.as_raw().clone());
    }

    /// Decoded images of any color type enter the pipeline as RGBA.
    pub fn from_dynamic(img: &DynamicImage) -> Result<Self> {
        return Self::from_rgba_image(&img.to_rgba8());
    }

    fn expected_len(width: u32, height: u32, layout: Layout) -> Result<usize> {
        if width == 0 || height == 0 {
            return Err(FilterError::InvalidShape(format!(
                "dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        return Ok(width as usize * height as usize * layout.channels());
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn channels(&self) -> usize {
        self.layout.channels()
    }

    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    pub fn samples_mut(&mut self) -> &mut [u8] {
        &mut self.samples
    }

    /// Samples of the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let start = self.index(x, y);
        return &self.samples[start..start + self.channels()];
    }

    pub fn pixel_mut(&mut self, x: u32, y: u32) -> &mut [u8] {
        let start = self.index(x, y);
        let channels = self.channels();
        return &mut self.samples[start..start + channels];
    }

    /// First sample of the pixel at `(x, y)`; the intensity for gray buffers.
    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.samples[self.index(x, y)]
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * self.channels()
    }

    /// Fails with `InvalidShape` unless the buffer has the given layout.
    pub fn expect_layout(&self, layout: Layout) -> Result<()> {
        if self.layout != layout {
            return Err(FilterError::InvalidShape(format!(
                "expected a {:?} buffer, got {:?}",
                layout, self.layout
            )));
        }
        return Ok(());
    }

    /// Display form: gray samples are spread over R, G and B with opaque alpha.
    pub fn to_rgba_image(&self) -> RgbaImage {
        return RgbaImage::from_fn(self.width, self.height, |x, y| match self.pixel(x, y) {
            &[v] => Rgba([v, v, v, 255]),
            &[r, g, b, a] => Rgba([r, g, b, a]),
            _ => unreachable!("pixels have one or four samples"),
        });
    }

    /// Only gray buffers have a lossless single-channel form.
    pub fn to_gray_image(&self) -> Result<GrayImage> {
        self.expect_layout(Layout::Gray)?;
        return Ok(GrayImage::from_fn(self.width, self.height, |x, y| Luma([self.get(x, y)])));
    }
}

/// Matrix of signed convolution weights in row-major order.
///
/// Any rectangular shape can be represented; squareness and odd side length
/// are enforced by the filters that need a center.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct Kernel {
    rows: usize,
    cols: usize,
    weights: Vec<i32>,
}

impl Kernel {
    pub fn new(rows: usize, cols: usize, weights: Vec<i32>) -> Result<Self> {
        if rows == 0 || cols == 0 || weights.len() != rows * cols {
            return Err(FilterError::InvalidShape(format!(
                "{}x{} kernel cannot hold {} weights",
                rows,
                cols,
                weights.len()
            )));
        }
        return Ok(Self { rows, cols, weights });
    }

    /// Square kernel whose side is inferred from the weight count.
    pub fn square(weights: &[i32]) -> Result<Self> {
        let side = (weights.len() as f64).sqrt().round() as usize;
        return Self::new(side, side, weights.to_vec());
    }

    pub fn sobel_x() -> Self {
        Self { rows: 3, cols: 3, weights: super::SOBEL_X.to_vec() }
    }

    pub fn sobel_y() -> Self {
        Self { rows: 3, cols: 3, weights: super::SOBEL_Y.to_vec() }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn weights(&self) -> &[i32] {
        &self.weights
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Distance from the center to the edge; only meaningful for odd square kernels.
    pub fn radius(&self) -> usize {
        (self.rows - 1) / 2
    }

    /// Weight at the offset `(i, j)` from the center.
    pub fn at(&self, i: i64, j: i64) -> i32 {
        let n = self.radius() as i64;
        let side = self.cols as i64;
        return self.weights[((j + n) * side + (i + n)) as usize];
    }

    /// Fails with `InvalidShape` unless square with an odd side.
    pub fn expect_centered(&self) -> Result<()> {
        if !self.is_square() || self.rows % 2 == 0 {
            return Err(FilterError::InvalidShape(format!(
                "kernel must be square with an odd side, got {}x{}",
                self.rows, self.cols
            )));
        }
        return Ok(());
    }
}
