//! Grayscale conversion, thresholding and Sobel edge detection over owned
//! pixel buffers.
//!
//! ```
//! use sobel_edge_pipeline::prelude::*;
//!
//! let source = PixelBuffer::from_fn(8, 8, Layout::Rgba, |x, _| {
//!     let v = if x < 4 { 0 } else { 255 };
//!     vec![v, v, v, 255]
//! })
//! .unwrap();
//! let pipeline = Pipeline::from_config(&PipelineConfig::default()).unwrap();
//! let output = pipeline.run(&source).unwrap();
//! assert_eq!(output.edges.pixel(3, 3), &[255, 255, 255, 255]);
//! ```

pub mod config;
pub mod edge_extension;
pub mod error;
pub mod grayscale;
pub mod image_arithmetic;
pub mod pipeline;
pub mod sobel_filter;
pub mod thresholding;

pub use crate::error::{ConfigError, FilterError};

pub mod prelude {
    pub use crate::config::{load_config, CommandLineOverrides, PipelineConfig};
    pub use crate::edge_extension::EdgeExtender;
    pub use crate::grayscale::{GrayscaleConverter, GrayscaleWeights};
    pub use crate::image_arithmetic::{Kernel, Layout, PixelBuffer, PixelTransform};
    pub use crate::pipeline::{Pipeline, PipelineOutput};
    pub use crate::sobel_filter::{
        BorderPolicy, CombineMode, FilterParams, FilterPreset, SobelFilter,
    };
    pub use crate::thresholding::Thresholder;
}
