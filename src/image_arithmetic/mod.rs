//! Pixel buffers, convolution kernels and the helpers shared by the stages.

pub mod traits;
pub use self::traits::*;
pub mod types;
pub use self::types::*;
pub mod utilities;
pub use self::utilities::*;

pub const SOBEL_X: &[i32] = &[-1, 0, 1, -2, 0, 2, -1, 0, 1];
pub const SOBEL_Y: &[i32] = &[-1, -2, -1, 0, 0, 0, 1, 2, 1];
