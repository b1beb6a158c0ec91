use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use sobel_edge_pipeline::image_arithmetic::{Layout, PixelBuffer};

pub fn random_rgba(seed: u64, width: u32, height: u32) -> PixelBuffer {
    let mut rng = SmallRng::seed_from_u64(seed);
    let samples = (0..width * height * 4).map(|_| rng.gen::<u8>()).collect();
    PixelBuffer::from_raw(width, height, Layout::Rgba, samples).unwrap()
}

pub fn random_gray(seed: u64, width: u32, height: u32) -> PixelBuffer {
    let mut rng = SmallRng::seed_from_u64(seed);
    let samples = (0..width * height).map(|_| rng.gen::<u8>()).collect();
    PixelBuffer::from_raw(width, height, Layout::Gray, samples).unwrap()
}

pub fn uniform_gray(width: u32, height: u32, value: u8) -> PixelBuffer {
    PixelBuffer::from_raw(width, height, Layout::Gray, vec![value; (width * height) as usize])
        .unwrap()
}
