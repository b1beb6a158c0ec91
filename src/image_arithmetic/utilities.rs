use num_traits::{clamp, Zero};

/// Stores a real value the way an 8-bit clamped array does:
/// clamp to [0, 255], then round half to even. NaN stores as 0.
pub fn clamp_to_sample(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    let clamped = clamp(value, f64::zero(), f64::from(u8::MAX));
    return clamped.round_ties_even() as u8;
}

/// Index of `coord + offset`, clamped into `[0, len)`.
pub fn replicate_coordinate(coord: usize, offset: i64, len: usize) -> usize {
    let shifted = coord as i64 + offset;
    return shifted.clamp(0, len as i64 - 1) as usize;
}
