//! Unit helpers for DrawingML geometry.
//!
//! Office Open XML measures drawing extents in EMUs (English Metric Units):
//! 914400 per inch, which is 9525 per pixel at 96 DPI.

use crate::{Error, Result};

/// EMUs per inch.
pub const EMUS_PER_INCH: i64 = 914_400;

/// EMUs per pixel at 96 DPI.
pub const EMUS_PER_PIXEL: f64 = 9525.0;

/// Convert a pixel length to the nearest whole number of EMUs.
///
/// Rounds half away from zero. Any input is accepted; negative pixels give
/// negative EMUs and non-finite input saturates through the float cast.
pub fn pixels_to_emus(pixels: f64) -> i64 {
    (pixels * EMUS_PER_PIXEL).round() as i64
}

/// Return the largest value of a non-empty slice.
///
/// Ties resolve to the shared value. Elements that do not compare (NaN) never
/// replace the current maximum.
pub fn max_of<T: PartialOrd + Copy>(values: &[T]) -> Result<T> {
    let (first, rest) = values
        .split_first()
        .ok_or_else(|| Error::InvalidArgument("cannot take the maximum of an empty sequence".into()))?;

    Ok(rest
        .iter()
        .fold(*first, |max, &v| if v > max { v } else { max }))
}
