//! Sampler: one pointer position in, one encoded pixel out.

#[cfg(test)]
#[path = "sampler_test.rs"]
mod sampler_test;

use crate::color::{HexColor, Rgb};
use crate::surface::ImageSurface;
use crate::viewport::{PixelPoint, Point};

/// A successful read of one surface pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    /// The pixel that was read.
    pub pixel: PixelPoint,
    pub rgb: Rgb,
    pub hex: HexColor,
}

/// Read the pixel under `point` (viewport coordinates) and encode it.
///
/// Points outside the surface yield `None`; that is "no sample", not a fault.
#[must_use]
pub fn sample(point: Point, surface: &ImageSurface) -> Option<Sample> {
    let pixel = surface.viewport().pixel_at(point)?;
    match surface.read_pixel(point) {
        Ok(rgb) => Some(Sample { pixel, rgb, hex: rgb.hex() }),
        Err(_) => None,
    }
}
