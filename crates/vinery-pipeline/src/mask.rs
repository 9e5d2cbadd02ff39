//! Coverage masks that bias point placement inside a shape.
//!
//! The sampler only needs a coverage value per point; decoding and
//! scaling the mask image is the caller's job.

use image::{GrayImage, RgbaImage};

use crate::types::Point;

/// A coverage field over the drawing surface.
pub trait CoverageMask {
    /// Coverage at `point` in `[0, 1]`. Points outside the mask have zero
    /// coverage.
    fn coverage(&self, point: Point) -> f64;
}

/// Map a surface point to integer pixel coordinates, if inside `width x height`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn pixel_at(point: Point, width: u32, height: u32) -> Option<(u32, u32)> {
    let x = point.x.floor();
    let y = point.y.floor();
    if x < 0.0 || y < 0.0 || x >= f64::from(width) || y >= f64::from(height) {
        return None;
    }
    Some((x as u32, y as u32))
}

/// Alpha channel coverage.
impl CoverageMask for RgbaImage {
    fn coverage(&self, point: Point) -> f64 {
        pixel_at(point, self.width(), self.height())
            .map_or(0.0, |(x, y)| f64::from(self.get_pixel(x, y)[3]) / 255.0)
    }
}

/// Luma coverage: white is covered, black is not.
impl CoverageMask for GrayImage {
    fn coverage(&self, point: Point) -> f64 {
        pixel_at(point, self.width(), self.height())
            .map_or(0.0, |(x, y)| f64::from(self.get_pixel(x, y)[0]) / 255.0)
    }
}
