//! Shared types for the vinery path pipeline.

use serde::{Deserialize, Serialize};

/// A 2D point in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (pixels from left edge).
    pub x: f64,
    /// Vertical position (pixels from top edge).
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    ///
    /// Avoids the square root for comparison purposes.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// The point halfway between `self` and `other`.
    #[must_use]
    pub fn midpoint(self, other: Self) -> Self {
        Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Round both coordinates to the nearest integer.
    #[must_use]
    pub fn round(self) -> Self {
        Self::new(self.x.round(), self.y.round())
    }
}

/// Drawing surface dimensions in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Create new dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// The center of the surface.
    #[must_use]
    pub fn center(self) -> Point {
        Point::new(f64::from(self.width) / 2.0, f64::from(self.height) / 2.0)
    }
}

/// Index of a site within one [`Partition`](crate::partition::Partition).
///
/// Sites are stored in an arena; the id is the arena slot. Ids are only
/// meaningful for the partition that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SiteId(pub usize);

impl SiteId {
    /// The arena slot of this site.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Errors that can occur while building a vine path.
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// Every sampling attempt produced a degenerate partition.
    #[error("partition stayed degenerate after {attempts} sampling attempts")]
    ExhaustedRetries {
        /// How many attempts were made.
        attempts: usize,
    },

    /// The coverage mask rejected too many candidate points.
    #[error("coverage mask accepted only {accepted} of {required} required points")]
    MaskRejected {
        /// Points accepted before the candidate budget ran out.
        accepted: usize,
        /// Points the sampler needed.
        required: usize,
    },

    /// The partition had no cell to start walking from.
    #[error("partition has no cells to start the walk from")]
    NoStartingCell,

    /// The walker reached a cell without any interior neighbor.
    #[error("cell {0:?} has no neighbors to walk to")]
    IsolatedCell(SiteId),

    /// Configuration is invalid.
    #[error("invalid vine configuration: {0}")]
    InvalidConfig(String),
}

/// Errors from turn geometry evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GeometryError {
    /// Two of the three turn points coincide, so a direction vector has
    /// zero length.
    #[error("turn vertices coincide; the turn angle is undefined")]
    InvalidGeometry,
}
