//! Spatial predicates: the mix zone disc and the bounded simulation region.

use geo::{coord, EuclideanDistance, Point, Rect};

/// Side length of the reference simulation area (meters).
pub const REGION_SIZE: f64 = 3000.0;

/// Distance from a region edge at which a vehicle counts as leaving (meters).
///
/// Vehicles move at roughly 20 m/s with one sample per second, so a
/// narrower band could be skipped over between two ticks.
pub const DEFAULT_EDGE_THRESHOLD: f64 = 20.0;

/// A circular mix zone around a fixed point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixZone {
    /// Center of the zone
    pub center: Point<f64>,

    /// Capture radius in meters
    pub radius: f64,
}

impl MixZone {
    /// Creates a mix zone at `(x, y)` with the given radius.
    pub fn new(x: f64, y: f64, radius: f64) -> Self {
        Self {
            center: Point::new(x, y),
            radius,
        }
    }

    /// Returns true if `position` lies strictly inside the capture radius.
    pub fn captures(&self, position: &Point<f64>) -> bool {
        position.euclidean_distance(&self.center) < self.radius
    }
}

/// The bounded simulation area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    bounds: Rect<f64>,
}

impl Region {
    /// Creates a region from two opposite corners.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            bounds: Rect::new(coord! { x: min_x, y: min_y }, coord! { x: max_x, y: max_y }),
        }
    }

    /// Width of the region.
    pub fn width(&self) -> f64 {
        self.bounds.width()
    }

    /// Height of the region.
    pub fn height(&self) -> f64 {
        self.bounds.height()
    }

    /// Returns true if `position` is within `threshold` of any of the four edges.
    ///
    /// Positions outside the region count as near the edge.
    pub fn near_edge(&self, position: &Point<f64>, threshold: f64) -> bool {
        let min = self.bounds.min();
        let max = self.bounds.max();

        position.x() < min.x + threshold
            || position.x() > max.x - threshold
            || position.y() < min.y + threshold
            || position.y() > max.y - threshold
    }
}

impl Default for Region {
    fn default() -> Self {
        Self::new(0.0, 0.0, REGION_SIZE, REGION_SIZE)
    }
}
