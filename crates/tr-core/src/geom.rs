use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// A point (or offset) on the drawing surface, in surface-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Midpoint between two points. Default placement for a link's control point.
    pub fn midpoint(self, other: Self) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }
}

/// Drawing-surface dimensions, as cleared at the top of every frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn midpoint_between_centers() {
        let m = Point::new(10.0, 20.0).midpoint(Point::new(30.0, 60.0));
        assert_eq!(m, Point::new(20.0, 40.0));
    }

    #[test]
    fn offset_arithmetic() {
        let offset = Point::new(15.0, 12.0) - Point::new(10.0, 10.0);
        assert_eq!(offset, Point::new(5.0, 2.0));
        assert_eq!(Point::new(40.0, 40.0) - offset, Point::new(35.0, 38.0));
    }
}
