//! Geometric primitives for the pathway model.
//!
//! This module provides the fundamental geometric types used throughout the
//! model for element positions, bounding boxes and the relative-coordinate
//! conversion performed by the graph-link registry.
//!
//! # Coordinate System
//!
//! GPML uses a coordinate system consistent with SVG:
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! - **Origin**: top-left corner at `(0, 0)`
//! - **X-axis**: increases rightward
//! - **Y-axis**: increases downward

/// A 2D point in pathway coordinate space.
///
/// Points use `f64` coordinates, matching the precision GPML documents store.
///
/// # Examples
///
/// ```
/// # use gpml_core::geometry::Point;
/// let p1 = Point::new(10.0, 20.0);
/// let p2 = Point::new(5.0, 5.0);
///
/// let sum = p1.add_point(p2);
/// assert_eq!(sum.x(), 15.0);
/// assert_eq!(sum.y(), 25.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: f64,
    y: f64,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f64 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f64 {
        self.y
    }

    /// Adds another point to this point, returning a new point
    pub fn add_point(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// Subtracts another point from this point, returning a new point
    pub fn sub_point(self, other: Point) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    /// Calculates the midpoint between this point and another point
    pub fn midpoint(self, other: Point) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }

    /// Calculates the Euclidean distance to another point
    pub fn distance_to(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Multiplies both coordinates by the given factor
    pub fn scale(self, factor: f64) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }
}

/// Represents the dimensions of an element with width and height
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    width: f64,
    height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Returns the width dimension of this size
    pub fn width(self) -> f64 {
        self.width
    }

    /// Returns the height dimension of this size
    pub fn height(self) -> f64 {
        self.height
    }
}

/// Represents a rectangular bounding box with minimum and maximum coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl Bounds {
    /// Creates a new bounds from a center point and a size
    pub fn new_from_center(center: Point, size: Size) -> Self {
        let half_width = size.width / 2.0;
        let half_height = size.height / 2.0;
        Self {
            min_x: center.x - half_width,
            min_y: center.y - half_height,
            max_x: center.x + half_width,
            max_y: center.y + half_height,
        }
    }

    /// Creates a new bounds spanning two corner points, in any order
    pub fn new_from_corners(a: Point, b: Point) -> Self {
        Self {
            min_x: a.x.min(b.x),
            min_y: a.y.min(b.y),
            max_x: a.x.max(b.x),
            max_y: a.y.max(b.y),
        }
    }

    /// Returns the minimum x-coordinate of the bounds
    pub fn min_x(self) -> f64 {
        self.min_x
    }

    /// Returns the minimum y-coordinate of the bounds
    pub fn min_y(self) -> f64 {
        self.min_y
    }

    /// Returns the maximum x-coordinate of the bounds
    pub fn max_x(self) -> f64 {
        self.max_x
    }

    /// Returns the maximum y-coordinate of the bounds
    pub fn max_y(self) -> f64 {
        self.max_y
    }

    /// Returns the center point of the bounds
    pub fn center(self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Returns the width of the bounds
    pub fn width(self) -> f64 {
        self.max_x - self.min_x
    }

    /// Returns the height of the bounds
    pub fn height(self) -> f64 {
        self.max_y - self.min_y
    }

    /// Merges two bounds to create a larger bounds that contains both
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_new() {
        let point = Point::new(3.5, 4.2);
        assert_eq!(point.x(), 3.5);
        assert_eq!(point.y(), 4.2);
    }

    #[test]
    fn test_point_add_sub() {
        let p1 = Point::new(5.0, 8.0);
        let p2 = Point::new(2.0, 3.0);
        assert_eq!(p1.add_point(p2), Point::new(7.0, 11.0));
        assert_eq!(p1.sub_point(p2), Point::new(3.0, 5.0));
    }

    #[test]
    fn test_point_midpoint() {
        let mid = Point::new(0.0, 0.0).midpoint(Point::new(4.0, 6.0));
        assert_eq!(mid, Point::new(2.0, 3.0));
    }

    #[test]
    fn test_point_distance() {
        let p = Point::new(3.0, 4.0);
        assert_eq!(Point::default().distance_to(p), 5.0);
        assert_eq!(p.distance_to(p), 0.0);
    }

    #[test]
    fn test_bounds_new_from_center() {
        let bounds = Bounds::new_from_center(Point::new(50.0, 60.0), Size::new(20.0, 30.0));
        assert_eq!(bounds.min_x(), 40.0);
        assert_eq!(bounds.min_y(), 45.0);
        assert_eq!(bounds.max_x(), 60.0);
        assert_eq!(bounds.max_y(), 75.0);
        assert_eq!(bounds.width(), 20.0);
        assert_eq!(bounds.height(), 30.0);
        assert_eq!(bounds.center(), Point::new(50.0, 60.0));
    }

    #[test]
    fn test_bounds_new_from_corners_any_order() {
        let a = Bounds::new_from_corners(Point::new(10.0, 2.0), Point::new(4.0, 8.0));
        let b = Bounds::new_from_corners(Point::new(4.0, 8.0), Point::new(10.0, 2.0));
        assert_eq!(a, b);
        assert_eq!(a.min_x(), 4.0);
        assert_eq!(a.max_y(), 8.0);
    }

    #[test]
    fn test_bounds_merge() {
        let b1 = Bounds::new_from_corners(Point::new(1.0, 2.0), Point::new(5.0, 6.0));
        let b2 = Bounds::new_from_corners(Point::new(3.0, 0.0), Point::new(8.0, 4.0));
        let merged = b1.merge(&b2);
        assert_eq!(merged.min_x(), 1.0);
        assert_eq!(merged.min_y(), 0.0);
        assert_eq!(merged.max_x(), 8.0);
        assert_eq!(merged.max_y(), 6.0);
    }

    #[test]
    fn test_zero_size_bounds() {
        let bounds = Bounds::new_from_center(Point::new(10.0, 20.0), Size::default());
        assert_eq!(bounds.width(), 0.0);
        assert_eq!(bounds.height(), 0.0);
        assert_eq!(bounds.center(), Point::new(10.0, 20.0));
    }
}

#[cfg(test)]
mod proptest_tests {
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    use super::*;

    fn point_strategy() -> impl Strategy<Value = Point> {
        (-1000.0f64..1000.0, -1000.0f64..1000.0).prop_map(|(x, y)| Point::new(x, y))
    }

    fn bounds_strategy() -> impl Strategy<Value = Bounds> {
        (
            -1000.0f64..1000.0,
            -1000.0f64..1000.0,
            1.0f64..500.0,
            1.0f64..500.0,
        )
            .prop_map(|(x, y, w, h)| Bounds::new_from_center(Point::new(x, y), Size::new(w, h)))
    }

    proptest! {
        #[test]
        fn add_sub_inverse(p1 in point_strategy(), p2 in point_strategy()) {
            let result = p1.add_point(p2).sub_point(p2);
            prop_assert!(approx_eq!(f64, result.x(), p1.x(), epsilon = 1e-9));
            prop_assert!(approx_eq!(f64, result.y(), p1.y(), epsilon = 1e-9));
        }

        #[test]
        fn midpoint_is_between_points(p1 in point_strategy(), p2 in point_strategy()) {
            let mid = p1.midpoint(p2);
            prop_assert!(mid.x() >= p1.x().min(p2.x()) && mid.x() <= p1.x().max(p2.x()));
            prop_assert!(mid.y() >= p1.y().min(p2.y()) && mid.y() <= p1.y().max(p2.y()));
        }

        #[test]
        fn merge_is_commutative(b1 in bounds_strategy(), b2 in bounds_strategy()) {
            prop_assert_eq!(b1.merge(&b2), b2.merge(&b1));
        }

        #[test]
        fn merge_contains_both(b1 in bounds_strategy(), b2 in bounds_strategy()) {
            let merged = b1.merge(&b2);
            prop_assert!(merged.min_x() <= b1.min_x() && merged.min_x() <= b2.min_x());
            prop_assert!(merged.min_y() <= b1.min_y() && merged.min_y() <= b2.min_y());
            prop_assert!(merged.max_x() >= b1.max_x() && merged.max_x() >= b2.max_x());
            prop_assert!(merged.max_y() >= b1.max_y() && merged.max_y() >= b2.max_y());
        }
    }
}
