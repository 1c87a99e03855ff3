//! Geometric primitives for chart and timeline positioning.
//!
//! All coordinates are `f64` pixel-space values with the origin at the
//! top-left corner: x increases rightward, y increases downward. This
//! matches the coordinate system of the host's drawing surface.
//!
//! # Overview
//!
//! - [`Point`] - A 2D coordinate in chart space
//! - [`Size`] - Width and height dimensions
//! - [`Rect`] - An axis-aligned rectangle defined by origin and size
//! - [`snap_to_grid`] - Grid quantization used by drag gestures

use serde::{Deserialize, Serialize};

/// A 2D point in chart coordinate space.
///
/// # Examples
///
/// ```
/// use fabula_core::geometry::Point;
///
/// let pressed = Point::new(130.0, 45.0);
/// let origin = Point::new(100.0, 40.0);
///
/// let grab = pressed.sub(origin);
/// assert_eq!(grab.x(), 30.0);
/// assert_eq!(grab.y(), 5.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    x: f64,
    y: f64,
}

impl Point {
    /// Creates a new point with the specified coordinates.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point.
    pub fn x(self) -> f64 {
        self.x
    }

    /// Returns the y-coordinate of the point.
    pub fn y(self) -> f64 {
        self.y
    }

    /// Adds another point to this point, returning a new point.
    pub fn add(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// Subtracts another point from this point, returning a new point.
    pub fn sub(self, other: Point) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    /// Linearly interpolates between this point and another.
    ///
    /// `t = 0.0` yields this point, `t = 1.0` yields `other`, and
    /// `t = 0.5` yields the midpoint.
    ///
    /// # Examples
    ///
    /// ```
    /// use fabula_core::geometry::Point;
    ///
    /// let start = Point::new(0.0, 0.0);
    /// let end = Point::new(10.0, 20.0);
    ///
    /// let mid = start.lerp(end, 0.5);
    /// assert_eq!(mid.x(), 5.0);
    /// assert_eq!(mid.y(), 10.0);
    /// ```
    pub fn lerp(self, other: Point, t: f64) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    /// Clamps both coordinates to be non-negative.
    ///
    /// Chart entities never move past the top-left edge of the canvas.
    pub fn clamp_non_negative(self) -> Self {
        Self {
            x: self.x.max(0.0),
            y: self.y.max(0.0),
        }
    }

    /// Snaps both coordinates independently to the given grid interval.
    ///
    /// See [`snap_to_grid`] for the quantization rule.
    pub fn snap_to_grid(self, interval: f64) -> Self {
        Self {
            x: snap_to_grid(self.x, interval),
            y: snap_to_grid(self.y, interval),
        }
    }
}

/// Width and height dimensions of a chart element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    width: f64,
    height: f64,
}

impl Size {
    /// Creates a new size with the specified dimensions.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Returns the width dimension.
    pub fn width(self) -> f64 {
        self.width
    }

    /// Returns the height dimension.
    pub fn height(self) -> f64 {
        self.height
    }
}

/// An axis-aligned rectangle defined by its top-left origin and size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    origin: Point,
    size: Size,
}

impl Rect {
    /// Creates a rectangle from its top-left origin and size.
    pub fn new(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    /// Returns the top-left origin.
    pub fn origin(self) -> Point {
        self.origin
    }

    /// Returns the size.
    pub fn size(self) -> Size {
        self.size
    }

    /// Returns the minimum (left) x-coordinate.
    pub fn min_x(self) -> f64 {
        self.origin.x
    }

    /// Returns the minimum (top) y-coordinate.
    pub fn min_y(self) -> f64 {
        self.origin.y
    }

    /// Returns the maximum (right) x-coordinate.
    pub fn max_x(self) -> f64 {
        self.origin.x + self.size.width
    }

    /// Returns the maximum (bottom) y-coordinate.
    pub fn max_y(self) -> f64 {
        self.origin.y + self.size.height
    }

    /// Returns the width of the rectangle.
    pub fn width(self) -> f64 {
        self.size.width
    }

    /// Returns the height of the rectangle.
    pub fn height(self) -> f64 {
        self.size.height
    }

    /// Returns the center point of the rectangle.
    pub fn center(self) -> Point {
        Point::new(
            self.origin.x + self.size.width / 2.0,
            self.origin.y + self.size.height / 2.0,
        )
    }

    /// Returns `true` if the point lies inside the rectangle or on its
    /// boundary.
    pub fn contains(self, point: Point) -> bool {
        point.x >= self.min_x()
            && point.x <= self.max_x()
            && point.y >= self.min_y()
            && point.y <= self.max_y()
    }
}

/// Quantizes a value to a grid interval.
///
/// The value is floor-divided by the interval and rescaled, so values snap
/// toward negative infinity. Drag gestures use this with 10 px (nodes) and
/// 5 px (labels) intervals.
///
/// # Examples
///
/// ```
/// use fabula_core::geometry::snap_to_grid;
///
/// assert_eq!(snap_to_grid(37.0, 10.0), 30.0);
/// assert_eq!(snap_to_grid(40.0, 10.0), 40.0);
/// assert_eq!(snap_to_grid(14.9, 5.0), 10.0);
/// ```
pub fn snap_to_grid(value: f64, interval: f64) -> f64 {
    debug_assert!(interval > 0.0, "grid interval must be positive");
    (value / interval).floor() * interval
}
