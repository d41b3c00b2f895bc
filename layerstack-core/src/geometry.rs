//! Points, rectangles and bounding boxes in composition space.

use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

/// A point (or offset) in composition space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate (pixels from the left).
    pub x: f64,
    /// Y coordinate (pixels from the top).
    pub y: f64,
}

impl Point {
    /// The origin.
    pub const ORIGIN: Self = Self::new(0.0, 0.0);

    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Scale each axis independently.
    #[must_use]
    pub fn scale(self, sx: f64, sy: f64) -> Self {
        Self::new(self.x * sx, self.y * sy)
    }
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

impl Mul<f64> for Point {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl Rect {
    /// Create a rectangle from its top-left corner and size.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle spanning two corners.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        let min_x = a.x.min(b.x);
        let min_y = a.y.min(b.y);
        Self::new(min_x, min_y, a.x.max(b.x) - min_x, a.y.max(b.y) - min_y)
    }

    /// Top-left corner.
    #[must_use]
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Right edge.
    #[must_use]
    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    /// Centre point.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Whether `point` lies inside the rectangle.
    ///
    /// The left and top edges are inclusive, the right and bottom edges
    /// exclusive, so adjacent rectangles never share a point.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.max_x() && point.y >= self.y && point.y < self.max_y()
    }

    /// Whether the two rectangles overlap with a non-empty area.
    #[must_use]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.max_x()
            && other.x < self.max_x()
            && self.y < other.max_y()
            && other.y < self.max_y()
    }

    /// Smallest rectangle containing both.
    #[must_use]
    pub fn union(&self, other: &Rect) -> Rect {
        let min_x = self.x.min(other.x);
        let min_y = self.y.min(other.y);
        let max_x = self.max_x().max(other.max_x());
        let max_y = self.max_y().max(other.max_y());
        Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }
}

/// The bounding box of a set of layers.
///
/// An empty set is an explicit [`Bounds::Empty`], never a zero-sized
/// rectangle at the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "rect", rename_all = "lowercase")]
pub enum Bounds {
    /// No rectangles were accumulated.
    Empty,
    /// Union of at least one rectangle.
    Rect(Rect),
}

impl Bounds {
    /// Union of all `rects`.
    #[must_use]
    pub fn from_rects<I>(rects: I) -> Self
    where
        I: IntoIterator<Item = Rect>,
    {
        rects.into_iter().fold(Self::Empty, Self::include)
    }

    /// Grow the bounds to include `rect`.
    #[must_use]
    pub fn include(self, rect: Rect) -> Self {
        match self {
            Self::Empty => Self::Rect(rect),
            Self::Rect(current) => Self::Rect(current.union(&rect)),
        }
    }

    /// The rectangle, if any.
    #[must_use]
    pub fn rect(&self) -> Option<Rect> {
        match self {
            Self::Empty => None,
            Self::Rect(rect) => Some(*rect),
        }
    }

    /// Whether no rectangle was accumulated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::Empty
    }
}
