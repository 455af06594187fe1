//! Axis-aligned rectangle primitives
//!
//! Coordinates are y-down with the origin at the top-left corner of the
//! canvas. Every function here is total: degenerate (zero or negative area)
//! rectangles simply never intersect anything.

use serde::{Deserialize, Serialize};

/// A 2D point in canvas coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to another point
    pub fn manhattan(&self, other: Point) -> f64 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// An axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Side of a rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge x-coordinate
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge y-coordinate
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Center point of the rectangle
    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }

    pub fn area(&self) -> f64 {
        if self.is_degenerate() {
            0.0
        } else {
            self.width * self.height
        }
    }

    /// True when the rectangle has no positive area or carries non-finite values
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
            || !self.x.is_finite()
            || !self.y.is_finite()
            || !self.width.is_finite()
            || !self.height.is_finite()
    }

    /// True when the rectangle is wider than it is tall
    pub fn is_horizontal(&self) -> bool {
        self.width > self.height
    }

    /// Check if this rectangle contains a point (edges inclusive)
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.right()
            && point.y >= self.y
            && point.y <= self.bottom()
    }

    /// Check if a point lies strictly inside this rectangle (edges excluded)
    pub fn contains_strictly(&self, point: Point) -> bool {
        point.x > self.x && point.x < self.right() && point.y > self.y && point.y < self.bottom()
    }

    /// Check if `inner` fits inside this rectangle grown by `tolerance` on every side
    pub fn encloses(&self, inner: &Rect, tolerance: f64) -> bool {
        inner.x >= self.x - tolerance
            && inner.right() <= self.right() + tolerance
            && inner.y >= self.y - tolerance
            && inner.bottom() <= self.bottom() + tolerance
    }

    /// Check if `inner` sits strictly inside this rectangle shrunk by `margin`
    pub fn encloses_strictly(&self, inner: &Rect, margin: f64) -> bool {
        inner.x > self.x + margin
            && inner.right() < self.right() - margin
            && inner.y > self.y + margin
            && inner.bottom() < self.bottom() - margin
    }

    /// Check if this rectangle overlaps another with positive area.
    /// Touching edges do not count.
    pub fn intersects(&self, other: &Rect) -> bool {
        if self.is_degenerate() || other.is_degenerate() {
            return false;
        }
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// The overlapping rectangle, or `None` if disjoint or only touching
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.intersects(other) {
            return None;
        }
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        Some(Rect::new(x, y, right - x, bottom - y))
    }

    /// Shrink the rectangle by `margin` on every side
    pub fn inset(&self, margin: f64) -> Rect {
        Rect::new(
            self.x + margin,
            self.y + margin,
            self.width - 2.0 * margin,
            self.height - 2.0 * margin,
        )
    }

    /// Compute the union of two rectangles (smallest rectangle containing both)
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right - x, bottom - y)
    }

    /// Round position and size to whole units
    pub fn rounded(&self) -> Rect {
        Rect::new(
            self.x.round(),
            self.y.round(),
            self.width.round(),
            self.height.round(),
        )
    }

    /// Which side of `self` the rectangle `other` touches from outside.
    ///
    /// An edge pair counts as touching when the gap between them is under
    /// `tolerance` and the two rectangles share a positive span along that
    /// edge. Sides are tried top, bottom, left, right; the first match wins.
    pub fn touching_side(&self, other: &Rect, tolerance: f64) -> Option<Side> {
        let x_span = span_overlap(self.x, self.right(), other.x, other.right());
        let y_span = span_overlap(self.y, self.bottom(), other.y, other.bottom());

        if (other.bottom() - self.y).abs() < tolerance && x_span > 0.0 {
            Some(Side::Top)
        } else if (other.y - self.bottom()).abs() < tolerance && x_span > 0.0 {
            Some(Side::Bottom)
        } else if (other.right() - self.x).abs() < tolerance && y_span > 0.0 {
            Some(Side::Left)
        } else if (other.x - self.right()).abs() < tolerance && y_span > 0.0 {
            Some(Side::Right)
        } else {
            None
        }
    }

    /// True when the rectangles overlap or touch within `tolerance`
    pub fn is_near(&self, other: &Rect, tolerance: f64) -> bool {
        self.intersects(other) || self.touching_side(other, tolerance).is_some()
    }
}

/// Length of the shared part of two closed intervals (negative when disjoint)
pub fn span_overlap(a_start: f64, a_end: f64, b_start: f64, b_end: f64) -> f64 {
    a_end.min(b_end) - a_start.max(b_start)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges() {
        let r = Rect::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(r.right(), 110.0);
        assert_eq!(r.bottom(), 70.0);
        assert_eq!(r.center(), Point::new(60.0, 45.0));
    }

    #[test]
    fn test_intersects() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        let c = Rect::new(20.0, 20.0, 5.0, 5.0);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_touching_edges_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.intersects(&b));
        assert_eq!(a.intersection(&b), None);
    }

    #[test]
    fn test_degenerate_never_intersects() {
        let line = Rect::new(5.0, 0.0, 0.0, 10.0);
        let block = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(!line.intersects(&block));
        assert!(!block.intersects(&line));
        let nan = Rect::new(f64::NAN, 0.0, 10.0, 10.0);
        assert!(!nan.intersects(&block));
    }

    #[test]
    fn test_intersection_box() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert_eq!(a.intersection(&b), Some(Rect::new(5.0, 5.0, 5.0, 5.0)));
    }

    #[test]
    fn test_touching_side() {
        let ground = Rect::new(100.0, 100.0, 400.0, 100.0);
        let above = Rect::new(100.0, 40.0, 400.0, 60.0);
        let below = Rect::new(150.0, 203.0, 50.0, 20.0);
        let left = Rect::new(40.0, 120.0, 58.0, 40.0);
        let right = Rect::new(500.0, 100.0, 60.0, 60.0);
        assert_eq!(ground.touching_side(&above, 12.0), Some(Side::Top));
        assert_eq!(ground.touching_side(&below, 12.0), Some(Side::Bottom));
        assert_eq!(ground.touching_side(&left, 12.0), Some(Side::Left));
        assert_eq!(ground.touching_side(&right, 12.0), Some(Side::Right));
        assert_eq!(ground.touching_side(&below, 2.0), None);
    }

    #[test]
    fn test_touching_requires_shared_span() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let diagonal = Rect::new(10.0, 10.0, 10.0, 10.0);
        assert_eq!(a.touching_side(&diagonal, 1.0), None);
    }

    #[test]
    fn test_encloses() {
        let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!(outer.encloses(&Rect::new(0.0, 0.0, 100.0, 100.0), 0.0));
        assert!(outer.encloses(&Rect::new(-2.0, 0.0, 10.0, 10.0), 3.0));
        assert!(!outer.encloses_strictly(&Rect::new(1.0, 5.0, 10.0, 10.0), 2.0));
        assert!(outer.encloses_strictly(&Rect::new(3.0, 5.0, 10.0, 10.0), 2.0));
    }

    #[test]
    fn test_distances() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert_eq!(a.manhattan(b), 7.0);
        assert_eq!(a.distance(b), 5.0);
    }
}
