//! Overlay geometry primitives
//!
//! Points and rectangles in capture-local coordinate space. All values are
//! device-independent pixels stored as f64; conversion to raster pixels
//! happens at composite time.

/// A position in capture-local coordinate space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point
    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Return this point translated by (dx, dy)
    pub fn translated(&self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }

    /// Return this point clamped into a rectangle
    pub fn clamped_to(&self, bounds: &Rect) -> Point {
        Point::new(
            self.x.clamp(bounds.left(), bounds.right()),
            self.y.clamp(bounds.top(), bounds.bottom()),
        )
    }
}

/// An axis-aligned rectangle with non-negative dimensions
///
/// Construction through [`Rect::from_corners`] normalizes any two opposite
/// corners, so drags in all four directions produce the same rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a rectangle from origin and size
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle at the origin with the given size
    pub fn from_size(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Create a normalized rectangle from two opposite corners
    pub fn from_corners(a: Point, b: Point) -> Self {
        let min_x = a.x.min(b.x);
        let min_y = a.y.min(b.y);
        let max_x = a.x.max(b.x);
        let max_y = a.y.max(b.y);
        Self::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Center point of the rectangle
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Whether the rectangle has zero area
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Check if a point lies inside the rectangle (edges inclusive)
    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.left()
            && point.x <= self.right()
            && point.y >= self.top()
            && point.y <= self.bottom()
    }

    /// Return this rectangle translated by (dx, dy)
    pub fn translated(&self, dx: f64, dy: f64) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Return this rectangle repositioned so it lies fully within `bounds`
    ///
    /// Size is preserved. A rectangle larger than `bounds` is pinned to the
    /// bounds origin on the oversized axis.
    pub fn clamped_within(&self, bounds: &Rect) -> Rect {
        let max_x = (bounds.right() - self.width).max(bounds.left());
        let max_y = (bounds.bottom() - self.height).max(bounds.top());
        Rect::new(
            self.x.clamp(bounds.left(), max_x),
            self.y.clamp(bounds.top(), max_y),
            self.width,
            self.height,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert_eq!(a.distance_to(&b), 5.0);
    }

    #[test]
    fn test_point_clamped_to_bounds() {
        let bounds = Rect::from_size(100.0, 50.0);
        let inside = Point::new(40.0, 20.0).clamped_to(&bounds);
        assert_eq!(inside, Point::new(40.0, 20.0));

        let outside = Point::new(-10.0, 75.0).clamped_to(&bounds);
        assert_eq!(outside, Point::new(0.0, 50.0));
    }

    #[test]
    fn test_from_corners_normalizes_all_directions() {
        let expected = Rect::new(10.0, 20.0, 30.0, 40.0);
        let a = Point::new(10.0, 20.0);
        let b = Point::new(40.0, 60.0);

        assert_eq!(Rect::from_corners(a, b), expected);
        assert_eq!(Rect::from_corners(b, a), expected);
        assert_eq!(
            Rect::from_corners(Point::new(40.0, 20.0), Point::new(10.0, 60.0)),
            expected
        );
        assert_eq!(
            Rect::from_corners(Point::new(10.0, 60.0), Point::new(40.0, 20.0)),
            expected
        );
    }

    #[test]
    fn test_contains_is_edge_inclusive() {
        let rect = Rect::new(10.0, 10.0, 20.0, 20.0);
        assert!(rect.contains(&Point::new(10.0, 10.0)));
        assert!(rect.contains(&Point::new(30.0, 30.0)));
        assert!(rect.contains(&Point::new(15.0, 25.0)));
        assert!(!rect.contains(&Point::new(9.9, 15.0)));
        assert!(!rect.contains(&Point::new(15.0, 30.1)));
    }

    #[test]
    fn test_clamped_within_keeps_size() {
        let bounds = Rect::from_size(100.0, 100.0);
        let rect = Rect::new(90.0, -5.0, 20.0, 20.0);
        let clamped = rect.clamped_within(&bounds);

        assert_eq!(clamped, Rect::new(80.0, 0.0, 20.0, 20.0));
    }

    #[test]
    fn test_clamped_within_oversized_pins_to_origin() {
        let bounds = Rect::from_size(50.0, 50.0);
        let rect = Rect::new(10.0, 10.0, 80.0, 20.0);
        let clamped = rect.clamped_within(&bounds);

        assert_eq!(clamped.x, 0.0);
        assert_eq!(clamped.y, 10.0);
        assert_eq!(clamped.width, 80.0);
    }

    #[test]
    fn test_is_empty() {
        assert!(Rect::new(0.0, 0.0, 0.0, 10.0).is_empty());
        assert!(Rect::new(0.0, 0.0, 10.0, 0.0).is_empty());
        assert!(!Rect::new(0.0, 0.0, 0.1, 0.1).is_empty());
    }
}
