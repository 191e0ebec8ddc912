use std::ops::{Add, Neg, Sub};

use serde::{Deserialize, Serialize};

/// A position in nanometers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[i32; 2]", into = "[i32; 2]")]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Build a point from float nanometers, rounding half away from zero.
    pub fn from_f64(x: f64, y: f64) -> Self {
        Self {
            x: x.round() as i32,
            y: y.round() as i32,
        }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn distance(self, other: Point) -> f64 {
        let dx = (other.x as i64 - self.x as i64) as f64;
        let dy = (other.y as i64 - self.y as i64) as f64;
        dx.hypot(dy)
    }
}

impl From<[i32; 2]> for Point {
    fn from(v: [i32; 2]) -> Self {
        Self::new(v[0], v[1])
    }
}

impl From<Point> for [i32; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

/// Width and height in nanometers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[i32; 2]", into = "[i32; 2]")]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub const fn square(side: i32) -> Self {
        Self::new(side, side)
    }

    pub fn min_side(self) -> i32 {
        self.width.min(self.height)
    }

    pub fn max_side(self) -> i32 {
        self.width.max(self.height)
    }

    /// Grow (or with a negative amount, shrink) every edge by `amount`.
    pub fn inflate(self, amount: i32) -> Self {
        Self::new(
            (self.width + 2 * amount).max(0),
            (self.height + 2 * amount).max(0),
        )
    }

    pub fn is_square(self) -> bool {
        self.width == self.height
    }
}

impl From<[i32; 2]> for Size {
    fn from(v: [i32; 2]) -> Self {
        Self::new(v[0], v[1])
    }
}

impl From<Size> for [i32; 2] {
    fn from(s: Size) -> Self {
        [s.width, s.height]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_arithmetic() {
        let a = Point::new(3, -4);
        let b = Point::new(10, 20);
        assert_eq!(a + b, Point::new(13, 16));
        assert_eq!(b - a, Point::new(7, 24));
        assert_eq!(-a, Point::new(-3, 4));
        assert_eq!(a.offset(1, 1), Point::new(4, -3));
    }

    #[test]
    fn test_distance() {
        let d = Point::ORIGIN.distance(Point::new(3, 4));
        assert!((d - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_point_serde_as_array() {
        let p: Point = serde_json::from_str("[1500000, -250]").unwrap();
        assert_eq!(p, Point::new(1_500_000, -250));
        assert_eq!(serde_json::to_string(&p).unwrap(), "[1500000,-250]");
    }

    #[test]
    fn test_size_inflate() {
        let s = Size::new(1000, 400);
        assert_eq!(s.inflate(100), Size::new(1200, 600));
        assert_eq!(s.inflate(-300), Size::new(400, 0));
        assert_eq!(s.min_side(), 400);
        assert_eq!(s.max_side(), 1000);
    }
}
