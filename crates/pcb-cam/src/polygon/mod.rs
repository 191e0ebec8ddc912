//! Polygon model: a contour that may own hole polygons.
//!
//! Nesting alternates meaning per level. A level-0 contour is solid, its
//! children are voids, their children solid again, and so on. A polygon
//! with no contour but with children is a pure container used to carry
//! several disjoint islands as one value.

pub mod builder;
pub mod clip;

use crate::geometry::{Point, Transformation};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Polygon {
    points: Vec<Point>,
    holes: Vec<Polygon>,
}

impl Polygon {
    pub fn new(points: Vec<Point>) -> Self {
        Self {
            points,
            holes: Vec::new(),
        }
    }

    pub fn with_holes(points: Vec<Point>, holes: Vec<Polygon>) -> Self {
        Self { points, holes }
    }

    /// A contour-less polygon carrying `children` as independent islands.
    pub fn container(children: Vec<Polygon>) -> Self {
        Self {
            points: Vec::new(),
            holes: children,
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn holes(&self) -> &[Polygon] {
        &self.holes
    }

    pub fn add_hole(&mut self, hole: Polygon) {
        self.holes.push(hole);
    }

    pub fn is_container(&self) -> bool {
        self.points.is_empty() && !self.holes.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty() && self.holes.is_empty()
    }

    /// Twice the signed area of the contour (positive when counter-clockwise).
    pub fn signed_area2(&self) -> i128 {
        let n = self.points.len();
        if n < 3 {
            return 0;
        }
        let mut sum: i128 = 0;
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            sum += a.x as i128 * b.y as i128 - b.x as i128 * a.y as i128;
        }
        sum
    }

    /// Filled area in square nanometers, holes subtracted.
    pub fn area(&self) -> f64 {
        if self.is_container() {
            return self.holes.iter().map(Polygon::area).sum();
        }
        let outer = self.signed_area2().abs() as f64 / 2.0;
        outer - self.holes.iter().map(Polygon::area).sum::<f64>()
    }

    pub fn is_counter_clockwise(&self) -> bool {
        self.signed_area2() > 0
    }

    /// Same polygon with the contour in the requested winding.
    pub fn with_orientation(mut self, counter_clockwise: bool) -> Self {
        if self.points.len() >= 3 && self.is_counter_clockwise() != counter_clockwise {
            self.points.reverse();
        }
        self
    }

    pub fn transformed(&self, t: &Transformation) -> Polygon {
        Polygon {
            points: t.apply_all(&self.points),
            holes: self.holes.iter().map(|h| h.transformed(t)).collect(),
        }
    }

    /// Axis-aligned bounds of the contour and everything nested in it.
    pub fn bounds(&self) -> Option<(Point, Point)> {
        let mut iter = self.all_points();
        let first = iter.next()?;
        let (mut min, mut max) = (first, first);
        for p in iter {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some((min, max))
    }

    fn all_points(&self) -> Box<dyn Iterator<Item = Point> + '_> {
        Box::new(
            self.points
                .iter()
                .copied()
                .chain(self.holes.iter().flat_map(|h| h.all_points())),
        )
    }

    /// Nesting depth: 1 for a plain contour, 0 for an empty polygon.
    pub fn depth(&self) -> usize {
        let own = usize::from(!self.points.is_empty());
        own + self.holes.iter().map(Polygon::depth).max().unwrap_or(0)
    }

    /// Split a container into its islands; other polygons are returned as-is.
    pub fn into_islands(self) -> Vec<Polygon> {
        if self.is_container() {
            self.holes
        } else if self.is_empty() {
            Vec::new()
        } else {
            vec![self]
        }
    }

    /// Even-odd point-in-contour test (holes ignored).
    pub fn contour_contains(&self, p: Point) -> bool {
        let n = self.points.len();
        if n < 3 {
            return false;
        }
        let (px, py) = (p.x as f64, p.y as f64);
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let (xi, yi) = (self.points[i].x as f64, self.points[i].y as f64);
            let (xj, yj) = (self.points[j].x as f64, self.points[j].y as f64);
            if (yi > py) != (yj > py) && px < (xj - xi) * (py - yi) / (yj - yi) + xi {
                inside = !inside;
            }
            j = i;
        }
        inside
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Angle;

    fn square(side: i32) -> Polygon {
        Polygon::new(vec![
            Point::new(0, 0),
            Point::new(side, 0),
            Point::new(side, side),
            Point::new(0, side),
        ])
    }

    #[test]
    fn test_area_with_hole() {
        let mut outer = square(10);
        let hole = Polygon::new(vec![
            Point::new(2, 2),
            Point::new(2, 4),
            Point::new(4, 4),
            Point::new(4, 2),
        ]);
        outer.add_hole(hole);
        assert!((outer.area() - 96.0).abs() < 1e-9);
        assert_eq!(outer.depth(), 2);
    }

    #[test]
    fn test_orientation() {
        let ccw = square(10);
        assert!(ccw.is_counter_clockwise());
        let cw = ccw.clone().with_orientation(false);
        assert!(!cw.is_counter_clockwise());
        assert_eq!(cw.signed_area2(), -200);
    }

    #[test]
    fn test_container() {
        let c = Polygon::container(vec![square(1), square(2)]);
        assert!(c.is_container());
        assert!(!c.is_empty());
        assert!((c.area() - 5.0).abs() < 1e-9);
        assert_eq!(c.into_islands().len(), 2);
        assert!(Polygon::default().into_islands().is_empty());
    }

    #[test]
    fn test_transformed_and_bounds() {
        let t = Transformation::new(Point::new(100, 100), Angle::DEG_90);
        let p = square(10).transformed(&t);
        assert_eq!(p.bounds(), Some((Point::new(90, 100), Point::new(100, 110))));
    }

    #[test]
    fn test_contour_contains() {
        let sq = square(10);
        assert!(sq.contour_contains(Point::new(5, 5)));
        assert!(!sq.contour_contains(Point::new(15, 5)));
    }
}
