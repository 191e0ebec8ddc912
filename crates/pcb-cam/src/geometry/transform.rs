use super::{Angle, Point};

/// Rotate `p` about the origin.
pub fn rotate_point(p: Point, angle: Angle) -> Point {
    match angle.value() {
        0 => p,
        9_000 => Point::new(-p.y, p.x),
        18_000 => Point::new(-p.x, -p.y),
        27_000 => Point::new(p.y, -p.x),
        _ => {
            let (sin, cos) = angle.sin_cos();
            let x = p.x as f64;
            let y = p.y as f64;
            Point::from_f64(x * cos - y * sin, x * sin + y * cos)
        }
    }
}

/// Rigid placement: translate to `offset`, then rotate about it.
///
/// A point `p` in local coordinates lands at `offset + R(rotation) * p`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Transformation {
    pub offset: Point,
    pub rotation: Angle,
}

impl Transformation {
    pub const IDENTITY: Transformation = Transformation {
        offset: Point::ORIGIN,
        rotation: Angle::ZERO,
    };

    pub const fn new(offset: Point, rotation: Angle) -> Self {
        Self { offset, rotation }
    }

    pub const fn translation(offset: Point) -> Self {
        Self::new(offset, Angle::ZERO)
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    pub fn apply(&self, p: Point) -> Point {
        self.offset + rotate_point(p, self.rotation)
    }

    pub fn apply_angle(&self, a: Angle) -> Angle {
        a + self.rotation
    }

    pub fn apply_all(&self, points: &[Point]) -> Vec<Point> {
        points.iter().map(|p| self.apply(*p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orthogonal_rotation_is_exact() {
        let p = Point::new(1_000, 250);
        assert_eq!(rotate_point(p, Angle::DEG_90), Point::new(-250, 1_000));
        assert_eq!(rotate_point(p, Angle::DEG_180), Point::new(-1_000, -250));
        assert_eq!(rotate_point(p, Angle::DEG_270), Point::new(250, -1_000));
    }

    #[test]
    fn test_diagonal_rotation_rounds() {
        let p = Point::new(1_000_000, 0);
        let r = rotate_point(p, Angle::DEG_45);
        assert_eq!(r, Point::new(707_107, 707_107));
    }

    #[test]
    fn test_translate_then_rotate() {
        // Rotation happens about the translated origin, so the offset itself
        // is not rotated.
        let t = Transformation::new(Point::new(10_000, 0), Angle::DEG_90);
        assert_eq!(t.apply(Point::new(1_000, 0)), Point::new(10_000, 1_000));
        assert_eq!(t.apply(Point::ORIGIN), Point::new(10_000, 0));
    }

    #[test]
    fn test_identity() {
        let p = Point::new(-5, 7);
        assert!(Transformation::IDENTITY.is_identity());
        assert_eq!(Transformation::IDENTITY.apply(p), p);
        assert_eq!(
            Transformation::translation(Point::new(1, 1)).apply_angle(Angle::DEG_90),
            Angle::DEG_90
        );
    }
}
