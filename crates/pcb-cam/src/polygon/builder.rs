//! Canonical polygon generation for pad, trace and relief shapes.
//!
//! Every builder is a pure function of its parameters and samples curves at
//! a fixed resolution, so identical inputs always produce identical vertex
//! lists. All contours come out counter-clockwise.

use std::f64::consts::PI;

use crate::error::CamError;
use crate::geometry::{Angle, Point, Ratio, Size, Transformation};

use super::Polygon;

/// Vertices in a full circle.
pub const CIRCLE_SEGMENTS: usize = 32;
/// Vertices in a rounded corner or a trace end-cap, endpoints included.
pub const ARC_POINTS: usize = 9;

/// Place local float coordinates at `center`, rotated by `rotation`.
fn place(
    local: impl IntoIterator<Item = (f64, f64)>,
    center: Point,
    rotation: Angle,
) -> Vec<Point> {
    let t = Transformation::new(center, rotation);
    let mut points: Vec<Point> = local
        .into_iter()
        .map(|(x, y)| t.apply(Point::from_f64(x, y)))
        .collect();
    dedup_closed(&mut points);
    points
}

/// Drop consecutive duplicates, including a closing point equal to the first.
fn dedup_closed(points: &mut Vec<Point>) {
    points.dedup();
    while points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
}

/// `count` points on a circle of `radius` around `(cx, cy)` from `start` to
/// `end` radians, both ends included.
fn arc_points(
    cx: f64,
    cy: f64,
    radius: f64,
    start: f64,
    end: f64,
    count: usize,
) -> Vec<(f64, f64)> {
    let steps = (count - 1).max(1) as f64;
    (0..count)
        .map(|k| {
            let a = start + (end - start) * k as f64 / steps;
            (cx + radius * a.cos(), cy + radius * a.sin())
        })
        .collect()
}

pub fn circle(center: Point, radius: i32) -> Polygon {
    let r = radius as f64;
    let local = (0..CIRCLE_SEGMENTS).map(|k| {
        let a = 2.0 * PI * k as f64 / CIRCLE_SEGMENTS as f64;
        (r * a.cos(), r * a.sin())
    });
    Polygon::new(place(local, center, Angle::ZERO))
}

/// Regular N-gon inscribed in a circle of `diameter`, first vertex at
/// `rotation`.
pub fn regular_polygon(
    center: Point,
    diameter: i32,
    sides: u32,
    rotation: Angle,
) -> Result<Polygon, CamError> {
    if sides < 3 {
        return Err(CamError::InvalidShape(format!(
            "regular polygon needs at least 3 sides, got {sides}"
        )));
    }
    let r = diameter as f64 / 2.0;
    let local = (0..sides).map(|k| {
        let a = 2.0 * PI * k as f64 / sides as f64;
        (r * a.cos(), r * a.sin())
    });
    Ok(Polygon::new(place(local, center, rotation)))
}

pub fn rectangle(center: Point, size: Size, rotation: Angle) -> Polygon {
    rounded_rect(center, size, 0, rotation)
}

/// Rectangle with four quarter-circle corners of `radius`.
///
/// Each corner contributes [`ARC_POINTS`] vertices joined by straight
/// edges. A zero radius yields a plain 4-vertex rectangle.
pub fn rounded_rect(center: Point, size: Size, radius: i32, rotation: Angle) -> Polygon {
    let hw = size.width as f64 / 2.0;
    let hh = size.height as f64 / 2.0;
    let r = (radius.max(0) as f64).min(hw.min(hh));

    if r <= 0.0 {
        let local = [(hw, -hh), (hw, hh), (-hw, hh), (-hw, -hh)];
        return Polygon::new(place(local, center, rotation));
    }

    let corners = [(hw - r, hh - r), (-hw + r, hh - r), (-hw + r, -hh + r), (hw - r, -hh + r)];
    let mut local = Vec::with_capacity(4 * ARC_POINTS);
    for (q, (cx, cy)) in corners.into_iter().enumerate() {
        let start = q as f64 * PI / 2.0;
        local.extend(arc_points(cx, cy, r, start, start + PI / 2.0, ARC_POINTS));
    }
    Polygon::new(place(local, center, rotation))
}

/// Rounded rectangle whose corner radius is `ratio` of half the short side.
pub fn rounded_rect_ratio(center: Point, size: Size, ratio: Ratio, rotation: Angle) -> Polygon {
    rounded_rect(center, size, ratio.apply(size.min_side() / 2), rotation)
}

/// Stadium: a rounded rectangle whose short side is fully round.
pub fn obround(center: Point, size: Size, rotation: Angle) -> Polygon {
    if size.width == size.height {
        return circle(center, size.width / 2);
    }
    let (long, angle) = if size.width > size.height {
        (size.width - size.height, rotation)
    } else {
        (size.height - size.width, rotation + Angle::DEG_90)
    };
    let half = long / 2;
    let t = Transformation::new(center, angle);
    line(t.apply(Point::new(-half, 0)), t.apply(Point::new(half, 0)), size.min_side())
}

/// Trace outline: two semicircular end-caps of [`ARC_POINTS`] vertices each.
pub fn line(start: Point, end: Point, width: i32) -> Polygon {
    let hw = width as f64 / 2.0;
    let dx = (end.x - start.x) as f64;
    let dy = (end.y - start.y) as f64;
    let dir = if dx == 0.0 && dy == 0.0 { 0.0 } else { dy.atan2(dx) };

    let mut local = arc_points(
        (end.x - start.x) as f64,
        (end.y - start.y) as f64,
        hw,
        dir - PI / 2.0,
        dir + PI / 2.0,
        ARC_POINTS,
    );
    local.extend(arc_points(0.0, 0.0, hw, dir + PI / 2.0, dir + 1.5 * PI, ARC_POINTS));
    Polygon::new(place(local, start, Angle::ZERO))
}

/// Number of segments used for an arc sweep at circle resolution.
pub fn arc_segments(sweep: Angle) -> usize {
    let sweep = if sweep.is_zero() { 36_000 } else { sweep.value() };
    let per_segment = 36_000 / CIRCLE_SEGMENTS as i32;
    ((sweep + per_segment - 1) / per_segment).max(2) as usize
}

/// Outline of an arc-shaped trace of `width` with round end-caps.
///
/// `sweep` is signed hundredths of a degree, positive counter-clockwise.
/// When half the width reaches the radius the inner edge collapses onto
/// the center, and the outline becomes a container of the outer sector and
/// both cap discs.
pub fn arc_line(
    center: Point,
    radius: i32,
    start: Angle,
    sweep: i32,
    width: i32,
) -> Result<Polygon, CamError> {
    if sweep == 0 {
        return Err(CamError::InvalidShape("arc with zero sweep".into()));
    }
    let hw = width as f64 / 2.0;
    let r = radius as f64;
    let (start, sweep) = if sweep < 0 {
        (start + Angle::new(sweep), -sweep)
    } else {
        (start, sweep)
    };
    let a0 = start.to_radians();
    let a1 = a0 + (sweep as f64 / 100.0).to_radians();
    let n = arc_segments(Angle::new(sweep.min(35_999)));

    let (ex, ey) = (r * a1.cos(), r * a1.sin());
    let (sx, sy) = (r * a0.cos(), r * a0.sin());

    if r - hw <= 0.0 {
        let mut sector = vec![(0.0, 0.0)];
        sector.extend(arc_points(0.0, 0.0, r + hw, a0, a1, n + 1));
        let cap = |x: f64, y: f64| circle(center + Point::from_f64(x, y), width / 2);
        return Ok(Polygon::container(vec![
            Polygon::new(place(sector, center, Angle::ZERO)),
            cap(sx, sy),
            cap(ex, ey),
        ]));
    }

    let mut local = arc_points(0.0, 0.0, r + hw, a0, a1, n + 1);
    local.extend(arc_points(ex, ey, hw, a1, a1 + PI, ARC_POINTS));
    local.extend(arc_points(0.0, 0.0, r - hw, a1, a0, n + 1));
    local.extend(arc_points(sx, sy, hw, a0 + PI, a0 + 2.0 * PI, ARC_POINTS));
    Ok(Polygon::new(place(local, center, Angle::ZERO)))
}

/// Plus-shaped spoke polygon used to cut thermal reliefs.
///
/// The arms reach past the pad outline grown by `spacing`, so subtracting
/// the cross from that outline always severs it into four legs.
pub fn thermal_cross(
    center: Point,
    pad: Size,
    spoke_width: i32,
    spacing: i32,
    rotation: Angle,
) -> Polygon {
    let hs = spoke_width as f64 / 2.0;
    let overshoot = (2 * spacing + spoke_width) as f64;
    let rx = pad.width as f64 / 2.0 + overshoot;
    let ry = pad.height as f64 / 2.0 + overshoot;
    let local = [
        (rx, -hs),
        (rx, hs),
        (hs, hs),
        (hs, ry),
        (-hs, ry),
        (-hs, hs),
        (-rx, hs),
        (-rx, -hs),
        (-hs, -hs),
        (-hs, -ry),
        (hs, -ry),
        (hs, -hs),
    ];
    Polygon::new(place(local, center, rotation))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_vertex_count_and_radius() {
        let center = Point::new(1_000_000, -2_000_000);
        let radius = 750_000;
        let c = circle(center, radius);
        assert_eq!(c.points().len(), CIRCLE_SEGMENTS);
        for p in c.points() {
            let d = center.distance(*p);
            assert!((d - radius as f64).abs() <= 1.0, "vertex {p:?} at {d}");
        }
        assert!(c.is_counter_clockwise());
    }

    #[test]
    fn test_circle_is_reproducible() {
        assert_eq!(circle(Point::ORIGIN, 123_456), circle(Point::ORIGIN, 123_456));
    }

    #[test]
    fn test_regular_polygon() {
        let hex = regular_polygon(Point::ORIGIN, 2_000_000, 6, Angle::ZERO).unwrap();
        assert_eq!(hex.points().len(), 6);
        assert_eq!(hex.points()[0], Point::new(1_000_000, 0));
        assert!(regular_polygon(Point::ORIGIN, 1_000, 2, Angle::ZERO).is_err());
    }

    #[test]
    fn test_rectangle_corners() {
        let r = rectangle(Point::new(10, 10), Size::new(4, 2), Angle::ZERO);
        assert_eq!(
            r.points(),
            &[
                Point::new(12, 9),
                Point::new(12, 11),
                Point::new(8, 11),
                Point::new(8, 9)
            ]
        );
    }

    #[test]
    fn test_rounded_rect_uses_four_quadrant_arcs() {
        let rr = rounded_rect(Point::ORIGIN, Size::new(2_000_000, 1_000_000), 250_000, Angle::ZERO);
        assert_eq!(rr.points().len(), 4 * ARC_POINTS);
        let (min, max) = rr.bounds().unwrap();
        assert_eq!(min, Point::new(-1_000_000, -500_000));
        assert_eq!(max, Point::new(1_000_000, 500_000));
        assert!(rr.is_counter_clockwise());
    }

    #[test]
    fn test_rounded_rect_ratio() {
        let rr = rounded_rect_ratio(
            Point::ORIGIN,
            Size::new(2_000_000, 1_000_000),
            Ratio::new(0),
            Angle::ZERO,
        );
        assert_eq!(rr.points().len(), 4);
    }

    #[test]
    fn test_line_has_two_end_caps() {
        let l = line(Point::ORIGIN, Point::new(5_000_000, 0), 200_000);
        assert_eq!(l.points().len(), 2 * ARC_POINTS);
        let (min, max) = l.bounds().unwrap();
        assert_eq!(min, Point::new(-100_000, -100_000));
        assert_eq!(max, Point::new(5_100_000, 100_000));
        assert!(l.is_counter_clockwise());
    }

    #[test]
    fn test_obround_vertical() {
        let o = obround(Point::ORIGIN, Size::new(1_000_000, 3_000_000), Angle::ZERO);
        let (min, max) = o.bounds().unwrap();
        assert_eq!(min, Point::new(-500_000, -1_500_000));
        assert_eq!(max, Point::new(500_000, 1_500_000));
    }

    #[test]
    fn test_arc_line() {
        let a = arc_line(Point::ORIGIN, 1_000_000, Angle::ZERO, 9_000, 100_000).unwrap();
        let n = arc_segments(Angle::DEG_90);
        assert_eq!(n, 8);
        // Shared cap/arc endpoints collapse, leaving 7 interior cap vertices per cap.
        assert_eq!(a.points().len(), 2 * (n + 1) + 2 * (ARC_POINTS - 2));
        assert!(a.is_counter_clockwise());
        assert!(arc_line(Point::ORIGIN, 1_000_000, Angle::ZERO, 0, 100_000).is_err());
    }

    #[test]
    fn test_arc_line_wider_than_radius() {
        let a = arc_line(Point::new(5_000_000, 0), 300_000, Angle::ZERO, 9_000, 650_000).unwrap();
        assert!(a.is_container());
        assert_eq!(a.holes().len(), 3);
        assert_eq!(a.holes()[0].points()[0], Point::new(5_000_000, 0));
        assert_eq!(a.holes()[1].points().len(), CIRCLE_SEGMENTS);
        let (min, max) = a.bounds().unwrap();
        assert!(min.x < 5_000_000 && max.x > 5_000_000 + 300_000 + 325_000 - 1_000);
        assert!(min.y < 0 && max.y > 300_000 + 325_000 - 1_000);
    }

    #[test]
    fn test_arc_line_negative_sweep_matches_positive() {
        let cw = arc_line(Point::ORIGIN, 1_000_000, Angle::DEG_90, -9_000, 100_000).unwrap();
        let ccw = arc_line(Point::ORIGIN, 1_000_000, Angle::ZERO, 9_000, 100_000).unwrap();
        assert_eq!(cw, ccw);
    }

    #[test]
    fn test_thermal_cross_shape() {
        let pad = Size::new(1_000_000, 1_000_000);
        let c = thermal_cross(Point::ORIGIN, pad, 200_000, 250_000, Angle::ZERO);
        assert_eq!(c.points().len(), 12);
        assert!(c.is_counter_clockwise());
        let (_, max) = c.bounds().unwrap();
        // Reaches beyond the outline grown by spacing (750_000).
        assert!(max.x > 750_000 && max.y > 750_000);
    }
}
