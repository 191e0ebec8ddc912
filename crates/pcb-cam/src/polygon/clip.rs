use i_overlay::core::fill_rule::FillRule;
use i_overlay::core::overlay::Overlay;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::i_float::int::point::IntPoint;
use i_overlay::i_shape::int::shape::{IntContour, IntShape};
use log::debug;

use crate::error::CamError;
use crate::geometry::Point;

use super::Polygon;

/// Legs a thermal relief must split into.
pub const THERMAL_LEGS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipOp {
    Intersection,
    Union,
    Difference,
    Xor,
}

impl ClipOp {
    fn rule(self) -> OverlayRule {
        match self {
            ClipOp::Intersection => OverlayRule::Intersect,
            ClipOp::Union => OverlayRule::Union,
            ClipOp::Difference => OverlayRule::Difference,
            ClipOp::Xor => OverlayRule::Xor,
        }
    }
}

/// Boolean operations on [`Polygon`]s.
///
/// Vertices go to the clipper as integer nanometers, the same fixed-point
/// grid [`Point`] uses, so no precision is lost on the way in or out.
/// Holds no engine state between calls; create one wherever it is needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolygonProcessor;

impl PolygonProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Apply `op` between two polygon sets, returning disjoint polygons with
    /// at most one level of holes.
    pub fn clip(&self, subject: &[Polygon], clip: &[Polygon], op: ClipOp) -> Vec<Polygon> {
        let subj = self.to_shapes(subject);
        let clip_shapes = self.to_shapes(clip);
        if subj.is_empty() && op != ClipOp::Union && op != ClipOp::Xor {
            return Vec::new();
        }

        let result =
            Overlay::with_shapes(&subj, &clip_shapes).overlay(op.rule(), FillRule::NonZero);
        let polygons: Vec<Polygon> = result
            .into_iter()
            .filter_map(|shape| self.from_shape(shape))
            .collect();

        debug!(
            "clip {op:?}: {} subject, {} clip shapes -> {} polygons",
            subj.len(),
            clip_shapes.len(),
            polygons.len()
        );
        polygons
    }

    /// Merge overlapping polygons.
    pub fn union(&self, polygons: &[Polygon]) -> Vec<Polygon> {
        self.clip(polygons, &[], ClipOp::Union)
    }

    /// Cut a pad outline (already grown by the relief spacing) with a spoke
    /// cross, yielding the four void quadrants as a container polygon.
    ///
    /// Any island count other than four means the spoke/pad geometry is
    /// malformed and is reported as an error.
    pub fn thermal_relief(&self, outline: &Polygon, cross: &Polygon) -> Result<Polygon, CamError> {
        let legs = self.clip(
            std::slice::from_ref(outline),
            std::slice::from_ref(cross),
            ClipOp::Difference,
        );
        if legs.len() != THERMAL_LEGS {
            return Err(CamError::ThermalRelief {
                islands: legs.len(),
            });
        }
        Ok(Polygon::container(legs))
    }

    fn to_shapes(&self, polygons: &[Polygon]) -> Vec<IntShape> {
        let mut shapes = Vec::new();
        for polygon in polygons {
            self.push_shapes(polygon, &mut shapes);
        }
        shapes
    }

    /// A solid polygon becomes one shape (outer + holes). Islands nested
    /// inside its holes become shapes of their own.
    fn push_shapes(&self, polygon: &Polygon, shapes: &mut Vec<IntShape>) {
        if polygon.points().len() < 3 {
            for child in polygon.holes() {
                self.push_shapes(child, shapes);
            }
            return;
        }

        let mut shape = vec![self.to_contour(polygon.points(), true)];
        for hole in polygon.holes() {
            if hole.points().len() >= 3 {
                shape.push(self.to_contour(hole.points(), false));
            }
            for island in hole.holes() {
                self.push_shapes(island, shapes);
            }
        }
        shapes.push(shape);
    }

    fn to_contour(&self, points: &[Point], counter_clockwise: bool) -> IntContour {
        let ordered = Polygon::new(points.to_vec()).with_orientation(counter_clockwise);
        ordered
            .points()
            .iter()
            .map(|p| IntPoint::new(p.x, p.y))
            .collect()
    }

    fn from_contour(&self, contour: &[IntPoint]) -> Vec<Point> {
        let mut points: Vec<Point> = contour.iter().map(|p| Point::new(p.x, p.y)).collect();
        points.dedup();
        while points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        points
    }

    fn from_shape(&self, shape: IntShape) -> Option<Polygon> {
        let mut contours = shape.iter().map(|c| self.from_contour(c));
        let outer = contours.next().filter(|c| c.len() >= 3)?;
        let holes = contours
            .filter(|c| c.len() >= 3)
            .map(|c| Polygon::new(c).with_orientation(false))
            .collect();
        Some(Polygon::with_holes(outer, holes).with_orientation(true))
    }
}
