//! Minimal-diff RS-274X command writer.

use std::fmt::Write as _;
use std::io::{self, Write};

use log::trace;

use crate::error::CamError;
use crate::geometry::{Angle, Point, Transformation};
use crate::polygon::Polygon;

use super::apertures::{Aperture, Macro};
use super::coord::{CoordinateFormat, NumberTemplate, Units};
use super::state::{
    ArcDirection, EmitterState, InterpolationMode, Mirroring, Polarity, QuadrantMode,
    StateChanges, StateTracker, UNIT_SCALE,
};

/// Hole-tree levels emitted by [`GerberBuilder::draw_polygon`]: solid
/// contours and their voids. Islands inside voids are not drawn.
const MAX_POLYGON_LEVEL: usize = 2;

/// Streams Gerber commands to `W`, writing only what differs from the
/// state already emitted.
pub struct GerberBuilder<W: Write> {
    out: W,
    line: String,
    tracker: StateTracker,
    units: Option<Units>,
    format: CoordinateFormat,
    template: Option<NumberTemplate>,
    transformation: Transformation,
    in_region: bool,
    geometry_emitted: bool,
}

impl<W: Write> GerberBuilder<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            line: String::with_capacity(64),
            tracker: StateTracker::default(),
            units: None,
            format: CoordinateFormat::default(),
            template: None,
            transformation: Transformation::IDENTITY,
            in_region: false,
            geometry_emitted: false,
        }
    }

    pub fn units(&self) -> Option<Units> {
        self.units
    }

    pub fn coordinate_format(&self) -> CoordinateFormat {
        self.format
    }

    pub fn state(&self) -> &EmitterState {
        self.tracker.current()
    }

    pub fn in_region(&self) -> bool {
        self.in_region
    }

    // ---- configuration ----

    pub fn set_units(&mut self, units: Units) -> Result<(), CamError> {
        let code = units.code().ok_or(CamError::UnknownUnits)?;
        if self.units.is_some() {
            return Err(CamError::UnitsAlreadySet);
        }
        if self.geometry_emitted {
            return Err(CamError::UnitsAfterGeometry);
        }
        self.units = Some(units);
        self.template = None;
        self.command(format_args!("%MO{code}*%"))
    }

    pub fn set_coordinate_format(&mut self, precision: u8, decimals: u8) -> Result<(), CamError> {
        let format = CoordinateFormat::new(precision, decimals)?;
        if self.geometry_emitted {
            return Err(CamError::FormatAfterGeometry);
        }
        self.format = format;
        self.template = None;
        self.command(format_args!(
            "%FSLAX{precision:02}{decimals:02}Y{precision:02}{decimals:02}*%"
        ))
    }

    pub fn set_transformation(&mut self, transformation: Transformation) {
        self.transformation = transformation;
    }

    pub fn reset_transformation(&mut self) {
        self.transformation = Transformation::IDENTITY;
    }

    /// Nanometers as a fixed-width coordinate string in the current format.
    pub fn format_number(&mut self, nm: i64) -> Result<String, CamError> {
        self.template()?.format(nm)
    }

    fn template(&mut self) -> Result<NumberTemplate, CamError> {
        if let Some(t) = self.template {
            return Ok(t);
        }
        let units = self.units.ok_or(CamError::UnitsNotSet)?;
        let t = NumberTemplate::new(self.format, units)?;
        self.template = Some(t);
        Ok(t)
    }

    // ---- drawing ----

    pub fn move_to(&mut self, p: Point) -> Result<(), CamError> {
        let (x, y) = self.quantize(p)?;
        let requested = self.tracker.current().clone().with_position(x, y);
        let changes = self.tracker.apply(requested);
        if !changes.position() {
            return Ok(());
        }
        self.write_position(changes)?;
        self.line.push_str("D02*");
        self.flush_line()
    }

    pub fn line_to(&mut self, p: Point) -> Result<(), CamError> {
        self.require_aperture("line_to")?;
        let (x, y) = self.quantize(p)?;
        if self.at(x, y) {
            return Ok(());
        }
        self.set_interpolation_mode(InterpolationMode::Linear)?;
        let requested = self.tracker.current().clone().with_position(x, y);
        let changes = self.tracker.apply(requested);
        self.write_position(changes)?;
        self.line.push_str("D01*");
        self.flush_line()
    }

    /// Circular interpolation from the current position to `end` around
    /// `center`. Ending at the current position writes nothing; with no
    /// current position the offsets are undefined and the call fails.
    pub fn arc_to(
        &mut self,
        end: Point,
        center: Point,
        direction: ArcDirection,
        quadrant: QuadrantMode,
    ) -> Result<(), CamError> {
        self.require_aperture("arc_to")?;
        let (x, y) = self.quantize(end)?;
        if self.at(x, y) {
            return Ok(());
        }
        let (cx, cy) = self.quantize(center)?;
        let state = self.tracker.current();
        let (Some(x0), Some(y0)) = (state.x, state.y) else {
            return Err(CamError::NoCurrentPoint("arc_to"));
        };
        let (mut i, mut j) = (cx - x0, cy - y0);
        if quadrant == QuadrantMode::Single {
            i = i.abs();
            j = j.abs();
        }

        self.set_interpolation_mode(InterpolationMode::Circular(direction, quadrant))?;
        let requested = self.tracker.current().clone().with_position(x, y);
        let changes = self.tracker.apply(requested);
        self.write_position(changes)?;
        let template = self.template()?;
        let i = template.format_raw(i)?;
        let j = template.format_raw(j)?;
        let _ = write!(self.line, "I{i}J{j}D01*");
        self.flush_line()
    }

    /// Stamp the selected aperture at `p`. Always emits a `D03`.
    pub fn flash_at(&mut self, p: Point) -> Result<(), CamError> {
        if self.in_region {
            return Err(CamError::FlashInRegion);
        }
        self.require_aperture("flash_at")?;
        let (x, y) = self.quantize(p)?;
        let requested = self.tracker.current().clone().with_position(x, y);
        let changes = self.tracker.apply(requested);
        self.write_position(changes)?;
        self.line.push_str("D03*");
        self.flush_line()
    }

    /// Writes `G74`/`G75` when the quadrant mode changes, then
    /// `G01`/`G02`/`G03` when the direction changes.
    pub fn set_interpolation_mode(&mut self, mode: InterpolationMode) -> Result<(), CamError> {
        let requested = self.tracker.current().clone().with_interpolation(mode);
        let changes = self.tracker.apply(requested);
        if changes.quadrant {
            if let Some(q) = mode.quadrant() {
                self.command(format_args!("{}*", q.code()))?;
            }
        }
        if changes.direction {
            self.command(format_args!("{}*", mode.direction().code()))?;
        }
        Ok(())
    }

    pub fn begin_region(&mut self) -> Result<(), CamError> {
        if self.in_region {
            return Err(CamError::RegionAlreadyOpen);
        }
        self.in_region = true;
        self.command(format_args!("G36*"))
    }

    pub fn end_region(&mut self) -> Result<(), CamError> {
        if !self.in_region {
            return Err(CamError::RegionNotOpen);
        }
        self.in_region = false;
        self.command(format_args!("G37*"))
    }

    /// Emit `polygon` as filled regions: level 0 contours dark, their holes
    /// clear. Polarity is dark again afterwards.
    pub fn draw_polygon(&mut self, polygon: &Polygon) -> Result<(), CamError> {
        self.draw_polygon_level(polygon, 0)?;
        self.load_polarity(Polarity::Dark)
    }

    fn draw_polygon_level(&mut self, polygon: &Polygon, level: usize) -> Result<(), CamError> {
        if level >= MAX_POLYGON_LEVEL {
            return Ok(());
        }
        if polygon.is_container() {
            for island in polygon.holes() {
                self.draw_polygon_level(island, level)?;
            }
            return Ok(());
        }
        if polygon.points().len() >= 3 {
            let polarity = if level % 2 == 0 {
                Polarity::Dark
            } else {
                Polarity::Clear
            };
            self.load_polarity(polarity)?;
            self.region_contour(polygon.points())?;
        }
        for hole in polygon.holes() {
            self.draw_polygon_level(hole, level + 1)?;
        }
        Ok(())
    }

    fn region_contour(&mut self, points: &[Point]) -> Result<(), CamError> {
        let Some((first, rest)) = points.split_first() else {
            return Ok(());
        };
        self.begin_region()?;
        self.move_to(*first)?;
        for p in rest {
            self.line_to(*p)?;
        }
        self.line_to(*first)?;
        self.end_region()
    }

    // ---- apertures and modal parameters ----

    pub fn define_macro(&mut self, mac: &Macro) -> Result<(), CamError> {
        self.command(format_args!("{}", mac.command()))
    }

    pub fn define_aperture(&mut self, aperture: &Aperture) -> Result<(), CamError> {
        let units = self.units.ok_or(CamError::UnitsNotSet)?;
        let cmd = aperture.command(units)?;
        self.command(format_args!("{cmd}"))
    }

    pub fn select_aperture(&mut self, aperture: &Aperture) -> Result<(), CamError> {
        if self.tracker.set_aperture(aperture.id) {
            self.command(format_args!("D{}*", aperture.id))?;
        }
        Ok(())
    }

    pub fn load_polarity(&mut self, polarity: Polarity) -> Result<(), CamError> {
        if self.tracker.set_aperture_polarity(polarity) {
            self.command(format_args!("%LP{}*%", polarity.code()))?;
        }
        Ok(())
    }

    pub fn load_rotation(&mut self, rotation: Angle) -> Result<(), CamError> {
        if self.tracker.set_aperture_angle(rotation) {
            self.command(format_args!("%LR{rotation}*%"))?;
        }
        Ok(())
    }

    pub fn load_mirroring(&mut self, mirroring: Mirroring) -> Result<(), CamError> {
        if self.tracker.set_mirroring(mirroring) {
            self.command(format_args!("%LM{}*%", mirroring.code()))?;
        }
        Ok(())
    }

    /// `scale` is in parts per million.
    pub fn load_scaling(&mut self, scale: u32) -> Result<(), CamError> {
        if self.tracker.set_scaling(scale) {
            self.command(format_args!("%LS{}*%", format_scale(scale)))?;
        }
        Ok(())
    }

    // ---- attributes and comments ----

    pub fn file_attribute(&mut self, name: &str, values: &[&str]) -> Result<(), CamError> {
        self.attribute("TF", name, values)
    }

    pub fn aperture_attribute(&mut self, name: &str, values: &[&str]) -> Result<(), CamError> {
        self.attribute("TA", name, values)
    }

    pub fn object_attribute(&mut self, name: &str, values: &[&str]) -> Result<(), CamError> {
        self.attribute("TO", name, values)
    }

    /// `%TD*%` clears every aperture and object attribute.
    pub fn delete_attribute(&mut self, name: Option<&str>) -> Result<(), CamError> {
        self.command(format_args!("%TD{}*%", name.unwrap_or("")))
    }

    fn attribute(&mut self, kind: &str, name: &str, values: &[&str]) -> Result<(), CamError> {
        let _ = write!(self.line, "%{kind}{name}");
        for v in values {
            let _ = write!(self.line, ",{v}");
        }
        self.line.push_str("*%");
        self.flush_line()
    }

    pub fn comment(&mut self, text: &str) -> Result<(), CamError> {
        self.command(format_args!("G04 {text}*"))
    }

    /// Write `M02*` and hand back the sink.
    pub fn finish(mut self) -> Result<W, CamError> {
        if self.in_region {
            return Err(CamError::RegionAlreadyOpen);
        }
        self.command(format_args!("M02*"))?;
        self.out.flush()?;
        Ok(self.out)
    }

    // ---- internals ----

    fn require_aperture(&self, op: &'static str) -> Result<(), CamError> {
        if !self.in_region && self.tracker.current().aperture.is_none() {
            return Err(CamError::NoApertureSelected(op));
        }
        Ok(())
    }

    fn quantize(&mut self, p: Point) -> Result<(i64, i64), CamError> {
        let template = self.template()?;
        let p = self.transformation.apply(p);
        Ok((template.quantize(p.x as i64), template.quantize(p.y as i64)))
    }

    fn at(&self, x: i64, y: i64) -> bool {
        let state = self.tracker.current();
        state.x == Some(x) && state.y == Some(y)
    }

    fn write_position(&mut self, changes: StateChanges) -> Result<(), CamError> {
        self.geometry_emitted = true;
        let template = self.template()?;
        let (x, y) = (self.tracker.current().x, self.tracker.current().y);
        if let (true, Some(x)) = (changes.x, x) {
            let x = template.format_raw(x)?;
            let _ = write!(self.line, "X{x}");
        }
        if let (true, Some(y)) = (changes.y, y) {
            let y = template.format_raw(y)?;
            let _ = write!(self.line, "Y{y}");
        }
        Ok(())
    }

    fn command(&mut self, args: std::fmt::Arguments<'_>) -> Result<(), CamError> {
        let _ = self.line.write_fmt(args);
        self.flush_line()
    }

    fn flush_line(&mut self) -> Result<(), CamError> {
        trace!("{}", self.line);
        self.line.push('\n');
        let result = self.out.write_all(self.line.as_bytes());
        self.line.clear();
        result.map_err(CamError::from)
    }
}

fn format_scale(ppm: u32) -> String {
    let whole = ppm / UNIT_SCALE;
    let frac = ppm % UNIT_SCALE;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{frac:06}");
    format!("{whole}.{}", frac.trim_end_matches('0'))
}

impl<W: Write> std::fmt::Debug for GerberBuilder<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GerberBuilder")
            .field("units", &self.units)
            .field("format", &self.format)
            .field("state", self.tracker.current())
            .field("in_region", &self.in_region)
            .finish_non_exhaustive()
    }
}

/// Convenience for tests and in-memory exports.
pub fn into_string(out: Vec<u8>) -> io::Result<String> {
    String::from_utf8(out).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
