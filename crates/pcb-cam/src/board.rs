//! Resolved board model consumed by every output encoder.
//!
//! Boards arrive as JSON. Coordinates are integer nanometers, angles
//! hundredths of a degree. Nothing here mutates a board after loading.

use std::path::Path;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::CamError;
use crate::geometry::{Angle, Point, Ratio, Size};
use crate::polygon::builder;
use crate::polygon::clip::{ClipOp, PolygonProcessor};
use crate::polygon::Polygon;

// ─── Layers ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Bottom,
}

impl Side {
    pub fn copper(self) -> LayerId {
        match self {
            Side::Top => LayerId::TopCopper,
            Side::Bottom => LayerId::BottomCopper,
        }
    }

    pub fn solder_mask(self) -> LayerId {
        match self {
            Side::Top => LayerId::TopSolderMask,
            Side::Bottom => LayerId::BottomSolderMask,
        }
    }

    pub fn paste(self) -> LayerId {
        match self {
            Side::Top => LayerId::TopPaste,
            Side::Bottom => LayerId::BottomPaste,
        }
    }
}

/// An output layer of the board stackup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerId {
    TopCopper,
    BottomCopper,
    /// Inner copper layer, numbered from 1 below the top.
    InnerCopper(u8),
    TopSolderMask,
    BottomSolderMask,
    TopPaste,
    BottomPaste,
    TopSilkscreen,
    BottomSilkscreen,
    Outline,
}

/// What a layer carries, independent of side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Copper,
    SolderMask,
    Paste,
    Silkscreen,
    Outline,
}

impl LayerId {
    pub fn kind(self) -> LayerKind {
        match self {
            LayerId::TopCopper | LayerId::BottomCopper | LayerId::InnerCopper(_) => {
                LayerKind::Copper
            }
            LayerId::TopSolderMask | LayerId::BottomSolderMask => LayerKind::SolderMask,
            LayerId::TopPaste | LayerId::BottomPaste => LayerKind::Paste,
            LayerId::TopSilkscreen | LayerId::BottomSilkscreen => LayerKind::Silkscreen,
            LayerId::Outline => LayerKind::Outline,
        }
    }

    pub fn is_copper(self) -> bool {
        self.kind() == LayerKind::Copper
    }

    /// `None` for inner copper and the outline.
    pub fn side(self) -> Option<Side> {
        match self {
            LayerId::TopCopper
            | LayerId::TopSolderMask
            | LayerId::TopPaste
            | LayerId::TopSilkscreen => Some(Side::Top),
            LayerId::BottomCopper
            | LayerId::BottomSolderMask
            | LayerId::BottomPaste
            | LayerId::BottomSilkscreen => Some(Side::Bottom),
            LayerId::InnerCopper(_) | LayerId::Outline => None,
        }
    }

    /// Stable name used in output file names and IPC-2581 layer refs.
    pub fn name(self) -> String {
        match self {
            LayerId::TopCopper => "top_copper".into(),
            LayerId::BottomCopper => "bottom_copper".into(),
            LayerId::InnerCopper(n) => format!("inner_copper_{n}"),
            LayerId::TopSolderMask => "top_solder_mask".into(),
            LayerId::BottomSolderMask => "bottom_solder_mask".into(),
            LayerId::TopPaste => "top_paste".into(),
            LayerId::BottomPaste => "bottom_paste".into(),
            LayerId::TopSilkscreen => "top_silkscreen".into(),
            LayerId::BottomSilkscreen => "bottom_silkscreen".into(),
            LayerId::Outline => "outline".into(),
        }
    }

    /// Protel-style Gerber file extension.
    pub fn extension(self) -> String {
        match self {
            LayerId::TopCopper => "gtl".into(),
            LayerId::BottomCopper => "gbl".into(),
            LayerId::InnerCopper(n) => format!("g{n}"),
            LayerId::TopSolderMask => "gts".into(),
            LayerId::BottomSolderMask => "gbs".into(),
            LayerId::TopPaste => "gtp".into(),
            LayerId::BottomPaste => "gbp".into(),
            LayerId::TopSilkscreen => "gto".into(),
            LayerId::BottomSilkscreen => "gbo".into(),
            LayerId::Outline => "gko".into(),
        }
    }
}

// ─── Elements ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum PadShape {
    Circle,
    Rectangle,
    RoundedRect {
        /// Corner radius as a fraction of half the short side.
        ratio: Ratio,
    },
    Obround,
    Octagon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mount", rename_all = "snake_case")]
pub enum PadMount {
    Smd { side: Side },
    ThroughHole { drill: i32 },
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pad {
    pub position: Point,
    pub size: Size,
    #[serde(flatten)]
    pub shape: PadShape,
    #[serde(flatten)]
    pub mount: PadMount,
    #[serde(default)]
    pub rotation: Angle,
    /// Grows the solder mask opening on every edge.
    #[serde(default)]
    pub mask_expansion: i32,
    /// Shrinks the paste stencil opening by this fraction of each dimension.
    #[serde(default)]
    pub paste_reduction: Ratio,
    #[serde(default)]
    pub net: Option<String>,
    /// Connect to same-net pours through thermal spokes.
    #[serde(default = "default_true")]
    pub thermal: bool,
}

impl Pad {
    pub fn is_through_hole(&self) -> bool {
        matches!(self.mount, PadMount::ThroughHole { .. })
    }

    pub fn on_layer(&self, layer: LayerId) -> bool {
        match (self.mount, layer.kind()) {
            (PadMount::ThroughHole { .. }, LayerKind::Copper | LayerKind::SolderMask) => true,
            (PadMount::ThroughHole { .. }, _) => false,
            (PadMount::Smd { side }, LayerKind::Copper) => layer == side.copper(),
            (PadMount::Smd { side }, LayerKind::SolderMask) => layer == side.solder_mask(),
            (PadMount::Smd { side }, LayerKind::Paste) => layer == side.paste(),
            (PadMount::Smd { .. }, _) => false,
        }
    }

    /// Pad size as it appears on `layer`.
    pub fn size_on(&self, layer: LayerId) -> Size {
        match layer.kind() {
            LayerKind::SolderMask => self.size.inflate(self.mask_expansion),
            LayerKind::Paste => Size::new(
                self.size.width - self.paste_reduction.apply(self.size.width),
                self.size.height - self.paste_reduction.apply(self.size.height),
            ),
            _ => self.size,
        }
    }

    /// Pad outline of `size` at the pad position and rotation.
    pub fn shape_polygon(&self, size: Size) -> Result<Polygon, CamError> {
        let (center, rotation) = (self.position, self.rotation);
        Ok(match self.shape {
            PadShape::Circle => builder::circle(center, size.width / 2),
            PadShape::Rectangle => builder::rectangle(center, size, rotation),
            PadShape::RoundedRect { ratio } => {
                builder::rounded_rect_ratio(center, size, ratio, rotation)
            }
            PadShape::Obround => builder::obround(center, size, rotation),
            PadShape::Octagon => builder::regular_polygon(
                center,
                octagon_diameter(size.min_side()),
                8,
                rotation + OCTAGON_OFFSET,
            )?,
        })
    }
}

/// Vertex offset that puts an octagon's flats on the axes.
pub const OCTAGON_OFFSET: Angle = Angle::new(2_250);

/// Circumscribed diameter of an octagon measuring `flat` across its flats.
pub fn octagon_diameter(flat: i32) -> i32 {
    (flat as f64 / (std::f64::consts::PI / 8.0).cos()).round() as i32
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Via {
    pub position: Point,
    pub diameter: i32,
    pub drill: i32,
    #[serde(default)]
    pub net: Option<String>,
    /// Tented vias are covered by solder mask.
    #[serde(default)]
    pub tented: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub layer: LayerId,
    pub start: Point,
    pub end: Point,
    pub width: i32,
    #[serde(default)]
    pub net: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArcTrack {
    pub layer: LayerId,
    pub center: Point,
    pub radius: i32,
    pub start_angle: Angle,
    /// Signed sweep in hundredths of a degree, positive counter-clockwise.
    pub sweep: i32,
    pub width: i32,
    #[serde(default)]
    pub net: Option<String>,
}

impl Track {
    pub fn is_degenerate(&self) -> bool {
        self.width <= 0
    }
}

impl ArcTrack {
    /// No copper: zero width or zero sweep.
    pub fn is_degenerate(&self) -> bool {
        self.width <= 0 || self.sweep == 0
    }

    pub fn point_at(&self, angle: Angle) -> Point {
        let (sin, cos) = angle.sin_cos();
        let r = self.radius as f64;
        Point::from_f64(
            self.center.x as f64 + r * cos,
            self.center.y as f64 + r * sin,
        )
    }

    pub fn start(&self) -> Point {
        self.point_at(self.start_angle)
    }

    pub fn end(&self) -> Point {
        self.point_at(self.start_angle + Angle::new(self.sweep))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThermalSettings {
    pub spoke_width: i32,
    /// Gap between the pad edge and the surrounding pour.
    pub spacing: i32,
}

impl Default for ThermalSettings {
    fn default() -> Self {
        Self {
            spoke_width: 300_000,
            spacing: 250_000,
        }
    }
}

/// Copper pour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub layer: LayerId,
    pub outline: Vec<Point>,
    #[serde(default)]
    pub net: Option<String>,
    /// Distance kept from foreign-net copper.
    #[serde(default)]
    pub clearance: i32,
    #[serde(default)]
    pub thermal: ThermalSettings,
}

/// Non-plated hole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hole {
    pub position: Point,
    pub diameter: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Element {
    Pad(Pad),
    Via(Via),
    Track(Track),
    ArcTrack(ArcTrack),
    Region(Region),
    Hole(Hole),
}

impl Element {
    pub fn net(&self) -> Option<&str> {
        match self {
            Element::Pad(p) => p.net.as_deref(),
            Element::Via(v) => v.net.as_deref(),
            Element::Track(t) => t.net.as_deref(),
            Element::ArcTrack(a) => a.net.as_deref(),
            Element::Region(r) => r.net.as_deref(),
            Element::Hole(_) => None,
        }
    }

    pub fn on_layer(&self, layer: LayerId) -> bool {
        match self {
            Element::Pad(p) => p.on_layer(layer),
            Element::Via(v) => match layer.kind() {
                LayerKind::Copper => true,
                LayerKind::SolderMask => !v.tented,
                _ => false,
            },
            Element::Track(t) => t.layer == layer,
            Element::ArcTrack(a) => a.layer == layer,
            Element::Region(r) => r.layer == layer,
            Element::Hole(_) => false,
        }
    }

    /// True when the element is on `layer` but leaves nothing there. Every
    /// encoder skips such elements.
    pub fn is_degenerate(&self, layer: LayerId) -> bool {
        match self {
            Element::Pad(p) => p.size_on(layer).min_side() <= 0,
            Element::Track(t) => t.is_degenerate(),
            Element::ArcTrack(a) => a.is_degenerate(),
            Element::Via(v) => v.diameter <= 0,
            Element::Region(r) => r.outline.len() < 3,
            Element::Hole(h) => h.diameter <= 0,
        }
    }

    /// Shape this element leaves on `layer`, `None` when it is not there.
    pub fn polygon(&self, layer: LayerId) -> Result<Option<Polygon>, CamError> {
        if !self.on_layer(layer) || self.is_degenerate(layer) {
            return Ok(None);
        }
        self.grown_polygon(layer, 0).map(Some)
    }

    /// Copper shape on `layer` grown by `spacing`, used to cut clearances
    /// and thermal reliefs into pours. Pours themselves have no outline.
    pub fn outline_polygon(
        &self,
        layer: LayerId,
        spacing: i32,
    ) -> Result<Option<Polygon>, CamError> {
        if !self.on_layer(layer) || self.is_degenerate(layer) {
            return Ok(None);
        }
        if matches!(self, Element::Region(_)) {
            return Ok(None);
        }
        self.grown_polygon(layer, spacing).map(Some)
    }

    fn grown_polygon(&self, layer: LayerId, spacing: i32) -> Result<Polygon, CamError> {
        Ok(match self {
            Element::Pad(p) => p.shape_polygon(p.size_on(layer).inflate(spacing))?,
            Element::Via(v) => builder::circle(v.position, v.diameter / 2 + spacing),
            Element::Track(t) => builder::line(t.start, t.end, t.width + 2 * spacing),
            Element::ArcTrack(a) => builder::arc_line(
                a.center,
                a.radius,
                a.start_angle,
                a.sweep,
                a.width + 2 * spacing,
            )?,
            Element::Region(r) => Polygon::new(r.outline.clone()).with_orientation(true),
            Element::Hole(h) => builder::circle(h.position, h.diameter / 2 + spacing),
        })
    }

    /// Drill diameter for plated and non-plated holes.
    pub fn drill(&self) -> Option<i32> {
        match self {
            Element::Pad(Pad {
                mount: PadMount::ThroughHole { drill },
                ..
            }) => Some(*drill),
            Element::Via(v) => Some(v.drill),
            Element::Hole(h) => Some(h.diameter),
            _ => None,
        }
    }

    pub fn is_plated(&self) -> bool {
        !matches!(self, Element::Hole(_))
    }

    pub fn position(&self) -> Option<Point> {
        match self {
            Element::Pad(p) => Some(p.position),
            Element::Via(v) => Some(v.position),
            Element::Hole(h) => Some(h.position),
            _ => None,
        }
    }

    pub fn drill_polygon(&self) -> Option<Polygon> {
        let diameter = self.drill()?;
        let position = self.position()?;
        Some(builder::circle(position, diameter / 2))
    }
}

// ─── Board ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Board {
    #[serde(default)]
    pub name: String,
    /// Closed board profile.
    #[serde(default)]
    pub outline: Vec<Point>,
    pub layers: Vec<LayerId>,
    #[serde(default)]
    pub elements: Vec<Element>,
}

impl Board {
    pub fn from_json(json: &str) -> Result<Self, CamError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, CamError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    pub fn copper_layer_count(&self) -> u8 {
        self.layers.iter().filter(|l| l.is_copper()).count() as u8
    }

    pub fn elements_on(&self, layer: LayerId) -> impl Iterator<Item = &Element> {
        self.elements.iter().filter(move |e| e.on_layer(layer))
    }

    pub fn drills(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter().filter(|e| e.drill().is_some())
    }
}

fn same_net(a: Option<&str>, b: Option<&str>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a == b)
}

/// Copper left by `region` on `layer` after subtracting clearances around
/// foreign-net copper and thermal reliefs around same-net pads.
pub fn region_polygons(
    board: &Board,
    region: &Region,
    layer: LayerId,
) -> Result<Vec<Polygon>, CamError> {
    if region.outline.len() < 3 {
        warn!("region on {} has fewer than 3 vertices, skipped", layer.name());
        return Ok(Vec::new());
    }
    let processor = PolygonProcessor::new();
    let subject = Polygon::new(region.outline.clone()).with_orientation(true);
    let net = region.net.as_deref();
    let mut cuts = Vec::new();

    for element in &board.elements {
        if element.is_degenerate(layer) {
            continue;
        }
        match element {
            Element::Region(_) => continue,
            Element::Hole(h) => {
                cuts.push(builder::circle(h.position, h.diameter / 2 + region.clearance));
                continue;
            }
            _ => {}
        }
        if !element.on_layer(layer) {
            continue;
        }
        if !same_net(net, element.net()) {
            if let Some(outline) = element.outline_polygon(layer, region.clearance)? {
                cuts.push(outline);
            }
            continue;
        }
        if let Element::Pad(pad) = element {
            if pad.thermal {
                cuts.push(thermal_legs(&processor, pad, layer, region.thermal)?);
            }
        }
    }

    debug!(
        "region on {}: {} cutouts from {} elements",
        layer.name(),
        cuts.len(),
        board.elements.len()
    );
    Ok(processor.clip(&[subject], &cuts, ClipOp::Difference))
}

fn thermal_legs(
    processor: &PolygonProcessor,
    pad: &Pad,
    layer: LayerId,
    settings: ThermalSettings,
) -> Result<Polygon, CamError> {
    let size = pad.size_on(layer);
    let outline = pad.shape_polygon(size.inflate(settings.spacing))?;
    let cross = builder::thermal_cross(
        pad.position,
        size,
        settings.spoke_width,
        settings.spacing,
        pad.rotation,
    );
    processor.thermal_relief(&outline, &cross)
}
