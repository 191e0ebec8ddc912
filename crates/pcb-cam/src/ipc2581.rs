//! IPC-2581 encoding of the board model.
//!
//! The document is assembled as an [`XmlNode`] tree and then streamed out
//! with escaping. Only fabrication data is encoded: layer stack, profile,
//! per-layer features and drill hits.

use std::collections::HashMap;
use std::io::{self, Write};

use log::info;

use crate::board::{region_polygons, Board, Element, LayerId, LayerKind, Pad, PadShape};
use crate::error::CamError;
use crate::geometry::{Angle, Point, Size, Transformation};
use crate::gerber::coord::format_decimal;
use crate::gerber::Units;
use crate::polygon::Polygon;
use crate::ExportOptions;

const NAMESPACE: &str = "http://webstds.ipc.org/2581";
const REVISION: &str = "C";

// ─── XML tree ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlNode {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn attr(mut self, key: &str, value: impl Into<String>) -> Self {
        self.attributes.push((key.to_string(), value.into()));
        self
    }

    pub fn child(mut self, child: XmlNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn push(&mut self, child: XmlNode) {
        self.children.push(child);
    }
}

/// Write `root` as a pretty-printed document with an XML declaration.
pub fn write_document<W: Write>(root: &XmlNode, writer: &mut W) -> io::Result<()> {
    writer.write_all(b"<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n")?;
    write_node(root, writer, 0)
}

fn write_node<W: Write>(node: &XmlNode, writer: &mut W, indent_level: usize) -> io::Result<()> {
    write_indent(writer, indent_level)?;
    writer.write_all(b"<")?;
    writer.write_all(node.name.as_bytes())?;
    for (key, value) in &node.attributes {
        writer.write_all(b" ")?;
        writer.write_all(key.as_bytes())?;
        writer.write_all(b"=\"")?;
        write_escaped_attr(writer, value)?;
        writer.write_all(b"\"")?;
    }
    if node.children.is_empty() {
        return writer.write_all(b" />\n");
    }
    writer.write_all(b">\n")?;
    for child in &node.children {
        write_node(child, writer, indent_level + 1)?;
    }
    write_indent(writer, indent_level)?;
    writer.write_all(b"</")?;
    writer.write_all(node.name.as_bytes())?;
    writer.write_all(b">\n")
}

fn write_indent<W: Write>(writer: &mut W, indent_level: usize) -> io::Result<()> {
    for _ in 0..indent_level {
        writer.write_all(b"  ")?;
    }
    Ok(())
}

fn write_escaped_attr<W: Write>(writer: &mut W, input: &str) -> io::Result<()> {
    let mut last = 0;
    for (idx, ch) in input.char_indices() {
        let entity: &[u8] = match ch {
            '&' => b"&amp;",
            '<' => b"&lt;",
            '>' => b"&gt;",
            '"' => b"&quot;",
            '\'' => b"&apos;",
            _ => continue,
        };
        writer.write_all(input[last..idx].as_bytes())?;
        writer.write_all(entity)?;
        last = idx + ch.len_utf8();
    }
    writer.write_all(input[last..].as_bytes())
}

// ─── Dictionaries ────────────────────────────────────────────────────

/// Standard pad primitive, dimensions in nanometers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Primitive {
    Circle { diameter: i32 },
    Rect { size: Size },
    RectRound { size: Size, radius: i32 },
    Oval { size: Size },
    Octagon { size: Size },
}

impl Primitive {
    fn for_pad(pad: &Pad, size: Size) -> Self {
        match pad.shape {
            PadShape::Circle => Primitive::Circle {
                diameter: size.width,
            },
            PadShape::Rectangle => Primitive::Rect { size },
            PadShape::RoundedRect { ratio } => Primitive::RectRound {
                size,
                radius: ratio.apply(size.min_side() / 2),
            },
            PadShape::Obround => Primitive::Oval { size },
            PadShape::Octagon => Primitive::Octagon { size },
        }
    }
}

/// Encoder state: units plus the dictionaries filled while walking layers.
struct Encoder {
    units: Units,
    origin: Transformation,
    primitives: Vec<Primitive>,
    primitive_ids: HashMap<Primitive, usize>,
    line_widths: Vec<i32>,
}

impl Encoder {
    fn new(options: &ExportOptions) -> Result<Self, CamError> {
        options.units.code().ok_or(CamError::UnknownUnits)?;
        Ok(Self {
            units: options.units,
            origin: Transformation::translation(options.origin),
            primitives: Vec::new(),
            primitive_ids: HashMap::new(),
            line_widths: Vec::new(),
        })
    }

    fn units_name(&self) -> &'static str {
        match self.units {
            Units::Inches => "INCH",
            _ => "MILLIMETER",
        }
    }

    fn num(&self, nm: i32) -> Result<String, CamError> {
        format_decimal(nm as i64, self.units)
    }

    fn xy(&self, node: XmlNode, x_key: &str, y_key: &str, p: Point) -> Result<XmlNode, CamError> {
        let p = self.origin.apply(p);
        Ok(node.attr(x_key, self.num(p.x)?).attr(y_key, self.num(p.y)?))
    }

    fn primitive_id(&mut self, primitive: Primitive) -> String {
        let next = self.primitives.len();
        let index = *self.primitive_ids.entry(primitive).or_insert_with(|| next);
        if index == next {
            self.primitives.push(primitive);
        }
        format!("PAD_{}", index + 1)
    }

    fn line_id(&mut self, width: i32) -> String {
        let index = match self.line_widths.iter().position(|w| *w == width) {
            Some(i) => i,
            None => {
                self.line_widths.push(width);
                self.line_widths.len() - 1
            }
        };
        format!("LINE_{}", index + 1)
    }

    fn primitive_node(&self, primitive: Primitive) -> Result<XmlNode, CamError> {
        Ok(match primitive {
            Primitive::Circle { diameter } => {
                XmlNode::new("Circle").attr("diameter", self.num(diameter)?)
            }
            Primitive::Rect { size } => XmlNode::new("RectCenter")
                .attr("width", self.num(size.width)?)
                .attr("height", self.num(size.height)?),
            Primitive::RectRound { size, radius } => XmlNode::new("RectRound")
                .attr("width", self.num(size.width)?)
                .attr("height", self.num(size.height)?)
                .attr("radius", self.num(radius)?),
            Primitive::Oval { size } => XmlNode::new("Oval")
                .attr("width", self.num(size.width)?)
                .attr("height", self.num(size.height)?),
            Primitive::Octagon { size } => {
                // Regular octagon: corner cut is (1 - 1/(1 + sqrt 2)) / 2 of the width.
                let side = size.min_side() as f64 / (1.0 + std::f64::consts::SQRT_2);
                let chamfer = ((size.min_side() as f64 - side) / 2.0).round() as i32;
                XmlNode::new("Octagon")
                    .attr("width", self.num(size.width)?)
                    .attr("height", self.num(size.height)?)
                    .attr("chamfer", self.num(chamfer)?)
            }
        })
    }

    fn dictionaries(&self) -> Result<Vec<XmlNode>, CamError> {
        let mut standard = XmlNode::new("DictionaryStandard").attr("units", self.units_name());
        for (i, primitive) in self.primitives.iter().enumerate() {
            standard.push(
                XmlNode::new("EntryStandard")
                    .attr("id", format!("PAD_{}", i + 1))
                    .child(self.primitive_node(*primitive)?),
            );
        }

        let mut lines = XmlNode::new("DictionaryLineDesc").attr("units", self.units_name());
        for (i, width) in self.line_widths.iter().enumerate() {
            lines.push(
                XmlNode::new("EntryLineDesc")
                    .attr("id", format!("LINE_{}", i + 1))
                    .child(
                        XmlNode::new("LineDesc")
                            .attr("lineWidth", self.num(*width)?)
                            .attr("lineEnd", "ROUND"),
                    ),
            );
        }

        let fills = XmlNode::new("DictionaryFillDesc")
            .attr("units", self.units_name())
            .child(
                XmlNode::new("EntryFillDesc")
                    .attr("id", "FILL_SOLID")
                    .child(XmlNode::new("FillDesc").attr("fillProperty", "FILL")),
            );
        Ok(vec![standard, lines, fills])
    }

    // ─── Features ────────────────────────────────────────────────────

    fn polygon_node(&self, name: &str, points: &[Point]) -> Result<XmlNode, CamError> {
        let mut node = XmlNode::new(name);
        let Some((first, rest)) = points.split_first() else {
            return Ok(node);
        };
        node.push(self.xy(XmlNode::new("PolyBegin"), "x", "y", *first)?);
        for p in rest.iter().chain(std::iter::once(first)) {
            node.push(self.xy(XmlNode::new("PolyStepSegment"), "x", "y", *p)?);
        }
        Ok(node)
    }

    fn contour(&self, polygon: &Polygon) -> Result<XmlNode, CamError> {
        let mut contour = XmlNode::new("Contour");
        contour.push(self.polygon_node("Polygon", polygon.points())?);
        for hole in polygon.holes() {
            contour.push(self.polygon_node("Cutout", hole.points())?);
        }
        Ok(contour)
    }

    fn pad(
        &mut self,
        position: Point,
        rotation: Angle,
        primitive: Primitive,
    ) -> Result<XmlNode, CamError> {
        let mut pad = XmlNode::new("Pad");
        if !rotation.is_zero() {
            pad.push(XmlNode::new("Xform").attr("rotation", rotation.to_string()));
        }
        pad.push(self.xy(XmlNode::new("Location"), "x", "y", position)?);
        pad.push(XmlNode::new("StandardPrimitiveRef").attr("id", self.primitive_id(primitive)));
        Ok(pad)
    }

    fn features(&self, feature: XmlNode) -> XmlNode {
        XmlNode::new("Features").child(feature)
    }

    /// `Set` nodes for one element on `layer`.
    fn element_sets(
        &mut self,
        board: &Board,
        element: &Element,
        layer: LayerId,
    ) -> Result<Vec<XmlNode>, CamError> {
        if element.is_degenerate(layer) {
            return Ok(Vec::new());
        }
        let mut set = XmlNode::new("Set");
        if let Some(net) = element.net() {
            set = set.attr("net", net);
        }
        match element {
            Element::Pad(pad) => {
                let size = pad.size_on(layer);
                let node = self.pad(pad.position, pad.rotation, Primitive::for_pad(pad, size))?;
                Ok(vec![set.child(node)])
            }
            Element::Via(via) => {
                let primitive = Primitive::Circle {
                    diameter: via.diameter,
                };
                let node = self.pad(via.position, Angle::ZERO, primitive)?;
                Ok(vec![set.attr("padUsage", "VIA").child(node)])
            }
            Element::Track(track) => {
                let mut line = XmlNode::new("Line");
                line = self.xy(line, "startX", "startY", track.start)?;
                line = self.xy(line, "endX", "endY", track.end)?;
                let line_ref = XmlNode::new("LineDescRef").attr("id", self.line_id(track.width));
                let line = line.child(line_ref);
                Ok(vec![set.child(self.features(line))])
            }
            Element::ArcTrack(arc) => {
                let mut node = XmlNode::new("Arc");
                node = self.xy(node, "startX", "startY", arc.start())?;
                node = self.xy(node, "endX", "endY", arc.end())?;
                node = self.xy(node, "centerX", "centerY", arc.center)?;
                let node = node
                    .attr("clockwise", if arc.sweep < 0 { "true" } else { "false" })
                    .child(XmlNode::new("LineDescRef").attr("id", self.line_id(arc.width)));
                Ok(vec![set.child(self.features(node))])
            }
            Element::Region(region) => {
                let mut sets = Vec::new();
                for polygon in region_polygons(board, region, layer)? {
                    let contour = self
                        .contour(&polygon)?
                        .child(XmlNode::new("FillDescRef").attr("id", "FILL_SOLID"));
                    sets.push(set.clone().child(self.features(contour)));
                }
                Ok(sets)
            }
            Element::Hole(_) => Ok(Vec::new()),
        }
    }

    fn layer_feature(&mut self, board: &Board, layer: LayerId) -> Result<XmlNode, CamError> {
        let mut node = XmlNode::new("LayerFeature").attr("layerRef", layer.name());
        for element in board.elements_on(layer) {
            for set in self.element_sets(board, element, layer)? {
                node.push(set);
            }
        }
        if layer.kind() == LayerKind::Outline && board.outline.len() >= 3 {
            let contour = self.contour(&Polygon::new(board.outline.clone()))?;
            node.push(XmlNode::new("Set").child(self.features(contour)));
        }
        Ok(node)
    }

    fn drill_feature(&self, board: &Board, plated: bool) -> Result<Option<XmlNode>, CamError> {
        let name = drill_layer_name(plated);
        let mut node = XmlNode::new("LayerFeature").attr("layerRef", name);
        for (i, element) in board
            .drills()
            .filter(|e| e.is_plated() == plated)
            .enumerate()
        {
            let (Some(diameter), Some(position)) = (element.drill(), element.position()) else {
                continue;
            };
            let hole = XmlNode::new("Hole")
                .attr("name", format!("H{}", i + 1))
                .attr("diameter", self.num(diameter)?)
                .attr("platingStatus", if plated { "PLATED" } else { "NONPLATED" })
                .attr("plusTol", "0")
                .attr("minusTol", "0");
            let hole = self.xy(hole, "x", "y", position)?;
            let mut set = XmlNode::new("Set");
            if let Some(net) = element.net() {
                set = set.attr("net", net);
            }
            node.push(set.child(hole));
        }
        Ok((!node.children.is_empty()).then_some(node))
    }
}

fn drill_layer_name(plated: bool) -> &'static str {
    if plated {
        "drill_plated"
    } else {
        "drill_non_plated"
    }
}

fn layer_function(layer: LayerId) -> &'static str {
    match layer.kind() {
        LayerKind::Copper => "SIGNAL",
        LayerKind::SolderMask => "SOLDERMASK",
        LayerKind::Paste => "SOLDERPASTE",
        LayerKind::Silkscreen => "SILKSCREEN",
        LayerKind::Outline => "BOARD_OUTLINE",
    }
}

fn layer_side(layer: LayerId) -> &'static str {
    match (layer.side(), layer.kind()) {
        (Some(crate::board::Side::Top), _) => "TOP",
        (Some(crate::board::Side::Bottom), _) => "BOTTOM",
        (None, LayerKind::Copper) => "INTERNAL",
        (None, _) => "ALL",
    }
}

/// Build the IPC-2581 document for `layers` of `board`.
pub fn encode(
    board: &Board,
    layers: &[LayerId],
    options: &ExportOptions,
) -> Result<XmlNode, CamError> {
    let mut encoder = Encoder::new(options)?;
    let step_name = if board.name.is_empty() { "board" } else { board.name.as_str() };

    let mut layer_features = Vec::new();
    for layer in layers {
        layer_features.push(encoder.layer_feature(board, *layer)?);
    }
    let mut drill_layers = Vec::new();
    for plated in [true, false] {
        if let Some(node) = encoder.drill_feature(board, plated)? {
            drill_layers.push(drill_layer_name(plated));
            layer_features.push(node);
        }
    }

    let mut content = XmlNode::new("Content")
        .attr("roleRef", "Owner")
        .child(XmlNode::new("FunctionMode").attr("mode", "FABRICATION"))
        .child(XmlNode::new("StepRef").attr("name", step_name));
    for layer in layers {
        content.push(XmlNode::new("LayerRef").attr("name", layer.name()));
    }
    for name in &drill_layers {
        content.push(XmlNode::new("LayerRef").attr("name", *name));
    }
    for dictionary in encoder.dictionaries()? {
        content.push(dictionary);
    }

    let mut cad_data = XmlNode::new("CadData");
    for layer in layers {
        cad_data.push(
            XmlNode::new("Layer")
                .attr("name", layer.name())
                .attr("layerFunction", layer_function(*layer))
                .attr("side", layer_side(*layer))
                .attr("polarity", "POSITIVE"),
        );
    }
    for name in &drill_layers {
        cad_data.push(
            XmlNode::new("Layer")
                .attr("name", *name)
                .attr("layerFunction", "DRILL")
                .attr("side", "ALL")
                .attr("polarity", "POSITIVE"),
        );
    }

    let mut step = XmlNode::new("Step").attr("name", step_name);
    if board.outline.len() >= 3 {
        step.push(XmlNode::new("Profile").child(encoder.polygon_node("Polygon", &board.outline)?));
    }
    for feature in layer_features {
        step.push(feature);
    }
    cad_data.push(step);

    let ecad = XmlNode::new("Ecad")
        .attr("name", step_name)
        .child(XmlNode::new("CadHeader").attr("units", encoder.units_name()))
        .child(cad_data);

    info!(
        "IPC-2581: {} layers, {} pad primitives, {} line widths",
        layers.len() + drill_layers.len(),
        encoder.primitives.len(),
        encoder.line_widths.len()
    );

    Ok(XmlNode::new("IPC-2581")
        .attr("revision", REVISION)
        .attr("xmlns", NAMESPACE)
        .child(content)
        .child(ecad))
}

pub fn write_ipc2581<W: Write>(
    board: &Board,
    layers: &[LayerId],
    options: &ExportOptions,
    mut out: W,
) -> Result<W, CamError> {
    let root = encode(board, layers, options)?;
    write_document(&root, &mut out)?;
    out.flush()?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{ArcTrack, Hole, PadMount, Region, Side, ThermalSettings, Track, Via};
    use crate::geometry::Ratio;

    fn pad(position: Point, shape: PadShape, size: Size) -> Pad {
        Pad {
            position,
            size,
            shape,
            mount: PadMount::Smd { side: Side::Top },
            rotation: Angle::ZERO,
            mask_expansion: 0,
            paste_reduction: Ratio::ZERO,
            net: Some("GND".into()),
            thermal: true,
        }
    }

    fn board() -> Board {
        let mut rotated = pad(
            Point::new(3_000_000, 0),
            PadShape::Rectangle,
            Size::new(2_000_000, 1_000_000),
        );
        rotated.rotation = Angle::DEG_90;
        rotated.net = Some("A&B".into());
        Board {
            name: "R&D <test>".into(),
            outline: vec![
                Point::new(-10_000_000, -10_000_000),
                Point::new(10_000_000, -10_000_000),
                Point::new(10_000_000, 10_000_000),
                Point::new(-10_000_000, 10_000_000),
            ],
            layers: vec![LayerId::TopCopper, LayerId::BottomCopper, LayerId::Outline],
            elements: vec![
                Element::Pad(pad(Point::ORIGIN, PadShape::Circle, Size::square(1_500_000))),
                Element::Pad(pad(
                    Point::new(0, 3_000_000),
                    PadShape::Circle,
                    Size::square(1_500_000),
                )),
                Element::Pad(rotated),
                Element::Via(Via {
                    position: Point::new(-3_000_000, 0),
                    diameter: 600_000,
                    drill: 300_000,
                    net: None,
                    tented: true,
                }),
                Element::Track(Track {
                    layer: LayerId::TopCopper,
                    start: Point::new(-5_000_000, -5_000_000),
                    end: Point::new(5_000_000, -5_000_000),
                    width: 250_000,
                    net: None,
                }),
                Element::ArcTrack(ArcTrack {
                    layer: LayerId::BottomCopper,
                    center: Point::ORIGIN,
                    radius: 6_000_000,
                    start_angle: Angle::ZERO,
                    sweep: -9_000,
                    width: 250_000,
                    net: None,
                }),
                Element::Region(Region {
                    layer: LayerId::BottomCopper,
                    outline: vec![
                        Point::new(-8_000_000, -8_000_000),
                        Point::new(8_000_000, -8_000_000),
                        Point::new(8_000_000, 8_000_000),
                        Point::new(-8_000_000, 8_000_000),
                    ],
                    net: Some("GND".into()),
                    clearance: 200_000,
                    thermal: ThermalSettings::default(),
                }),
                Element::Hole(Hole {
                    position: Point::new(9_000_000, 9_000_000),
                    diameter: 2_000_000,
                }),
            ],
        }
    }

    fn render() -> String {
        let b = board();
        let out = write_ipc2581(&b, &b.layers, &ExportOptions::default(), Vec::new()).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn elements<'a, 'input>(
        doc: &'a roxmltree::Document<'input>,
        name: &str,
    ) -> Vec<roxmltree::Node<'a, 'input>> {
        doc.descendants().filter(|n| n.has_tag_name(name)).collect()
    }

    #[test]
    fn test_document_parses() {
        let xml = render();
        let doc = roxmltree::Document::parse(&xml).unwrap();
        let root = doc.root_element();
        assert_eq!(root.tag_name().name(), "IPC-2581");
        assert_eq!(root.tag_name().namespace(), Some(NAMESPACE));
        assert_eq!(root.attribute("revision"), Some("C"));
        let step = elements(&doc, "Step");
        assert_eq!(step[0].attribute("name"), Some("R&D <test>"));
    }

    #[test]
    fn test_dictionaries_are_deduplicated() {
        let xml = render();
        let doc = roxmltree::Document::parse(&xml).unwrap();
        // Round pad, rectangle, via circle.
        assert_eq!(elements(&doc, "EntryStandard").len(), 3);
        assert_eq!(elements(&doc, "EntryLineDesc").len(), 1);
        let circle = elements(&doc, "Circle");
        assert_eq!(circle[0].attribute("diameter"), Some("1.5"));
        let line = elements(&doc, "LineDesc");
        assert_eq!(line[0].attribute("lineWidth"), Some("0.25"));
        assert_eq!(elements(&doc, "EntryFillDesc").len(), 1);
    }

    #[test]
    fn test_layer_features() {
        let xml = render();
        let doc = roxmltree::Document::parse(&xml).unwrap();
        let features = elements(&doc, "LayerFeature");
        let refs: Vec<_> = features.iter().filter_map(|n| n.attribute("layerRef")).collect();
        assert_eq!(
            refs,
            ["top_copper", "bottom_copper", "outline", "drill_plated", "drill_non_plated"]
        );

        let top = features[0];
        let pads = top.descendants().filter(|n| n.has_tag_name("Pad")).count();
        assert_eq!(pads, 4);
        assert_eq!(top.descendants().filter(|n| n.has_tag_name("Line")).count(), 1);
        let xform = top.descendants().find(|n| n.has_tag_name("Xform")).unwrap();
        assert_eq!(xform.attribute("rotation"), Some("90"));
        let escaped = top
            .descendants()
            .find(|n| n.attribute("net") == Some("A&B"));
        assert!(escaped.is_some());

        let bottom = features[1];
        let arc = bottom.descendants().find(|n| n.has_tag_name("Arc")).unwrap();
        assert_eq!(arc.attribute("clockwise"), Some("true"));
        assert_eq!(arc.attribute("startX"), Some("6"));
        assert_eq!(arc.attribute("endY"), Some("-6"));
        let contour = bottom.descendants().find(|n| n.has_tag_name("Contour")).unwrap();
        // Via and arc clearances; the GND pads are on the top side.
        let cutouts = contour.children().filter(|n| n.has_tag_name("Cutout")).count();
        assert_eq!(cutouts, 2);
    }

    #[test]
    fn test_drill_layers() {
        let xml = render();
        let doc = roxmltree::Document::parse(&xml).unwrap();
        let holes = elements(&doc, "Hole");
        assert_eq!(holes.len(), 2);
        assert_eq!(holes[0].attribute("platingStatus"), Some("PLATED"));
        assert_eq!(holes[0].attribute("diameter"), Some("0.3"));
        assert_eq!(holes[1].attribute("platingStatus"), Some("NONPLATED"));
        let layers = elements(&doc, "Layer");
        assert_eq!(layers.len(), 5);
        assert_eq!(layers[2].attribute("layerFunction"), Some("BOARD_OUTLINE"));
        assert_eq!(layers[3].attribute("layerFunction"), Some("DRILL"));
    }

    #[test]
    fn test_profile_polygon_is_closed() {
        let xml = render();
        let doc = roxmltree::Document::parse(&xml).unwrap();
        let profile = elements(&doc, "Profile")[0];
        let polygon = profile.first_element_child().unwrap();
        let steps: Vec<_> = polygon.children().filter(|n| n.is_element()).collect();
        assert_eq!(steps.len(), 5);
        assert!(steps[0].has_tag_name("PolyBegin"));
        assert_eq!(steps[4].attribute("x"), steps[0].attribute("x"));
    }

    #[test]
    fn test_inch_units() {
        let b = board();
        let options = ExportOptions {
            units: Units::Inches,
            ..ExportOptions::default()
        };
        let root = encode(&b, &[LayerId::TopCopper], &options).unwrap();
        let header = &root.children[1].children[0];
        assert_eq!(header.attributes[0], ("units".to_string(), "INCH".to_string()));
    }

    #[test]
    fn test_unknown_units_rejected() {
        let options = ExportOptions {
            units: Units::Unknown,
            ..ExportOptions::default()
        };
        assert!(matches!(
            encode(&board(), &[], &options),
            Err(CamError::UnknownUnits)
        ));
    }

    #[test]
    fn test_attribute_escaping() {
        let mut buf = Vec::new();
        write_escaped_attr(&mut buf, "a<b>&\"c'").unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "a&lt;b&gt;&amp;&quot;c&apos;");
    }
}
