//! Board-to-Gerber layer traversal.

use std::io::Write;

use log::{info, warn};

use crate::board::{
    octagon_diameter, region_polygons, ArcTrack, Board, Element, LayerId, LayerKind, Pad,
    PadShape, OCTAGON_OFFSET,
};
use crate::error::CamError;
use crate::geometry::{Angle, Point, Size, Transformation};
use crate::polygon::Polygon;
use crate::ExportOptions;

use super::apertures::{ApertureShape, ApertureTable};
use super::attributes::{generation_software, FileFunction};
use super::builder::GerberBuilder;
use super::state::{ArcDirection, QuadrantMode};

/// One drawable item, with its aperture already interned.
#[derive(Debug)]
enum Feature {
    Pour(Polygon),
    Stroke {
        aperture: u32,
        points: Vec<Point>,
    },
    Arc {
        aperture: u32,
        start: Point,
        ends: Vec<Point>,
        center: Point,
        direction: ArcDirection,
    },
    Flash {
        aperture: u32,
        position: Point,
        rotation: Angle,
    },
}

impl Feature {
    /// Pours go down first so strokes and flashes land on top of them.
    fn pass(&self) -> u8 {
        match self {
            Feature::Pour(_) => 0,
            Feature::Stroke { .. } | Feature::Arc { .. } => 1,
            Feature::Flash { .. } => 2,
        }
    }
}

/// Aperture for a pad of `size`, plus the `%LR` rotation to flash it with.
fn pad_aperture(pad: &Pad, size: Size) -> (ApertureShape, Angle) {
    match pad.shape {
        PadShape::Circle => (
            ApertureShape::Circle {
                diameter: size.width,
            },
            Angle::ZERO,
        ),
        PadShape::Rectangle => (ApertureShape::Rectangle { size }, pad.rotation),
        PadShape::RoundedRect { ratio } => {
            let radius = ratio.apply(size.min_side() / 2);
            if radius == 0 {
                return (ApertureShape::Rectangle { size }, pad.rotation);
            }
            (
                ApertureShape::RoundRect {
                    size,
                    radius,
                    rotation: pad.rotation,
                },
                Angle::ZERO,
            )
        }
        PadShape::Obround => {
            if size.is_square() {
                (
                    ApertureShape::Circle {
                        diameter: size.width,
                    },
                    Angle::ZERO,
                )
            } else {
                (ApertureShape::Obround { size }, pad.rotation)
            }
        }
        PadShape::Octagon => (
            ApertureShape::Polygon {
                diameter: octagon_diameter(size.min_side()),
                vertices: 8,
                rotation: OCTAGON_OFFSET + pad.rotation,
            },
            Angle::ZERO,
        ),
    }
}

fn arc_feature(table: &mut ApertureTable, arc: &ArcTrack) -> Feature {
    let aperture = table.intern(ApertureShape::Circle {
        diameter: arc.width,
    });
    let direction = if arc.sweep > 0 {
        ArcDirection::CounterClockwise
    } else {
        ArcDirection::Clockwise
    };
    // A sweep over half a turn goes through its midpoint so full circles
    // never start and end on the same coordinate.
    let mut ends = Vec::with_capacity(2);
    if arc.sweep.abs() > 18_000 {
        ends.push(arc.point_at(arc.start_angle + Angle::new(arc.sweep / 2)));
    }
    ends.push(arc.end());
    Feature::Arc {
        aperture,
        start: arc.start(),
        ends,
        center: arc.center,
        direction,
    }
}

/// Collect the features of `layer` and intern every aperture they use.
fn collect(
    board: &Board,
    layer: LayerId,
    options: &ExportOptions,
    table: &mut ApertureTable,
) -> Result<Vec<Feature>, CamError> {
    let mut features = Vec::new();

    for element in board.elements_on(layer) {
        match element {
            Element::Region(region) => {
                for polygon in region_polygons(board, region, layer)? {
                    features.push(Feature::Pour(polygon));
                }
            }
            Element::Track(track) => {
                if track.is_degenerate() {
                    warn!("track with width {} on {} skipped", track.width, layer.name());
                    continue;
                }
                let aperture = table.intern(ApertureShape::Circle {
                    diameter: track.width,
                });
                if track.start == track.end {
                    features.push(Feature::Flash {
                        aperture,
                        position: track.start,
                        rotation: Angle::ZERO,
                    });
                } else {
                    features.push(Feature::Stroke {
                        aperture,
                        points: vec![track.start, track.end],
                    });
                }
            }
            Element::ArcTrack(arc) => {
                if arc.is_degenerate() {
                    warn!("degenerate arc on {} skipped", layer.name());
                    continue;
                }
                features.push(arc_feature(table, arc));
            }
            Element::Pad(pad) => {
                let size = pad.size_on(layer);
                if size.min_side() <= 0 {
                    warn!("pad at {:?} has no extent on {}", pad.position, layer.name());
                    continue;
                }
                let (shape, rotation) = pad_aperture(pad, size);
                features.push(Feature::Flash {
                    aperture: table.intern(shape),
                    position: pad.position,
                    rotation,
                });
            }
            Element::Via(via) => {
                features.push(Feature::Flash {
                    aperture: table.intern(ApertureShape::Circle {
                        diameter: via.diameter,
                    }),
                    position: via.position,
                    rotation: Angle::ZERO,
                });
            }
            Element::Hole(_) => {}
        }
    }

    if layer.kind() == LayerKind::Outline && board.outline.len() >= 2 {
        let aperture = table.intern(ApertureShape::Circle {
            diameter: options.outline_width,
        });
        let mut points = board.outline.clone();
        points.push(board.outline[0]);
        features.push(Feature::Stroke { aperture, points });
    }

    features.sort_by_key(Feature::pass);
    Ok(features)
}

/// Write the Gerber file for one layer of `board` to `out`.
pub fn plot_layer<W: Write>(
    board: &Board,
    layer: LayerId,
    options: &ExportOptions,
    out: W,
) -> Result<W, CamError> {
    let mut table = ApertureTable::default();
    let features = collect(board, layer, options, &mut table)?;
    info!(
        "plotting {}: {} features, {} apertures",
        layer.name(),
        features.len(),
        table.len()
    );

    let mut g = GerberBuilder::new(out);
    g.comment(&format!("{} {}", board.name, layer.name()).trim().replace('*', "_"))?;
    g.file_attribute(".GenerationSoftware", &generation_software())?;
    let function = FileFunction::for_layer(layer, board.copper_layer_count()).values();
    let function: Vec<&str> = function.iter().map(String::as_str).collect();
    g.file_attribute(".FileFunction", &function)?;
    g.file_attribute(".FilePolarity", &["Positive"])?;
    g.set_coordinate_format(options.precision, options.decimals)?;
    g.set_units(options.units)?;
    g.set_transformation(Transformation::translation(options.origin));

    for mac in table.macros() {
        g.define_macro(mac)?;
    }
    for aperture in table.apertures() {
        g.define_aperture(aperture)?;
    }

    for feature in &features {
        match feature {
            Feature::Pour(polygon) => g.draw_polygon(polygon)?,
            Feature::Stroke { aperture, points } => {
                select(&mut g, &table, *aperture)?;
                g.load_rotation(Angle::ZERO)?;
                if let Some((first, rest)) = points.split_first() {
                    g.move_to(*first)?;
                    for p in rest {
                        g.line_to(*p)?;
                    }
                }
            }
            Feature::Arc {
                aperture,
                start,
                ends,
                center,
                direction,
            } => {
                select(&mut g, &table, *aperture)?;
                g.load_rotation(Angle::ZERO)?;
                g.move_to(*start)?;
                for end in ends {
                    g.arc_to(*end, *center, *direction, QuadrantMode::Multi)?;
                }
            }
            Feature::Flash {
                aperture,
                position,
                rotation,
            } => {
                select(&mut g, &table, *aperture)?;
                g.load_rotation(*rotation)?;
                g.flash_at(*position)?;
            }
        }
    }

    g.finish()
}

fn select<W: Write>(
    g: &mut GerberBuilder<W>,
    table: &ApertureTable,
    id: u32,
) -> Result<(), CamError> {
    let aperture = table
        .get(id)
        .ok_or_else(|| CamError::InvalidShape(format!("aperture D{id} is not defined")))?;
    g.select_aperture(aperture)
}
