use std::collections::BTreeMap;
use std::io::Write;

use log::info;

use crate::board::Board;
use crate::error::CamError;
use crate::geometry::{div_round, Point, Transformation};
use crate::gerber::Units;
use crate::ExportOptions;

/// One drill size and every hit made with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tool {
    pub number: u32,
    pub diameter: i32,
    pub hits: Vec<Point>,
}

/// Group the plated (or non-plated) holes of `board` into tools numbered
/// from 1 in order of increasing diameter.
pub fn collect_tools(board: &Board, plated: bool) -> Vec<Tool> {
    let mut by_diameter: BTreeMap<i32, Vec<Point>> = BTreeMap::new();
    for element in board.drills() {
        if element.is_plated() != plated {
            continue;
        }
        if let (Some(diameter), Some(position)) = (element.drill(), element.position()) {
            by_diameter.entry(diameter).or_default().push(position);
        }
    }
    by_diameter
        .into_iter()
        .enumerate()
        .map(|(i, (diameter, hits))| Tool {
            number: i as u32 + 1,
            diameter,
            hits,
        })
        .collect()
}

/// Decimal digits written for each unit system.
fn decimals(units: Units) -> Result<u32, CamError> {
    match units {
        Units::Millimeters => Ok(3),
        Units::Inches => Ok(4),
        Units::Unknown => Err(CamError::UnknownUnits),
    }
}

/// Fixed decimal with an explicit point, e.g. `14.478`.
fn fixed(nm: i64, units: Units) -> Result<String, CamError> {
    let places = decimals(units)?;
    let per_unit = units.nm_per_unit().ok_or(CamError::UnknownUnits)? as i128;
    let scale = 10i128.pow(places);
    let steps = div_round(nm as i128 * scale, per_unit);
    let sign = if steps < 0 { "-" } else { "" };
    let steps = steps.abs();
    Ok(format!(
        "{sign}{}.{:0width$}",
        steps / scale,
        steps % scale,
        width = places as usize
    ))
}

/// Write an Excellon drill file for the plated or non-plated holes.
pub fn write_drill<W: Write>(
    board: &Board,
    plated: bool,
    options: &ExportOptions,
    mut out: W,
) -> Result<W, CamError> {
    let units = options.units;
    let tools = collect_tools(board, plated);
    let origin = Transformation::translation(options.origin);
    info!(
        "drill file ({}): {} tools, {} hits",
        if plated { "plated" } else { "non-plated" },
        tools.len(),
        tools.iter().map(|t| t.hits.len()).sum::<usize>()
    );

    writeln!(out, "M48")?;
    writeln!(
        out,
        "; DRILL file {} {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    )?;
    writeln!(out, "; {}", if plated { "PLATED" } else { "NON_PLATED" })?;
    match units {
        Units::Millimeters => writeln!(out, "METRIC,TZ,000.000")?,
        Units::Inches => writeln!(out, "INCH,TZ,00.0000")?,
        Units::Unknown => return Err(CamError::UnknownUnits),
    }
    for tool in &tools {
        writeln!(out, "T{:02}C{}", tool.number, fixed(tool.diameter as i64, units)?)?;
    }
    writeln!(out, "%")?;
    writeln!(out, "G90")?;
    writeln!(out, "G05")?;
    for tool in &tools {
        writeln!(out, "T{:02}", tool.number)?;
        for hit in &tool.hits {
            let p = origin.apply(*hit);
            writeln!(out, "X{}Y{}", fixed(p.x as i64, units)?, fixed(p.y as i64, units)?)?;
        }
    }
    writeln!(out, "M30")?;
    out.flush()?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Element, Hole, LayerId, Pad, PadMount, PadShape, Via};
    use crate::geometry::{Angle, Ratio, Size};

    fn board() -> Board {
        let th = Pad {
            position: Point::new(14_478_000, 10_541_000),
            size: Size::square(1_500_000),
            shape: PadShape::Circle,
            mount: PadMount::ThroughHole { drill: 800_000 },
            rotation: Angle::ZERO,
            mask_expansion: 0,
            paste_reduction: Ratio::ZERO,
            net: None,
            thermal: true,
        };
        Board {
            name: "drill".into(),
            layers: vec![LayerId::TopCopper, LayerId::BottomCopper],
            elements: vec![
                Element::Pad(th),
                Element::Via(Via {
                    position: Point::new(1_000_000, -2_000_000),
                    diameter: 600_000,
                    drill: 300_000,
                    net: None,
                    tented: true,
                }),
                Element::Via(Via {
                    position: Point::new(2_000_000, 0),
                    diameter: 600_000,
                    drill: 300_000,
                    net: None,
                    tented: true,
                }),
                Element::Hole(Hole {
                    position: Point::new(5_000_000, 5_000_000),
                    diameter: 3_200_000,
                }),
            ],
            ..Board::default()
        }
    }

    fn write(plated: bool, options: &ExportOptions) -> String {
        String::from_utf8(write_drill(&board(), plated, options, Vec::new()).unwrap()).unwrap()
    }

    #[test]
    fn test_tools_sorted_by_diameter() {
        let tools = collect_tools(&board(), true);
        assert_eq!(tools.len(), 2);
        assert_eq!((tools[0].number, tools[0].diameter), (1, 300_000));
        assert_eq!(tools[0].hits.len(), 2);
        assert_eq!((tools[1].number, tools[1].diameter), (2, 800_000));
    }

    #[test]
    fn test_plated_metric_file() {
        let out = write(true, &ExportOptions::default());
        assert!(out.starts_with("M48\n"));
        assert!(out.contains("METRIC,TZ,000.000\nT01C0.300\nT02C0.800\n%\nG90\nG05\n"));
        assert!(out.contains("T01\nX1.000Y-2.000\nX2.000Y0.000\nT02\nX14.478Y10.541\nM30\n"));
        assert!(!out.contains("C3.200"));
    }

    #[test]
    fn test_non_plated_inch_file() {
        let options = ExportOptions {
            units: Units::Inches,
            ..ExportOptions::default()
        };
        let out = write(false, &options);
        assert!(out.contains("INCH,TZ,00.0000\nT01C0.1260\n"));
        assert!(out.contains("T01\nX0.1969Y0.1969\nM30"));
    }

    #[test]
    fn test_unknown_units_rejected() {
        let options = ExportOptions {
            units: Units::Unknown,
            ..ExportOptions::default()
        };
        assert!(matches!(
            write_drill(&board(), true, &options, Vec::new()),
            Err(CamError::UnknownUnits)
        ));
    }

    #[test]
    fn test_fixed_rounding() {
        assert_eq!(fixed(1_234_500, Units::Millimeters).unwrap(), "1.235");
        assert_eq!(fixed(-500, Units::Millimeters).unwrap(), "-0.001");
        assert_eq!(fixed(25_400_000, Units::Inches).unwrap(), "1.0000");
    }
}
