pub mod board;
pub mod error;
pub mod excellon;
pub mod geometry;
pub mod gerber;
pub mod ipc2581;
pub mod polygon;

use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use board::{Board, LayerId};
use error::CamError;
use geometry::Point;
use gerber::{CoordinateFormat, Units};

/// Export settings. Every field has a default, so a config file only
/// needs the fields it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    pub units: Units,
    /// Total digits per coordinate.
    pub precision: u8,
    /// Digits after the implied decimal point.
    pub decimals: u8,
    /// Added to every coordinate on output.
    pub origin: Point,
    /// Layers to plot; `None` plots every layer the board lists.
    pub layers: Option<Vec<LayerId>>,
    /// Stroke width of the board profile on the outline layer.
    pub outline_width: i32,
    pub ipc2581: bool,
    pub zip: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        let format = CoordinateFormat::default();
        Self {
            units: Units::Millimeters,
            precision: format.precision,
            decimals: format.decimals,
            origin: Point::ORIGIN,
            layers: None,
            outline_width: 100_000,
            ipc2581: false,
            zip: false,
        }
    }
}

impl ExportOptions {
    pub fn from_json(json: &str) -> Result<Self, CamError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, CamError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn layers_for(&self, board: &Board) -> Vec<LayerId> {
        self.layers.clone().unwrap_or_else(|| board.layers.clone())
    }
}

/// A generated file, not yet written anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub name: String,
    pub contents: Vec<u8>,
}

fn base_name(board: &Board) -> String {
    let cleaned: String = board
        .name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "board".into()
    } else {
        cleaned
    }
}

/// Plot one Gerber layer into memory.
pub fn export_layer(
    board: &Board,
    layer: LayerId,
    options: &ExportOptions,
) -> Result<OutputFile, CamError> {
    let contents = gerber::plot_layer(board, layer, options, Vec::new())?;
    Ok(OutputFile {
        name: format!("{}-{}.{}", base_name(board), layer.name(), layer.extension()),
        contents,
    })
}

/// Every output for `board`: one Gerber file per layer, drill files for
/// plated and non-plated holes that exist, and the IPC-2581 document when
/// enabled. Fails on the first error.
pub fn export_board(board: &Board, options: &ExportOptions) -> Result<Vec<OutputFile>, CamError> {
    CoordinateFormat::new(options.precision, options.decimals)?;
    options.units.code().ok_or(CamError::UnknownUnits)?;

    let base = base_name(board);
    let layers = options.layers_for(board);
    let mut files = Vec::with_capacity(layers.len() + 3);

    for layer in &layers {
        files.push(export_layer(board, *layer, options)?);
    }

    for (plated, suffix) in [(true, "plated"), (false, "npth")] {
        if excellon::collect_tools(board, plated).is_empty() {
            continue;
        }
        files.push(OutputFile {
            name: format!("{base}-{suffix}.drl"),
            contents: excellon::write_drill(board, plated, options, Vec::new())?,
        });
    }

    if options.ipc2581 {
        files.push(OutputFile {
            name: format!("{base}.xml"),
            contents: ipc2581::write_ipc2581(board, &layers, options, Vec::new())?,
        });
    }

    info!("exported {} files for {}", files.len(), base);
    Ok(files)
}

/// Pack `files` into one zip archive.
pub fn write_zip<W: Write + Seek>(files: &[OutputFile], out: W) -> Result<W, CamError> {
    let mut zip = zip::ZipWriter::new(out);
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);
    for file in files {
        zip.start_file(file.name.as_str(), options)?;
        zip.write_all(&file.contents)?;
    }
    Ok(zip.finish()?)
}

/// Pack `files` into a zip archive at `path`. The buffered tail is flushed
/// explicitly so a failed final write is reported.
pub fn write_zip_file(files: &[OutputFile], path: &Path) -> Result<(), CamError> {
    let out = BufWriter::new(std::fs::File::create(path)?);
    write_zip(files, out)?.flush()?;
    Ok(())
}

/// Write `files` into `dir`, creating it if needed.
pub fn write_files(files: &[OutputFile], dir: &Path) -> Result<(), CamError> {
    std::fs::create_dir_all(dir)?;
    for file in files {
        std::fs::write(dir.join(&file.name), &file.contents)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Element, Hole, Pad, PadMount, PadShape, Region, Side, ThermalSettings};
    use crate::geometry::{Angle, Ratio, Size};
    use std::io::{Cursor, Read};

    fn board() -> Board {
        Board {
            name: "demo board".into(),
            outline: vec![
                Point::new(0, 0),
                Point::new(20_000_000, 0),
                Point::new(20_000_000, 10_000_000),
                Point::new(0, 10_000_000),
            ],
            layers: vec![LayerId::TopCopper, LayerId::TopSolderMask, LayerId::Outline],
            elements: vec![
                Element::Pad(Pad {
                    position: Point::new(5_000_000, 5_000_000),
                    size: Size::square(1_500_000),
                    shape: PadShape::Circle,
                    mount: PadMount::Smd { side: Side::Top },
                    rotation: Angle::ZERO,
                    mask_expansion: 50_000,
                    paste_reduction: Ratio::ZERO,
                    net: None,
                    thermal: true,
                }),
                Element::Hole(Hole {
                    position: Point::new(1_000_000, 1_000_000),
                    diameter: 3_000_000,
                }),
            ],
        }
    }

    #[test]
    fn test_options_defaults_and_partial_json() {
        let json = r#"{"units": "in", "decimals": 5, "ipc2581": true}"#;
        let options = ExportOptions::from_json(json).unwrap();
        assert_eq!(options.units, Units::Inches);
        assert_eq!(options.precision, 6);
        assert_eq!(options.decimals, 5);
        assert!(options.ipc2581);
        assert!(!options.zip);
        assert_eq!(options.outline_width, 100_000);

        let json = r#"{"layers": ["outline"], "origin": [1, 2]}"#;
        let layers = ExportOptions::from_json(json).unwrap();
        assert_eq!(layers.layers_for(&board()), vec![LayerId::Outline]);
        assert_eq!(layers.origin, Point::new(1, 2));
    }

    #[test]
    fn test_export_board_file_set() {
        let files = export_board(&board(), &ExportOptions::default()).unwrap();
        let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "demo_board-top_copper.gtl",
                "demo_board-top_solder_mask.gts",
                "demo_board-outline.gko",
                "demo_board-npth.drl",
            ]
        );
        let copper = String::from_utf8(files[0].contents.clone()).unwrap();
        assert!(copper.ends_with("X050000Y050000D03*\nM02*\n"));
    }

    #[test]
    fn test_export_board_with_ipc2581() {
        let options = ExportOptions {
            ipc2581: true,
            layers: Some(vec![LayerId::TopCopper]),
            ..ExportOptions::default()
        };
        let files = export_board(&board(), &options).unwrap();
        assert_eq!(files.len(), 3);
        assert_eq!(files[2].name, "demo_board.xml");
        let xml = String::from_utf8(files[2].contents.clone()).unwrap();
        assert!(roxmltree::Document::parse(&xml).is_ok());
    }

    #[test]
    fn test_export_rejects_bad_format() {
        let options = ExportOptions {
            precision: 12,
            ..ExportOptions::default()
        };
        assert!(matches!(
            export_board(&board(), &options),
            Err(CamError::FormatOutOfRange { precision: 12, .. })
        ));
    }

    #[test]
    fn test_write_zip_round_trip() {
        let files = export_board(&board(), &ExportOptions::default()).unwrap();
        let cursor = write_zip(&files, Cursor::new(Vec::new())).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(cursor.into_inner())).unwrap();
        assert_eq!(archive.len(), files.len());
        let mut gko = String::new();
        archive
            .by_name("demo_board-outline.gko")
            .unwrap()
            .read_to_string(&mut gko)
            .unwrap();
        assert!(gko.contains("%TF.FileFunction,Profile,NP*%"));
    }

    #[test]
    fn test_export_fails_on_thermal_spoke_wider_than_pad() {
        let mut b = board();
        if let Element::Pad(pad) = &mut b.elements[0] {
            pad.net = Some("GND".into());
        }
        b.elements.push(Element::Region(Region {
            layer: LayerId::TopCopper,
            outline: b.outline.clone(),
            net: Some("GND".into()),
            clearance: 200_000,
            thermal: ThermalSettings {
                spoke_width: 3_000_000,
                spacing: 250_000,
            },
        }));
        assert!(matches!(
            export_board(&b, &ExportOptions::default()),
            Err(CamError::ThermalRelief { .. })
        ));
    }

    #[test]
    fn test_write_zip_file_is_complete() {
        let files = export_board(&board(), &ExportOptions::default()).unwrap();
        let path = std::env::temp_dir().join(format!("pcb-cam-{}.zip", std::process::id()));
        write_zip_file(&files, &path).unwrap();
        let archive = zip::ZipArchive::new(std::fs::File::open(&path).unwrap()).unwrap();
        assert_eq!(archive.len(), files.len());
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_empty_name_falls_back() {
        let mut b = board();
        b.name.clear();
        let file = export_layer(&b, LayerId::TopCopper, &ExportOptions::default()).unwrap();
        assert_eq!(file.name, "board-top_copper.gtl");
    }
}
