//! Gerber X2 file attributes.

use crate::board::{LayerId, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopperSide {
    Top,
    Inner,
    Bottom,
}

impl CopperSide {
    fn code(self) -> &'static str {
        match self {
            CopperSide::Top => "Top",
            CopperSide::Inner => "Inr",
            CopperSide::Bottom => "Bot",
        }
    }
}

fn side_code(side: Side) -> &'static str {
    match side {
        Side::Top => "Top",
        Side::Bottom => "Bot",
    }
}

/// Value of the `.FileFunction` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileFunction {
    Copper { layer_num: u32, side: CopperSide },
    Legend { side: Side },
    SolderMask { side: Side },
    Paste { side: Side },
    Profile,
}

impl FileFunction {
    /// File function of `layer` in a stackup with `copper_layers` copper
    /// layers. Copper is numbered from L1 at the top.
    pub fn for_layer(layer: LayerId, copper_layers: u8) -> Self {
        match layer {
            LayerId::TopCopper => FileFunction::Copper {
                layer_num: 1,
                side: CopperSide::Top,
            },
            LayerId::InnerCopper(n) => FileFunction::Copper {
                layer_num: n as u32 + 1,
                side: CopperSide::Inner,
            },
            LayerId::BottomCopper => FileFunction::Copper {
                layer_num: (copper_layers as u32).max(2),
                side: CopperSide::Bottom,
            },
            LayerId::TopSolderMask => FileFunction::SolderMask { side: Side::Top },
            LayerId::BottomSolderMask => FileFunction::SolderMask { side: Side::Bottom },
            LayerId::TopPaste => FileFunction::Paste { side: Side::Top },
            LayerId::BottomPaste => FileFunction::Paste { side: Side::Bottom },
            LayerId::TopSilkscreen => FileFunction::Legend { side: Side::Top },
            LayerId::BottomSilkscreen => FileFunction::Legend { side: Side::Bottom },
            LayerId::Outline => FileFunction::Profile,
        }
    }

    /// Comma-separated fields following `%TF.FileFunction`.
    pub fn values(&self) -> Vec<String> {
        match self {
            FileFunction::Copper { layer_num, side } => {
                vec!["Copper".into(), format!("L{layer_num}"), side.code().into()]
            }
            FileFunction::Legend { side } => vec!["Legend".into(), side_code(*side).into()],
            FileFunction::SolderMask { side } => {
                vec!["Soldermask".into(), side_code(*side).into()]
            }
            FileFunction::Paste { side } => vec!["Paste".into(), side_code(*side).into()],
            FileFunction::Profile => vec!["Profile".into(), "NP".into()],
        }
    }
}

/// Fields of `%TF.GenerationSoftware`: vendor, application, version.
pub fn generation_software() -> [&'static str; 3] {
    ["pcb-cam", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")]
}
