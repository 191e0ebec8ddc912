use thiserror::Error;

#[derive(Error, Debug)]
pub enum CamError {
    #[error("units must be millimeters or inches")]
    UnknownUnits,

    #[error("units directive already written")]
    UnitsAlreadySet,

    #[error("units must be set before emitting geometry")]
    UnitsNotSet,

    #[error("units directive must precede geometry")]
    UnitsAfterGeometry,

    #[error("coordinate format {precision}.{decimals} out of range")]
    FormatOutOfRange { precision: u8, decimals: u8 },

    #[error("coordinate format must precede geometry")]
    FormatAfterGeometry,

    #[error("coordinate {value} does not fit in {precision} digits")]
    CoordinateOutOfRange { value: i64, precision: u8 },

    #[error("region already open (G36 without G37)")]
    RegionAlreadyOpen,

    #[error("no region open (G37 without G36)")]
    RegionNotOpen,

    #[error("{0} requires a selected aperture")]
    NoApertureSelected(&'static str),

    #[error("{0} requires a current point")]
    NoCurrentPoint(&'static str),

    #[error("apertures cannot be flashed inside a region")]
    FlashInRegion,

    #[error("invalid shape: {0}")]
    InvalidShape(String),

    #[error("thermal relief produced {islands} islands, expected 4")]
    ThermalRelief { islands: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),
}
