//! Gerber RS-274X output.

pub mod apertures;
pub mod attributes;
pub mod builder;
pub mod coord;
pub mod plot;
pub mod state;

pub use apertures::{Aperture, ApertureShape, ApertureTable, Macro, MacroParam};
pub use builder::GerberBuilder;
pub use coord::{CoordinateFormat, NumberTemplate, Units};
pub use plot::plot_layer;
pub use state::{
    ArcDirection, EmitterState, InterpolationMode, Mirroring, Polarity, QuadrantMode,
    StateChanges, StateTracker,
};
