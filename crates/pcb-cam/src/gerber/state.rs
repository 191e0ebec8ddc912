//! Modal plotter state and change detection.
//!
//! The emitter never compares fields ad hoc. It builds the state it wants
//! as a new [`EmitterState`] snapshot, diffs it against the snapshot of
//! what was already written, and writes exactly the tokens whose
//! [`StateChanges`] flag is set.

use crate::geometry::Angle;

/// Layer polarity from %LP command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Polarity {
    #[default]
    Dark,
    Clear,
}

impl Polarity {
    pub fn code(self) -> &'static str {
        match self {
            Polarity::Dark => "D",
            Polarity::Clear => "C",
        }
    }

    pub fn inverted(self) -> Self {
        match self {
            Polarity::Dark => Polarity::Clear,
            Polarity::Clear => Polarity::Dark,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuadrantMode {
    Single,
    Multi,
}

impl QuadrantMode {
    pub fn code(self) -> &'static str {
        match self {
            QuadrantMode::Single => "G74",
            QuadrantMode::Multi => "G75",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArcDirection {
    Clockwise,
    CounterClockwise,
}

/// The base G01/G02/G03 directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Linear,
    Clockwise,
    CounterClockwise,
}

impl Direction {
    pub fn code(self) -> &'static str {
        match self {
            Direction::Linear => "G01",
            Direction::Clockwise => "G02",
            Direction::CounterClockwise => "G03",
        }
    }
}

/// Requested interpolation: a direction plus, for arcs, a quadrant mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpolationMode {
    Linear,
    Circular(ArcDirection, QuadrantMode),
}

impl InterpolationMode {
    pub fn direction(self) -> Direction {
        match self {
            InterpolationMode::Linear => Direction::Linear,
            InterpolationMode::Circular(ArcDirection::Clockwise, _) => Direction::Clockwise,
            InterpolationMode::Circular(ArcDirection::CounterClockwise, _) => {
                Direction::CounterClockwise
            }
        }
    }

    pub fn quadrant(self) -> Option<QuadrantMode> {
        match self {
            InterpolationMode::Linear => None,
            InterpolationMode::Circular(_, q) => Some(q),
        }
    }
}

/// Image mirroring from the %LM command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mirroring {
    #[default]
    None,
    X,
    Y,
    XY,
}

impl Mirroring {
    pub fn code(self) -> &'static str {
        match self {
            Mirroring::None => "N",
            Mirroring::X => "X",
            Mirroring::Y => "Y",
            Mirroring::XY => "XY",
        }
    }
}

/// Aperture scale factor in parts per million.
pub const UNIT_SCALE: u32 = 1_000_000;

/// Snapshot of everything already emitted that later commands depend on.
///
/// Position fields are in quantized format steps. `None` means the value
/// has never been written, so the first request always counts as a change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitterState {
    pub x: Option<i64>,
    pub y: Option<i64>,
    pub aperture: Option<u32>,
    pub direction: Option<Direction>,
    pub quadrant: Option<QuadrantMode>,
    pub polarity: Polarity,
    pub rotation: Angle,
    pub mirroring: Mirroring,
    pub scaling: u32,
}

impl Default for EmitterState {
    fn default() -> Self {
        Self {
            x: None,
            y: None,
            aperture: None,
            direction: None,
            quadrant: None,
            polarity: Polarity::Dark,
            rotation: Angle::ZERO,
            mirroring: Mirroring::None,
            scaling: UNIT_SCALE,
        }
    }
}

/// Which fields differ between two snapshots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateChanges {
    pub x: bool,
    pub y: bool,
    pub aperture: bool,
    pub direction: bool,
    pub quadrant: bool,
    pub polarity: bool,
    pub rotation: bool,
    pub mirroring: bool,
    pub scaling: bool,
}

impl StateChanges {
    pub fn position(&self) -> bool {
        self.x || self.y
    }

    pub fn any(&self) -> bool {
        self.position()
            || self.aperture
            || self.direction
            || self.quadrant
            || self.polarity
            || self.rotation
            || self.mirroring
            || self.scaling
    }
}

impl EmitterState {
    pub fn with_position(self, x: i64, y: i64) -> Self {
        self.with_x(x).with_y(y)
    }

    pub fn with_x(self, x: i64) -> Self {
        Self { x: Some(x), ..self }
    }

    pub fn with_y(self, y: i64) -> Self {
        Self { y: Some(y), ..self }
    }

    pub fn with_aperture(self, id: u32) -> Self {
        Self {
            aperture: Some(id),
            ..self
        }
    }

    /// Linear mode leaves the arc quadrant mode untouched.
    pub fn with_interpolation(self, mode: InterpolationMode) -> Self {
        Self {
            direction: Some(mode.direction()),
            quadrant: mode.quadrant().or(self.quadrant),
            ..self
        }
    }

    pub fn with_polarity(self, polarity: Polarity) -> Self {
        Self { polarity, ..self }
    }

    pub fn with_rotation(self, rotation: Angle) -> Self {
        Self { rotation, ..self }
    }

    pub fn with_mirroring(self, mirroring: Mirroring) -> Self {
        Self { mirroring, ..self }
    }

    pub fn with_scaling(self, scaling: u32) -> Self {
        Self { scaling, ..self }
    }

    pub fn diff(&self, requested: &EmitterState) -> StateChanges {
        StateChanges {
            x: self.x != requested.x,
            y: self.y != requested.y,
            aperture: self.aperture != requested.aperture,
            direction: self.direction != requested.direction,
            quadrant: self.quadrant != requested.quadrant,
            polarity: self.polarity != requested.polarity,
            rotation: self.rotation != requested.rotation,
            mirroring: self.mirroring != requested.mirroring,
            scaling: self.scaling != requested.scaling,
        }
    }
}

/// Owns the current snapshot and replaces it on every request.
#[derive(Debug, Clone, Default)]
pub struct StateTracker {
    current: EmitterState,
}

impl StateTracker {
    pub fn current(&self) -> &EmitterState {
        &self.current
    }

    /// Diff `requested` against the current snapshot and adopt it.
    pub fn apply(&mut self, requested: EmitterState) -> StateChanges {
        let changes = self.current.diff(&requested);
        self.current = requested;
        changes
    }

    fn request(&self) -> EmitterState {
        self.current.clone()
    }

    pub fn set_x(&mut self, x: i64) -> bool {
        let next = self.request().with_x(x);
        self.apply(next).x
    }

    pub fn set_y(&mut self, y: i64) -> bool {
        let next = self.request().with_y(y);
        self.apply(next).y
    }

    pub fn set_aperture(&mut self, id: u32) -> bool {
        let next = self.request().with_aperture(id);
        self.apply(next).aperture
    }

    pub fn set_aperture_angle(&mut self, rotation: Angle) -> bool {
        let next = self.request().with_rotation(rotation);
        self.apply(next).rotation
    }

    pub fn set_aperture_polarity(&mut self, polarity: Polarity) -> bool {
        let next = self.request().with_polarity(polarity);
        self.apply(next).polarity
    }

    /// True when the G01/G02/G03 directive changed. The quadrant change is
    /// reported separately by [`StateTracker::apply`].
    pub fn set_interpolation_mode(&mut self, mode: InterpolationMode) -> bool {
        let next = self.request().with_interpolation(mode);
        self.apply(next).direction
    }

    pub fn set_mirroring(&mut self, mirroring: Mirroring) -> bool {
        let next = self.request().with_mirroring(mirroring);
        self.apply(next).mirroring
    }

    pub fn set_scaling(&mut self, scaling: u32) -> bool {
        let next = self.request().with_scaling(scaling);
        self.apply(next).scaling
    }
}
