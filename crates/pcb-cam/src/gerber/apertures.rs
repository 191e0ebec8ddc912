use std::collections::HashMap;
use std::fmt::Write;

use log::debug;

use crate::error::CamError;
use crate::geometry::{Angle, Size};

use super::coord::{format_decimal, Units};

/// Name of the built-in rounded rectangle macro.
pub const ROUND_RECT_MACRO: &str = "RoundRect";

/// A single parameter passed to a macro aperture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MacroParam {
    Length(i32),
    Angle(Angle),
    Count(u32),
}

impl MacroParam {
    fn render(&self, units: Units) -> Result<String, CamError> {
        match self {
            MacroParam::Length(nm) => format_decimal(*nm as i64, units),
            MacroParam::Angle(a) => Ok(a.to_string()),
            MacroParam::Count(n) => Ok(n.to_string()),
        }
    }
}

/// Aperture shape template for an %AD command.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ApertureShape {
    Circle {
        diameter: i32,
    },
    Rectangle {
        size: Size,
    },
    Obround {
        size: Size,
    },
    Polygon {
        diameter: i32,
        vertices: u32,
        rotation: Angle,
    },
    /// Flashed through the built-in [`ROUND_RECT_MACRO`].
    RoundRect {
        size: Size,
        radius: i32,
        rotation: Angle,
    },
    /// Reference to a user-defined aperture macro.
    Macro {
        name: String,
        params: Vec<MacroParam>,
    },
}

impl ApertureShape {
    /// Template text following `%ADDnn`.
    pub fn template(&self, units: Units) -> Result<String, CamError> {
        let d = |nm: i32| format_decimal(nm as i64, units);
        Ok(match self {
            ApertureShape::Circle { diameter } => format!("C,{}", d(*diameter)?),
            ApertureShape::Rectangle { size } => {
                format!("R,{}X{}", d(size.width)?, d(size.height)?)
            }
            ApertureShape::Obround { size } => {
                format!("O,{}X{}", d(size.width)?, d(size.height)?)
            }
            ApertureShape::Polygon {
                diameter,
                vertices,
                rotation,
            } => {
                if rotation.is_zero() {
                    format!("P,{}X{vertices}", d(*diameter)?)
                } else {
                    format!("P,{}X{vertices}X{rotation}", d(*diameter)?)
                }
            }
            ApertureShape::RoundRect {
                size,
                radius,
                rotation,
            } => format!(
                "{ROUND_RECT_MACRO},{}X{}X{}X{rotation}",
                d(size.width)?,
                d(size.height)?,
                d(*radius)?
            ),
            ApertureShape::Macro { name, params } => {
                let mut s = name.clone();
                for (i, p) in params.iter().enumerate() {
                    s.push(if i == 0 { ',' } else { 'X' });
                    s.push_str(&p.render(units)?);
                }
                s
            }
        })
    }

    /// The macro this shape needs defined before use, if any.
    pub fn macro_name(&self) -> Option<&str> {
        match self {
            ApertureShape::RoundRect { .. } => Some(ROUND_RECT_MACRO),
            ApertureShape::Macro { name, .. } => Some(name.as_str()),
            _ => None,
        }
    }
}

/// An aperture in the aperture table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aperture {
    pub id: u32,
    pub shape: ApertureShape,
}

impl Aperture {
    pub fn new(id: u32, shape: ApertureShape) -> Self {
        Self { id, shape }
    }

    /// Full `%AD` definition.
    pub fn command(&self, units: Units) -> Result<String, CamError> {
        Ok(format!("%ADD{}{}*%", self.id, self.shape.template(units)?))
    }
}

/// An aperture macro definition (%AM...% block).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Macro {
    pub name: String,
    pub body: String,
}

impl Macro {
    pub fn new(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body: body.into(),
        }
    }

    /// Rounded rectangle: $1 width, $2 height, $3 corner radius, $4 rotation.
    pub fn round_rect() -> Self {
        let mut body = String::new();
        let _ = writeln!(body, "0 Rectangle with rounded corners*");
        let _ = writeln!(body, "21,1,$1,$2-$3-$3,0,0,$4*");
        let _ = writeln!(body, "21,1,$1-$3-$3,$2,0,0,$4*");
        for (cx, cy) in [
            ("$1/2-$3", "$2/2-$3"),
            ("$3-$1/2", "$2/2-$3"),
            ("$3-$1/2", "$3-$2/2"),
            ("$1/2-$3", "$3-$2/2"),
        ] {
            let _ = writeln!(body, "1,1,$3+$3,{cx},{cy},$4*");
        }
        Self::new(ROUND_RECT_MACRO, body.trim_end())
    }

    /// `%AM` block. The closing `%` is appended only when the body lacks it.
    pub fn command(&self) -> String {
        let mut cmd = format!("%AM{}*\n{}", self.name, self.body);
        if !cmd.ends_with('%') {
            cmd.push('%');
        }
        cmd
    }
}

/// Per-file aperture table: deduplicates shapes and hands out D-codes.
#[derive(Debug, Default)]
pub struct ApertureTable {
    apertures: Vec<Aperture>,
    index: HashMap<ApertureShape, u32>,
    macros: Vec<Macro>,
}

impl ApertureTable {
    /// D-codes below 10 are reserved for commands.
    pub const FIRST_ID: u32 = 10;

    /// Register a custom macro; later registrations of the same name are ignored.
    pub fn add_macro(&mut self, mac: Macro) {
        if !self.macros.iter().any(|m| m.name == mac.name) {
            self.macros.push(mac);
        }
    }

    /// D-code for `shape`, defining it on first use.
    pub fn intern(&mut self, shape: ApertureShape) -> u32 {
        if let Some(id) = self.index.get(&shape) {
            return *id;
        }
        if matches!(shape, ApertureShape::RoundRect { .. }) {
            self.add_macro(Macro::round_rect());
        }
        let id = Self::FIRST_ID + self.apertures.len() as u32;
        debug!("aperture D{id}: {shape:?}");
        self.index.insert(shape.clone(), id);
        self.apertures.push(Aperture::new(id, shape));
        id
    }

    pub fn get(&self, id: u32) -> Option<&Aperture> {
        id.checked_sub(Self::FIRST_ID)
            .and_then(|i| self.apertures.get(i as usize))
    }

    pub fn lookup(&self, shape: &ApertureShape) -> Option<&Aperture> {
        self.index.get(shape).and_then(|id| self.get(*id))
    }

    pub fn apertures(&self) -> &[Aperture] {
        &self.apertures
    }

    pub fn macros(&self) -> &[Macro] {
        &self.macros
    }

    pub fn len(&self) -> usize {
        self.apertures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apertures.is_empty()
    }
}
