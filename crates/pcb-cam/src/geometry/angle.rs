use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

const FULL_TURN: i32 = 36_000;
const QUARTER_TURN: i32 = 9_000;

/// Angle in hundredths of a degree, always normalized into `0..36000`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(from = "i32", into = "i32")]
pub struct Angle(i32);

impl Angle {
    pub const ZERO: Angle = Angle(0);
    pub const DEG_45: Angle = Angle(4_500);
    pub const DEG_90: Angle = Angle(QUARTER_TURN);
    pub const DEG_180: Angle = Angle(2 * QUARTER_TURN);
    pub const DEG_270: Angle = Angle(3 * QUARTER_TURN);

    pub const fn new(value: i32) -> Self {
        Angle(value.rem_euclid(FULL_TURN))
    }

    pub fn from_degrees(degrees: f64) -> Self {
        let hundredths = (degrees * 100.0).round() as i64;
        Angle(hundredths.rem_euclid(FULL_TURN as i64) as i32)
    }

    pub const fn value(self) -> i32 {
        self.0
    }

    pub fn degrees(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn to_radians(self) -> f64 {
        self.degrees().to_radians()
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub const fn is_orthogonal(self) -> bool {
        self.0 % QUARTER_TURN == 0
    }

    pub const fn is_diagonal(self) -> bool {
        self.0 % QUARTER_TURN == 4_500
    }

    /// `(sin, cos)`, exact for multiples of 90 degrees.
    pub fn sin_cos(self) -> (f64, f64) {
        match self.0 {
            0 => (0.0, 1.0),
            9_000 => (1.0, 0.0),
            18_000 => (0.0, -1.0),
            27_000 => (-1.0, 0.0),
            _ => self.to_radians().sin_cos(),
        }
    }
}

impl From<i32> for Angle {
    fn from(value: i32) -> Self {
        Angle::new(value)
    }
}

impl From<Angle> for i32 {
    fn from(a: Angle) -> Self {
        a.0
    }
}

impl Add for Angle {
    type Output = Angle;

    fn add(self, rhs: Angle) -> Angle {
        Angle::new(self.0 + rhs.0)
    }
}

impl AddAssign for Angle {
    fn add_assign(&mut self, rhs: Angle) {
        *self = *self + rhs;
    }
}

impl Sub for Angle {
    type Output = Angle;

    fn sub(self, rhs: Angle) -> Angle {
        Angle::new(self.0 - rhs.0)
    }
}

impl SubAssign for Angle {
    fn sub_assign(&mut self, rhs: Angle) {
        *self = *self - rhs;
    }
}

impl Neg for Angle {
    type Output = Angle;

    fn neg(self) -> Angle {
        Angle::new(-self.0)
    }
}

/// Decimal degrees with trailing zeros trimmed: `90`, `45.5`, `0.25`.
impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / 100;
        let frac = self.0 % 100;
        match frac {
            0 => write!(f, "{whole}"),
            _ if frac % 10 == 0 => write!(f, "{whole}.{}", frac / 10),
            _ => write!(f, "{whole}.{frac:02}"),
        }
    }
}
