use serde::{Deserialize, Serialize};

use super::div_round;

/// Per-mille ratio clamped to `[0, 1000]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub struct Ratio(i32);

impl Ratio {
    pub const ZERO: Ratio = Ratio(0);
    pub const HALF: Ratio = Ratio(500);
    pub const ONE: Ratio = Ratio(1000);

    pub fn new(per_mille: i32) -> Self {
        Ratio(per_mille.clamp(0, 1000))
    }

    pub const fn value(self) -> i32 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Scale a length by this ratio.
    pub fn apply(self, length: i32) -> i32 {
        div_round(length as i128 * self.0 as i128, 1000) as i32
    }
}

impl From<i32> for Ratio {
    fn from(v: i32) -> Self {
        Ratio::new(v)
    }
}

impl From<Ratio> for i32 {
    fn from(r: Ratio) -> Self {
        r.0
    }
}
