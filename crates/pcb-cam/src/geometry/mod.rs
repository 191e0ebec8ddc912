//! Fixed-point geometry primitives.
//!
//! All lengths are integer nanometers, all angles integer hundredths of a
//! degree. Nothing in here allocates.

mod angle;
mod point;
mod ratio;
mod transform;

pub use angle::Angle;
pub use point::{Point, Size};
pub use ratio::Ratio;
pub use transform::{rotate_point, Transformation};

/// Nanometers per millimeter.
pub const NM_PER_MM: i64 = 1_000_000;
/// Nanometers per inch.
pub const NM_PER_INCH: i64 = 25_400_000;

/// Integer division rounding half away from zero.
pub(crate) fn div_round(num: i128, den: i128) -> i128 {
    let q = num / den;
    let r = num % den;
    if 2 * r.abs() >= den.abs() {
        q + num.signum() * den.signum()
    } else {
        q
    }
}
