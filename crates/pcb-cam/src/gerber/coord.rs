use serde::{Deserialize, Serialize};

use crate::error::CamError;
use crate::geometry::{div_round, NM_PER_INCH, NM_PER_MM};

/// Unit system for the %MO command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Units {
    #[default]
    #[serde(rename = "mm")]
    Millimeters,
    #[serde(rename = "in")]
    Inches,
    #[serde(rename = "unknown")]
    Unknown,
}

impl Units {
    /// Nanometers per file unit, `None` for [`Units::Unknown`].
    pub fn nm_per_unit(self) -> Option<i64> {
        match self {
            Units::Millimeters => Some(NM_PER_MM),
            Units::Inches => Some(NM_PER_INCH),
            Units::Unknown => None,
        }
    }

    /// Mode code written after `%MO`.
    pub fn code(self) -> Option<&'static str> {
        match self {
            Units::Millimeters => Some("MM"),
            Units::Inches => Some("IN"),
            Units::Unknown => None,
        }
    }
}

/// Coordinate format from the %FS command.
///
/// `precision` is the total digit count of an emitted coordinate and
/// `decimals` how many of those digits sit behind the implied decimal point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinateFormat {
    pub precision: u8,
    pub decimals: u8,
}

impl Default for CoordinateFormat {
    fn default() -> Self {
        // 2 integer + 4 decimal digits
        Self {
            precision: 6,
            decimals: 4,
        }
    }
}

impl CoordinateFormat {
    pub fn new(precision: u8, decimals: u8) -> Result<Self, CamError> {
        let valid = (4..=9).contains(&precision)
            && decimals >= 1
            && decimals as i32 <= precision as i32 - 2;
        if !valid {
            return Err(CamError::FormatOutOfRange {
                precision,
                decimals,
            });
        }
        Ok(Self {
            precision,
            decimals,
        })
    }

    pub fn integer_digits(&self) -> u8 {
        self.precision - self.decimals
    }
}

/// Converts nanometers into fixed-width Gerber coordinate strings for one
/// format/unit combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberTemplate {
    precision: u8,
    multiplier: i128,
    nm_per_unit: i128,
    limit: i128,
}

impl NumberTemplate {
    pub fn new(format: CoordinateFormat, units: Units) -> Result<Self, CamError> {
        let nm_per_unit = units.nm_per_unit().ok_or(CamError::UnknownUnits)?;
        Ok(Self {
            precision: format.precision,
            multiplier: 10i128.pow(format.decimals as u32),
            nm_per_unit: nm_per_unit as i128,
            limit: 10i128.pow(format.precision as u32),
        })
    }

    /// Nanometers to an integer count of format steps, rounded half away
    /// from zero.
    pub fn quantize(&self, nm: i64) -> i64 {
        div_round(nm as i128 * self.multiplier, self.nm_per_unit) as i64
    }

    /// Format steps back to nanometers.
    pub fn to_nm(&self, raw: i64) -> i64 {
        div_round(raw as i128 * self.nm_per_unit, self.multiplier) as i64
    }

    /// A quantized value zero-padded to the full precision.
    pub fn format_raw(&self, raw: i64) -> Result<String, CamError> {
        if (raw as i128).abs() >= self.limit {
            return Err(CamError::CoordinateOutOfRange {
                value: raw,
                precision: self.precision,
            });
        }
        let width = self.precision as usize;
        let digits = format!("{:0width$}", raw.unsigned_abs());
        Ok(if raw < 0 { format!("-{digits}") } else { digits })
    }

    pub fn format(&self, nm: i64) -> Result<String, CamError> {
        self.format_raw(self.quantize(nm))
    }
}

/// Decimal rendering of a length in file units, at most six decimals with
/// trailing zeros trimmed. Used for aperture dimensions.
pub fn format_decimal(nm: i64, units: Units) -> Result<String, CamError> {
    let per_unit = units.nm_per_unit().ok_or(CamError::UnknownUnits)? as i128;
    let micro = div_round(nm as i128 * 1_000_000, per_unit);
    let sign = if micro < 0 { "-" } else { "" };
    let abs = micro.abs();
    let whole = abs / 1_000_000;
    let frac = abs % 1_000_000;
    if frac == 0 {
        return Ok(format!("{sign}{whole}"));
    }
    let frac = format!("{frac:06}");
    Ok(format!("{sign}{whole}.{}", frac.trim_end_matches('0')))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bounds() {
        assert!(CoordinateFormat::new(6, 4).is_ok());
        assert!(CoordinateFormat::new(4, 1).is_ok());
        assert!(CoordinateFormat::new(9, 7).is_ok());
        assert!(CoordinateFormat::new(3, 1).is_err());
        assert!(CoordinateFormat::new(10, 4).is_err());
        assert!(CoordinateFormat::new(6, 0).is_err());
        assert!(CoordinateFormat::new(6, 5).is_err());
    }

    #[test]
    fn test_one_millimeter_six_four() {
        let format = CoordinateFormat::new(6, 4).unwrap();
        let t = NumberTemplate::new(format, Units::Millimeters).unwrap();
        assert_eq!(t.format(1_000_000).unwrap(), "010000");
        assert_eq!(t.format(0).unwrap(), "000000");
        assert_eq!(t.format(-2_500_000).unwrap(), "-025000");
    }

    #[test]
    fn test_rounding_half_away_from_zero() {
        let t = NumberTemplate::new(CoordinateFormat::default(), Units::Millimeters).unwrap();
        // One step is 100 nm at four decimals.
        assert_eq!(t.quantize(150), 2);
        assert_eq!(t.quantize(149), 1);
        assert_eq!(t.quantize(-150), -2);
    }

    #[test]
    fn test_inches() {
        let t = NumberTemplate::new(CoordinateFormat::new(6, 4).unwrap(), Units::Inches).unwrap();
        assert_eq!(t.format(25_400_000).unwrap(), "010000");
        assert_eq!(t.to_nm(10_000), 25_400_000);
    }

    #[test]
    fn test_overflow() {
        let format = CoordinateFormat::new(4, 2).unwrap();
        let t = NumberTemplate::new(format, Units::Millimeters).unwrap();
        assert_eq!(t.format(99_990_000).unwrap(), "9999");
        assert!(matches!(
            t.format(100_000_000),
            Err(CamError::CoordinateOutOfRange { precision: 4, .. })
        ));
    }

    #[test]
    fn test_unknown_units() {
        assert!(NumberTemplate::new(CoordinateFormat::default(), Units::Unknown).is_err());
    }

    #[test]
    fn test_format_decimal() {
        assert_eq!(format_decimal(1_500_000, Units::Millimeters).unwrap(), "1.5");
        assert_eq!(format_decimal(2_000_000, Units::Millimeters).unwrap(), "2");
        assert_eq!(format_decimal(254_000, Units::Inches).unwrap(), "0.01");
        assert_eq!(format_decimal(-1, Units::Millimeters).unwrap(), "-0.000001");
    }
}
