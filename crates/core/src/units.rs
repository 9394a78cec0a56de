//! Length and colour primitives shared by the document tree and the style layer.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

/// EMUs per inch.
pub const EMU_PER_INCH: i64 = 914_400;

/// EMUs per typographic point.
pub const EMU_PER_POINT: i64 = 12_700;

/// EMUs per centimetre.
pub const EMU_PER_CM: i64 = 360_000;

/// An absolute length in English Metric Units.
///
/// Accepts `"5in"`, `"12pt"`, `"2.5cm"` or a bare EMU count when parsed or
/// deserialized, so configuration files can use whichever unit reads best.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "LengthRepr", into = "i64")]
pub struct Emu(pub i64);

impl Emu {
    /// Zero length.
    pub const ZERO: Emu = Emu(0);

    /// Length from inches.
    pub fn inches(value: f64) -> Self {
        Emu((value * EMU_PER_INCH as f64).round() as i64)
    }

    /// Length from typographic points.
    pub fn points(value: f64) -> Self {
        Emu((value * EMU_PER_POINT as f64).round() as i64)
    }

    /// Length from centimetres.
    pub fn cm(value: f64) -> Self {
        Emu((value * EMU_PER_CM as f64).round() as i64)
    }

    /// Raw EMU count.
    pub fn get(self) -> i64 {
        self.0
    }

    /// Length in inches.
    pub fn as_inches(self) -> f64 {
        self.0 as f64 / EMU_PER_INCH as f64
    }
}

impl Add for Emu {
    type Output = Emu;

    fn add(self, rhs: Emu) -> Emu {
        Emu(self.0 + rhs.0)
    }
}

impl Sub for Emu {
    type Output = Emu;

    fn sub(self, rhs: Emu) -> Emu {
        Emu(self.0 - rhs.0)
    }
}

impl fmt::Display for Emu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}in", self.as_inches())
    }
}

impl From<Emu> for i64 {
    fn from(value: Emu) -> i64 {
        value.0
    }
}

impl FromStr for Emu {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (number, scale): (&str, fn(f64) -> Emu) = if let Some(n) = s.strip_suffix("in") {
            (n, Emu::inches)
        } else if let Some(n) = s.strip_suffix("pt") {
            (n, Emu::points)
        } else if let Some(n) = s.strip_suffix("cm") {
            (n, Emu::cm)
        } else if let Some(n) = s.strip_suffix("emu") {
            (n, |v| Emu(v.round() as i64))
        } else {
            (s, |v| Emu(v.round() as i64))
        };

        number
            .trim()
            .parse::<f64>()
            .map(scale)
            .map_err(|_| Error::InvalidValue(format!("Not a length: '{}'", s)))
    }
}

/// Wire form of a length: a bare EMU count or a string with a unit suffix.
#[derive(Deserialize)]
#[serde(untagged)]
enum LengthRepr {
    Raw(i64),
    Text(String),
}

impl TryFrom<LengthRepr> for Emu {
    type Error = Error;

    fn try_from(value: LengthRepr) -> Result<Self> {
        match value {
            LengthRepr::Raw(v) => Ok(Emu(v)),
            LengthRepr::Text(s) => s.parse(),
        }
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub left: Emu,
    pub top: Emu,
    pub width: Emu,
    pub height: Emu,
}

impl Rect {
    /// Create a rectangle from its four components.
    pub fn new(left: Emu, top: Emu, width: Emu, height: Emu) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Create a rectangle from inch values.
    pub fn inches(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self::new(
            Emu::inches(left),
            Emu::inches(top),
            Emu::inches(width),
            Emu::inches(height),
        )
    }

    /// Bottom edge.
    pub fn bottom(&self) -> Emu {
        self.top + self.height
    }
}

/// A 24-bit sRGB colour, written as six hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    /// Uppercase hex form without a leading `#`, as stored in `srgbClr/@val`.
    pub fn hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

impl FromStr for Rgb {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(Error::InvalidValue(format!("Not an RGB colour: '{}'", s)));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .map_err(|_| Error::InvalidValue(format!("Not an RGB colour: '{}'", s)))
        };

        Ok(Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl TryFrom<String> for Rgb {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> String {
        value.hex()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_units() {
        assert_eq!(Emu::inches(1.0), Emu(914_400));
        assert_eq!(Emu::points(1.0), Emu(12_700));
        assert_eq!(Emu::cm(1.0), Emu(360_000));
        assert_eq!(Emu::inches(13.333).get(), 12_191_695);
    }

    #[test]
    fn test_parse_length() {
        assert_eq!("5in".parse::<Emu>().unwrap(), Emu::inches(5.0));
        assert_eq!(" 1.5 in ".parse::<Emu>().unwrap(), Emu::inches(1.5));
        assert_eq!("12pt".parse::<Emu>().unwrap(), Emu::points(12.0));
        assert_eq!("914400".parse::<Emu>().unwrap(), Emu::inches(1.0));
        assert!("five inches".parse::<Emu>().is_err());
    }

    #[test]
    fn test_deserialize_length() {
        let lengths: Vec<Emu> = serde_json::from_str(r#"["2in", 12700, "1pt"]"#).unwrap();
        assert_eq!(lengths, vec![Emu::inches(2.0), Emu(12_700), Emu::points(1.0)]);
    }

    #[test]
    fn test_rgb_hex() {
        assert_eq!(Rgb(0, 80, 158).hex(), "00509E");
        assert_eq!("#dc3232".parse::<Rgb>().unwrap(), Rgb(220, 50, 50));
        assert!("12345".parse::<Rgb>().is_err());
        assert!("GG0000".parse::<Rgb>().is_err());
    }

    #[test]
    fn test_rect_bottom_edge() {
        let rect = Rect::inches(0.5, 1.0, 2.0, 3.0);
        assert_eq!(rect.bottom(), Emu::inches(4.0));
    }
}
