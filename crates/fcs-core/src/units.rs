// fcs-core/src/units.rs

use core::str::FromStr;

use uom::si::f64::{Angle as UomAngle, Length as UomLength};

use crate::FcsError;

pub type Angle = UomAngle;
pub type Length = UomLength;

#[inline]
pub fn rad(v: f64) -> Angle {
    use uom::si::angle::radian;
    Angle::new::<radian>(v)
}

#[inline]
pub fn deg(v: f64) -> Angle {
    use uom::si::angle::degree;
    Angle::new::<degree>(v)
}

#[inline]
pub fn ft(v: f64) -> Length {
    use uom::si::length::foot;
    Length::new::<foot>(v)
}

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

/// Unit tag carried by angle-valued configuration entries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AngleUnit {
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "RAD", alias = "rad"))]
    Radians,
    #[cfg_attr(feature = "serde", serde(rename = "DEG", alias = "deg"))]
    Degrees,
}

impl AngleUnit {
    /// Interpret a raw value tagged with this unit.
    pub fn angle(self, value: f64) -> Angle {
        match self {
            AngleUnit::Radians => rad(value),
            AngleUnit::Degrees => deg(value),
        }
    }

    /// Express an angle as a raw value in this unit.
    pub fn value_of(self, angle: Angle) -> f64 {
        use uom::si::angle::{degree, radian};
        match self {
            AngleUnit::Radians => angle.get::<radian>(),
            AngleUnit::Degrees => angle.get::<degree>(),
        }
    }
}

impl FromStr for AngleUnit {
    type Err = FcsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RAD" | "RADIANS" => Ok(AngleUnit::Radians),
            "DEG" | "DEGREES" => Ok(AngleUnit::Degrees),
            other => Err(FcsError::UnknownUnit {
                what: "angle",
                unit: other.to_string(),
            }),
        }
    }
}

/// Unit tag for distances.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LengthUnit {
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "FT", alias = "ft"))]
    Feet,
    #[cfg_attr(feature = "serde", serde(rename = "M", alias = "m"))]
    Meters,
}

impl LengthUnit {
    pub fn length(self, value: f64) -> Length {
        match self {
            LengthUnit::Feet => ft(value),
            LengthUnit::Meters => m(value),
        }
    }

    pub fn value_of(self, length: Length) -> f64 {
        use uom::si::length::{foot, meter};
        match self {
            LengthUnit::Feet => length.get::<foot>(),
            LengthUnit::Meters => length.get::<meter>(),
        }
    }
}
