//! Conversion of absolute impacts into the value shown to the user.

use crate::domain::MaterialImpact;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayMode {
    #[default]
    Total,
    /// Absolute value divided by amortization years and energy reference area.
    PerAreaPerYear,
}

impl DisplayMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Total => "total",
            Self::PerAreaPerYear => "per-area-per-year",
        }
    }
}

impl Display for DisplayMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

impl FromStr for DisplayMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "total" | "absolute" => Ok(Self::Total),
            "per-area-per-year" | "relative" => Ok(Self::PerAreaPerYear),
            other => Err(format!("unsupported display mode '{other}'")),
        }
    }
}

/// A displayable number, or the explicit marker that it cannot be computed.
///
/// Serialized as a JSON number or `null`; `Unavailable` is never turned into 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DisplayValue {
    Value(f64),
    Unavailable,
}

impl DisplayValue {
    pub const ZERO: DisplayValue = DisplayValue::Value(0.0);

    pub fn value(self) -> Option<f64> {
        match self {
            Self::Value(value) => Some(value),
            Self::Unavailable => None,
        }
    }

    pub fn is_available(self) -> bool {
        matches!(self, Self::Value(_))
    }
}

impl Add for DisplayValue {
    type Output = DisplayValue;

    fn add(self, rhs: Self) -> Self::Output {
        match (self, rhs) {
            (Self::Value(lhs), Self::Value(rhs)) => Self::Value(lhs + rhs),
            _ => Self::Unavailable,
        }
    }
}

impl Sum for DisplayValue {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl Serialize for DisplayValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DisplayValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.map_or(Self::Unavailable, Self::Value))
    }
}

impl Display for DisplayValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value(value) => write!(f, "{value}"),
            Self::Unavailable => f.write_str("n/a"),
        }
    }
}

pub fn normalize(
    absolute: f64,
    mode: DisplayMode,
    ebf: Option<f64>,
    amortization_years: u32,
) -> DisplayValue {
    match mode {
        DisplayMode::Total => DisplayValue::Value(absolute),
        DisplayMode::PerAreaPerYear => match ebf {
            Some(ebf) if ebf.is_finite() && ebf > 0.0 && amortization_years > 0 => {
                DisplayValue::Value(absolute / (f64::from(amortization_years) * ebf))
            }
            _ => DisplayValue::Unavailable,
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayImpact {
    pub gwp: DisplayValue,
    pub ubp: DisplayValue,
    pub penr: DisplayValue,
}

impl DisplayImpact {
    pub const ZERO: DisplayImpact = DisplayImpact {
        gwp: DisplayValue::ZERO,
        ubp: DisplayValue::ZERO,
        penr: DisplayValue::ZERO,
    };

    pub const UNAVAILABLE: DisplayImpact = DisplayImpact {
        gwp: DisplayValue::Unavailable,
        ubp: DisplayValue::Unavailable,
        penr: DisplayValue::Unavailable,
    };
}

impl Add for DisplayImpact {
    type Output = DisplayImpact;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            gwp: self.gwp + rhs.gwp,
            ubp: self.ubp + rhs.ubp,
            penr: self.penr + rhs.penr,
        }
    }
}

impl Sum for DisplayImpact {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

/// Display mode plus energy reference area (EBF, m²) for one request.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DisplaySettings {
    pub mode: DisplayMode,
    pub ebf: Option<f64>,
}

impl DisplaySettings {
    pub const fn new(mode: DisplayMode, ebf: Option<f64>) -> Self {
        Self { mode, ebf }
    }

    /// Same floor area, always per m² and year.
    pub const fn per_area_per_year(&self) -> Self {
        Self::new(DisplayMode::PerAreaPerYear, self.ebf)
    }

    pub fn value(&self, absolute: f64, amortization_years: u32) -> DisplayValue {
        normalize(absolute, self.mode, self.ebf, amortization_years)
    }

    pub fn impact(&self, absolute: &MaterialImpact, amortization_years: u32) -> DisplayImpact {
        DisplayImpact {
            gwp: self.value(absolute.gwp, amortization_years),
            ubp: self.value(absolute.ubp, amortization_years),
            penr: self.value(absolute.penr, amortization_years),
        }
    }
}
