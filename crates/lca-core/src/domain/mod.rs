pub mod errors;

pub use errors::{LcaError, LcaErrorCategory, LcaResult};

use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Absolute impact of a material quantity, an element, or any aggregate of them.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MaterialImpact {
    pub gwp: f64,
    pub ubp: f64,
    pub penr: f64,
}

impl MaterialImpact {
    pub const ZERO: MaterialImpact = MaterialImpact {
        gwp: 0.0,
        ubp: 0.0,
        penr: 0.0,
    };

    pub const fn new(gwp: f64, ubp: f64, penr: f64) -> Self {
        Self { gwp, ubp, penr }
    }

    pub fn from_mass(mass: f64, factors: &ImpactFactors) -> Self {
        Self {
            gwp: mass * factors.gwp,
            ubp: mass * factors.ubp,
            penr: mass * factors.penr,
        }
    }

    pub fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            gwp: f(self.gwp),
            ubp: f(self.ubp),
            penr: f(self.penr),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.gwp == 0.0 && self.ubp == 0.0 && self.penr == 0.0
    }

    pub fn is_finite(&self) -> bool {
        self.gwp.is_finite() && self.ubp.is_finite() && self.penr.is_finite()
    }
}

impl Add for MaterialImpact {
    type Output = MaterialImpact;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            gwp: self.gwp + rhs.gwp,
            ubp: self.ubp + rhs.ubp,
            penr: self.penr + rhs.penr,
        }
    }
}

impl AddAssign for MaterialImpact {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for MaterialImpact {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a MaterialImpact> for MaterialImpact {
    fn sum<I: Iterator<Item = &'a MaterialImpact>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// Reference impact per kilogram of material.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ImpactFactors {
    #[serde(default)]
    pub gwp: f64,
    #[serde(default)]
    pub ubp: f64,
    #[serde(default)]
    pub penr: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DensityRange {
    pub min: f64,
    pub max: f64,
}

impl DensityRange {
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min >= 0.0 && self.max >= self.min && self.max > 0.0
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

/// Catalog entry every modelled material is resolved against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceMaterial {
    pub id: String,
    #[serde(rename = "nameDE", alias = "displayName")]
    pub display_name: String,
    #[serde(flatten)]
    pub impact_factors: ImpactFactors,
    #[serde(default)]
    pub density: Option<f64>,
    #[serde(default)]
    pub density_range: Option<DensityRange>,
    #[serde(default = "default_reference_unit")]
    pub unit: String,
}

fn default_reference_unit() -> String {
    "kg".to_string()
}

impl ReferenceMaterial {
    pub fn fixed_density(&self) -> Option<f64> {
        self.density
            .filter(|density| density.is_finite() && *density > 0.0)
    }

    pub fn valid_density_range(&self) -> Option<DensityRange> {
        self.density_range.filter(DensityRange::is_valid)
    }

    /// Materials without any usable density cannot turn a volume into a mass.
    pub fn is_match_candidate(&self) -> bool {
        self.fixed_density().is_some() || self.valid_density_range().is_some()
    }

    pub fn density_label(&self) -> String {
        match (self.valid_density_range(), self.fixed_density()) {
            (Some(range), _) => format!("{}-{} kg/m³", range.min, range.max),
            (None, Some(density)) => format!("{} kg/m³", density),
            (None, None) => "no density".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialInstance {
    pub id: String,
    pub name: String,
    pub volume: f64,
    pub unit: String,
}

impl MaterialInstance {
    pub fn new(id: impl Into<String>, name: impl Into<String>, volume: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            volume,
            unit: "m³".to_string(),
        }
    }

    /// Only finite positive volumes carry material into a calculation.
    pub fn has_usable_volume(&self) -> bool {
        self.volume.is_finite() && self.volume > 0.0
    }
}

/// Canonical element produced by the element normalizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub guid: String,
    pub name: String,
    pub ifc_class: String,
    pub classification_code: Option<String>,
    pub quantity: f64,
    pub materials: Vec<MaterialInstance>,
    pub impact: Option<MaterialImpact>,
    pub amortization_years: Option<u32>,
}

impl Element {
    pub fn new(guid: impl Into<String>, classification_code: Option<&str>) -> Self {
        Self {
            guid: guid.into(),
            name: "Unknown Element".to_string(),
            ifc_class: "Unknown".to_string(),
            classification_code: classification_code.map(str::to_string),
            quantity: 0.0,
            materials: Vec::new(),
            impact: None,
            amortization_years: None,
        }
    }

    /// Unusable volumes are kept on the instance but never counted in
    /// `quantity`.
    pub fn with_material(mut self, material: MaterialInstance) -> Self {
        if material.has_usable_volume() {
            self.quantity += material.volume;
        }
        self.materials.push(material);
        self
    }
}
