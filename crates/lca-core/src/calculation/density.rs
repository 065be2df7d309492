use crate::domain::ReferenceMaterial;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// User-chosen densities per material instance id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DensityOverrides {
    entries: BTreeMap<String, f64>,
}

impl DensityOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, instance_id: impl Into<String>, density: f64) {
        self.entries.insert(instance_id.into(), density);
    }

    pub fn get(&self, instance_id: &str) -> Option<f64> {
        self.entries.get(instance_id).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for DensityOverrides {
    fn from_iter<T: IntoIterator<Item = (K, f64)>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, density)| (key.into(), density))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DensitySource {
    Override,
    Fixed,
    RangeMidpoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedDensity {
    pub value: f64,
    pub source: DensitySource,
}

/// Effective density in kg/m³ for one material instance.
///
/// The override is taken as given, even outside the declared range.
pub fn resolve_density(
    instance_id: &str,
    reference: &ReferenceMaterial,
    overrides: &DensityOverrides,
) -> Option<ResolvedDensity> {
    if let Some(value) = overrides.get(instance_id) {
        return Some(ResolvedDensity {
            value,
            source: DensitySource::Override,
        });
    }

    if let Some(value) = reference.fixed_density() {
        return Some(ResolvedDensity {
            value,
            source: DensitySource::Fixed,
        });
    }

    reference
        .valid_density_range()
        .map(|range| ResolvedDensity {
            value: range.midpoint(),
            source: DensitySource::RangeMidpoint,
        })
}
