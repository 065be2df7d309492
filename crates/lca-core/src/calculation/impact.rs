use super::density::{DensityOverrides, ResolvedDensity, resolve_density};
use crate::catalog::ReferenceCatalog;
use crate::domain::{Element, MaterialImpact, MaterialInstance};
use crate::matching::MappingTable;
use serde::{Deserialize, Serialize};

/// Why an instance did or did not contribute impact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceStatus {
    Computed,
    /// No mapping, or the mapping points at an id missing from the catalog.
    Unmapped,
    InvalidVolume,
    MissingDensity,
}

impl InstanceStatus {
    pub const fn is_unmapped(self) -> bool {
        matches!(self, Self::Unmapped)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceImpact {
    pub status: InstanceStatus,
    pub reference_id: Option<String>,
    pub reference_name: Option<String>,
    pub density: Option<ResolvedDensity>,
    pub mass: f64,
    pub impact: MaterialImpact,
}

impl InstanceImpact {
    fn zero(status: InstanceStatus) -> Self {
        Self {
            status,
            reference_id: None,
            reference_name: None,
            density: None,
            mass: 0.0,
            impact: MaterialImpact::ZERO,
        }
    }
}

/// Impact of a single material instance; never fails.
pub fn compute_instance_impact(
    instance: &MaterialInstance,
    mappings: &MappingTable,
    catalog: &ReferenceCatalog,
    overrides: &DensityOverrides,
) -> InstanceImpact {
    let Some(reference) = mappings
        .resolve(instance)
        .and_then(|reference_id| catalog.get(reference_id))
    else {
        tracing::debug!(instance = %instance.id, "no resolvable reference material");
        return InstanceImpact::zero(InstanceStatus::Unmapped);
    };

    let mut result = InstanceImpact {
        reference_id: Some(reference.id.clone()),
        reference_name: Some(reference.display_name.clone()),
        ..InstanceImpact::zero(InstanceStatus::Computed)
    };

    if !instance.has_usable_volume() {
        tracing::debug!(instance = %instance.id, volume = instance.volume, "skipping invalid volume");
        result.status = InstanceStatus::InvalidVolume;
        return result;
    }

    let density = resolve_density(&instance.id, reference, overrides);
    result.density = density;
    let Some(density) = density.filter(|d| d.value.is_finite() && d.value > 0.0) else {
        tracing::debug!(instance = %instance.id, reference = %reference.id, "skipping undefined density");
        result.status = InstanceStatus::MissingDensity;
        return result;
    };

    result.mass = instance.volume * density.value;
    result.impact = MaterialImpact::from_mass(result.mass, &reference.impact_factors);
    result
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElementImpact {
    pub impact: MaterialImpact,
    pub instances: Vec<InstanceImpact>,
}

/// Sum of the element's instance impacts, with per-instance detail in
/// material order.
pub fn compute_element_impact(
    element: &Element,
    mappings: &MappingTable,
    catalog: &ReferenceCatalog,
    overrides: &DensityOverrides,
) -> ElementImpact {
    let instances: Vec<InstanceImpact> = element
        .materials
        .iter()
        .map(|instance| compute_instance_impact(instance, mappings, catalog, overrides))
        .collect();
    let impact = instances.iter().map(|instance| instance.impact).sum();
    ElementImpact { impact, instances }
}
