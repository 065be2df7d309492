//! Collaborators the host supplies around the engine.

use crate::aggregation::{CalculationResult, ElementResult};
use crate::calculation::DensityOverrides;
use crate::display::DisplayValue;
use crate::domain::{LcaResult, ReferenceMaterial};
use crate::matching::MappingTable;
use serde::{Deserialize, Serialize};

pub const UNKNOWN_REFERENCE: &str = "UNKNOWN";

pub trait MaterialCatalogProvider {
    fn fetch_all(&self) -> LcaResult<Vec<ReferenceMaterial>>;
}

pub trait ProjectStore {
    /// Raw element batch as stored; parsed by the engine.
    fn fetch_elements(&self, project_id: &str) -> LcaResult<serde_json::Value>;
    fn fetch_saved_mappings(&self, project_id: &str) -> LcaResult<MappingTable>;
    fn fetch_density_overrides(&self, project_id: &str) -> LcaResult<DensityOverrides>;
    fn fetch_project_metadata(&self, project_id: &str) -> LcaResult<ProjectMetadata>;
    fn persist_results(&self, project_id: &str, result: &CalculationResult) -> LcaResult<()>;
}

pub trait EventPublisher {
    fn publish(&self, events: &[InstanceEvent], metadata: &PublishMetadata) -> LcaResult<()>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectMetadata {
    #[serde(alias = "project")]
    pub name: Option<String>,
    pub filename: Option<String>,
    /// Energy reference area in m².
    pub ebf: Option<f64>,
    pub file_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishMetadata {
    pub project: String,
    pub filename: String,
    pub timestamp: String,
    pub file_id: String,
}

impl PublishMetadata {
    pub fn for_project(project_id: &str, metadata: &ProjectMetadata, timestamp: impl Into<String>) -> Self {
        Self {
            project: metadata.name.clone().unwrap_or_else(|| project_id.to_string()),
            filename: metadata.filename.clone().unwrap_or_default(),
            timestamp: timestamp.into(),
            file_id: metadata
                .file_id
                .clone()
                .unwrap_or_else(|| project_id.to_string()),
        }
    }
}

/// Per-material message sent downstream after a calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceEvent {
    /// GUID of the owning element.
    pub id: String,
    pub sequence: usize,
    pub mat_kbob: String,
    pub kbob_name: String,
    pub gwp_absolute: f64,
    pub ubp_absolute: f64,
    pub penr_absolute: f64,
    pub gwp_relative: DisplayValue,
    pub ubp_relative: DisplayValue,
    pub penr_relative: DisplayValue,
}

/// One event per material instance, in element then material order.
///
/// Relative values are the per m² EBF and year figures, independent of the
/// display mode of the calculation.
pub fn instance_events(results: &[ElementResult]) -> Vec<InstanceEvent> {
    results
        .iter()
        .flat_map(|result| {
            result.instances.iter().map(move |instance| {
                let absolute = instance.detail.impact;
                InstanceEvent {
                    id: result.element.guid.clone(),
                    sequence: instance.sequence,
                    mat_kbob: instance
                        .detail
                        .reference_id
                        .clone()
                        .unwrap_or_else(|| UNKNOWN_REFERENCE.to_string()),
                    kbob_name: instance
                        .detail
                        .reference_name
                        .clone()
                        .unwrap_or_else(|| UNKNOWN_REFERENCE.to_string()),
                    gwp_absolute: absolute.gwp,
                    ubp_absolute: absolute.ubp,
                    penr_absolute: absolute.penr,
                    gwp_relative: instance.normalized.gwp,
                    ubp_relative: instance.normalized.ubp,
                    penr_relative: instance.normalized.penr,
                }
            })
        })
        .collect()
}
