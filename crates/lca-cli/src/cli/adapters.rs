//! File-backed collaborators for the project workflow.

use lca_core::aggregation::CalculationResult;
use lca_core::calculation::DensityOverrides;
use lca_core::domain::{LcaError, LcaResult, ReferenceMaterial};
use lca_core::matching::MappingTable;
use lca_core::ports::{EventPublisher, InstanceEvent, MaterialCatalogProvider, ProjectMetadata, ProjectStore, PublishMetadata};
use lca_core::serialization::write_json_report;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub(super) const ELEMENTS_FILE: &str = "elements.json";
pub(super) const MAPPINGS_FILE: &str = "mappings.json";
pub(super) const DENSITIES_FILE: &str = "densities.json";
pub(super) const PROJECT_FILE: &str = "project.json";
pub(super) const RESULTS_FILE: &str = "results.json";

fn read_json<T: DeserializeOwned>(path: &Path, read_placeholder: &'static str, parse_placeholder: &'static str) -> LcaResult<T> {
    let content = fs::read_to_string(path).map_err(|source| {
        LcaError::io_system(
            read_placeholder,
            format!("failed to read '{}': {}", path.display(), source),
        )
    })?;
    serde_json::from_str(&content).map_err(|source| {
        LcaError::input_validation(
            parse_placeholder,
            format!("failed to parse '{}': {}", path.display(), source),
        )
    })
}

/// Missing files read as the empty default.
fn read_optional_json<T: DeserializeOwned + Default>(path: &Path, parse_placeholder: &'static str) -> LcaResult<T> {
    if !path.is_file() {
        tracing::debug!(path = %path.display(), "optional project file absent");
        return Ok(T::default());
    }
    read_json(path, "IO.PROJECT_READ", parse_placeholder)
}

/// One directory per project below `root`.
#[derive(Debug, Clone)]
pub(super) struct DirectoryProjectStore {
    root: PathBuf,
}

impl DirectoryProjectStore {
    pub(super) fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn project_dir(&self, project_id: &str) -> LcaResult<PathBuf> {
        let valid = !project_id.is_empty()
            && project_id != "."
            && project_id != ".."
            && !project_id.contains(['/', '\\']);
        if !valid {
            return Err(LcaError::input_validation(
                "INPUT.PROJECT_ID",
                format!("project id '{project_id}' is not a plain directory name"),
            ));
        }
        Ok(self.root.join(project_id))
    }
}

impl ProjectStore for DirectoryProjectStore {
    fn fetch_elements(&self, project_id: &str) -> LcaResult<serde_json::Value> {
        let path = self.project_dir(project_id)?.join(ELEMENTS_FILE);
        read_json(&path, "IO.PROJECT_ELEMENTS", "INPUT.ELEMENTS_JSON")
    }

    fn fetch_saved_mappings(&self, project_id: &str) -> LcaResult<MappingTable> {
        read_optional_json(&self.project_dir(project_id)?.join(MAPPINGS_FILE), "INPUT.MAPPINGS_JSON")
    }

    fn fetch_density_overrides(&self, project_id: &str) -> LcaResult<DensityOverrides> {
        read_optional_json(&self.project_dir(project_id)?.join(DENSITIES_FILE), "INPUT.DENSITIES_JSON")
    }

    fn fetch_project_metadata(&self, project_id: &str) -> LcaResult<ProjectMetadata> {
        read_optional_json(&self.project_dir(project_id)?.join(PROJECT_FILE), "INPUT.PROJECT_JSON")
    }

    fn persist_results(&self, project_id: &str, result: &CalculationResult) -> LcaResult<()> {
        write_json_report(&self.project_dir(project_id)?.join(RESULTS_FILE), result)
    }
}

#[derive(Debug, Clone)]
pub(super) struct JsonCatalogProvider {
    path: PathBuf,
}

impl JsonCatalogProvider {
    pub(super) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl MaterialCatalogProvider for JsonCatalogProvider {
    fn fetch_all(&self) -> LcaResult<Vec<ReferenceMaterial>> {
        read_json(&self.path, "IO.CATALOG_READ", "INPUT.CATALOG_JSON")
    }
}

#[derive(Serialize)]
struct EventRecord<'a> {
    #[serde(flatten)]
    metadata: &'a PublishMetadata,
    #[serde(flatten)]
    event: &'a InstanceEvent,
}

/// Writes one JSON object per event line; without a target path events are
/// dropped.
#[derive(Debug, Clone, Default)]
pub(super) struct JsonLinesPublisher {
    path: Option<PathBuf>,
}

impl JsonLinesPublisher {
    pub(super) fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    fn write_events(&self, path: &Path, events: &[InstanceEvent], metadata: &PublishMetadata) -> std::io::Result<()> {
        let mut writer = BufWriter::new(fs::File::create(path)?);
        for event in events {
            serde_json::to_writer(&mut writer, &EventRecord { metadata, event })?;
            writer.write_all(b"\n")?;
        }
        writer.flush()
    }
}

impl EventPublisher for JsonLinesPublisher {
    fn publish(&self, events: &[InstanceEvent], metadata: &PublishMetadata) -> LcaResult<()> {
        let Some(path) = &self.path else {
            tracing::debug!(events = events.len(), "no event target configured");
            return Ok(());
        };
        self.write_events(path, events, metadata).map_err(|source| {
            LcaError::io_system(
                "IO.EVENTS_WRITE",
                format!("failed to write events '{}': {}", path.display(), source),
            )
        })
    }
}
