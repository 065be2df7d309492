use super::CliError;
use anyhow::Context;
use lca_core::aggregation::RollupTotals;
use lca_core::config::{EngineConfig, load_engine_config};
use lca_core::display::{DisplayImpact, DisplayMode};
use lca_core::domain::{LcaError, MaterialInstance};
use lca_core::serialization::format_fixed_f64;
use lca_core::workflow::ProjectRun;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

pub(super) fn load_config(path: Option<&Path>) -> Result<EngineConfig, CliError> {
    match path {
        Some(path) => Ok(load_engine_config(path)?),
        None => Ok(EngineConfig::default()),
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NameEntry {
    Name(String),
    Material {
        #[serde(default)]
        id: Option<String>,
        name: String,
    },
}

/// Reads a JSON array of material names or `{ "id", "name" }` objects.
pub(super) fn read_material_names(path: &Path) -> anyhow::Result<Vec<MaterialInstance>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read material names '{}'", path.display()))?;
    let entries: Vec<NameEntry> = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse material names '{}'", path.display()))?;

    Ok(entries
        .into_iter()
        .map(|entry| match entry {
            NameEntry::Name(name) => MaterialInstance::new(name.clone(), name, 0.0),
            NameEntry::Material { id, name } => {
                MaterialInstance::new(id.unwrap_or_else(|| name.clone()), name, 0.0)
            }
        })
        .collect())
}

pub(super) fn unix_timestamp_millis() -> Result<String, CliError> {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|source| {
            CliError::Compute(LcaError::internal(
                "SYS.CLI_TIME",
                format!("failed to read system time for event metadata: {}", source),
            ))
        })?
        .as_millis();
    Ok(millis.to_string())
}

fn render_display(value: &DisplayImpact) -> String {
    format!(
        "{:>14} {:>14} {:>14}",
        value.gwp.to_string(),
        value.ubp.to_string(),
        value.penr.to_string()
    )
}

fn render_totals_row(label: &str, totals: &RollupTotals, mode: DisplayMode) -> String {
    let values = match mode {
        DisplayMode::Total => format!(
            "{} {} {}",
            format_fixed_f64(totals.impact.gwp, 14, 2),
            format_fixed_f64(totals.impact.ubp, 14, 0),
            format_fixed_f64(totals.impact.penr, 14, 2)
        ),
        DisplayMode::PerAreaPerYear => render_display(&totals.normalized),
    };
    format!("{label:<36} {:>6} {values}", totals.element_count)
}

pub(super) fn render_run_summary(run: &ProjectRun) -> String {
    let result = &run.result;
    let mode = result.display.mode;
    let mut lines = vec![
        format!("Project: {}", run.project_id),
        format!(
            "Elements: {} ({} synthesized GUIDs, {} rescaled, {} batches)",
            result.rollup.totals.element_count, run.synthesized_guids, run.scaled_elements, run.batches
        ),
        format!(
            "Instances: {} modelled, {} unmapped",
            result.rollup.totals.modelled_instances, result.rollup.totals.unmapped_instances
        ),
        format!(
            "Display mode: {}{}",
            mode,
            run.ebf.map(|ebf| format!(" (EBF {ebf} m²)")).unwrap_or_default()
        ),
        format!(
            "{:<36} {:>6} {:>14} {:>14} {:>14}",
            "Hierarchy", "Count", "GWP", "UBP", "PENR"
        ),
    ];

    for hierarchy in &result.rollup.hierarchies {
        lines.push(render_totals_row(&hierarchy.main_group.to_string(), &hierarchy.totals, mode));
    }
    lines.push(render_totals_row("Total", &result.rollup.totals, mode));
    if mode == DisplayMode::Total && result.rollup.totals.normalized.gwp.is_available() {
        lines.push(format!(
            "{:<36} {:>6} {}",
            "Total per m² EBF and year",
            "",
            render_display(&result.rollup.totals.normalized)
        ));
    }
    lines.push(format!(
        "Events: {} ({})",
        run.events,
        if run.published { "published" } else { "not published" }
    ));
    lines.join("\n")
}
