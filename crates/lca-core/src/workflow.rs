use crate::aggregation::{CalculationContext, CalculationResult, ElementResult, RollupAccumulator, evaluate_element};
use crate::amortization::{AmortizationTable, DEFAULT_AMORTIZATION_YEARS};
use crate::catalog::ReferenceCatalog;
use crate::config::{DEFAULT_BATCH_SIZE, EngineConfig};
use crate::display::{DisplayMode, DisplaySettings};
use crate::domain::{LcaError, LcaResult};
use crate::elements::{normalize_batch, parse_element_batch};
use crate::ports::{EventPublisher, MaterialCatalogProvider, ProjectStore, PublishMetadata, instance_events};

#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub mode: DisplayMode,
    /// Takes precedence over the EBF stored with the project.
    pub ebf: Option<f64>,
    pub batch_size: usize,
    pub default_amortization_years: u32,
    pub amortization: AmortizationTable,
    pub timestamp: String,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            mode: DisplayMode::Total,
            ebf: None,
            batch_size: DEFAULT_BATCH_SIZE,
            default_amortization_years: DEFAULT_AMORTIZATION_YEARS,
            amortization: AmortizationTable::ebkp(),
            timestamp: String::new(),
        }
    }
}

impl RunOptions {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            batch_size: config.batch_size,
            default_amortization_years: config.default_amortization_years,
            amortization: config.amortization_table(),
            ..Self::default()
        }
    }
}

/// Outcome of one project calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectRun {
    pub project_id: String,
    pub ebf: Option<f64>,
    pub result: CalculationResult,
    pub batches: usize,
    pub synthesized_guids: usize,
    pub scaled_elements: usize,
    pub events: usize,
    pub published: bool,
}

/// Fetches a project snapshot, calculates it batch by batch, persists the
/// result and publishes per-material events.
///
/// A failing publisher is logged and reported through `published`; the
/// persisted result is unaffected. Totals that overflow to a non-finite value
/// are a computation error and nothing is persisted.
pub fn run_project(
    project_id: &str,
    options: &RunOptions,
    catalog_provider: &dyn MaterialCatalogProvider,
    store: &dyn ProjectStore,
    publisher: &dyn EventPublisher,
) -> LcaResult<ProjectRun> {
    let catalog = ReferenceCatalog::new(catalog_provider.fetch_all()?);
    let raw_batch = store.fetch_elements(project_id)?;
    let mappings = store.fetch_saved_mappings(project_id)?;
    let overrides = store.fetch_density_overrides(project_id)?;
    let metadata = store.fetch_project_metadata(project_id)?;

    let ebf = options.ebf.or(metadata.ebf);
    let context = CalculationContext::default()
        .with_display(DisplaySettings::new(options.mode, ebf))
        .with_amortization(options.amortization.clone(), options.default_amortization_years);

    let raws = parse_element_batch(raw_batch)?;
    tracing::info!(
        project = project_id,
        elements = raws.len(),
        references = catalog.len(),
        mappings = mappings.len(),
        "calculating project"
    );

    let batch_size = options.batch_size.max(1);
    let mut accumulator = RollupAccumulator::new();
    let mut elements: Vec<ElementResult> = Vec::with_capacity(raws.len());
    let mut batches = 0;
    let mut synthesized_guids = 0;
    let mut scaled_elements = 0;

    for (batch_index, chunk) in raws.chunks(batch_size).enumerate() {
        let mut partial = RollupAccumulator::new();
        for normalized in normalize_batch(chunk, batch_index * batch_size) {
            synthesized_guids += usize::from(normalized.has_synthesized_guid());
            scaled_elements += usize::from(normalized.quantity_scaled);
            let result = evaluate_element(&normalized.element, &mappings, &catalog, &overrides, &context);
            partial.push(&result);
            elements.push(result);
        }
        accumulator.merge(partial);
        batches += 1;
        tracing::debug!(project = project_id, batch = batch_index, "batch aggregated");
    }

    let result = CalculationResult {
        display: context.display,
        elements,
        rollup: accumulator.finish(),
    };
    let totals = result.rollup.totals.impact;
    if !totals.is_finite() {
        return Err(LcaError::computation(
            "COMPUTE.NON_FINITE_TOTAL",
            format!(
                "project '{project_id}' totals overflow (gwp {}, ubp {}, penr {})",
                totals.gwp, totals.ubp, totals.penr
            ),
        ));
    }
    store.persist_results(project_id, &result)?;

    let events = instance_events(&result.elements);
    let publish_metadata = PublishMetadata::for_project(project_id, &metadata, options.timestamp.clone());
    let published = match publisher.publish(&events, &publish_metadata) {
        Ok(()) => true,
        Err(error) => {
            tracing::warn!(project = project_id, error = %error, "publishing results failed");
            false
        }
    };

    tracing::info!(
        project = project_id,
        gwp = result.rollup.totals.impact.gwp,
        events = events.len(),
        published,
        "project calculated"
    );

    Ok(ProjectRun {
        project_id: project_id.to_string(),
        ebf,
        result,
        batches,
        synthesized_guids,
        scaled_elements,
        events: events.len(),
        published,
    })
}
