//! Per-element evaluation and the classification rollup built from it.

mod codes;
mod rollup;

pub use codes::{MainGroup, UNKNOWN_CLASSIFICATION, normalize_classification_code};
pub use rollup::{
    ClassificationGroup, ClassificationHierarchy, HierarchicalRollup, RollupAccumulator, RollupTotals,
};

use crate::amortization::{AmortizationTable, DEFAULT_AMORTIZATION_YEARS};
use crate::calculation::{DensityOverrides, InstanceImpact, compute_element_impact};
use crate::catalog::ReferenceCatalog;
use crate::display::{DisplayImpact, DisplaySettings};
use crate::domain::{Element, MaterialImpact};
use crate::matching::MappingTable;
use serde::Serialize;

/// Request-scoped settings for one calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculationContext {
    pub display: DisplaySettings,
    pub default_amortization_years: u32,
    pub amortization: AmortizationTable,
}

impl Default for CalculationContext {
    fn default() -> Self {
        Self {
            display: DisplaySettings::default(),
            default_amortization_years: DEFAULT_AMORTIZATION_YEARS,
            amortization: AmortizationTable::ebkp(),
        }
    }
}

impl CalculationContext {
    pub fn with_display(mut self, display: DisplaySettings) -> Self {
        self.display = display;
        self
    }

    pub fn with_amortization(mut self, table: AmortizationTable, default_years: u32) -> Self {
        self.amortization = table;
        self.default_amortization_years = default_years;
        self
    }

    pub fn amortization_years(&self, normalized_code: &str) -> u32 {
        self.amortization
            .resolve_years(Some(normalized_code), self.default_amortization_years)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceResult {
    /// Position of the instance within its element.
    pub sequence: usize,
    pub instance_id: String,
    pub name: String,
    pub volume: f64,
    #[serde(flatten)]
    pub detail: InstanceImpact,
    pub display: DisplayImpact,
    pub normalized: DisplayImpact,
}

/// An element with its impact, service life and display values filled in.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementResult {
    pub element: Element,
    pub group_code: String,
    /// Impact in the requested display mode.
    pub display: DisplayImpact,
    /// Impact per m² EBF and year; unavailable without a usable floor area.
    pub normalized: DisplayImpact,
    pub instances: Vec<InstanceResult>,
}

impl ElementResult {
    pub fn impact(&self) -> MaterialImpact {
        self.element.impact.unwrap_or_default()
    }

    pub fn amortization_years(&self) -> u32 {
        self.element
            .amortization_years
            .unwrap_or(DEFAULT_AMORTIZATION_YEARS)
    }
}

pub fn evaluate_element(
    element: &Element,
    mappings: &MappingTable,
    catalog: &ReferenceCatalog,
    overrides: &DensityOverrides,
    context: &CalculationContext,
) -> ElementResult {
    let computed = compute_element_impact(element, mappings, catalog, overrides);
    let group_code = normalize_classification_code(element.classification_code.as_deref());
    let years = context.amortization_years(&group_code);
    let per_area = context.display.per_area_per_year();

    let instances = element
        .materials
        .iter()
        .zip(computed.instances)
        .enumerate()
        .map(|(sequence, (material, detail))| InstanceResult {
            sequence,
            instance_id: material.id.clone(),
            name: material.name.clone(),
            volume: material.volume,
            display: context.display.impact(&detail.impact, years),
            normalized: per_area.impact(&detail.impact, years),
            detail,
        })
        .collect();

    let mut evaluated = element.clone();
    evaluated.impact = Some(computed.impact);
    evaluated.amortization_years = Some(years);

    ElementResult {
        display: context.display.impact(&computed.impact, years),
        normalized: per_area.impact(&computed.impact, years),
        element: evaluated,
        group_code,
        instances,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    pub display: DisplaySettings,
    pub elements: Vec<ElementResult>,
    pub rollup: HierarchicalRollup,
}

impl CalculationResult {
    pub fn totals(&self) -> &RollupTotals {
        &self.rollup.totals
    }
}

/// Evaluates every element and rolls the results up by classification.
pub fn aggregate(
    elements: &[Element],
    mappings: &MappingTable,
    catalog: &ReferenceCatalog,
    overrides: &DensityOverrides,
    context: &CalculationContext,
) -> CalculationResult {
    let results: Vec<ElementResult> = elements
        .iter()
        .map(|element| evaluate_element(element, mappings, catalog, overrides, context))
        .collect();

    let mut accumulator = RollupAccumulator::new();
    accumulator.extend(&results);

    CalculationResult {
        display: context.display,
        elements: results,
        rollup: accumulator.finish(),
    }
}
