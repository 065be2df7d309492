//! Impact resolution and aggregation for construction-project material
//! inventories: GWP, UBP and PENR per material, element, classification group
//! and classification hierarchy.

pub mod aggregation;
pub mod amortization;
pub mod calculation;
pub mod catalog;
pub mod config;
pub mod display;
pub mod domain;
pub mod elements;
pub mod matching;
pub mod ports;
pub mod serialization;
pub mod workflow;

pub use aggregation::{CalculationContext, CalculationResult, aggregate};
pub use catalog::ReferenceCatalog;
pub use domain::{LcaError, LcaErrorCategory, LcaResult};
pub use workflow::{ProjectRun, RunOptions, run_project};
