use crate::amortization::{AmortizationTable, DEFAULT_AMORTIZATION_YEARS};
use crate::matching::{BigramDiceScorer, DEFAULT_MIN_SIMILARITY, DEFAULT_TOP_K, FuzzyMatcher};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_BATCH_SIZE: usize = 500;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EngineConfig {
    #[serde(rename = "defaultAmortizationYears", default = "default_amortization_years")]
    pub default_amortization_years: u32,
    #[serde(rename = "matchTopK", default = "default_top_k")]
    pub match_top_k: usize,
    #[serde(rename = "minSimilarity", default = "default_min_similarity")]
    pub min_similarity: f64,
    #[serde(rename = "batchSize", default = "default_batch_size")]
    pub batch_size: usize,
    /// Replaces the built-in eBKP-H service lives when present.
    #[serde(rename = "amortizationTable", default, skip_serializing_if = "Option::is_none")]
    pub amortization_table: Option<AmortizationTable>,
}

fn default_amortization_years() -> u32 {
    DEFAULT_AMORTIZATION_YEARS
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

fn default_min_similarity() -> f64 {
    DEFAULT_MIN_SIMILARITY
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_amortization_years: DEFAULT_AMORTIZATION_YEARS,
            match_top_k: DEFAULT_TOP_K,
            min_similarity: DEFAULT_MIN_SIMILARITY,
            batch_size: DEFAULT_BATCH_SIZE,
            amortization_table: None,
        }
    }
}

impl EngineConfig {
    pub fn amortization_table(&self) -> AmortizationTable {
        self.amortization_table
            .clone()
            .unwrap_or_else(AmortizationTable::ebkp)
    }

    pub fn matcher(&self) -> FuzzyMatcher<BigramDiceScorer> {
        FuzzyMatcher::default()
            .with_top_k(self.match_top_k)
            .with_min_score(self.min_similarity)
    }

    fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.min_similarity) {
            return Err(format!("minSimilarity must lie in [0, 1], got {}", self.min_similarity));
        }
        if self.batch_size == 0 {
            return Err("batchSize must be at least 1".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineConfigError {
    #[error("failed to read engine config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse engine config '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid engine config '{}': {message}", path.display())]
    Invalid { path: PathBuf, message: String },
}

pub fn load_engine_config(config_path: impl AsRef<Path>) -> Result<EngineConfig, EngineConfigError> {
    let config_path = config_path.as_ref();
    let source = fs::read_to_string(config_path).map_err(|source| EngineConfigError::Read {
        path: config_path.to_path_buf(),
        source,
    })?;
    let config: EngineConfig = serde_json::from_str(&source).map_err(|source| EngineConfigError::Parse {
        path: config_path.to_path_buf(),
        source,
    })?;
    config.validate().map_err(|message| EngineConfigError::Invalid {
        path: config_path.to_path_buf(),
        message,
    })?;
    Ok(config)
}
