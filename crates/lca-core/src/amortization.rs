//! Service life lookup per classification code.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_AMORTIZATION_YEARS: u32 = 30;

/// Code (leaf such as `C04.08` or group such as `C04`) to one or more
/// service-life values in years.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AmortizationTable {
    entries: BTreeMap<String, Vec<u32>>,
}

const EBKP_SERVICE_LIVES: &[(&str, &[u32])] = &[
    ("B06.01", &[60]),
    ("B06.02", &[60]),
    ("B06.04", &[60]),
    ("B07.02", &[60]),
    ("C01", &[60]),
    ("C02.01", &[60]),
    ("C02.02", &[60]),
    ("C03", &[60]),
    ("C04.01", &[60]),
    ("C04.04", &[60]),
    ("C04.05", &[60]),
    ("C04.08", &[40]),
    ("D01", &[30]),
    ("D05.02", &[20, 40, 30]),
    ("D05.04", &[30]),
    ("D05.05", &[30]),
    ("D07", &[30]),
    ("D08", &[30]),
    ("E01", &[60]),
    ("E02.01", &[30]),
    ("E02.02", &[30]),
    ("E02.03", &[40]),
    ("E02.04", &[40]),
    ("E02.05", &[40]),
    ("E03", &[30]),
    ("F01.01", &[60]),
    ("F01.02", &[30]),
    ("F01.03", &[40]),
    ("F02", &[30]),
    ("G01", &[30]),
    ("G02", &[30]),
    ("G03", &[30]),
    ("G04", &[30]),
];

impl AmortizationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swiss eBKP-H service lives used when no table is configured.
    pub fn ebkp() -> Self {
        EBKP_SERVICE_LIVES
            .iter()
            .map(|(code, years)| (*code, years.to_vec()))
            .collect()
    }

    pub fn insert(&mut self, code: impl Into<String>, years: Vec<u32>) {
        self.entries.insert(code.into(), years);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// All listed values for the exact code, then for its group.
    pub fn options(&self, code: &str) -> &[u32] {
        self.lookup(code).unwrap_or(&[])
    }

    pub fn has_data(&self, code: &str) -> bool {
        self.lookup(code).is_some()
    }

    /// Exact code, then the group before the first `.`, then `default_years`.
    /// When several values are listed the first one is used.
    pub fn resolve_years(&self, code: Option<&str>, default_years: u32) -> u32 {
        code.and_then(|code| self.lookup(code))
            .and_then(|years| years.first().copied())
            .unwrap_or(default_years)
    }

    fn lookup(&self, code: &str) -> Option<&[u32]> {
        let code = code.trim();
        if code.is_empty() {
            return None;
        }
        let listed = |key: &str| {
            self.entries
                .get(key)
                .map(Vec::as_slice)
                .filter(|years| !years.is_empty())
        };

        listed(code).or_else(|| {
            code.split_once('.')
                .and_then(|(group, _)| listed(group))
        })
    }
}

impl<K: Into<String>> FromIterator<(K, Vec<u32>)> for AmortizationTable {
    fn from_iter<T: IntoIterator<Item = (K, Vec<u32>)>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(code, years)| (code.into(), years))
                .collect(),
        }
    }
}
