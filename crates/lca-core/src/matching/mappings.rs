use crate::domain::MaterialInstance;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Strips trailing copy numbering such as `" (2)"` from a material name.
pub fn normalize_material_name(name: &str) -> &str {
    let trimmed = name.trim_end();
    let Some(without_paren) = trimmed.strip_suffix(')') else {
        return name;
    };
    let Some(open) = without_paren.rfind('(') else {
        return name;
    };
    let digits = &without_paren[open + 1..];
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return name;
    }
    without_paren[..open].trim_end()
}

/// Material instance id to reference material id, as saved for a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MappingTable {
    entries: BTreeMap<String, String>,
}

impl MappingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, instance_id: impl Into<String>, reference_id: impl Into<String>) {
        self.entries.insert(instance_id.into(), reference_id.into());
    }

    pub fn get(&self, instance_id: &str) -> Option<&str> {
        self.entries.get(instance_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(instance, reference)| (instance.as_str(), reference.as_str()))
    }

    /// Reference id for an instance: exact id first, then the instance name
    /// against mapping keys with copy numbering removed on both sides.
    pub fn resolve(&self, instance: &MaterialInstance) -> Option<&str> {
        if let Some(reference) = self.get(&instance.id) {
            return Some(reference);
        }

        let wanted = normalize_material_name(&instance.name);
        if wanted.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|(key, _)| normalize_material_name(key) == wanted)
            .map(|(_, reference)| reference.as_str())
    }
}

impl<K, V> FromIterator<(K, V)> for MappingTable
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}
