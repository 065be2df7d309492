use crate::domain::ReferenceMaterial;
use std::collections::HashMap;

/// Reference materials indexed by identifier, preserving catalog order.
#[derive(Debug, Clone, Default)]
pub struct ReferenceCatalog {
    materials: Vec<ReferenceMaterial>,
    index: HashMap<String, usize>,
}

impl ReferenceCatalog {
    pub fn new(materials: Vec<ReferenceMaterial>) -> Self {
        let mut index = HashMap::with_capacity(materials.len());
        for (position, material) in materials.iter().enumerate() {
            if index.contains_key(&material.id) {
                tracing::debug!(id = %material.id, "duplicate reference material id ignored");
                continue;
            }
            index.insert(material.id.clone(), position);
        }
        Self { materials, index }
    }

    pub fn get(&self, id: &str) -> Option<&ReferenceMaterial> {
        self.index.get(id).map(|position| &self.materials[*position])
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReferenceMaterial> {
        self.materials.iter()
    }

    /// Entries eligible for matching, in catalog order.
    pub fn match_candidates(&self) -> Vec<&ReferenceMaterial> {
        self.materials
            .iter()
            .filter(|material| material.is_match_candidate())
            .collect()
    }
}

impl FromIterator<ReferenceMaterial> for ReferenceCatalog {
    fn from_iter<T: IntoIterator<Item = ReferenceMaterial>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
