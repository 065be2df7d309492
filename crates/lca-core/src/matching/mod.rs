//! Name-based suggestions of reference materials for modelled materials.
//!
//! Suggestions are advisory: only entries accepted into a [`MappingTable`]
//! take part in impact calculation.

mod mappings;
mod scorer;

pub use mappings::{MappingTable, normalize_material_name};
pub use scorer::{BigramDiceScorer, SimilarityScorer};

use crate::catalog::ReferenceCatalog;
use crate::domain::{MaterialInstance, ReferenceMaterial};
use serde::Serialize;

pub const DEFAULT_TOP_K: usize = 1;
pub const DEFAULT_MIN_SIMILARITY: f64 = 0.3;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSuggestion {
    pub reference_id: String,
    pub display_name: String,
    pub score: f64,
}

#[derive(Debug, Clone)]
pub struct FuzzyMatcher<S = BigramDiceScorer> {
    scorer: S,
    top_k: usize,
    min_score: f64,
}

impl Default for FuzzyMatcher<BigramDiceScorer> {
    fn default() -> Self {
        Self::new(BigramDiceScorer)
    }
}

impl<S: SimilarityScorer> FuzzyMatcher<S> {
    pub fn new(scorer: S) -> Self {
        Self {
            scorer,
            top_k: DEFAULT_TOP_K,
            min_score: DEFAULT_MIN_SIMILARITY,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_min_score(mut self, min_score: f64) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn min_score(&self) -> f64 {
        self.min_score
    }

    /// Ranks candidates by similarity to `name`, best first; equal scores keep
    /// catalog order.
    pub fn rank<'a, I>(&self, name: &str, candidates: I) -> Vec<MatchSuggestion>
    where
        I: IntoIterator<Item = &'a ReferenceMaterial>,
    {
        self.rank_limited(name, candidates, self.top_k)
    }

    fn rank_limited<'a, I>(&self, name: &str, candidates: I, limit: usize) -> Vec<MatchSuggestion>
    where
        I: IntoIterator<Item = &'a ReferenceMaterial>,
    {
        if limit == 0 {
            return Vec::new();
        }

        let mut scored: Vec<(f64, &ReferenceMaterial)> = candidates
            .into_iter()
            .filter(|candidate| candidate.is_match_candidate())
            .map(|candidate| (self.scorer.score(name, &candidate.display_name), candidate))
            .filter(|(score, _)| score.is_finite() && *score > 0.0 && *score >= self.min_score)
            .collect();

        // stable sort keeps catalog order among ties
        scored.sort_by(|lhs, rhs| rhs.0.total_cmp(&lhs.0));
        scored.truncate(limit);

        scored
            .into_iter()
            .map(|(score, candidate)| MatchSuggestion {
                reference_id: candidate.id.clone(),
                display_name: candidate.display_name.clone(),
                score,
            })
            .collect()
    }

    pub fn rank_in_catalog(&self, name: &str, catalog: &ReferenceCatalog) -> Vec<MatchSuggestion> {
        self.rank(name, catalog.iter())
    }

    /// Best suggestion per instance; instances without any suggestion are left
    /// out so they stay unmapped.
    pub fn suggest_mappings<'a, I>(&self, instances: I, catalog: &ReferenceCatalog) -> MappingTable
    where
        I: IntoIterator<Item = &'a MaterialInstance>,
    {
        instances
            .into_iter()
            .filter_map(|instance| {
                self.rank_limited(&instance.name, catalog.iter(), 1)
                    .into_iter()
                    .next()
                    .map(|suggestion| (instance.id.clone(), suggestion.reference_id))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{FuzzyMatcher, SimilarityScorer};
    use crate::catalog::ReferenceCatalog;
    use crate::domain::{DensityRange, ImpactFactors, MaterialInstance, ReferenceMaterial};

    fn material(id: &str, name: &str, density: Option<f64>) -> ReferenceMaterial {
        ReferenceMaterial {
            id: id.to_string(),
            display_name: name.to_string(),
            impact_factors: ImpactFactors::default(),
            density,
            density_range: None,
            unit: "kg".to_string(),
        }
    }

    fn catalog() -> ReferenceCatalog {
        let mut timber = material("06.012", "Brettschichtholz", None);
        timber.density_range = Some(DensityRange { min: 300.0, max: 500.0 });
        ReferenceCatalog::new(vec![
            material("01.002", "Hochbaubeton", Some(2400.0)),
            material("01.003", "Hochbaubeton", Some(2450.0)),
            material("01.099", "Hochbaubeton Spezial", None),
            timber,
            material("10.001", "Flachglas", Some(2500.0)),
        ])
    }

    #[test]
    fn ranking_is_descending_with_catalog_order_for_ties() {
        let catalog = catalog();
        let suggestions = FuzzyMatcher::default()
            .with_top_k(3)
            .rank_in_catalog("Hochbaubeton", &catalog);

        let ids: Vec<&str> = suggestions.iter().map(|s| s.reference_id.as_str()).collect();
        assert_eq!(ids, ["01.002", "01.003"]);
        assert_eq!(suggestions[0].score, 1.0);
    }

    #[test]
    fn materials_without_density_are_never_suggested() {
        let catalog = catalog();
        let suggestions = FuzzyMatcher::default()
            .with_top_k(5)
            .rank_in_catalog("Hochbaubeton Spezial", &catalog);

        assert!(suggestions.iter().all(|s| s.reference_id != "01.099"));
    }

    #[test]
    fn nothing_above_threshold_yields_empty_list() {
        let catalog = catalog();
        let suggestions = FuzzyMatcher::default()
            .with_min_score(0.9)
            .rank_in_catalog("Gipskarton", &catalog);
        assert!(suggestions.is_empty());
    }

    #[test]
    fn ranking_is_deterministic() {
        let catalog = catalog();
        let matcher = FuzzyMatcher::default().with_top_k(5).with_min_score(0.0);
        assert_eq!(
            matcher.rank_in_catalog("Holz Brettschicht", &catalog),
            matcher.rank_in_catalog("Holz Brettschicht", &catalog)
        );
    }

    #[test]
    fn injected_scorer_drives_the_ranking() {
        struct LengthScorer;
        impl SimilarityScorer for LengthScorer {
            fn score(&self, _lhs: &str, rhs: &str) -> f64 {
                1.0 / rhs.len() as f64
            }
        }

        let catalog = catalog();
        let suggestions = FuzzyMatcher::new(LengthScorer)
            .with_min_score(0.0)
            .rank_in_catalog("anything", &catalog);
        assert_eq!(suggestions[0].reference_id, "10.001");
    }

    #[test]
    fn suggested_mappings_skip_instances_without_match() {
        let catalog = catalog();
        let instances = vec![
            MaterialInstance::new("m1", "Hochbaubeton (1)", 2.0),
            MaterialInstance::new("m2", "Kupferblech", 0.1),
            MaterialInstance::new("m3", "Brettschichtholz", 4.0),
        ];

        let mappings = FuzzyMatcher::default().suggest_mappings(&instances, &catalog);
        assert_eq!(mappings.get("m1"), Some("01.002"));
        assert_eq!(mappings.get("m2"), None);
        assert_eq!(mappings.get("m3"), Some("06.012"));
    }
}
