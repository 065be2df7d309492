use super::mappings::normalize_material_name;
use std::collections::HashMap;

/// String-similarity strategy used to rank catalog candidates.
///
/// Implementations return a score in `[0, 1]`, where `1` means identical.
/// Scores must be deterministic for identical inputs.
pub trait SimilarityScorer {
    fn score(&self, lhs: &str, rhs: &str) -> f64;
}

impl<F> SimilarityScorer for F
where
    F: Fn(&str, &str) -> f64,
{
    fn score(&self, lhs: &str, rhs: &str) -> f64 {
        self(lhs, rhs)
    }
}

/// Sørensen–Dice coefficient over per-word character bigrams.
#[derive(Debug, Clone, Copy, Default)]
pub struct BigramDiceScorer;

impl SimilarityScorer for BigramDiceScorer {
    fn score(&self, lhs: &str, rhs: &str) -> f64 {
        let lhs = canonical_words(lhs);
        let rhs = canonical_words(rhs);
        if lhs.is_empty() || rhs.is_empty() {
            return 0.0;
        }
        if lhs == rhs {
            return 1.0;
        }

        let lhs_bigrams = bigram_counts(&lhs);
        let rhs_bigrams = bigram_counts(&rhs);
        let lhs_total: usize = lhs_bigrams.values().sum();
        let rhs_total: usize = rhs_bigrams.values().sum();
        if lhs_total == 0 || rhs_total == 0 {
            return 0.0;
        }

        let shared: usize = lhs_bigrams
            .iter()
            .map(|(bigram, count)| (*count).min(rhs_bigrams.get(bigram).copied().unwrap_or(0)))
            .sum();

        (2 * shared) as f64 / (lhs_total + rhs_total) as f64
    }
}

fn canonical_words(value: &str) -> Vec<String> {
    normalize_material_name(value)
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn bigram_counts(words: &[String]) -> HashMap<(char, char), usize> {
    let mut counts = HashMap::new();
    for word in words {
        let chars: Vec<char> = word.chars().collect();
        for pair in chars.windows(2) {
            *counts.entry((pair[0], pair[1])).or_insert(0) += 1;
        }
    }
    counts
}
