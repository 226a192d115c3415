//! Weighted multi-signal similarity scoring.
//!
//! A query is scored against a text by blending eight string metrics with
//! fixed weights, then adding prefix and whole-word bonuses. Containment of
//! the query in the text always wins outright.

use crate::error::PhoneticError;
use crate::fuzzy::{levenshtein_distance, partial_ratio, ratio, token_set_ratio, token_sort_ratio};
use crate::phonetic::{metaphone, soundex};
use crate::sequence::sequence_ratio;
use serde::{Deserialize, Serialize};

/// Default minimum score for a match to be reported.
pub const DEFAULT_THRESHOLD: f64 = 0.4;

/// Bonus when the text starts with the query.
pub const PREFIX_BONUS: f64 = 0.1;

/// Maximum bonus for query words found verbatim in the text.
pub const WORD_BONUS: f64 = 0.2;

/// Blend weights for the individual metrics.
///
/// The defaults add up to 1.10; the final score is clamped after bonuses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    pub ratio: f64,
    pub partial: f64,
    pub token_sort: f64,
    pub token_set: f64,
    pub phonetic: f64,
    pub metaphone: f64,
    pub levenshtein: f64,
    pub sequence: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            ratio: 0.25,
            partial: 0.3,
            token_sort: 0.15,
            token_set: 0.15,
            phonetic: 0.1,
            metaphone: 0.05,
            levenshtein: 0.05,
            sequence: 0.05,
        }
    }
}

/// Per-metric sub-scores for one query/text pair, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Breakdown {
    pub ratio: f64,
    pub partial: f64,
    pub token_sort: f64,
    pub token_set: f64,
    pub phonetic: f64,
    pub metaphone: f64,
    pub levenshtein: f64,
    pub sequence: f64,
    pub prefix_bonus: f64,
    pub word_bonus: f64,
}

/// Full explanation of a score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Explanation {
    /// True when the query is contained in the text
    pub contained: bool,
    /// Sub-scores; all zero when `contained` is set
    pub breakdown: Breakdown,
    /// Combined score clamped to at most 1.0, before the threshold check
    pub combined: f64,
}

/// Multi-signal similarity scorer.
///
/// # Example
/// ```
/// use crm_search::Scorer;
///
/// let scorer = Scorer::default();
/// assert_eq!(scorer.score("Moscow", "Moscow Tower", 0.4), 1.0);
/// assert_eq!(scorer.score("xyz123", "completely unrelated text", 0.4), 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scorer {
    weights: Weights,
    force_ascii: bool,
}

impl Default for Scorer {
    fn default() -> Self {
        Self {
            weights: Weights::default(),
            force_ascii: true,
        }
    }
}

impl Scorer {
    /// Creates a scorer with the default weights.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the blend weights.
    pub fn with_weights(mut self, weights: Weights) -> Self {
        self.weights = weights;
        self
    }

    /// Controls whether token metrics drop Latin-1 supplement characters.
    pub fn with_force_ascii(mut self, force_ascii: bool) -> Self {
        self.force_ascii = force_ascii;
        self
    }

    /// Current blend weights.
    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    /// Scores `query` against `text`.
    ///
    /// Returns 0.0 for empty inputs and for scores below `threshold`;
    /// otherwise a value in `[threshold, 1.0]`.
    pub fn score(&self, query: &str, text: &str, threshold: f64) -> f64 {
        match self.explain(query, text) {
            Some(explanation) if explanation.contained => 1.0,
            Some(explanation) if explanation.combined >= threshold => explanation.combined,
            _ => 0.0,
        }
    }

    /// Computes every sub-score without applying a threshold.
    ///
    /// Returns `None` when either input is empty.
    pub fn explain(&self, query: &str, text: &str) -> Option<Explanation> {
        if query.is_empty() || text.is_empty() {
            return None;
        }

        let query_lower = query.to_lowercase();
        let text_lower = text.to_lowercase();

        if text_lower.contains(&query_lower) {
            return Some(Explanation {
                contained: true,
                breakdown: Breakdown::default(),
                combined: 1.0,
            });
        }

        let q = query_lower.as_str();
        let t = text_lower.as_str();

        let breakdown = Breakdown {
            ratio: percent(ratio(q, t)),
            partial: percent(partial_ratio(q, t)),
            token_sort: percent(token_sort_ratio(q, t, self.force_ascii)),
            token_set: percent(token_set_ratio(q, t, self.force_ascii)),
            phonetic: codes_agree("soundex", soundex, q, t),
            metaphone: codes_agree("metaphone", metaphone, q, t),
            levenshtein: levenshtein_score(q, t),
            sequence: sequence_ratio(q, t),
            prefix_bonus: if t.starts_with(q) { PREFIX_BONUS } else { 0.0 },
            word_bonus: word_bonus(q, t),
        };

        let w = &self.weights;
        let weighted = breakdown.ratio * w.ratio
            + breakdown.partial * w.partial
            + breakdown.token_sort * w.token_sort
            + breakdown.token_set * w.token_set
            + breakdown.phonetic * w.phonetic
            + breakdown.metaphone * w.metaphone
            + breakdown.levenshtein * w.levenshtein
            + breakdown.sequence * w.sequence;

        let combined = (weighted + breakdown.prefix_bonus + breakdown.word_bonus).min(1.0);

        Some(Explanation {
            contained: false,
            breakdown,
            combined,
        })
    }
}

/// Scores `query` against `text` with the default scorer.
///
/// # Example
/// ```
/// use crm_search::similarity_score;
///
/// let score = similarity_score("Pulsar", "Pulsr Ltd", 0.4);
/// assert!(score >= 0.4 && score < 1.0);
/// ```
pub fn similarity_score(query: &str, text: &str, threshold: f64) -> f64 {
    Scorer::default().score(query, text, threshold)
}

#[inline]
fn percent(value: u8) -> f64 {
    f64::from(value) / 100.0
}

/// 1.0 when both strings encode to the same code, 0.0 otherwise.
fn codes_agree(
    name: &'static str,
    encode: fn(&str) -> Result<String, PhoneticError>,
    a: &str,
    b: &str,
) -> f64 {
    match (encode(a), encode(b)) {
        (Ok(code_a), Ok(code_b)) => {
            if code_a == code_b { 1.0 } else { 0.0 }
        }
        (Err(err), _) | (_, Err(err)) => {
            tracing::trace!(encoder = name, error = %err, "phonetic sub-score fell back to zero");
            0.0
        }
    }
}

/// `1 - distance / longest length`, measured in characters.
fn levenshtein_score(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 0.0;
    }
    let distance = levenshtein_distance(a, b);
    (1.0 - distance as f64 / max_len as f64).clamp(0.0, 1.0)
}

/// Share of query words present verbatim among the text words, scaled.
fn word_bonus(query: &str, text: &str) -> f64 {
    let query_words: Vec<&str> = query.split_whitespace().collect();
    if query_words.is_empty() {
        return 0.0;
    }
    let text_words: Vec<&str> = text.split_whitespace().collect();

    let matches = query_words
        .iter()
        .filter(|word| text_words.contains(word))
        .count();

    if matches == 0 {
        return 0.0;
    }
    (matches as f64 / query_words.len() as f64).min(1.0) * WORD_BONUS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_overshoot() {
        let w = Weights::default();
        let sum = w.ratio
            + w.partial
            + w.token_sort
            + w.token_set
            + w.phonetic
            + w.metaphone
            + w.levenshtein
            + w.sequence;
        assert!((sum - 1.1).abs() < 1e-9);
    }

    #[test]
    fn test_substring_short_circuits() {
        assert_eq!(similarity_score("Moscow", "Moscow Tower", 0.4), 1.0);
        assert_eq!(similarity_score("TOWER", "moscow tower", 1.0), 1.0);
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(similarity_score("", "text", 0.0), 0.0);
        assert_eq!(similarity_score("query", "", 0.0), 0.0);
        assert!(Scorer::default().explain("", "").is_none());
    }

    #[test]
    fn test_close_fuzzy_match() {
        let score = similarity_score("Pulsar", "Pulsr Ltd", 0.4);
        assert!(score >= 0.4, "score was {}", score);
        assert!(score < 1.0, "score was {}", score);
    }

    #[test]
    fn test_close_fuzzy_match_breakdown() {
        let explanation = Scorer::default().explain("Pulsar", "Pulsr Ltd").unwrap();
        let b = explanation.breakdown;
        assert!(!explanation.contained);
        assert_eq!(b.ratio, 0.67);
        assert_eq!(b.partial, 0.91);
        assert_eq!(b.phonetic, 1.0);
        assert_eq!(b.metaphone, 0.0);
        assert_eq!(b.prefix_bonus, 0.0);
        assert_eq!(b.word_bonus, 0.0);
        assert!((b.sequence - 10.0 / 15.0).abs() < 1e-12);
        assert!((b.levenshtein - (1.0 - 5.0 / 9.0)).abs() < 1e-12);
    }

    #[test]
    fn test_unrelated_below_threshold() {
        assert_eq!(similarity_score("xyz123", "completely unrelated text", 0.4), 0.0);
    }

    #[test]
    fn test_case_insensitive() {
        let scorer = Scorer::default();
        assert_eq!(
            scorer.score("Abc", "abcdef", 0.4),
            scorer.score("abc", "ABCDEF", 0.4)
        );
        assert_eq!(
            scorer.score("Pulsar", "PULSR LTD", 0.0),
            scorer.score("pulsar", "pulsr ltd", 0.0)
        );
    }

    #[test]
    fn test_word_bonus() {
        assert_eq!(word_bonus("ivanov group", "group of ivanov"), 0.2);
        assert_eq!(word_bonus("ivanov petrov", "ivanov llc"), 0.1);
        assert_eq!(word_bonus("ivanov", "petrov"), 0.0);
        assert_eq!(word_bonus("   ", "petrov"), 0.0);
    }

    #[test]
    fn test_word_reorder_scores_high() {
        let score = similarity_score("tower moscow", "moscow tower", 0.4);
        assert!(score >= 0.8, "score was {}", score);
    }

    #[test]
    fn test_levenshtein_score_bounds() {
        assert_eq!(levenshtein_score("abc", "abc"), 1.0);
        assert_eq!(levenshtein_score("abc", "xyz"), 0.0);
        assert_eq!(levenshtein_score("", ""), 0.0);
    }

    #[test]
    fn test_codes_agree_error_is_zero() {
        assert_eq!(codes_agree("soundex", soundex, "", "robert"), 0.0);
        assert_eq!(codes_agree("soundex", soundex, "robert", "rupert"), 1.0);
    }

    #[test]
    fn test_custom_weights() {
        let scorer = Scorer::default().with_weights(Weights {
            ratio: 0.0,
            partial: 0.0,
            token_sort: 0.0,
            token_set: 0.0,
            phonetic: 0.0,
            metaphone: 0.0,
            levenshtein: 0.0,
            sequence: 0.0,
        });
        assert_eq!(scorer.score("pulsar", "pulsr ltd", 0.0), 0.0);
        assert_eq!(scorer.score("pulsar", "pulsar ltd", 0.0), 1.0);
    }
}
