//! Multi-field search over heterogeneous records.

use crate::sequence::sequence_ratio;
use crate::similarity::Scorer;
use serde::Serialize;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

/// Records that expose named text fields to the search.
///
/// Returning `None` (or an empty string) means the field is absent and is
/// skipped rather than scored.
pub trait Fieldful {
    /// Text value of the field called `name`, if present.
    fn get_field(&self, name: &str) -> Option<Cow<'_, str>>;
}

impl<T: Fieldful + ?Sized> Fieldful for &T {
    fn get_field(&self, name: &str) -> Option<Cow<'_, str>> {
        (**self).get_field(name)
    }
}

impl Fieldful for HashMap<String, String> {
    fn get_field(&self, name: &str) -> Option<Cow<'_, str>> {
        self.get(name).map(|v| Cow::Borrowed(v.as_str()))
    }
}

impl Fieldful for BTreeMap<String, String> {
    fn get_field(&self, name: &str) -> Option<Cow<'_, str>> {
        self.get(name).map(|v| Cow::Borrowed(v.as_str()))
    }
}

/// JSON objects coerce their values to text.
///
/// Falsy values (`null`, `false`, `0`, `""`, `[]`, `{}`) count as absent.
/// `true` renders as `True`, numbers in decimal, nested values as JSON.
impl Fieldful for Value {
    fn get_field(&self, name: &str) -> Option<Cow<'_, str>> {
        let value = self.as_object()?.get(name)?;
        match value {
            Value::Null | Value::Bool(false) => None,
            Value::Bool(true) => Some(Cow::Borrowed("True")),
            Value::Number(n) if n.as_f64() == Some(0.0) => None,
            Value::Number(n) => Some(Cow::Owned(n.to_string())),
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(Cow::Borrowed(s.as_str())),
            Value::Array(a) if a.is_empty() => None,
            Value::Object(o) if o.is_empty() => None,
            other => Some(Cow::Owned(other.to_string())),
        }
    }
}

/// A ranked match.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult<'a, T> {
    /// The matched item
    pub item: &'a T,
    /// Best score across the searched fields, in [threshold, 1]
    pub score: f64,
    /// Field that produced the best score
    pub field: &'a str,
}

impl Scorer {
    /// Searches `items` across `fields`, best matches first.
    ///
    /// Each item is represented by its best-scoring field; the first field
    /// wins ties. Items with no field reaching `threshold` are left out.
    /// Equal scores keep the input order.
    pub fn search<'a, T, F>(
        &self,
        query: &str,
        items: &'a [T],
        fields: &'a [F],
        threshold: f64,
    ) -> Vec<SearchResult<'a, T>>
    where
        T: Fieldful + Sync,
        F: AsRef<str> + Sync,
    {
        #[cfg(feature = "parallel")]
        let mut results: Vec<SearchResult<'a, T>> = {
            use rayon::prelude::*;
            items
                .par_iter()
                .filter_map(|item| self.best_field(query, item, fields, threshold))
                .collect()
        };

        #[cfg(not(feature = "parallel"))]
        let mut results: Vec<SearchResult<'a, T>> = items
            .iter()
            .filter_map(|item| self.best_field(query, item, fields, threshold))
            .collect();

        results.sort_by(|a, b| b.score.total_cmp(&a.score));

        tracing::debug!(
            query,
            items = items.len(),
            fields = fields.len(),
            matches = results.len(),
            threshold,
            "search completed"
        );

        results
    }

    fn best_field<'a, T, F>(
        &self,
        query: &str,
        item: &'a T,
        fields: &'a [F],
        threshold: f64,
    ) -> Option<SearchResult<'a, T>>
    where
        T: Fieldful,
        F: AsRef<str>,
    {
        let mut best: Option<(f64, &'a str)> = None;

        for field in fields {
            let name = field.as_ref();
            let Some(value) = item.get_field(name) else {
                continue;
            };
            if value.is_empty() {
                continue;
            }

            let score = self.score(query, &value, threshold);
            if score > best.map_or(0.0, |(s, _)| s) {
                best = Some((score, name));
            }
        }

        best.filter(|(score, _)| *score >= threshold)
            .map(|(score, field)| SearchResult { item, score, field })
    }
}

/// Searches `items` across `fields` with the default scorer.
///
/// # Example
/// ```
/// use crm_search::search;
/// use serde_json::json;
///
/// let items = vec![
///     json!({"name": "Ivanov Group"}),
///     json!({"name": "Petrov LLC"}),
/// ];
/// let results = search("Ivanov", &items, &["name"], 0.4);
/// assert_eq!(results.len(), 1);
/// assert_eq!(results[0].score, 1.0);
/// ```
pub fn search<'a, T, F>(
    query: &str,
    items: &'a [T],
    fields: &'a [F],
    threshold: f64,
) -> Vec<SearchResult<'a, T>>
where
    T: Fieldful + Sync,
    F: AsRef<str> + Sync,
{
    Scorer::default().search(query, items, fields, threshold)
}

/// Case-insensitive sequence similarity of two names, in [0, 1].
pub fn name_similarity(a: &str, b: &str) -> f64 {
    sequence_ratio(&a.to_lowercase(), &b.to_lowercase())
}

/// A quick name lookup result.
#[derive(Debug, Clone, Serialize)]
pub struct NameMatch<'a, T> {
    pub item: &'a T,
    pub similarity: f64,
}

/// Ranks items by `name_similarity` of their `name` field.
///
/// Keeps items at or above `cutoff`, best first, at most `limit` of them.
pub fn rank_by_name<'a, T: Fieldful>(
    query: &str,
    items: &'a [T],
    cutoff: f64,
    limit: usize,
) -> Vec<NameMatch<'a, T>> {
    let mut matches: Vec<NameMatch<'a, T>> = items
        .iter()
        .filter_map(|item| {
            let name = item.get_field("name")?;
            let similarity = name_similarity(query, &name);
            (similarity >= cutoff).then_some(NameMatch { item, similarity })
        })
        .collect();

    matches.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    matches.truncate(limit);
    matches
}
