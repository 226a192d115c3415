//! Configuration schema definitions

use crate::validation::{ValidationResult, Validator};
use serde::{Deserialize, Serialize};

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    /// Search thresholds and query limits
    #[serde(default)]
    pub search: SearchConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ConfigSchema {
    /// Check value ranges and cross-field constraints
    pub fn validate(&self) -> ValidationResult {
        let s = &self.search;
        Validator::new()
            .range("search.default_threshold", s.default_threshold, 0.0, 1.0)
            .range("search.object_threshold", s.object_threshold, 0.0, 1.0)
            .range("search.contractor_threshold", s.contractor_threshold, 0.0, 1.0)
            .range("search.request_threshold", s.request_threshold, 0.0, 1.0)
            .range("search.name_cutoff", s.name_cutoff, 0.0, 1.0)
            .custom("search.min_query_length", || {
                (s.min_query_length > s.max_query_length).then(|| {
                    format!(
                        "min_query_length ({}) exceeds max_query_length ({})",
                        s.min_query_length, s.max_query_length
                    )
                })
            })
            .required("logging.level", &self.logging.level)
            .validate()
    }
}

/// Search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Threshold for ad-hoc scoring and custom field lists
    pub default_threshold: f64,

    /// Threshold for object (site) searches
    pub object_threshold: f64,

    /// Threshold for contractor searches
    pub contractor_threshold: f64,

    /// Threshold for request searches
    pub request_threshold: f64,

    /// Queries shorter than this return no results
    pub min_query_length: usize,

    /// Longer queries are rejected
    pub max_query_length: usize,

    /// Drop Latin-1 supplement characters in token metrics
    pub force_ascii: bool,

    /// Minimum name similarity for quick ranking
    pub name_cutoff: f64,

    /// Maximum results from quick ranking
    pub name_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_threshold: 0.4,
            object_threshold: 0.4,
            contractor_threshold: 0.4,
            request_threshold: 0.3,
            min_query_length: 2,
            max_query_length: 100,
            force_ascii: true,
            name_cutoff: 0.6,
            name_limit: 5,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    pub level: String,

    /// Emit JSON lines instead of compact text
    pub json: bool,

    /// Include the event target
    pub show_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
            show_target: false,
        }
    }
}
