//! Fuzzy search for CRM objects, contractors and requests.
//!
//! This crate provides:
//! - Multi-signal similarity scoring (edit distance, token and phonetic metrics)
//! - Multi-field search with best-field reporting
//! - Soundex and Metaphone encoders
//! - Quick name ranking for autocomplete lookups
//!
//! # Example
//!
//! ```
//! use crm_search::{search, EntityKind, SiteObject};
//!
//! let sites = vec![SiteObject {
//!     id: 1,
//!     name: "Ivanov Group".to_string(),
//!     address: Some("Lenina 5".to_string()),
//!     customer: None,
//!     phone: None,
//! }];
//!
//! let kind = EntityKind::Object;
//! let results = search("ivanov", &sites, kind.search_fields(), kind.default_threshold());
//! assert_eq!(results[0].field, "name");
//! ```

mod entity;
mod error;
mod fields;
pub mod fuzzy;
mod phonetic;
pub mod sequence;
mod similarity;

pub use entity::{Contractor, EntityKind, RequestDigest, SiteObject};
pub use error::{validate_threshold, PhoneticError, Result, SearchError, SearchErrorCode};
pub use fields::{name_similarity, rank_by_name, search, Fieldful, NameMatch, SearchResult};
pub use fuzzy::{levenshtein_distance, partial_ratio, ratio, token_set_ratio, token_sort_ratio};
pub use phonetic::{metaphone, soundex};
pub use similarity::{
    similarity_score, Breakdown, Explanation, Scorer, Weights, DEFAULT_THRESHOLD, PREFIX_BONUS,
    WORD_BONUS,
};
