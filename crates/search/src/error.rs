//! Error types for the search crate.

use thiserror::Error;

/// Result type alias for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;

/// Errors that can occur around search operations.
///
/// Scoring itself never fails; these cover the inputs callers hand in.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Threshold outside [0, 1]
    #[error("Invalid threshold: {0} (expected a value between 0 and 1)")]
    InvalidThreshold(f64),

    /// Unknown entity kind
    #[error("Unknown entity kind: {0}")]
    UnknownEntity(String),
}

/// Failures of the phonetic encoders.
///
/// The scorer treats a failed encoding as a zero sub-score.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhoneticError {
    /// Nothing to encode
    #[error("empty input")]
    EmptyInput,
}

/// Error code for integration with crm-core error handling.
/// Range: 12xxx for search errors.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchErrorCode {
    /// Threshold outside [0, 1]
    InvalidThreshold = 12001,
    /// Unknown entity kind
    UnknownEntity = 12002,
}

impl SearchError {
    /// Returns the error code for this error.
    pub fn code(&self) -> SearchErrorCode {
        match self {
            SearchError::InvalidThreshold(_) => SearchErrorCode::InvalidThreshold,
            SearchError::UnknownEntity(_) => SearchErrorCode::UnknownEntity,
        }
    }
}

/// Checks that a threshold lies in [0, 1].
pub fn validate_threshold(threshold: f64) -> Result<f64> {
    if (0.0..=1.0).contains(&threshold) {
        Ok(threshold)
    } else {
        Err(SearchError::InvalidThreshold(threshold))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_bounds() {
        assert!(validate_threshold(0.0).is_ok());
        assert!(validate_threshold(1.0).is_ok());
        assert!(validate_threshold(0.4).is_ok());
        assert!(validate_threshold(-0.1).is_err());
        assert!(validate_threshold(1.5).is_err());
        assert!(validate_threshold(f64::NAN).is_err());
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            SearchError::InvalidThreshold(2.0).code(),
            SearchErrorCode::InvalidThreshold
        );
        assert_eq!(
            SearchError::UnknownEntity("manufacturer".into()).code(),
            SearchErrorCode::UnknownEntity
        );
        assert_eq!(SearchErrorCode::UnknownEntity as u32, 12002);
    }
}
