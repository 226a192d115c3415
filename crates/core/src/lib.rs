//! Core utilities for the CRM search tools
//!
//! This crate provides shared functionality used by the search CLI:
//!
//! - **Error handling**: Errors with codes, context, and recovery suggestions
//! - **Configuration**: TOML-based configuration with validation
//! - **Validation**: Fluent validators and user input sanitization
//!
//! # Example
//!
//! ```rust,no_run
//! use crm_core::{config::Config, validation::sanitize_input};
//!
//! let config = Config::load(None).expect("Invalid configuration");
//! let query = sanitize_input("Ivanov <Group>", Some(config.schema.search.max_query_length), false)
//!     .expect("Rejected query");
//! assert_eq!(query, "Ivanov &lt;Group&gt;");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod validation;

pub use error::{Error, ErrorCode, Result, ResultExt};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, ConfigSchema, LoggingConfig, SearchConfig};
    pub use crate::error::{exit_codes, Error, ErrorCode, Result, ResultExt};
    pub use crate::validation::{sanitize_input, ValidationResult, Validator};
}
