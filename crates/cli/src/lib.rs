//! Terminal output helpers for the CRM search tools
//!
//! Provides shared CLI functionality:
//! - Status messages
//! - Score and match formatting
//! - Error rendering

#![warn(missing_docs)]

pub mod output;
