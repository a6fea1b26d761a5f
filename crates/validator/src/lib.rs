//! # Hawk Data Validator
//!
//! Quality checks for collected stock data: metadata and price sanity, completeness of
//! the fundamental series, and reconciliation of quarterly sums against annual figures.
//! A second entry point checks what has already been persisted.
//!
//! Findings are advisory. A report with errors is marked invalid, but nothing here stops
//! the analysis from running.
//!
//! ## Public API
//!
//! - `DataValidator`: the checker, configured with the reconciliation tolerance.
//! - `ValidationReport`: the ordered errors and warnings for one symbol.

mod reconcile;
pub mod report;
pub mod validator;

pub use report::ValidationReport;
pub use validator::{DataValidator, DEFAULT_TOLERANCE_PCT};
