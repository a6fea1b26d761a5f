//! # Hawk Core Types
//!
//! The shared vocabulary of the workspace: statement records, price and valuation
//! snapshots, listing metadata, and the per-symbol `SymbolData` bundle that the
//! analytics engine and the validator both consume.
//!
//! This crate has no knowledge of files, logging setup, or configuration.

pub mod dedup;
pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use dedup::{dedup_annual, dedup_quarterly};
pub use enums::{Exchange, FundamentalMetric};
pub use error::CoreError;
pub use structs::{
    AnnualRecord, Financials, PriceSnapshot, QuarterRecord, StockInfo, SymbolData,
    ValuationSnapshot,
};
