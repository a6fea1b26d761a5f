//! # Hawk Analytics Engine
//!
//! This crate turns one symbol's statement history and price snapshot into its
//! `StockMetrics` record: valuation ratios, multi-year growth, margins and their trends,
//! earnings consistency, and 52-week range positioning.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of files or
//!   configuration. It depends only on `core-types` (Layer 0).
//! - **Stateless Calculation:** The `AnalyticsEngine` is a stateless calculator. It reads a
//!   `SymbolData` bundle and produces a record without mutating anything, so the same
//!   input always yields the same output and symbols can be analyzed in parallel.
//! - **Degrade, Don't Fail:** A metric with missing or degenerate inputs is `None`. Only a
//!   missing price snapshot (or an unrepresentable number) fails the symbol.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: The main struct that contains the calculation logic.
//! - `metrics`: The individual primitives (LTM, CAGR, YoY, margin trend, consistency).
//! - `StockMetrics`: The per-symbol record and its nested blocks.
//! - `AnalyticsError`: The specific error types that can be returned from this crate.

pub mod engine;
pub mod error;
pub mod metrics;
pub mod report;

pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use metrics::MarginType;
pub use report::{
    GrowthMetrics, MarginMetrics, MarginTrend, PriceMetrics, QualityMetrics, StockMetrics,
    ValuationMetrics,
};
