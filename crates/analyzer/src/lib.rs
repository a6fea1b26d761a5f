//! # Hawk Analyzer
//!
//! Runs the analytics engine over a whole universe of symbols and rolls the resulting
//! records up into sector and industry statistics.
//!
//! ## Public API
//!
//! - `Analyzer`: the batch runner. `run` stamps the output with the current time,
//!   `run_at` takes the timestamp explicitly so output can be reproduced exactly.
//! - `aggregate`: the group statistics on their own.
//! - `export_json`: writes an `AnalysisOutput` to disk.

use analytics::{AnalyticsEngine, StockMetrics};
use chrono::{DateTime, Utc};
use core_types::SymbolData;
use rayon::prelude::*;
use std::collections::BTreeMap;

pub mod aggregate;
pub mod error;
pub mod output;

pub use aggregate::{aggregate, Aggregates, GroupStats};
pub use error::AnalyzerError;
pub use output::{export_json, AnalysisOutput, Metadata};

/// Label used in `counts_by_exchange` for symbols without an exchange tag.
pub const UNKNOWN_EXCHANGE: &str = "Unknown";

/// A symbol whose analysis failed. It is left out of the output and the aggregates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolFailure {
    pub symbol: String,
    pub reason: String,
}

/// The result of one batch run.
#[derive(Debug, Clone)]
pub struct AnalysisRun {
    pub output: AnalysisOutput,
    pub failures: Vec<SymbolFailure>,
}

/// The batch analysis engine.
#[derive(Debug, Default)]
pub struct Analyzer {
    engine: AnalyticsEngine,
}

impl Analyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run(&self, universe: &[SymbolData]) -> AnalysisRun {
        self.run_at(universe, Utc::now())
    }

    /// Analyzes every symbol in parallel, then aggregates the successful records.
    ///
    /// Records keep the order of `universe`. A failing symbol never aborts the run.
    pub fn run_at(&self, universe: &[SymbolData], generated_date: DateTime<Utc>) -> AnalysisRun {
        tracing::info!(
            symbols = universe.len(),
            threads = rayon::current_num_threads(),
            "Starting analysis run."
        );

        let results: Vec<_> = universe
            .par_iter()
            .map(|data| (data.symbol(), self.engine.analyze_symbol(data)))
            .collect();

        let mut stocks: Vec<StockMetrics> = Vec::with_capacity(results.len());
        let mut failures = Vec::new();
        for (symbol, result) in results {
            match result {
                Ok(record) => stocks.push(record),
                Err(e) => {
                    tracing::warn!(symbol, error = %e, "Symbol analysis failed; omitting it.");
                    failures.push(SymbolFailure {
                        symbol: symbol.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let Aggregates {
            sector_overview,
            industry_overview,
        } = aggregate(&stocks);

        let metadata = Metadata {
            generated_date,
            total_stocks: stocks.len(),
            counts_by_exchange: count_by_exchange(&stocks),
        };

        tracing::info!(
            analyzed = stocks.len(),
            failed = failures.len(),
            sectors = sector_overview.len(),
            industries = industry_overview.len(),
            "Analysis run complete."
        );

        AnalysisRun {
            output: AnalysisOutput {
                metadata,
                sector_overview,
                industry_overview,
                stocks,
            },
            failures,
        }
    }
}

fn count_by_exchange(stocks: &[StockMetrics]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for stock in stocks {
        let label = stock
            .exchange
            .map(|e| e.as_str())
            .unwrap_or(UNKNOWN_EXCHANGE);
        *counts.entry(label.to_string()).or_insert(0) += 1;
    }
    counts
}
