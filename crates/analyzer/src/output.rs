use crate::aggregate::GroupStats;
use crate::error::AnalyzerError;
use analytics::StockMetrics;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub generated_date: DateTime<Utc>,
    /// Number of symbols that produced a metric record.
    pub total_stocks: usize,
    pub counts_by_exchange: BTreeMap<String, usize>,
}

/// The full analysis document published for the screener front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOutput {
    pub metadata: Metadata,
    pub sector_overview: BTreeMap<String, GroupStats>,
    pub industry_overview: BTreeMap<String, GroupStats>,
    pub stocks: Vec<StockMetrics>,
}

/// Writes the document as pretty-printed JSON, creating parent directories as needed.
pub fn export_json(output: &AnalysisOutput, path: &Path) -> Result<(), AnalyzerError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, output)?;
    writer.flush()?;

    tracing::info!(
        path = %path.display(),
        stocks = output.metadata.total_stocks,
        "Exported analysis output."
    );
    Ok(())
}
