use crate::error::DataStoreError;
use crate::rows::{AnnualRow, PriceRow, QuarterRow, StockRow, ValuationRow};
use core_types::{
    AnnualRecord, PriceSnapshot, QuarterRecord, StockInfo, SymbolData, ValuationSnapshot,
};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const STOCKS_FILE: &str = "stocks.csv";
pub const PRICE_FILE: &str = "price_history.csv";
pub const QUARTERLY_FILE: &str = "quarterly_fundamentals.csv";
pub const ANNUAL_FILE: &str = "annual_fundamentals.csv";
pub const VALUATION_FILE: &str = "valuation_data.csv";

/// What has been persisted for one symbol, as seen by the stored-data check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredStock {
    pub info: StockInfo,
    pub price_records: usize,
    pub quarterly_records: usize,
    pub annual_records: usize,
}

/// Read access to persisted stock data.
pub trait StockStore {
    /// Returns `Ok(None)` when the symbol is not in the store.
    fn stored_stock(&self, symbol: &str) -> Result<Option<StoredStock>, DataStoreError>;
}

/// An in-memory store loaded from the collector's CSV exports.
///
/// `stocks.csv` defines the universe. Rows in the other files whose symbol is not listed
/// there are ignored.
#[derive(Debug, Clone, Default)]
pub struct CsvDataStore {
    stocks: BTreeMap<String, StockInfo>,
    prices: BTreeMap<String, Vec<PriceSnapshot>>,
    quarterly: BTreeMap<String, Vec<QuarterRecord>>,
    annual: BTreeMap<String, Vec<AnnualRecord>>,
    valuations: BTreeMap<String, ValuationSnapshot>,
    skipped_rows: usize,
}

impl CsvDataStore {
    /// Loads every export file from `dir`. `valuation_data.csv` is optional.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, DataStoreError> {
        let dir = dir.as_ref();
        tracing::info!(dir = %dir.display(), "Loading data store.");

        let mut stocks = BTreeMap::new();
        for (_, row) in read_rows::<StockRow>(&required(dir, STOCKS_FILE)?)? {
            let info = row.into_info();
            stocks.insert(info.symbol.clone(), info);
        }

        let mut skipped = 0usize;
        let mut prices: BTreeMap<String, Vec<PriceSnapshot>> = BTreeMap::new();
        for (line, row) in read_rows::<PriceRow>(&required(dir, PRICE_FILE)?)? {
            let symbol = row.symbol.trim().to_string();
            match row.into_snapshot() {
                Ok(snapshot) => prices.entry(symbol).or_default().push(snapshot),
                Err(reason) => {
                    skip_row(PRICE_FILE, line, &symbol, &reason);
                    skipped += 1;
                }
            }
        }

        let mut quarterly: BTreeMap<String, Vec<QuarterRecord>> = BTreeMap::new();
        let mut undated = 0usize;
        for (line, row) in read_rows::<QuarterRow>(&required(dir, QUARTERLY_FILE)?)? {
            let symbol = row.symbol.trim().to_string();
            match row.into_record() {
                Ok(Some(record)) => quarterly.entry(symbol).or_default().push(record),
                Ok(None) => undated += 1,
                Err(reason) => {
                    skip_row(QUARTERLY_FILE, line, &symbol, &reason);
                    skipped += 1;
                }
            }
        }

        let mut annual: BTreeMap<String, Vec<AnnualRecord>> = BTreeMap::new();
        for (line, row) in read_rows::<AnnualRow>(&required(dir, ANNUAL_FILE)?)? {
            let symbol = row.symbol.trim().to_string();
            match row.into_record() {
                Ok(Some(record)) => annual.entry(symbol).or_default().push(record),
                Ok(None) => undated += 1,
                Err(reason) => {
                    skip_row(ANNUAL_FILE, line, &symbol, &reason);
                    skipped += 1;
                }
            }
        }

        if undated > 0 {
            tracing::warn!(undated, "Skipped fundamentals rows without a period end date.");
        }

        let mut valuations = BTreeMap::new();
        let valuation_path = dir.join(VALUATION_FILE);
        if valuation_path.exists() {
            for (line, row) in read_rows::<ValuationRow>(&valuation_path)? {
                let symbol = row.symbol.trim().to_string();
                match row.into_snapshot() {
                    Ok(snapshot) => {
                        valuations.insert(symbol, snapshot);
                    }
                    Err(reason) => {
                        skip_row(VALUATION_FILE, line, &symbol, &reason);
                        skipped += 1;
                    }
                }
            }
        } else {
            tracing::info!("No valuation file present; valuation ratios will be unavailable.");
        }

        let store = Self {
            stocks,
            prices,
            quarterly,
            annual,
            valuations,
            skipped_rows: skipped,
        };
        tracing::info!(
            stocks = store.stocks.len(),
            skipped_rows = skipped,
            "Data store loaded."
        );
        Ok(store)
    }

    /// All listed symbols in ascending order.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.stocks.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.stocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stocks.is_empty()
    }

    /// Rows dropped at load time because a cell could not be parsed.
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    /// Builds the analysis bundle for one symbol, or `None` if it is not listed.
    ///
    /// The price snapshot is the row with the latest `data_date`.
    pub fn symbol_data(&self, symbol: &str) -> Option<SymbolData> {
        let info = self.stocks.get(symbol)?.clone();
        let price = self
            .prices
            .get(symbol)
            .and_then(|rows| rows.iter().max_by_key(|p| p.as_of_date))
            .cloned();

        Some(SymbolData::new(
            info,
            self.quarterly.get(symbol).cloned().unwrap_or_default(),
            self.annual.get(symbol).cloned().unwrap_or_default(),
            price,
            self.valuations.get(symbol).cloned(),
        ))
    }

    /// Every listed symbol's bundle, in symbol order.
    pub fn universe(&self) -> Vec<SymbolData> {
        self.symbols()
            .filter_map(|symbol| self.symbol_data(symbol))
            .collect()
    }
}

impl StockStore for CsvDataStore {
    fn stored_stock(&self, symbol: &str) -> Result<Option<StoredStock>, DataStoreError> {
        let Some(info) = self.stocks.get(symbol) else {
            return Ok(None);
        };
        let count = |len: Option<usize>| len.unwrap_or(0);

        Ok(Some(StoredStock {
            info: info.clone(),
            price_records: count(self.prices.get(symbol).map(Vec::len)),
            quarterly_records: count(self.quarterly.get(symbol).map(Vec::len)),
            annual_records: count(self.annual.get(symbol).map(Vec::len)),
        }))
    }
}

fn required(dir: &Path, file: &str) -> Result<PathBuf, DataStoreError> {
    let path = dir.join(file);
    if path.exists() {
        Ok(path)
    } else {
        Err(DataStoreError::MissingFile(path))
    }
}

/// Reads every row of a CSV file along with its line number.
fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<(u64, T)>, DataStoreError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let line = record.position().map_or(0, |p| p.line());
        let row: T = record.deserialize(Some(&headers))?;
        rows.push((line, row));
    }

    tracing::debug!(path = %path.display(), rows = rows.len(), "Read CSV file.");
    Ok(rows)
}

/// Logs a row that cannot be converted. Only that row is lost; the rest of the file and
/// every other symbol still load.
fn skip_row(file: &str, line: u64, symbol: &str, reason: &str) {
    tracing::warn!(file, line, symbol, reason, "Skipping malformed row.");
}
