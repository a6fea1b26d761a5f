//! The stored-data check, run against an in-memory store.

use core_types::{Exchange, StockInfo};
use datastore::{DataStoreError, StockStore, StoredStock};
use std::collections::HashMap;
use validator::DataValidator;

#[derive(Default)]
struct MemoryStore {
    stocks: HashMap<String, StoredStock>,
}

impl MemoryStore {
    fn with(mut self, stock: StoredStock) -> Self {
        self.stocks.insert(stock.info.symbol.clone(), stock);
        self
    }
}

impl StockStore for MemoryStore {
    fn stored_stock(&self, symbol: &str) -> Result<Option<StoredStock>, DataStoreError> {
        Ok(self.stocks.get(symbol).cloned())
    }
}

struct UnreadableStore;

impl StockStore for UnreadableStore {
    fn stored_stock(&self, _symbol: &str) -> Result<Option<StoredStock>, DataStoreError> {
        Err(DataStoreError::Io(std::io::Error::other("disk gone")))
    }
}

fn stored(
    symbol: &str,
    company: Option<&str>,
    exchange: Option<Exchange>,
    counts: [usize; 3],
) -> StoredStock {
    StoredStock {
        info: StockInfo {
            symbol: symbol.to_string(),
            company_name: company.map(str::to_string),
            exchange,
            ..StockInfo::default()
        },
        price_records: counts[0],
        quarterly_records: counts[1],
        annual_records: counts[2],
    }
}

#[test]
fn complete_stock_is_valid() {
    let store = MemoryStore::default().with(stored(
        "7010.SR",
        Some("STC"),
        Some(Exchange::Tadawul),
        [1, 8, 4],
    ));

    let report = DataValidator::default().validate_stored_data(&store, "7010.SR").unwrap();

    assert!(report.is_valid);
    assert!(report.warnings.is_empty());
}

#[test]
fn unknown_stock_stops_the_check() {
    let store = MemoryStore::default();

    let report = DataValidator::default().validate_stored_data(&store, "7010.SR").unwrap();

    assert!(!report.is_valid);
    assert_eq!(report.errors, vec!["Stock not found in data store".to_string()]);
    assert!(report.warnings.is_empty());
}

#[test]
fn gaps_in_stored_data() {
    let store = MemoryStore::default().with(stored("9510.SR", None, None, [0, 0, 2]));

    let report = DataValidator::default().validate_stored_data(&store, "9510.SR").unwrap();

    assert_eq!(report.errors, vec!["Company name is missing in data store".to_string()]);
    assert_eq!(
        report.warnings,
        vec![
            "Exchange is missing in data store".to_string(),
            "No price history in data store".to_string(),
            "No quarterly fundamentals in data store".to_string(),
        ]
    );
}

#[test]
fn store_failures_are_propagated() {
    let result = DataValidator::default().validate_stored_data(&UnreadableStore, "7010.SR");

    assert!(matches!(result, Err(DataStoreError::Io(_))));
}
