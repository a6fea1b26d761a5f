//! # Hawk Data Store
//!
//! Loads the collector's CSV exports and hands the rest of the system one immutable
//! `SymbolData` bundle per symbol.
//!
//! ## Architectural Principles
//!
//! - **Adapter:** This crate is the only place that knows about file names, column names,
//!   and the quirks of the exported cell formats. Everything downstream sees typed records.
//! - **Load Once:** `CsvDataStore::load` reads everything up front. Afterwards the store is
//!   read-only.
//!
//! ## Public API
//!
//! - `CsvDataStore`: the loaded store, with `universe` and `symbol_data` accessors.
//! - `StockStore` / `StoredStock`: the read interface used by the stored-data check.
//! - `DataStoreError`: the specific error types that can be returned from this crate.

pub mod error;
mod rows;
pub mod store;

pub use error::DataStoreError;
pub use store::{CsvDataStore, StockStore, StoredStock};
