use crate::reconcile::reconcile;
use crate::report::ValidationReport;
use core_types::{AnnualRecord, Exchange, PriceSnapshot, QuarterRecord, StockInfo, SymbolData};
use datastore::{DataStoreError, StockStore};
use rust_decimal::Decimal;

/// Default allowed gap, in percent, between a quarterly sum and its annual figure.
pub const DEFAULT_TOLERANCE_PCT: Decimal = Decimal::TWO;

/// Checks collected data for completeness and cross-period consistency.
///
/// The validator is stateless; the same input always yields the same report. Check order
/// only affects the order of messages.
#[derive(Debug, Clone)]
pub struct DataValidator {
    tolerance_pct: Decimal,
}

impl Default for DataValidator {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE_PCT)
    }
}

impl DataValidator {
    pub fn new(tolerance_pct: Decimal) -> Self {
        tracing::debug!(%tolerance_pct, "DataValidator initialized.");
        Self { tolerance_pct }
    }

    pub fn tolerance_pct(&self) -> Decimal {
        self.tolerance_pct
    }

    /// Validates everything collected for one symbol.
    ///
    /// `exchange` selects the reconciliation rules: secondary-market symbols report
    /// semiannually, so their quarterly and annual series are not compared.
    pub fn validate_collected_data(
        &self,
        data: &SymbolData,
        exchange: Exchange,
    ) -> ValidationReport {
        tracing::info!(symbol = data.symbol(), %exchange, "Validating collected data.");
        let mut report = ValidationReport::new(data.symbol());

        check_stock_info(data.info(), &mut report);
        match data.price() {
            Some(price) => {
                check_current_price(price, &mut report);
                check_lookback_prices(price, &mut report);
                check_high_low(price, &mut report);
            }
            None => report.add_error("Current price data is missing"),
        }
        check_quarterly(data.quarterly(), &mut report);
        check_annual(data.annual(), &mut report);

        if exchange.is_secondary_market() {
            tracing::info!(
                symbol = data.symbol(),
                "Skipping quarterly vs annual reconciliation; \
                 secondary market reports semiannually."
            );
        } else if !data.quarterly().is_empty() && !data.annual().is_empty() {
            reconcile(data, self.tolerance_pct, &mut report);
        }

        tracing::info!(
            symbol = data.symbol(),
            is_valid = report.is_valid,
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            "Validation complete."
        );
        report
    }

    /// Checks what the store holds for `symbol`. No reconciliation is performed here.
    ///
    /// Returns `Err` only when the store itself cannot be read.
    pub fn validate_stored_data<S>(
        &self,
        store: &S,
        symbol: &str,
    ) -> Result<ValidationReport, DataStoreError>
    where
        S: StockStore + ?Sized,
    {
        tracing::info!(symbol, "Validating stored data.");
        let mut report = ValidationReport::new(symbol);

        let Some(stored) = store.stored_stock(symbol)? else {
            report.add_error("Stock not found in data store");
            return Ok(report);
        };

        if is_blank(&stored.info.company_name) {
            report.add_error("Company name is missing in data store");
        }
        if stored.info.exchange.is_none() {
            report.add_warning("Exchange is missing in data store");
        }
        if stored.price_records == 0 {
            report.add_warning("No price history in data store");
        }
        if stored.quarterly_records == 0 {
            report.add_warning("No quarterly fundamentals in data store");
        }
        if stored.annual_records == 0 {
            report.add_warning("No annual fundamentals in data store");
        }

        tracing::info!(
            symbol,
            price_records = stored.price_records,
            quarterly_records = stored.quarterly_records,
            annual_records = stored.annual_records,
            "Stored data status."
        );
        Ok(report)
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|s| s.trim().is_empty())
}

fn check_stock_info(info: &StockInfo, report: &mut ValidationReport) {
    if is_blank(&info.company_name) {
        report.add_error("Company name is missing");
    }
    if is_blank(&info.sector) {
        report.add_warning("Sector is missing");
    }
    if is_blank(&info.industry) {
        report.add_warning("Industry is missing");
    }
}

fn check_current_price(price: &PriceSnapshot, report: &mut ValidationReport) {
    match price.last_close {
        None => report.add_error("Last close price is missing"),
        Some(close) if close <= Decimal::ZERO => {
            report.add_error(format!("Last close price is invalid: {close}"))
        }
        Some(_) => {}
    }

    if price.as_of_date.is_none() {
        report.add_error("Price data date is missing");
    }
}

fn check_lookback_prices(price: &PriceSnapshot, report: &mut ValidationReport) {
    for months in PriceSnapshot::LOOKBACK_MONTHS {
        match price.price_months_ago(months) {
            None => report.add_warning(format!("Historical price for {months}m ago is missing")),
            Some(p) if p <= Decimal::ZERO => {
                report.add_error(format!("Historical price for {months}m ago is invalid: {p}"))
            }
            Some(_) => {}
        }
    }
}

fn check_high_low(price: &PriceSnapshot, report: &mut ValidationReport) {
    for (label, value) in [
        ("52-week high", price.week_52_high),
        ("52-week low", price.week_52_low),
    ] {
        match value {
            None => report.add_warning(format!("{label} is missing")),
            Some(v) if v <= Decimal::ZERO => report.add_error(format!("{label} is invalid: {v}")),
            Some(_) => {}
        }
    }

    for (label, high, low) in [
        ("52-week", price.week_52_high, price.week_52_low),
        ("3-year", price.year_3_high, price.year_3_low),
        ("5-year", price.year_5_high, price.year_5_low),
    ] {
        if let (Some(high), Some(low)) = (high, low) {
            if high < low {
                report.add_error(format!("{label} high ({high}) is less than low ({low})"));
            }
        }
    }
}

fn check_quarterly(quarters: &[QuarterRecord], report: &mut ValidationReport) {
    if quarters.is_empty() {
        report.add_warning("No quarterly fundamental data available");
        return;
    }

    for quarter in quarters {
        if quarter.fiscal_year.is_none() {
            report.add_error("Quarterly record missing fiscal_year");
        }
        match quarter.fiscal_quarter {
            None => report.add_error("Quarterly record missing fiscal_quarter"),
            Some(q) if !(1..=4).contains(&q) => {
                report.add_error(format!("Invalid fiscal quarter: {q}"))
            }
            Some(_) => {}
        }

        if !quarter.financials.has_headline_data() {
            report.add_warning(format!(
                "Q{} {} has no financial data",
                display_or_unknown(quarter.fiscal_quarter),
                display_or_unknown(quarter.fiscal_year),
            ));
        }
    }
}

fn check_annual(years: &[AnnualRecord], report: &mut ValidationReport) {
    if years.is_empty() {
        report.add_warning("No annual fundamental data available");
        return;
    }

    for year in years {
        if year.fiscal_year.is_none() {
            report.add_error("Annual record missing fiscal_year");
        }
        if !year.financials.has_headline_data() {
            report.add_warning(format!(
                "Year {} has no financial data",
                display_or_unknown(year.fiscal_year)
            ));
        }
    }
}

fn display_or_unknown<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "?".to_string(), |v| v.to_string())
}
