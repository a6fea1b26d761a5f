//! Raw CSV rows as the collector's exporter writes them, and their conversion into the
//! domain records.
//!
//! Every cell is read as text. The exporter goes through pandas, so integer columns may
//! carry a trailing `.0`, large numbers may be in scientific notation, and dates may
//! carry a time component. Empty cells and `NaN` are nulls.

use chrono::NaiveDate;
use core_types::{
    AnnualRecord, Exchange, Financials, PriceSnapshot, QuarterRecord, StockInfo,
    ValuationSnapshot,
};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;
use std::str::FromStr;

#[derive(Debug, Deserialize)]
pub(crate) struct StockRow {
    pub symbol: String,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub exchange: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PriceRow {
    pub symbol: String,
    #[serde(default)]
    pub data_date: Option<String>,
    #[serde(default)]
    pub last_close_price: Option<String>,
    #[serde(default)]
    pub price_1m_ago: Option<String>,
    #[serde(default)]
    pub price_3m_ago: Option<String>,
    #[serde(default)]
    pub price_6m_ago: Option<String>,
    #[serde(default)]
    pub price_9m_ago: Option<String>,
    #[serde(default)]
    pub price_12m_ago: Option<String>,
    #[serde(default)]
    pub week_52_high: Option<String>,
    #[serde(default)]
    pub week_52_low: Option<String>,
    #[serde(default)]
    pub year_3_high: Option<String>,
    #[serde(default)]
    pub year_3_low: Option<String>,
    #[serde(default)]
    pub year_5_high: Option<String>,
    #[serde(default)]
    pub year_5_low: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuarterRow {
    pub symbol: String,
    #[serde(default)]
    pub fiscal_year: Option<String>,
    #[serde(default)]
    pub fiscal_quarter: Option<String>,
    #[serde(default)]
    pub quarter_end_date: Option<String>,
    #[serde(default)]
    pub revenue: Option<String>,
    #[serde(default)]
    pub gross_profit: Option<String>,
    #[serde(default)]
    pub net_income: Option<String>,
    #[serde(default)]
    pub operating_cash_flow: Option<String>,
    #[serde(default)]
    pub free_cash_flow: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnnualRow {
    pub symbol: String,
    #[serde(default)]
    pub fiscal_year: Option<String>,
    #[serde(default)]
    pub year_end_date: Option<String>,
    #[serde(default)]
    pub revenue: Option<String>,
    #[serde(default)]
    pub gross_profit: Option<String>,
    #[serde(default)]
    pub net_income: Option<String>,
    #[serde(default)]
    pub operating_cash_flow: Option<String>,
    #[serde(default)]
    pub free_cash_flow: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ValuationRow {
    pub symbol: String,
    #[serde(default)]
    pub market_cap: Option<String>,
    #[serde(default)]
    pub total_debt: Option<String>,
    #[serde(default)]
    pub total_cash: Option<String>,
    #[serde(default)]
    pub book_value: Option<String>,
}

impl StockRow {
    pub fn into_info(self) -> StockInfo {
        let exchange = cell(&self.exchange).and_then(|raw| match Exchange::from_str(raw) {
            Ok(exchange) => Some(exchange),
            Err(e) => {
                tracing::warn!(
                    symbol = %self.symbol,
                    error = %e,
                    "Ignoring unrecognized exchange."
                );
                None
            }
        });

        StockInfo {
            symbol: self.symbol.trim().to_string(),
            company_name: owned_cell(self.company_name),
            sector: owned_cell(self.sector),
            industry: owned_cell(self.industry),
            exchange,
        }
    }
}

impl PriceRow {
    pub fn into_snapshot(self) -> Result<PriceSnapshot, String> {
        Ok(PriceSnapshot {
            as_of_date: parse_date(&self.data_date, "data_date")?,
            last_close: parse_decimal(&self.last_close_price, "last_close_price")?,
            week_52_high: parse_decimal(&self.week_52_high, "week_52_high")?,
            week_52_low: parse_decimal(&self.week_52_low, "week_52_low")?,
            price_1m_ago: parse_decimal(&self.price_1m_ago, "price_1m_ago")?,
            price_3m_ago: parse_decimal(&self.price_3m_ago, "price_3m_ago")?,
            price_6m_ago: parse_decimal(&self.price_6m_ago, "price_6m_ago")?,
            price_9m_ago: parse_decimal(&self.price_9m_ago, "price_9m_ago")?,
            price_12m_ago: parse_decimal(&self.price_12m_ago, "price_12m_ago")?,
            year_3_high: parse_decimal(&self.year_3_high, "year_3_high")?,
            year_3_low: parse_decimal(&self.year_3_low, "year_3_low")?,
            year_5_high: parse_decimal(&self.year_5_high, "year_5_high")?,
            year_5_low: parse_decimal(&self.year_5_low, "year_5_low")?,
            symbol: self.symbol.trim().to_string(),
        })
    }
}

/// Parses the five statement columns shared by both fundamentals files.
fn parse_financials(
    revenue: &Option<String>,
    gross_profit: &Option<String>,
    net_income: &Option<String>,
    operating_cash_flow: &Option<String>,
    free_cash_flow: &Option<String>,
) -> Result<Financials, String> {
    Ok(Financials {
        revenue: parse_decimal(revenue, "revenue")?,
        gross_profit: parse_decimal(gross_profit, "gross_profit")?,
        net_income: parse_decimal(net_income, "net_income")?,
        operating_cash_flow: parse_decimal(operating_cash_flow, "operating_cash_flow")?,
        free_cash_flow: parse_decimal(free_cash_flow, "free_cash_flow")?,
    })
}

impl QuarterRow {
    /// Returns `Ok(None)` for a row without a period end date, which cannot be placed in
    /// the series.
    pub fn into_record(self) -> Result<Option<QuarterRecord>, String> {
        let Some(period_end_date) = parse_date(&self.quarter_end_date, "quarter_end_date")? else {
            return Ok(None);
        };
        // Out-of-range quarters are kept; the validator reports them.
        Ok(Some(QuarterRecord {
            fiscal_year: parse_integer(&self.fiscal_year, "fiscal_year")?,
            fiscal_quarter: parse_integer(&self.fiscal_quarter, "fiscal_quarter")?,
            period_end_date,
            financials: parse_financials(
                &self.revenue,
                &self.gross_profit,
                &self.net_income,
                &self.operating_cash_flow,
                &self.free_cash_flow,
            )?,
            symbol: self.symbol.trim().to_string(),
        }))
    }
}

impl AnnualRow {
    /// Returns `Ok(None)` for a row without a year end date.
    pub fn into_record(self) -> Result<Option<AnnualRecord>, String> {
        let Some(period_end_date) = parse_date(&self.year_end_date, "year_end_date")? else {
            return Ok(None);
        };

        Ok(Some(AnnualRecord {
            fiscal_year: parse_integer(&self.fiscal_year, "fiscal_year")?,
            period_end_date,
            financials: parse_financials(
                &self.revenue,
                &self.gross_profit,
                &self.net_income,
                &self.operating_cash_flow,
                &self.free_cash_flow,
            )?,
            symbol: self.symbol.trim().to_string(),
        }))
    }
}

impl ValuationRow {
    pub fn into_snapshot(self) -> Result<ValuationSnapshot, String> {
        Ok(ValuationSnapshot {
            market_cap: parse_decimal(&self.market_cap, "market_cap")?,
            total_debt: parse_decimal(&self.total_debt, "total_debt")?,
            total_cash: parse_decimal(&self.total_cash, "total_cash")?,
            book_value: parse_decimal(&self.book_value, "book_value")?,
        })
    }
}

/// A trimmed, non-null cell.
fn cell(raw: &Option<String>) -> Option<&str> {
    raw.as_deref()
        .map(str::trim)
        .filter(|s| {
            !s.is_empty() && !s.eq_ignore_ascii_case("nan") && !s.eq_ignore_ascii_case("none")
        })
}

fn owned_cell(raw: Option<String>) -> Option<String> {
    cell(&raw).map(str::to_string)
}

pub(crate) fn parse_decimal(raw: &Option<String>, column: &str) -> Result<Option<Decimal>, String> {
    let Some(text) = cell(raw) else {
        return Ok(None);
    };
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map(Some)
        .map_err(|_| format!("{column} is not a number: '{text}'"))
}

pub(crate) fn parse_integer(raw: &Option<String>, column: &str) -> Result<Option<i32>, String> {
    let Some(value) = parse_decimal(raw, column)? else {
        return Ok(None);
    };
    if !value.fract().is_zero() {
        return Err(format!("{column} is not a whole number: '{value}'"));
    }
    value
        .to_i32()
        .map(Some)
        .ok_or_else(|| format!("{column} is out of range: '{value}'"))
}

pub(crate) fn parse_date(raw: &Option<String>, column: &str) -> Result<Option<NaiveDate>, String> {
    let Some(text) = cell(raw) else {
        return Ok(None);
    };
    // Timestamps such as "2023-03-31 00:00:00" keep only the date part.
    let date_part = text.get(..10).unwrap_or(text);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| format!("{column} is not a date: '{text}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn raw(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn decimals_accept_pandas_spellings() {
        assert_eq!(parse_decimal(&raw("1000.0"), "x").unwrap(), Some(dec!(1000)));
        assert_eq!(parse_decimal(&raw("1.5e3"), "x").unwrap(), Some(dec!(1500)));
        assert_eq!(parse_decimal(&raw(" -42.25 "), "x").unwrap(), Some(dec!(-42.25)));
        assert_eq!(parse_decimal(&raw(""), "x").unwrap(), None);
        assert_eq!(parse_decimal(&raw("NaN"), "x").unwrap(), None);
        assert_eq!(parse_decimal(&None, "x").unwrap(), None);
        assert!(parse_decimal(&raw("abc"), "revenue").unwrap_err().contains("revenue"));
    }

    #[test]
    fn integers_tolerate_a_trailing_zero_fraction() {
        assert_eq!(parse_integer(&raw("2023.0"), "fiscal_year").unwrap(), Some(2023));
        assert_eq!(parse_integer(&raw("4"), "fiscal_quarter").unwrap(), Some(4));
        assert!(parse_integer(&raw("2.5"), "fiscal_quarter").is_err());
    }

    #[test]
    fn out_of_range_quarter_survives_conversion() {
        let row = QuarterRow {
            symbol: "1010.SR".to_string(),
            fiscal_year: raw("2023"),
            fiscal_quarter: raw("-1"),
            quarter_end_date: raw("2023-03-31"),
            revenue: raw("100"),
            gross_profit: None,
            net_income: None,
            operating_cash_flow: None,
            free_cash_flow: None,
        };

        let record = row.into_record().unwrap().unwrap();

        assert_eq!(record.fiscal_quarter, Some(-1));
    }

    #[test]
    fn infinity_is_not_a_number() {
        assert!(parse_decimal(&raw("inf"), "revenue").is_err());
    }

    #[test]
    fn dates_drop_any_time_component() {
        let expected = NaiveDate::from_ymd_opt(2023, 3, 31);
        assert_eq!(parse_date(&raw("2023-03-31"), "d").unwrap(), expected);
        assert_eq!(parse_date(&raw("2023-03-31 00:00:00"), "d").unwrap(), expected);
        assert!(parse_date(&raw("31/03/2023"), "d").is_err());
    }

    #[test]
    fn unknown_exchange_becomes_missing() {
        let row = StockRow {
            symbol: "2222.SR".to_string(),
            company_name: raw("Saudi Aramco"),
            exchange: raw("NYSE"),
            sector: raw(""),
            industry: None,
        };

        let info = row.into_info();

        assert_eq!(info.exchange, None);
        assert_eq!(info.sector, None);
        assert_eq!(info.company_name.as_deref(), Some("Saudi Aramco"));
    }
}
