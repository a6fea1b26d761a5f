use crate::dedup::{dedup_annual, dedup_quarterly};
use crate::enums::{Exchange, FundamentalMetric};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The five statement values of a single reporting period. Any of them may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Financials {
    pub revenue: Option<Decimal>,
    pub gross_profit: Option<Decimal>,
    pub net_income: Option<Decimal>,
    pub operating_cash_flow: Option<Decimal>,
    pub free_cash_flow: Option<Decimal>,
}

impl Financials {
    pub fn get(&self, metric: FundamentalMetric) -> Option<Decimal> {
        match metric {
            FundamentalMetric::Revenue => self.revenue,
            FundamentalMetric::GrossProfit => self.gross_profit,
            FundamentalMetric::NetIncome => self.net_income,
            FundamentalMetric::OperatingCashFlow => self.operating_cash_flow,
            FundamentalMetric::FreeCashFlow => self.free_cash_flow,
        }
    }

    /// True when at least one of revenue, gross profit or net income is present.
    pub fn has_headline_data(&self) -> bool {
        FundamentalMetric::HEADLINE
            .iter()
            .any(|metric| self.get(*metric).is_some())
    }
}

/// One fiscal quarter of statement data.
///
/// `fiscal_year` and `fiscal_quarter` are optional because upstream sources occasionally
/// omit them; the validator reports such records instead of rejecting them at the door.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuarterRecord {
    pub symbol: String,
    pub fiscal_year: Option<i32>,
    pub fiscal_quarter: Option<i32>,
    pub period_end_date: NaiveDate,
    pub financials: Financials,
}

/// One fiscal year of statement data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnualRecord {
    pub symbol: String,
    pub fiscal_year: Option<i32>,
    pub period_end_date: NaiveDate,
    pub financials: Financials,
}

/// The latest price observation for a symbol along with its look-back prices and ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    pub symbol: String,
    pub as_of_date: Option<NaiveDate>,
    pub last_close: Option<Decimal>,
    pub week_52_high: Option<Decimal>,
    pub week_52_low: Option<Decimal>,
    pub price_1m_ago: Option<Decimal>,
    pub price_3m_ago: Option<Decimal>,
    pub price_6m_ago: Option<Decimal>,
    pub price_9m_ago: Option<Decimal>,
    pub price_12m_ago: Option<Decimal>,
    pub year_3_high: Option<Decimal>,
    pub year_3_low: Option<Decimal>,
    pub year_5_high: Option<Decimal>,
    pub year_5_low: Option<Decimal>,
}

impl PriceSnapshot {
    /// The look-back horizons, in months, carried by every snapshot.
    pub const LOOKBACK_MONTHS: [u32; 5] = [1, 3, 6, 9, 12];

    /// Returns the close `months` months ago, or `None` for an unsupported horizon.
    pub fn price_months_ago(&self, months: u32) -> Option<Decimal> {
        match months {
            1 => self.price_1m_ago,
            3 => self.price_3m_ago,
            6 => self.price_6m_ago,
            9 => self.price_9m_ago,
            12 => self.price_12m_ago,
            _ => None,
        }
    }
}

/// Balance-sheet and market-value inputs for the valuation ratios.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValuationSnapshot {
    pub market_cap: Option<Decimal>,
    pub total_debt: Option<Decimal>,
    pub total_cash: Option<Decimal>,
    /// Total stockholders' equity, not a per-share figure.
    pub book_value: Option<Decimal>,
}

/// Listing metadata for a symbol.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockInfo {
    pub symbol: String,
    pub company_name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub exchange: Option<Exchange>,
}

/// Everything known about one symbol, ready for analysis and validation.
///
/// Built once by [`SymbolData::new`], which collapses duplicate periods and orders both
/// series ascending by period end date. The value is read-only afterwards, so it can be
/// handed to worker threads without coordination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolData {
    info: StockInfo,
    quarterly: Vec<QuarterRecord>,
    annual: Vec<AnnualRecord>,
    price: Option<PriceSnapshot>,
    valuation: Option<ValuationSnapshot>,
}

impl SymbolData {
    pub fn new(
        info: StockInfo,
        quarterly: Vec<QuarterRecord>,
        annual: Vec<AnnualRecord>,
        price: Option<PriceSnapshot>,
        valuation: Option<ValuationSnapshot>,
    ) -> Self {
        let mut quarterly = dedup_quarterly(quarterly);
        quarterly.sort_by_key(|q| q.period_end_date);

        let mut annual = dedup_annual(annual);
        annual.sort_by_key(|a| a.period_end_date);

        Self {
            info,
            quarterly,
            annual,
            price,
            valuation,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.info.symbol
    }

    pub fn info(&self) -> &StockInfo {
        &self.info
    }

    /// Quarterly records, oldest first.
    pub fn quarterly(&self) -> &[QuarterRecord] {
        &self.quarterly
    }

    /// Annual records, oldest first.
    pub fn annual(&self) -> &[AnnualRecord] {
        &self.annual
    }

    pub fn price(&self) -> Option<&PriceSnapshot> {
        self.price.as_ref()
    }

    pub fn valuation(&self) -> Option<&ValuationSnapshot> {
        self.valuation.as_ref()
    }
}
