use core_types::Exchange;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of a margin over the last eight quarters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarginTrend {
    Expanding,
    Flat,
    Contracting,
    #[default]
    Unknown,
}

/// The complete metric record for one symbol.
///
/// Every numeric field is optional: a metric whose inputs are missing or degenerate is
/// reported as `null` rather than failing the whole record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockMetrics {
    pub symbol: String,
    pub company_name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub exchange: Option<Exchange>,
    pub price: PriceMetrics,
    pub valuation: ValuationMetrics,
    pub growth: GrowthMetrics,
    pub margins: MarginMetrics,
    pub quality: QualityMetrics,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceMetrics {
    pub current: Option<Decimal>,
    #[serde(rename = "52w_high")]
    pub week_52_high: Option<Decimal>,
    #[serde(rename = "52w_low")]
    pub week_52_low: Option<Decimal>,
    /// High divided by low.
    #[serde(rename = "52w_ratio")]
    pub ratio_52w: Option<Decimal>,
    /// Position of the current price inside the 52-week range, 0 to 100.
    pub percentile_52w: Option<Decimal>,
    /// Range width relative to its midpoint.
    pub volatility: Option<Decimal>,
    pub position_momentum: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValuationMetrics {
    pub market_cap: Option<Decimal>,
    pub pe_ltm: Option<Decimal>,
    pub pb: Option<Decimal>,
    pub ev_fcf: Option<Decimal>,
    pub peg: Option<Decimal>,
}

/// Multi-year growth from the annual series. All values are percentages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GrowthMetrics {
    pub revenue_cagr_3y: Option<Decimal>,
    pub revenue_cagr_4y: Option<Decimal>,
    pub revenue_yoy: Option<Decimal>,
    pub gross_profit_cagr_3y: Option<Decimal>,
    pub gross_profit_cagr_4y: Option<Decimal>,
    pub gross_profit_yoy: Option<Decimal>,
    pub net_income_cagr_3y: Option<Decimal>,
    pub net_income_cagr_4y: Option<Decimal>,
    pub net_income_yoy: Option<Decimal>,
    pub ocf_cagr_3y: Option<Decimal>,
    pub ocf_cagr_4y: Option<Decimal>,
    pub ocf_yoy: Option<Decimal>,
    pub fcf_cagr_3y: Option<Decimal>,
    pub fcf_cagr_4y: Option<Decimal>,
    pub fcf_yoy: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarginMetrics {
    pub gross_ltm: Option<Decimal>,
    pub gross_trend: MarginTrend,
    pub net_ltm: Option<Decimal>,
    pub net_trend: MarginTrend,
    pub ocf_ltm: Option<Decimal>,
    pub ocf_trend: MarginTrend,
    pub fcf_ltm: Option<Decimal>,
    pub fcf_trend: MarginTrend,
}

/// Standard deviation of year-over-year quarterly growth. Lower is steadier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub net_income_consistency: Option<Decimal>,
    pub fcf_consistency: Option<Decimal>,
}
