use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The market a symbol is listed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Exchange {
    /// The main market.
    Tadawul,
    /// The parallel market. Listed companies report semiannually.
    #[serde(rename = "NOMU")]
    Nomu,
}

impl Exchange {
    /// Returns `true` for the secondary market, where quarterly filings are not expected.
    pub fn is_secondary_market(&self) -> bool {
        matches!(self, Exchange::Nomu)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Exchange::Tadawul => "Tadawul",
            Exchange::Nomu => "NOMU",
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Exchange {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tadawul" | "main" => Ok(Exchange::Tadawul),
            "nomu" | "parallel" => Ok(Exchange::Nomu),
            other => Err(CoreError::InvalidInput("exchange".to_string(), other.to_string())),
        }
    }
}

/// The five statement line items tracked for every period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FundamentalMetric {
    Revenue,
    GrossProfit,
    NetIncome,
    OperatingCashFlow,
    FreeCashFlow,
}

impl FundamentalMetric {
    pub const ALL: [FundamentalMetric; 5] = [
        FundamentalMetric::Revenue,
        FundamentalMetric::GrossProfit,
        FundamentalMetric::NetIncome,
        FundamentalMetric::OperatingCashFlow,
        FundamentalMetric::FreeCashFlow,
    ];

    /// Metrics whose presence marks a period as carrying usable data.
    pub const HEADLINE: [FundamentalMetric; 3] = [
        FundamentalMetric::Revenue,
        FundamentalMetric::GrossProfit,
        FundamentalMetric::NetIncome,
    ];

    /// Human-readable name used in validation messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            FundamentalMetric::Revenue => "Revenue",
            FundamentalMetric::GrossProfit => "Gross Profit",
            FundamentalMetric::NetIncome => "Net Income",
            FundamentalMetric::OperatingCashFlow => "Operating Cash Flow",
            FundamentalMetric::FreeCashFlow => "Free Cash Flow",
        }
    }
}

impl fmt::Display for FundamentalMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
