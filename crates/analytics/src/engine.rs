use crate::error::AnalyticsError;
use crate::metrics::{self, MarginType};
use crate::report::{
    GrowthMetrics, MarginMetrics, PriceMetrics, QualityMetrics, StockMetrics, ValuationMetrics,
};
use core_types::{AnnualRecord, FundamentalMetric, PriceSnapshot, SymbolData, ValuationSnapshot};
use rust_decimal::Decimal;

/// Trailing-twelve-month totals shared by the valuation and margin blocks.
#[derive(Debug, Clone, Copy)]
struct LtmFigures {
    revenue: Option<Decimal>,
    gross_profit: Option<Decimal>,
    net_income: Option<Decimal>,
    operating_cash_flow: Option<Decimal>,
    free_cash_flow: Option<Decimal>,
}

impl LtmFigures {
    fn from_quarters(data: &SymbolData) -> Self {
        let ltm = |metric| metrics::ltm(data.quarterly(), metric);
        Self {
            revenue: ltm(FundamentalMetric::Revenue),
            gross_profit: ltm(FundamentalMetric::GrossProfit),
            net_income: ltm(FundamentalMetric::NetIncome),
            operating_cash_flow: ltm(FundamentalMetric::OperatingCashFlow),
            free_cash_flow: ltm(FundamentalMetric::FreeCashFlow),
        }
    }
}

/// A stateless calculator turning one symbol's data into its metric record.
#[derive(Debug, Default)]
pub struct AnalyticsEngine {}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The main entry point for computing a symbol's metrics.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `StockMetrics` record, or an `AnalyticsError` when the
    /// symbol has no price snapshot or a ratio cannot be represented.
    pub fn analyze_symbol(&self, data: &SymbolData) -> Result<StockMetrics, AnalyticsError> {
        let snapshot = data
            .price()
            .ok_or_else(|| AnalyticsError::MissingPriceData(data.symbol().to_string()))?;

        tracing::debug!(
            symbol = data.symbol(),
            quarters = data.quarterly().len(),
            years = data.annual().len(),
            "Analyzing symbol."
        );

        let ltm = LtmFigures::from_quarters(data);
        let price = self.calculate_price(snapshot)?;
        let growth = self.calculate_growth(data.annual());
        let valuation =
            self.calculate_valuation(data.valuation(), &ltm, growth.net_income_cagr_3y)?;
        let margins = self.calculate_margins(data, &ltm)?;
        let quality = QualityMetrics {
            net_income_consistency: metrics::consistency(
                data.quarterly(),
                FundamentalMetric::NetIncome,
            ),
            fcf_consistency: metrics::consistency(
                data.quarterly(),
                FundamentalMetric::FreeCashFlow,
            ),
        };

        let info = data.info();
        Ok(StockMetrics {
            symbol: info.symbol.clone(),
            company_name: info.company_name.clone(),
            sector: info.sector.clone(),
            industry: info.industry.clone(),
            exchange: info.exchange,
            price,
            valuation,
            growth,
            margins,
            quality,
        })
    }

    /// Calculates the 52-week range metrics and the position momentum.
    fn calculate_price(&self, snapshot: &PriceSnapshot) -> Result<PriceMetrics, AnalyticsError> {
        let mut price = PriceMetrics {
            current: snapshot.last_close,
            week_52_high: snapshot.week_52_high,
            week_52_low: snapshot.week_52_low,
            position_momentum: metrics::position_momentum(snapshot),
            ..PriceMetrics::default()
        };

        let (Some(high), Some(low)) = (snapshot.week_52_high, snapshot.week_52_low) else {
            return Ok(price);
        };

        if low > Decimal::ZERO {
            price.ratio_52w = Some(divide(high, low, "52w_ratio")?.round_dp(2));
        }

        if let Some(close) = snapshot.last_close {
            price.percentile_52w =
                metrics::percentile_in_range(close, high, low).map(|p| p.round_dp(2));
        }

        let midpoint = divide(checked_add(high, low, "volatility")?, Decimal::TWO, "volatility")?;
        if midpoint > Decimal::ZERO {
            let width = high
                .checked_sub(low)
                .ok_or_else(|| overflow("volatility"))?;
            price.volatility = Some(divide(width, midpoint, "volatility")?.round_dp(3));
        }

        Ok(price)
    }

    /// Calculates the market-value ratios. None are produced without a positive market cap.
    fn calculate_valuation(
        &self,
        snapshot: Option<&ValuationSnapshot>,
        ltm: &LtmFigures,
        net_income_cagr_3y: Option<Decimal>,
    ) -> Result<ValuationMetrics, AnalyticsError> {
        let Some(snapshot) = snapshot else {
            return Ok(ValuationMetrics::default());
        };

        let mut valuation = ValuationMetrics {
            market_cap: snapshot.market_cap,
            ..ValuationMetrics::default()
        };

        let Some(market_cap) = snapshot.market_cap.filter(|m| *m > Decimal::ZERO) else {
            return Ok(valuation);
        };

        if let Some(net_income) = ltm.net_income.filter(|n| *n > Decimal::ZERO) {
            valuation.pe_ltm = Some(divide(market_cap, net_income, "pe_ltm")?.round_dp(2));
        }

        if let Some(book_value) = snapshot.book_value.filter(|b| *b > Decimal::ZERO) {
            valuation.pb = Some(divide(market_cap, book_value, "pb")?.round_dp(2));
        }

        if let Some(fcf) = ltm.free_cash_flow.filter(|f| *f > Decimal::ZERO) {
            let debt = snapshot.total_debt.unwrap_or(Decimal::ZERO);
            let cash = snapshot.total_cash.unwrap_or(Decimal::ZERO);
            let enterprise_value = checked_add(market_cap, debt, "ev_fcf")?
                .checked_sub(cash)
                .ok_or_else(|| overflow("ev_fcf"))?;
            valuation.ev_fcf = Some(divide(enterprise_value, fcf, "ev_fcf")?.round_dp(2));
        }

        if let (Some(pe), Some(growth)) = (
            valuation.pe_ltm,
            net_income_cagr_3y.filter(|g| *g > Decimal::ZERO),
        ) {
            valuation.peg = Some(divide(pe, growth, "peg")?.round_dp(2));
        }

        Ok(valuation)
    }

    /// Calculates CAGR and YoY growth for each statement line from the annual series.
    fn calculate_growth(&self, annual: &[AnnualRecord]) -> GrowthMetrics {
        // Stored oldest first; offsets below count back from the latest year.
        let newest_first: Vec<&AnnualRecord> = annual.iter().rev().collect();

        let growth_of = |metric: FundamentalMetric| {
            let value = |offset: usize| {
                newest_first
                    .get(offset)
                    .and_then(|record| record.financials.get(metric))
            };
            let cagr_3y = if newest_first.len() >= 4 {
                metrics::cagr(value(3), value(0), 3)
            } else {
                None
            };
            let cagr_4y = if newest_first.len() >= 5 {
                metrics::cagr(value(4), value(0), 4)
            } else {
                None
            };
            let yoy = if newest_first.len() >= 2 {
                metrics::yoy_growth(value(0), value(1))
            } else {
                None
            };
            (cagr_3y, cagr_4y, yoy)
        };

        let (revenue_cagr_3y, revenue_cagr_4y, revenue_yoy) =
            growth_of(FundamentalMetric::Revenue);
        let (gross_profit_cagr_3y, gross_profit_cagr_4y, gross_profit_yoy) =
            growth_of(FundamentalMetric::GrossProfit);
        let (net_income_cagr_3y, net_income_cagr_4y, net_income_yoy) =
            growth_of(FundamentalMetric::NetIncome);
        let (ocf_cagr_3y, ocf_cagr_4y, ocf_yoy) = growth_of(FundamentalMetric::OperatingCashFlow);
        let (fcf_cagr_3y, fcf_cagr_4y, fcf_yoy) = growth_of(FundamentalMetric::FreeCashFlow);

        GrowthMetrics {
            revenue_cagr_3y,
            revenue_cagr_4y,
            revenue_yoy,
            gross_profit_cagr_3y,
            gross_profit_cagr_4y,
            gross_profit_yoy,
            net_income_cagr_3y,
            net_income_cagr_4y,
            net_income_yoy,
            ocf_cagr_3y,
            ocf_cagr_4y,
            ocf_yoy,
            fcf_cagr_3y,
            fcf_cagr_4y,
            fcf_yoy,
        }
    }

    /// Calculates LTM margins and the eight-quarter margin trends.
    fn calculate_margins(
        &self,
        data: &SymbolData,
        ltm: &LtmFigures,
    ) -> Result<MarginMetrics, AnalyticsError> {
        let revenue = ltm.revenue.filter(|r| *r > Decimal::ZERO);
        let quarters = data.quarterly();
        Ok(MarginMetrics {
            gross_ltm: ltm_margin(ltm.gross_profit, revenue, "gross_ltm")?,
            gross_trend: metrics::margin_trend(quarters, MarginType::Gross),
            net_ltm: ltm_margin(ltm.net_income, revenue, "net_ltm")?,
            net_trend: metrics::margin_trend(quarters, MarginType::Net),
            ocf_ltm: ltm_margin(ltm.operating_cash_flow, revenue, "ocf_ltm")?,
            ocf_trend: metrics::margin_trend(quarters, MarginType::OperatingCashFlow),
            fcf_ltm: ltm_margin(ltm.free_cash_flow, revenue, "fcf_ltm")?,
            fcf_trend: metrics::margin_trend(quarters, MarginType::FreeCashFlow),
        })
    }
}

/// `numerator` as a percentage of a positive `revenue`, rounded to 2dp.
fn ltm_margin(
    numerator: Option<Decimal>,
    revenue: Option<Decimal>,
    metric: &str,
) -> Result<Option<Decimal>, AnalyticsError> {
    let (Some(n), Some(r)) = (numerator, revenue) else {
        return Ok(None);
    };
    let pct = divide(n, r, metric)?
        .checked_mul(Decimal::ONE_HUNDRED)
        .ok_or_else(|| overflow(metric))?;
    Ok(Some(pct.round_dp(2)))
}

/// Every caller filters the denominator to a positive value first.
fn divide(
    numerator: Decimal,
    denominator: Decimal,
    metric: &str,
) -> Result<Decimal, AnalyticsError> {
    numerator
        .checked_div(denominator)
        .ok_or_else(|| overflow(metric))
}

fn checked_add(a: Decimal, b: Decimal, metric: &str) -> Result<Decimal, AnalyticsError> {
    a.checked_add(b).ok_or_else(|| overflow(metric))
}

fn overflow(metric: &str) -> AnalyticsError {
    AnalyticsError::Calculation(format!("numeric overflow while computing '{metric}'"))
}
