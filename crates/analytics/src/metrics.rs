//! Pure metric primitives over statement series and price snapshots.
//!
//! Every function here degrades to `None` (or [`MarginTrend::Unknown`]) when its inputs
//! are insufficient, including on numeric overflow. None of them panic.

use crate::report::MarginTrend;
use core_types::{FundamentalMetric, PriceSnapshot, QuarterRecord};
use rust_decimal::{Decimal, MathematicalOps};

/// Quarters summed for a trailing-twelve-month figure.
pub const LTM_QUARTERS: usize = 4;
/// Quarters needed to compare the recent four against the prior four.
pub const TREND_QUARTERS: usize = 8;
/// Margin change, in percentage points, beyond which a trend is no longer flat.
pub const TREND_THRESHOLD_PCT: Decimal = Decimal::TWO;
/// Minimum number of year-over-year observations for a consistency score.
pub const MIN_CONSISTENCY_OBSERVATIONS: usize = 3;

const FIFTY: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

/// The numerator used by a margin, always measured against revenue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarginType {
    Gross,
    Net,
    OperatingCashFlow,
    FreeCashFlow,
}

impl MarginType {
    pub fn numerator(&self) -> FundamentalMetric {
        match self {
            MarginType::Gross => FundamentalMetric::GrossProfit,
            MarginType::Net => FundamentalMetric::NetIncome,
            MarginType::OperatingCashFlow => FundamentalMetric::OperatingCashFlow,
            MarginType::FreeCashFlow => FundamentalMetric::FreeCashFlow,
        }
    }
}

/// Sums the metric over the four most recent quarters by period end date.
///
/// Missing values inside the window are skipped. Returns `None` with fewer than four
/// quarters, or when the metric is missing in all four.
pub fn ltm(quarters: &[QuarterRecord], metric: FundamentalMetric) -> Option<Decimal> {
    if quarters.len() < LTM_QUARTERS {
        return None;
    }

    let values: Vec<Decimal> = newest_first(quarters)
        .into_iter()
        .take(LTM_QUARTERS)
        .filter_map(|q| q.financials.get(metric))
        .collect();

    if values.is_empty() {
        return None;
    }
    checked_sum(values)
}

/// Compound annual growth rate in percent, rounded to 2 decimal places.
///
/// Unavailable for a non-positive start value, a zero end value, zero years, or a
/// negative end/start ratio.
pub fn cagr(start: Option<Decimal>, end: Option<Decimal>, years: u32) -> Option<Decimal> {
    let (start, end) = (start?, end?);
    if start <= Decimal::ZERO || end.is_zero() || years == 0 {
        return None;
    }

    let ratio = end.checked_div(start)?;
    if ratio < Decimal::ZERO {
        return None;
    }

    let exponent = Decimal::ONE.checked_div(Decimal::from(years))?;
    let growth = ratio.checked_powd(exponent)?;
    let pct = growth
        .checked_sub(Decimal::ONE)?
        .checked_mul(Decimal::ONE_HUNDRED)?;
    Some(pct.round_dp(2))
}

/// Percentage change from `previous` to `current`, measured against `|previous|`.
pub fn yoy_growth(current: Option<Decimal>, previous: Option<Decimal>) -> Option<Decimal> {
    pct_change(current?, previous?).map(|pct| pct.round_dp(2))
}

/// Compares the margin of the four most recent quarters with the four before them.
pub fn margin_trend(quarters: &[QuarterRecord], margin_type: MarginType) -> MarginTrend {
    if quarters.len() < TREND_QUARTERS {
        return MarginTrend::Unknown;
    }

    let ordered = newest_first(quarters);
    let (recent, prior) = ordered[..TREND_QUARTERS].split_at(LTM_QUARTERS);
    let numerator = margin_type.numerator();

    let (Some(recent_margin), Some(prior_margin)) = (
        window_margin(recent, numerator),
        window_margin(prior, numerator),
    ) else {
        return MarginTrend::Unknown;
    };

    let Some(change) = recent_margin.checked_sub(prior_margin) else {
        return MarginTrend::Unknown;
    };

    if change > TREND_THRESHOLD_PCT {
        MarginTrend::Expanding
    } else if change < -TREND_THRESHOLD_PCT {
        MarginTrend::Contracting
    } else {
        MarginTrend::Flat
    }
}

/// Population standard deviation of quarter-on-same-quarter-last-year growth rates.
///
/// Lower means steadier. Each quarter from the fifth onward is compared with the quarter
/// four positions earlier; pairs with a missing value or a zero base are skipped.
pub fn consistency(quarters: &[QuarterRecord], metric: FundamentalMetric) -> Option<Decimal> {
    if quarters.len() < TREND_QUARTERS {
        return None;
    }

    let mut ordered: Vec<&QuarterRecord> = quarters.iter().collect();
    ordered.sort_by_key(|q| q.period_end_date);

    let growths: Vec<Decimal> = (LTM_QUARTERS..ordered.len())
        .filter_map(|i| {
            let current = ordered[i].financials.get(metric)?;
            let year_ago = ordered[i - LTM_QUARTERS].financials.get(metric)?;
            pct_change(current, year_ago)
        })
        .collect();

    if growths.len() < MIN_CONSISTENCY_OBSERVATIONS {
        return None;
    }
    population_std_dev(&growths).map(|sd| sd.round_dp(2))
}

/// Where `value` sits inside `[low, high]`, as a percentage. A degenerate range is 50.
pub fn percentile_in_range(value: Decimal, high: Decimal, low: Decimal) -> Option<Decimal> {
    if high == low {
        return Some(FIFTY);
    }
    value
        .checked_sub(low)?
        .checked_div(high.checked_sub(low)?)?
        .checked_mul(Decimal::ONE_HUNDRED)
}

/// Change in 52-week range percentile between the price three months ago and now.
pub fn position_momentum(price: &PriceSnapshot) -> Option<Decimal> {
    let high = price.week_52_high?;
    let low = price.week_52_low?;

    let now = percentile_in_range(price.last_close?, high, low)?;
    let then = percentile_in_range(price.price_3m_ago?, high, low)?;
    Some(now.checked_sub(then)?.round_dp(2))
}

fn newest_first(quarters: &[QuarterRecord]) -> Vec<&QuarterRecord> {
    let mut ordered: Vec<&QuarterRecord> = quarters.iter().collect();
    ordered.sort_by(|a, b| b.period_end_date.cmp(&a.period_end_date));
    ordered
}

fn window_margin(window: &[&QuarterRecord], numerator: FundamentalMetric) -> Option<Decimal> {
    let revenue = checked_sum(window.iter().filter_map(|q| q.financials.revenue))?;
    if revenue <= Decimal::ZERO {
        return None;
    }
    let total = checked_sum(window.iter().filter_map(|q| q.financials.get(numerator)))?;
    total
        .checked_div(revenue)?
        .checked_mul(Decimal::ONE_HUNDRED)
}

fn pct_change(current: Decimal, previous: Decimal) -> Option<Decimal> {
    if previous.is_zero() {
        return None;
    }
    current
        .checked_sub(previous)?
        .checked_div(previous.abs())?
        .checked_mul(Decimal::ONE_HUNDRED)
}

fn population_std_dev(values: &[Decimal]) -> Option<Decimal> {
    let count = Decimal::from(values.len());
    let mean = checked_sum(values.iter().copied())?.checked_div(count)?;

    let squared_deviations = values.iter().map(|v| {
        let deviation = v.checked_sub(mean)?;
        deviation.checked_mul(deviation)
    });
    let mut total = Decimal::ZERO;
    for squared in squared_deviations {
        total = total.checked_add(squared?)?;
    }

    total.checked_div(count)?.sqrt()
}

fn checked_sum(values: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_types::Financials;
    use rust_decimal_macros::dec;

    /// Builds `n` consecutive quarters starting Q1 2020, oldest first.
    fn quarters_with(n: usize, fill: impl Fn(usize) -> Financials) -> Vec<QuarterRecord> {
        (0..n)
            .map(|i| {
                let year = 2020 + (i / 4) as i32;
                let quarter = (i % 4) as i32 + 1;
                let month = quarter as u32 * 3;
                QuarterRecord {
                    symbol: "2010.SR".to_string(),
                    fiscal_year: Some(year),
                    fiscal_quarter: Some(quarter),
                    period_end_date: NaiveDate::from_ymd_opt(year, month, 28).unwrap(),
                    financials: fill(i),
                }
            })
            .collect()
    }

    fn revenue(v: Decimal) -> Financials {
        Financials {
            revenue: Some(v),
            ..Financials::default()
        }
    }

    #[test]
    fn ltm_sums_the_four_most_recent_quarters() {
        let quarters = quarters_with(6, |i| revenue(Decimal::from(i as i64 + 1)));
        // Most recent four are 3, 4, 5 and 6.
        assert_eq!(ltm(&quarters, FundamentalMetric::Revenue), Some(dec!(18)));
    }

    #[test]
    fn ltm_ignores_input_order() {
        let mut quarters = quarters_with(5, |i| revenue(Decimal::from(i as i64 * 10)));
        quarters.reverse();
        assert_eq!(ltm(&quarters, FundamentalMetric::Revenue), Some(dec!(100)));
    }

    #[test]
    fn ltm_needs_four_quarters() {
        let quarters = quarters_with(3, |_| revenue(dec!(100)));
        assert_eq!(ltm(&quarters, FundamentalMetric::Revenue), None);
    }

    #[test]
    fn ltm_skips_missing_values_but_not_all_of_them() {
        let partial = quarters_with(4, |i| {
            if i == 0 { Financials::default() } else { revenue(dec!(25)) }
        });
        assert_eq!(ltm(&partial, FundamentalMetric::Revenue), Some(dec!(75)));

        let empty = quarters_with(4, |_| Financials::default());
        assert_eq!(ltm(&empty, FundamentalMetric::Revenue), None);
    }

    #[test]
    fn cagr_of_a_doubling_over_three_years() {
        assert_eq!(cagr(Some(dec!(100)), Some(dec!(200)), 3), Some(dec!(25.99)));
    }

    #[test]
    fn cagr_over_one_year_is_plain_growth() {
        assert_eq!(cagr(Some(dec!(100)), Some(dec!(150)), 1), Some(dec!(50)));
    }

    #[test]
    fn cagr_guards() {
        assert_eq!(cagr(Some(dec!(0)), Some(dec!(200)), 3), None);
        assert_eq!(cagr(Some(dec!(-50)), Some(dec!(200)), 3), None);
        assert_eq!(cagr(Some(dec!(100)), Some(dec!(0)), 3), None);
        assert_eq!(cagr(Some(dec!(100)), Some(dec!(-20)), 3), None);
        assert_eq!(cagr(Some(dec!(100)), Some(dec!(200)), 0), None);
        assert_eq!(cagr(None, Some(dec!(200)), 3), None);
        assert_eq!(cagr(Some(dec!(100)), None, 3), None);
    }

    #[test]
    fn yoy_growth_uses_absolute_base() {
        assert_eq!(yoy_growth(Some(dec!(120)), Some(dec!(100))), Some(dec!(20)));
        assert_eq!(yoy_growth(Some(dec!(-50)), Some(dec!(-100))), Some(dec!(50)));
        assert_eq!(yoy_growth(Some(dec!(90)), Some(dec!(0))), None);
        assert_eq!(yoy_growth(None, Some(dec!(100))), None);
        assert_eq!(yoy_growth(Some(dec!(100)), None), None);
    }

    fn gross_margin_quarters(prior_pct: i64, recent_pct: i64) -> Vec<QuarterRecord> {
        quarters_with(8, |i| {
            let pct = if i < 4 { prior_pct } else { recent_pct };
            Financials {
                revenue: Some(dec!(100)),
                gross_profit: Some(Decimal::from(pct)),
                ..Financials::default()
            }
        })
    }

    #[test]
    fn margin_trend_classifies_against_two_points() {
        assert_eq!(
            margin_trend(&gross_margin_quarters(19, 22), MarginType::Gross),
            MarginTrend::Expanding
        );
        assert_eq!(
            margin_trend(&gross_margin_quarters(22, 19), MarginType::Gross),
            MarginTrend::Contracting
        );
        // Exactly two points is still flat.
        assert_eq!(
            margin_trend(&gross_margin_quarters(19, 21), MarginType::Gross),
            MarginTrend::Flat
        );
        assert_eq!(
            margin_trend(&gross_margin_quarters(21, 19), MarginType::Gross),
            MarginTrend::Flat
        );
    }

    #[test]
    fn margin_trend_is_unknown_without_enough_history() {
        let quarters = quarters_with(7, |_| revenue(dec!(100)));
        assert_eq!(margin_trend(&quarters, MarginType::Net), MarginTrend::Unknown);
    }

    #[test]
    fn margin_trend_is_unknown_without_positive_revenue() {
        let quarters = quarters_with(8, |i| Financials {
            revenue: if i < 4 { Some(dec!(0)) } else { Some(dec!(100)) },
            net_income: Some(dec!(10)),
            ..Financials::default()
        });
        assert_eq!(margin_trend(&quarters, MarginType::Net), MarginTrend::Unknown);
    }

    #[test]
    fn consistency_is_zero_for_steady_growth() {
        // Every quarter is 10% above the same quarter a year earlier.
        let quarters = quarters_with(12, |i| {
            let base = dec!(1000) + Decimal::from((i % 4) as i64 * 100);
            let years = (i / 4) as i64;
            let mut value = base;
            for _ in 0..years {
                value *= dec!(1.1);
            }
            Financials {
                net_income: Some(value),
                ..Financials::default()
            }
        });
        assert_eq!(
            consistency(&quarters, FundamentalMetric::NetIncome),
            Some(dec!(0))
        );
    }

    #[test]
    fn consistency_is_population_std_dev_of_growth_rates() {
        // Year-one quarters are 100; year-two quarters grow by 10%, 20%, 30% and 40%.
        let quarters = quarters_with(8, |i| {
            let value = if i < 4 {
                dec!(100)
            } else {
                dec!(110) + Decimal::from((i - 4) as i64 * 10)
            };
            Financials {
                free_cash_flow: Some(value),
                ..Financials::default()
            }
        });
        // Growth rates 10, 20, 30, 40: mean 25, variance 125, std dev 11.18.
        assert_eq!(
            consistency(&quarters, FundamentalMetric::FreeCashFlow),
            Some(dec!(11.18))
        );
    }

    #[test]
    fn consistency_needs_three_observations() {
        let quarters = quarters_with(8, |i| Financials {
            net_income: if i == 4 || i == 5 { None } else { Some(dec!(50)) },
            ..Financials::default()
        });
        assert_eq!(consistency(&quarters, FundamentalMetric::NetIncome), None);
    }

    #[test]
    fn percentile_of_a_flat_range_is_fifty() {
        assert_eq!(percentile_in_range(dec!(10), dec!(10), dec!(10)), Some(dec!(50)));
        assert_eq!(percentile_in_range(dec!(75), dec!(100), dec!(50)), Some(dec!(50)));
    }

    #[test]
    fn position_momentum_compares_range_percentiles() {
        let price = PriceSnapshot {
            last_close: Some(dec!(80)),
            week_52_high: Some(dec!(100)),
            week_52_low: Some(dec!(50)),
            price_3m_ago: Some(dec!(65)),
            ..PriceSnapshot::default()
        };
        assert_eq!(position_momentum(&price), Some(dec!(30)));

        let without_history = PriceSnapshot {
            price_3m_ago: None,
            ..price
        };
        assert_eq!(position_momentum(&without_history), None);
    }
}
