//! Sector and industry roll-ups of the per-symbol metric records.

use analytics::StockMetrics;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Averages and medians of the headline metrics across one sector or industry.
///
/// Missing values are ignored. A statistic is `None` only when every member lacks the
/// underlying metric.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupStats {
    pub pe_avg: Option<Decimal>,
    pub pe_median: Option<Decimal>,
    pub pb_avg: Option<Decimal>,
    pub pb_median: Option<Decimal>,
    pub ev_fcf_avg: Option<Decimal>,
    pub ev_fcf_median: Option<Decimal>,
    pub revenue_cagr_3y_avg: Option<Decimal>,
    pub revenue_cagr_3y_median: Option<Decimal>,
    pub net_margin_avg: Option<Decimal>,
    pub net_margin_median: Option<Decimal>,
    pub volatility_avg: Option<Decimal>,
    pub volatility_median: Option<Decimal>,
    pub stock_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Aggregates {
    pub sector_overview: BTreeMap<String, GroupStats>,
    pub industry_overview: BTreeMap<String, GroupStats>,
}

/// Groups the records by sector and, separately, by industry.
///
/// Records with a missing or empty label are left out of that grouping. The result does
/// not depend on the order of `records`.
pub fn aggregate(records: &[StockMetrics]) -> Aggregates {
    Aggregates {
        sector_overview: group_by(records, |r| r.sector.as_deref()),
        industry_overview: group_by(records, |r| r.industry.as_deref()),
    }
}

fn group_by<'a, F>(records: &'a [StockMetrics], label: F) -> BTreeMap<String, GroupStats>
where
    F: Fn(&'a StockMetrics) -> Option<&'a str>,
{
    let mut groups: BTreeMap<String, Vec<&StockMetrics>> = BTreeMap::new();
    for record in records {
        if let Some(name) = label(record).filter(|name| !name.is_empty()) {
            groups.entry(name.to_string()).or_default().push(record);
        }
    }

    groups
        .into_iter()
        .map(|(name, members)| (name, GroupStats::from_members(&members)))
        .collect()
}

impl GroupStats {
    fn from_members(members: &[&StockMetrics]) -> Self {
        let (pe_avg, pe_median) = summarize(members, |r| r.valuation.pe_ltm);
        let (pb_avg, pb_median) = summarize(members, |r| r.valuation.pb);
        let (ev_fcf_avg, ev_fcf_median) = summarize(members, |r| r.valuation.ev_fcf);
        let (revenue_cagr_3y_avg, revenue_cagr_3y_median) =
            summarize(members, |r| r.growth.revenue_cagr_3y);
        let (net_margin_avg, net_margin_median) = summarize(members, |r| r.margins.net_ltm);
        let (volatility_avg, volatility_median) = summarize(members, |r| r.price.volatility);

        Self {
            pe_avg,
            pe_median,
            pb_avg,
            pb_median,
            ev_fcf_avg,
            ev_fcf_median,
            revenue_cagr_3y_avg,
            revenue_cagr_3y_median,
            net_margin_avg,
            net_margin_median,
            volatility_avg,
            volatility_median,
            stock_count: members.len(),
        }
    }
}

fn summarize(
    members: &[&StockMetrics],
    accessor: impl Fn(&StockMetrics) -> Option<Decimal>,
) -> (Option<Decimal>, Option<Decimal>) {
    let mut values: Vec<Decimal> = members.iter().filter_map(|m| accessor(m)).collect();
    values.sort();
    (
        mean(&values).map(|v| v.round_dp(2)),
        median(&values).map(|v| v.round_dp(2)),
    )
}

fn mean(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    let total = values
        .iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))?;
    total.checked_div(Decimal::from(values.len()))
}

/// Median of an already sorted slice; the even case averages the two middle values.
fn median(sorted: &[Decimal]) -> Option<Decimal> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    let mid = n / 2;
    if n % 2 == 1 {
        Some(sorted[mid])
    } else {
        sorted[mid - 1]
            .checked_add(sorted[mid])?
            .checked_div(Decimal::TWO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn record(symbol: &str, sector: Option<&str>, pe: Option<Decimal>) -> StockMetrics {
        let mut record = StockMetrics {
            symbol: symbol.to_string(),
            sector: sector.map(str::to_string),
            industry: Some("Banks".to_string()),
            ..StockMetrics::default()
        };
        record.valuation.pe_ltm = pe;
        record
    }

    #[test]
    fn missing_values_are_ignored() {
        let records = vec![
            record("1010.SR", Some("Financials"), Some(dec!(10))),
            record("1020.SR", Some("Financials"), None),
            record("1030.SR", Some("Financials"), Some(dec!(20))),
            record("1050.SR", Some("Financials"), Some(dec!(30))),
        ];

        let stats = &aggregate(&records).sector_overview["Financials"];

        assert_eq!(stats.pe_avg, Some(dec!(20)));
        assert_eq!(stats.pe_median, Some(dec!(20)));
        assert_eq!(stats.stock_count, 4);
    }

    #[test]
    fn all_missing_is_unavailable() {
        let records = vec![
            record("4001.SR", Some("Retail"), None),
            record("4003.SR", Some("Retail"), None),
        ];

        let stats = &aggregate(&records).sector_overview["Retail"];

        assert_eq!(stats.pe_avg, None);
        assert_eq!(stats.pe_median, None);
        assert_eq!(stats.stock_count, 2);
    }

    #[test]
    fn even_count_median_averages_the_middle_pair() {
        let records = vec![
            record("a", Some("Energy"), Some(dec!(40))),
            record("b", Some("Energy"), Some(dec!(10))),
            record("c", Some("Energy"), Some(dec!(15))),
            record("d", Some("Energy"), Some(dec!(20))),
        ];

        let stats = &aggregate(&records).sector_overview["Energy"];

        assert_eq!(stats.pe_median, Some(dec!(17.5)));
        assert_eq!(stats.pe_avg, Some(dec!(21.25)));
    }

    #[test]
    fn unlabeled_records_are_not_grouped() {
        let records = vec![
            record("a", None, Some(dec!(10))),
            record("b", Some(""), Some(dec!(10))),
            record("c", Some("Materials"), Some(dec!(10))),
        ];

        let aggregates = aggregate(&records);

        assert_eq!(aggregates.sector_overview.len(), 1);
        assert!(aggregates.sector_overview.contains_key("Materials"));
        // All three share an industry.
        assert_eq!(aggregates.industry_overview["Banks"].stock_count, 3);
    }

    fn arb_records() -> impl Strategy<Value = Vec<StockMetrics>> {
        proptest::collection::vec(
            (0usize..3, proptest::option::of(-500i64..500)),
            0..30,
        )
        .prop_map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(i, (sector, pe))| {
                    let sector = ["Energy", "Materials", "Utilities"][sector];
                    record(&format!("S{i}"), Some(sector), pe.map(Decimal::from))
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn aggregation_ignores_input_order(
            (records, shuffled) in arb_records()
                .prop_flat_map(|records| (Just(records.clone()), Just(records).prop_shuffle()))
        ) {
            prop_assert_eq!(aggregate(&records), aggregate(&shuffled));
        }
    }
}
