//! Checks that four quarters of a fiscal year add up to the reported annual figure.

use crate::report::ValidationReport;
use core_types::{AnnualRecord, FundamentalMetric, QuarterRecord, SymbolData};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

const QUARTERS_PER_YEAR: usize = 4;

/// Compares quarterly sums with annual values for every fiscal year present in both
/// series, in ascending year order.
///
/// A year is skipped unless it has exactly four quarters and every one of them carries
/// at least one headline metric. Partial years are normal upstream and are not findings.
pub(crate) fn reconcile(data: &SymbolData, tolerance_pct: Decimal, report: &mut ValidationReport) {
    let mut quarters_by_year: BTreeMap<i32, Vec<&QuarterRecord>> = BTreeMap::new();
    for quarter in data.quarterly() {
        if let Some(year) = quarter.fiscal_year {
            quarters_by_year.entry(year).or_default().push(quarter);
        }
    }

    let annual_by_year: BTreeMap<i32, &AnnualRecord> = data
        .annual()
        .iter()
        .filter_map(|a| a.fiscal_year.map(|year| (year, a)))
        .collect();

    for (year, quarters) in &quarters_by_year {
        let Some(annual) = annual_by_year.get(year) else {
            continue;
        };

        if quarters.len() != QUARTERS_PER_YEAR {
            tracing::debug!(
                symbol = data.symbol(),
                year,
                quarters = quarters.len(),
                "Skipping reconciliation; need exactly four quarters."
            );
            continue;
        }

        let with_data = quarters
            .iter()
            .filter(|q| q.financials.has_headline_data())
            .count();
        if with_data < QUARTERS_PER_YEAR {
            tracing::debug!(
                symbol = data.symbol(),
                year,
                with_data,
                "Skipping reconciliation; some quarters carry no headline data."
            );
            continue;
        }

        for metric in FundamentalMetric::ALL {
            check_metric(quarters, annual, *year, metric, tolerance_pct, report);
        }
    }
}

fn check_metric(
    quarters: &[&QuarterRecord],
    annual: &AnnualRecord,
    year: i32,
    metric: FundamentalMetric,
    tolerance_pct: Decimal,
    report: &mut ValidationReport,
) {
    let Some(annual_value) = annual.financials.get(metric).filter(|v| !v.is_zero()) else {
        return;
    };

    let values: Vec<Decimal> = quarters
        .iter()
        .filter_map(|q| q.financials.get(metric))
        .collect();
    if values.is_empty() {
        return;
    }
    let Some(quarterly_sum) = values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v))
    else {
        return;
    };
    if quarterly_sum.is_zero() {
        return;
    }

    let Some(diff_pct) = quarterly_sum
        .checked_sub(annual_value)
        .and_then(|diff| diff.abs().checked_div(annual_value.abs()))
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
    else {
        return;
    };

    if diff_pct > tolerance_pct {
        report.add_error(format!(
            "{} mismatch for {year}: quarterly sum = {}, annual = {} (difference: {}%)",
            metric.display_name(),
            quarterly_sum.round(),
            annual_value.round(),
            diff_pct.round_dp(1),
        ));
    } else {
        tracing::debug!(
            symbol = %report.symbol,
            year,
            metric = metric.display_name(),
            %diff_pct,
            "Quarterly sum within tolerance."
        );
    }
}
