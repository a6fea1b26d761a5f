//! Collapses duplicate reporting periods to one canonical record.
//!
//! Data sources occasionally return the same fiscal period twice (a restated filing, a
//! provider glitch). For every `(symbol, fiscal_year, fiscal_quarter)` or
//! `(symbol, fiscal_year)` key only the record with the latest period end date survives.
//! On equal dates the first record seen is kept. Records with an absent key component
//! cannot be matched against anything and are passed through untouched.

use crate::structs::{AnnualRecord, QuarterRecord};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::hash::Hash;

pub fn dedup_quarterly(records: Vec<QuarterRecord>) -> Vec<QuarterRecord> {
    dedup_by_latest(
        records,
        |q| match (q.fiscal_year, q.fiscal_quarter) {
            (Some(year), Some(quarter)) => Some((q.symbol.clone(), year, quarter)),
            _ => None,
        },
        |q| q.period_end_date,
    )
}

pub fn dedup_annual(records: Vec<AnnualRecord>) -> Vec<AnnualRecord> {
    dedup_by_latest(
        records,
        |a| a.fiscal_year.map(|year| (a.symbol.clone(), year)),
        |a| a.period_end_date,
    )
}

fn dedup_by_latest<T, K, FK, FD>(records: Vec<T>, key: FK, date: FD) -> Vec<T>
where
    K: Eq + Hash,
    FK: Fn(&T) -> Option<K>,
    FD: Fn(&T) -> NaiveDate,
{
    let mut kept: Vec<T> = Vec::with_capacity(records.len());
    let mut slot_by_key: HashMap<K, usize> = HashMap::new();
    let mut dropped = 0usize;

    for record in records {
        let Some(k) = key(&record) else {
            kept.push(record);
            continue;
        };

        match slot_by_key.get(&k) {
            Some(&slot) => {
                if date(&record) > date(&kept[slot]) {
                    kept[slot] = record;
                }
                dropped += 1;
            }
            None => {
                slot_by_key.insert(k, kept.len());
                kept.push(record);
            }
        }
    }

    if dropped > 0 {
        tracing::debug!(dropped, "Collapsed duplicate reporting periods.");
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::Financials;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn quarter(
        year: Option<i32>,
        q: Option<i32>,
        end: (i32, u32, u32),
        revenue: i64,
    ) -> QuarterRecord {
        QuarterRecord {
            symbol: "2222.SR".to_string(),
            fiscal_year: year,
            fiscal_quarter: q,
            period_end_date: NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
            financials: Financials {
                revenue: Some(revenue.into()),
                ..Financials::default()
            },
        }
    }

    #[test]
    fn later_period_end_wins() {
        let records = vec![
            quarter(Some(2023), Some(1), (2023, 3, 30), 100),
            quarter(Some(2023), Some(2), (2023, 6, 30), 200),
            quarter(Some(2023), Some(1), (2023, 3, 31), 110),
        ];

        let out = dedup_quarterly(records);

        assert_eq!(out.len(), 2);
        let q1 = out.iter().find(|q| q.fiscal_quarter == Some(1)).unwrap();
        assert_eq!(q1.financials.revenue, Some(dec!(110)));
        assert_eq!(q1.period_end_date, NaiveDate::from_ymd_opt(2023, 3, 31).unwrap());
    }

    #[test]
    fn earlier_duplicate_after_canonical_is_discarded() {
        let records = vec![
            quarter(Some(2023), Some(1), (2023, 3, 31), 110),
            quarter(Some(2023), Some(1), (2023, 3, 1), 90),
        ];

        let out = dedup_quarterly(records);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].financials.revenue, Some(dec!(110)));
    }

    #[test]
    fn equal_dates_keep_first_seen() {
        let records = vec![
            quarter(Some(2023), Some(1), (2023, 3, 31), 1),
            quarter(Some(2023), Some(1), (2023, 3, 31), 2),
        ];

        let out = dedup_quarterly(records);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].financials.revenue, Some(dec!(1)));
    }

    #[test]
    fn records_without_full_key_pass_through() {
        let records = vec![
            quarter(None, Some(1), (2023, 3, 31), 1),
            quarter(None, Some(1), (2023, 3, 31), 2),
            quarter(Some(2023), None, (2023, 3, 31), 3),
        ];

        assert_eq!(dedup_quarterly(records).len(), 3);
    }

    #[test]
    fn same_period_for_different_symbols_is_not_a_duplicate() {
        let mut other = quarter(Some(2023), Some(1), (2023, 3, 31), 5);
        other.symbol = "1120.SR".to_string();
        let records = vec![quarter(Some(2023), Some(1), (2023, 3, 31), 1), other];

        assert_eq!(dedup_quarterly(records).len(), 2);
    }

    #[test]
    fn annual_duplicates_collapse_on_fiscal_year() {
        let annual = |end_month: u32, revenue: i64| AnnualRecord {
            symbol: "2222.SR".to_string(),
            fiscal_year: Some(2022),
            period_end_date: NaiveDate::from_ymd_opt(2022, end_month, 28).unwrap(),
            financials: Financials {
                revenue: Some(revenue.into()),
                ..Financials::default()
            },
        };

        let out = dedup_annual(vec![annual(12, 1000), annual(6, 900)]);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].financials.revenue, Some(dec!(1000)));
    }

    proptest! {
        #[test]
        fn dedup_is_idempotent(
            keys in proptest::collection::vec((2018i32..2024, 1i32..5, 1u32..28), 0..40)
        ) {
            let records: Vec<QuarterRecord> = keys
                .iter()
                .enumerate()
                .map(|(i, (year, q, day))| {
                    quarter(Some(*year), Some(*q), (*year, 3, *day), i as i64)
                })
                .collect();

            let once = dedup_quarterly(records);
            let twice = dedup_quarterly(once.clone());

            prop_assert_eq!(once, twice);
        }
    }
}
