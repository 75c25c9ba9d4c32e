//! Series aggregation: raw spend records → per-month chart series.
//!
//! [`aggregate`] is a pure function of `(records, mode)`. Every call builds a
//! fresh [`MonthSeries`]; nothing from a previous pass is reused.
//!
//! - Months keep the order in which they first appear in the record list.
//! - Daily mode emits one point per record, keyed by date.
//! - Weekly mode merges every record of a month that shares a week number
//!   (the first run of digits in `weekName`, `0` when absent) into one point.
//! - Each month's points are sorted ascending by [`SortKey`]; the sort is
//!   stable, so equal keys keep their arrival order.

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Serialize;
use spend_source::models::SpendRecord;

use crate::view_mode::ViewMode;

/// Month/year label → ordered points of that month.
pub type MonthSeries = IndexMap<String, Vec<SeriesPoint>>;

/// Ordering key of a point inside its month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Date(NaiveDate),
    Week(u32),
}

/// One chart point.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    /// `dd/mm` in daily mode, the week name in weekly mode.
    pub label: String,
    pub sort_key: SortKey,
    /// Amount spent in the period.
    pub value: f64,
    /// Spending goal for the period.
    pub goal: f64,
    /// Marks today (daily) or this week (weekly).
    pub is_current_period: bool,
}

/// Buckets `records` into per-month series for the given view mode.
pub fn aggregate(records: &[SpendRecord], mode: ViewMode) -> MonthSeries {
    let mut months = match mode {
        ViewMode::Daily => daily(records),
        ViewMode::Weekly => weekly(records),
    };
    for points in months.values_mut() {
        points.sort_by_key(|p| p.sort_key);
    }
    months
}

fn daily(records: &[SpendRecord]) -> MonthSeries {
    let mut months = MonthSeries::new();
    for r in records {
        months
            .entry(r.month_year.clone())
            .or_default()
            .push(SeriesPoint {
                label: day_label(r.date),
                sort_key: SortKey::Date(r.date),
                value: r.value_spent.value(),
                goal: r.target_value.value(),
                is_current_period: r.current_week,
            });
    }
    months
}

fn weekly(records: &[SpendRecord]) -> MonthSeries {
    let mut weeks: IndexMap<String, IndexMap<u32, SeriesPoint>> = IndexMap::new();
    for r in records {
        let number = week_number(r.week_name.as_deref());
        let point = weeks
            .entry(r.month_year.clone())
            .or_default()
            .entry(number)
            .or_insert_with(|| SeriesPoint {
                label: r.week_name.clone().unwrap_or_default(),
                sort_key: SortKey::Week(number),
                value: 0.0,
                goal: 0.0,
                is_current_period: false,
            });
        point.value += r.value_spent.value();
        point.goal += r.target_value.value();
        point.is_current_period |= r.current_week;
    }

    weeks
        .into_iter()
        .map(|(month, points)| (month, points.into_values().collect()))
        .collect()
}

/// `dd/mm` label for a day.
pub fn day_label(date: NaiveDate) -> String {
    date.format("%d/%m").to_string()
}

/// Week number embedded in a week name: the first run of ASCII digits.
///
/// `"Semana 3"` → 3. Missing names, names without digits, and numbers that
/// do not fit a `u32` all map to 0.
pub fn week_number(week_name: Option<&str>) -> u32 {
    let Some(name) = week_name else {
        return 0;
    };
    let digits: String = name
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use spend_source::models::Amount;

    use super::*;

    fn record(
        date: (i32, u32, u32),
        month_year: &str,
        week: Option<&str>,
        spent: Amount,
        target: Amount,
        current: bool,
    ) -> SpendRecord {
        SpendRecord {
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            month_year: month_year.to_string(),
            week_name: week.map(str::to_string),
            value_spent: spent,
            target_value: target,
            current_week: current,
        }
    }

    fn scenario() -> Vec<SpendRecord> {
        vec![
            record(
                (2026, 1, 5),
                "Janeiro/2026",
                Some("Semana 1"),
                Amount::text("50"),
                Amount::text("40"),
                false,
            ),
            record(
                (2026, 1, 6),
                "Janeiro/2026",
                Some("Semana 1"),
                Amount::text("30"),
                Amount::text("40"),
                true,
            ),
        ]
    }

    #[test]
    fn daily_scenario() {
        let series = aggregate(&scenario(), ViewMode::Daily);

        insta::assert_debug_snapshot!(series, @r#"
        {
            "Janeiro/2026": [
                SeriesPoint {
                    label: "05/01",
                    sort_key: Date(
                        2026-01-05,
                    ),
                    value: 50.0,
                    goal: 40.0,
                    is_current_period: false,
                },
                SeriesPoint {
                    label: "06/01",
                    sort_key: Date(
                        2026-01-06,
                    ),
                    value: 30.0,
                    goal: 40.0,
                    is_current_period: true,
                },
            ],
        }
        "#);
    }

    #[test]
    fn weekly_scenario_merges_into_one_point() {
        let series = aggregate(&scenario(), ViewMode::Weekly);
        assert_eq!(series.len(), 1);
        assert_eq!(
            series["Janeiro/2026"],
            vec![SeriesPoint {
                label: "Semana 1".into(),
                sort_key: SortKey::Week(1),
                value: 80.0,
                goal: 80.0,
                is_current_period: true,
            }]
        );
    }

    #[test]
    fn empty_records_yield_no_months() {
        assert!(aggregate(&[], ViewMode::Daily).is_empty());
        assert!(aggregate(&[], ViewMode::Weekly).is_empty());
    }

    #[test]
    fn daily_sorts_by_date_and_partitions_months() {
        let records = vec![
            record(
                (2026, 2, 3),
                "Fevereiro/2026",
                None,
                Amount::from(1.0),
                Amount::missing(),
                false,
            ),
            record((2026, 1, 9), "Janeiro/2026", None, Amount::from(2.0), Amount::missing(), false),
            record((2026, 1, 2), "Janeiro/2026", None, Amount::from(3.0), Amount::missing(), false),
        ];
        let series = aggregate(&records, ViewMode::Daily);

        // months keep first-seen order
        assert_eq!(series.keys().collect::<Vec<_>>(), ["Fevereiro/2026", "Janeiro/2026"]);
        let jan: Vec<_> = series["Janeiro/2026"].iter().map(|p| p.label.as_str()).collect();
        assert_eq!(jan, ["02/01", "09/01"]);
    }

    #[test]
    fn weekly_orders_by_week_number_not_label() {
        let records = vec![
            record(
                (2026, 1, 20),
                "Janeiro/2026",
                Some("Semana 10"),
                Amount::from(5.0),
                Amount::from(1.0),
                false,
            ),
            record(
                (2026, 1, 6),
                "Janeiro/2026",
                Some("Semana 2"),
                Amount::from(7.0),
                Amount::from(1.0),
                false,
            ),
            record((2026, 1, 1), "Janeiro/2026", None, Amount::from(1.0), Amount::from(1.0), false),
            record(
                (2026, 1, 7),
                "Janeiro/2026",
                Some("2ª semana"),
                Amount::from(3.0),
                Amount::from(1.0),
                false,
            ),
        ];
        let series = aggregate(&records, ViewMode::Weekly);
        let jan = &series["Janeiro/2026"];

        let keys: Vec<_> = jan.iter().map(|p| p.sort_key).collect();
        assert_eq!(keys, [SortKey::Week(0), SortKey::Week(2), SortKey::Week(10)]);
        // week 2 keeps the label of the first record seen for it
        assert_eq!(jan[1].label, "Semana 2");
        assert_eq!(jan[1].value, 10.0);
        assert_eq!(jan[1].goal, 2.0);
        assert_eq!(jan[0].label, "");
    }

    #[test]
    fn malformed_amounts_count_as_zero() {
        let records = vec![
            record(
                (2026, 1, 5),
                "Janeiro/2026",
                Some("Semana 1"),
                Amount::text("abc"),
                Amount::missing(),
                false,
            ),
            record(
                (2026, 1, 6),
                "Janeiro/2026",
                Some("Semana 1"),
                Amount::text("12.5"),
                Amount::text(""),
                false,
            ),
        ];
        let weekly = aggregate(&records, ViewMode::Weekly);
        assert_eq!(weekly["Janeiro/2026"][0].value, 12.5);
        assert_eq!(weekly["Janeiro/2026"][0].goal, 0.0);
    }

    #[test]
    fn week_numbers() {
        assert_eq!(week_number(Some("Semana 3")), 3);
        assert_eq!(week_number(Some("Semana 04 (parcial)")), 4);
        assert_eq!(week_number(Some("12 - 18 jan")), 12);
        assert_eq!(week_number(Some("Semana")), 0);
        assert_eq!(week_number(Some("Semana 99999999999")), 0);
        assert_eq!(week_number(None), 0);
    }

    fn arb_record() -> impl Strategy<Value = SpendRecord> {
        (1u32..=28, 0usize..2, 1u32..=5, 0u32..10_000, 0u32..10_000, any::<bool>()).prop_map(
            |(day, month, week, spent, target, current)| {
                let (m, label) = [(1, "Janeiro/2026"), (2, "Fevereiro/2026")][month];
                let week_name = format!("Semana {week}");
                record(
                    (2026, m, day),
                    label,
                    Some(week_name.as_str()),
                    Amount::from(f64::from(spent)),
                    Amount::from(f64::from(target)),
                    current,
                )
            },
        )
    }

    proptest! {
        #[test]
        fn daily_one_point_per_record_sorted_and_sum_preserving(
            records in proptest::collection::vec(arb_record(), 1..60),
        ) {
            let series = aggregate(&records, ViewMode::Daily);

            let points: usize = series.values().map(Vec::len).sum();
            prop_assert_eq!(points, records.len());

            for month in series.values() {
                prop_assert!(month.windows(2).all(|w| w[0].sort_key <= w[1].sort_key));
            }

            let total: f64 = series.values().flatten().map(|p| p.value).sum();
            let expected: f64 = records.iter().map(|r| r.value_spent.value()).sum();
            prop_assert_eq!(total, expected);
        }

        #[test]
        fn weekly_merge_preserves_sums_and_current_flag(
            records in proptest::collection::vec(arb_record(), 0..60),
        ) {
            let series = aggregate(&records, ViewMode::Weekly);

            let total: f64 = series.values().flatten().map(|p| p.value).sum();
            let expected: f64 = records.iter().map(|r| r.value_spent.value()).sum();
            prop_assert_eq!(total, expected);

            for (month, points) in &series {
                prop_assert!(points.windows(2).all(|w| w[0].sort_key < w[1].sort_key));
                for p in points {
                    let SortKey::Week(n) = p.sort_key else {
                        panic!("weekly series must be keyed by week");
                    };
                    let any_current = records.iter().any(|r| {
                        &r.month_year == month
                            && week_number(r.week_name.as_deref()) == n
                            && r.current_week
                    });
                    prop_assert_eq!(p.is_current_period, any_current);
                }
            }
        }
    }
}
