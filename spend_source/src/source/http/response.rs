use serde::Deserialize;
use serde_json::Value;

use crate::models::SpendRecord;

/// Body of `GET /v1/date/month-year-all`.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct MonthYearsResponse {
    #[serde(default)]
    pub month_years: Vec<String>,
}

/// Decodes the dashboard rows one at a time.
///
/// A row that does not fit [`SpendRecord`] (bad date, missing month label) is
/// skipped with a warning so the rest of the answer still lands. Amounts that
/// coerce to 0 are kept and logged at debug level.
pub fn decode_records(rows: Vec<Value>) -> Vec<SpendRecord> {
    let total = rows.len();
    let records: Vec<SpendRecord> = rows
        .into_iter()
        .enumerate()
        .filter_map(|(index, row)| match serde_json::from_value::<SpendRecord>(row) {
            Ok(record) => {
                log_malformed_amounts(index, &record);
                Some(record)
            }
            Err(e) => {
                tracing::warn!(index, error = %e, "skipping undecodable dashboard row");
                None
            }
        })
        .collect();

    if records.len() < total {
        tracing::warn!(
            skipped = total - records.len(),
            total,
            "dashboard answer had undecodable rows"
        );
    }
    records
}

fn log_malformed_amounts(index: usize, record: &SpendRecord) {
    for (field, amount) in [
        ("valueSpent", &record.value_spent),
        ("targetValue", &record.target_value),
    ] {
        if amount.is_malformed() {
            tracing::debug!(
                index,
                field,
                date = %record.date,
                raw = %amount.raw(),
                "non-numeric amount counted as 0"
            );
        }
    }
}
