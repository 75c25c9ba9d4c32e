//! Canonical in-memory representation of one day of spend.
//!
//! The data source returns one record per day within the requested
//! category/month range. Records are read-only for the rest of the system.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, de};

use crate::models::amount::Amount;

/// A single day of spend for the filtered category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendRecord {
    /// Calendar day of the record.
    #[serde(deserialize_with = "de_record_date")]
    pub date: NaiveDate,

    /// Month/year label the day belongs to (e.g. "Janeiro/2026").
    pub month_year: String,

    /// Week label with an embedded week number (e.g. "Semana 1").
    #[serde(default)]
    pub week_name: Option<String>,

    /// Amount spent on this day.
    #[serde(default)]
    pub value_spent: Amount,

    /// Spending goal for this day.
    #[serde(default)]
    pub target_value: Amount,

    /// Whether the day falls in the current week.
    #[serde(default, deserialize_with = "de_flag")]
    pub current_week: bool,
}

/// Parses the date formats the data source is known to emit.
///
/// Accepts `2026-01-05`, `2026-01-05T00:00:00[.fff]` and RFC 3339 timestamps
/// with an offset. Only the calendar date is kept; offsets are not converted.
pub fn parse_record_date(raw: &str) -> Result<NaiveDate, chrono::ParseError> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.date_naive());
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(ts.date());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
}

fn de_record_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_record_date(&raw).map_err(|e| de::Error::custom(format!("invalid date {raw:?}: {e}")))
}

fn de_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn deserializes_api_payload() {
        let raw = json!([
            {
                "date": "2026-01-05T00:00:00",
                "monthYear": "Janeiro/2026",
                "weekName": "Semana 1",
                "valueSpent": "50",
                "targetValue": 40,
                "currentWeek": false,
                "category": "Alimentação:Café da Manhã"
            },
            {
                "date": "2026-01-06",
                "monthYear": "Janeiro/2026",
                "valueSpent": null,
                "currentWeek": null
            }
        ]);

        let records: Vec<SpendRecord> = serde_json::from_value(raw).unwrap();
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
        assert_eq!(first.week_name.as_deref(), Some("Semana 1"));
        assert_eq!(first.value_spent.value(), 50.0);
        assert_eq!(first.target_value.value(), 40.0);

        let second = &records[1];
        assert!(second.week_name.is_none());
        assert_eq!(second.value_spent.value(), 0.0);
        assert_eq!(second.target_value.value(), 0.0);
        assert!(!second.current_week);
    }

    #[test]
    fn date_formats() {
        let d = NaiveDate::from_ymd_opt(2026, 2, 28).unwrap();
        assert_eq!(parse_record_date("2026-02-28").unwrap(), d);
        assert_eq!(parse_record_date("2026-02-28T00:00:00.000").unwrap(), d);
        assert_eq!(parse_record_date("2026-02-28T23:30:00-03:00").unwrap(), d);
        assert!(parse_record_date("28/02/2026").is_err());
    }

    #[test]
    fn bad_date_fails_the_record() {
        let raw = json!([{ "date": "yesterday", "monthYear": "Janeiro/2026" }]);
        let err = serde_json::from_value::<Vec<SpendRecord>>(raw).unwrap_err();
        assert!(err.to_string().contains("invalid date"));
    }
}
