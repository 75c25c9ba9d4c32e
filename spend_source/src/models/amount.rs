//! Lenient monetary amount as delivered by the data source.
//!
//! The upstream API is loosely typed: `valueSpent` and `targetValue` arrive as
//! JSON numbers, numeric strings (`"50"`, `" 12.5 "`), `null`, or not at all.
//! [`Amount`] keeps the raw JSON value untouched and only coerces when a
//! number is actually needed, so a malformed field never fails a fetch.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A raw amount field. Missing fields deserialize to `null`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(Value);

impl Amount {
    /// Wraps an arbitrary JSON value.
    pub fn from_json(raw: Value) -> Self {
        Self(raw)
    }

    /// An amount given as text, e.g. `"50"`.
    pub fn text(raw: impl Into<String>) -> Self {
        Self(Value::String(raw.into()))
    }

    /// An absent amount.
    pub fn missing() -> Self {
        Self(Value::Null)
    }

    /// The raw JSON value as received.
    pub fn raw(&self) -> &Value {
        &self.0
    }

    /// Numeric value of the field.
    ///
    /// Coercion rules:
    /// - finite JSON numbers are used as is;
    /// - strings are trimmed; blank strings are `0`, otherwise parsed as a decimal;
    /// - booleans are `1`/`0`;
    /// - anything else, and any non-finite result, is `0`.
    pub fn value(&self) -> f64 {
        let n = match &self.0 {
            Value::Number(n) => n.as_f64().unwrap_or(0.0),
            Value::String(s) => parse_numeric_text(s),
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Null | Value::Array(_) | Value::Object(_) => 0.0,
        };
        if n.is_finite() { n } else { 0.0 }
    }

    /// `true` when [`Amount::value`] had to fall back to `0` for a non-empty field.
    pub fn is_malformed(&self) -> bool {
        match &self.0 {
            Value::Number(n) => n.as_f64().is_none_or(|v| !v.is_finite()),
            Value::String(s) => {
                let t = s.trim();
                !t.is_empty() && t.parse::<f64>().map_or(true, |v| !v.is_finite())
            }
            Value::Array(_) | Value::Object(_) => true,
            Value::Null | Value::Bool(_) => false,
        }
    }
}

impl From<f64> for Amount {
    fn from(v: f64) -> Self {
        serde_json::Number::from_f64(v)
            .map(Value::Number)
            .map_or_else(Self::missing, Self)
    }
}

fn parse_numeric_text(s: &str) -> f64 {
    let t = s.trim();
    if t.is_empty() {
        return 0.0;
    }
    t.parse::<f64>().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn numbers_and_numeric_text_coerce() {
        assert_eq!(Amount::from(50.0).value(), 50.0);
        assert_eq!(Amount::text("30").value(), 30.0);
        assert_eq!(Amount::text(" 12.5 ").value(), 12.5);
        assert_eq!(Amount::from_json(json!(7)).value(), 7.0);
        assert_eq!(Amount::from_json(json!(true)).value(), 1.0);
    }

    #[test]
    fn malformed_values_fall_back_to_zero() {
        let cases = [
            json!("abc"),
            json!("12,50"),
            json!(null),
            json!([1]),
            json!({"v": 1}),
            json!("NaN"),
            json!("inf"),
        ];
        for raw in cases {
            let amount = Amount::from_json(raw.clone());
            assert_eq!(amount.value(), 0.0, "{raw} should coerce to 0");
        }
        assert_eq!(Amount::text("").value(), 0.0);
        assert_eq!(Amount::missing().value(), 0.0);
        assert_eq!(Amount::from(f64::NAN).value(), 0.0);
    }

    #[test]
    fn malformed_flag_ignores_blank_and_missing() {
        assert!(Amount::text("abc").is_malformed());
        assert!(Amount::text("NaN").is_malformed());
        assert!(!Amount::text("  ").is_malformed());
        assert!(!Amount::missing().is_malformed());
        assert!(!Amount::text("10").is_malformed());
    }

    #[test]
    fn raw_value_is_kept_verbatim() {
        assert_eq!(Amount::text(" 12,5 ").raw(), &json!(" 12,5 "));
        assert_eq!(Amount::from_json(json!([1])).raw(), &json!([1]));
        assert_eq!(Amount::missing().raw(), &Value::Null);
    }
}
