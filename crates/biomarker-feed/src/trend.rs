//! Trend-query payload decoding.

use biomarker_core::models::parse_timestamp;
use biomarker_core::RawTrendPoint;
use serde::Deserialize;
use serde_json::Value;

use crate::{decode_records, unwrap_envelope, FeedError, FeedResult, LooseNumber};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPoint {
    date: String,
    value: LooseNumber,
    #[serde(default)]
    unit: Option<String>,
    #[serde(default)]
    reference_range: Option<String>,
}

/// Decode a trend-query response.
///
/// Accepts a bare array of points or `{ "data": [...] }`; a `null` payload
/// means no history. Order is left as received.
pub fn decode_trend(json: &str) -> FeedResult<Vec<RawTrendPoint>> {
    let value: Value = serde_json::from_str(json)?;
    decode_trend_value(value)
}

/// Decode a trend-query response from a parsed JSON value.
pub fn decode_trend_value(value: Value) -> FeedResult<Vec<RawTrendPoint>> {
    match unwrap_envelope(value) {
        Value::Array(items) => Ok(decode_records(items, "trend_point", to_point)),
        Value::Null => Ok(Vec::new()),
        other => Err(FeedError::InvalidFormat(format!(
            "Expected an array of trend points, received {}",
            json_kind(&other)
        ))),
    }
}

fn to_point(raw: RawPoint) -> Option<RawTrendPoint> {
    Some(RawTrendPoint {
        date: parse_timestamp(&raw.date)?,
        value: raw.value.as_f64()?,
        unit: raw.unit.unwrap_or_default(),
        reference_range: raw.reference_range.unwrap_or_default(),
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_bare_array() {
        let json = r#"[
            {"date": "2024-03-01T00:00:00.000Z", "value": 110, "unit": "mg/dL", "referenceRange": "70-99"},
            {"date": "2024-01-01", "value": "95", "unit": "mg/dL", "referenceRange": "70-99"}
        ]"#;

        let points = decode_trend(json).unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].value, 110.0);
        assert_eq!(points[1].value, 95.0);
        assert_eq!(points[1].reference_range, "70-99");
    }

    #[test]
    fn test_decode_enveloped() {
        let json = r#"{"data": [{"date": "2024-01-01", "value": 5.5}]}"#;
        let points = decode_trend(json).unwrap();

        assert_eq!(points.len(), 1);
        assert_eq!(points[0].unit, "");
        assert_eq!(points[0].reference_range, "");
    }

    #[test]
    fn test_skips_unreadable_points() {
        let json = r#"[
            {"date": "sometime", "value": 1},
            {"date": "2024-01-01", "value": "n/a"},
            {"value": 3},
            {"date": "2024-02-01", "value": 4}
        ]"#;

        let points = decode_trend(json).unwrap();

        assert_eq!(points.len(), 1);
        assert_eq!(points[0].value, 4.0);
    }

    #[test]
    fn test_null_means_no_history() {
        assert!(decode_trend("null").unwrap().is_empty());
        assert!(decode_trend(r#"{"data": null}"#).unwrap().is_empty());
    }

    #[test]
    fn test_wrong_shape() {
        let err = decode_trend(r#"{"points": []}"#).unwrap_err();
        assert!(matches!(err, FeedError::InvalidFormat(_)));
        assert!(err.to_string().contains("object"));
    }
}
