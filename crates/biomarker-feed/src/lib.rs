//! Payload decoding for the biomarker engine.
//!
//! This crate turns the JSON handed over by the report-detail and
//! trend-query services into `biomarker-core` models. Upstream data drifts:
//! values arrive as numbers or strings, units go missing, dates come in
//! several shapes. Records that cannot be read are skipped with a warning
//! instead of failing the whole payload.

pub mod report;
pub mod trend;

pub use report::*;
pub use trend::*;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

/// Decoding errors.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid payload format: {0}")]
    InvalidFormat(String),
}

pub type FeedResult<T> = Result<T, FeedError>;

/// A number that may have been serialized as text.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum LooseNumber {
    Number(f64),
    Text(String),
}

impl LooseNumber {
    pub(crate) fn as_f64(&self) -> Option<f64> {
        let value = match self {
            LooseNumber::Number(n) => Some(*n),
            LooseNumber::Text(s) => s.trim().parse::<f64>().ok(),
        };
        value.filter(|n| n.is_finite())
    }
}

/// Strip an optional `{ "data": ... }` envelope.
pub(crate) fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Decode each element of a JSON array, skipping elements that fail.
pub(crate) fn decode_records<T, F, R>(items: Vec<Value>, kind: &str, mut convert: F) -> Vec<R>
where
    T: DeserializeOwned,
    F: FnMut(T) -> Option<R>,
{
    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<T>(item) {
            Ok(record) => {
                let converted = convert(record);
                if converted.is_none() {
                    warn!(kind, index, "skipping record with unreadable value or date");
                }
                converted
            }
            Err(err) => {
                warn!(kind, index, error = %err, "skipping malformed record");
                None
            }
        })
        .collect()
}
