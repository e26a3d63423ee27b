//! Agent attribute values.

use serde::Deserialize;

/// Value of a single agent attribute.
///
/// Mesos reports text attributes as JSON strings and scalar attributes as
/// numbers. Anything else is kept as raw JSON so decoding never fails on an
/// unexpected shape.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Text(String),
    Number(f64),
    Boolean(bool),
    Unknown(serde_json::Value),
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::Text(s.to_string())
    }
}
