//! Agent attribute handling for the `mesos_slave_attributes` metric.
//!
//! Attribute names are free-form in Mesos, label names are not. Both the
//! configured allow-list and the keys found on agents go through
//! [`normalize_label`], otherwise they would never match.

use crate::model::AttributeValue;

/// Returned when an attribute value is not a plain string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotAString;

impl std::fmt::Display for NotAString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "attribute value is not a string")
    }
}

impl std::error::Error for NotAString {}

/// Maps an attribute name to a label-safe identifier.
///
/// Every character outside `[A-Za-z0-9_]` becomes `_`. Idempotent.
pub fn normalize_label(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Normalizes an allow-list, dropping names that collide after normalization.
///
/// First occurrence wins, order is preserved.
pub fn normalize_label_list<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let label = normalize_label(name.as_ref());
        if !out.contains(&label) {
            out.push(label);
        }
    }
    out
}

/// Extracts the printable value of an attribute.
///
/// Only text attributes qualify; scalars, booleans and anything structured
/// are skipped by the caller.
pub fn attribute_string(value: &AttributeValue) -> Result<&str, NotAString> {
    match value {
        AttributeValue::Text(s) => Ok(s),
        AttributeValue::Number(_) | AttributeValue::Boolean(_) | AttributeValue::Unknown(_) => {
            Err(NotAString)
        }
    }
}
