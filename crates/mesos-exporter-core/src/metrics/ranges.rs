//! Codec for Mesos range resources (port pools).
//!
//! Mesos renders range resources as a compact string such as
//! `"[31000-31099, 31101-32000]"`. Each comma-separated token is an inclusive
//! `lo-hi` pair. These are pure functions, easy to test with string inputs.

use std::str::FromStr;

use serde::{Deserialize, Deserializer};
use tracing::warn;

/// Error type for malformed range encodings.
#[derive(Debug, Clone, PartialEq)]
pub enum RangeParseError {
    /// Token did not split into exactly two `-`-delimited parts.
    BadRange(String),
    /// A bound was not a plain decimal `u64` (no sign, no blanks inside).
    BadBound { token: String, bound: String },
}

impl std::fmt::Display for RangeParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RangeParseError::BadRange(token) => write!(f, "bad range: {}", token),
            RangeParseError::BadBound { token, bound } => {
                write!(f, "bad range bound '{}' in '{}'", bound, token)
            }
        }
    }
}

impl std::error::Error for RangeParseError {}

/// Ordered list of inclusive `(lo, hi)` pairs.
///
/// Pairs are kept exactly as encoded: not sorted, not merged, not checked
/// for overlap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ranges(Vec<(u64, u64)>);

impl Ranges {
    /// Parses the Mesos range encoding.
    ///
    /// Surrounding `[`, `]` and `"` characters are stripped first. An empty
    /// string is an empty list. Any malformed token fails the whole parse.
    pub fn parse(text: &str) -> Result<Self, RangeParseError> {
        let body = text.trim_matches(|c| c == '[' || c == ']' || c == '"');
        if body.is_empty() {
            return Ok(Self::default());
        }

        let mut pairs = Vec::new();
        for token in body.split(',') {
            let (lo, hi) = token
                .split_once('-')
                .ok_or_else(|| RangeParseError::BadRange(token.to_string()))?;
            pairs.push((parse_bound(token, lo)?, parse_bound(token, hi)?));
        }

        Ok(Self(pairs))
    }

    /// Total number of elements covered, `Σ(hi - lo + 1)`.
    ///
    /// Overlapping pairs are counted twice.
    pub fn size(&self) -> u64 {
        let mut size: u64 = 0;
        for &(lo, hi) in &self.0 {
            size = size.wrapping_add(1).wrapping_add(hi.wrapping_sub(lo));
        }
        size
    }

    pub fn pairs(&self) -> &[(u64, u64)] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<(u64, u64)>> for Ranges {
    fn from(pairs: Vec<(u64, u64)>) -> Self {
        Self(pairs)
    }
}

impl FromStr for Ranges {
    type Err = RangeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Digits only. `u64::from_str` would also take a leading `+`.
fn parse_bound(token: &str, bound: &str) -> Result<u64, RangeParseError> {
    let digits = bound.trim();
    let parsed = if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        digits.parse().ok()
    } else {
        None
    };
    parsed.ok_or_else(|| RangeParseError::BadBound {
        token: token.to_string(),
        bound: digits.to_string(),
    })
}

/// Field-level deserializer for `ports`.
///
/// A malformed encoding only empties this field; the surrounding document
/// keeps decoding.
pub(crate) fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Ranges, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(text) = Option::<String>::deserialize(deserializer)? else {
        return Ok(Ranges::default());
    };
    match Ranges::parse(&text) {
        Ok(ranges) => Ok(ranges),
        Err(e) => {
            warn!(value = %text, error = %e, "ignoring malformed range resource");
            Ok(Ranges::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty() {
        assert_eq!(Ranges::parse("").unwrap(), Ranges::default());
        assert_eq!(Ranges::parse("[]").unwrap().size(), 0);
    }

    #[test]
    fn test_parse_single() {
        let r = Ranges::parse("5-5").unwrap();
        assert_eq!(r.pairs(), &[(5, 5)]);
        assert_eq!(r.size(), 1);
    }

    #[test]
    fn test_parse_multiple() {
        let r = Ranges::parse("0-3,10-12").unwrap();
        assert_eq!(r.pairs(), &[(0, 3), (10, 12)]);
        assert_eq!(r.size(), 7);
    }

    #[test]
    fn test_parse_mesos_format() {
        let r: Ranges = "[31000-31099, 31101-32000]".parse().unwrap();
        assert_eq!(r.pairs(), &[(31000, 31099), (31101, 32000)]);
        assert_eq!(r.size(), 100 + 900);

        let quoted = Ranges::parse("\"[31000-32000]\"").unwrap();
        assert_eq!(quoted.size(), 1001);
    }

    #[test]
    fn test_overlap_counted_twice() {
        let r = Ranges::parse("1-10,5-10").unwrap();
        assert_eq!(r.size(), 16);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            Ranges::parse("abc"),
            Err(RangeParseError::BadRange(_))
        ));
        assert!(matches!(
            Ranges::parse("5"),
            Err(RangeParseError::BadRange(_))
        ));
        assert!(matches!(
            Ranges::parse("5-"),
            Err(RangeParseError::BadBound { .. })
        ));
        assert!(matches!(
            Ranges::parse("-3-5"),
            Err(RangeParseError::BadBound { .. })
        ));
        assert!(matches!(
            Ranges::parse("+5-7"),
            Err(RangeParseError::BadBound { .. })
        ));
        assert!(matches!(
            Ranges::parse("1-+2"),
            Err(RangeParseError::BadBound { .. })
        ));
        assert!(matches!(
            Ranges::parse("1-18446744073709551616"),
            Err(RangeParseError::BadBound { .. })
        ));
        // One bad token poisons the whole list.
        assert!(Ranges::parse("1-2,x-4").is_err());
    }

    #[test]
    fn test_bad_bound_message() {
        let err = Ranges::parse("[31000-+32000]").unwrap_err();
        assert_eq!(
            err,
            RangeParseError::BadBound {
                token: "31000-+32000".to_string(),
                bound: "+32000".to_string(),
            }
        );
        assert_eq!(err.to_string(), "bad range bound '+32000' in '31000-+32000'");
    }

    #[test]
    fn test_deserialize_lenient() {
        #[derive(Deserialize)]
        struct Holder {
            #[serde(default, deserialize_with = "deserialize_lenient")]
            ports: Ranges,
        }

        let ok: Holder = serde_json::from_str(r#"{"ports":"[1-4]"}"#).unwrap();
        assert_eq!(ok.ports.size(), 4);

        let bad: Holder = serde_json::from_str(r#"{"ports":"[1-x]"}"#).unwrap();
        assert!(bad.ports.is_empty());

        let null: Holder = serde_json::from_str(r#"{"ports":null}"#).unwrap();
        assert!(null.ports.is_empty());

        let missing: Holder = serde_json::from_str("{}").unwrap();
        assert!(missing.ports.is_empty());
    }
}
