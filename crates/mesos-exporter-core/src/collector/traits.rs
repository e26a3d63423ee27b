//! Abstraction over where the master state comes from.
//!
//! The `StateSource` trait lets the collector fetch from a live master over
//! HTTP or from an in-memory mock in tests.

use crate::model::State;

/// Error fetching or decoding the master state.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchError {
    /// Connection, TLS or timeout failure.
    Transport(String),
    /// Master answered with a non-success status.
    Status { url: String, status: u16 },
    /// Response body was not a valid state document.
    Decode(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Transport(msg) => write!(f, "fetch failed: {}", msg),
            FetchError::Status { url, status } => {
                write!(f, "{} returned HTTP {}", url, status)
            }
            FetchError::Decode(msg) => write!(f, "invalid state document: {}", msg),
        }
    }
}

impl std::error::Error for FetchError {}

/// Source of master state snapshots.
///
/// `fetch_state` blocks until a full document is decoded. Deadlines are the
/// implementation's concern.
pub trait StateSource: Send + Sync {
    /// Fetches and decodes one snapshot.
    fn fetch_state(&self) -> Result<State, FetchError>;

    /// Location the state is fetched from, for logging.
    fn url(&self) -> String;
}
