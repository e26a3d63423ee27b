//! Mock state source.

use std::sync::{Mutex, PoisonError};

use crate::collector::traits::{FetchError, StateSource};
use crate::model::State;

/// State source that returns whatever it was last given.
///
/// The next response can be swapped at any time, which is how tests move a
/// collector from one snapshot to the next or simulate an unreachable master.
#[derive(Debug)]
pub struct MockSource {
    next: Mutex<Result<State, FetchError>>,
}

impl MockSource {
    /// Creates a source that always returns `state`.
    pub fn new(state: State) -> Self {
        Self {
            next: Mutex::new(Ok(state)),
        }
    }

    /// Creates a source from a raw `/state` JSON document.
    pub fn from_json(json: &str) -> Result<Self, FetchError> {
        let state = serde_json::from_str(json).map_err(|e| FetchError::Decode(e.to_string()))?;
        Ok(Self::new(state))
    }

    /// Replaces the snapshot returned by subsequent fetches.
    pub fn set_state(&self, state: State) {
        *self.next.lock().unwrap_or_else(PoisonError::into_inner) = Ok(state);
    }

    /// Makes subsequent fetches fail with `error`.
    pub fn fail_with(&self, error: FetchError) {
        *self.next.lock().unwrap_or_else(PoisonError::into_inner) = Err(error);
    }
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new(State::default())
    }
}

impl StateSource for MockSource {
    fn fetch_state(&self) -> Result<State, FetchError> {
        self.next
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn url(&self) -> String {
        "mock:///state".to_string()
    }
}
