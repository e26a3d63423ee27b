//! Collection cycle: fetch a fresh state, recompute every metric, emit.
//!
//! One cycle runs per scrape. Cycles may overlap when the server handles
//! concurrent scrapes; each descriptor publishes whole sample sets, so
//! overlapping cycles never observe each other's partial work.

use std::time::Instant;

use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use tracing::{debug, warn};

use crate::collector::traits::{FetchError, StateSource};
use crate::metrics::MetricRegistry;

/// Error running a collection cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectError {
    /// Master state could not be fetched; nothing was published.
    Fetch(FetchError),
}

impl std::fmt::Display for CollectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectError::Fetch(e) => write!(f, "master state unavailable: {}", e),
        }
    }
}

impl std::error::Error for CollectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CollectError::Fetch(e) => Some(e),
        }
    }
}

impl From<FetchError> for CollectError {
    fn from(e: FetchError) -> Self {
        CollectError::Fetch(e)
    }
}

/// Collector for the master `/state` endpoint.
///
/// Holds the immutable metric registry and the state source. Implements
/// [`prometheus::core::Collector`] so it can also be registered with a
/// `prometheus::Registry`.
pub struct MasterCollector<S: StateSource> {
    source: S,
    registry: MetricRegistry,
}

impl<S: StateSource> MasterCollector<S> {
    pub fn new(source: S, registry: MetricRegistry) -> Self {
        Self { source, registry }
    }

    pub fn registry(&self) -> &MetricRegistry {
        &self.registry
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Runs one collection cycle.
    ///
    /// On fetch failure the previously published samples are left untouched
    /// and the error is returned so the scrape can be failed.
    pub fn collect_cycle(&self) -> Result<Vec<MetricFamily>, CollectError> {
        let start = Instant::now();

        let url = self.source.url();
        debug!(url = %url, "fetching URL");
        let state = self.source.fetch_state()?;
        let fetch = start.elapsed();

        let update_start = Instant::now();
        let mut families = Vec::with_capacity(self.registry.len());
        for descriptor in self.registry.descriptors() {
            let samples = descriptor.update(&state);
            if let Some(family) = descriptor.to_family(&samples) {
                families.push(family);
            }
        }

        debug!(
            slaves = state.slaves.len(),
            frameworks = state.frameworks.len(),
            families = families.len(),
            fetch_ms = fetch.as_millis() as u64,
            update_ms = update_start.elapsed().as_millis() as u64,
            total_ms = start.elapsed().as_millis() as u64,
            "collection cycle completed"
        );

        Ok(families)
    }

    /// Families from the currently published samples, without fetching.
    pub fn published(&self) -> Vec<MetricFamily> {
        self.registry
            .descriptors()
            .iter()
            .filter_map(|d| d.to_family(&d.published()))
            .collect()
    }
}

impl<S: StateSource> Collector for MasterCollector<S> {
    fn desc(&self) -> Vec<&Desc> {
        self.registry.descriptors().iter().map(|d| d.desc()).collect()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        match self.collect_cycle() {
            Ok(families) => families,
            Err(e) => {
                warn!(url = %self.source.url(), error = %e, "collection cycle failed");
                Vec::new()
            }
        }
    }
}
