//! mesos-exporter-core — Mesos master state to Prometheus metrics.
//!
//! Provides:
//! - `model` — decoded `/state` document (agents, frameworks, resources)
//! - `metrics` — range codec, attribute labels, metric descriptors and registry
//! - `collector` — state sources and the per-scrape collection cycle
//!
//! With `http` feature (default):
//! - `collector::HttpStateSource` — blocking HTTP client for a live master

pub mod collector;
pub mod metrics;
pub mod model;

/// Version string including the git revision the crate was built from.
pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_SHA"), ")");
