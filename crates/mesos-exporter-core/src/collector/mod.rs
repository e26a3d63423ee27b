//! Master state collector.
//!
//! Fetches the master's `/state` document and turns it into Prometheus metric
//! families, once per scrape.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     MasterCollector                      │
//! │  ┌────────────────────┐    ┌──────────────────────────┐  │
//! │  │   MetricRegistry   │    │   collect_cycle()        │  │
//! │  │  - descriptors     │◄───│  1. fetch State          │  │
//! │  │  - extractors      │    │  2. update descriptors   │  │
//! │  │  - published sets  │    │  3. emit MetricFamily[]  │  │
//! │  └────────────────────┘    └────────────┬─────────────┘  │
//! │                                         │                │
//! │                                  ┌──────▼──────┐         │
//! │                                  │ StateSource │ (trait) │
//! │                                  └──────┬──────┘         │
//! └─────────────────────────────────────────┼────────────────┘
//!                                           │
//!                              ┌────────────┴───────────┐
//!                              │                        │
//!                      ┌───────▼────────┐       ┌───────▼───────┐
//!                      │ HttpStateSource│       │  MockSource   │
//!                      │ (live master)  │       │  (testing)    │
//!                      └────────────────┘       └───────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use std::time::Duration;
//! use mesos_exporter_core::collector::{HttpStateSource, MasterCollector};
//! use mesos_exporter_core::metrics::RegistryBuilder;
//!
//! let source = HttpStateSource::new("http://127.0.0.1:5050", Duration::from_secs(10))?;
//! let registry = RegistryBuilder::new().with_slave_attributes(&["rack"]).build()?;
//! let collector = MasterCollector::new(source, registry);
//! let families = collector.collect_cycle()?;
//! ```
//!
//! ## Testing (with MockSource)
//!
//! ```
//! use mesos_exporter_core::collector::{MasterCollector, MockSource};
//! use mesos_exporter_core::metrics::RegistryBuilder;
//!
//! let registry = RegistryBuilder::new().build().unwrap();
//! let collector = MasterCollector::new(MockSource::single_agent(), registry);
//! let families = collector.collect_cycle().unwrap();
//! assert!(!families.is_empty());
//! ```

#[allow(clippy::module_inception)]
mod collector;
#[cfg(feature = "http")]
mod http;
pub mod mock;
pub mod traits;

pub use collector::{CollectError, MasterCollector};
#[cfg(feature = "http")]
pub use http::{DEFAULT_STATE_PATH, HttpStateSource};
pub use mock::MockSource;
pub use traits::{FetchError, StateSource};
