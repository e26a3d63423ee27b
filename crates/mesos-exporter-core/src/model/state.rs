//! Snapshot of the master's cluster state.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer};

use super::attribute::AttributeValue;
use crate::metrics::ranges::{self, Ranges};

/// Root of the master's `/state` document.
///
/// Only the parts needed for metrics are decoded; everything else in the
/// payload is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct State {
    #[serde(default, deserialize_with = "null_or_default")]
    pub slaves: Vec<Slave>,
    #[serde(default, deserialize_with = "null_or_default")]
    pub frameworks: Vec<Framework>,
}

/// A registered agent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Slave {
    /// libprocess PID, e.g. `slave(1)@10.0.0.1:5051`.
    #[serde(default, deserialize_with = "null_or_default")]
    pub pid: String,
    #[serde(default, deserialize_with = "null_or_default")]
    pub hostname: String,
    /// Total resources advertised by the agent.
    #[serde(default, rename = "resources", deserialize_with = "null_or_default")]
    pub total: Resources,
    #[serde(default, rename = "used_resources", deserialize_with = "null_or_default")]
    pub used: Resources,
    #[serde(default, rename = "unreserved_resources", deserialize_with = "null_or_default")]
    pub unreserved: Resources,
    #[serde(default, deserialize_with = "null_or_default")]
    pub attributes: HashMap<String, AttributeValue>,
}

/// Resource pool of an agent.
///
/// `mem` and `disk` are reported in the master's native units; the metric
/// layer scales them by 1024 for the `_bytes` series.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Resources {
    #[serde(default, deserialize_with = "null_or_default")]
    pub cpus: f64,
    #[serde(default, deserialize_with = "null_or_default")]
    pub mem: f64,
    #[serde(default, deserialize_with = "null_or_default")]
    pub disk: f64,
    #[serde(default, deserialize_with = "ranges::deserialize_lenient")]
    pub ports: Ranges,
}

/// A registered framework.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Framework {
    #[serde(default, deserialize_with = "null_or_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_or_default")]
    pub active: bool,
    #[serde(default, rename = "used_resources", deserialize_with = "null_or_default")]
    pub used: FrameworkResources,
    #[serde(default, rename = "offered_resources", deserialize_with = "null_or_default")]
    pub offered: FrameworkResources,
}

/// Resources held by a framework. Port ranges are not tracked at this level.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FrameworkResources {
    #[serde(default, deserialize_with = "null_or_default")]
    pub cpus: f64,
    #[serde(default, deserialize_with = "null_or_default")]
    pub mem: f64,
    #[serde(default, deserialize_with = "null_or_default")]
    pub disk: f64,
}

/// Treats an explicit `null` like a missing key.
fn null_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
