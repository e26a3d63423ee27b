//! The fixed set of metrics derived from the master state.
//!
//! Every tracked quantity is a [`MetricDescriptor`] paired with a short
//! projection over [`State`]. The set is built once by [`RegistryBuilder`]
//! and never changes afterwards.
//!
//! ```text
//! mesos_slave_{cpus,mem_bytes,disk_bytes,ports}[_used|_unreserved]  {slave, hostname}
//! mesos_framework_{active,cpu_used,mem_used,disk_used,...}         {framework}
//! mesos_slave_attributes                                            {slave, <attributes>...}
//! ```

use prometheus::Opts;
use tracing::{debug, trace};

use super::attributes::{attribute_string, normalize_label, normalize_label_list};
use super::descriptor::{Extractor, MetricDescriptor, MetricKind, Sample, UpdateMode};
use crate::model::{Framework, Slave, State};

/// Namespace prefix of every exported metric.
pub const NAMESPACE: &str = "mesos";

const SLAVE_LABELS: [&str; 2] = ["slave", "hostname"];
const FRAMEWORK_LABELS: [&str; 1] = ["framework"];

/// Master reports memory and disk in units of 1024 bytes.
const BYTES_PER_UNIT: f64 = 1024.0;

type SlaveValue = fn(&Slave) -> f64;
type FrameworkValue = fn(&Framework) -> f64;

const SLAVE_GAUGES: &[(&str, &str, SlaveValue)] = &[
    ("cpus", "Total slave CPUs (fractional)", |s| s.total.cpus),
    ("cpus_used", "Used slave CPUs (fractional)", |s| s.used.cpus),
    ("cpus_unreserved", "Unreserved slave CPUs (fractional)", |s| {
        s.unreserved.cpus
    }),
    ("mem_bytes", "Total slave memory in bytes", |s| {
        s.total.mem * BYTES_PER_UNIT
    }),
    ("mem_used_bytes", "Used slave memory in bytes", |s| {
        s.used.mem * BYTES_PER_UNIT
    }),
    ("mem_unreserved_bytes", "Unreserved slave memory in bytes", |s| {
        s.unreserved.mem * BYTES_PER_UNIT
    }),
    ("disk_bytes", "Total slave disk space in bytes", |s| {
        s.total.disk * BYTES_PER_UNIT
    }),
    ("disk_used_bytes", "Used slave disk space in bytes", |s| {
        s.used.disk * BYTES_PER_UNIT
    }),
    ("disk_unreserved_bytes", "Unreserved slave disk in bytes", |s| {
        s.unreserved.disk * BYTES_PER_UNIT
    }),
    ("ports", "Total slave ports", |s| s.total.ports.size() as f64),
    ("ports_used", "Used slave ports", |s| s.used.ports.size() as f64),
    ("ports_unreserved", "Unreserved slave ports", |s| {
        s.unreserved.ports.size() as f64
    }),
];

// Framework values are exported in the master's native units, unlike the
// slave `_bytes` gauges. Dashboards depend on this.
const FRAMEWORK_GAUGES: &[(&str, &str, FrameworkValue)] = &[
    ("active", "Active framework", |f| {
        if f.active { 1.0 } else { 0.0 }
    }),
    ("cpu_used", "Framework cpu used", |f| f.used.cpus),
    ("disk_used", "Framework disk used", |f| f.used.disk),
    ("mem_used", "Framework memory used", |f| f.used.mem),
    ("cpu_offered", "Framework cpu offered", |f| f.offered.cpus),
    ("mem_offered", "Framework mem offered", |f| f.offered.mem),
    ("disk_offered", "Framework disk offered", |f| f.offered.disk),
];

/// Error building the registry, typically an attribute name that does not
/// make a valid label even after normalization.
#[derive(Debug)]
pub struct RegistryError(prometheus::Error);

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid metric descriptor: {}", self.0)
    }
}

impl std::error::Error for RegistryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl From<prometheus::Error> for RegistryError {
    fn from(e: prometheus::Error) -> Self {
        Self(e)
    }
}

/// Builds a [`MetricRegistry`].
#[derive(Debug, Clone, Default)]
pub struct RegistryBuilder {
    slave_attributes: Vec<String>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Agent attribute names to export as labels of `mesos_slave_attributes`.
    ///
    /// An empty list leaves the metric out entirely.
    pub fn with_slave_attributes<S: AsRef<str>>(mut self, names: &[S]) -> Self {
        self.slave_attributes = normalize_label_list(names);
        self
    }

    pub fn build(self) -> Result<MetricRegistry, RegistryError> {
        let mut descriptors =
            Vec::with_capacity(SLAVE_GAUGES.len() + FRAMEWORK_GAUGES.len() + 1);

        for &(name, help, value) in SLAVE_GAUGES {
            descriptors.push(MetricDescriptor::new(
                opts("slave", name, help, &SLAVE_LABELS),
                MetricKind::Gauge,
                UpdateMode::Replace,
                slave_gauge(value),
            )?);
        }

        for &(name, help, value) in FRAMEWORK_GAUGES {
            descriptors.push(MetricDescriptor::new(
                opts("framework", name, help, &FRAMEWORK_LABELS),
                MetricKind::Gauge,
                UpdateMode::Replace,
                framework_gauge(value),
            )?);
        }

        if !self.slave_attributes.is_empty() {
            let mut labels = vec![SLAVE_LABELS[0].to_string()];
            labels.extend(self.slave_attributes.iter().cloned());
            // Counter with set semantics: rows of retired agents are kept.
            descriptors.push(MetricDescriptor::new(
                opts("slave", "attributes", "Attributes assigned to slaves", &labels[..]),
                MetricKind::Counter,
                UpdateMode::Accumulate,
                slave_attributes(self.slave_attributes),
            )?);
        }

        debug!(metrics = descriptors.len(), "metric registry built");
        Ok(MetricRegistry { descriptors })
    }
}

/// Closed set of metric descriptors. Read-only after construction and safe
/// to share between concurrent collection cycles.
#[derive(Debug)]
pub struct MetricRegistry {
    descriptors: Vec<MetricDescriptor>,
}

impl MetricRegistry {
    pub fn descriptors(&self) -> &[MetricDescriptor] {
        &self.descriptors
    }

    pub fn get(&self, name: &str) -> Option<&MetricDescriptor> {
        self.descriptors.iter().find(|d| d.name() == name)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

fn opts<S: AsRef<str>>(subsystem: &str, name: &str, help: &str, labels: &[S]) -> Opts {
    Opts::new(name, help)
        .namespace(NAMESPACE)
        .subsystem(subsystem)
        .variable_labels(labels.iter().map(|l| l.as_ref().to_string()).collect())
}

fn slave_gauge(value: SlaveValue) -> Extractor {
    Box::new(move |state: &State| {
        state
            .slaves
            .iter()
            .map(|s| Sample::new(vec![s.pid.clone(), s.hostname.clone()], value(s)))
            .collect()
    })
}

fn framework_gauge(value: FrameworkValue) -> Extractor {
    Box::new(move |state: &State| {
        state
            .frameworks
            .iter()
            .map(|f| Sample::new(vec![f.name.clone()], value(f)))
            .collect()
    })
}

/// One row per agent with value 1. Allow-listed attributes the agent lacks,
/// or carries with a non-string value, are exported as `""`.
fn slave_attributes(labels: Vec<String>) -> Extractor {
    Box::new(move |state: &State| {
        state
            .slaves
            .iter()
            .map(|slave| {
                let mut values = vec![String::new(); labels.len()];

                let mut attributes: Vec<_> = slave.attributes.iter().collect();
                attributes.sort_by(|a, b| a.0.cmp(b.0));
                for (key, value) in attributes {
                    let label = normalize_label(key);
                    let Some(idx) = labels.iter().position(|l| *l == label) else {
                        continue;
                    };
                    match attribute_string(value) {
                        Ok(s) => values[idx] = s.to_string(),
                        Err(e) => trace!(
                            slave = %slave.pid,
                            attribute = %key,
                            error = %e,
                            "skipping attribute"
                        ),
                    }
                }

                let mut row = Vec::with_capacity(labels.len() + 1);
                row.push(slave.pid.clone());
                row.extend(values);
                Sample::new(row, 1.0)
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AttributeValue, FrameworkResources, Resources};

    fn slave(pid: &str, hostname: &str) -> Slave {
        Slave {
            pid: pid.to_string(),
            hostname: hostname.to_string(),
            ..Default::default()
        }
    }

    fn values(registry: &MetricRegistry, name: &str, state: &State) -> Vec<(Vec<String>, f64)> {
        registry
            .get(name)
            .unwrap_or_else(|| panic!("missing metric {name}"))
            .extract(state)
            .into_iter()
            .collect()
    }

    #[test]
    fn test_fixed_metric_names() {
        let registry = RegistryBuilder::new().build().unwrap();
        let names: Vec<&str> = registry.descriptors().iter().map(|d| d.name()).collect();
        assert_eq!(
            names,
            vec![
                "mesos_slave_cpus",
                "mesos_slave_cpus_used",
                "mesos_slave_cpus_unreserved",
                "mesos_slave_mem_bytes",
                "mesos_slave_mem_used_bytes",
                "mesos_slave_mem_unreserved_bytes",
                "mesos_slave_disk_bytes",
                "mesos_slave_disk_used_bytes",
                "mesos_slave_disk_unreserved_bytes",
                "mesos_slave_ports",
                "mesos_slave_ports_used",
                "mesos_slave_ports_unreserved",
                "mesos_framework_active",
                "mesos_framework_cpu_used",
                "mesos_framework_disk_used",
                "mesos_framework_mem_used",
                "mesos_framework_cpu_offered",
                "mesos_framework_mem_offered",
                "mesos_framework_disk_offered",
            ]
        );
        assert!(registry.get("mesos_slave_attributes").is_none());
        for d in registry.descriptors() {
            assert_eq!(d.kind(), MetricKind::Gauge);
            assert_eq!(d.mode(), UpdateMode::Replace);
        }
    }

    #[test]
    fn test_one_sample_per_entity() {
        let registry = RegistryBuilder::new()
            .with_slave_attributes(&["rack"])
            .build()
            .unwrap();
        let state = State {
            slaves: vec![slave("s1", "h1"), slave("s2", "h2"), slave("s3", "h3")],
            frameworks: vec![
                Framework {
                    name: "marathon".into(),
                    ..Default::default()
                },
                Framework {
                    name: "chronos".into(),
                    ..Default::default()
                },
            ],
        };

        for d in registry.descriptors() {
            let expected = if d.name().starts_with("mesos_framework_") { 2 } else { 3 };
            assert_eq!(d.extract(&state).len(), expected, "{}", d.name());
        }

        for d in registry.descriptors() {
            assert!(d.extract(&State::default()).is_empty(), "{}", d.name());
        }
    }

    #[test]
    fn test_unit_conversion() {
        let registry = RegistryBuilder::new().build().unwrap();
        let mut s = slave("s1", "h1");
        s.total.mem = 2.0;
        s.used.disk = 3.0;
        s.unreserved.cpus = 1.5;
        let state = State {
            slaves: vec![s],
            frameworks: vec![Framework {
                name: "f".into(),
                used: FrameworkResources {
                    cpus: 1.0,
                    mem: 2.0,
                    disk: 3.0,
                },
                ..Default::default()
            }],
        };

        let key = vec!["s1".to_string(), "h1".to_string()];
        assert_eq!(
            values(&registry, "mesos_slave_mem_bytes", &state),
            vec![(key.clone(), 2048.0)]
        );
        assert_eq!(
            values(&registry, "mesos_slave_disk_used_bytes", &state),
            vec![(key.clone(), 3072.0)]
        );
        assert_eq!(
            values(&registry, "mesos_slave_cpus_unreserved", &state),
            vec![(key, 1.5)]
        );
        // No conversion for frameworks.
        assert_eq!(
            values(&registry, "mesos_framework_mem_used", &state),
            vec![(vec!["f".to_string()], 2.0)]
        );
    }

    #[test]
    fn test_ports_and_active() {
        let registry = RegistryBuilder::new().build().unwrap();
        let mut s = slave("s1", "h1");
        s.total = Resources {
            ports: "[31000-32000]".parse().unwrap(),
            ..Default::default()
        };
        s.used.ports = "[31000-31002,31005-31005]".parse().unwrap();
        let state = State {
            slaves: vec![s],
            frameworks: vec![
                Framework {
                    name: "on".into(),
                    active: true,
                    ..Default::default()
                },
                Framework {
                    name: "off".into(),
                    ..Default::default()
                },
            ],
        };

        assert_eq!(values(&registry, "mesos_slave_ports", &state)[0].1, 1001.0);
        assert_eq!(values(&registry, "mesos_slave_ports_used", &state)[0].1, 4.0);
        assert_eq!(values(&registry, "mesos_slave_ports_unreserved", &state)[0].1, 0.0);
        assert_eq!(
            values(&registry, "mesos_framework_active", &state),
            vec![
                (vec!["off".to_string()], 0.0),
                (vec!["on".to_string()], 1.0),
            ]
        );
    }

    #[test]
    fn test_slave_attributes_metric() {
        let registry = RegistryBuilder::new()
            .with_slave_attributes(&["rack", "rack-id", "zone", "cores"])
            .build()
            .unwrap();
        let d = registry.get("mesos_slave_attributes").unwrap();
        assert_eq!(d.kind(), MetricKind::Counter);
        assert_eq!(d.mode(), UpdateMode::Accumulate);
        assert_eq!(d.help(), "Attributes assigned to slaves");
        assert_eq!(d.label_names(), &["slave", "rack", "rack_id", "zone", "cores"]);

        let mut s = slave("s1", "h1");
        s.attributes.insert("rack".into(), AttributeValue::from("r1"));
        s.attributes.insert("rack.id".into(), AttributeValue::from("42"));
        s.attributes.insert("cores".into(), AttributeValue::Number(8.0));
        s.attributes.insert("ignored".into(), AttributeValue::from("x"));
        let state = State {
            slaves: vec![s],
            frameworks: Vec::new(),
        };

        let samples: Vec<_> = d.extract(&state).into_iter().collect();
        assert_eq!(
            samples,
            vec![(
                vec![
                    "s1".to_string(),
                    "r1".to_string(),
                    "42".to_string(),
                    String::new(),
                    String::new(),
                ],
                1.0
            )]
        );
    }

    #[test]
    fn test_invalid_attribute_label() {
        assert!(RegistryBuilder::new()
            .with_slave_attributes(&["1st-floor"])
            .build()
            .is_err());
        // Collides with the slave label itself.
        assert!(RegistryBuilder::new()
            .with_slave_attributes(&["slave"])
            .build()
            .is_err());
    }
}
