//! Pre-built master states for testing.

use std::collections::HashMap;

use super::source::MockSource;
use crate::model::{AttributeValue, Framework, FrameworkResources, Resources, Slave, State};

impl MockSource {
    /// One agent `s1` on host `h1`, no frameworks.
    ///
    /// 4 CPUs, 1024 units of memory and disk, ports 31000-32000, attribute
    /// `rack=r1`.
    pub fn single_agent() -> Self {
        Self::new(State {
            slaves: vec![Slave {
                pid: "s1".to_string(),
                hostname: "h1".to_string(),
                total: Resources {
                    cpus: 4.0,
                    mem: 1024.0,
                    disk: 1024.0,
                    ports: vec![(31000, 32000)].into(),
                },
                attributes: HashMap::from([("rack".to_string(), AttributeValue::from("r1"))]),
                ..Default::default()
            }],
            frameworks: Vec::new(),
        })
    }

    /// Two agents in different racks running two frameworks.
    pub fn small_cluster() -> Self {
        Self::new(small_cluster_state())
    }
}

/// State behind [`MockSource::small_cluster`].
pub fn small_cluster_state() -> State {
    State {
        slaves: vec![
            Slave {
                pid: "slave(1)@10.0.0.1:5051".to_string(),
                hostname: "agent-1".to_string(),
                total: Resources {
                    cpus: 8.0,
                    mem: 16384.0,
                    disk: 102400.0,
                    ports: vec![(31000, 32000)].into(),
                },
                used: Resources {
                    cpus: 3.5,
                    mem: 4096.0,
                    disk: 2048.0,
                    ports: vec![(31000, 31009)].into(),
                },
                unreserved: Resources {
                    cpus: 4.5,
                    mem: 12288.0,
                    disk: 100352.0,
                    ports: vec![(31010, 32000)].into(),
                },
                attributes: HashMap::from([
                    ("rack".to_string(), AttributeValue::from("r1")),
                    ("zone-id".to_string(), AttributeValue::from("eu-1a")),
                    ("cores".to_string(), AttributeValue::Number(8.0)),
                ]),
            },
            Slave {
                pid: "slave(1)@10.0.0.2:5051".to_string(),
                hostname: "agent-2".to_string(),
                total: Resources {
                    cpus: 4.0,
                    mem: 8192.0,
                    disk: 51200.0,
                    ports: vec![(31000, 31499), (31500, 32000)].into(),
                },
                unreserved: Resources {
                    cpus: 4.0,
                    mem: 8192.0,
                    disk: 51200.0,
                    ports: vec![(31000, 31499), (31500, 32000)].into(),
                },
                attributes: HashMap::from([("rack".to_string(), AttributeValue::from("r2"))]),
                ..Default::default()
            },
        ],
        frameworks: vec![
            Framework {
                name: "marathon".to_string(),
                active: true,
                used: FrameworkResources {
                    cpus: 3.0,
                    mem: 3072.0,
                    disk: 2048.0,
                },
                offered: FrameworkResources {
                    cpus: 4.0,
                    mem: 8192.0,
                    disk: 51200.0,
                },
            },
            Framework {
                name: "chronos".to_string(),
                active: false,
                used: FrameworkResources {
                    cpus: 0.5,
                    mem: 1024.0,
                    disk: 0.0,
                },
                offered: FrameworkResources::default(),
            },
        ],
    }
}
