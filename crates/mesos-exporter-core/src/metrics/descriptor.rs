//! A single exported metric: its descriptor, extraction function and the
//! most recently published sample set.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock};

use prometheus::Opts;
use prometheus::core::Desc;
use prometheus::proto::{Counter, Gauge, LabelPair, Metric, MetricFamily, MetricType};

use crate::model::State;

/// Samples keyed by label values, in descriptor label order.
pub type SampleSet = BTreeMap<Vec<String>, f64>;

/// Maps a snapshot to the samples of one metric. Must not fail.
pub type Extractor = Box<dyn Fn(&State) -> Vec<Sample> + Send + Sync>;

/// One labelled value produced by an [`Extractor`].
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub labels: Vec<String>,
    pub value: f64,
}

impl Sample {
    pub fn new(labels: Vec<String>, value: f64) -> Self {
        Self { labels, value }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Gauge,
    Counter,
}

/// How a fresh sample set is combined with the published one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    /// Drop everything previously published. Entities missing from the new
    /// snapshot disappear.
    Replace,
    /// Overwrite matching label sets, keep the rest.
    Accumulate,
}

/// Metric descriptor bound to its extraction function.
///
/// The published sample set is never mutated in place: each update builds a
/// complete set and swaps the `Arc`, so a concurrent reader sees either the
/// old or the new set, never a partially reset one.
pub struct MetricDescriptor {
    desc: Desc,
    kind: MetricKind,
    mode: UpdateMode,
    extract: Extractor,
    published: RwLock<Arc<SampleSet>>,
}

impl MetricDescriptor {
    /// Creates a descriptor named `<namespace>_<subsystem>_<name>`.
    ///
    /// Name and label validation is delegated to [`Desc::new`].
    pub fn new(
        opts: Opts,
        kind: MetricKind,
        mode: UpdateMode,
        extract: Extractor,
    ) -> prometheus::Result<Self> {
        let desc = Desc::new(
            opts.fq_name(),
            opts.help.clone(),
            opts.variable_labels.clone(),
            HashMap::new(),
        )?;
        Ok(Self {
            desc,
            kind,
            mode,
            extract,
            published: RwLock::new(Arc::new(SampleSet::new())),
        })
    }

    pub fn name(&self) -> &str {
        &self.desc.fq_name
    }

    pub fn help(&self) -> &str {
        &self.desc.help
    }

    pub fn label_names(&self) -> &[String] {
        &self.desc.variable_labels
    }

    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    pub fn mode(&self) -> UpdateMode {
        self.mode
    }

    pub fn desc(&self) -> &Desc {
        &self.desc
    }

    /// Runs the extraction function without touching published state.
    ///
    /// Duplicate label sets collapse, the last sample wins.
    pub fn extract(&self, state: &State) -> SampleSet {
        (self.extract)(state)
            .into_iter()
            .map(|s| (s.labels, s.value))
            .collect()
    }

    /// Recomputes samples from `state` and publishes them.
    ///
    /// Returns the set that was published by this call.
    pub fn update(&self, state: &State) -> Arc<SampleSet> {
        let fresh = self.extract(state);

        let mut published = self
            .published
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let next = match self.mode {
            UpdateMode::Replace => Arc::new(fresh),
            UpdateMode::Accumulate => {
                let mut merged = SampleSet::clone(&published);
                merged.extend(fresh);
                Arc::new(merged)
            }
        };
        *published = Arc::clone(&next);
        next
    }

    /// Currently published sample set.
    pub fn published(&self) -> Arc<SampleSet> {
        Arc::clone(&self.published.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Renders a sample set as a metric family. `None` when there are no samples.
    pub fn to_family(&self, samples: &SampleSet) -> Option<MetricFamily> {
        if samples.is_empty() {
            return None;
        }

        let metrics: Vec<Metric> = samples
            .iter()
            .map(|(values, value)| self.to_metric(values, *value))
            .collect();

        let mut family = MetricFamily::default();
        family.set_name(self.desc.fq_name.clone());
        family.set_help(self.desc.help.clone());
        family.set_field_type(match self.kind {
            MetricKind::Gauge => MetricType::GAUGE,
            MetricKind::Counter => MetricType::COUNTER,
        });
        family.set_metric(metrics.into());
        Some(family)
    }

    fn to_metric(&self, values: &[String], value: f64) -> Metric {
        let labels: Vec<LabelPair> = self
            .desc
            .variable_labels
            .iter()
            .zip(values)
            .map(|(name, value)| {
                let mut pair = LabelPair::default();
                pair.set_name(name.clone());
                pair.set_value(value.clone());
                pair
            })
            .collect();

        let mut metric = Metric::default();
        metric.set_label(labels.into());
        match self.kind {
            MetricKind::Gauge => {
                let mut gauge = Gauge::default();
                gauge.set_value(value);
                metric.set_gauge(gauge);
            }
            MetricKind::Counter => {
                let mut counter = Counter::default();
                counter.set_value(value);
                metric.set_counter(counter);
            }
        }
        metric
    }
}

impl std::fmt::Debug for MetricDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricDescriptor")
            .field("name", &self.desc.fq_name)
            .field("labels", &self.desc.variable_labels)
            .field("kind", &self.kind)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}
