//! Mapping from master state to Prometheus metric families.
//!
//! - [`ranges`]: codec for range resources (port pools)
//! - [`attributes`]: label normalization and attribute value extraction
//! - [`descriptor`]: one metric, its extraction function and published samples
//! - [`registry`]: the fixed set of descriptors, built once at startup

pub mod attributes;
pub mod descriptor;
pub mod ranges;
pub mod registry;

pub use attributes::{NotAString, attribute_string, normalize_label, normalize_label_list};
pub use descriptor::{MetricDescriptor, MetricKind, Sample, SampleSet, UpdateMode};
pub use ranges::{RangeParseError, Ranges};
pub use registry::{MetricRegistry, NAMESPACE, RegistryBuilder, RegistryError};
