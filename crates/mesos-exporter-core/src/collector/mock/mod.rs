//! In-memory state source and fixtures for tests.
//!
//! `MockSource` stands in for a master so the collection cycle can be
//! exercised without a network, and `scenarios` provides canned `/state`
//! documents.

mod scenarios;
mod source;

pub use scenarios::small_cluster_state;
pub use source::MockSource;
