//! Data model for the Mesos master `/state` document.
//!
//! - [`state`]: the decoded snapshot (agents, frameworks, resource pools)
//! - [`attribute`]: loosely-typed agent attribute values
//!
//! A [`State`] is decoded once per collection cycle and dropped afterwards.
//! Field names follow the master's JSON, so agents are called *slaves* here
//! as they are in the exported metric names.

mod attribute;
mod state;

pub use attribute::AttributeValue;
pub use state::{Framework, FrameworkResources, Resources, Slave, State};
