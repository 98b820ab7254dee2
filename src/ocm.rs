//! OpenShift Cluster Manager API module.

pub mod client;
pub mod types;
