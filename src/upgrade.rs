//! Upgrade scheduling and observation module.

pub mod plan;
pub mod poller;
pub mod types;
