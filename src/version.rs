//! Version resolution module.

pub mod catalog;
pub mod filter;
pub mod hosted;
pub mod types;
pub mod ystream;
