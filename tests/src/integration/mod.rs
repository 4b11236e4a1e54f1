//! Integration flows.

pub mod concurrency;
pub mod fixtures;
pub mod scenarios;
