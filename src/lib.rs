//! varpage: weighted paging with a cache whose capacity changes over time.
//!
//! An online engine ([`engine`]) serves requests with pluggable eviction
//! rules; an offline solver ([`offline`]) computes the optimal schedule as a
//! min-cost flow ([`flow`]). [`generator`] builds nested adversarial
//! sequences for comparing the two.

pub mod config;
pub mod engine;
pub mod error;
pub mod flow;
pub mod generator;
pub mod model;
pub mod offline;
pub mod policy;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod prelude;
pub mod traits;
