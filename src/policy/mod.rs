//! Concrete eviction strategies for the online engine.

pub mod furthest_in_future;
pub mod no_domination;

pub use furthest_in_future::{FurthestInFuture, NextUse, select_furthest};
pub use no_domination::NoDomination;
