//! # Eviction Strategy Traits
//!
//! The online engine asks two questions every time the cache is over
//! capacity. Each question is a trait so strategies can be swapped without
//! touching the engine.
//!
//! ## Architecture
//!
//! ```text
//!            ┌──────────────────────────────────────────────┐
//!            │            OnlineEngine<O, D>                │
//!            │                                              │
//!            │   while |cache| > k(t):                      │
//!            │     D.find_domination(..) ── Some ──► Rule 1 │
//!            │            │                                 │
//!            │          None                                │
//!            │            ▼                                 │
//!            │     O.select_eviction(..) ──────────► Rule 2 │
//!            └───────────┬──────────────────────┬───────────┘
//!                        │                      │
//!                        ▼                      ▼
//!   ┌──────────────────────────────┐  ┌──────────────────────────────────┐
//!   │   EvictionOracle             │  │   DominationStrategy             │
//!   │                              │  │                                  │
//!   │  select_eviction(cache,      │  │  find_domination(cache, future,  │
//!   │    now, future) → Page       │  │    labels) → Option<Domination>  │
//!   │                              │  │                                  │
//!   │  FurthestInFuture (default)  │  │  NoDomination (default)          │
//!   └──────────────────────────────┘  └──────────────────────────────────┘
//! ```
//!
//! ## Contracts
//!
//! | Trait                | Input never mutated | Must return                      |
//! |----------------------|---------------------|----------------------------------|
//! | `EvictionOracle`     | yes                 | a page of a non-empty cache      |
//! | `DominationStrategy` | yes                 | `None`, or a page + its chains   |
//!
//! Both must be deterministic: ties are broken by a total order so that two
//! runs over the same input make the same decisions.
//!
//! `future` is always the suffix of requests strictly after the one being
//! served.

use std::collections::BTreeSet;

use crate::model::{Chain, Labels, Page, Request};

/// Resident pages of the online cache, ordered by id.
pub type CacheSet = BTreeSet<Page>;

/// Chooses the page to evict when no domination rule applies (Rule 2).
pub trait EvictionOracle {
    /// Returns the page of `cache` to evict, or `None` if `cache` is empty.
    fn select_eviction(
        &self,
        cache: &CacheSet,
        current_time: usize,
        future: &[Request],
    ) -> Option<Page>;
}

/// Outcome of a domination check: `page` dominates `chains`.
#[derive(Debug, Clone, PartialEq)]
pub struct Domination {
    pub page: Page,
    pub chains: Vec<Chain>,
}

/// Detects whether a page dominates a set of future request chains (Rule 1).
///
/// When a result is returned the engine evicts, among cached pages no heavier
/// than `page`, the one used furthest in the future, and sets the label of
/// every request in every chain to `page.weight()`.
pub trait DominationStrategy {
    fn find_domination(
        &self,
        cache: &CacheSet,
        future: &[Request],
        labels: &Labels,
    ) -> Option<Domination>;
}

impl<T: EvictionOracle + ?Sized> EvictionOracle for &T {
    fn select_eviction(
        &self,
        cache: &CacheSet,
        current_time: usize,
        future: &[Request],
    ) -> Option<Page> {
        (**self).select_eviction(cache, current_time, future)
    }
}

impl<T: EvictionOracle + ?Sized> EvictionOracle for Box<T> {
    fn select_eviction(
        &self,
        cache: &CacheSet,
        current_time: usize,
        future: &[Request],
    ) -> Option<Page> {
        (**self).select_eviction(cache, current_time, future)
    }
}

impl<T: DominationStrategy + ?Sized> DominationStrategy for &T {
    fn find_domination(
        &self,
        cache: &CacheSet,
        future: &[Request],
        labels: &Labels,
    ) -> Option<Domination> {
        (**self).find_domination(cache, future, labels)
    }
}

impl<T: DominationStrategy + ?Sized> DominationStrategy for Box<T> {
    fn find_domination(
        &self,
        cache: &CacheSet,
        future: &[Request],
        labels: &Labels,
    ) -> Option<Domination> {
        (**self).find_domination(cache, future, labels)
    }
}
