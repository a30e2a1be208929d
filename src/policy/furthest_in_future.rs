//! Furthest-In-Future eviction oracle.
//!
//! Evicts the cached page whose next request lies furthest ahead. This is
//! Belady's rule: optimal for unit weights and a fixed capacity, a heuristic
//! once weights and a varying capacity are involved.
//!
//! ## Selection Order
//!
//! ```text
//!   key(p) = (next_use(p), weight(p), id(p))      evict max key
//!
//!   next_use:  At(t) < Never           (never requested again = furthest)
//!   weight:    heavier page wins ties  (heuristic policy choice)
//!   id:        larger id wins ties     (determinism)
//!
//!   cache {A(w=1), B(w=2), C(w=10)}
//!   future: A@4  D@5  B@6
//!
//!     A → At(4)   B → At(6)   C → Never          evict C
//! ```
//!
//! The weight tie-break has no optimality proof in the weighted,
//! variable-capacity setting. It is kept as a documented policy.
//!
//! ## Example Usage
//!
//! ```
//! use varpage::model::{Page, Request};
//! use varpage::policy::FurthestInFuture;
//! use varpage::traits::{CacheSet, EvictionOracle};
//!
//! let a = Page::new("A", 1.0);
//! let b = Page::new("B", 2.0);
//! let cache: CacheSet = [a.clone(), b.clone()].into_iter().collect();
//! let future = Request::sequence([a.clone(), b.clone()]);
//!
//! let victim = FurthestInFuture.select_eviction(&cache, 0, &future);
//! assert_eq!(victim, Some(b));
//! ```

use std::cmp::Ordering;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::model::{Page, Request};
use crate::traits::{CacheSet, EvictionOracle};

/// When a page is next requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NextUse {
    /// Next requested at this time step.
    At(usize),
    /// Not requested again.
    Never,
}

/// Next-use time of every candidate page within `future`.
pub fn next_uses<'a>(
    candidates: &[&'a Page],
    future: &[Request],
) -> FxHashMap<&'a str, NextUse> {
    let wanted: FxHashSet<&str> = candidates.iter().map(|p| p.id()).collect();
    let mut found: FxHashMap<&str, usize> = FxHashMap::default();

    for request in future {
        if found.len() == wanted.len() {
            break;
        }
        let id = request.page().id();
        if wanted.contains(id) {
            found.entry(id).or_insert(request.time_step());
        }
    }

    candidates
        .iter()
        .map(|p| {
            let next = found.get(p.id()).map_or(NextUse::Never, |&t| NextUse::At(t));
            (p.id(), next)
        })
        .collect()
}

/// Picks the candidate with the furthest next use, breaking ties by larger
/// weight and then larger id. Returns `None` when there are no candidates.
pub fn select_furthest<'a>(
    candidates: impl IntoIterator<Item = &'a Page>,
    future: &[Request],
) -> Option<Page> {
    let candidates: Vec<&Page> = candidates.into_iter().collect();
    let next = next_uses(&candidates, future);
    let rank = |p: &Page| next.get(p.id()).copied().unwrap_or(NextUse::Never);

    candidates
        .into_iter()
        .max_by(|a, b| compare_victims(a, rank(a), b, rank(b)))
        .cloned()
}

fn compare_victims(a: &Page, a_next: NextUse, b: &Page, b_next: NextUse) -> Ordering {
    a_next
        .cmp(&b_next)
        .then_with(|| a.weight().total_cmp(&b.weight()))
        .then_with(|| a.id().cmp(b.id()))
}

/// Furthest-In-Future oracle (the default Rule 2).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FurthestInFuture;

impl EvictionOracle for FurthestInFuture {
    fn select_eviction(
        &self,
        cache: &CacheSet,
        _current_time: usize,
        future: &[Request],
    ) -> Option<Page> {
        select_furthest(cache.iter(), future)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache_of(pages: &[&Page]) -> CacheSet {
        pages.iter().map(|p| (*p).clone()).collect()
    }

    fn future_of(start_step: usize, pages: &[&Page]) -> Vec<Request> {
        pages
            .iter()
            .enumerate()
            .map(|(i, p)| Request::new(start_step + i - 1, (*p).clone(), start_step + i))
            .collect()
    }

    #[test]
    fn never_requested_page_is_evicted_first() {
        let a = Page::new("A", 1.0);
        let b = Page::new("B", 2.0);
        let c = Page::new("C", 10.0);
        let d = Page::new("D", 3.0);
        let cache = cache_of(&[&a, &b, &c]);
        let future = future_of(4, &[&a, &d, &b]);

        assert_eq!(FurthestInFuture.select_eviction(&cache, 3, &future), Some(c));
    }

    #[test]
    fn furthest_next_use_wins_over_weight() {
        let a = Page::new("A", 1.0);
        let b = Page::new("B", 2.0);
        let cache = cache_of(&[&a, &b]);
        // B is heavier but A is needed later
        let future = future_of(4, &[&b, &a]);

        assert_eq!(FurthestInFuture.select_eviction(&cache, 3, &future), Some(a));
    }

    #[test]
    fn ties_prefer_heavier_page() {
        let a = Page::new("A", 1.0);
        let b = Page::new("B", 2.0);
        let d = Page::new("D", 3.0);
        let cache = cache_of(&[&a, &b, &d]);

        assert_eq!(FurthestInFuture.select_eviction(&cache, 6, &[]), Some(d));
    }

    #[test]
    fn equal_weight_ties_prefer_larger_id() {
        let x = Page::new("X", 2.0);
        let y = Page::new("Y", 2.0);
        let cache = cache_of(&[&x, &y]);

        assert_eq!(FurthestInFuture.select_eviction(&cache, 1, &[]), Some(y));
    }

    #[test]
    fn only_first_occurrence_counts() {
        let a = Page::new("A", 1.0);
        let b = Page::new("B", 1.0);
        let cache = cache_of(&[&a, &b]);
        // A@1, B@2, A@3: B's first use is later than A's
        let future = future_of(1, &[&a, &b, &a]);

        assert_eq!(FurthestInFuture.select_eviction(&cache, 0, &future), Some(b));
    }

    #[test]
    fn empty_cache_has_no_victim() {
        assert_eq!(FurthestInFuture.select_eviction(&CacheSet::new(), 1, &[]), None);
    }

    #[test]
    fn inputs_are_not_mutated() {
        let a = Page::new("A", 1.0);
        let b = Page::new("B", 2.0);
        let cache = cache_of(&[&a, &b]);
        let future = future_of(2, &[&a]);
        let before = (cache.clone(), future.clone());

        let _ = FurthestInFuture.select_eviction(&cache, 1, &future);
        assert_eq!((cache, future), before);
    }

    #[test]
    fn next_uses_reports_never_for_absent_pages() {
        let a = Page::new("A", 1.0);
        let b = Page::new("B", 1.0);
        let future = future_of(5, &[&a]);
        let next = next_uses(&[&a, &b], &future);

        assert_eq!(next["A"], NextUse::At(5));
        assert_eq!(next["B"], NextUse::Never);
        assert!(NextUse::At(usize::MAX) < NextUse::Never);
    }
}
