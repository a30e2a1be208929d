//! Online variable-capacity paging engine.
//!
//! Serves requests one at a time without looking at anything but the cache,
//! the labels and the request suffix handed to its strategies.
//!
//! ## Transition
//!
//! ```text
//!   serve(r):
//!     1. r.page ∉ cache  →  cache += r.page, cost += w(r.page)      (miss)
//!        r.page ∈ cache  →  nothing                               (hit)
//!
//!     2. k = capacities[r.time_step]
//!        while |cache| > k:
//!          D.find_domination(cache, future, labels)
//!            Some(p, chains) → evict furthest q ∈ cache, w(q) <= w(p)  (Rule 1)
//!                              labels[x] = w(p) for x in chains
//!            None            → evict O.select_eviction(cache, ..)      (Rule 2)
//!
//!     3. history += CacheState(r.time_step, k, cache)
//! ```
//!
//! `future` is the slice of requests strictly after `r`. The loop always
//! terminates: each iteration removes one page, and `k = 0` empties the cache.
//!
//! ## Run State
//!
//! All mutable state of a run (cache, labels, cost, history) lives in one
//! [`RunState`] owned by the caller of [`OnlineEngine::serve`]. The engine
//! itself is immutable, so one engine can drive several runs, including
//! concurrent ones on separate states.
//!
//! ## Example Usage
//!
//! ```
//! use varpage::engine::OnlineEngine;
//! use varpage::model::{CapacitySchedule, Page, Request};
//!
//! let a = Page::new("A", 1.0);
//! let b = Page::new("B", 2.0);
//! let requests = Request::sequence([a.clone(), b.clone(), a.clone(), b.clone()]);
//!
//! let engine = OnlineEngine::new(CapacitySchedule::uniform(4, 1));
//! let run = engine.run(&requests);
//!
//! assert_eq!(run.total_cost, 6.0);
//! assert!(run.history.iter().all(|s| s.pages.len() <= 1));
//! ```

use tracing::{debug, trace, warn};

#[cfg(feature = "metrics")]
use crate::metrics::{
    EngineMetrics, EngineMetricsRecorder, EngineMetricsSnapshot, MetricsSnapshotProvider,
};
use crate::model::{CacheState, CapacitySchedule, Labels, Page, Request};
use crate::policy::{FurthestInFuture, NoDomination, select_furthest};
use crate::traits::{CacheSet, Domination, DominationStrategy, EvictionOracle};

/// Which rule picked an eviction candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EvictionRule {
    Domination,
    Oracle,
}

/// Result of a complete online run.
#[derive(Debug, Clone)]
pub struct OnlineRun {
    pub total_cost: f64,
    /// One state per request, in sequence order.
    pub history: Vec<CacheState>,
    /// Labels at the end of the run.
    pub labels: Labels,
    #[cfg(feature = "metrics")]
    pub metrics: EngineMetricsSnapshot,
}

/// Mutable state of one run.
#[derive(Debug, Clone)]
pub struct RunState {
    cache: CacheSet,
    total_cost: f64,
    history: Vec<CacheState>,
    labels: Labels,
    #[cfg(feature = "metrics")]
    metrics: EngineMetrics,
}

impl RunState {
    /// Fresh state for `requests`: empty cache, zero cost, zero labels.
    pub fn new(requests: &[Request]) -> Self {
        Self {
            cache: CacheSet::new(),
            total_cost: 0.0,
            history: Vec::with_capacity(requests.len()),
            labels: Labels::for_requests(requests),
            #[cfg(feature = "metrics")]
            metrics: EngineMetrics::default(),
        }
    }

    #[inline]
    pub fn cache(&self) -> &CacheSet {
        &self.cache
    }

    #[inline]
    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    #[inline]
    pub fn history(&self) -> &[CacheState] {
        &self.history
    }

    #[inline]
    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    /// Consumes the state into the run result.
    pub fn finish(self) -> OnlineRun {
        OnlineRun {
            total_cost: self.total_cost,
            history: self.history,
            labels: self.labels,
            #[cfg(feature = "metrics")]
            metrics: self.metrics.snapshot(),
        }
    }
}

/// Online engine parameterized by its Rule 2 oracle `O` and Rule 1
/// domination strategy `D`.
#[derive(Debug, Clone)]
pub struct OnlineEngine<O = FurthestInFuture, D = NoDomination> {
    capacities: CapacitySchedule,
    oracle: O,
    domination: D,
}

impl OnlineEngine {
    /// Engine with the Furthest-In-Future oracle and no domination rule.
    pub fn new(capacities: CapacitySchedule) -> Self {
        Self::with_strategies(capacities, FurthestInFuture, NoDomination)
    }
}

impl<O, D> OnlineEngine<O, D>
where
    O: EvictionOracle,
    D: DominationStrategy,
{
    pub fn with_strategies(capacities: CapacitySchedule, oracle: O, domination: D) -> Self {
        Self {
            capacities,
            oracle,
            domination,
        }
    }

    /// Replaces the Rule 2 oracle.
    pub fn with_oracle<O2: EvictionOracle>(self, oracle: O2) -> OnlineEngine<O2, D> {
        OnlineEngine {
            capacities: self.capacities,
            oracle,
            domination: self.domination,
        }
    }

    /// Replaces the Rule 1 domination strategy.
    pub fn with_domination<D2: DominationStrategy>(self, domination: D2) -> OnlineEngine<O, D2> {
        OnlineEngine {
            capacities: self.capacities,
            oracle: self.oracle,
            domination,
        }
    }

    #[inline]
    pub fn capacities(&self) -> &CapacitySchedule {
        &self.capacities
    }

    /// Serves every request of `requests` on a fresh [`RunState`].
    pub fn run(&self, requests: &[Request]) -> OnlineRun {
        let mut state = RunState::new(requests);
        for position in 0..requests.len() {
            self.serve(&mut state, requests, position);
        }
        debug!(
            requests = requests.len(),
            total_cost = state.total_cost,
            "online run finished"
        );
        state.finish()
    }

    /// Serves `requests[position]` and returns the state recorded for it.
    ///
    /// # Panics
    ///
    /// Panics if `position` is out of bounds.
    pub fn serve<'s>(
        &self,
        state: &'s mut RunState,
        requests: &[Request],
        position: usize,
    ) -> &'s CacheState {
        let request = &requests[position];
        let future = &requests[position + 1..];
        let now = request.time_step();
        let page = request.page();

        if state.cache.insert(page.clone()) {
            state.total_cost += page.weight();
            #[cfg(feature = "metrics")]
            state.metrics.record_miss();
            debug!(time_step = now, page = %page, cost = page.weight(), "miss");
        } else {
            #[cfg(feature = "metrics")]
            state.metrics.record_hit();
            trace!(time_step = now, page = %page, "hit");
        }

        let capacity = self.capacities.capacity_at(now);
        while state.cache.len() > capacity {
            self.evict_one(state, now, future);
        }

        state
            .history
            .push(CacheState::new(now, capacity, state.cache.clone()));
        let last = state.history.len() - 1;
        &state.history[last]
    }

    /// Removes exactly one page from a non-empty cache.
    fn evict_one(&self, state: &mut RunState, now: usize, future: &[Request]) {
        let (chosen, rule) = match self
            .domination
            .find_domination(&state.cache, future, &state.labels)
        {
            Some(domination) => (
                self.apply_domination(state, now, future, domination),
                EvictionRule::Domination,
            ),
            None => (
                self.oracle.select_eviction(&state.cache, now, future),
                EvictionRule::Oracle,
            ),
        };

        match chosen {
            Some(victim) if state.cache.remove(&victim) => {
                #[cfg(feature = "metrics")]
                match rule {
                    EvictionRule::Domination => state.metrics.record_domination_eviction(),
                    EvictionRule::Oracle => state.metrics.record_oracle_eviction(),
                }
                debug!(time_step = now, victim = %victim, ?rule, "evicted");
            },
            other => {
                warn!(
                    time_step = now,
                    returned = ?other,
                    ?rule,
                    "strategy returned a page outside the cache"
                );
                if let Some(victim) = select_furthest(state.cache.iter(), future) {
                    state.cache.remove(&victim);
                    #[cfg(feature = "metrics")]
                    state.metrics.record_fallback_eviction();
                }
            },
        }
    }

    fn apply_domination(
        &self,
        state: &mut RunState,
        now: usize,
        future: &[Request],
        domination: Domination,
    ) -> Option<Page> {
        let Domination { page, chains } = domination;
        let threshold = page.weight();

        let victim = select_furthest(
            state.cache.iter().filter(|q| q.weight() <= threshold),
            future,
        )
        .or_else(|| self.oracle.select_eviction(&state.cache, now, future));

        let mut updated = 0u64;
        for request in chains.iter().flat_map(|chain| chain.requests()) {
            state.labels.set(request.index(), threshold);
            updated += 1;
        }

        #[cfg(feature = "metrics")]
        state.metrics.record_label_updates(updated);
        debug!(
            time_step = now,
            dominator = %page,
            victim = ?victim,
            labels = updated,
            "rule 1: domination fired"
        );
        victim
    }
}
