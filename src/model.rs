//! Paging model shared by the online engine and the offline solver.
//!
//! ## Key Components
//!
//! - [`Page`]: identity + load weight. Equality, hashing and ordering use the
//!   id only.
//! - [`Request`]: a page request at a position and time step.
//! - [`CapacitySchedule`]: cache slots available per time step, with an
//!   explicit default for missing steps.
//! - [`CacheState`]: resident pages after serving one step; a run's ordered
//!   states form its schedule.
//! - [`Chain`] / [`Labels`]: inputs and outputs of the domination rule.
//!
//! ## Cost Model
//!
//! ```text
//!   step t, request r, previous resident set S(t-1):
//!
//!     cost(t) = w(r)              if r ∉ S(t-1)
//!             + Σ w(p)            for p ∈ S(t) \ S(t-1), p ≠ r
//!
//!     |S(t)| <= k(t)
//! ```
//!
//! The requested page does not have to stay resident: a request may be
//! served by loading the page and evicting it in the same step. It is still
//! charged. [`schedule_cost`] evaluates this formula for any schedule.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, InvariantError};

/// Capacity used for time steps missing from a [`CapacitySchedule`].
pub const DEFAULT_CAPACITY: usize = 1;

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

/// A page with a load weight.
///
/// Two `Page` values with the same id are the same page, even if they were
/// constructed separately.
///
/// # Example
///
/// ```
/// use varpage::model::Page;
///
/// let a = Page::new("A", 1.0);
/// let also_a = Page::new("A", 1.0);
/// assert_eq!(a, also_a);
/// assert_eq!(a.weight(), 1.0);
/// ```
#[derive(Clone)]
pub struct Page {
    id: Arc<str>,
    weight: f64,
}

impl Page {
    /// Creates a page, rejecting non-positive or non-finite weights.
    pub fn try_new(id: impl Into<Arc<str>>, weight: f64) -> Result<Self, ConfigError> {
        let id = id.into();
        if !weight.is_finite() || weight <= 0.0 {
            return Err(ConfigError::new(format!(
                "page {id}: weight must be positive and finite, got {weight}"
            )));
        }
        Ok(Self { id, weight })
    }

    /// Creates a page.
    ///
    /// # Panics
    ///
    /// Panics if `weight` is not positive and finite. Use
    /// [`try_new`](Self::try_new) for user-supplied values.
    pub fn new(id: impl Into<Arc<str>>, weight: f64) -> Self {
        match Self::try_new(id, weight) {
            Ok(page) => page,
            Err(err) => panic!("{err}"),
        }
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Cost of loading this page.
    #[inline]
    pub fn weight(&self) -> f64 {
        self.weight
    }
}

impl PartialEq for Page {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Page {}

impl Hash for Page {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for Page {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Page {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(w={})", self.id, self.weight)
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// A request for `page` at sequence position `index` and schedule step
/// `time_step`.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    index: usize,
    page: Page,
    time_step: usize,
}

impl Request {
    #[inline]
    pub fn new(index: usize, page: Page, time_step: usize) -> Self {
        Self {
            index,
            page,
            time_step,
        }
    }

    /// Builds a request sequence with `time_step = index + 1`.
    ///
    /// ```
    /// use varpage::model::{Page, Request};
    ///
    /// let a = Page::new("A", 1.0);
    /// let b = Page::new("B", 2.0);
    /// let requests = Request::sequence([a.clone(), b, a]);
    /// assert_eq!(requests.len(), 3);
    /// assert_eq!(requests[2].time_step(), 3);
    /// ```
    pub fn sequence(pages: impl IntoIterator<Item = Page>) -> Vec<Request> {
        pages
            .into_iter()
            .enumerate()
            .map(|(index, page)| Request::new(index, page, index + 1))
            .collect()
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn page(&self) -> &Page {
        &self.page
    }

    #[inline]
    pub fn time_step(&self) -> usize {
        self.time_step
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Req(t={}, {})", self.time_step, self.page)
    }
}

// ---------------------------------------------------------------------------
// CapacitySchedule
// ---------------------------------------------------------------------------

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

/// Cache slots available at each time step.
///
/// Steps without an entry fall back to the schedule's default capacity
/// ([`DEFAULT_CAPACITY`] unless overridden). Fallbacks are logged at `debug`
/// level.
///
/// # Example
///
/// ```
/// use varpage::model::CapacitySchedule;
///
/// let caps: CapacitySchedule = [(1, 2), (2, 2), (3, 1)].into_iter().collect();
/// assert_eq!(caps.capacity_at(3), 1);
/// assert_eq!(caps.capacity_at(9), 1); // default
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacitySchedule {
    #[serde(default)]
    entries: BTreeMap<usize, usize>,
    #[serde(default = "default_capacity")]
    default_capacity: usize,
}

impl Default for CapacitySchedule {
    fn default() -> Self {
        Self::new()
    }
}

impl CapacitySchedule {
    /// Creates an empty schedule with the standard default capacity.
    pub fn new() -> Self {
        Self::with_default(DEFAULT_CAPACITY)
    }

    /// Creates an empty schedule whose missing steps use `default_capacity`.
    pub fn with_default(default_capacity: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            default_capacity,
        }
    }

    /// Same capacity for steps `1..=steps`.
    pub fn uniform(steps: usize, capacity: usize) -> Self {
        (1..=steps).map(|step| (step, capacity)).collect()
    }

    /// Sets the capacity of `time_step`, returning the previous entry.
    pub fn set(&mut self, time_step: usize, capacity: usize) -> Option<usize> {
        self.entries.insert(time_step, capacity)
    }

    /// Explicit entry for `time_step`, if any.
    #[inline]
    pub fn get(&self, time_step: usize) -> Option<usize> {
        self.entries.get(&time_step).copied()
    }

    #[inline]
    pub fn default_capacity(&self) -> usize {
        self.default_capacity
    }

    /// Capacity in effect at `time_step`.
    pub fn capacity_at(&self, time_step: usize) -> usize {
        match self.entries.get(&time_step) {
            Some(&capacity) => capacity,
            None => {
                tracing::debug!(
                    time_step,
                    capacity = self.default_capacity,
                    "no capacity entry, using default"
                );
                self.default_capacity
            },
        }
    }

    /// Largest capacity in effect over the steps referenced by `requests`.
    pub fn max_over(&self, requests: &[Request]) -> usize {
        requests
            .iter()
            .map(|r| self.capacity_at(r.time_step()))
            .max()
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.entries.iter().map(|(&step, &capacity)| (step, capacity))
    }
}

impl FromIterator<(usize, usize)> for CapacitySchedule {
    fn from_iter<I: IntoIterator<Item = (usize, usize)>>(iter: I) -> Self {
        let mut schedule = Self::new();
        schedule.entries.extend(iter);
        schedule
    }
}

// ---------------------------------------------------------------------------
// CacheState
// ---------------------------------------------------------------------------

/// Resident pages right after the request at `time_step` was served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheState {
    pub time_step: usize,
    pub capacity: usize,
    pub pages: BTreeSet<Page>,
}

impl CacheState {
    pub fn new(time_step: usize, capacity: usize, pages: BTreeSet<Page>) -> Self {
        Self {
            time_step,
            capacity,
            pages,
        }
    }

    #[inline]
    pub fn contains(&self, page: &Page) -> bool {
        self.pages.contains(page)
    }

    /// Page ids in ascending order.
    pub fn page_ids(&self) -> Vec<&str> {
        self.pages.iter().map(Page::id).collect()
    }
}

impl fmt::Display for CacheState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[t={}] k={} | Cache: {:?}",
            self.time_step,
            self.capacity,
            self.page_ids()
        )
    }
}

/// Cost of `schedule` for `requests` under the variable-capacity cost model.
///
/// States are matched to requests by position. The requested page is charged
/// when it was not resident at the previous step; any other page that newly
/// appears in a state is charged its weight.
pub fn schedule_cost(requests: &[Request], schedule: &[CacheState]) -> f64 {
    let empty = BTreeSet::new();
    let mut previous = &empty;
    let mut cost = 0.0;

    for (request, state) in requests.iter().zip(schedule) {
        let requested = request.page();
        if !previous.contains(requested) {
            cost += requested.weight();
        }
        cost += state
            .pages
            .iter()
            .filter(|p| *p != requested && !previous.contains(*p))
            .map(Page::weight)
            .sum::<f64>();
        previous = &state.pages;
    }

    cost
}

/// Verifies that no state holds more pages than its capacity.
pub fn check_capacity(schedule: &[CacheState]) -> Result<(), InvariantError> {
    for state in schedule {
        if state.pages.len() > state.capacity {
            return Err(InvariantError::new(format!(
                "step {} holds {} pages, capacity {}",
                state.time_step,
                state.pages.len(),
                state.capacity
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Chain
// ---------------------------------------------------------------------------

/// Ordered run of future requests considered by the domination rule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chain {
    requests: Vec<Request>,
}

impl Chain {
    pub fn new(requests: Vec<Request>) -> Self {
        Self { requests }
    }

    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Load cost of the chain if nothing is evicted across it: the weights of
    /// its distinct pages.
    pub fn cost(&self) -> f64 {
        let mut seen = BTreeSet::new();
        let mut cost = 0.0;
        for request in &self.requests {
            if seen.insert(request.page().id()) {
                cost += request.page().weight();
            }
        }
        cost
    }

    /// First and last time step, or `None` for an empty chain.
    pub fn interval(&self) -> Option<(usize, usize)> {
        let first = self.requests.first()?;
        let last = self.requests.last()?;
        Some((first.time_step(), last.time_step()))
    }
}

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

/// Per-request potentials used by the domination rule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Labels {
    values: FxHashMap<usize, f64>,
}

impl Labels {
    /// One zero label per request.
    pub fn for_requests(requests: &[Request]) -> Self {
        Self {
            values: requests.iter().map(|r| (r.index(), 0.0)).collect(),
        }
    }

    /// Label of request `index` (0 when unknown).
    #[inline]
    pub fn get(&self, index: usize) -> f64 {
        self.values.get(&index).copied().unwrap_or(0.0)
    }

    #[inline]
    pub fn set(&mut self, index: usize, value: f64) {
        self.values.insert(index, value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
