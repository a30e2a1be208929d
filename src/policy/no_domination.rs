//! Domination strategy that never fires.
//!
//! With this strategy every eviction goes through the oracle (Rule 2). It is
//! the engine's default; a real domination check can be plugged in through
//! [`DominationStrategy`].

use crate::model::{Labels, Request};
use crate::traits::{CacheSet, Domination, DominationStrategy};

/// Always reports "no domination".
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NoDomination;

impl DominationStrategy for NoDomination {
    #[inline]
    fn find_domination(
        &self,
        _cache: &CacheSet,
        _future: &[Request],
        _labels: &Labels,
    ) -> Option<Domination> {
        None
    }
}
