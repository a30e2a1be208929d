#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EngineMetricsSnapshot {
    pub requests: u64,
    pub hits: u64,
    pub misses: u64,

    pub domination_evictions: u64,
    pub oracle_evictions: u64,
    pub fallback_evictions: u64,
    pub label_updates: u64,
}

impl EngineMetricsSnapshot {
    /// Total evictions across both rules and the fallback.
    pub fn evictions(&self) -> u64 {
        self.domination_evictions + self.oracle_evictions + self.fallback_evictions
    }

    /// Fraction of requests served without a load.
    pub fn hit_ratio(&self) -> f64 {
        if self.requests == 0 {
            0.0
        } else {
            self.hits as f64 / self.requests as f64
        }
    }
}
