use crate::metrics::snapshot::EngineMetricsSnapshot;
use crate::metrics::traits::{EngineMetricsRecorder, MetricsSnapshotProvider};

#[derive(Debug, Default, Clone)]
pub struct EngineMetrics {
    pub hits: u64,
    pub misses: u64,
    pub domination_evictions: u64,
    pub oracle_evictions: u64,
    pub fallback_evictions: u64,
    pub label_updates: u64,
}

impl EngineMetricsRecorder for EngineMetrics {
    #[inline]
    fn record_hit(&mut self) {
        self.hits += 1;
    }

    #[inline]
    fn record_miss(&mut self) {
        self.misses += 1;
    }

    #[inline]
    fn record_domination_eviction(&mut self) {
        self.domination_evictions += 1;
    }

    #[inline]
    fn record_oracle_eviction(&mut self) {
        self.oracle_evictions += 1;
    }

    #[inline]
    fn record_fallback_eviction(&mut self) {
        self.fallback_evictions += 1;
    }

    #[inline]
    fn record_label_updates(&mut self, count: u64) {
        self.label_updates += count;
    }
}

impl MetricsSnapshotProvider<EngineMetricsSnapshot> for EngineMetrics {
    fn snapshot(&self) -> EngineMetricsSnapshot {
        EngineMetricsSnapshot {
            requests: self.hits + self.misses,
            hits: self.hits,
            misses: self.misses,
            domination_evictions: self.domination_evictions,
            oracle_evictions: self.oracle_evictions,
            fallback_evictions: self.fallback_evictions,
            label_updates: self.label_updates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_recorded_counters() {
        let mut metrics = EngineMetrics::default();
        metrics.record_miss();
        metrics.record_miss();
        metrics.record_hit();
        metrics.record_oracle_eviction();
        metrics.record_domination_eviction();
        metrics.record_fallback_eviction();
        metrics.record_label_updates(3);

        let snap = metrics.snapshot();
        assert_eq!(snap.requests, 3);
        assert_eq!(snap.hits, 1);
        assert_eq!(snap.misses, 2);
        assert_eq!(snap.evictions(), 3);
        assert_eq!(snap.fallback_evictions, 1);
        assert_eq!(snap.label_updates, 3);
        assert!((snap.hit_ratio() - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn empty_snapshot_has_zero_hit_ratio() {
        assert_eq!(EngineMetrics::default().snapshot().hit_ratio(), 0.0);
    }
}
