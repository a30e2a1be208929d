//! # Metrics Traits
//!
//! Recording and snapshotting are separate responsibilities: the engine only
//! writes counters through [`EngineMetricsRecorder`]; tests and benches read
//! them through [`MetricsSnapshotProvider`].
//!
//! ```text
//!   ┌──────────────────────────┐        ┌──────────────────────────────┐
//!   │  EngineMetricsRecorder   │        │  MetricsSnapshotProvider<S>  │
//!   │  hit / miss              │        │  snapshot() → S              │
//!   │  domination_eviction     │        │  (bench/test)                │
//!   │  oracle_eviction         │        └──────────────────────────────┘
//!   │  fallback_eviction       │
//!   │  label_update            │
//!   └──────────────────────────┘
//! ```

/// Counters written by the online engine while serving requests.
pub trait EngineMetricsRecorder {
    fn record_hit(&mut self);
    fn record_miss(&mut self);
    /// Rule 1 eviction (domination fired).
    fn record_domination_eviction(&mut self);
    /// Rule 2 eviction (oracle).
    fn record_oracle_eviction(&mut self);
    /// Furthest-In-Future eviction after a strategy named no cached page.
    fn record_fallback_eviction(&mut self);
    fn record_label_updates(&mut self, count: u64);
}

/// Read a point-in-time copy of the counters.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}
