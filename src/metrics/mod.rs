//! Online engine counters (feature `metrics`).

pub mod metrics_impl;
pub mod snapshot;
pub mod traits;

pub use metrics_impl::EngineMetrics;
pub use snapshot::EngineMetricsSnapshot;
pub use traits::{EngineMetricsRecorder, MetricsSnapshotProvider};
