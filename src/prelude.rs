pub use crate::config::{Reduction, SolverConfig};
pub use crate::engine::{OnlineEngine, OnlineRun, RunState};
pub use crate::error::{ConfigError, InvariantError, SolveError};
pub use crate::flow::{FlowAssignment, FlowNetwork, MinCostFlowSolver, SuccessiveShortestPath};
pub use crate::generator::nested_sequence;
pub use crate::model::{
    CacheState, CapacitySchedule, Chain, Labels, Page, Request, check_capacity, schedule_cost,
};
pub use crate::offline::{OfflineSolution, OfflineSolver};
pub use crate::policy::{FurthestInFuture, NoDomination};
pub use crate::traits::{CacheSet, Domination, DominationStrategy, EvictionOracle};

#[cfg(feature = "metrics")]
pub use crate::metrics::{EngineMetrics, EngineMetricsSnapshot};
