//! Offline optimal solver.
//!
//! Builds the configured flow reduction for a request sequence, runs a
//! [`MinCostFlowSolver`] on it and reads the optimal schedule back.
//!
//! ## Example Usage
//!
//! ```
//! use varpage::config::SolverConfig;
//! use varpage::model::{CapacitySchedule, Page, Request};
//! use varpage::offline::OfflineSolver;
//!
//! let a = Page::new("A", 1.0);
//! let b = Page::new("B", 2.0);
//! let requests = Request::sequence([a.clone(), b.clone(), a, b]);
//!
//! let solution = OfflineSolver::new(SolverConfig::default())
//!     .solve(&requests, &CapacitySchedule::uniform(4, 2));
//! assert_eq!(solution.cost, 3.0);
//! assert_eq!(solution.schedule.len(), 4);
//! ```

use tracing::{debug, warn};

use crate::config::{Reduction, SolverConfig};
use crate::error::SolveError;
use crate::flow::{
    FlowAssignment, FlowNetwork, MinCostFlowSolver, SuccessiveShortestPath, interval, layered,
    reconstruct,
};
use crate::model::{CacheState, CapacitySchedule, Request};

/// Optimal schedule with the network and flow that produced it.
#[derive(Debug, Clone)]
pub struct OfflineSolution {
    pub cost: f64,
    pub schedule: Vec<CacheState>,
    /// `None` only for [`OfflineSolution::infeasible`].
    pub network: Option<FlowNetwork>,
    pub flow: Option<FlowAssignment>,
}

impl OfflineSolution {
    /// Sentinel returned by [`OfflineSolver::solve`] when no flow exists.
    pub fn infeasible() -> Self {
        Self {
            cost: 0.0,
            schedule: Vec::new(),
            network: None,
            flow: None,
        }
    }

    pub fn is_infeasible(&self) -> bool {
        self.network.is_none()
    }
}

/// Min-cost-flow based offline optimum.
#[derive(Debug, Clone, Default)]
pub struct OfflineSolver<S = SuccessiveShortestPath> {
    config: SolverConfig,
    solver: S,
}

impl OfflineSolver {
    pub fn new(config: SolverConfig) -> Self {
        Self::with_solver(config, SuccessiveShortestPath::new())
    }
}

impl<S: MinCostFlowSolver> OfflineSolver<S> {
    pub fn with_solver(config: SolverConfig, solver: S) -> Self {
        Self { config, solver }
    }

    #[inline]
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Builds the configured reduction without solving it.
    pub fn build_network(&self, requests: &[Request], capacities: &CapacitySchedule) -> FlowNetwork {
        match self.config.reduction {
            Reduction::Layered => layered::build(requests, capacities, self.config.min_reward),
            Reduction::Interval => interval::build(requests, capacities, self.config.min_reward),
        }
    }

    /// Solves for the optimal schedule, surfacing every failure.
    pub fn try_solve(
        &self,
        requests: &[Request],
        capacities: &CapacitySchedule,
    ) -> Result<OfflineSolution, SolveError> {
        self.config.validate()?;

        let network = self.build_network(requests, capacities);
        debug!(
            reduction = %self.config.reduction,
            requests = requests.len(),
            nodes = network.node_count(),
            edges = network.edge_count(),
            "solving offline instance"
        );

        let flow = self.solver.solve(&network)?;
        let (required, saturated) = reconstruct::reward_saturation(&network, &flow);
        if saturated < required {
            return Err(SolveError::InfeasibleNetwork {
                required,
                routed: saturated,
            });
        }

        let schedule = reconstruct::schedule(&network, &flow);
        let cost = reconstruct::cost(&network, &flow);
        debug!(cost, "offline optimum found");

        Ok(OfflineSolution {
            cost,
            schedule,
            network: Some(network),
            flow: Some(flow),
        })
    }

    /// Like [`try_solve`](Self::try_solve), but logs a failure and returns
    /// [`OfflineSolution::infeasible`].
    pub fn solve(&self, requests: &[Request], capacities: &CapacitySchedule) -> OfflineSolution {
        match self.try_solve(requests, capacities) {
            Ok(solution) => solution,
            Err(err) => {
                warn!(error = %err, "offline solve failed, returning infeasible sentinel");
                OfflineSolution::infeasible()
            },
        }
    }
}
