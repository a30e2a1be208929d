//! Min-cost-flow formulation of the offline problem.
//!
//! ```text
//!   requests + capacities
//!          │
//!          ├── layered::build ───┐
//!          └── interval::build ──┴─► FlowNetwork ──MinCostFlowSolver──► FlowAssignment
//!                                         │                                  │
//!                                         └──────── reconstruct ◄────────────┘
//!                                                  (schedule + cost)
//! ```
//!
//! The network is plain data ([`network`]). Solvers sit behind
//! [`MinCostFlowSolver`]; [`SuccessiveShortestPath`] is the built-in one.

pub mod dot;
pub mod interval;
pub mod layered;
pub mod network;
pub mod reconstruct;
pub mod ssp;

pub use network::{EdgeKind, FlowAssignment, FlowEdge, FlowNetwork, FlowNode, StepInfo};
pub use ssp::SuccessiveShortestPath;

use rustc_hash::FxHashMap;

use crate::error::SolveError;
use crate::model::{CapacitySchedule, Page, Request};

/// Computes a minimum-cost flow routing [`FlowNetwork::units`] from source to
/// sink.
///
/// Implementations return integral flows and must not mutate the network.
pub trait MinCostFlowSolver {
    fn solve(&self, network: &FlowNetwork) -> Result<FlowAssignment, SolveError>;
}

impl<T: MinCostFlowSolver + ?Sized> MinCostFlowSolver for &T {
    fn solve(&self, network: &FlowNetwork) -> Result<FlowAssignment, SolveError> {
        (**self).solve(network)
    }
}

impl<T: MinCostFlowSolver + ?Sized> MinCostFlowSolver for Box<T> {
    fn solve(&self, network: &FlowNetwork) -> Result<FlowAssignment, SolveError> {
        (**self).solve(network)
    }
}

/// Distinct pages in order of first request, and the page index of every
/// request.
pub(crate) fn index_pages(requests: &[Request]) -> (Vec<Page>, Vec<usize>) {
    let mut pages = Vec::new();
    let mut index: FxHashMap<&str, usize> = FxHashMap::default();
    let mut requested = Vec::with_capacity(requests.len());

    for request in requests {
        let page = request.page();
        let i = *index.entry(page.id()).or_insert_with(|| {
            pages.push(page.clone());
            pages.len() - 1
        });
        requested.push(i);
    }
    (pages, requested)
}

pub(crate) fn step_infos(requests: &[Request], capacities: &CapacitySchedule) -> Vec<StepInfo> {
    requests
        .iter()
        .map(|r| StepInfo {
            time_step: r.time_step(),
            capacity: capacities.capacity_at(r.time_step()),
        })
        .collect()
}
