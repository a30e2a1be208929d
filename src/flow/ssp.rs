//! Successive-shortest-path min-cost flow.
//!
//! ## Architecture
//!
//! ```text
//!   FlowNetwork edge e (u → v, cap c, weight w)
//!
//!   arcs[2e]     u → v   residual c - f   cost  w      (forward)
//!   arcs[2e + 1] v → u   residual f       cost -w      (backward)
//!
//!   loop until `units` routed:
//!     Bellman-Ford (queue based) from source over arcs with residual > 0
//!     sink unreachable  → InfeasibleNetwork
//!     push min residual along the parent chain, at most the remaining units
//! ```
//!
//! Costs are compared in two tiers: the number of `-LARGE` rewards collected
//! (see [`FlowNetwork::carries_reward`]) first, then the real cost. This is
//! the order the large constant encodes, without summing values that differ
//! by many orders of magnitude in one `f64`.
//!
//! Real costs compare equal within `epsilon * max |real edge cost|`. The
//! tolerance scales with the instance, so rounding in long path sums never
//! reads as an improvement and tiny weights are still told apart.
//!
//! Every network the crate builds is acyclic, so the initial residual graph
//! has no negative cycle and shortest-path augmentation keeps it that way.
//! A relaxation count above the node count, or a parent chain that revisits a
//! node, still reports [`SolveError::NegativeCycle`] for hand-built networks.

use std::cmp::Ordering;
use std::collections::VecDeque;

use petgraph::visit::EdgeRef;
use tracing::trace;

use crate::error::SolveError;
use crate::flow::MinCostFlowSolver;
use crate::flow::network::{FlowAssignment, FlowNetwork};

/// Default tolerance for real-cost comparisons, relative to the largest
/// real edge cost of the network.
pub const DEFAULT_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy)]
struct Arc {
    to: usize,
    residual: i64,
    cost: PathCost,
}

/// Cost as `(rewards, real)`: each reward counts `-1`, compared first.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PathCost {
    rewards: i64,
    real: f64,
}

impl PathCost {
    const ZERO: PathCost = PathCost {
        rewards: 0,
        real: 0.0,
    };

    #[inline]
    fn add(self, other: PathCost) -> PathCost {
        PathCost {
            rewards: self.rewards + other.rewards,
            real: self.real + other.real,
        }
    }

    #[inline]
    fn negate(self) -> PathCost {
        PathCost {
            rewards: -self.rewards,
            real: -self.real,
        }
    }

    #[inline]
    fn compare(self, other: PathCost, tolerance: f64) -> Ordering {
        match self.rewards.cmp(&other.rewards) {
            Ordering::Equal => {
                if self.real < other.real - tolerance {
                    Ordering::Less
                } else if self.real > other.real + tolerance {
                    Ordering::Greater
                } else {
                    Ordering::Equal
                }
            },
            unequal => unequal,
        }
    }
}

/// Successive shortest augmenting paths over a residual graph.
#[derive(Debug, Clone, Copy)]
pub struct SuccessiveShortestPath {
    epsilon: f64,
}

impl Default for SuccessiveShortestPath {
    fn default() -> Self {
        Self::new()
    }
}

impl SuccessiveShortestPath {
    pub fn new() -> Self {
        Self::with_epsilon(DEFAULT_EPSILON)
    }

    /// Relative tolerance: two real costs compare equal when they differ by
    /// at most `epsilon` times the largest real edge cost.
    pub fn with_epsilon(epsilon: f64) -> Self {
        Self { epsilon }
    }

    #[inline]
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Absolute tolerance for one network.
    fn tolerance(&self, arcs: &[Arc]) -> f64 {
        let scale = arcs
            .iter()
            .map(|arc| arc.cost.real.abs())
            .fold(0.0, f64::max);
        self.epsilon * scale
    }

    /// Shortest-path tree from `source`; `parent[v]` is the arc entering `v`.
    fn shortest_paths(
        arcs: &[Arc],
        adjacency: &[Vec<usize>],
        source: usize,
        tolerance: f64,
    ) -> Result<Vec<Option<usize>>, SolveError> {
        let n = adjacency.len();
        let mut dist: Vec<Option<PathCost>> = vec![None; n];
        let mut parent: Vec<Option<usize>> = vec![None; n];
        let mut queued = vec![false; n];
        let mut relaxations = vec![0usize; n];
        let mut queue = VecDeque::new();

        dist[source] = Some(PathCost::ZERO);
        queue.push_back(source);
        queued[source] = true;

        while let Some(u) = queue.pop_front() {
            queued[u] = false;
            let Some(du) = dist[u] else { continue };

            for &a in &adjacency[u] {
                let arc = arcs[a];
                if arc.residual <= 0 {
                    continue;
                }
                let candidate = du.add(arc.cost);
                let better = match dist[arc.to] {
                    None => true,
                    Some(dv) => candidate.compare(dv, tolerance) == Ordering::Less,
                };
                if !better {
                    continue;
                }

                dist[arc.to] = Some(candidate);
                parent[arc.to] = Some(a);
                relaxations[arc.to] += 1;
                if relaxations[arc.to] > n {
                    return Err(SolveError::NegativeCycle);
                }
                if !queued[arc.to] {
                    queued[arc.to] = true;
                    queue.push_back(arc.to);
                }
            }
        }
        Ok(parent)
    }
}

/// Arcs from `sink` back to `source` along `parent`, at most one per node.
fn augmenting_path(
    arcs: &[Arc],
    parent: &[Option<usize>],
    source: usize,
    sink: usize,
) -> Result<Vec<usize>, SolveError> {
    let mut path = Vec::new();
    let mut v = sink;
    while v != source {
        if path.len() >= parent.len() {
            return Err(SolveError::NegativeCycle);
        }
        let Some(a) = parent[v] else {
            return Err(SolveError::NegativeCycle);
        };
        path.push(a);
        v = arcs[a ^ 1].to;
    }
    Ok(path)
}

impl MinCostFlowSolver for SuccessiveShortestPath {
    fn solve(&self, network: &FlowNetwork) -> Result<FlowAssignment, SolveError> {
        let graph = network.graph();
        let n = graph.node_count();
        let m = graph.edge_count();
        let required = network.units();

        let mut arcs = vec![
            Arc {
                to: 0,
                residual: 0,
                cost: PathCost::ZERO,
            };
            2 * m
        ];
        let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); n];

        for e in graph.edge_references() {
            let (u, v) = (e.source().index(), e.target().index());
            let edge = e.weight();
            let cost = PathCost {
                rewards: if network.carries_reward(edge.weight) { -1 } else { 0 },
                real: network.real_cost(edge.weight),
            };
            let forward = 2 * e.id().index();
            arcs[forward] = Arc {
                to: v,
                residual: edge.capacity,
                cost,
            };
            arcs[forward + 1] = Arc {
                to: u,
                residual: 0,
                cost: cost.negate(),
            };
            adjacency[u].push(forward);
            adjacency[v].push(forward + 1);
        }

        let source = network.source().index();
        let sink = network.sink().index();
        let tolerance = self.tolerance(&arcs);
        let mut routed = 0i64;
        let mut augmentations = 0usize;

        while routed < required {
            let parent = Self::shortest_paths(&arcs, &adjacency, source, tolerance)?;
            if parent[sink].is_none() {
                return Err(SolveError::InfeasibleNetwork { required, routed });
            }

            let path = augmenting_path(&arcs, &parent, source, sink)?;
            let push = path
                .iter()
                .map(|&a| arcs[a].residual)
                .fold(required - routed, i64::min);
            for &a in &path {
                arcs[a].residual -= push;
                arcs[a ^ 1].residual += push;
            }

            routed += push;
            augmentations += 1;
            trace!(push, routed, required, "augmented along shortest path");
        }

        trace!(augmentations, "min-cost flow complete");
        let flows = (0..m).map(|e| arcs[2 * e + 1].residual).collect();
        Ok(FlowAssignment::from_flows(flows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Reduction;
    use crate::engine::OnlineEngine;
    use crate::flow::network::{EdgeKind, FlowNode, NetworkBuilder};
    use crate::flow::{interval, layered, reconstruct};
    use crate::model::{CapacitySchedule, Page, Request};

    fn solve_both(requests: &[Request], caps: &CapacitySchedule) -> (f64, f64) {
        let solver = SuccessiveShortestPath::new();
        let mut costs = [0.0; 2];
        let networks = [
            layered::build(requests, caps, 1_000_000.0),
            interval::build(requests, caps, 1_000_000.0),
        ];
        for (cost, net) in costs.iter_mut().zip(&networks) {
            let flow = solver.solve(net).unwrap();
            assert!(flow.check_feasible(net).is_ok());
            let (required, saturated) = reconstruct::reward_saturation(net, &flow);
            assert_eq!(required, saturated);
            *cost = reconstruct::cost(net, &flow);
        }
        (costs[0], costs[1])
    }

    fn diamond(units: i64, cheap_capacity: i64) -> FlowNetwork {
        let mut b = NetworkBuilder::new();
        let left = FlowNode::StepIn { step: 0 };
        let right = FlowNode::StepIn { step: 1 };
        b.edge(FlowNode::Source, left, 2, 1.0, EdgeKind::Load);
        b.edge(FlowNode::Source, right, 2, 5.0, EdgeKind::Load);
        b.edge(left, FlowNode::Sink, cheap_capacity, 0.0, EdgeKind::Drain);
        b.edge(right, FlowNode::Sink, 2, 0.0, EdgeKind::Drain);
        b.finish(units, 1_000.0, Vec::new(), Vec::new(), Vec::new(), Reduction::Layered)
    }

    #[test]
    fn prefers_the_cheaper_route() {
        let net = diamond(2, 2);
        let flow = SuccessiveShortestPath::new().solve(&net).unwrap();

        assert!(flow.check_feasible(&net).is_ok());
        assert_eq!(flow.raw_cost(&net), 2.0);
    }

    #[test]
    fn overflows_to_the_expensive_route() {
        let net = diamond(3, 1);
        let flow = SuccessiveShortestPath::new().solve(&net).unwrap();

        assert!(flow.check_feasible(&net).is_ok());
        // one unit via left (1), two via right (5 each)
        assert_eq!(flow.raw_cost(&net), 11.0);
    }

    #[test]
    fn reports_infeasible_demand() {
        let net = diamond(5, 2);
        let err = SuccessiveShortestPath::new().solve(&net).unwrap_err();
        assert_eq!(
            err,
            SolveError::InfeasibleNetwork {
                required: 5,
                routed: 4
            }
        );
    }

    #[test]
    fn reward_edges_win_over_any_real_cost() {
        let mut b = NetworkBuilder::new();
        let mid = FlowNode::StepIn { step: 0 };
        b.edge(FlowNode::Source, FlowNode::Sink, 1, 0.0, EdgeKind::Bypass);
        b.edge(FlowNode::Source, mid, 1, 400.0, EdgeKind::Load);
        b.edge(mid, FlowNode::Sink, 1, -1_000.0, EdgeKind::Serve);
        let net = b.finish(1, 1_000.0, Vec::new(), Vec::new(), Vec::new(), Reduction::Layered);

        let flow = SuccessiveShortestPath::new().solve(&net).unwrap();
        assert_eq!(flow.flow(petgraph::graph::EdgeIndex::new(0)), 0);
        assert_eq!(flow.raw_cost(&net), -600.0);
    }

    #[test]
    fn zero_units_is_the_zero_flow() {
        let net = diamond(0, 2);
        let flow = SuccessiveShortestPath::new().solve(&net).unwrap();
        assert_eq!(flow.active_edges().count(), 0);
    }

    #[test]
    fn negative_cycle_is_reported() {
        let mut b = NetworkBuilder::new();
        let x = FlowNode::StepIn { step: 0 };
        let y = FlowNode::StepIn { step: 1 };
        b.edge(FlowNode::Source, x, 1, 0.0, EdgeKind::Supply);
        b.edge(x, y, 1, -3.0, EdgeKind::Switch);
        b.edge(y, x, 1, -3.0, EdgeKind::Switch);
        b.edge(y, FlowNode::Sink, 1, 0.0, EdgeKind::Drain);
        let net = b.finish(1, 1_000.0, Vec::new(), Vec::new(), Vec::new(), Reduction::Layered);

        let err = SuccessiveShortestPath::new().solve(&net).unwrap_err();
        assert_eq!(err, SolveError::NegativeCycle);
    }

    #[test]
    fn parent_cycle_is_a_negative_cycle() {
        let arc = |to| Arc {
            to,
            residual: 1,
            cost: PathCost::ZERO,
        };
        // arcs 0/1 form 1 -> 2, arcs 2/3 form 2 -> 1; node 0 is never reached
        let arcs = [arc(2), arc(1), arc(1), arc(2)];
        let parent = [None, Some(2), Some(0)];

        assert_eq!(
            augmenting_path(&arcs, &parent, 0, 2).unwrap_err(),
            SolveError::NegativeCycle
        );
    }

    #[test]
    fn tolerance_scales_with_edge_costs() {
        let solver = SuccessiveShortestPath::new();
        let arcs = |real: f64| {
            [
                Arc {
                    to: 1,
                    residual: 1,
                    cost: PathCost { rewards: 0, real },
                },
                Arc {
                    to: 0,
                    residual: 0,
                    cost: PathCost {
                        rewards: 0,
                        real: -real,
                    },
                },
            ]
        };

        assert_eq!(solver.tolerance(&arcs(2e7)), 2e7 * DEFAULT_EPSILON);
        assert_eq!(solver.tolerance(&arcs(3e-11)), 3e-11 * DEFAULT_EPSILON);
        assert_eq!(solver.tolerance(&arcs(0.0)), 0.0);
    }

    #[test]
    fn large_fractional_weights_terminate() {
        let p0 = Page::new("p0", 63_686_471.413_222_77);
        let p1 = Page::new("p1", 15_474_438.556_752_482);
        let p2 = Page::new("p2", 31_254_693.370_302_24);
        let requests = Request::sequence([
            p2.clone(),
            p0.clone(),
            p1.clone(),
            p1.clone(),
            p2.clone(),
            p1.clone(),
            p0.clone(),
            p0.clone(),
            p1,
            p2,
            p0,
        ]);
        let caps: CapacitySchedule = [
            (1, 3),
            (2, 2),
            (3, 3),
            (4, 3),
            (5, 0),
            (6, 3),
            (7, 3),
            (8, 3),
            (9, 0),
            (10, 1),
            (11, 3),
        ]
        .into_iter()
        .collect();

        let (layered_cost, interval_cost) = solve_both(&requests, &caps);
        let online = OnlineEngine::new(caps).run(&requests).total_cost;

        assert!((layered_cost - interval_cost).abs() <= 1e-6 * online);
        assert!(layered_cost <= online * (1.0 + 1e-9));
        assert!(layered_cost > 0.0);
    }

    #[test]
    fn tiny_weights_keep_the_optimum() {
        let scale = 1e-11;
        let a = Page::new("A", 1.0 * scale);
        let b = Page::new("B", 2.0 * scale);
        let c = Page::new("C", 10.0 * scale);
        let d = Page::new("D", 3.0 * scale);
        let requests = Request::sequence([a.clone(), b.clone(), c, a, d, b]);
        let caps: CapacitySchedule = [(1, 2), (2, 2), (3, 1), (4, 2), (5, 2), (6, 2)]
            .into_iter()
            .collect();

        let (layered_cost, interval_cost) = solve_both(&requests, &caps);
        assert!((layered_cost - 17.0 * scale).abs() < 1e-20, "{layered_cost}");
        assert!((interval_cost - 17.0 * scale).abs() < 1e-20, "{interval_cost}");
    }
}
