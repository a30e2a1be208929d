//! Reading a cache schedule and its cost back out of a flow.
//!
//! ```text
//!   layered:   state(t) = { page i : Resident(i) edge of layer t active }
//!              cost     = Σ flow · real_cost  over edges with real_cost > 0
//!
//!   interval:  state(j) = { page p : Retention(p, a, b) active, a <= j < b }
//!              cost     = Σ w(request) − Σ w(p) over active retentions
//! ```
//!
//! For a minimum-cost flow the edge-based cost equals
//! [`schedule_cost`](crate::model::schedule_cost) of the reconstructed
//! schedule. A non-optimal flow can pay for loads its schedule does not need,
//! so the two may differ there.

use std::collections::BTreeSet;

use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::config::Reduction;
use crate::flow::network::{EdgeKind, FlowAssignment, FlowEdge, FlowNetwork, FlowNode};
use crate::model::CacheState;

fn empty_states(network: &FlowNetwork) -> Vec<CacheState> {
    network
        .steps()
        .iter()
        .map(|s| CacheState::new(s.time_step, s.capacity, BTreeSet::new()))
        .collect()
}

/// Cache state per step, dispatching on the network's reduction.
pub fn schedule(network: &FlowNetwork, flow: &FlowAssignment) -> Vec<CacheState> {
    match network.reduction() {
        Reduction::Layered => resident_schedule(network, flow),
        Reduction::Interval => retention_schedule(network, flow),
    }
}

/// Real cost of a flow, dispatching on the network's reduction.
pub fn cost(network: &FlowNetwork, flow: &FlowAssignment) -> f64 {
    match network.reduction() {
        Reduction::Layered => positive_edge_cost(network, flow),
        Reduction::Interval => retention_cost(network, flow),
    }
}

/// Layered form: pages whose resident edge carries flow.
pub fn resident_schedule(network: &FlowNetwork, flow: &FlowAssignment) -> Vec<CacheState> {
    let mut states = empty_states(network);
    let pages = network.pages();

    for (edge, from, _, attrs) in
        network.edges_of_kind(|k| matches!(k, EdgeKind::Resident { .. }))
    {
        if !flow.is_active(edge) {
            continue;
        }
        if let (FlowNode::PageIn { layer, .. }, EdgeKind::Resident { page }) =
            (network.node(from), attrs.kind)
        {
            states[layer].pages.insert(pages[page].clone());
        }
    }
    states
}

/// Layered form: `Σ flow · real_cost` over edges with positive real cost.
pub fn positive_edge_cost(network: &FlowNetwork, flow: &FlowAssignment) -> f64 {
    network
        .edges_of_kind(|_| true)
        .filter_map(|(edge, _, _, attrs)| {
            let real = network.real_cost(attrs.weight);
            (real > 0.0).then(|| flow.flow(edge) as f64 * real)
        })
        .sum()
}

/// Interval form: a retained page is resident from its request up to the
/// step before its next request.
pub fn retention_schedule(network: &FlowNetwork, flow: &FlowAssignment) -> Vec<CacheState> {
    let mut states = empty_states(network);
    let pages = network.pages();

    for (_, _, _, attrs) in active_retentions(network, flow) {
        if let EdgeKind::Retention { page, from, to } = attrs.kind {
            for state in &mut states[from..to] {
                state.pages.insert(pages[page].clone());
            }
        }
    }
    states
}

/// Interval form: every request pays its weight unless a retention serves it.
pub fn retention_cost(network: &FlowNetwork, flow: &FlowAssignment) -> f64 {
    let pages = network.pages();
    let total: f64 = (0..network.steps().len())
        .filter_map(|layer| network.requested_page(layer))
        .map(|page| pages[page].weight())
        .sum();
    let saved: f64 = active_retentions(network, flow)
        .map(|(_, _, _, attrs)| -attrs.weight)
        .sum();
    total - saved
}

/// `(required, saturated)` units over all reward-carrying edges.
///
/// A minimum-cost flow saturates every reward edge whenever the instance is
/// feasible; a shortfall means the network could not honor every capacity
/// bound and request.
pub fn reward_saturation(network: &FlowNetwork, flow: &FlowAssignment) -> (i64, i64) {
    network
        .edges_of_kind(|_| true)
        .filter(|(_, _, _, attrs)| network.carries_reward(attrs.weight))
        .fold((0, 0), |(required, saturated), (edge, _, _, attrs)| {
            (required + attrs.capacity, saturated + flow.flow(edge))
        })
}

fn active_retentions<'a>(
    network: &'a FlowNetwork,
    flow: &'a FlowAssignment,
) -> impl Iterator<Item = (EdgeIndex, NodeIndex, NodeIndex, &'a FlowEdge)> + 'a {
    network
        .edges_of_kind(|k| matches!(k, EdgeKind::Retention { .. }))
        .filter(move |&(edge, _, _, _)| flow.is_active(edge))
}
