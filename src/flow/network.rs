//! Flow network as plain data.
//!
//! A [`FlowNetwork`] is a `petgraph` directed graph whose nodes are
//! [`FlowNode`]s and whose edges carry a [`FlowEdge`] (integer capacity, real
//! weight, and the [`EdgeKind`] that says what the edge models). It has no
//! behavior beyond lookups; the reductions in [`layered`](super::layered) and
//! [`interval`](super::interval) build it, solvers read it, and
//! [`reconstruct`](super::reconstruct) interprets a flow on it.
//!
//! ## Reward Encoding
//!
//! ```text
//!   mandatory edges:  weight = -LARGE          (reserve slots, served requests)
//!   real edges:       weight = w >= 0  or  -w  (loads / retention savings)
//!
//!   real_cost(weight) = weight + LARGE   if weight < -LARGE / 2
//!                     = weight           otherwise
//! ```
//!
//! `LARGE` is chosen above any real cost the network can produce, so a
//! minimum-cost flow saturates every mandatory edge before it optimizes real
//! cost.

use std::fmt;

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use rustc_hash::FxHashMap;

use crate::config::Reduction;
use crate::error::InvariantError;
use crate::model::Page;

/// Graph type underlying every [`FlowNetwork`].
pub type FlowGraph = DiGraph<FlowNode, FlowEdge>;

/// Node identity. `layer`/`step` is a 0-based request position, `page` an
/// index into [`FlowNetwork::pages`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowNode {
    Source,
    Sink,
    PageIn { layer: usize, page: usize },
    PageOut { layer: usize, page: usize },
    SlotIn { layer: usize },
    SlotOut { layer: usize },
    RequestIn { layer: usize },
    RequestOut { layer: usize },
    StepIn { step: usize },
    StepOut { step: usize },
}

impl fmt::Display for FlowNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            FlowNode::Source => f.write_str("S"),
            FlowNode::Sink => f.write_str("T"),
            FlowNode::PageIn { layer, page } => write!(f, "{layer}:P{page}_in"),
            FlowNode::PageOut { layer, page } => write!(f, "{layer}:P{page}_out"),
            FlowNode::SlotIn { layer } => write!(f, "{layer}:S_in"),
            FlowNode::SlotOut { layer } => write!(f, "{layer}:S_out"),
            FlowNode::RequestIn { layer } => write!(f, "{layer}:R_in"),
            FlowNode::RequestOut { layer } => write!(f, "{layer}:R_out"),
            FlowNode::StepIn { step } => write!(f, "{step}_in"),
            FlowNode::StepOut { step } => write!(f, "{step}_out"),
        }
    }
}

/// What an edge models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// Source into the first layer/step.
    Supply,
    /// Last layer/step into the sink.
    Drain,
    /// Source directly to sink.
    Bypass,
    /// `page_in -> page_out`: the page is resident after this layer.
    Resident { page: usize },
    /// Free units that must be saturated (`-LARGE`).
    Reserve,
    /// `req_in -> req_out`: the layer's request is served (`-LARGE`).
    Serve,
    /// Served page stays resident.
    Retain,
    /// Served page is dropped in the same step.
    PassThrough,
    /// Page stays resident between layers.
    Keep,
    /// Evict one page and load another in its place.
    Switch,
    /// Request served by a page already resident.
    Hit,
    /// Evict a page to serve the request in its place.
    Displace,
    /// Evict without replacement.
    Evict,
    /// Load into a free unit.
    Load,
    /// Free units carried to the next layer.
    Idle,
    /// Per-step retention capacity of the interval form.
    Bottleneck,
    /// `step_out -> step_in` of the next step.
    Backbone,
    /// Page kept resident from request `from` to its next request `to`.
    Retention { page: usize, from: usize, to: usize },
}

/// Edge attributes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowEdge {
    pub capacity: i64,
    pub weight: f64,
    pub kind: EdgeKind,
}

impl fmt::Display for FlowEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} cap={} w={}", self.kind, self.capacity, self.weight)
    }
}

/// Time step and capacity of one layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepInfo {
    pub time_step: usize,
    pub capacity: usize,
}

/// Reward constant for a network whose real cost never exceeds `bound`.
pub fn reward_for(bound: f64, min_reward: f64) -> f64 {
    min_reward.max(2.0 * bound + 1.0)
}

/// A built reduction: graph, terminals, units to route, reward constant and
/// the tables needed to read a schedule back.
#[derive(Debug, Clone)]
pub struct FlowNetwork {
    graph: FlowGraph,
    source: NodeIndex,
    sink: NodeIndex,
    units: i64,
    reward: f64,
    pages: Vec<Page>,
    steps: Vec<StepInfo>,
    requested: Vec<usize>,
    reduction: Reduction,
}

impl FlowNetwork {
    #[inline]
    pub fn graph(&self) -> &FlowGraph {
        &self.graph
    }

    #[inline]
    pub fn source(&self) -> NodeIndex {
        self.source
    }

    #[inline]
    pub fn sink(&self) -> NodeIndex {
        self.sink
    }

    /// Flow value routed from source to sink (source supply, sink demand).
    #[inline]
    pub fn units(&self) -> i64 {
        self.units
    }

    /// The `LARGE` constant.
    #[inline]
    pub fn reward(&self) -> f64 {
        self.reward
    }

    /// Distinct pages, in order of first request.
    #[inline]
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// One entry per request position.
    #[inline]
    pub fn steps(&self) -> &[StepInfo] {
        &self.steps
    }

    /// Page index requested at `layer`.
    #[inline]
    pub fn requested_page(&self, layer: usize) -> Option<usize> {
        self.requested.get(layer).copied()
    }

    #[inline]
    pub fn reduction(&self) -> Reduction {
        self.reduction
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    #[inline]
    pub fn edge(&self, edge: EdgeIndex) -> &FlowEdge {
        &self.graph[edge]
    }

    #[inline]
    pub fn node(&self, node: NodeIndex) -> FlowNode {
        self.graph[node]
    }

    /// Whether `weight` includes the `-LARGE` reward.
    #[inline]
    pub fn carries_reward(&self, weight: f64) -> bool {
        weight < -self.reward / 2.0
    }

    /// Real cost of an edge weight, with the reward removed.
    #[inline]
    pub fn real_cost(&self, weight: f64) -> f64 {
        if self.carries_reward(weight) {
            weight + self.reward
        } else {
            weight
        }
    }

    /// Edges of a given kind with their endpoints.
    pub fn edges_of_kind(
        &self,
        mut predicate: impl FnMut(EdgeKind) -> bool,
    ) -> impl Iterator<Item = (EdgeIndex, NodeIndex, NodeIndex, &FlowEdge)> {
        self.graph
            .edge_references()
            .filter(move |e| predicate(e.weight().kind))
            .map(|e| (e.id(), e.source(), e.target(), e.weight()))
    }
}

/// Incremental construction shared by both reductions.
pub(crate) struct NetworkBuilder {
    graph: FlowGraph,
    index: FxHashMap<FlowNode, NodeIndex>,
    source: NodeIndex,
    sink: NodeIndex,
}

impl NetworkBuilder {
    pub(crate) fn new() -> Self {
        let mut graph = FlowGraph::new();
        let mut index = FxHashMap::default();
        let source = graph.add_node(FlowNode::Source);
        let sink = graph.add_node(FlowNode::Sink);
        index.insert(FlowNode::Source, source);
        index.insert(FlowNode::Sink, sink);
        Self {
            graph,
            index,
            source,
            sink,
        }
    }

    /// Node for `node`, created on first use.
    pub(crate) fn node(&mut self, node: FlowNode) -> NodeIndex {
        if let Some(&idx) = self.index.get(&node) {
            return idx;
        }
        let idx = self.graph.add_node(node);
        self.index.insert(node, idx);
        idx
    }

    /// Adds an edge; zero-capacity edges are skipped.
    pub(crate) fn edge(
        &mut self,
        from: FlowNode,
        to: FlowNode,
        capacity: i64,
        weight: f64,
        kind: EdgeKind,
    ) -> Option<EdgeIndex> {
        if capacity <= 0 {
            return None;
        }
        let from = self.node(from);
        let to = self.node(to);
        Some(self.graph.add_edge(
            from,
            to,
            FlowEdge {
                capacity,
                weight,
                kind,
            },
        ))
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn finish(
        self,
        units: i64,
        reward: f64,
        pages: Vec<Page>,
        steps: Vec<StepInfo>,
        requested: Vec<usize>,
        reduction: Reduction,
    ) -> FlowNetwork {
        FlowNetwork {
            graph: self.graph,
            source: self.source,
            sink: self.sink,
            units,
            reward,
            pages,
            steps,
            requested,
            reduction,
        }
    }
}

/// Per-edge flow amounts, indexed by [`EdgeIndex`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowAssignment {
    flows: Vec<i64>,
}

impl FlowAssignment {
    /// All-zero flow for a network with `edge_count` edges.
    pub fn zero(edge_count: usize) -> Self {
        Self {
            flows: vec![0; edge_count],
        }
    }

    pub fn from_flows(flows: Vec<i64>) -> Self {
        Self { flows }
    }

    #[inline]
    pub fn flow(&self, edge: EdgeIndex) -> i64 {
        self.flows.get(edge.index()).copied().unwrap_or(0)
    }

    /// An edge is active when it carries at least one unit.
    #[inline]
    pub fn is_active(&self, edge: EdgeIndex) -> bool {
        self.flow(edge) >= 1
    }

    pub fn active_edges(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.flows
            .iter()
            .enumerate()
            .filter(|&(_, &f)| f >= 1)
            .map(|(i, _)| EdgeIndex::new(i))
    }

    /// Objective value including rewards: `Σ flow · weight`.
    pub fn raw_cost(&self, network: &FlowNetwork) -> f64 {
        network
            .graph()
            .edge_references()
            .map(|e| self.flow(e.id()) as f64 * e.weight().weight)
            .sum()
    }

    /// Units leaving the source.
    pub fn value(&self, network: &FlowNetwork) -> i64 {
        network
            .graph()
            .edges(network.source())
            .map(|e| self.flow(e.id()))
            .sum()
    }

    /// Checks capacity bounds and conservation (source supplies and sink
    /// absorbs [`FlowNetwork::units`]).
    pub fn check_feasible(&self, network: &FlowNetwork) -> Result<(), InvariantError> {
        let graph = network.graph();
        let mut balance = vec![0i64; graph.node_count()];

        for e in graph.edge_references() {
            let flow = self.flow(e.id());
            if flow < 0 || flow > e.weight().capacity {
                return Err(InvariantError::new(format!(
                    "edge {} -> {} carries {flow}, capacity {}",
                    graph[e.source()],
                    graph[e.target()],
                    e.weight().capacity
                )));
            }
            balance[e.source().index()] -= flow;
            balance[e.target().index()] += flow;
        }

        for node in graph.node_indices() {
            let expected = if node == network.source() {
                -network.units()
            } else if node == network.sink() {
                network.units()
            } else {
                0
            };
            if balance[node.index()] != expected {
                return Err(InvariantError::new(format!(
                    "node {} has net inflow {}, expected {expected}",
                    graph[node],
                    balance[node.index()]
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny() -> FlowNetwork {
        let mut b = NetworkBuilder::new();
        let step = FlowNode::StepIn { step: 0 };
        b.edge(FlowNode::Source, step, 2, 0.0, EdgeKind::Supply);
        b.edge(step, FlowNode::Sink, 1, -100.0, EdgeKind::Reserve);
        b.edge(step, FlowNode::Sink, 1, 3.0, EdgeKind::Load);
        b.edge(step, FlowNode::Sink, 0, 1.0, EdgeKind::Idle);
        b.finish(2, 100.0, Vec::new(), Vec::new(), Vec::new(), Reduction::Layered)
    }

    #[test]
    fn builder_reuses_nodes_and_skips_empty_edges() {
        let net = tiny();
        assert_eq!(net.node_count(), 3);
        assert_eq!(net.edge_count(), 3);
    }

    #[test]
    fn real_cost_strips_reward() {
        let net = tiny();
        assert_eq!(net.real_cost(-100.0), 0.0);
        assert_eq!(net.real_cost(-97.0), 3.0);
        assert_eq!(net.real_cost(-2.0), -2.0);
        assert_eq!(net.real_cost(5.0), 5.0);
        assert!(net.carries_reward(-51.0));
        assert!(!net.carries_reward(-49.0));
    }

    #[test]
    fn reward_exceeds_twice_the_bound() {
        assert_eq!(reward_for(10.0, 5.0), 21.0);
        assert_eq!(reward_for(10.0, 1_000.0), 1_000.0);
    }

    #[test]
    fn feasibility_checks_capacity_and_balance() {
        let net = tiny();
        let ok = FlowAssignment::from_flows(vec![2, 1, 1]);
        assert!(ok.check_feasible(&net).is_ok());
        assert_eq!(ok.value(&net), 2);
        assert_eq!(ok.raw_cost(&net), -97.0);
        assert_eq!(ok.active_edges().count(), 3);

        let over = FlowAssignment::from_flows(vec![2, 2, 0]);
        assert!(over.check_feasible(&net).is_err());

        let short = FlowAssignment::from_flows(vec![1, 1, 0]);
        let err = short.check_feasible(&net).unwrap_err();
        assert!(err.message().contains("net inflow"));
    }
}
