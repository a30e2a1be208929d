//! Graphviz export of a flow network, optionally annotated with a flow.
//!
//! Active edges are drawn bold and blue with their flow and real cost; edges
//! carrying the reward are labelled `-L` plus their real cost.
//!
//! ```
//! use varpage::flow::{dot::render_dot, layered};
//! use varpage::model::{CapacitySchedule, Page, Request};
//!
//! let requests = Request::sequence([Page::new("A", 1.0)]);
//! let network = layered::build(&requests, &CapacitySchedule::uniform(1, 1), 100.0);
//! let dot = render_dot(&network, None);
//! assert!(dot.starts_with("digraph"));
//! ```

use petgraph::dot::{Config, Dot};
use petgraph::graph::{EdgeReference, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::flow::network::{FlowAssignment, FlowEdge, FlowGraph, FlowNetwork, FlowNode};

fn cost_label(network: &FlowNetwork, edge: &FlowEdge) -> String {
    let real = network.real_cost(edge.weight);
    if network.carries_reward(edge.weight) {
        if real == 0.0 {
            "-L".to_string()
        } else {
            format!("-L{real:+}")
        }
    } else {
        format!("{real}")
    }
}

/// Renders `network` in DOT format. With `flow`, active edges are highlighted.
pub fn render_dot(network: &FlowNetwork, flow: Option<&FlowAssignment>) -> String {
    let edge_attrs = |_: &FlowGraph, e: EdgeReference<'_, FlowEdge>| -> String {
        let edge = e.weight();
        let cost = cost_label(network, edge);
        match flow.map(|f| f.flow(e.id())).filter(|&units| units >= 1) {
            Some(units) => format!(
                "label = \"{units}/{} @ {cost}\" color = \"blue\" penwidth = 2.5",
                edge.capacity
            ),
            None => format!("label = \"{} @ {cost}\" color = \"gray\"", edge.capacity),
        }
    };
    let node_attrs = |_: &FlowGraph, (_, node): (NodeIndex, &FlowNode)| -> String {
        let shape = match node {
            FlowNode::Source | FlowNode::Sink => "doublecircle",
            _ => "box",
        };
        format!("label = \"{node}\" shape = {shape}")
    };

    Dot::with_attr_getters(
        network.graph(),
        &[Config::EdgeNoLabel, Config::NodeNoLabel],
        &edge_attrs,
        &node_attrs,
    )
    .to_string()
}
