//! Interval reduction: capacity as a bottleneck on a step backbone.
//!
//! Only lazy schedules are modeled (a page is loaded when it is requested).
//! Keeping a page resident between two consecutive requests of it saves its
//! weight; the flow decides which of those retention intervals to keep.
//!
//! ```text
//!            bottleneck k(j), 0
//!          ┌────────────────────┐
//!   S ──► in(j) ═══reserve═════► out(j) ──backbone──► in(j+1) ─ ... ─► out(T-1) ──► T
//!    \     │    K-k(j), -LARGE                           ▲
//!     \    └──────────── retention(p), 1, -w(p) ─────────┘
//!      \
//!       └──────────────── bypass ────────────────────────────────────────────► T
//! ```
//!
//! `K` units travel the backbone. A unit on a retention edge skips steps
//! `a..b-1`, and saturated reserve edges leave `k(j)` units for the
//! bottleneck, so at most `k(j)` retentions span step `j`.
//!
//! The optimum equals the layered reduction's; the crate keeps this form as a
//! cross-check.

use tracing::debug;

use crate::config::Reduction;
use crate::flow::network::{EdgeKind, FlowNetwork, FlowNode, NetworkBuilder, reward_for};
use crate::flow::{index_pages, step_infos};
use crate::model::{CapacitySchedule, Request};

/// Builds the interval network for `requests` under `capacities`.
pub fn build(requests: &[Request], capacities: &CapacitySchedule, min_reward: f64) -> FlowNetwork {
    let (pages, requested) = index_pages(requests);
    let steps = step_infos(requests, capacities);

    let max_capacity = steps.iter().map(|s| s.capacity).max().unwrap_or(0);
    let units = max_capacity as i64;
    let bound: f64 = requests.iter().map(|r| r.page().weight()).sum();
    let reward = reward_for(bound, min_reward);

    let mut b = NetworkBuilder::new();
    b.edge(FlowNode::Source, FlowNode::Sink, units, 0.0, EdgeKind::Bypass);

    let mut last_seen: Vec<Option<usize>> = vec![None; pages.len()];
    for (j, step) in steps.iter().enumerate() {
        let step_in = FlowNode::StepIn { step: j };
        let step_out = FlowNode::StepOut { step: j };
        let capacity = step.capacity as i64;

        b.edge(step_in, step_out, capacity, 0.0, EdgeKind::Bottleneck);
        b.edge(step_in, step_out, units - capacity, -reward, EdgeKind::Reserve);

        if j == 0 {
            b.edge(FlowNode::Source, step_in, units, 0.0, EdgeKind::Supply);
        } else {
            b.edge(FlowNode::StepOut { step: j - 1 }, step_in, units, 0.0, EdgeKind::Backbone);
        }

        let page = requested[j];
        if let Some(from) = last_seen[page] {
            b.edge(
                FlowNode::StepIn { step: from },
                step_in,
                1,
                -pages[page].weight(),
                EdgeKind::Retention { page, from, to: j },
            );
        }
        last_seen[page] = Some(j);
    }

    if let Some(last) = steps.len().checked_sub(1) {
        b.edge(FlowNode::StepOut { step: last }, FlowNode::Sink, units, 0.0, EdgeKind::Drain);
    }

    let network = b.finish(units, reward, pages, steps, requested, Reduction::Interval);
    debug!(
        nodes = network.node_count(),
        edges = network.edge_count(),
        units,
        reward,
        "built interval network"
    );
    network
}
