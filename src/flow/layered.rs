//! Layered reduction: one layer of nodes per request.
//!
//! Every cache slot is a unit of flow. A unit sitting in `page_in(t,i) ->
//! page_out(t,i)` means page `i` is resident after step `t`; units that hold
//! no page travel through the slot pair. One unit more than the largest
//! capacity is routed so that a request can pass through a cache of
//! capacity 0.
//!
//! ## Layer Shape
//!
//! ```text
//!                 layer t-1                          layer t (requests r)
//!
//!   page_in ─► page_out(i) ──keep (i≠r)────────────► page_in(i) ─► page_out(i)
//!                   │  ├────switch w(j)──────────────► page_in(j)
//!                   │  ├────hit (i=r) / displace w(r)► req_in ─LARGE─► req_out ─┬► page_in(r)
//!                   │  └────evict────────────┐                                  └► slot_in
//!                   │                        ▼
//!   slot_in ═reserve(U-k)═► slot_out ──idle─► slot_in ═reserve(U-k(t))═► slot_out
//!           ──idle (U)────►    │ ├──load w(j)──► page_in(j)
//!                              │ └──load w(r)──► req_in
//! ```
//!
//! Reserve and serve edges carry `-LARGE`; saturating every reserve edge
//! leaves at most `k(t)` units for pages, and saturating every serve edge
//! serves every request. Real cost is paid exactly on loads.

use tracing::debug;

use crate::config::Reduction;
use crate::flow::network::{EdgeKind, FlowNetwork, FlowNode, NetworkBuilder, reward_for};
use crate::flow::{index_pages, step_infos};
use crate::model::{CapacitySchedule, Page, Request};

/// Builds the layered network for `requests` under `capacities`.
///
/// `min_reward` is a floor for `LARGE`; the constant is raised above twice the
/// largest possible real cost when needed.
pub fn build(requests: &[Request], capacities: &CapacitySchedule, min_reward: f64) -> FlowNetwork {
    let (pages, requested) = index_pages(requests);
    let steps = step_infos(requests, capacities);

    let max_capacity = steps.iter().map(|s| s.capacity).max().unwrap_or(0);
    let units = max_capacity as i64 + 1;
    let max_weight = pages.iter().map(Page::weight).fold(0.0, f64::max);
    let bound = (steps.len() as f64 + 1.0) * units as f64 * max_weight;
    let reward = reward_for(bound, min_reward);

    let mut b = NetworkBuilder::new();
    b.edge(FlowNode::Source, FlowNode::Sink, units, 0.0, EdgeKind::Bypass);

    let weight = |i: usize| pages[i].weight();
    let n = pages.len();

    for (t, step) in steps.iter().enumerate() {
        let r = requested[t];
        let free = units - step.capacity as i64;

        for i in 0..n {
            b.edge(
                FlowNode::PageIn { layer: t, page: i },
                FlowNode::PageOut { layer: t, page: i },
                1,
                0.0,
                EdgeKind::Resident { page: i },
            );
        }
        let slot_in = FlowNode::SlotIn { layer: t };
        let slot_out = FlowNode::SlotOut { layer: t };
        b.edge(slot_in, slot_out, free, -reward, EdgeKind::Reserve);
        b.edge(slot_in, slot_out, units, 0.0, EdgeKind::Idle);

        let req_in = FlowNode::RequestIn { layer: t };
        let req_out = FlowNode::RequestOut { layer: t };
        b.edge(req_in, req_out, 1, -reward, EdgeKind::Serve);
        b.edge(req_out, FlowNode::PageIn { layer: t, page: r }, 1, 0.0, EdgeKind::Retain);
        b.edge(req_out, slot_in, 1, 0.0, EdgeKind::PassThrough);

        if t == 0 {
            for j in (0..n).filter(|&j| j != r) {
                b.edge(
                    FlowNode::Source,
                    FlowNode::PageIn { layer: 0, page: j },
                    1,
                    weight(j),
                    EdgeKind::Load,
                );
            }
            b.edge(FlowNode::Source, req_in, 1, weight(r), EdgeKind::Load);
            b.edge(FlowNode::Source, slot_in, units, 0.0, EdgeKind::Supply);
            continue;
        }

        let prev = t - 1;
        for i in 0..n {
            let from = FlowNode::PageOut { layer: prev, page: i };
            for j in (0..n).filter(|&j| j != r) {
                let to = FlowNode::PageIn { layer: t, page: j };
                if i == j {
                    b.edge(from, to, 1, 0.0, EdgeKind::Keep);
                } else {
                    b.edge(from, to, 1, weight(j), EdgeKind::Switch);
                }
            }
            if i == r {
                b.edge(from, req_in, 1, 0.0, EdgeKind::Hit);
            } else {
                b.edge(from, req_in, 1, weight(r), EdgeKind::Displace);
            }
            b.edge(from, slot_in, 1, 0.0, EdgeKind::Evict);
        }

        let prev_slot = FlowNode::SlotOut { layer: prev };
        for j in (0..n).filter(|&j| j != r) {
            b.edge(
                prev_slot,
                FlowNode::PageIn { layer: t, page: j },
                1,
                weight(j),
                EdgeKind::Load,
            );
        }
        b.edge(prev_slot, req_in, 1, weight(r), EdgeKind::Load);
        b.edge(prev_slot, slot_in, units, 0.0, EdgeKind::Idle);
    }

    if let Some(last) = steps.len().checked_sub(1) {
        for i in 0..n {
            b.edge(
                FlowNode::PageOut { layer: last, page: i },
                FlowNode::Sink,
                1,
                0.0,
                EdgeKind::Drain,
            );
        }
        b.edge(FlowNode::SlotOut { layer: last }, FlowNode::Sink, units, 0.0, EdgeKind::Drain);
    }

    let network = b.finish(units, reward, pages, steps, requested, Reduction::Layered);
    debug!(
        nodes = network.node_count(),
        edges = network.edge_count(),
        units,
        reward,
        "built layered network"
    );
    network
}
