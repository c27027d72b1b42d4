// SPDX-License-Identifier: PMPL-1.0-or-later

//! Read the final flow assignment back in topology terms.

use crate::error::Result;
use crate::maxflow::builder::{LinkEdges, NetworkLayout};
use crate::maxflow::graph::FlowAssignment;
use crate::types::{HostId, LinkFlow, LinkId, Target, Topology, VictimLoad};

/// Read-only view over a finished run
pub struct FlowReporter<'a> {
    topology: &'a Topology,
    layout: &'a NetworkLayout,
    flow: &'a FlowAssignment,
    epsilon: f64,
}

impl<'a> FlowReporter<'a> {
    pub fn new(
        topology: &'a Topology,
        layout: &'a NetworkLayout,
        flow: &'a FlowAssignment,
        epsilon: f64,
    ) -> Self {
        Self {
            topology,
            layout,
            flow,
            epsilon,
        }
    }

    /// Flow on the victim's sink edge, or 0 when it has none
    pub fn flow_to_victim(&self, victim: Target) -> f64 {
        self.layout
            .sink_edge(victim)
            .map(|e| self.flow.get(e))
            .unwrap_or(0.0)
    }

    pub fn victim_loads(&self, victims: &[Target]) -> Result<Vec<VictimLoad>> {
        let mut seen = Vec::new();
        let mut loads = Vec::new();
        for &target in victims {
            if seen.contains(&target) {
                continue;
            }
            seen.push(target);
            loads.push(VictimLoad {
                target,
                load: self.flow_to_victim(target),
                limit: target.capacity_limit(self.topology)?,
            });
        }
        Ok(loads)
    }

    /// Victims whose sink edge carries more than they can take
    pub fn get_victims(&self, victims: &[Target]) -> Result<Vec<Target>> {
        Ok(self
            .victim_loads(victims)?
            .into_iter()
            .filter(VictimLoad::overloaded)
            .map(|load| load.target)
            .collect())
    }

    /// Nominated attackers whose source edge carries flow
    pub fn get_attackers(&self) -> Vec<HostId> {
        self.layout
            .source_edges
            .iter()
            .filter(|(_, e)| self.flow.get(*e) > self.epsilon)
            .map(|(h, _)| *h)
            .collect()
    }

    /// One record per link direction carrying positive flow, in link order.
    ///
    /// For a targeted link the direction is given by the endpoint feeding
    /// the aggregation vertex.
    pub fn get_flows(&self) -> Vec<LinkFlow> {
        let mut flows = Vec::new();
        for (index, edges) in self.layout.links.iter().enumerate() {
            let link = LinkId(index);
            let (h1, h2) = self.topology.links[index].endpoints();
            let (forward, backward) = match *edges {
                LinkEdges::Plain { forward, backward } => (forward, backward),
                LinkEdges::Targeted {
                    from_h1, from_h2, ..
                } => (Some(from_h1), Some(from_h2)),
            };

            let f1 = forward.map(|e| self.flow.get(e)).unwrap_or(0.0);
            let f2 = backward.map(|e| self.flow.get(e)).unwrap_or(0.0);
            if f1 > self.epsilon {
                flows.push(LinkFlow {
                    link,
                    from: h1,
                    to: h2,
                    volume: f1,
                });
            }
            if f2 > self.epsilon {
                flows.push(LinkFlow {
                    link,
                    from: h2,
                    to: h1,
                    volume: f2,
                });
            }
        }
        flows
    }
}
