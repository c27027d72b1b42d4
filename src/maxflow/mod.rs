// SPDX-License-Identifier: PMPL-1.0-or-later

//! Flow-based attack feasibility
//!
//! One [`MaxFlow`] value is one analysis run: it builds the network for a
//! victim/attacker assignment, runs the amplified flow engine once, and then
//! answers read-only questions about the result. Nothing is shared between
//! runs.

pub mod builder;
pub mod engine;
pub mod graph;
pub mod victims;

use crate::error::Result;
use crate::types::*;
use tracing::debug;

pub use builder::{build_network, validate_assignment, NetworkLayout};
pub use engine::{AmplifiedFlowEngine, EngineSettings, EngineStats};
pub use graph::{Capacity, FlowAssignment, FlowNetwork};
pub use victims::FlowReporter;

pub struct MaxFlow<'t> {
    topology: &'t Topology,
    victims: Vec<Target>,
    layout: NetworkLayout,
    flow: FlowAssignment,
    settings: EngineSettings,
    stats: EngineStats,
}

impl<'t> MaxFlow<'t> {
    /// Validate the assignment and build its network. Fails fast on
    /// references outside the topology or attacker/victim overlap.
    pub fn new(
        topology: &'t Topology,
        victims: &[Target],
        attackers: &[HostId],
        settings: EngineSettings,
    ) -> Result<Self> {
        let layout = build_network(topology, victims, attackers)?;
        debug!(
            vertices = layout.network.vertex_count(),
            edges = layout.network.edge_count(),
            victims = victims.len(),
            attackers = attackers.len(),
            "built flow network"
        );
        let flow = FlowAssignment::new(&layout.network);
        Ok(Self {
            topology,
            victims: victims.to_vec(),
            layout,
            flow,
            settings,
            stats: EngineStats::default(),
        })
    }

    pub fn compute_flow(&mut self) -> Result<&FlowAssignment> {
        let mut engine = AmplifiedFlowEngine::new(&self.layout.network, self.settings);
        engine.compute_flow()?;
        self.stats = engine.stats();
        self.flow = engine.into_flow();
        Ok(&self.flow)
    }

    fn reporter(&self) -> FlowReporter<'_> {
        FlowReporter::new(self.topology, &self.layout, &self.flow, self.settings.epsilon)
    }

    pub fn flow_to_victim(&self, victim: Target) -> f64 {
        self.reporter().flow_to_victim(victim)
    }

    pub fn get_victims(&self) -> Result<Vec<Target>> {
        self.reporter().get_victims(&self.victims)
    }

    pub fn get_attackers(&self) -> Vec<HostId> {
        self.reporter().get_attackers()
    }

    pub fn get_flows(&self) -> Vec<LinkFlow> {
        self.reporter().get_flows()
    }

    pub fn victim_loads(&self) -> Result<Vec<VictimLoad>> {
        self.reporter().victim_loads(&self.victims)
    }

    /// Bundle the current result, or `None` when no victim is overloaded
    pub fn attack(&self) -> Result<Option<Attack>> {
        let victims = self.get_victims()?;
        if victims.is_empty() {
            return Ok(None);
        }
        Ok(Some(Attack {
            victims,
            attackers: self.get_attackers(),
            flows: self.get_flows(),
            loads: self.victim_loads()?,
        }))
    }

    pub fn layout(&self) -> &NetworkLayout {
        &self.layout
    }

    pub fn flow(&self) -> &FlowAssignment {
        &self.flow
    }

    pub fn stats(&self) -> EngineStats {
        self.stats
    }
}
