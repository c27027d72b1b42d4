// SPDX-License-Identifier: PMPL-1.0-or-later

//! Feasibility oracles: decide whether one victim/attacker assignment
//! admits an attack.

use crate::error::Result;
use crate::maxflow::{EngineSettings, MaxFlow};
use crate::types::{Attack, HostId, Target, Topology};
use tracing::debug;

/// Answers `check(topology, victims, attackers)`.
///
/// `Ok(None)` means the assignment is infeasible; errors are reserved for
/// malformed input and internal faults. Implementations must be
/// deterministic and must not modify the topology.
pub trait FeasibilityOracle {
    fn check(
        &self,
        topology: &Topology,
        victims: &[Target],
        attackers: &[HostId],
    ) -> Result<Option<Attack>>;
}

/// Oracle backed by the amplified flow engine
#[derive(Debug, Clone, Copy, Default)]
pub struct FlowOracle {
    settings: EngineSettings,
}

impl FlowOracle {
    pub fn new(settings: EngineSettings) -> Self {
        Self { settings }
    }
}

impl FeasibilityOracle for FlowOracle {
    fn check(
        &self,
        topology: &Topology,
        victims: &[Target],
        attackers: &[HostId],
    ) -> Result<Option<Attack>> {
        let mut run = MaxFlow::new(topology, victims, attackers, self.settings)?;
        run.compute_flow()?;
        let attack = run.attack()?;

        let stats = run.stats();
        debug!(
            rounds = stats.rounds,
            paths = stats.paths_examined,
            delivered = stats.delivered,
            feasible = attack.is_some(),
            "flow oracle finished"
        );
        Ok(attack)
    }
}

impl<O: FeasibilityOracle + ?Sized> FeasibilityOracle for &O {
    fn check(
        &self,
        topology: &Topology,
        victims: &[Target],
        attackers: &[HostId],
    ) -> Result<Option<Attack>> {
        (**self).check(topology, victims, attackers)
    }
}

impl<O: FeasibilityOracle + ?Sized> FeasibilityOracle for Box<O> {
    fn check(
        &self,
        topology: &Topology,
        victims: &[Target],
        attackers: &[HostId],
    ) -> Result<Option<Attack>> {
        (**self).check(topology, victims, attackers)
    }
}
