// SPDX-License-Identifier: PMPL-1.0-or-later

//! Attack search orchestration

pub mod checker;
pub mod oracle;

use crate::error::Result;
use crate::maxflow::EngineSettings;
use crate::types::{Attack, Topology};
use serde::{Deserialize, Serialize};

pub use checker::{AttackChecker, AttackRequest};
pub use oracle::{FeasibilityOracle, FlowOracle};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Keep searching after the first attack and report every victim group
    #[serde(default)]
    pub exhaustive: bool,
    #[serde(default)]
    pub engine: EngineSettings,
}

/// Search for attacks using the flow engine as oracle
pub fn find_attacks(
    topology: &Topology,
    request: AttackRequest,
    config: &SearchConfig,
) -> Result<Vec<Attack>> {
    find_attacks_with(topology, request, config, FlowOracle::new(config.engine))
}

/// Search for attacks with a caller-supplied oracle
pub fn find_attacks_with<O: FeasibilityOracle>(
    topology: &Topology,
    request: AttackRequest,
    config: &SearchConfig,
    oracle: O,
) -> Result<Vec<Attack>> {
    AttackChecker::new(topology, request, oracle)
        .with_config(config)
        .check()
}
