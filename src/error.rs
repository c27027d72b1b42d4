// SPDX-License-Identifier: PMPL-1.0-or-later

//! Error type for the analysis library.
//!
//! "No attack found" is not represented here: oracles answer `Ok(None)` and
//! the checker answers `Ok(vec![])`. Errors are reserved for malformed input
//! and for internal consistency faults in the flow engine.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("host index {0} is not part of the topology")]
    UnknownHost(usize),

    #[error("link index {0} is not part of the topology")]
    UnknownLink(usize),

    #[error("no host named '{0}' in the topology")]
    UnknownHostName(String),

    #[error("no link named '{0}' in the topology")]
    UnknownLinkName(String),

    #[error("host '{0}' is listed both as attacker and as victim")]
    AttackerIsVictim(String),

    #[error("invalid host '{name}': {reason}")]
    InvalidHost { name: String, reason: String },

    #[error("invalid link '{name}': {reason}")]
    InvalidLink { name: String, reason: String },

    #[error("host name '{0}' appears more than once")]
    DuplicateHost(String),

    #[error("at least one victim host or link is required")]
    EmptyVictimSet,

    #[error("flow on edge {edge} ({label}) dropped to {value}, below zero")]
    NegativeFlow {
        edge: usize,
        label: String,
        value: f64,
    },

    #[error("flow on edge {edge} ({label}) is {value}, above its capacity {capacity}")]
    CapacityExceeded {
        edge: usize,
        label: String,
        value: f64,
        capacity: f64,
    },

    #[error("augmenting path {0} has no finite edge")]
    UnboundedPath(String),

    #[error("scenario {path}: {reason}")]
    Scenario { path: String, reason: String },
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
