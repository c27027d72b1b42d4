// SPDX-License-Identifier: PMPL-1.0-or-later

//! amp-attack: Amplification Attack Feasibility Analysis.
//!
//! Decides whether a set of attacker hosts can overwhelm victim hosts or
//! links with amplified (reflected) traffic, and if so produces the
//! per-link traffic assignment that demonstrates it.
//!
//! ENGINE PILLARS:
//! 1. **Maxflow**: Splits every host into `in -> core -> out`, routes
//!    targeted links through aggregation vertices, and augments flow along
//!    the path that delivers the most amplified volume to the sink.
//! 2. **Search**: Eliminates confirmed victims from a candidate pool,
//!    re-checking ambiguous groups that involve reflectors, behind a
//!    pluggable feasibility oracle.
//! 3. **Report**: Names the overloaded victims, the attackers that sent
//!    traffic, and the realized flow on every link.

pub mod error;
pub mod maxflow;
pub mod report;
pub mod scenario;
pub mod search;
pub mod types;

pub use error::{AnalysisError, Result};
pub use search::{find_attacks, AttackChecker, AttackRequest, FeasibilityOracle, FlowOracle};
