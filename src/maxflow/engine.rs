// SPDX-License-Identifier: PMPL-1.0-or-later

//! Amplified flow augmentation.
//!
//! A Ford-Fulkerson variant that ranks augmenting paths by how much volume
//! they deliver to the sink rather than by how much they draw from the
//! source. Amplifying vertices multiply the volume on every edge after
//! them, so an augmentation adds `value * a[e]` to each edge `e` of the
//! path instead of a uniform `value`. Flow conservation does not hold
//! across amplifying vertices.

use crate::error::{AnalysisError, Result};
use crate::maxflow::graph::{
    Capacity, EdgeId, EdgeRole, FlowAssignment, FlowNetwork, VertexId, VertexKind,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Tuning knobs for one engine run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Tolerance for floating point comparisons against zero
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
    /// Stop after this many augmentations
    #[serde(default)]
    pub max_rounds: Option<usize>,
}

fn default_epsilon() -> f64 {
    1e-9
}

/// `epsilon` relative to the magnitude of the values being compared
fn tolerance(epsilon: f64, magnitude: f64) -> f64 {
    epsilon * magnitude.abs().max(1.0)
}

/// No room left on a limited edge, up to rounding at the edge's scale
fn saturated(network: &FlowNetwork, flow: &FlowAssignment, edge: EdgeId, epsilon: f64) -> bool {
    match network.edge(edge).capacity {
        Capacity::Limited(cap) => {
            let value = flow.get(edge);
            cap - value <= tolerance(epsilon, cap.abs().max(value.abs()))
        }
        Capacity::Unbounded => false,
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            epsilon: default_epsilon(),
            max_rounds: None,
        }
    }
}

/// A simple `s -> t` path with the amplification coefficient of each edge
#[derive(Debug, Clone, PartialEq)]
pub struct AugmentingPath {
    pub edges: Vec<EdgeId>,
    /// `a[e]`: volume on edge `e` per unit drawn from the source
    pub coefficients: Vec<f64>,
}

/// What a path can still carry under the current flow
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Potential {
    /// Source units the path can carry before some edge saturates
    pub residual: f64,
    /// Volume those units deliver to the sink
    pub benefit: f64,
}

impl AugmentingPath {
    pub fn new(network: &FlowNetwork, edges: Vec<EdgeId>) -> Self {
        let mut coefficients = Vec::with_capacity(edges.len());
        let mut amp = 1.0;
        for &e in &edges {
            coefficients.push(amp);
            let dest = network.vertex(network.edge(e).dest);
            if matches!(dest.kind, VertexKind::Core(_)) {
                amp *= dest.amp_factor;
            }
        }
        Self {
            edges,
            coefficients,
        }
    }

    /// Amplification reaching the sink
    pub fn delivery_factor(&self) -> f64 {
        self.coefficients.last().copied().unwrap_or(0.0)
    }

    pub fn potential(
        &self,
        network: &FlowNetwork,
        flow: &FlowAssignment,
        epsilon: f64,
    ) -> Result<Potential> {
        // Nothing reaches the sink, whatever the source sends
        if self.delivery_factor() <= 0.0 {
            return Ok(Potential {
                residual: 0.0,
                benefit: 0.0,
            });
        }

        let mut residual = f64::INFINITY;
        for (&e, &a) in self.edges.iter().zip(&self.coefficients) {
            // Zero coefficient: nothing reaches this edge, so it cannot bind
            if a <= 0.0 {
                continue;
            }
            if let Some(room) = flow.residual(network, e) {
                residual = residual.min(room.max(0.0) / a);
            }
        }

        if residual.is_infinite() {
            return Err(AnalysisError::UnboundedPath(self.describe(network)));
        }

        let benefit = if residual > epsilon {
            residual * self.delivery_factor()
        } else {
            0.0
        };

        Ok(Potential { residual, benefit })
    }

    pub fn describe(&self, network: &FlowNetwork) -> String {
        let mut out = String::new();
        for (i, &e) in self.edges.iter().enumerate() {
            let edge = network.edge(e);
            if i == 0 {
                out.push_str(&network.vertex(edge.src).kind.to_string());
            }
            out.push_str(" -> ");
            out.push_str(&network.vertex(edge.dest).kind.to_string());
        }
        out
    }
}

/// Enumerate every simple `s -> t` path through edges with room left.
///
/// Saturated edges are skipped; such a path would have zero benefit anyway.
/// Order is deterministic: depth first, following edges in insertion order.
pub fn enumerate_paths(
    network: &FlowNetwork,
    flow: &FlowAssignment,
    epsilon: f64,
) -> Vec<AugmentingPath> {
    let mut paths = Vec::new();
    let mut on_path = vec![false; network.vertex_count()];
    let mut stack = Vec::new();

    on_path[network.source().0] = true;
    walk(
        network,
        flow,
        epsilon,
        network.source(),
        &mut on_path,
        &mut stack,
        &mut paths,
    );
    paths
}

fn walk(
    network: &FlowNetwork,
    flow: &FlowAssignment,
    epsilon: f64,
    at: VertexId,
    on_path: &mut [bool],
    stack: &mut Vec<EdgeId>,
    paths: &mut Vec<AugmentingPath>,
) {
    if at == network.sink() {
        paths.push(AugmentingPath::new(network, stack.clone()));
        return;
    }

    for &e in network.outgoing(at) {
        let next = network.edge(e).dest;
        if on_path[next.0] {
            continue;
        }
        if saturated(network, flow, e, epsilon) {
            continue;
        }

        on_path[next.0] = true;
        stack.push(e);
        walk(network, flow, epsilon, next, on_path, stack, paths);
        stack.pop();
        on_path[next.0] = false;
    }
}

/// Per-run counters, mostly for logging and tests
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EngineStats {
    pub rounds: usize,
    pub paths_examined: usize,
    pub delivered: f64,
    pub budget_exhausted: bool,
}

/// Owns the flow assignment of one run; the network is only borrowed
pub struct AmplifiedFlowEngine<'n> {
    network: &'n FlowNetwork,
    flow: FlowAssignment,
    settings: EngineSettings,
    stats: EngineStats,
}

impl<'n> AmplifiedFlowEngine<'n> {
    pub fn new(network: &'n FlowNetwork, settings: EngineSettings) -> Self {
        Self {
            network,
            flow: FlowAssignment::new(network),
            settings,
            stats: EngineStats::default(),
        }
    }

    pub fn flow(&self) -> &FlowAssignment {
        &self.flow
    }

    pub fn into_flow(self) -> FlowAssignment {
        self.flow
    }

    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    /// Augment along the best path until no path has positive benefit
    pub fn compute_flow(&mut self) -> Result<&FlowAssignment> {
        let eps = self.settings.epsilon;

        loop {
            if let Some(limit) = self.settings.max_rounds {
                if self.stats.rounds >= limit {
                    warn!(rounds = limit, "augmentation budget exhausted, stopping early");
                    self.stats.budget_exhausted = true;
                    break;
                }
            }

            let paths = enumerate_paths(self.network, &self.flow, eps);
            if paths.is_empty() {
                break;
            }
            self.stats.paths_examined += paths.len();

            let mut best: Option<(&AugmentingPath, Potential)> = None;
            for path in &paths {
                let potential = path.potential(self.network, &self.flow, eps)?;
                // Strictly greater: the first path found wins a tie
                if best.map_or(true, |(_, b)| potential.benefit > b.benefit) {
                    best = Some((path, potential));
                }
            }

            let Some((path, potential)) = best else {
                break;
            };
            if potential.benefit <= eps {
                break;
            }

            debug!(
                round = self.stats.rounds + 1,
                hops = path.edges.len(),
                residual = potential.residual,
                benefit = potential.benefit,
                "augmenting {}",
                path.describe(self.network)
            );
            self.send_flow(path, potential.residual)?;
            self.stats.rounds += 1;
            self.stats.delivered += potential.benefit;
        }

        Ok(&self.flow)
    }

    /// Push `value` source units along `path`: each edge gains `value * a[e]`
    /// and its reverse edge loses the same amount.
    pub fn send_flow(&mut self, path: &AugmentingPath, value: f64) -> Result<()> {
        for (&e, &a) in path.edges.iter().zip(&path.coefficients) {
            let delta = value * a;
            self.flow.add(e, delta);
            if let Some(rev) = self.network.edge(e).reverse {
                self.flow.add(rev, -delta);
            }
        }

        for (&e, &a) in path.edges.iter().zip(&path.coefficients) {
            let delta = value * a;
            self.check_edge(e, delta)?;
            if let Some(rev) = self.network.edge(e).reverse {
                self.check_edge(rev, delta)?;
            }
        }
        Ok(())
    }

    /// Flag flow below zero or above capacity. Both bounds allow rounding
    /// proportional to the values involved.
    fn check_edge(&self, e: EdgeId, delta: f64) -> Result<()> {
        let eps = self.settings.epsilon;
        let edge = self.network.edge(e);
        let value = self.flow.get(e);

        let slack = tolerance(eps, value.abs().max(delta.abs()));

        if edge.role == EdgeRole::Forward && value < -slack {
            return Err(AnalysisError::NegativeFlow {
                edge: e.0,
                label: self.network.edge_label(e),
                value,
            });
        }
        if let Capacity::Limited(cap) = edge.capacity {
            if value - cap > tolerance(eps, cap.abs().max(delta.abs())) {
                return Err(AnalysisError::CapacityExceeded {
                    edge: e.0,
                    label: self.network.edge_label(e),
                    value,
                    capacity: cap,
                });
            }
        }
        Ok(())
    }
}
