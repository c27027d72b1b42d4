// SPDX-License-Identifier: PMPL-1.0-or-later

//! Flow network arena and flow assignment.
//!
//! The network is structural and immutable once built: vertices and edges
//! live in vectors and are addressed by index. Each edge records the index
//! of its reverse edge, if any, so augmentation never searches by endpoints.
//! Flow values live in a separate [`FlowAssignment`] keyed by edge index.

use crate::types::{HostId, LinkId};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub usize);

/// Edge capacity. `Unbounded` means "no limit", which is distinct from zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Capacity {
    Limited(f64),
    Unbounded,
}

impl Capacity {
    /// Remaining room above `flow`; `None` when the edge has no limit
    pub fn remaining(&self, flow: f64) -> Option<f64> {
        match *self {
            Capacity::Limited(cap) => Some(cap - flow),
            Capacity::Unbounded => None,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        matches!(self, Capacity::Unbounded)
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capacity::Limited(cap) => write!(f, "{}", cap),
            Capacity::Unbounded => write!(f, "inf"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexKind {
    Source,
    Sink,
    Core(HostId),
    In(HostId),
    Out(HostId),
    /// Aggregation vertex of a targeted link
    Aggregate(LinkId),
}

impl fmt::Display for VertexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VertexKind::Source => write!(f, "s"),
            VertexKind::Sink => write!(f, "t"),
            VertexKind::Core(h) => write!(f, "{}", h),
            VertexKind::In(h) => write!(f, "{}_in", h),
            VertexKind::Out(h) => write!(f, "{}_out", h),
            VertexKind::Aggregate(l) => write!(f, "{}", l),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Vertex {
    pub kind: VertexKind,
    /// Amplification applied to traffic leaving this vertex (1 except on core vertices)
    pub amp_factor: f64,
}

/// Whether an edge carries real traffic or only exists for residual bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeRole {
    Forward,
    Residual,
}

#[derive(Debug, Clone)]
pub struct Edge {
    pub src: VertexId,
    pub dest: VertexId,
    pub capacity: Capacity,
    pub reverse: Option<EdgeId>,
    pub role: EdgeRole,
}

#[derive(Debug, Clone)]
pub struct FlowNetwork {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    outgoing: Vec<Vec<EdgeId>>,
    source: VertexId,
    sink: VertexId,
}

impl FlowNetwork {
    /// Create a network holding only the source and sink
    pub fn new() -> Self {
        let mut network = Self {
            vertices: Vec::new(),
            edges: Vec::new(),
            outgoing: Vec::new(),
            source: VertexId(0),
            sink: VertexId(0),
        };
        network.source = network.add_vertex(VertexKind::Source, 1.0);
        network.sink = network.add_vertex(VertexKind::Sink, 1.0);
        network
    }

    pub fn add_vertex(&mut self, kind: VertexKind, amp_factor: f64) -> VertexId {
        self.vertices.push(Vertex { kind, amp_factor });
        self.outgoing.push(Vec::new());
        VertexId(self.vertices.len() - 1)
    }

    /// Add a single edge with no reverse partner
    pub fn add_edge(&mut self, src: VertexId, dest: VertexId, capacity: Capacity) -> EdgeId {
        self.push_edge(src, dest, capacity, EdgeRole::Forward)
    }

    /// Add `src -> dest` plus its reverse `dest -> src`, cross-linked.
    /// Returns the forward edge.
    pub fn add_edge_pair(
        &mut self,
        src: VertexId,
        dest: VertexId,
        capacity: Capacity,
        reverse_capacity: Capacity,
    ) -> EdgeId {
        let forward = self.push_edge(src, dest, capacity, EdgeRole::Forward);
        let reverse = self.push_edge(dest, src, reverse_capacity, EdgeRole::Residual);
        self.edges[forward.0].reverse = Some(reverse);
        self.edges[reverse.0].reverse = Some(forward);
        forward
    }

    fn push_edge(
        &mut self,
        src: VertexId,
        dest: VertexId,
        capacity: Capacity,
        role: EdgeRole,
    ) -> EdgeId {
        self.edges.push(Edge {
            src,
            dest,
            capacity,
            reverse: None,
            role,
        });
        let id = EdgeId(self.edges.len() - 1);
        self.outgoing[src.0].push(id);
        id
    }

    pub fn source(&self) -> VertexId {
        self.source
    }

    pub fn sink(&self) -> VertexId {
        self.sink
    }

    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id.0]
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.0]
    }

    pub fn outgoing(&self, id: VertexId) -> &[EdgeId] {
        &self.outgoing[id.0]
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Linear scan for an edge between two vertices; used by diagnostics and tests
    pub fn find_edge(&self, src: VertexId, dest: VertexId) -> Option<EdgeId> {
        self.outgoing(src)
            .iter()
            .copied()
            .find(|e| self.edges[e.0].dest == dest)
    }

    pub fn edge_label(&self, id: EdgeId) -> String {
        let edge = self.edge(id);
        format!(
            "{}->{}",
            self.vertex(edge.src).kind,
            self.vertex(edge.dest).kind
        )
    }
}

impl Default for FlowNetwork {
    fn default() -> Self {
        Self::new()
    }
}

/// Flow value per edge, all zero at the start of a run
#[derive(Debug, Clone, PartialEq)]
pub struct FlowAssignment {
    values: Vec<f64>,
}

impl FlowAssignment {
    pub fn new(network: &FlowNetwork) -> Self {
        Self {
            values: vec![0.0; network.edge_count()],
        }
    }

    pub fn get(&self, edge: EdgeId) -> f64 {
        self.values.get(edge.0).copied().unwrap_or(0.0)
    }

    pub fn add(&mut self, edge: EdgeId, delta: f64) {
        self.values[edge.0] += delta;
    }

    /// Remaining capacity of an edge under this assignment
    pub fn residual(&self, network: &FlowNetwork, edge: EdgeId) -> Option<f64> {
        network.edge(edge).capacity.remaining(self.get(edge))
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_pair_links_reverse() {
        let mut net = FlowNetwork::new();
        let a = net.add_vertex(VertexKind::In(HostId(0)), 1.0);
        let b = net.add_vertex(VertexKind::Core(HostId(0)), 2.0);
        let e = net.add_edge_pair(a, b, Capacity::Limited(5.0), Capacity::Limited(0.0));
        let rev = net.edge(e).reverse.unwrap();

        assert_eq!(net.edge(rev).reverse, Some(e));
        assert_eq!(net.edge(rev).src, b);
        assert_eq!(net.edge(rev).role, EdgeRole::Residual);
        assert_eq!(net.find_edge(a, b), Some(e));
        assert_eq!(net.find_edge(b, a), Some(rev));
        assert_eq!(net.edge_label(e), "h0_in->h0");
    }

    #[test]
    fn test_single_edge_has_no_reverse() {
        let mut net = FlowNetwork::new();
        let v = net.add_vertex(VertexKind::Core(HostId(1)), 1.0);
        let e = net.add_edge(net.source(), v, Capacity::Unbounded);
        assert!(net.edge(e).reverse.is_none());
        assert!(net.find_edge(v, net.source()).is_none());
    }

    #[test]
    fn test_assignment_residual() {
        let mut net = FlowNetwork::new();
        let v = net.add_vertex(VertexKind::Core(HostId(0)), 1.0);
        let limited = net.add_edge(net.source(), v, Capacity::Limited(10.0));
        let open = net.add_edge(v, net.sink(), Capacity::Unbounded);

        let mut flow = FlowAssignment::new(&net);
        flow.add(limited, 4.0);
        assert_eq!(flow.residual(&net, limited), Some(6.0));
        assert_eq!(flow.residual(&net, open), None);
        assert_eq!(flow.get(EdgeId(99)), 0.0);
    }
}
