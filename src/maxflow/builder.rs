// SPDX-License-Identifier: PMPL-1.0-or-later

//! Translate a topology plus a victim/attacker assignment into a flow network.
//!
//! Every host is split into `in -> core -> out`. The `in -> core` edge caps
//! what the host can absorb and `core -> out` caps what it can emit. Victim
//! hosts keep their three vertices but lose both internal edges, so they can
//! only receive. A targeted link is routed through an aggregation vertex so
//! both directions feed one saturation check at the sink.

use crate::error::{AnalysisError, Result};
use crate::maxflow::graph::{Capacity, EdgeId, FlowNetwork, VertexId, VertexKind};
use crate::types::{HostId, LinkId, Target, Topology};
use std::collections::{HashMap, HashSet};

/// The three vertices a host is split into
#[derive(Debug, Clone, Copy)]
pub struct Cluster {
    pub core: VertexId,
    pub v_in: VertexId,
    pub v_out: VertexId,
}

/// Edges carrying a link's traffic, per direction
#[derive(Debug, Clone, Copy)]
pub enum LinkEdges {
    /// `out(h1) -> in(h2)` and `out(h2) -> in(h1)`; absent when the sender is a victim
    Plain {
        forward: Option<EdgeId>,
        backward: Option<EdgeId>,
    },
    /// `out(h1) -> agg` and `out(h2) -> agg`
    Targeted {
        aggregate: VertexId,
        from_h1: EdgeId,
        from_h2: EdgeId,
    },
}

/// A built network together with the index maps the engine and reporter need
#[derive(Debug, Clone)]
pub struct NetworkLayout {
    pub network: FlowNetwork,
    pub clusters: Vec<Cluster>,
    pub links: Vec<LinkEdges>,
    pub sink_edges: HashMap<Target, EdgeId>,
    pub source_edges: Vec<(HostId, EdgeId)>,
}

impl NetworkLayout {
    pub fn cluster(&self, host: HostId) -> &Cluster {
        &self.clusters[host.0]
    }

    pub fn sink_edge(&self, target: Target) -> Option<EdgeId> {
        self.sink_edges.get(&target).copied()
    }
}

/// Check that every victim and attacker refers to the topology and that no
/// attacker is also a victim host. Runs before anything is built.
pub fn validate_assignment(
    topology: &Topology,
    victims: &[Target],
    attackers: &[HostId],
) -> Result<()> {
    topology.validate()?;

    let mut victim_hosts = HashSet::new();
    for victim in victims {
        match *victim {
            Target::Host(h) => {
                topology.host(h)?;
                victim_hosts.insert(h);
            }
            Target::Link(l) => {
                topology.link(l)?;
            }
        }
    }

    for attacker in attackers {
        let host = topology.host(*attacker)?;
        if victim_hosts.contains(attacker) {
            return Err(AnalysisError::AttackerIsVictim(host.name.clone()));
        }
    }

    Ok(())
}

/// Build the flow network for one analysis run
pub fn build_network(
    topology: &Topology,
    victims: &[Target],
    attackers: &[HostId],
) -> Result<NetworkLayout> {
    validate_assignment(topology, victims, attackers)?;

    let victim_hosts: HashSet<HostId> = victims.iter().filter_map(Target::as_host).collect();
    let victim_links: HashSet<LinkId> = victims.iter().filter_map(Target::as_link).collect();

    let mut network = FlowNetwork::new();
    let zero = Capacity::Limited(0.0);

    let mut clusters = Vec::with_capacity(topology.hosts.len());
    for id in topology.host_ids() {
        let host = &topology.hosts[id.0];
        let cluster = Cluster {
            core: network.add_vertex(VertexKind::Core(id), host.amp_factor),
            v_in: network.add_vertex(VertexKind::In(id), 1.0),
            v_out: network.add_vertex(VertexKind::Out(id), 1.0),
        };

        if !victim_hosts.contains(&id) {
            network.add_edge_pair(
                cluster.v_in,
                cluster.core,
                Capacity::Limited(host.receiving_cap),
                zero,
            );
            network.add_edge_pair(
                cluster.core,
                cluster.v_out,
                Capacity::Limited(host.sending_cap),
                zero,
            );
        }
        clusters.push(cluster);
    }

    let mut links = Vec::with_capacity(topology.links.len());
    let mut aggregates = HashMap::new();
    for id in topology.link_ids() {
        let link = &topology.links[id.0];
        let c1 = clusters[link.h1.0];
        let c2 = clusters[link.h2.0];

        if !victim_links.contains(&id) {
            let cap = Capacity::Limited(link.capacity);
            // Victims are passive: they never send
            let forward = (!victim_hosts.contains(&link.h1))
                .then(|| network.add_edge_pair(c1.v_out, c2.v_in, cap, zero));
            let backward = (!victim_hosts.contains(&link.h2))
                .then(|| network.add_edge_pair(c2.v_out, c1.v_in, cap, zero));
            links.push(LinkEdges::Plain { forward, backward });
        } else {
            let aggregate = network.add_vertex(VertexKind::Aggregate(id), 1.0);
            let open = Capacity::Unbounded;
            let from_h1 = network.add_edge_pair(c1.v_out, aggregate, open, zero);
            network.add_edge_pair(aggregate, c2.v_in, open, zero);
            let from_h2 = network.add_edge_pair(c2.v_out, aggregate, open, zero);
            network.add_edge_pair(aggregate, c1.v_in, open, zero);
            aggregates.insert(id, aggregate);
            links.push(LinkEdges::Targeted {
                aggregate,
                from_h1,
                from_h2,
            });
        }
    }

    let mut source_edges = Vec::new();
    let mut seen = HashSet::new();
    for attacker in attackers {
        if seen.insert(*attacker) {
            let edge = network.add_edge(
                network.source(),
                clusters[attacker.0].core,
                Capacity::Unbounded,
            );
            source_edges.push((*attacker, edge));
        }
    }

    // The sink side keeps an open reverse edge, unlike the zero-capacity
    // reverse edges used everywhere else.
    let mut sink_edges = HashMap::new();
    for victim in victims {
        if sink_edges.contains_key(victim) {
            continue;
        }
        let from = match *victim {
            Target::Host(h) => clusters[h.0].v_in,
            Target::Link(l) => aggregates[&l],
        };
        let edge = network.add_edge_pair(
            from,
            network.sink(),
            Capacity::Unbounded,
            Capacity::Unbounded,
        );
        sink_edges.insert(*victim, edge);
    }

    Ok(NetworkLayout {
        network,
        clusters,
        links,
        sink_edges,
        source_edges,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maxflow::graph::EdgeRole;
    use crate::types::Host;

    fn chain() -> (Topology, HostId, HostId, HostId) {
        let mut topo = Topology::new();
        let a = topo.add_host(Host::client("a", 100.0, 100.0));
        let r = topo.add_host(Host::server("r", 100.0, 1000.0, 10.0));
        let v = topo.add_host(Host::client("v", 50.0, 50.0));
        topo.connect(a, r, 100.0);
        topo.connect(r, v, 1000.0);
        (topo, a, r, v)
    }

    #[test]
    fn test_host_internal_edges() {
        let (topo, a, r, v) = chain();
        let layout = build_network(&topo, &[Target::Host(v)], &[a]).unwrap();
        let net = &layout.network;

        let ca = layout.cluster(a);
        let e = net.find_edge(ca.v_in, ca.core).unwrap();
        assert_eq!(net.edge(e).capacity, Capacity::Limited(100.0));
        let rev = net.edge(e).reverse.unwrap();
        assert_eq!(net.edge(rev).capacity, Capacity::Limited(0.0));

        let cr = layout.cluster(r);
        let e = net.find_edge(cr.core, cr.v_out).unwrap();
        assert_eq!(net.edge(e).capacity, Capacity::Limited(1000.0));
        assert_eq!(net.vertex(cr.core).amp_factor, 10.0);

        // Victim has no internal edges at all
        let cv = layout.cluster(v);
        assert!(net.find_edge(cv.v_in, cv.core).is_none());
        assert!(net.find_edge(cv.core, cv.v_out).is_none());
    }

    #[test]
    fn test_victim_never_sends_over_links() {
        let (topo, a, r, v) = chain();
        let layout = build_network(&topo, &[Target::Host(v)], &[a]).unwrap();

        match layout.links[1] {
            LinkEdges::Plain { forward, backward } => {
                assert!(forward.is_some(), "r -> v must exist");
                assert!(backward.is_none(), "v -> r must be omitted");
            }
            LinkEdges::Targeted { .. } => panic!("link r-v is not targeted"),
        }

        let cr = layout.cluster(r);
        let cv = layout.cluster(v);
        assert!(layout.network.find_edge(cv.v_out, cr.v_in).is_none());
    }

    #[test]
    fn test_source_and_sink_wiring() {
        let (topo, a, _, v) = chain();
        let layout = build_network(&topo, &[Target::Host(v)], &[a]).unwrap();
        let net = &layout.network;

        assert_eq!(layout.source_edges.len(), 1);
        let (host, e) = layout.source_edges[0];
        assert_eq!(host, a);
        assert_eq!(net.edge(e).src, net.source());
        assert!(net.edge(e).capacity.is_unbounded());

        let sink_edge = layout.sink_edge(Target::Host(v)).unwrap();
        assert_eq!(net.edge(sink_edge).dest, net.sink());
        let rev = net.edge(sink_edge).reverse.unwrap();
        assert!(net.edge(rev).capacity.is_unbounded());
        assert_eq!(net.edge(rev).role, EdgeRole::Residual);
    }

    #[test]
    fn test_targeted_link_uses_aggregate() {
        let (topo, a, _, _) = chain();
        let link = LinkId(1);
        let layout = build_network(&topo, &[Target::Link(link)], &[a]).unwrap();
        let net = &layout.network;

        let LinkEdges::Targeted {
            aggregate,
            from_h1,
            from_h2,
        } = layout.links[1]
        else {
            panic!("link r-v should be targeted");
        };
        assert!(net.edge(from_h1).capacity.is_unbounded());
        assert!(net.edge(from_h2).capacity.is_unbounded());
        assert_eq!(net.edge(from_h1).dest, aggregate);
        assert_eq!(net.outgoing(aggregate).len(), 5);

        let sink_edge = layout.sink_edge(Target::Link(link)).unwrap();
        assert_eq!(net.edge(sink_edge).src, aggregate);
    }

    #[test]
    fn test_rejects_attacker_victim_overlap() {
        let (topo, a, _, _) = chain();
        let err = build_network(&topo, &[Target::Host(a)], &[a]).unwrap_err();
        assert!(matches!(err, AnalysisError::AttackerIsVictim(name) if name == "a"));
    }

    #[test]
    fn test_rejects_unknown_entities() {
        let (topo, a, _, v) = chain();
        assert!(matches!(
            build_network(&topo, &[Target::Host(HostId(9))], &[a]),
            Err(AnalysisError::UnknownHost(9))
        ));
        assert!(matches!(
            build_network(&topo, &[Target::Link(LinkId(7))], &[a]),
            Err(AnalysisError::UnknownLink(7))
        ));
        assert!(matches!(
            build_network(&topo, &[Target::Host(v)], &[HostId(3)]),
            Err(AnalysisError::UnknownHost(3))
        ));
    }
}
