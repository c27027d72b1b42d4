// SPDX-License-Identifier: PMPL-1.0-or-later

//! Core type definitions for amp-attack
//!
//! A [`Topology`] is a static set of hosts and links. Hosts and links are
//! addressed by stable indices ([`HostId`], [`LinkId`]) so that the flow
//! network and the search can refer to them without borrowing the topology.

use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HostId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LinkId(pub usize);

impl fmt::Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "h{}", self.0)
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "l{}", self.0)
    }
}

/// Host role within the topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HostRole {
    #[default]
    Client,
    /// Protected server: never drafted into an automatic attacker pool
    Server,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Host {
    pub name: String,
    /// Volume the host absorbs before it counts as attacked
    pub receiving_cap: f64,
    /// Volume the host can emit
    pub sending_cap: f64,
    /// Multiplier applied to traffic the host relays
    #[serde(default = "default_amp_factor")]
    pub amp_factor: f64,
    #[serde(default)]
    pub role: HostRole,
}

fn default_amp_factor() -> f64 {
    1.0
}

impl Host {
    pub fn client(name: &str, receiving_cap: f64, sending_cap: f64) -> Self {
        Self {
            name: name.to_string(),
            receiving_cap,
            sending_cap,
            amp_factor: 1.0,
            role: HostRole::Client,
        }
    }

    pub fn server(name: &str, receiving_cap: f64, sending_cap: f64, amp_factor: f64) -> Self {
        Self {
            name: name.to_string(),
            receiving_cap,
            sending_cap,
            amp_factor,
            role: HostRole::Server,
        }
    }

    pub fn with_amp_factor(mut self, amp_factor: f64) -> Self {
        self.amp_factor = amp_factor;
        self
    }

    pub fn is_server(&self) -> bool {
        self.role == HostRole::Server
    }

    /// Servers and hosts with an amplification factor above one
    pub fn is_reflector(&self) -> bool {
        self.is_server() || self.amp_factor > 1.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub name: String,
    pub h1: HostId,
    pub h2: HostId,
    pub capacity: f64,
}

impl Link {
    pub fn endpoints(&self) -> (HostId, HostId) {
        (self.h1, self.h2)
    }
}

/// Static network description used for one analysis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    pub hosts: Vec<Host>,
    pub links: Vec<Link>,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_host(&mut self, host: Host) -> HostId {
        self.hosts.push(host);
        HostId(self.hosts.len() - 1)
    }

    /// Add a link named after its endpoints
    pub fn connect(&mut self, h1: HostId, h2: HostId, capacity: f64) -> LinkId {
        let name = format!("{}-{}", self.host_label(h1), self.host_label(h2));
        self.add_link(Link {
            name,
            h1,
            h2,
            capacity,
        })
    }

    pub fn add_link(&mut self, link: Link) -> LinkId {
        self.links.push(link);
        LinkId(self.links.len() - 1)
    }

    pub fn host(&self, id: HostId) -> Result<&Host> {
        self.hosts.get(id.0).ok_or(AnalysisError::UnknownHost(id.0))
    }

    pub fn link(&self, id: LinkId) -> Result<&Link> {
        self.links.get(id.0).ok_or(AnalysisError::UnknownLink(id.0))
    }

    pub fn host_ids(&self) -> impl Iterator<Item = HostId> + '_ {
        (0..self.hosts.len()).map(HostId)
    }

    pub fn link_ids(&self) -> impl Iterator<Item = LinkId> + '_ {
        (0..self.links.len()).map(LinkId)
    }

    pub fn host_by_name(&self, name: &str) -> Result<HostId> {
        self.hosts
            .iter()
            .position(|h| h.name == name)
            .map(HostId)
            .ok_or_else(|| AnalysisError::UnknownHostName(name.to_string()))
    }

    pub fn link_by_name(&self, name: &str) -> Result<LinkId> {
        self.links
            .iter()
            .position(|l| l.name == name)
            .map(LinkId)
            .ok_or_else(|| AnalysisError::UnknownLinkName(name.to_string()))
    }

    /// Name of a host, or its index label when the id is out of range
    pub fn host_label(&self, id: HostId) -> String {
        self.hosts
            .get(id.0)
            .map(|h| h.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn link_label(&self, id: LinkId) -> String {
        self.links
            .get(id.0)
            .map(|l| l.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn target_label(&self, target: Target) -> String {
        match target {
            Target::Host(h) => self.host_label(h),
            Target::Link(l) => self.link_label(l),
        }
    }

    /// Reject capacities and factors the flow engine cannot work with
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for host in &self.hosts {
            if !names.insert(host.name.as_str()) {
                return Err(AnalysisError::DuplicateHost(host.name.clone()));
            }
            for (field, value) in [
                ("receiving_cap", host.receiving_cap),
                ("sending_cap", host.sending_cap),
                ("amp_factor", host.amp_factor),
            ] {
                if !value.is_finite() || value < 0.0 {
                    return Err(AnalysisError::InvalidHost {
                        name: host.name.clone(),
                        reason: format!(
                            "{} must be finite and non-negative, got {}",
                            field, value
                        ),
                    });
                }
            }
        }

        for link in &self.links {
            for end in [link.h1, link.h2] {
                if end.0 >= self.hosts.len() {
                    return Err(AnalysisError::InvalidLink {
                        name: link.name.clone(),
                        reason: format!("endpoint {} is not a host of the topology", end),
                    });
                }
            }
            if link.h1 == link.h2 {
                return Err(AnalysisError::InvalidLink {
                    name: link.name.clone(),
                    reason: "both endpoints are the same host".to_string(),
                });
            }
            if !link.capacity.is_finite() || link.capacity < 0.0 {
                return Err(AnalysisError::InvalidLink {
                    name: link.name.clone(),
                    reason: format!(
                        "capacity must be finite and non-negative, got {}",
                        link.capacity
                    ),
                });
            }
        }

        Ok(())
    }
}

/// A victim: either a host or a link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    Host(HostId),
    Link(LinkId),
}

impl Target {
    /// Volume the target absorbs before it counts as overloaded
    pub fn capacity_limit(&self, topology: &Topology) -> Result<f64> {
        match *self {
            Target::Host(h) => Ok(topology.host(h)?.receiving_cap),
            Target::Link(l) => Ok(topology.link(l)?.capacity),
        }
    }

    /// Victim hosts only receive; they never relay or originate traffic
    pub fn is_passive(&self) -> bool {
        matches!(self, Target::Host(_))
    }

    pub fn as_host(&self) -> Option<HostId> {
        match *self {
            Target::Host(h) => Some(h),
            Target::Link(_) => None,
        }
    }

    pub fn as_link(&self) -> Option<LinkId> {
        match *self {
            Target::Link(l) => Some(l),
            Target::Host(_) => None,
        }
    }
}

/// Realized traffic across one link in one direction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinkFlow {
    pub link: LinkId,
    pub from: HostId,
    pub to: HostId,
    pub volume: f64,
}

/// Flow delivered to a victim compared with the limit it was checked against
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VictimLoad {
    pub target: Target,
    pub load: f64,
    pub limit: f64,
}

impl VictimLoad {
    pub fn overloaded(&self) -> bool {
        self.load > self.limit
    }
}

/// A demonstrated attack: confirmed victims, the attackers that sent
/// traffic, and the realized per-link flows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attack {
    pub victims: Vec<Target>,
    pub attackers: Vec<HostId>,
    pub flows: Vec<LinkFlow>,
    #[serde(default)]
    pub loads: Vec<VictimLoad>,
}

impl Attack {
    pub fn victim_hosts(&self) -> impl Iterator<Item = HostId> + '_ {
        self.victims.iter().filter_map(Target::as_host)
    }

    pub fn victim_links(&self) -> impl Iterator<Item = LinkId> + '_ {
        self.victims.iter().filter_map(Target::as_link)
    }
}
