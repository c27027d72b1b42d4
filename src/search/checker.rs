// SPDX-License-Identifier: PMPL-1.0-or-later

//! Victim set search.
//!
//! Queries the whole remaining candidate pool at once and eliminates the
//! victims each successful query confirms. When a group result contains
//! several victim hosts and at least one of them is a reflector, the group
//! verdict is ambiguous and every such host is re-checked on its own.
//!
//! The loop stops at the first infeasible pool. This assumes shrinking a
//! pool that already failed cannot make it succeed; that holds for the flow
//! oracle in practice but is a heuristic, not a proven property.

use crate::error::{AnalysisError, Result};
use crate::search::oracle::FeasibilityOracle;
use crate::search::SearchConfig;
use crate::types::{Attack, HostId, LinkId, Target, Topology};
use std::collections::BTreeSet;
use tracing::{info, warn};

/// Which victims and attackers to consider. Empty lists mean "derive".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttackRequest {
    pub victims: Vec<HostId>,
    pub links: Vec<LinkId>,
    pub attackers: Vec<HostId>,
}

impl AttackRequest {
    /// The request that reproduces a previously found attack
    pub fn from_attack(attack: &Attack) -> Self {
        Self {
            victims: attack.victim_hosts().collect(),
            links: attack.victim_links().collect(),
            attackers: attack.attackers.clone(),
        }
    }
}

pub struct AttackChecker<'t, O> {
    topology: &'t Topology,
    request: AttackRequest,
    exhaustive: bool,
    oracle: O,
}

impl<'t, O: FeasibilityOracle> AttackChecker<'t, O> {
    pub fn new(topology: &'t Topology, request: AttackRequest, oracle: O) -> Self {
        Self {
            topology,
            request,
            exhaustive: false,
            oracle,
        }
    }

    pub fn with_config(mut self, config: &SearchConfig) -> Self {
        self.exhaustive = config.exhaustive;
        self
    }

    pub fn exhaustive(mut self, exhaustive: bool) -> Self {
        self.exhaustive = exhaustive;
        self
    }

    /// Re-check the victims and attackers of an earlier result
    pub fn from_attack(topology: &'t Topology, attack: &Attack, oracle: O) -> Self {
        Self::new(topology, AttackRequest::from_attack(attack), oracle)
    }

    pub fn request(&self) -> &AttackRequest {
        &self.request
    }

    /// Dispatch to the link variant when links are targeted, otherwise
    /// search over hosts
    pub fn check(&self) -> Result<Vec<Attack>> {
        if self.request.links.is_empty() {
            self.check_host_attacks()
        } else {
            self.check_link_attack()
        }
    }

    /// Supplied attackers, or every non-server host that is not a
    /// supplied victim
    pub fn attacker_pool(&self) -> Vec<HostId> {
        if !self.request.attackers.is_empty() {
            return self.request.attackers.clone();
        }
        self.topology
            .host_ids()
            .filter(|h| !self.topology.hosts[h.0].is_server())
            .filter(|h| !self.request.victims.contains(h))
            .collect()
    }

    fn validate(&self) -> Result<()> {
        self.topology.validate()?;
        for &h in self.request.victims.iter().chain(&self.request.attackers) {
            self.topology.host(h)?;
        }
        for &l in &self.request.links {
            self.topology.link(l)?;
        }
        if let Some(h) = self
            .request
            .attackers
            .iter()
            .find(|h| self.request.victims.contains(h))
        {
            return Err(AnalysisError::AttackerIsVictim(
                self.topology.host_label(*h),
            ));
        }
        Ok(())
    }

    fn labels<'a>(&self, hosts: impl IntoIterator<Item = &'a HostId>) -> String {
        hosts
            .into_iter()
            .map(|h| self.topology.host_label(*h))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn check_host_attacks(&self) -> Result<Vec<Attack>> {
        self.validate()?;
        let pool = self.attacker_pool();

        if let [victim] = self.request.victims.as_slice() {
            let victim = *victim;
            info!("checking attack on {}", self.topology.host_label(victim));
            let attack = self
                .oracle
                .check(self.topology, &[Target::Host(victim)], &pool)?;
            return Ok(attack.into_iter().collect());
        }

        let mut candidates: BTreeSet<HostId> = if !self.request.victims.is_empty() {
            self.request.victims.iter().copied().collect()
        } else if !self.request.attackers.is_empty() {
            self.topology
                .host_ids()
                .filter(|h| !self.request.attackers.contains(h))
                .collect()
        } else {
            self.topology.host_ids().collect()
        };

        let mut attacks = Vec::new();
        while !candidates.is_empty() {
            info!("looking for attacks on {}", self.labels(&candidates));

            let victims: Vec<Target> = candidates.iter().copied().map(Target::Host).collect();
            // A victim cannot send, so drop it from this query's attackers
            let attackers: Vec<HostId> = pool
                .iter()
                .copied()
                .filter(|h| !candidates.contains(h))
                .collect();

            let Some(attack) = self.oracle.check(self.topology, &victims, &attackers)? else {
                break;
            };
            if !self.exhaustive {
                return Ok(vec![attack]);
            }

            let before = candidates.len();
            let host_victims: Vec<HostId> = attack.victim_hosts().collect();
            info!("potential victims: {}", self.labels(&host_victims));

            let ambiguous = host_victims.len() > 1
                && host_victims
                    .iter()
                    .any(|h| self.topology.host(*h).map_or(false, |host| host.is_reflector()));

            if !ambiguous {
                for h in &host_victims {
                    candidates.remove(h);
                }
                attacks.push(attack);
            } else {
                for h in host_victims {
                    candidates.remove(&h);
                    info!("checking attack on victim {}", self.topology.host_label(h));
                    let attackers: Vec<HostId> =
                        pool.iter().copied().filter(|a| *a != h).collect();
                    if let Some(single) =
                        self.oracle
                            .check(self.topology, &[Target::Host(h)], &attackers)?
                    {
                        attacks.push(single);
                    }
                }
            }

            if candidates.len() == before {
                warn!("oracle confirmed no candidate victim, ending search");
                break;
            }
        }

        Ok(attacks)
    }

    /// One query against the targeted links. Victim hosts named in the same
    /// request join the targets instead of being dropped, so a mixed request
    /// reports host overloads next to link overloads.
    pub fn check_link_attack(&self) -> Result<Vec<Attack>> {
        self.validate()?;
        if self.request.links.is_empty() {
            return Err(AnalysisError::EmptyVictimSet);
        }

        let mut targets: Vec<Target> =
            self.request.links.iter().copied().map(Target::Link).collect();
        targets.extend(self.request.victims.iter().copied().map(Target::Host));
        let pool = self.attacker_pool();

        info!(
            "checking attack on links {}",
            self.request
                .links
                .iter()
                .map(|l| self.topology.link_label(*l))
                .collect::<Vec<_>>()
                .join(", ")
        );
        let attack = self.oracle.check(self.topology, &targets, &pool)?;
        Ok(attack.into_iter().collect())
    }
}
