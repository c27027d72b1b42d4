// SPDX-License-Identifier: PMPL-1.0-or-later

//! Report generation logic

use crate::search::AttackRequest;
use crate::types::*;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// How the search was driven
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchMode {
    SingleVictim,
    VictimSet,
    Exhaustive,
    TargetedLinks,
}

impl SearchMode {
    pub fn of(request: &AttackRequest, exhaustive: bool) -> Self {
        if !request.links.is_empty() {
            SearchMode::TargetedLinks
        } else if request.victims.len() == 1 {
            SearchMode::SingleVictim
        } else if exhaustive {
            SearchMode::Exhaustive
        } else {
            SearchMode::VictimSet
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowRecord {
    pub link: String,
    pub from: String,
    pub to: String,
    pub volume: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadRecord {
    pub victim: String,
    pub load: f64,
    pub limit: f64,
    pub overloaded: bool,
}

/// One attack with every host and link replaced by its name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackRecord {
    pub victims: Vec<String>,
    pub attackers: Vec<String>,
    pub flows: Vec<FlowRecord>,
    pub loads: Vec<LoadRecord>,
    /// Volume delivered to victims per unit the attackers put on the wire
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amplification: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackReport {
    pub created_at: String,
    pub scenario: String,
    pub mode: SearchMode,
    pub hosts: usize,
    pub links: usize,
    pub attacks: Vec<AttackRecord>,
}

impl AttackReport {
    pub fn is_vulnerable(&self) -> bool {
        !self.attacks.is_empty()
    }
}

pub struct ReportGenerator;

impl ReportGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(
        &self,
        scenario: &str,
        topology: &Topology,
        mode: SearchMode,
        attacks: &[Attack],
    ) -> Result<AttackReport> {
        Ok(AttackReport {
            created_at: chrono::Utc::now().to_rfc3339(),
            scenario: scenario.to_string(),
            mode,
            hosts: topology.hosts.len(),
            links: topology.links.len(),
            attacks: attacks
                .iter()
                .map(|a| self.record(topology, a))
                .collect(),
        })
    }

    fn record(&self, topology: &Topology, attack: &Attack) -> AttackRecord {
        let flows = attack
            .flows
            .iter()
            .map(|f| FlowRecord {
                link: topology.link_label(f.link),
                from: topology.host_label(f.from),
                to: topology.host_label(f.to),
                volume: f.volume,
            })
            .collect();

        let loads = attack
            .loads
            .iter()
            .map(|l| LoadRecord {
                victim: topology.target_label(l.target),
                load: l.load,
                limit: l.limit,
                overloaded: l.overloaded(),
            })
            .collect();

        AttackRecord {
            victims: attack
                .victims
                .iter()
                .map(|v| topology.target_label(*v))
                .collect(),
            attackers: attack
                .attackers
                .iter()
                .map(|h| topology.host_label(*h))
                .collect(),
            flows,
            loads,
            amplification: amplification(attack),
        }
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn amplification(attack: &Attack) -> Option<f64> {
    let sent: f64 = attack
        .flows
        .iter()
        .filter(|f| attack.attackers.contains(&f.from))
        .map(|f| f.volume)
        .sum();
    let delivered: f64 = attack
        .loads
        .iter()
        .filter(|l| attack.victims.contains(&l.target))
        .map(|l| l.load)
        .sum();
    (sent > 0.0).then(|| delivered / sent)
}
