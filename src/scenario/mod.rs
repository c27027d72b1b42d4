// SPDX-License-Identifier: PMPL-1.0-or-later

//! Scenario files: a topology, an optional attack request and engine
//! settings, in JSON or YAML.
//!
//! ```yaml
//! name: reflector
//! hosts:
//!   - { name: A, receiving_cap: 0, sending_cap: 100 }
//!   - { name: R, receiving_cap: 100, sending_cap: 1000, amp_factor: 10, role: server }
//!   - { name: V, receiving_cap: 50, sending_cap: 0 }
//! links:
//!   - { between: [A, R], capacity: 100 }
//!   - { between: [R, V], capacity: 1000 }
//! attack:
//!   victims: [V]
//! ```

use crate::error::{AnalysisError, Result};
use crate::maxflow::EngineSettings;
use crate::search::{AttackRequest, SearchConfig};
use crate::types::{Host, Link, Topology};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioFormat {
    Json,
    Yaml,
}

impl ScenarioFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Some(ScenarioFormat::Json),
            Some("yaml") | Some("yml") => Some(ScenarioFormat::Yaml),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ScenarioSpec {
    name: Option<String>,
    hosts: Vec<Host>,
    #[serde(default)]
    links: Vec<LinkSpec>,
    #[serde(default)]
    attack: AttackSpec,
    #[serde(default)]
    engine: EngineSettings,
}

#[derive(Debug, Clone, Deserialize)]
struct LinkSpec {
    name: Option<String>,
    between: [String; 2],
    capacity: f64,
}

/// Attack request by host and link names
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttackSpec {
    #[serde(default)]
    pub victims: Vec<String>,
    #[serde(default)]
    pub links: Vec<String>,
    #[serde(default)]
    pub attackers: Vec<String>,
    #[serde(default)]
    pub exhaustive: bool,
}

impl AttackSpec {
    /// Resolve names against the topology
    pub fn resolve(&self, topology: &Topology) -> Result<AttackRequest> {
        Ok(AttackRequest {
            victims: self
                .victims
                .iter()
                .map(|n| topology.host_by_name(n))
                .collect::<Result<_>>()?,
            links: self
                .links
                .iter()
                .map(|n| topology.link_by_name(n))
                .collect::<Result<_>>()?,
            attackers: self
                .attackers
                .iter()
                .map(|n| topology.host_by_name(n))
                .collect::<Result<_>>()?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub topology: Topology,
    pub attack: AttackSpec,
    pub engine: EngineSettings,
}

impl Scenario {
    pub fn request(&self) -> Result<AttackRequest> {
        self.attack.resolve(&self.topology)
    }

    pub fn search_config(&self) -> SearchConfig {
        SearchConfig {
            exhaustive: self.attack.exhaustive,
            engine: self.engine,
        }
    }
}

pub fn load_scenario(path: &Path) -> Result<Scenario> {
    let fail = |reason: String| AnalysisError::Scenario {
        path: path.display().to_string(),
        reason,
    };

    let format = ScenarioFormat::from_path(path)
        .ok_or_else(|| fail("unsupported extension (expected .json, .yaml or .yml)".into()))?;
    let content = fs::read_to_string(path).map_err(|e| fail(format!("reading: {}", e)))?;
    let fallback = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "scenario".to_string());

    parse_scenario(&content, format, &fallback).map_err(|e| match e {
        AnalysisError::Scenario { reason, .. } => fail(reason),
        other => other,
    })
}

/// Parse scenario text; `fallback_name` is used when the file has no `name`
pub fn parse_scenario(
    content: &str,
    format: ScenarioFormat,
    fallback_name: &str,
) -> Result<Scenario> {
    let spec: ScenarioSpec = match format {
        ScenarioFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        ScenarioFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
    }
    .map_err(|reason| AnalysisError::Scenario {
        path: fallback_name.to_string(),
        reason: format!("parsing: {}", reason),
    })?;

    build_scenario(spec, fallback_name)
}

fn build_scenario(spec: ScenarioSpec, fallback_name: &str) -> Result<Scenario> {
    let mut topology = Topology::new();
    for host in spec.hosts {
        topology.add_host(host);
    }

    for link in spec.links {
        let [first, second] = &link.between;
        let h1 = topology.host_by_name(first)?;
        let h2 = topology.host_by_name(second)?;
        let name = link
            .name
            .unwrap_or_else(|| format!("{}-{}", first, second));
        topology.add_link(Link {
            name,
            h1,
            h2,
            capacity: link.capacity,
        });
    }

    topology.validate()?;
    // Fail on unknown names now rather than at query time
    spec.attack.resolve(&topology)?;

    Ok(Scenario {
        name: spec.name.unwrap_or_else(|| fallback_name.to_string()),
        topology,
        attack: spec.attack,
        engine: spec.engine,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HostRole;

    const REFLECTOR: &str = r#"
name: reflector
hosts:
  - { name: A, receiving_cap: 0, sending_cap: 100 }
  - { name: R, receiving_cap: 100, sending_cap: 1000, amp_factor: 10, role: server }
  - { name: V, receiving_cap: 50, sending_cap: 0 }
links:
  - { between: [A, R], capacity: 100 }
  - { name: uplink, between: [R, V], capacity: 1000 }
attack:
  victims: [V]
engine:
  max_rounds: 50
"#;

    #[test]
    fn test_parse_yaml_scenario() {
        let scenario = parse_scenario(REFLECTOR, ScenarioFormat::Yaml, "x").unwrap();
        assert_eq!(scenario.name, "reflector");
        assert_eq!(scenario.topology.hosts.len(), 3);
        assert_eq!(scenario.topology.hosts[0].amp_factor, 1.0);
        assert_eq!(scenario.topology.hosts[1].role, HostRole::Server);
        assert_eq!(scenario.topology.links[0].name, "A-R");
        assert_eq!(scenario.topology.links[1].name, "uplink");
        assert_eq!(scenario.engine.max_rounds, Some(50));
        assert_eq!(scenario.engine.epsilon, 1e-9);

        let request = scenario.request().unwrap();
        assert_eq!(request.victims.len(), 1);
        assert!(request.attackers.is_empty());
        assert!(!scenario.search_config().exhaustive);
    }

    #[test]
    fn test_parse_json_scenario() {
        let json = r#"{
            "hosts": [
                {"name": "a", "receiving_cap": 1, "sending_cap": 5},
                {"name": "b", "receiving_cap": 1, "sending_cap": 5}
            ],
            "links": [{"between": ["a", "b"], "capacity": 3}],
            "attack": {"links": ["a-b"], "exhaustive": true}
        }"#;
        let scenario = parse_scenario(json, ScenarioFormat::Json, "fallback").unwrap();
        assert_eq!(scenario.name, "fallback");
        assert_eq!(scenario.request().unwrap().links.len(), 1);
        assert!(scenario.search_config().exhaustive);
    }

    #[test]
    fn test_unknown_names_are_reported() {
        let bad_link = r#"
hosts:
  - { name: a, receiving_cap: 1, sending_cap: 1 }
links:
  - { between: [a, ghost], capacity: 1 }
"#;
        let err = parse_scenario(bad_link, ScenarioFormat::Yaml, "x").unwrap_err();
        assert!(matches!(err, AnalysisError::UnknownHostName(n) if n == "ghost"));

        let bad_victim = r#"
hosts:
  - { name: a, receiving_cap: 1, sending_cap: 1 }
attack:
  victims: [nobody]
"#;
        let err = parse_scenario(bad_victim, ScenarioFormat::Yaml, "x").unwrap_err();
        assert!(matches!(err, AnalysisError::UnknownHostName(n) if n == "nobody"));
    }

    #[test]
    fn test_parse_error_is_scenario_error() {
        let err = parse_scenario("hosts: [", ScenarioFormat::Yaml, "broken").unwrap_err();
        assert!(matches!(err, AnalysisError::Scenario { path, .. } if path == "broken"));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ScenarioFormat::from_path(Path::new("a/b.yml")),
            Some(ScenarioFormat::Yaml)
        );
        assert_eq!(
            ScenarioFormat::from_path(Path::new("b.json")),
            Some(ScenarioFormat::Json)
        );
        assert_eq!(ScenarioFormat::from_path(Path::new("b.toml")), None);
    }
}
