// SPDX-License-Identifier: PMPL-1.0-or-later

//! Scenario files through to saved reports

use amp_attack::report::{self, ReportOutputFormat, SearchMode};
use amp_attack::scenario::load_scenario;
use amp_attack::search::find_attacks;
use amp_attack::AnalysisError;
use std::fs;

const REFLECTOR_YAML: &str = r#"
name: reflector
hosts:
  - { name: A, receiving_cap: 0, sending_cap: 100 }
  - { name: R, receiving_cap: 100, sending_cap: 1000, amp_factor: 10, role: server }
  - { name: V, receiving_cap: 50, sending_cap: 0 }
links:
  - { between: [A, R], capacity: 100 }
  - { between: [R, V], capacity: 1000 }
attack:
  victims: [V]
  attackers: [A]
"#;

#[test]
fn test_yaml_scenario_to_json_report() {
    let dir = tempfile::tempdir().unwrap();
    let scenario_path = dir.path().join("reflector.yaml");
    fs::write(&scenario_path, REFLECTOR_YAML).unwrap();

    let scenario = load_scenario(&scenario_path).unwrap();
    assert_eq!(scenario.name, "reflector");
    let request = scenario.request().unwrap();
    let config = scenario.search_config();
    let mode = SearchMode::of(&request, config.exhaustive);
    assert_eq!(mode, SearchMode::SingleVictim);

    let attacks = find_attacks(&scenario.topology, request, &config).unwrap();
    assert_eq!(attacks.len(), 1);

    let generated =
        report::generate_attack_report(&scenario.name, &scenario.topology, mode, &attacks)
            .unwrap();
    assert!(generated.is_vulnerable());

    let report_path = dir.path().join("out").join("report.json");
    report::save_report(&generated, &report_path, ReportOutputFormat::Json).unwrap();

    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(saved["scenario"], "reflector");
    assert_eq!(saved["mode"], "single-victim");
    assert_eq!(saved["attacks"][0]["victims"][0], "V");
    assert_eq!(saved["attacks"][0]["flows"][1]["link"], "R-V");
}

#[test]
fn test_json_scenario_derives_victims_from_attackers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pair.json");
    fs::write(
        &path,
        r#"{
            "hosts": [
                {"name": "a", "receiving_cap": 0, "sending_cap": 5},
                {"name": "b", "receiving_cap": 1, "sending_cap": 0}
            ],
            "links": [{"between": ["a", "b"], "capacity": 5}],
            "attack": {"attackers": ["a"]}
        }"#,
    )
    .unwrap();

    let scenario = load_scenario(&path).unwrap();
    // falls back to the file stem
    assert_eq!(scenario.name, "pair");
    let request = scenario.request().unwrap();
    assert!(request.victims.is_empty());

    // every non-attacker host is a candidate; b is overloaded by a
    let attacks = find_attacks(&scenario.topology, request, &scenario.search_config()).unwrap();
    assert_eq!(attacks.len(), 1);
    let b = scenario.topology.host_by_name("b").unwrap();
    assert_eq!(attacks[0].victim_hosts().collect::<Vec<_>>(), vec![b]);
}

#[test]
fn test_unsupported_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scenario.toml");
    fs::write(&path, "hosts = []").unwrap();

    let err = load_scenario(&path).unwrap_err();
    assert!(matches!(err, AnalysisError::Scenario { .. }));
}

#[test]
fn test_missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.yml");

    match load_scenario(&path) {
        Err(AnalysisError::Scenario { path: reported, .. }) => {
            assert!(reported.ends_with("missing.yml"));
        }
        other => panic!("expected scenario error, got {:?}", other),
    }
}

#[test]
fn test_yaml_report_output() {
    let dir = tempfile::tempdir().unwrap();
    let scenario_path = dir.path().join("reflector.yml");
    fs::write(&scenario_path, REFLECTOR_YAML).unwrap();
    let scenario = load_scenario(&scenario_path).unwrap();
    let attacks = find_attacks(
        &scenario.topology,
        scenario.request().unwrap(),
        &scenario.search_config(),
    )
    .unwrap();

    let generated = report::generate_attack_report(
        &scenario.name,
        &scenario.topology,
        SearchMode::SingleVictim,
        &attacks,
    )
    .unwrap();
    let report_path = dir
        .path()
        .join(format!("report.{}", ReportOutputFormat::Yaml.extension()));
    report::save_report(&generated, &report_path, ReportOutputFormat::Yaml).unwrap();

    let text = fs::read_to_string(&report_path).unwrap();
    assert!(text.contains("scenario: reflector"));
    assert!(text.contains("amplification: 10"));
}
