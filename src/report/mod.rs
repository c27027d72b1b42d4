// SPDX-License-Identifier: PMPL-1.0-or-later

//! Report generation module

pub mod formatter;
pub mod generator;
pub mod output;

use crate::types::*;
use anyhow::Result;
use std::path::Path;

pub use formatter::ReportFormatter;
pub use generator::{AttackRecord, AttackReport, ReportGenerator, SearchMode};
pub use output::ReportOutputFormat;

/// Generate a report for the attacks found in one scenario
pub fn generate_attack_report(
    scenario: &str,
    topology: &Topology,
    mode: SearchMode,
    attacks: &[Attack],
) -> Result<AttackReport> {
    let generator = ReportGenerator::new();
    generator.generate(scenario, topology, mode, attacks)
}

/// Save report to file
pub fn save_report<P: AsRef<Path>>(
    report: &AttackReport,
    path: P,
    format: ReportOutputFormat,
) -> Result<()> {
    let formatter = ReportFormatter::new();
    formatter.save(report, path, format)
}

/// Print report to console
pub fn print_report(report: &AttackReport) {
    let formatter = ReportFormatter::new();
    formatter.print(report);
}
