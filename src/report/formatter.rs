// SPDX-License-Identifier: PMPL-1.0-or-later

//! Report formatting and output

use crate::report::generator::{AttackRecord, AttackReport};
use crate::report::output::ReportOutputFormat;
use anyhow::{Context, Result};
use colored::*;
use std::fs;
use std::path::Path;

pub struct ReportFormatter;

impl ReportFormatter {
    pub fn new() -> Self {
        Self
    }

    pub fn print(&self, report: &AttackReport) {
        println!("\n{}", "=== AMP-ATTACK FEASIBILITY REPORT ===".bold().cyan());
        println!();
        println!("  Scenario: {}", report.scenario);
        println!("  Topology: {} hosts, {} links", report.hosts, report.links);
        println!("  Search mode: {:?}", report.mode);
        println!();

        if report.attacks.is_empty() {
            println!("{}", "No feasible attack found".green());
            return;
        }

        println!(
            "{}",
            format!("{} ATTACK(S) FOUND", report.attacks.len())
                .bold()
                .red()
        );
        for (i, attack) in report.attacks.iter().enumerate() {
            println!();
            self.print_attack(i + 1, attack);
        }
    }

    fn print_attack(&self, index: usize, attack: &AttackRecord) {
        println!("  {}. Victims: {}", index, attack.victims.join(", ").bold());
        println!("     Attackers: {}", attack.attackers.join(", "));
        if let Some(factor) = attack.amplification {
            let factor_color = if factor > 1.0 { "red" } else { "yellow" };
            println!(
                "     Amplification: {}",
                format!("{:.2}x", factor).color(factor_color)
            );
        }

        if !attack.loads.is_empty() {
            println!("     Load:");
            for load in &attack.loads {
                let status = if load.overloaded {
                    "OVERLOADED".red().bold()
                } else {
                    "ok".green()
                };
                println!(
                    "       {:<20} {:>12.2} / {:<12.2} {}",
                    load.victim, load.load, load.limit, status
                );
            }
        }

        if !attack.flows.is_empty() {
            println!("     Flows:");
            for flow in &attack.flows {
                println!(
                    "       {} -> {} {}",
                    flow.from,
                    flow.to,
                    format!("{:.2} via {}", flow.volume, flow.link).dimmed()
                );
            }
        }
    }

    pub fn save<P: AsRef<Path>>(
        &self,
        report: &AttackReport,
        path: P,
        format: ReportOutputFormat,
    ) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }
        let content = format.serialize(report)?;
        fs::write(path, content).with_context(|| format!("writing report {}", path.display()))?;
        println!("Report saved to: {}", path.display());
        Ok(())
    }
}

impl Default for ReportFormatter {
    fn default() -> Self {
        Self::new()
    }
}
