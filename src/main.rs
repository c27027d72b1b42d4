// SPDX-License-Identifier: PMPL-1.0-or-later

//! amp-attack: amplification attack feasibility analysis
//!
//! Loads a scenario file describing hosts and links, searches for victim
//! hosts or links that attackers can overload with amplified traffic, and
//! prints or saves the traffic assignment demonstrating each attack.

use amp_attack::report::{self, ReportOutputFormat, SearchMode};
use amp_attack::scenario::{self, AttackSpec, Scenario};
use amp_attack::search::{self, AttackChecker, FlowOracle};
use amp_attack::types::HostRole;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "amp-attack")]
#[command(version)]
#[command(about = "Amplification attack feasibility analysis over network topologies")]
#[command(long_about = None)]
struct Cli {
    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search a scenario for feasible attacks
    Check {
        /// Scenario file (.json, .yaml or .yml)
        #[arg(value_name = "SCENARIO")]
        scenario: PathBuf,

        /// Victim host (repeatable; overrides the scenario's victims)
        #[arg(long = "victim", value_name = "HOST")]
        victims: Vec<String>,

        /// Targeted link (repeatable; overrides the scenario's links)
        #[arg(long = "link", value_name = "LINK")]
        links: Vec<String>,

        /// Attacker host (repeatable; overrides the scenario's attackers)
        #[arg(long = "attacker", value_name = "HOST")]
        attackers: Vec<String>,

        /// Report every victim group instead of stopping at the first
        #[arg(short, long)]
        exhaustive: bool,

        /// Stop the flow engine after this many augmentations
        #[arg(long)]
        max_rounds: Option<usize>,

        /// Output report to file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output file format
        #[arg(short, long, value_enum, default_value = "json")]
        format: ReportOutputFormat,

        /// Re-check every attack found with its own victims and attackers
        #[arg(long)]
        confirm: bool,
    },

    /// Print a scenario's topology and validate it
    Inspect {
        /// Scenario file (.json, .yaml or .yml)
        #[arg(value_name = "SCENARIO")]
        scenario: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_target(false)
        .init();
}

fn override_attack(
    base: &AttackSpec,
    victims: Vec<String>,
    links: Vec<String>,
    attackers: Vec<String>,
    exhaustive: bool,
) -> AttackSpec {
    let mut attack = base.clone();
    if !victims.is_empty() || !links.is_empty() {
        attack.victims = victims;
        attack.links = links;
    }
    if !attackers.is_empty() {
        attack.attackers = attackers;
    }
    attack.exhaustive |= exhaustive;
    attack
}

fn print_topology(scenario: &Scenario) {
    let topo = &scenario.topology;
    println!("{}", format!("SCENARIO {}", scenario.name).bold().yellow());
    println!("  Hosts: {}", topo.hosts.len());
    for host in &topo.hosts {
        let role = match host.role {
            HostRole::Server => "server".cyan(),
            HostRole::Client => "client".normal(),
        };
        println!(
            "    {:<16} {:<8} recv {:>10.2}  send {:>10.2}  amp {:>6.2}",
            host.name, role, host.receiving_cap, host.sending_cap, host.amp_factor
        );
    }
    println!("  Links: {}", topo.links.len());
    for link in &topo.links {
        println!(
            "    {:<16} {} <-> {}  capacity {:.2}",
            link.name,
            topo.host_label(link.h1),
            topo.host_label(link.h2),
            link.capacity
        );
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Check {
            scenario: path,
            victims,
            links,
            attackers,
            exhaustive,
            max_rounds,
            output,
            format,
            confirm,
        } => {
            let mut scenario = scenario::load_scenario(&path)
                .with_context(|| format!("loading scenario {}", path.display()))?;
            scenario.attack =
                override_attack(&scenario.attack, victims, links, attackers, exhaustive);
            if max_rounds.is_some() {
                scenario.engine.max_rounds = max_rounds;
            }

            println!("Checking scenario: {}", scenario.name);
            let request = scenario.request()?;
            let config = scenario.search_config();
            let mode = SearchMode::of(&request, config.exhaustive);

            let attacks = search::find_attacks(&scenario.topology, request, &config)?;

            if confirm {
                let oracle = FlowOracle::new(config.engine);
                for (i, attack) in attacks.iter().enumerate() {
                    let rechecked =
                        AttackChecker::from_attack(&scenario.topology, attack, oracle).check()?;
                    let verdict = if rechecked.is_empty() {
                        "not reproduced".red()
                    } else {
                        "reproduced".green()
                    };
                    println!("  Attack {}: {}", i + 1, verdict);
                }
            }

            let attack_report =
                report::generate_attack_report(&scenario.name, &scenario.topology, mode, &attacks)?;
            report::print_report(&attack_report);

            if let Some(output_path) = output {
                report::save_report(&attack_report, output_path, format)?;
            }
        }

        Commands::Inspect { scenario: path } => {
            let scenario = scenario::load_scenario(&path)
                .with_context(|| format!("loading scenario {}", path.display()))?;
            print_topology(&scenario);
            println!();
            println!("{}", "Scenario is valid".green());
        }
    }

    Ok(())
}
