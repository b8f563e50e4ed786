//! Careflow Simulator CLI
//!
//! Runs the built-in policy scenarios and prints a per-scenario latency
//! summary. Presentation only: all simulation logic lives in the core
//! crate, and the summary arithmetic here is plain folds over the ledger.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::process::ExitCode;

use careflow_simulator_core_rs::scenario::{presets, ScenarioConfig};
use careflow_simulator_core_rs::{run_scenario, CompletedLedger};
use clap::{Parser, ValueEnum};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ScenarioArg {
    Legacy,
    Fifo,
    RuleBased,
    PartialAutomation,
    Orchestrator,
    All,
}

/// Compare care-coordination automation policies on identical inputs.
#[derive(Debug, Parser)]
#[command(name = "careflow-sim", version)]
struct Args {
    /// Scenario to run
    #[arg(long, value_enum, default_value = "all")]
    scenario: ScenarioArg,

    /// Number of cases in the cohort
    #[arg(long, default_value_t = 1000)]
    cases: usize,

    /// RNG seed (same seed, same ledger)
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Write the full ledgers as JSON to this path
    #[arg(long)]
    json: Option<std::path::PathBuf>,
}

fn selected_scenarios(arg: ScenarioArg) -> Vec<ScenarioConfig> {
    match arg {
        ScenarioArg::Legacy => vec![presets::legacy()],
        ScenarioArg::Fifo => vec![presets::fifo()],
        ScenarioArg::RuleBased => vec![presets::rule_based()],
        ScenarioArg::PartialAutomation => vec![presets::partial_automation()],
        ScenarioArg::Orchestrator => vec![presets::orchestrator()],
        ScenarioArg::All => presets::all(),
    }
}

fn print_summary(ledger: &CompletedLedger) {
    if ledger.is_empty() {
        println!("{}", "=".repeat(60));
        println!("scenario:    {} (no cases)", ledger.scenario);
        return;
    }

    let latencies = ledger.latencies();
    let n = latencies.len() as f64;
    let mean = ledger.mean_latency();
    let variance = latencies.iter().map(|l| (l - mean) * (l - mean)).sum::<f64>() / n;
    let min = latencies.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = latencies.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    println!("{}", "=".repeat(60));
    println!("scenario:    {}", ledger.scenario);
    println!("cases:       {}", ledger.len());
    println!("mean (days): {:.2}", mean);
    println!("std  (days): {:.2}", variance.sqrt());
    println!("min  (days): {:.2}", min);
    println!("max  (days): {:.2}", max);
    println!("fingerprint: {}", ledger.fingerprint());
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut ledgers = Vec::new();
    for config in selected_scenarios(args.scenario) {
        match run_scenario(config, args.cases, args.seed) {
            Ok(ledger) => {
                print_summary(&ledger);
                ledgers.push(ledger);
            }
            Err(e) => {
                error!("scenario failed: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }
    println!("{}", "=".repeat(60));

    if let Some(path) = &args.json {
        let file = match File::create(path) {
            Ok(file) => file,
            Err(e) => {
                error!("cannot create {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        };
        let mut writer = BufWriter::new(file);
        if let Err(e) = serde_json::to_writer_pretty(&mut writer, &ledgers)
            .map_err(std::io::Error::from)
            .and_then(|_| writer.flush())
        {
            error!("cannot write {}: {}", path.display(), e);
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}
