//! qteleport - quantum teleportation protocol simulator
//! Command-line interface for running sessions, scenario suites and statistics

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use qteleport::reporting::{write_export, StatisticsSummary};
use qteleport::simulation::{run_suite, ProtocolSession, ScenarioSuite, SessionPhase};
use qteleport::{validate_record, MeasurementDistribution, SessionConfig, Simulator};
use rand::RngExt;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "qteleport")]
#[command(version)]
#[command(about = "Discrete-event simulation of the quantum teleportation protocol", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Session parameters shared by the commands that run sessions.
#[derive(clap::Args, Debug)]
struct SessionArgs {
    /// TOML file with session parameters; flags below override it
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Initial state to teleport (|0⟩, |1⟩, |+⟩, |-⟩ or 0, 1, +, -)
    #[arg(short = 's', long)]
    initial_state: Option<String>,

    /// Bell state type: 1 for |Φ⁺⟩, 3 for |Ψ⁻⟩
    #[arg(short, long)]
    bell: Option<i64>,

    /// Simulation horizon in picoseconds
    #[arg(short, long, allow_negative_numbers = true)]
    runtime: Option<i64>,

    /// Receiver correction delay in picoseconds
    #[arg(short, long, allow_negative_numbers = true)]
    delay: Option<i64>,

    /// Classical channel latency in picoseconds
    #[arg(long, allow_negative_numbers = true)]
    channel_delay: Option<i64>,

    /// Seed for the measurement sampler; for repeated runs, session i uses seed + i
    #[arg(long, env = "QTELEPORT_SEED")]
    seed: Option<u64>,
}

impl SessionArgs {
    fn to_config(&self) -> Result<SessionConfig> {
        let mut config = match &self.config {
            Some(path) => SessionConfig::from_file(path).with_context(|| format!("loading {}", path.display()))?,
            None => SessionConfig::default(),
        };
        if let Some(state) = &self.initial_state {
            config.initial_state = state.clone();
        }
        if let Some(bell) = self.bell {
            config.bell_state_type = bell;
        }
        if let Some(runtime) = self.runtime {
            config.runtime = runtime;
        }
        if let Some(delay) = self.delay {
            config.delay = delay;
        }
        if let Some(channel_delay) = self.channel_delay {
            config.channel_delay = channel_delay;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single teleportation session
    Run {
        #[command(flatten)]
        session: SessionArgs,

        /// Print the result record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run one of the canned scenario suites
    Suite {
        /// basic, states, bell, delay or comprehensive
        #[arg(value_name = "NAME")]
        name: String,

        /// Base seed; scenario i uses seed + i
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Measurement statistics over repeated sessions
    Stats {
        /// Number of sessions
        #[arg(short = 'n', long, default_value_t = 20)]
        runs: usize,

        #[command(flatten)]
        session: SessionArgs,
    },

    /// Run sessions in parallel and summarise or export them
    Batch {
        /// Number of sessions
        #[arg(short = 'n', long, default_value_t = 1000)]
        runs: usize,

        /// Worker threads (defaults to one per core)
        #[arg(short, long)]
        threads: Option<usize>,

        /// Write the results to this JSON file
        #[arg(short, long, value_name = "FILE")]
        export: Option<PathBuf>,

        #[command(flatten)]
        session: SessionArgs,
    },
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "qteleport=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Run { session, json } => run_command(&session, json),
        Commands::Suite { name, seed } => suite_command(&name, seed),
        Commands::Stats { runs, session } => stats_command(&session, runs),
        Commands::Batch { runs, threads, export, session } => batch_command(&session, runs, threads, export.as_deref()),
    };

    if let Err(e) = outcome {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run_command(args: &SessionArgs, json: bool) -> Result<()> {
    let params = args.to_config()?.validate().context("invalid session configuration")?;
    let mut session = ProtocolSession::new(params);
    let record = session.run().context("teleportation session failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    println!("{}", "=== Quantum Teleportation Results ===".bold());
    println!("{}", record);
    println!();
    println!("{}", session.trace());

    let report = validate_record(&record);
    match session.phase() {
        SessionPhase::Completed if record.is_success() => {
            println!("{} teleported {} to {}", "✓".green().bold(), record.initial_state, session.receiver().id());
        }
        SessionPhase::Abandoned => {
            println!(
                "{} runtime {} reached before the receiver corrected",
                "!".yellow().bold(),
                record.runtime
            );
        }
        _ => println!("{} {}", "✗".red().bold(), report),
    }
    Ok(())
}

fn suite_command(name: &str, seed: Option<u64>) -> Result<()> {
    let suite: ScenarioSuite = name.parse()?;
    let report = run_suite(suite, seed);
    println!("{}", report);
    if report.all_passed() {
        println!("{}", "✓ All tests passed!".green().bold());
        Ok(())
    } else {
        bail!("{} of {} scenarios failed", report.total() - report.passed(), report.total())
    }
}

/// The requested seed, or a fresh one so repeated invocations sample differently.
fn base_seed(requested: Option<u64>) -> u64 {
    requested.unwrap_or_else(|| rand::rng().random::<u64>())
}

fn stats_command(args: &SessionArgs, runs: usize) -> Result<()> {
    if runs == 0 {
        bail!("--runs must be at least 1");
    }
    let config = args.to_config()?;
    let seed = base_seed(config.seed);
    println!("{}", format!("base seed: {} (rerun with --seed {})", seed, seed).dimmed());
    let records = Simulator::new().repeat(&config, runs, seed).context("running sessions")?;
    let distribution = MeasurementDistribution::from_records(&records);
    println!("{}", distribution);

    let comparison = distribution.theory_comparison();
    let verdict = if comparison.consistent { comparison.to_string().green() } else { comparison.to_string().yellow() };
    println!("  {}", verdict);
    println!("\nNote: In ideal conditions, each outcome should occur ~25% of the time.");
    Ok(())
}

fn batch_command(args: &SessionArgs, runs: usize, threads: Option<usize>, export: Option<&Path>) -> Result<()> {
    if runs == 0 {
        bail!("--runs must be at least 1");
    }
    let config = args.to_config()?;
    let simulator = threads.map_or_else(Simulator::new, Simulator::with_threads);
    let seed = base_seed(config.seed);
    println!("{}", format!("base seed: {} (rerun with --seed {})", seed, seed).dimmed());
    let records = simulator.repeat(&config, runs, seed).context("running sessions")?;

    if let Some(summary) = StatisticsSummary::from_records(&records) {
        println!("{}", summary);
    }
    if let Some(path) = export {
        write_export(path, &records).with_context(|| format!("exporting to {}", path.display()))?;
        println!("{} {} results written to {}", "✓".green().bold(), records.len(), path.display());
    }
    Ok(())
}
