#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Horde Defence sessions headless.

mod config;
mod session;

use std::path::PathBuf;

use anyhow::{ensure, Result};
use clap::{Args, Parser, Subcommand};

use session::SessionPlan;

/// Wave defence simulation driver.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging unless RUST_LOG overrides it.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Simulate a session against a scripted marksman and print the score report.
    Run(RunArgs),
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Simulated duration in seconds.
    #[arg(long, default_value_t = 120.0)]
    seconds: f32,
    /// Fixed tick length in milliseconds.
    #[arg(long, default_value_t = 16, value_parser = clap::value_parser!(u32).range(1..))]
    tick_ms: u32,
    /// Seed shared by obstacle scattering, spawning and the marksman.
    #[arg(long, default_value_t = 7)]
    seed: u64,
    /// Number of obstacles scattered around the objective.
    #[arg(long, default_value_t = 24)]
    obstacles: usize,
    /// Optional TOML file overriding the stock tuning.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Marksman fire rate.
    #[arg(long, default_value_t = 4.0)]
    shots_per_second: f32,
    /// Damage dealt per shot before zone multipliers.
    #[arg(long, default_value_t = 35.0)]
    damage: f32,
    /// Probability that a shot is aimed at the head.
    #[arg(long, default_value_t = 0.25)]
    head_ratio: f64,
}

impl RunArgs {
    fn plan(&self) -> Result<SessionPlan> {
        ensure!(
            self.seconds.is_finite() && self.seconds >= 0.0,
            "--seconds must be a non-negative number, got {}",
            self.seconds
        );
        ensure!(
            self.shots_per_second.is_finite() && self.shots_per_second >= 0.0,
            "--shots-per-second must be a non-negative number, got {}",
            self.shots_per_second
        );
        ensure!(
            self.damage.is_finite() && self.damage >= 0.0,
            "--damage must be a non-negative number, got {}",
            self.damage
        );
        ensure!(
            (0.0..=1.0).contains(&self.head_ratio),
            "--head-ratio must lie within [0, 1], got {}",
            self.head_ratio
        );
        Ok(SessionPlan {
            seconds: self.seconds,
            tick_ms: self.tick_ms,
            seed: self.seed,
            obstacles: self.obstacles,
            shots_per_second: self.shots_per_second,
            damage: self.damage,
            head_ratio: self.head_ratio,
        })
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp_secs()
        .try_init();
}

/// Entry point for the Horde Defence command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Run(args) => {
            let plan = args.plan()?;
            let config = config::load(args.config.as_deref())?;
            let report = session::run(config, &plan);
            println!("{report}");
        }
    }
    Ok(())
}
