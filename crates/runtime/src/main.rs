#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
//! # Student Simulation Runtime
//!
//! Entry point for the `runtime_main` binary.
//!
//! Drives the student environment with a baseline policy, either the plain
//! environment or the biased-training variant. Pass `--render` to print every
//! step as a table and `--log-path` to write one JSON object per step.

mod agent;
mod app;
mod render;

use std::path::PathBuf;

use anyhow::{ensure, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use student::{BiasedTrainingEnv, EnvConfig, EnvShape, StudentEnv, StudentSimulation};

use crate::agent::{Policy, RandomAgent, ScriptedAgent};
use crate::render::Reporter;

#[derive(Parser)]
#[command(name = "runtime_main", about = "Run baseline policies against the student simulator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run episodes with a baseline policy
    Run(RunArgs),
    /// Print the default environment configuration as JSON
    Config,
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyKind {
    Random,
    Scripted,
}

#[derive(Clone, Copy, ValueEnum)]
enum Variant {
    Standard,
    Biased,
}

#[derive(clap::Args)]
struct RunArgs {
    #[arg(long, value_enum, default_value_t = PolicyKind::Random)]
    policy: PolicyKind,
    #[arg(long, short = 'v', value_enum, default_value_t = Variant::Standard)]
    variant: Variant,
    #[arg(long, short = 's', default_value_t = 2)]
    num_subjects: usize,
    #[arg(long, short = 'd', default_value_t = 3)]
    num_difficulty_levels: usize,
    #[arg(long, short = 'l', default_value_t = 3)]
    num_learning_types: usize,
    #[arg(long, short = 'e', default_value_t = 200)]
    num_episodes: usize,
    #[arg(long, default_value_t = 20_000)]
    num_steps: usize,
    /// Seed for the environment and policy; entropy when omitted
    #[arg(long)]
    seed: Option<u64>,
    /// JSON file overriding parts of the default configuration
    #[arg(long)]
    config: Option<PathBuf>,
    /// Write one JSON object per step to this file
    #[arg(long)]
    log_path: Option<PathBuf>,
    #[arg(long)]
    render: bool,
    /// Trainings the scripted policy performs before each test
    #[arg(long, default_value_t = 5)]
    trainings_per_test: usize,
    /// Learning type the scripted policy trains with (0-based)
    #[arg(long, default_value_t = 0)]
    learning_type: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    match Cli::parse().command {
        Command::Run(args) => run(&args),
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&EnvConfig::default())?);
            Ok(())
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<EnvConfig> {
    let Some(path) = path else {
        return Ok(EnvConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    Ok(EnvConfig::from_json_str(&json)?)
}

fn rng(seed: Option<u64>, stream: u64) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(stream)),
        None => StdRng::from_entropy(),
    }
}

fn run(args: &RunArgs) -> Result<()> {
    let shape = EnvShape::new(
        args.num_subjects,
        args.num_difficulty_levels,
        args.num_learning_types,
    );
    let config = load_config(args.config.as_ref())?;
    let bias = config.bias.clone();
    let target_score = config.target_score;

    tracing::info!("Initializing student environment {:?}...", shape);
    let env = StudentEnv::with_config(shape, config, rng(args.seed, 0))?;
    ensure!(
        args.learning_type < shape.num_learning_types,
        "--learning-type {} is out of range for {} learning types",
        args.learning_type,
        shape.num_learning_types
    );

    let mut policy: Box<dyn Policy> = match args.policy {
        PolicyKind::Random => Box::new(RandomAgent::new(shape, rng(args.seed, 1))),
        PolicyKind::Scripted => Box::new(ScriptedAgent::new(
            shape,
            args.learning_type,
            args.trainings_per_test,
            target_score,
        )),
    };
    let mut reporter = Reporter::new(args.render, args.log_path.as_deref())?;

    match args.variant {
        Variant::Standard => drive(env, policy.as_mut(), args, &mut reporter),
        Variant::Biased => {
            let bias_seed = args.seed.map_or_else(rand::random, |s| s.wrapping_add(2));
            let env = BiasedTrainingEnv::new(env, &bias, bias_seed)?;
            drive(env, policy.as_mut(), args, &mut reporter)
        }
    }
}

fn drive<E: StudentSimulation>(
    mut env: E,
    policy: &mut dyn Policy,
    args: &RunArgs,
    reporter: &mut Reporter,
) -> Result<()> {
    let summaries = app::run_env(policy, &mut env, args.num_episodes, args.num_steps, reporter)?;
    let completed = summaries.iter().filter(|s| s.done).count();
    let mean_steps =
        summaries.iter().map(|s| s.steps as f64).sum::<f64>() / summaries.len().max(1) as f64;
    tracing::info!(
        "Finished {} episodes: {} completed, {:.1} steps on average.",
        summaries.len(),
        completed,
        mean_steps
    );
    for summary in &summaries {
        println!("{}", serde_json::to_string(summary)?);
    }
    Ok(())
}
