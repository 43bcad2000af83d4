//! arenaset CLI
//!
//! Drives an environment set of simulated 1v1 arenas with a random policy,
//! running the curriculum and reporting throughput.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use arenaset::curriculum::{scenario_provider, CurriculumCoordinator};
use arenaset::log::MemoryLogger;
use arenaset::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

mod config;
mod env;
mod metrics;

use config::TrainingConfig;
use metrics::StepMetrics;

#[derive(Parser)]
#[command(name = "arenaset")]
#[command(version, about = "arenaset - lockstep multi-arena experience collection", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Step an environment set with a random policy
    Run {
        /// Training config (JSON); missing file means defaults
        #[arg(long, default_value = "config/training_config.json")]
        config: PathBuf,

        /// Scenario pool (CSV)
        #[arg(long, default_value = "scenarios.csv")]
        scenarios: PathBuf,

        /// Number of arenas, overriding num_games
        #[arg(long)]
        arenas: Option<usize>,

        /// Steps to run
        #[arg(long, default_value = "1000")]
        steps: u64,

        /// Seed, overriding the config
        #[arg(long)]
        seed: Option<u64>,

        /// Worker threads (default: one per core)
        #[arg(long)]
        threads: Option<usize>,
    },

    /// Parse a training config and print the effective settings
    ValidateConfig {
        path: PathBuf,
    },

    /// List the scenarios in a CSV pool
    ListScenarios {
        path: PathBuf,
    },
}

struct RunArgs {
    config: PathBuf,
    scenarios: PathBuf,
    arenas: Option<usize>,
    steps: u64,
    seed: Option<u64>,
    threads: Option<usize>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            scenarios,
            arenas,
            steps,
            seed,
            threads,
        } => run(RunArgs {
            config,
            scenarios,
            arenas,
            steps,
            seed,
            threads,
        }),
        Commands::ValidateConfig { path } => validate_config(&path),
        Commands::ListScenarios { path } => list_scenarios(&path),
    }
}

fn run(args: RunArgs) -> Result<()> {
    let training = TrainingConfig::load(&args.config)?;
    let seed = args.seed.unwrap_or(training.seed);
    let num_arenas = args.arenas.unwrap_or(training.num_games);

    let mut env_config = EnvSetConfig::new(num_arenas)
        .with_tick_skip(training.tick_skip)
        .with_action_delay(training.action_delay)
        .with_save_rewards(true)
        .with_seed(seed);
    if let Some(threads) = args.threads {
        env_config = env_config.with_num_threads(threads);
    }

    let coordinator = Arc::new(CurriculumCoordinator::new(training.curriculum_parameters()));
    coordinator.set_phase_change_callback(|phase| {
        println!("Curriculum switched to phase {}", phase);
    });

    let provider = if training.wants_scenarios() {
        match ScenarioGenerator::load(&args.scenarios, seed) {
            Ok(generator) if generator.has_scenarios() => {
                Some(scenario_provider(Arc::new(generator), coordinator.clone()))
            }
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(error = %e, "scenario pool unavailable, using kickoffs only");
                None
            }
        }
    } else {
        None
    };

    tracing::info!(
        arenas = num_arenas,
        steps = args.steps,
        phase = %coordinator.phase(),
        scenarios = provider.is_some(),
        "Starting run"
    );

    let factory = env::env_factory(coordinator.clone(), seed);
    let mut envs = EnvSet::new(env_config, factory, provider)?;
    let summary = Arc::new(MemoryLogger::new());
    let mut logger = CompositeLogger::new(Vec::new());
    logger.add(Box::new(ConsoleLogger::new()));
    logger.add(Box::new(summary.clone()));
    let metrics_interval = u64::from(training.scenario_reward_log_interval.max(1));
    let mut metrics = StepMetrics::new();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut actions = vec![0usize; envs.num_agents()];
    let mut episodes = 0usize;

    let start = Instant::now();
    for step in 0..args.steps {
        envs.step_first_half(true)?;
        envs.sync()?;
        sample_actions(envs.state()?, &mut rng, &mut actions);
        envs.step_second_half(&actions, false)?;

        let names = envs.scenario_names()?;
        if let Some(report) = coordinator.observe_step(envs.state()?, &names) {
            report.log_to(&logger, step);
        }
        metrics.record_states(&envs.game_states()?);
        metrics.record_reward_entries(envs.state()?, &env::REWARD_NAMES);
        if (step + 1) % metrics_interval == 0 || step + 1 == args.steps {
            logger.log_metrics(&metrics.take(), step);
        }
        episodes += envs.reset()?;
    }
    let elapsed = start.elapsed().as_secs_f64();
    logger.close();

    let agent_steps = args.steps * envs.num_agents() as u64;
    let sps = if elapsed > 0.0 {
        agent_steps as f64 / elapsed
    } else {
        0.0
    };
    println!(
        "Completed {} steps over {} arenas: {} episodes, {} agent steps, {:.0} steps/s, final phase {}",
        args.steps,
        envs.num_arenas(),
        episodes,
        agent_steps,
        sps,
        coordinator.phase()
    );
    for name in ["Player/Speed", "Player/Boost", "Rewards/PhaseAware"] {
        if let Some(value) = summary.last(name) {
            println!("  {:<24} {:.3}", name, value);
        }
    }
    Ok(())
}

/// Uniformly random allowed action per agent.
fn sample_actions(state: &EnvState, rng: &mut impl Rng, actions: &mut [usize]) {
    for (agent, mask) in state.action_masks().outer_iter().enumerate() {
        let allowed: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter(|(_, m)| **m != 0)
            .map(|(i, _)| i)
            .collect();
        actions[agent] = if allowed.is_empty() {
            0
        } else {
            allowed[rng.gen_range(0..allowed.len())]
        };
    }
}

fn validate_config(path: &std::path::Path) -> Result<()> {
    if !path.exists() {
        bail!("config file {} does not exist", path.display());
    }
    let training = TrainingConfig::load(path)?;
    let env_config = EnvSetConfig::new(training.num_games)
        .with_tick_skip(training.tick_skip)
        .with_action_delay(training.action_delay);
    env_config.validate()?;

    println!("Config OK: {}", path.display());
    println!("{}", serde_json::to_string_pretty(&training)?);
    println!("auto_switch (effective): {}", training.auto_switch());
    println!("scenario resets: {}", training.wants_scenarios());
    Ok(())
}

fn list_scenarios(path: &std::path::Path) -> Result<()> {
    let generator = ScenarioGenerator::load(path, 0)?;
    println!("{} scenarios:", generator.scenarios().len());
    for scenario in generator.scenarios() {
        let s = &scenario.initial_state;
        println!(
            "  {:<20} ball ({:.0}, {:.0}, {:.0})  car ({:.0}, {:.0}, {:.0})  boost {:.0}",
            scenario.name,
            s.ball_pos.x,
            s.ball_pos.y,
            s.ball_pos.z,
            s.car_pos.x,
            s.car_pos.y,
            s.car_pos.z,
            s.car_boost
        );
    }
    Ok(())
}
