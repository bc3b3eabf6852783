use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use rl_checkpoint_hooks::checkpoint::CheckpointStore;
use rl_checkpoint_hooks::config::AppConfig;
use rl_checkpoint_hooks::env::EnvRegistry;
use rl_checkpoint_hooks::hooks::{BestCheckpointSaver, HookList, ProgressReporter};
use rl_checkpoint_hooks::policy::{Policy, TabularPolicy};
use rl_checkpoint_hooks::training::TrainingLoop;

/// Train a policy while saving a checkpoint on every new best evaluation score.
#[derive(Parser)]
#[command(name = "train", about = "Train an RL policy with best-checkpoint saving")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Override the environment name
    #[arg(long)]
    env: Option<String>,

    /// Override the total number of timesteps
    #[arg(long)]
    timesteps: Option<u64>,

    /// Override the number of parallel environments
    #[arg(long)]
    n_envs: Option<usize>,

    /// Override how often (in loop steps) the policy is evaluated
    #[arg(long)]
    check_freq: Option<u64>,

    /// Override the checkpoint directory
    #[arg(long)]
    save_path: Option<PathBuf>,

    /// Start from the best checkpoint in the save directory
    #[arg(long)]
    resume: bool,

    /// Disable the progress bar
    #[arg(long)]
    no_progress: bool,

    /// Print the default configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if cli.print_config {
        print!("{}", AppConfig::default_toml().context("serializing default config")?);
        return Ok(());
    }

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    // Apply CLI overrides
    if let Some(env) = cli.env {
        config.training.env_name = env;
    }
    if let Some(timesteps) = cli.timesteps {
        config.training.total_timesteps = timesteps;
    }
    if let Some(n_envs) = cli.n_envs {
        config.training.n_envs = n_envs;
    }
    if let Some(check_freq) = cli.check_freq {
        config.checkpoint.check_freq = check_freq;
    }
    if let Some(save_path) = cli.save_path {
        config.checkpoint.save_path = save_path;
    }
    if cli.no_progress {
        config.progress.enabled = false;
    }
    config.validate().context("validating config")?;

    let registry = EnvRegistry::with_builtin();
    if !registry.contains(&config.training.env_name) {
        bail!(
            "unknown environment '{}' (available: {})",
            config.training.env_name,
            registry.names().collect::<Vec<_>>().join(", ")
        );
    }

    let sample_env = registry.make(&config.training.env_name)?;
    let mut policy = TabularPolicy::new(
        sample_env.observation_len(),
        sample_env.n_actions(),
        config.policy.clone(),
    );

    if cli.resume {
        resume_policy(&mut policy, &config)?;
    }

    let mut hooks = HookList::new().with_error_policy(config.training.on_hook_error);
    if config.progress.enabled {
        hooks.add(ProgressReporter::new(config.training.n_envs as u64));
    }
    hooks.add(
        BestCheckpointSaver::new(
            config.checkpoint.clone(),
            &config.training.env_name,
            &registry,
        )
        .context("initializing checkpoint saver")?,
    );

    let mut training = TrainingLoop::new(
        &config.training.env_name,
        config.training.n_envs,
        &registry,
    )?;
    let summary = training
        .run(&mut policy, &mut hooks, config.training.total_timesteps)
        .context("training failed")?;

    println!(
        "Trained for {} timesteps ({} steps, {} episodes)",
        summary.num_timesteps, summary.n_calls, summary.episodes
    );
    Ok(())
}

/// Load the best checkpoint in the save directory into `policy`, if any.
fn resume_policy(policy: &mut dyn Policy, config: &AppConfig) -> Result<()> {
    let store = CheckpointStore::open(
        &config.checkpoint.save_path,
        config.checkpoint.extension.clone(),
    )?;
    match store.best_checkpoint(config.checkpoint.scan_mode)? {
        Some(path) => {
            let params = store
                .read(&path)
                .with_context(|| format!("reading checkpoint {}", path.display()))?;
            policy
                .load_parameters(&params)
                .with_context(|| format!("restoring parameters from {}", path.display()))?;
            tracing::info!(path = %path.display(), "resumed from best checkpoint");
        }
        None => tracing::info!("no checkpoint found, starting fresh"),
    }
    Ok(())
}
