//! Policy evaluation: run whole episodes and summarise the returns.

use crate::env::Environment;
use crate::error::EvaluationError;
use crate::policy::Policy;

/// Summary of an evaluation run.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationResult {
    pub mean_reward: f64,
    /// Population standard deviation of the episode returns.
    pub std_reward: f64,
    pub episode_rewards: Vec<f64>,
    pub episode_lengths: Vec<usize>,
}

impl EvaluationResult {
    /// Build a summary from per-episode returns and lengths.
    pub fn from_episodes(
        episode_rewards: Vec<f64>,
        episode_lengths: Vec<usize>,
    ) -> Result<Self, EvaluationError> {
        if episode_rewards.is_empty() {
            return Err(EvaluationError::NoEpisodes);
        }
        let n = episode_rewards.len() as f64;
        let mean = episode_rewards.iter().sum::<f64>() / n;
        let variance = episode_rewards
            .iter()
            .map(|r| (r - mean).powi(2))
            .sum::<f64>()
            / n;
        Ok(EvaluationResult {
            mean_reward: mean,
            std_reward: variance.sqrt(),
            episode_rewards,
            episode_lengths,
        })
    }
}

/// Run `n_episodes` full episodes of `policy` in `env`.
///
/// Each episode starts from `env.reset()` and runs until the environment
/// reports `done`.
pub fn evaluate_policy(
    policy: &mut dyn Policy,
    env: &mut dyn Environment,
    n_episodes: usize,
    deterministic: bool,
) -> Result<EvaluationResult, EvaluationError> {
    if n_episodes == 0 {
        return Err(EvaluationError::NoEpisodes);
    }

    let mut rewards = Vec::with_capacity(n_episodes);
    let mut lengths = Vec::with_capacity(n_episodes);

    for _ in 0..n_episodes {
        let mut observation = env.reset();
        let mut episode_return = 0.0f64;
        let mut length = 0;
        loop {
            let action = policy.predict(&observation, deterministic);
            let outcome = env.step(action)?;
            episode_return += outcome.reward as f64;
            length += 1;
            if outcome.done {
                break;
            }
            observation = outcome.observation;
        }
        rewards.push(episode_return);
        lengths.push(length);
    }

    EvaluationResult::from_episodes(rewards, lengths)
}

/// Strategy used by the checkpoint saver to score the current policy.
pub trait PolicyEvaluator: Send {
    fn evaluate(
        &mut self,
        policy: &mut dyn Policy,
        env: &mut dyn Environment,
        n_episodes: usize,
        deterministic: bool,
    ) -> Result<EvaluationResult, EvaluationError>;
}

/// Default evaluator: plays real episodes via [`evaluate_policy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EpisodeEvaluator;

impl PolicyEvaluator for EpisodeEvaluator {
    fn evaluate(
        &mut self,
        policy: &mut dyn Policy,
        env: &mut dyn Environment,
        n_episodes: usize,
        deterministic: bool,
    ) -> Result<EvaluationResult, EvaluationError> {
        evaluate_policy(policy, env, n_episodes, deterministic)
    }
}
