use crate::env::{EnvRegistry, Environment, Transition};
use crate::error::TrainingError;
use crate::hooks::{HookAction, HookErrorPolicy, HookList, LoopLocals};
use crate::policy::Policy;

/// Training loop configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub env_name: String,
    pub total_timesteps: u64,
    /// Environments stepped in lockstep on every loop step
    pub n_envs: usize,
    pub on_hook_error: HookErrorPolicy,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            env_name: "Corridor-v0".to_string(),
            total_timesteps: 20_000,
            n_envs: 4,
            on_hook_error: HookErrorPolicy::Abort,
        }
    }
}

/// Outcome of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainingSummary {
    pub n_calls: u64,
    pub num_timesteps: u64,
    pub episodes: u64,
    /// A hook asked to stop before the timestep budget was used up
    pub stopped_early: bool,
}

#[derive(Default)]
struct Counters {
    n_calls: u64,
    num_timesteps: u64,
    episodes: u64,
}

impl Counters {
    fn locals<'a>(&self, policy: &'a mut dyn Policy, total_timesteps: u64) -> LoopLocals<'a> {
        LoopLocals {
            total_timesteps,
            n_calls: self.n_calls,
            num_timesteps: self.num_timesteps,
            policy,
        }
    }
}

/// Steps a set of environments with a policy and drives hooks through the
/// training lifecycle.
///
/// One loop step moves every environment once, so `num_timesteps` grows by
/// the number of environments while `n_calls` grows by one. Environments
/// that finish an episode are reset immediately.
pub struct TrainingLoop {
    envs: Vec<Box<dyn Environment>>,
}

impl TrainingLoop {
    /// Build `n_envs` fresh instances of `env_name`.
    pub fn new(
        env_name: &str,
        n_envs: usize,
        registry: &EnvRegistry,
    ) -> Result<Self, TrainingError> {
        let envs = (0..n_envs)
            .map(|_| registry.make(env_name))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_envs(envs)
    }

    pub fn from_envs(envs: Vec<Box<dyn Environment>>) -> Result<Self, TrainingError> {
        if envs.is_empty() {
            return Err(TrainingError::NoEnvironments);
        }
        Ok(TrainingLoop { envs })
    }

    pub fn n_envs(&self) -> usize {
        self.envs.len()
    }

    /// Run until `total_timesteps` environment steps have been taken or a hook
    /// stops training.
    ///
    /// `on_training_end` is dispatched even when the run fails.
    pub fn run(
        &mut self,
        policy: &mut dyn Policy,
        hooks: &mut HookList,
        total_timesteps: u64,
    ) -> Result<TrainingSummary, TrainingError> {
        let mut counters = Counters::default();

        tracing::info!(
            policy = policy.name(),
            n_envs = self.envs.len(),
            total_timesteps,
            hooks = ?hooks.names(),
            "starting training"
        );
        hooks.on_training_start(&counters.locals(&mut *policy, total_timesteps));

        let result = self.run_steps(policy, hooks, total_timesteps, &mut counters);

        hooks.on_training_end(&counters.locals(&mut *policy, total_timesteps));

        let stopped_early = result?;
        let summary = TrainingSummary {
            n_calls: counters.n_calls,
            num_timesteps: counters.num_timesteps,
            episodes: counters.episodes,
            stopped_early,
        };
        tracing::info!(
            n_calls = summary.n_calls,
            num_timesteps = summary.num_timesteps,
            episodes = summary.episodes,
            stopped_early,
            "training complete"
        );
        Ok(summary)
    }

    /// Returns whether a hook stopped the run early.
    fn run_steps(
        &mut self,
        policy: &mut dyn Policy,
        hooks: &mut HookList,
        total_timesteps: u64,
        counters: &mut Counters,
    ) -> Result<bool, TrainingError> {
        let mut observations: Vec<Vec<f32>> =
            self.envs.iter_mut().map(|env| env.reset()).collect();

        while counters.num_timesteps < total_timesteps {
            for (env, observation) in self.envs.iter_mut().zip(observations.iter_mut()) {
                let action = policy.predict(observation, false);
                let outcome = env.step(action)?;
                policy.observe(&Transition {
                    observation: std::mem::take(observation),
                    action,
                    reward: outcome.reward,
                    next_observation: outcome.observation.clone(),
                    done: outcome.done,
                });
                *observation = if outcome.done {
                    counters.episodes += 1;
                    env.reset()
                } else {
                    outcome.observation
                };
            }

            counters.num_timesteps += self.envs.len() as u64;
            counters.n_calls += 1;

            let action = hooks.on_step(&mut counters.locals(&mut *policy, total_timesteps))?;
            if action == HookAction::Stop {
                tracing::info!(n_calls = counters.n_calls, "hook requested stop");
                return Ok(true);
            }
        }
        Ok(false)
    }
}
