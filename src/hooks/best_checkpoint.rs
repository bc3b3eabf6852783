//! Periodic evaluation with save-on-new-best.

use std::path::PathBuf;

use crate::checkpoint::{CheckpointStore, ScanMode, ScoreScanner};
use crate::env::{EnvRegistry, Environment};
use crate::error::{ConfigError, HookError};
use crate::evaluation::{EpisodeEvaluator, PolicyEvaluator};

use super::traits::{HookAction, LoopLocals, TrainingHook};

/// Configuration for [`BestCheckpointSaver`].
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SaverConfig {
    /// Evaluate on every step dispatch whose count is a multiple of this
    pub check_freq: u64,
    pub save_path: PathBuf,
    pub n_eval_episodes: usize,
    pub deterministic: bool,
    /// File extension of saved checkpoints, without the dot
    pub extension: String,
    pub scan_mode: ScanMode,
}

impl Default for SaverConfig {
    fn default() -> Self {
        SaverConfig {
            check_freq: 500,
            save_path: PathBuf::from("data").join("models"),
            n_eval_episodes: 5,
            deterministic: true,
            extension: "bin".to_string(),
            scan_mode: ScanMode::Strict,
        }
    }
}

impl SaverConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.check_freq == 0 {
            return Err(ConfigError::Validation(
                "checkpoint.check_freq must be > 0".into(),
            ));
        }
        if self.n_eval_episodes == 0 {
            return Err(ConfigError::Validation(
                "checkpoint.n_eval_episodes must be > 0".into(),
            ));
        }
        if self.extension.is_empty() || self.extension.contains(['.', '/', '\\']) {
            return Err(ConfigError::Validation(
                "checkpoint.extension must be a bare, non-empty extension".into(),
            ));
        }
        Ok(())
    }
}

/// Record of the most recent checkpoint written by the saver.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedCheckpoint {
    pub path: PathBuf,
    pub mean_reward: f64,
    pub std_reward: f64,
    pub n_calls: u64,
}

/// Evaluates the policy every `check_freq` steps and saves its parameters
/// whenever the mean reward strictly beats the best seen so far.
///
/// The best score starts from whatever is already in the save directory, so
/// a restarted run only saves when it beats every earlier run.
pub struct BestCheckpointSaver<E = EpisodeEvaluator> {
    config: SaverConfig,
    store: CheckpointStore,
    eval_env: Box<dyn Environment>,
    evaluator: E,
    best_mean_reward: f64,
    evaluations: usize,
    last_saved: Option<SavedCheckpoint>,
}

impl BestCheckpointSaver<EpisodeEvaluator> {
    /// Build a saver that evaluates by playing episodes in `env_name`.
    pub fn new(
        config: SaverConfig,
        env_name: &str,
        registry: &EnvRegistry,
    ) -> Result<Self, HookError> {
        Self::with_evaluator(config, env_name, registry, EpisodeEvaluator)
    }
}

impl<E: PolicyEvaluator> BestCheckpointSaver<E> {
    /// Build a saver with a custom evaluation strategy.
    ///
    /// Creates the save directory, recovers the best prior score from it and
    /// builds the evaluation environment, in that order.
    pub fn with_evaluator(
        config: SaverConfig,
        env_name: &str,
        registry: &EnvRegistry,
        evaluator: E,
    ) -> Result<Self, HookError> {
        config.validate()?;
        let store = CheckpointStore::open(&config.save_path, config.extension.clone())?;
        let best_mean_reward = ScoreScanner::new(config.scan_mode).scan(store.dir())?;
        let eval_env = registry.make(env_name)?;

        tracing::info!(
            best_score = best_mean_reward,
            save_path = %store.dir().display(),
            env = env_name,
            "best score"
        );

        Ok(BestCheckpointSaver {
            config,
            store,
            eval_env,
            evaluator,
            best_mean_reward,
            evaluations: 0,
            last_saved: None,
        })
    }

    pub fn best_mean_reward(&self) -> f64 {
        self.best_mean_reward
    }

    pub fn last_saved(&self) -> Option<&SavedCheckpoint> {
        self.last_saved.as_ref()
    }

    /// Number of evaluations run so far.
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    pub fn store(&self) -> &CheckpointStore {
        &self.store
    }

    pub fn config(&self) -> &SaverConfig {
        &self.config
    }
}

impl<E: PolicyEvaluator> TrainingHook for BestCheckpointSaver<E> {
    fn on_step(&mut self, locals: &mut LoopLocals<'_>) -> Result<HookAction, HookError> {
        if locals.n_calls % self.config.check_freq != 0 {
            return Ok(HookAction::Continue);
        }

        self.eval_env.reset();
        let result = self.evaluator.evaluate(
            &mut *locals.policy,
            self.eval_env.as_mut(),
            self.config.n_eval_episodes,
            self.config.deterministic,
        )?;
        self.evaluations += 1;

        tracing::debug!(
            n_calls = locals.n_calls,
            mean_reward = result.mean_reward,
            std_reward = result.std_reward,
            best = self.best_mean_reward,
            "evaluated policy"
        );

        if result.mean_reward <= self.best_mean_reward {
            return Ok(HookAction::Continue);
        }

        self.best_mean_reward = result.mean_reward;
        let parameters = locals.policy.parameters();
        let path = self
            .store
            .write(result.mean_reward, result.std_reward, &parameters)?;

        tracing::info!(
            n_calls = locals.n_calls,
            mean_reward = result.mean_reward,
            std_reward = result.std_reward,
            path = %path.display(),
            "new best checkpoint"
        );

        self.last_saved = Some(SavedCheckpoint {
            path,
            mean_reward: result.mean_reward,
            std_reward: result.std_reward,
            n_calls: locals.n_calls,
        });
        Ok(HookAction::Continue)
    }

    fn name(&self) -> &'static str {
        "BestCheckpointSaver"
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::evaluation::test_support::FixedPolicy;
    use crate::evaluation::EvaluationResult;
    use crate::error::EvaluationError;
    use crate::policy::Policy;
    use proptest::prelude::*;

    struct Sequence(std::vec::IntoIter<f64>);

    impl PolicyEvaluator for Sequence {
        fn evaluate(
            &mut self,
            _policy: &mut dyn Policy,
            _env: &mut dyn Environment,
            _n_episodes: usize,
            _deterministic: bool,
        ) -> Result<EvaluationResult, EvaluationError> {
            let mean = self.0.next().ok_or(EvaluationError::NoEpisodes)?;
            EvaluationResult::from_episodes(vec![mean], vec![1])
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// The best score only ever moves up, tracking the running maximum
        #[test]
        fn best_score_is_running_max(
            means in prop::collection::vec(-2_000.0f64..2_000.0, 1..20),
        ) {
            let dir = tempfile::tempdir().unwrap();
            let cfg = SaverConfig {
                check_freq: 1,
                save_path: dir.path().to_path_buf(),
                ..Default::default()
            };
            let mut saver = BestCheckpointSaver::with_evaluator(
                cfg,
                "Corridor-v0",
                &EnvRegistry::with_builtin(),
                Sequence(means.clone().into_iter()),
            )
            .unwrap();

            let mut policy = FixedPolicy::new(0);
            let mut expected = -999.0f64;
            let mut previous = saver.best_mean_reward();
            for (i, mean) in means.iter().enumerate() {
                let mut locals = LoopLocals {
                    n_calls: i as u64 + 1,
                    ..LoopLocals::new(&mut policy, 100)
                };
                prop_assert_eq!(saver.on_step(&mut locals).unwrap(), HookAction::Continue);
                expected = expected.max(*mean);
                prop_assert!(saver.best_mean_reward() >= previous);
                prop_assert_eq!(saver.best_mean_reward(), expected);
                previous = saver.best_mean_reward();
            }
        }
    }
}
