use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::env::Transition;
use crate::error::PolicyError;

use super::{argmax, Policy, PolicyParameters};

const Q_TABLE: &str = "q_table";

/// Hyperparameters for [`TabularPolicy`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TabularConfig {
    pub learning_rate: f32,
    pub gamma: f32,
    /// Exploration rate used when acting non-deterministically.
    pub epsilon: f32,
    /// Seed for the exploration generator; unset draws one from the OS
    pub seed: Option<u64>,
}

impl Default for TabularConfig {
    fn default() -> Self {
        TabularConfig {
            learning_rate: 0.1,
            gamma: 0.99,
            epsilon: 0.1,
            seed: None,
        }
    }
}

/// Epsilon-greedy Q-table over one-hot observations.
///
/// The state index is the position of the largest observation entry.
pub struct TabularPolicy {
    config: TabularConfig,
    n_states: usize,
    n_actions: usize,
    q: Vec<f32>,
    rng: StdRng,
}

impl TabularPolicy {
    pub fn new(n_states: usize, n_actions: usize, config: TabularConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        TabularPolicy {
            config,
            n_states,
            n_actions,
            q: vec![0.0; n_states * n_actions],
            rng,
        }
    }

    fn state_index(&self, observation: &[f32]) -> usize {
        argmax(observation).min(self.n_states - 1)
    }

    fn row(&self, state: usize) -> &[f32] {
        &self.q[state * self.n_actions..(state + 1) * self.n_actions]
    }

    pub fn q_value(&self, state: usize, action: usize) -> f32 {
        self.q[state * self.n_actions + action]
    }
}

impl Policy for TabularPolicy {
    fn predict(&mut self, observation: &[f32], deterministic: bool) -> usize {
        let state = self.state_index(observation);
        if !deterministic && self.rng.random::<f32>() < self.config.epsilon {
            return self.rng.random_range(0..self.n_actions);
        }
        argmax(self.row(state))
    }

    fn parameters(&self) -> PolicyParameters {
        let mut params = PolicyParameters::new();
        params.insert(Q_TABLE, self.q.clone());
        params
    }

    fn load_parameters(&mut self, parameters: &PolicyParameters) -> Result<(), PolicyError> {
        let q = parameters.expect_len(Q_TABLE, self.n_states * self.n_actions)?;
        self.q.copy_from_slice(q);
        Ok(())
    }

    fn observe(&mut self, t: &Transition) {
        let state = self.state_index(&t.observation);
        let next_state = self.state_index(&t.next_observation);
        let bootstrap = if t.done {
            0.0
        } else {
            self.row(next_state)
                .iter()
                .copied()
                .fold(f32::NEG_INFINITY, f32::max)
        };
        let target = t.reward + self.config.gamma * bootstrap;
        let idx = state * self.n_actions + t.action;
        self.q[idx] += self.config.learning_rate * (target - self.q[idx]);
    }

    fn name(&self) -> &str {
        "Tabular"
    }
}
