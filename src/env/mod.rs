//! Environment interface consumed by the training loop and the evaluator,
//! plus a name-keyed registry that builds fresh instances.

mod corridor;
mod registry;

pub use corridor::Corridor;
pub use registry::EnvRegistry;

use crate::error::EnvError;

/// Result of applying one action to an environment.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub observation: Vec<f32>,
    pub reward: f32,
    pub done: bool,
}

/// A single transition observed by the training loop.
#[derive(Debug, Clone)]
pub struct Transition {
    pub observation: Vec<f32>,
    pub action: usize,
    pub reward: f32,
    pub next_observation: Vec<f32>,
    pub done: bool,
}

/// Episodic environment with a discrete action space.
pub trait Environment: Send {
    /// Start a new episode and return the initial observation.
    fn reset(&mut self) -> Vec<f32>;

    /// Apply `action`. Once `done` is returned the caller must `reset`.
    fn step(&mut self, action: usize) -> Result<StepOutcome, EnvError>;

    /// Size of the discrete action space.
    fn n_actions(&self) -> usize;

    /// Length of the observation vector.
    fn observation_len(&self) -> usize;

    /// Registry name of this environment.
    fn name(&self) -> &str;
}
