use crate::error::EnvError;

use super::{Environment, StepOutcome};

const STEP_PENALTY: f32 = -0.01;
const GOAL_REWARD: f32 = 1.0;

/// One-dimensional corridor: start at cell 0, walk right to reach the last cell.
///
/// Action 0 moves left (clamped at the wall), action 1 moves right. The
/// observation is a one-hot encoding of the current cell. Every step costs
/// [`STEP_PENALTY`]; reaching the goal pays [`GOAL_REWARD`] and ends the
/// episode, as does running out of steps.
pub struct Corridor {
    length: usize,
    max_steps: usize,
    position: usize,
    steps: usize,
}

impl Corridor {
    pub fn new(length: usize, max_steps: usize) -> Self {
        assert!(length >= 2, "corridor needs at least two cells");
        Corridor {
            length,
            max_steps,
            position: 0,
            steps: 0,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    fn observation(&self) -> Vec<f32> {
        let mut obs = vec![0.0; self.length];
        obs[self.position] = 1.0;
        obs
    }
}

impl Default for Corridor {
    fn default() -> Self {
        Self::new(8, 50)
    }
}

impl Environment for Corridor {
    fn reset(&mut self) -> Vec<f32> {
        self.position = 0;
        self.steps = 0;
        self.observation()
    }

    fn step(&mut self, action: usize) -> Result<StepOutcome, EnvError> {
        match action {
            0 => self.position = self.position.saturating_sub(1),
            1 => self.position = (self.position + 1).min(self.length - 1),
            _ => {
                return Err(EnvError::InvalidAction {
                    action,
                    n_actions: 2,
                })
            }
        }
        self.steps += 1;

        let at_goal = self.position == self.length - 1;
        let reward = if at_goal {
            GOAL_REWARD
        } else {
            STEP_PENALTY
        };

        Ok(StepOutcome {
            observation: self.observation(),
            reward,
            done: at_goal || self.steps >= self.max_steps,
        })
    }

    fn n_actions(&self) -> usize {
        2
    }

    fn observation_len(&self) -> usize {
        self.length
    }

    fn name(&self) -> &str {
        "Corridor-v0"
    }
}
