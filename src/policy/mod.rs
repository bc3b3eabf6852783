//! Policy interface: action selection, parameter export for checkpoints,
//! and an optional learning hook fed by the training loop.

mod tabular;

pub use tabular::{TabularConfig, TabularPolicy};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::env::Transition;
use crate::error::PolicyError;

/// Named parameter tensors of a policy, flattened to `f32` vectors.
///
/// This is the blob persisted by checkpoints; its layout is owned by the
/// policy that produced it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyParameters {
    tensors: BTreeMap<String, Vec<f32>>,
}

impl PolicyParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f32>) {
        self.tensors.insert(name.into(), values);
    }

    pub fn get(&self, name: &str) -> Option<&[f32]> {
        self.tensors.get(name).map(Vec::as_slice)
    }

    /// Fetch a tensor, checking it has exactly `len` elements.
    pub fn expect_len(&self, name: &str, len: usize) -> Result<&[f32], PolicyError> {
        let values = self
            .get(name)
            .ok_or_else(|| PolicyError::MissingTensor(name.to_string()))?;
        if values.len() != len {
            return Err(PolicyError::ShapeMismatch {
                name: name.to_string(),
                expected: len,
                actual: values.len(),
            });
        }
        Ok(values)
    }

    pub fn len(&self) -> usize {
        self.tensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }
}

/// A policy over a discrete action space.
pub trait Policy: Send {
    /// Choose an action. With `deterministic` set the policy must act greedily
    /// and leave any exploration state untouched.
    fn predict(&mut self, observation: &[f32], deterministic: bool) -> usize;

    /// Snapshot of the current parameters.
    fn parameters(&self) -> PolicyParameters;

    /// Replace the current parameters, e.g. when resuming from a checkpoint.
    fn load_parameters(&mut self, parameters: &PolicyParameters) -> Result<(), PolicyError>;

    /// Learn from one transition. Policies that do not learn ignore it.
    fn observe(&mut self, _transition: &Transition) {}

    /// Display name for logging.
    fn name(&self) -> &str;
}

/// Index of the largest value; ties resolve to the lowest index.
pub(crate) fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    best
}
