//! Training loop that steps environments with a policy and drives hooks
//! through the training lifecycle.

pub mod trainer;

pub use trainer::{TrainingConfig, TrainingLoop, TrainingSummary};
