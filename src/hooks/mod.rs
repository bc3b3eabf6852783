//! Training hooks driven by a training loop's lifecycle:
//! `on_training_start`, `on_step` after every loop step, `on_training_end`.
//!
//! # Example
//!
//! ```rust
//! use rl_checkpoint_hooks::error::HookError;
//! use rl_checkpoint_hooks::hooks::{HookAction, LoopLocals, TrainingHook};
//!
//! struct StopAfter(u64);
//!
//! impl TrainingHook for StopAfter {
//!     fn on_step(&mut self, locals: &mut LoopLocals<'_>) -> Result<HookAction, HookError> {
//!         if locals.n_calls >= self.0 {
//!             return Ok(HookAction::Stop);
//!         }
//!         Ok(HookAction::Continue)
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "StopAfter"
//!     }
//! }
//! ```

mod best_checkpoint;
mod list;
mod progress;
mod traits;

pub use best_checkpoint::{BestCheckpointSaver, SavedCheckpoint, SaverConfig};
pub use list::{HookErrorPolicy, HookList};
pub use progress::ProgressReporter;
pub use traits::{HookAction, LoopLocals, TrainingHook};
