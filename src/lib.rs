//! # RL Checkpoint Hooks
//!
//! Hooks for reinforcement-learning training loops: a progress bar over
//! timesteps and a saver that periodically evaluates the policy and keeps
//! its parameters whenever a new best mean reward is reached.
//!
//! ## Modules
//!
//! - [`hooks`] — Hook trait, progress reporter, best-checkpoint saver, hook list
//! - [`checkpoint`] — Score-named checkpoint files and best-score recovery
//! - [`evaluation`] — Episode-based policy evaluation
//! - [`env`] — Environment trait and name-keyed registry
//! - [`policy`] — Policy trait and parameter snapshots
//! - [`training`] — Loop driving environments, policy and hooks
//! - [`config`] — TOML configuration loading and validation
//! - [`error`] — Structured error types

pub mod checkpoint;
pub mod config;
pub mod env;
pub mod error;
pub mod evaluation;
pub mod hooks;
pub mod policy;
pub mod training;
