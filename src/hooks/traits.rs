//! Lifecycle types shared by every training hook.

use crate::error::HookError;
use crate::policy::Policy;

/// Loop-local state handed to hooks at each lifecycle point.
pub struct LoopLocals<'a> {
    /// Timestep budget for the whole run
    pub total_timesteps: u64,
    /// Number of step dispatches so far, counting the current one
    pub n_calls: u64,
    /// Environment steps taken so far, summed over parallel environments
    pub num_timesteps: u64,
    /// Policy being trained
    pub policy: &'a mut dyn Policy,
}

impl<'a> LoopLocals<'a> {
    pub fn new(policy: &'a mut dyn Policy, total_timesteps: u64) -> Self {
        LoopLocals {
            total_timesteps,
            n_calls: 0,
            num_timesteps: 0,
            policy,
        }
    }
}

/// What the loop should do after a hook ran.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HookAction {
    Continue,
    Stop,
}

impl HookAction {
    pub fn should_continue(self) -> bool {
        self == HookAction::Continue
    }
}

/// A passive hook driven by a training loop.
///
/// Only `on_step` is required; start and end default to no-ops.
pub trait TrainingHook: Send {
    /// Called once before the first step.
    fn on_training_start(&mut self, _locals: &LoopLocals<'_>) {}

    /// Called after every loop step. Hooks may act with the policy, which
    /// advances its exploration state.
    fn on_step(&mut self, locals: &mut LoopLocals<'_>) -> Result<HookAction, HookError>;

    /// Called once after the last step, including after an early stop.
    fn on_training_end(&mut self, _locals: &LoopLocals<'_>) {}

    /// Name used in logs and error reports.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::test_support::FixedPolicy;

    #[test]
    fn test_loop_locals_start_at_zero() {
        let mut policy = FixedPolicy::new(0);
        let locals = LoopLocals::new(&mut policy, 1000);
        assert_eq!(locals.total_timesteps, 1000);
        assert_eq!(locals.n_calls, 0);
        assert_eq!(locals.num_timesteps, 0);
        assert_eq!(locals.policy.name(), "Fixed");
    }

    #[test]
    fn test_hook_action_should_continue() {
        assert!(HookAction::Continue.should_continue());
        assert!(!HookAction::Stop.should_continue());
    }

    #[test]
    fn test_default_lifecycle_methods() {
        struct CountingHook {
            steps: usize,
        }
        impl TrainingHook for CountingHook {
            fn on_step(&mut self, _locals: &mut LoopLocals<'_>) -> Result<HookAction, HookError> {
                self.steps += 1;
                Ok(HookAction::Continue)
            }
            fn name(&self) -> &'static str {
                "CountingHook"
            }
        }

        let mut policy = FixedPolicy::new(0);
        let mut locals = LoopLocals::new(&mut policy, 10);
        let mut hook = CountingHook { steps: 0 };
        hook.on_training_start(&locals);
        assert_eq!(hook.on_step(&mut locals).unwrap(), HookAction::Continue);
        hook.on_training_end(&locals);
        assert_eq!(hook.steps, 1);
    }
}
