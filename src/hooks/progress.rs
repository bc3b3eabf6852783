//! Progress bar over elapsed timesteps.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::error::HookError;

use super::traits::{HookAction, LoopLocals, TrainingHook};

const TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec}, {eta})";

/// Shows timesteps done against the run's total.
///
/// The bar exists only between training start and end. Each step advances it
/// by the number of parallel environments, since one loop step moves every
/// environment once.
pub struct ProgressReporter {
    n_envs: u64,
    hidden: bool,
    bar: Option<ProgressBar>,
}

impl ProgressReporter {
    /// Reporter drawing to the terminal.
    pub fn new(n_envs: u64) -> Self {
        ProgressReporter {
            n_envs,
            hidden: false,
            bar: None,
        }
    }

    /// Reporter that tracks progress without drawing anything.
    pub fn hidden(n_envs: u64) -> Self {
        ProgressReporter {
            n_envs,
            hidden: true,
            bar: None,
        }
    }

    /// Current position, or `None` outside a training run.
    pub fn position(&self) -> Option<u64> {
        self.bar.as_ref().map(ProgressBar::position)
    }

    /// Total the bar was created with, or `None` outside a training run.
    pub fn length(&self) -> Option<u64> {
        self.bar.as_ref().and_then(ProgressBar::length)
    }

    pub fn is_active(&self) -> bool {
        self.bar.is_some()
    }

    fn build_bar(&self, total: u64) -> ProgressBar {
        let target = if self.hidden {
            ProgressDrawTarget::hidden()
        } else {
            ProgressDrawTarget::stderr()
        };
        let bar = ProgressBar::with_draw_target(Some(total), target);
        match ProgressStyle::default_bar().template(TEMPLATE) {
            Ok(style) => bar.set_style(style.progress_chars("#>-")),
            Err(e) => tracing::debug!(error = %e, "falling back to default progress style"),
        }
        bar
    }
}

impl TrainingHook for ProgressReporter {
    fn on_training_start(&mut self, locals: &LoopLocals<'_>) {
        let bar = self.build_bar(locals.total_timesteps);
        if let Some(previous) = self.bar.replace(bar) {
            previous.abandon();
        }
    }

    fn on_step(&mut self, _locals: &mut LoopLocals<'_>) -> Result<HookAction, HookError> {
        if let Some(bar) = &self.bar {
            bar.inc(self.n_envs);
        }
        Ok(HookAction::Continue)
    }

    fn on_training_end(&mut self, _locals: &LoopLocals<'_>) {
        // leave the final state on screen
        if let Some(bar) = self.bar.take() {
            bar.abandon();
        }
    }

    fn name(&self) -> &'static str {
        "ProgressReporter"
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::evaluation::test_support::FixedPolicy;
    use proptest::prelude::*;

    proptest! {
        /// The reporter never asks the loop to stop
        #[test]
        fn progress_reporter_never_stops(
            n_envs in 1u64..64,
            steps in 0usize..200,
        ) {
            let mut policy = FixedPolicy::new(0);
            let mut locals = LoopLocals::new(&mut policy, 10_000);
            let mut reporter = ProgressReporter::hidden(n_envs);
            reporter.on_training_start(&locals);
            for _ in 0..steps {
                prop_assert_eq!(reporter.on_step(&mut locals).unwrap(), HookAction::Continue);
            }
            prop_assert_eq!(reporter.position(), Some(n_envs * steps as u64));
            reporter.on_training_end(&locals);
        }
    }
}
