//! Dispatching lifecycle events to several hooks.

use serde::{Deserialize, Serialize};

use crate::error::HookError;

use super::traits::{HookAction, LoopLocals, TrainingHook};

/// What the list does when a hook returns an error from `on_step`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HookErrorPolicy {
    /// Return the error to the loop, which ends training.
    #[default]
    Abort,
    /// Log the error and keep training.
    Warn,
}

/// Ordered collection of hooks sharing one lifecycle.
pub struct HookList {
    hooks: Vec<Box<dyn TrainingHook>>,
    on_error: HookErrorPolicy,
}

impl HookList {
    pub fn new() -> Self {
        HookList {
            hooks: Vec::new(),
            on_error: HookErrorPolicy::default(),
        }
    }

    pub fn with_error_policy(mut self, on_error: HookErrorPolicy) -> Self {
        self.on_error = on_error;
        self
    }

    pub fn add<H: TrainingHook + 'static>(&mut self, hook: H) {
        self.hooks.push(Box::new(hook));
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.hooks.iter().map(|h| h.name()).collect()
    }

    pub fn on_training_start(&mut self, locals: &LoopLocals<'_>) {
        for hook in &mut self.hooks {
            hook.on_training_start(locals);
        }
    }

    /// Run every hook's `on_step` in order.
    ///
    /// Every hook sees every step, even after an earlier hook asked to stop;
    /// the combined action is `Stop` if any hook returned it.
    pub fn on_step(&mut self, locals: &mut LoopLocals<'_>) -> Result<HookAction, HookError> {
        let mut action = HookAction::Continue;
        for hook in &mut self.hooks {
            match hook.on_step(locals) {
                Ok(HookAction::Stop) => action = HookAction::Stop,
                Ok(HookAction::Continue) => {}
                Err(e) => match self.on_error {
                    HookErrorPolicy::Abort => {
                        return Err(HookError::InHook {
                            hook: hook.name(),
                            source: Box::new(e),
                        });
                    }
                    HookErrorPolicy::Warn => {
                        tracing::warn!(
                            hook = hook.name(),
                            n_calls = locals.n_calls,
                            error = %e,
                            "hook failed, continuing"
                        );
                    }
                },
            }
        }
        Ok(action)
    }

    pub fn on_training_end(&mut self, locals: &LoopLocals<'_>) {
        for hook in &mut self.hooks {
            hook.on_training_end(locals);
        }
    }
}

impl Default for HookList {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::error::EvaluationError;
    use crate::evaluation::test_support::FixedPolicy;

    /// Appends lifecycle events to a shared log and returns a fixed result.
    struct Recorder {
        label: &'static str,
        log: Arc<Mutex<Vec<String>>>,
        step_result: fn() -> Result<HookAction, HookError>,
    }

    impl TrainingHook for Recorder {
        fn on_training_start(&mut self, _locals: &LoopLocals<'_>) {
            self.log.lock().unwrap().push(format!("{}:start", self.label));
        }

        fn on_step(&mut self, locals: &mut LoopLocals<'_>) -> Result<HookAction, HookError> {
            self.log
                .lock()
                .unwrap()
                .push(format!("{}:step{}", self.label, locals.n_calls));
            (self.step_result)()
        }

        fn on_training_end(&mut self, _locals: &LoopLocals<'_>) {
            self.log.lock().unwrap().push(format!("{}:end", self.label));
        }

        fn name(&self) -> &'static str {
            self.label
        }
    }

    fn cont() -> Result<HookAction, HookError> {
        Ok(HookAction::Continue)
    }

    fn stop() -> Result<HookAction, HookError> {
        Ok(HookAction::Stop)
    }

    fn fail() -> Result<HookAction, HookError> {
        Err(HookError::Evaluation(EvaluationError::NoEpisodes))
    }

    fn recorder(
        label: &'static str,
        log: &Arc<Mutex<Vec<String>>>,
        step_result: fn() -> Result<HookAction, HookError>,
    ) -> Recorder {
        Recorder {
            label,
            log: log.clone(),
            step_result,
        }
    }

    #[test]
    fn test_dispatch_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut hooks = HookList::new();
        hooks.add(recorder("a", &log, cont));
        hooks.add(recorder("b", &log, cont));
        assert_eq!(hooks.len(), 2);
        assert_eq!(hooks.names(), vec!["a", "b"]);

        let mut policy = FixedPolicy::new(0);
        let mut locals = LoopLocals {
            n_calls: 1,
            ..LoopLocals::new(&mut policy, 10)
        };
        hooks.on_training_start(&locals);
        assert_eq!(hooks.on_step(&mut locals).unwrap(), HookAction::Continue);
        hooks.on_training_end(&locals);

        assert_eq!(
            *log.lock().unwrap(),
            vec!["a:start", "b:start", "a:step1", "b:step1", "a:end", "b:end"]
        );
    }

    #[test]
    fn test_stop_is_combined_but_all_hooks_run() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut hooks = HookList::new();
        hooks.add(recorder("stopper", &log, stop));
        hooks.add(recorder("after", &log, cont));

        let mut policy = FixedPolicy::new(0);
        let action = hooks.on_step(&mut LoopLocals::new(&mut policy, 10)).unwrap();
        assert_eq!(action, HookAction::Stop);
        assert_eq!(log.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_abort_policy_returns_tagged_error() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut hooks = HookList::new();
        hooks.add(recorder("broken", &log, fail));
        hooks.add(recorder("after", &log, cont));

        let mut policy = FixedPolicy::new(0);
        let err = hooks.on_step(&mut LoopLocals::new(&mut policy, 10)).unwrap_err();
        assert!(matches!(err, HookError::InHook { hook: "broken", .. }));
        // later hooks are skipped once the step aborts
        assert_eq!(*log.lock().unwrap(), vec!["broken:step0"]);
    }

    #[test]
    fn test_warn_policy_keeps_going() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut hooks = HookList::new().with_error_policy(HookErrorPolicy::Warn);
        hooks.add(recorder("broken", &log, fail));
        hooks.add(recorder("after", &log, cont));

        let mut policy = FixedPolicy::new(0);
        let action = hooks.on_step(&mut LoopLocals::new(&mut policy, 10)).unwrap();
        assert_eq!(action, HookAction::Continue);
        assert_eq!(log.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_empty_list_continues() {
        let mut hooks = HookList::default();
        assert!(hooks.is_empty());
        let mut policy = FixedPolicy::new(0);
        assert_eq!(
            hooks.on_step(&mut LoopLocals::new(&mut policy, 1)).unwrap(),
            HookAction::Continue
        );
    }

    #[test]
    fn test_error_policy_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            on_hook_error: HookErrorPolicy,
        }
        let w: Wrapper = toml::from_str(r#"on_hook_error = "warn""#).unwrap();
        assert_eq!(w.on_hook_error, HookErrorPolicy::Warn);
    }
}
