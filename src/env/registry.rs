use std::collections::BTreeMap;

use crate::error::EnvError;

use super::{Corridor, Environment};

type EnvConstructor = Box<dyn Fn() -> Box<dyn Environment> + Send + Sync>;

/// Maps environment names to constructors producing fresh instances.
pub struct EnvRegistry {
    constructors: BTreeMap<String, EnvConstructor>,
}

impl EnvRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        EnvRegistry {
            constructors: BTreeMap::new(),
        }
    }

    /// A registry pre-populated with the environments shipped in this crate.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register("Corridor-v0", || Box::new(Corridor::default()));
        registry
    }

    /// Register (or replace) the constructor for `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, constructor: F)
    where
        F: Fn() -> Box<dyn Environment> + Send + Sync + 'static,
    {
        self.constructors.insert(name.into(), Box::new(constructor));
    }

    /// Build a fresh environment instance.
    pub fn make(&self, name: &str) -> Result<Box<dyn Environment>, EnvError> {
        self.constructors
            .get(name)
            .map(|build| build())
            .ok_or_else(|| EnvError::UnknownEnvironment(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }
}

impl Default for EnvRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_contains_corridor() {
        let registry = EnvRegistry::with_builtin();
        assert!(registry.contains("Corridor-v0"));
        let env = registry.make("Corridor-v0").unwrap();
        assert_eq!(env.n_actions(), 2);
    }

    #[test]
    fn test_unknown_environment() {
        let registry = EnvRegistry::new();
        let err = registry.make("CartPole-v1").err().unwrap();
        assert!(matches!(err, EnvError::UnknownEnvironment(name) if name == "CartPole-v1"));
    }

    #[test]
    fn test_make_returns_fresh_instances() {
        let registry = EnvRegistry::with_builtin();
        let mut a = registry.make("Corridor-v0").unwrap();
        let mut b = registry.make("Corridor-v0").unwrap();
        a.reset();
        a.step(1).unwrap();
        // b is untouched by a's step
        assert_eq!(b.reset()[0], 1.0);
    }

    #[test]
    fn test_register_custom() {
        let mut registry = EnvRegistry::new();
        registry.register("Short", || Box::new(Corridor::new(2, 5)));
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["Short"]);
        assert_eq!(registry.make("Short").unwrap().observation_len(), 2);
    }
}
