use std::path::PathBuf;

/// Errors raised while managing the checkpoint directory.
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error("failed to create checkpoint directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("checkpoint name does not start with an integer score: {path}")]
    MalformedName { path: PathBuf },

    #[error("failed to serialize policy parameters: {0}")]
    Serialize(bincode::Error),

    #[error("failed to deserialize policy parameters from {path}: {source}")]
    Deserialize {
        path: PathBuf,
        source: bincode::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by environments and the environment registry.
#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    #[error("unknown environment '{0}'")]
    UnknownEnvironment(String),

    #[error("action {action} out of range (environment has {n_actions} actions)")]
    InvalidAction { action: usize, n_actions: usize },
}

/// Errors raised when restoring policy parameters.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("parameter tensor '{0}' missing")]
    MissingTensor(String),

    #[error("parameter tensor '{name}' has {actual} values, expected {expected}")]
    ShapeMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
}

/// Errors raised while evaluating a policy.
#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    #[error("evaluation requires at least one episode")]
    NoEpisodes,

    #[error("environment error during evaluation: {0}")]
    Env(#[from] EnvError),
}

/// Errors a training hook can return to the loop that drives it.
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),

    #[error("evaluation error: {0}")]
    Evaluation(#[from] EvaluationError),

    #[error("environment error: {0}")]
    Env(#[from] EnvError),

    #[error("invalid hook configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("hook '{hook}' failed: {source}")]
    InHook {
        hook: &'static str,
        source: Box<HookError>,
    },
}

/// Errors that end a training run.
#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error("training needs at least one environment")]
    NoEnvironments,

    #[error("environment error: {0}")]
    Env(#[from] EnvError),

    #[error(transparent)]
    Hook(#[from] HookError),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}
