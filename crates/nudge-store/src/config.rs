use std::env;
use std::path::PathBuf;

/// Task store configuration.
///
/// The path can come from the `NUDGE_TODO_FILE` environment variable; callers
/// fall back to [`StoreConfig::DEFAULT_PATH`] when nothing else is set.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path of the JSON file holding the task list.
    pub path: PathBuf,
}

impl StoreConfig {
    /// The default task file, relative to the working directory.
    pub const DEFAULT_PATH: &str = "tasks.json";

    /// Environment variable naming the task file.
    pub const ENV_VAR: &str = "NUDGE_TODO_FILE";

    /// Build a config from [`Self::ENV_VAR`]. `None` when unset or blank.
    pub fn from_env() -> Option<Self> {
        env::var(Self::ENV_VAR)
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(Self::new)
    }

    /// Build a config from an explicit path (useful for tests and CLI flags).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}
