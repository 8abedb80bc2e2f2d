//! TOML configuration for the extension.
//!
//! ```toml
//! [shell]
//! kind = "unix"        # omit to use the host default
//! executor = "process" # or "system"
//!
//! [environment]
//! inherit = true
//! working_dir = "/srv"
//! remove = ["SECRET"]
//!
//! [environment.set]
//! LANG = "C"
//!
//! [logging]
//! filter = "platform_exec=debug"
//! ```

use std::env;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use platform_exec_runner::{ShellEnvironment, ShellKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming the configuration file read by
/// [`ExecConfig::from_env`].
pub const CONFIG_ENV_VAR: &str = "PLATFORM_EXEC_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration")]
    Parse(#[from] toml::de::Error),

    #[error("logging filter must not be empty")]
    EmptyFilter,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecConfig {
    pub shell: ShellConfig,
    pub environment: ShellEnvironment,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Shell family. `None` picks the host default.
    pub kind: Option<ShellKind>,
    pub executor: ExecutorKind,
}

impl ShellConfig {
    pub fn resolved_kind(&self) -> ShellKind {
        self.kind.unwrap_or_else(ShellKind::host)
    }
}

/// Which process strategy runs the command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutorKind {
    /// Spawn the shell with `std::process`; honours `[environment]`.
    #[default]
    Process,
    /// Call `system(3)`; always inherits the caller's environment. Unix only.
    System,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing-subscriber` filter directive used when `RUST_LOG` is unset.
    #[serde(default = "LoggingConfig::default_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: Self::default_filter(),
        }
    }
}

impl LoggingConfig {
    fn default_filter() -> String {
        "warn".to_owned()
    }
}

impl ExecConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.logging.filter.trim().is_empty() {
            return Err(ConfigError::EmptyFilter);
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Loads `path` when given, otherwise returns the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Loads the file named by [`CONFIG_ENV_VAR`], or the defaults when the
    /// variable is unset.
    pub fn from_env() -> Result<Self> {
        let path = env::var_os(CONFIG_ENV_VAR);
        Self::load_or_default(path.as_deref().map(Path::new))
    }
}
