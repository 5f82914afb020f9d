use serde::Deserialize;
use std::path::{Path, PathBuf};

use dy_agent::script::{
    SimulatorConfig, DEFAULT_COMPLETION_DELAY_MS, DEFAULT_GREETING, DEFAULT_INITIAL_DELAY_MS,
};
use dy_protocol::Category;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub simulator: SimulatorSection,
    pub catalog: CatalogSection,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulatorSection {
    /// Delay before the agent acknowledges a prompt.
    pub initial_delay_ms: u64,
    /// Delay between acknowledgment and completion.
    pub completion_delay_ms: u64,
    /// Opening assistant message. Empty string disables it.
    pub greeting: String,
}

impl Default for SimulatorSection {
    fn default() -> Self {
        Self {
            initial_delay_ms: DEFAULT_INITIAL_DELAY_MS,
            completion_delay_ms: DEFAULT_COMPLETION_DELAY_MS,
            greeting: DEFAULT_GREETING.to_string(),
        }
    }
}

impl SimulatorSection {
    pub fn to_simulator_config(&self) -> SimulatorConfig {
        let cfg = SimulatorConfig::default()
            .with_delays(self.initial_delay_ms, self.completion_delay_ms);
        if self.greeting.is_empty() {
            cfg.without_greeting()
        } else {
            cfg.with_greeting(self.greeting.clone())
        }
    }
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct CatalogSection {
    /// JSON catalog to use instead of the built-in one.
    pub path: Option<PathBuf>,
    /// Category selected when the directory opens.
    pub default_category: Category,
}

impl Config {
    pub fn load_or_default() -> Self {
        Self::load_or_default_from(&config_path())
    }

    /// Load `path` if it exists; unreadable or malformed files fall back to
    /// defaults with a warning.
    pub fn load_or_default_from(path: &Path) -> Self {
        if !path.exists() {
            return Config::default();
        }
        Self::load_from(path).unwrap_or_else(|e| {
            warn!("{e}; using defaults");
            Config::default()
        })
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn config_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("dyad").join("config.toml")
}
