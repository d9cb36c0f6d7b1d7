use crate::error::{BridgeError, Result};
use crate::logging::{parse_level, warn, LogConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name searched for by [`Config::discover`]
pub const CONFIG_FILE: &str = "tagbridge.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub bridge: BridgeConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default = "default_false")]
    pub json: bool,

    #[serde(default = "default_false")]
    pub spans: bool,

    #[serde(default)]
    pub file: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Assert that composites are only encoded on the engine thread
    #[serde(default = "default_true")]
    pub engine_thread_checks: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
            spans: false,
            file: None,
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            engine_thread_checks: true,
        }
    }
}

fn default_true() -> bool { true }
fn default_false() -> bool { false }
fn default_level() -> String { "info".to_string() }

impl LoggingConfig {
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            level: parse_level(&self.level),
            file_output: self.file.is_some(),
            log_path: self.file.clone(),
            json_format: self.json,
            show_spans: self.spans,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| BridgeError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(&content)
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Find and load `tagbridge.toml` from the current directory or parents
    pub fn discover() -> Self {
        match std::env::current_dir() {
            Ok(dir) => Self::discover_from(&dir),
            Err(_) => Self::default(),
        }
    }

    /// Find and load `tagbridge.toml` from `start` or its parents
    pub fn discover_from(start: &Path) -> Self {
        let mut current = Some(start.to_path_buf());

        while let Some(dir) = current {
            if let Some(config) = Self::load_from_dir(&dir) {
                return config;
            }
            current = dir.parent().map(|p| p.to_path_buf());
        }

        Self::default()
    }

    fn load_from_dir(dir: &Path) -> Option<Self> {
        let config_path: PathBuf = dir.join(CONFIG_FILE);
        if !config_path.exists() {
            return None;
        }
        match Self::load(&config_path) {
            Ok(config) => Some(config),
            Err(err) => {
                warn!(
                    event = "config_ignored",
                    path = %config_path.display(),
                    error = %err,
                    "ignoring unreadable config"
                );
                None
            }
        }
    }

    /// Logging settings: the `[logging]` section, then `TAGBRIDGE_LOG_*`
    pub fn log_config(&self) -> LogConfig {
        self.logging.to_log_config().with_env_overrides()
    }

    /// Generate default configuration file content
    pub fn generate_default() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Failed to generate config"))
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;

        fs::write(path, content).map_err(|source| BridgeError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })
    }
}
