//! Bootstrap configuration loading
//!
//! TOML configuration is bootstrap only: catalog location, logging and
//! output formatting. Scoring thresholds are fixed in code and are not
//! configurable.
//!
//! # Resolution priority
//! 1. Command-line argument (highest priority)
//! 2. `TCIR_CONFIG` environment variable
//! 3. Platform config file (`~/.config/tcir/config.toml` on Linux)
//! 4. Compiled defaults (fallback)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "TCIR_CONFIG";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Interpretation catalog (JSON or TOML); reports carry "no data"
    /// narratives when absent
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Output formatting for CLI results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Pretty-print JSON output
    #[serde(default)]
    pub pretty: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Where the effective configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    CommandLine(PathBuf),
    Environment(PathBuf),
    PlatformFile(PathBuf),
    CompiledDefaults,
}

/// Resolves and loads the bootstrap configuration
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    cli_path: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new(cli_path: Option<PathBuf>) -> Self {
        Self { cli_path }
    }

    /// Load configuration following the priority order
    ///
    /// An explicit `--config` path that cannot be read or parsed is an
    /// error. Environment and platform files that fail to load log a
    /// warning and fall through to compiled defaults.
    pub fn load(&self) -> Result<(TomlConfig, ConfigSource)> {
        // Priority 1: Command-line argument
        if let Some(path) = &self.cli_path {
            let config = load_toml_config(path)?;
            info!("Loaded configuration from {} (command line)", path.display());
            return Ok((config, ConfigSource::CommandLine(path.clone())));
        }

        // Priority 2: Environment variable
        if let Ok(value) = std::env::var(CONFIG_ENV_VAR) {
            let path = PathBuf::from(value);
            match load_toml_config(&path) {
                Ok(config) => {
                    info!("Loaded configuration from {} ({})", path.display(), CONFIG_ENV_VAR);
                    return Ok((config, ConfigSource::Environment(path)));
                }
                Err(e) => warn!("Ignoring {}={}: {}", CONFIG_ENV_VAR, path.display(), e),
            }
        }

        // Priority 3: Platform config file
        if let Some(path) = platform_config_path() {
            if path.exists() {
                match load_toml_config(&path) {
                    Ok(config) => {
                        info!("Loaded configuration from {}", path.display());
                        return Ok((config, ConfigSource::PlatformFile(path)));
                    }
                    Err(e) => warn!("Ignoring config file {}: {}", path.display(), e),
                }
            }
        }

        // Priority 4: Compiled defaults
        Ok((TomlConfig::default(), ConfigSource::CompiledDefaults))
    }
}

/// Platform config file location (`<config_dir>/tcir/config.toml`)
pub fn platform_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tcir").join("config.toml"))
}

/// Read and parse a TOML configuration file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read config file {:?}: {}", path, e)))?;
    let config = toml::from_str(&content)?;
    Ok(config)
}
