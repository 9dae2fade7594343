//! Configuration for the `credtrail` binary, read from a TOML file.
//!
//! Every section and field is optional; anything missing takes its default,
//! and a missing file is the same as an empty one.

use credtrail_core::ContractConfig;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredtrailConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Page sizes and the audit event name.
    #[serde(default)]
    pub contract: ContractConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the RocksDB ledger; created on first use.
    #[serde(default = "StorageConfig::default_data_dir")]
    pub data_dir: PathBuf,
}

impl StorageConfig {
    fn default_data_dir() -> PathBuf {
        PathBuf::from("./data")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: Self::default_data_dir(),
        }
    }
}

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset (e.g. `info`,
    /// `credtrail_ledger=debug`).
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".into()
    }

    pub fn is_json(&self) -> bool {
        self.format == LogFormat::Json
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            format: LogFormat::default(),
        }
    }
}

impl CredtrailConfig {
    /// Read `path`, or return the defaults if it does not exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).map_err(|e| {
                anyhow::anyhow!("invalid config file {}: {e}", path.display())
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Write the config as TOML, creating parent directories.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }
}
