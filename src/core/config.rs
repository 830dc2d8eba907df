//! Configuration system: TOML file + env var overrides + smart defaults.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::chart::color::ChartColor;
use crate::core::errors::{LnvError, Result};
use crate::core::paths::resolve_relative_to;

/// Log levels accepted by `logging.level`.
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Full viewer configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub chart: ChartConfig,
    pub logging: LoggingConfig,
    pub paths: PathsConfig,
}

/// Where the collector's database lives and how we read it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file written by the collector. Relative paths resolve against
    /// the directory of the config file that set them.
    pub path: PathBuf,
    /// Maximum pooled read-only connections.
    pub pool_size: u32,
    /// SQLite busy timeout while the collector holds a write lock.
    pub busy_timeout_ms: u64,
}

/// Chart presentation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct ChartConfig {
    pub colors: ChartColors,
}

/// One color per standard metric (CSS name or `#rrggbb`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChartColors {
    pub balance_ratio: String,
    pub local_fee: String,
    pub local_infee: String,
    pub remote_fee: String,
    pub remote_infee: String,
    pub amboss_fee: String,
    pub active: String,
}

/// Log filter used when `RUST_LOG` is not set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

/// Filesystem paths used by lnv.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    pub config_file: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data").join("lightning_node.db"),
            pool_size: 4,
            busy_timeout_ms: 5_000,
        }
    }
}

impl Default for ChartColors {
    fn default() -> Self {
        Self {
            balance_ratio: "blue".to_string(),
            local_fee: "red".to_string(),
            local_infee: "green".to_string(),
            remote_fee: "purple".to_string(),
            remote_infee: "orange".to_string(),
            amboss_fee: "teal".to_string(),
            active: "darkblue".to_string(),
        }
    }
}

impl ChartColors {
    /// Named slots, in the order the dashboard shows them.
    #[must_use]
    pub fn entries(&self) -> [(&'static str, &str); 7] {
        [
            ("balance_ratio", &self.balance_ratio),
            ("local_fee", &self.local_fee),
            ("local_infee", &self.local_infee),
            ("remote_fee", &self.remote_fee),
            ("remote_infee", &self.remote_infee),
            ("amboss_fee", &self.amboss_fee),
            ("active", &self.active),
        ]
    }

    fn slot_mut(&mut self, key: &str) -> Option<&mut String> {
        match key {
            "balance_ratio" => Some(&mut self.balance_ratio),
            "local_fee" => Some(&mut self.local_fee),
            "local_infee" => Some(&mut self.local_infee),
            "remote_fee" => Some(&mut self.remote_fee),
            "remote_infee" => Some(&mut self.remote_infee),
            "amboss_fee" => Some(&mut self.amboss_fee),
            "active" => Some(&mut self.active),
            _ => None,
        }
    }

    /// Parse one configured slot into a chart color.
    pub fn resolve(&self, key: &str, raw: &str) -> Result<ChartColor> {
        ChartColor::parse(raw).ok_or_else(|| LnvError::InvalidConfig {
            details: format!("chart.colors.{key}: unknown color {raw:?}"),
        })
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        let home_dir = env::var_os("HOME").map_or_else(
            || {
                tracing::warn!("HOME not set, falling back to /tmp for the config path");
                PathBuf::from("/tmp")
            },
            PathBuf::from,
        );
        Self {
            config_file: home_dir.join(".config").join("lnv").join("config.toml"),
        }
    }
}

impl Config {
    /// Default configuration path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        PathsConfig::default().config_file
    }

    /// Load config from default or explicit path, then apply env overrides.
    ///
    /// Missing config file is not an error when loading from default path; defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, env_var)
    }

    /// [`Config::load`] with an injectable environment lookup.
    pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);
        let is_explicit_path = path.is_some();

        let (mut cfg, base_dir) = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf).map_err(|source| LnvError::Io {
                path: path_buf.clone(),
                source,
            })?;
            let parsed: Self = toml::from_str(&raw)?;
            (parsed, path_buf.parent().map(Path::to_path_buf))
        } else if is_explicit_path {
            return Err(LnvError::MissingConfig { path: path_buf });
        } else {
            (Self::default(), None)
        };

        cfg.paths.config_file = path_buf;
        let env_db_path = cfg.apply_env_overrides_from(lookup)?;
        // An env-supplied path is relative to the working directory, not the file.
        let anchor = if env_db_path { None } else { base_dir };
        cfg.database.path = resolve_relative_to(&cfg.database.path, anchor.as_deref());
        cfg.validate()?;
        Ok(cfg)
    }

    /// Deterministic hash of the effective config for logging.
    ///
    /// FNV-1a over the canonical JSON form so the value is stable across processes.
    pub fn stable_hash(&self) -> Result<String> {
        let canonical = serde_json::to_string(self)?;
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in canonical.as_bytes() {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        Ok(format!("{hash:016x}"))
    }

    /// Apply `LNV_*` overrides. Returns whether the database path came from the environment.
    fn apply_env_overrides_from<F>(&mut self, mut lookup: F) -> Result<bool>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut env_db_path = false;
        if let Some(raw) = lookup("LNV_DATABASE_PATH") {
            self.database.path = PathBuf::from(raw);
            env_db_path = true;
        }
        if let Some(raw) = lookup("LNV_DATABASE_POOL_SIZE") {
            self.database.pool_size = parse_env("LNV_DATABASE_POOL_SIZE", &raw)?;
        }
        if let Some(raw) = lookup("LNV_DATABASE_BUSY_TIMEOUT_MS") {
            self.database.busy_timeout_ms = parse_env("LNV_DATABASE_BUSY_TIMEOUT_MS", &raw)?;
        }
        if let Some(raw) = lookup("LNV_LOG_LEVEL") {
            self.logging.level = raw.trim().to_ascii_lowercase();
        }

        let keys: Vec<&'static str> = self.chart.colors.entries().map(|(key, _)| key).to_vec();
        for key in keys {
            let name = format!("LNV_CHART_COLOR_{}", key.to_ascii_uppercase());
            if let Some(raw) = lookup(&name)
                && let Some(slot) = self.chart.colors.slot_mut(key)
            {
                *slot = raw.trim().to_string();
            }
        }

        Ok(env_db_path)
    }

    fn validate(&self) -> Result<()> {
        if self.database.path.as_os_str().is_empty() {
            return Err(LnvError::InvalidConfig {
                details: "database.path must not be empty".to_string(),
            });
        }
        if self.database.pool_size == 0 {
            return Err(LnvError::InvalidConfig {
                details: "database.pool_size must be >= 1".to_string(),
            });
        }
        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(LnvError::InvalidConfig {
                details: format!(
                    "logging.level must be one of {LOG_LEVELS:?}, got {:?}",
                    self.logging.level
                ),
            });
        }
        for (key, raw) in self.chart.colors.entries() {
            self.chart.colors.resolve(key, raw)?;
        }
        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|raw| !raw.trim().is_empty())
}

fn parse_env<T>(name: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|error| LnvError::ConfigParse {
        context: "env",
        details: format!("{name}={raw:?}: {error}"),
    })
}
