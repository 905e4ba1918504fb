use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::alert_level::LevelSet;

pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Settings for one named environment, as selected with `--env`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    #[serde(default)]
    pub debug: bool,
    /// Keep dispatching to later channels when one fails.
    #[serde(default)]
    pub isolate_channel_failures: bool,
    #[serde(default)]
    pub datastore: Option<DataStoreConfig>,
    #[serde(default)]
    pub webhook: Option<WebhookConfig>,
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Relational alert sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataStoreConfig {
    /// Database file (tilde-expanded at point of use).
    pub path: String,
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default)]
    pub monitored_levels: Option<LevelSet>,
}

/// Chat webhook alert sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    pub endpoint: String,
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub monitored_levels: Option<LevelSet>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_tries")]
    pub tries: u32,
    #[serde(default = "default_delay")]
    pub delay_secs: f64,
    #[serde(default = "default_backoff")]
    pub backoff: f64,
    /// Wrap each channel delivery in the retry policy.
    #[serde(default)]
    pub retry_deliveries: bool,
}

fn default_table() -> String {
    "cron_alerts".into()
}

fn default_username() -> String {
    "cronguard".into()
}

const fn default_timeout() -> u64 {
    10
}

const fn default_tries() -> u32 {
    3
}

const fn default_delay() -> f64 {
    5.0
}

const fn default_backoff() -> f64 {
    2.0
}

impl RetryConfig {
    /// # Errors
    ///
    /// Returns an error if `tries` is zero, or `delay_secs` or `backoff` is
    /// negative or not finite.
    pub fn validate(&self) -> Result<()> {
        if self.tries == 0 {
            bail!("retry.tries must be at least 1");
        }
        if !self.delay_secs.is_finite() || self.delay_secs < 0.0 {
            bail!("retry.delay_secs must be a finite, non-negative number");
        }
        if !self.backoff.is_finite() || self.backoff < 0.0 {
            bail!("retry.backoff must be a finite, non-negative number");
        }
        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            tries: default_tries(),
            delay_secs: default_delay(),
            backoff: default_backoff(),
            retry_deliveries: false,
        }
    }
}

/// Configuration resolved for a single environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env_name: String,
    pub settings: EnvironmentConfig,
}

impl AppConfig {
    /// Load the named environment from the default config path, creating a
    /// default file if none exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined, the file
    /// cannot be read or written, or the environment is not defined.
    pub fn load(env_name: &str) -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            write_default(&path)?;
        }
        Self::load_from(&path, env_name)
    }

    /// Load the named environment from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML content is
    /// invalid, or the environment is not defined in it.
    pub fn load_from(path: &Path, env_name: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&content, env_name)
    }

    /// Parse the named environment out of TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid, the environment is missing,
    /// a datastore table name is not a plain identifier, or the retry
    /// schedule is out of range.
    pub fn from_toml(content: &str, env_name: &str) -> Result<Self> {
        let mut environments: BTreeMap<String, EnvironmentConfig> =
            toml::from_str(content).context("Failed to parse config file")?;
        let Some(settings) = environments.remove(env_name) else {
            bail!("environment `{env_name}` not found in configuration");
        };
        if let Some(ref datastore) = settings.datastore {
            validate_table_name(&datastore.table)?;
        }
        settings
            .retry
            .validate()
            .with_context(|| format!("invalid [{env_name}.retry] section"))?;
        Ok(Self {
            env_name: env_name.to_string(),
            settings,
        })
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(config_dir.join("cronguard").join("config.toml"))
    }
}

/// Write a config file holding a single `development` environment with no
/// channels.
///
/// # Errors
///
/// Returns an error if the directory cannot be created, serialization fails,
/// or the file cannot be written.
pub fn write_default(path: &Path) -> Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    let mut environments = BTreeMap::new();
    environments.insert(DEFAULT_ENVIRONMENT.to_string(), EnvironmentConfig::default());
    let content = toml::to_string_pretty(&environments).context("Failed to serialize config")?;
    std::fs::write(path, content).context("Failed to write config file")?;
    Ok(())
}

/// Table names are spliced into SQL, so only plain identifiers are accepted.
///
/// # Errors
///
/// Returns an error if the name is empty, starts with a digit, or contains
/// anything other than ASCII letters, digits and underscores.
pub fn validate_table_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        bail!("invalid datastore table name `{name}`");
    }
    Ok(())
}
