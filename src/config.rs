//! Configuration management for Brute Guard.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{GuardError, Result};
use crate::guard::Thresholds;
use crate::lists::cidr;

/// Prefix of environment variables overriding file settings,
/// e.g. `BRUTE_GUARD__LIMITS__LOGIN=5`.
const ENV_PREFIX: &str = "BRUTE_GUARD";
const ENV_SEPARATOR: &str = "__";

/// Main configuration for the Brute Guard service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Per-dimension attempt limits
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Counter eviction
    #[serde(default)]
    pub janitor: JanitorConfig,

    /// Initial allow/deny list entries
    #[serde(default)]
    pub lists: ListsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub shutdown: ShutdownConfig,
}

/// Attempt limits per window.
///
/// Signed so that a negative value in a file or the environment reaches
/// validation instead of failing as a type error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_login_limit")]
    pub login: i64,

    #[serde(default = "default_password_limit")]
    pub password: i64,

    #[serde(default = "default_ip_limit")]
    pub ip: i64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            login: default_login_limit(),
            password: default_password_limit(),
            ip: default_ip_limit(),
        }
    }
}

fn default_login_limit() -> i64 {
    10
}

fn default_password_limit() -> i64 {
    100
}

fn default_ip_limit() -> i64 {
    1000
}

/// Janitor configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JanitorConfig {
    /// Sweep period in seconds; counters idle for longer are evicted
    #[serde(default = "default_frequency")]
    pub frequency_secs: u64,
}

impl Default for JanitorConfig {
    fn default() -> Self {
        Self {
            frequency_secs: default_frequency(),
        }
    }
}

impl JanitorConfig {
    pub fn frequency(&self) -> Duration {
        Duration::from_secs(self.frequency_secs)
    }
}

fn default_frequency() -> u64 {
    60
}

/// Allow/deny list entries loaded at start.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListsConfig {
    #[serde(default)]
    pub allow: Vec<String>,

    #[serde(default)]
    pub deny: Vec<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Shutdown configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShutdownConfig {
    /// How long to wait for background tasks after a shutdown signal
    #[serde(default = "default_grace_period")]
    pub grace_period_secs: u64,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            grace_period_secs: default_grace_period(),
        }
    }
}

impl ShutdownConfig {
    pub fn grace_period(&self) -> Duration {
        Duration::from_secs(self.grace_period_secs)
    }
}

fn default_grace_period() -> u64 {
    10
}

impl GuardConfig {
    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: GuardConfig = serde_yaml::from_str(yaml)
            .map_err(|e| GuardError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Load configuration from an optional YAML file with environment overrides.
    ///
    /// Environment variables take the form `BRUTE_GUARD__<SECTION>__<KEY>`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = ::config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(
                ::config::File::from(path).format(::config::FileFormat::Yaml),
            );
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix(ENV_PREFIX)
                .separator(ENV_SEPARATOR)
                .try_parsing(true),
        );

        let config: GuardConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that cannot be used to build the service.
    pub fn validate(&self) -> Result<()> {
        Thresholds::try_from(&self.limits)?;

        if self.janitor.frequency_secs == 0 {
            return Err(GuardError::Config(
                "janitor.frequency_secs must be greater than zero".to_string(),
            ));
        }

        for entry in self.lists.allow.iter().chain(self.lists.deny.iter()) {
            cidr::normalize(entry)
                .map_err(|e| GuardError::Config(format!("invalid list entry: {}", e)))?;
        }

        Ok(())
    }
}
