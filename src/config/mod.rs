//! Configuration management

use crate::domain::call::{EmptyRemotePolicy, WaitReason};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Treatment of one-to-one snapshots without remote memberships
    #[serde(default)]
    pub empty_remote_policy: EmptyRemotePolicy,
    /// Wait reason given to newly registered calls
    #[serde(default)]
    pub default_wait_reason: WaitReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default `tracing` filter when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from an optional file, overridden by `CALLSYNC__*`
    /// environment variables (e.g. `CALLSYNC__ENGINE__EMPTY_REMOTE_POLICY`).
    pub fn load(path: &str) -> Result<Self, ::config::ConfigError> {
        ::config::Config::builder()
            .add_source(::config::File::with_name(path).required(false))
            .add_source(::config::Environment::with_prefix("CALLSYNC").separator("__"))
            .build()?
            .try_deserialize()
    }
}
