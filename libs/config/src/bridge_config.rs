//! Bridge Configuration Module
//!
//! Destination socket and sender mode for one bridge sink. The core never
//! reads process state: entry points build a [`BridgeConfig`] (from a file,
//! the environment, or code) and hand it to the sink.

use crate::mode::BridgeMode;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Well-known engine socket
pub const DEFAULT_DESTINATION: &str = "/tmp/quantumflow_bridge.sock";

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "QF_BRIDGE";

pub const MODE_ENV: &str = "QF_BRIDGE_MODE";
pub const DESTINATION_ENV: &str = "QF_BRIDGE_DESTINATION";

/// Settings for one bridge sink instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Path of the engine's datagram socket
    pub destination: PathBuf,
    pub mode: BridgeMode,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            destination: PathBuf::from(DEFAULT_DESTINATION),
            mode: BridgeMode::Auto,
        }
    }
}

impl BridgeConfig {
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        Self {
            destination: destination.into(),
            ..Default::default()
        }
    }

    pub fn with_mode(mut self, mode: BridgeMode) -> Self {
        self.mode = mode;
        self
    }

    /// Load from an optional TOML file with `QF_BRIDGE_*` environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Same as [`BridgeConfig::load`] with an explicit environment map
    ///
    /// `None` reads the process environment.
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            debug!("Loading bridge config: {:?}", path);
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).source(env));

        let config = builder
            .build()
            .context("Failed to build bridge configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize bridge configuration")
    }

    /// Read `QF_BRIDGE_MODE` and `QF_BRIDGE_DESTINATION` from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from a key lookup; unknown modes fall back to `auto` with a warning
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(destination) = lookup(DESTINATION_ENV).filter(|d| !d.trim().is_empty()) {
            config.destination = PathBuf::from(destination.trim());
        }

        if let Some(raw) = lookup(MODE_ENV) {
            match raw.parse::<BridgeMode>() {
                Ok(mode) => config.mode = mode,
                Err(e) => warn!("{}; using {}", e, BridgeMode::Auto),
            }
        }

        config
    }
}
