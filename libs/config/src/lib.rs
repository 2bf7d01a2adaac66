//! # Bridge Configuration
//!
//! Configuration for the engine bridge sink: where the engine's datagram
//! socket lives and which sender implementation to use.
//!
//! ```rust
//! use bridge_config::{BridgeConfig, BridgeMode};
//!
//! let config = BridgeConfig::new("/tmp/engine.sock").with_mode(BridgeMode::Python);
//! assert_eq!(config.mode.as_str(), "python");
//! ```

pub mod bridge_config;
pub mod mode;

pub use bridge_config::{
    BridgeConfig, DEFAULT_DESTINATION, DESTINATION_ENV, ENV_PREFIX, MODE_ENV,
};
pub use mode::{BridgeMode, ModeParseError};
