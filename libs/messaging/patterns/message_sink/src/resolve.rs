//! Strategy resolution
//!
//! Decides once, at sink construction, whether packets go through an
//! accelerated sender or the portable fallback. Resolution never fails: the
//! fallback is always constructible.

use crate::accelerated::{AcceleratedSender, AdapterLoader};
use crate::error::AdapterError;
use crate::fallback::FallbackSender;
use bridge_config::{BridgeConfig, BridgeMode, MODE_ENV};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};

/// Active sending implementation
#[derive(Debug)]
pub enum Strategy {
    Accelerated(Box<dyn AcceleratedSender>),
    Fallback(FallbackSender),
}

impl Strategy {
    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::Accelerated(_) => StrategyKind::Accelerated,
            Strategy::Fallback(_) => StrategyKind::Fallback,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Accelerated,
    Fallback,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Accelerated => "accelerated",
            StrategyKind::Fallback => "fallback",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why the accelerated path was skipped or which loaders failed before one
/// succeeded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionDiagnostic {
    pub mode: BridgeMode,
    pub failures: Vec<AdapterError>,
}

impl fmt::Display for ResolutionDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mode={}", self.mode)?;
        for failure in &self.failures {
            write!(f, "; {}", failure)?;
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct Resolution {
    pub strategy: Strategy,
    pub diagnostic: Option<ResolutionDiagnostic>,
}

/// Pick the sending strategy for `config`
///
/// `python` mode goes straight to the fallback without consulting any loader.
/// `auto` and `native` try each loader in order and take the first that
/// succeeds. When none does, `native` warns and `auto` only logs at debug
/// level; both then use the fallback.
pub fn resolve_strategy(config: &BridgeConfig, loaders: &[Box<dyn AdapterLoader>]) -> Resolution {
    if !config.mode.wants_accelerated() {
        debug!("Bridge mode is {}, using fallback sender", config.mode);
        return Resolution {
            strategy: Strategy::Fallback(FallbackSender::new(&config.destination)),
            diagnostic: None,
        };
    }

    let mut failures = Vec::new();
    for loader in loaders {
        match loader.load(&config.destination) {
            Ok(sender) => {
                info!(
                    "Using accelerated bridge sender '{}' (socket={:?})",
                    loader.name(),
                    config.destination
                );
                let diagnostic = (!failures.is_empty()).then(|| ResolutionDiagnostic {
                    mode: config.mode,
                    failures,
                });
                return Resolution {
                    strategy: Strategy::Accelerated(sender),
                    diagnostic,
                };
            }
            Err(e) => {
                debug!("Accelerated loader '{}' failed: {}", loader.name(), e);
                failures.push(e);
            }
        }
    }

    if loaders.is_empty() {
        failures.push(AdapterError::unavailable(
            "*",
            "no accelerated sender available in this build",
        ));
    }
    let diagnostic = ResolutionDiagnostic {
        mode: config.mode,
        failures,
    };

    match config.mode {
        BridgeMode::Native => warn!(
            "{}=native but the accelerated sender is unavailable, using fallback ({})",
            MODE_ENV, diagnostic
        ),
        _ => debug!("Accelerated sender unavailable, using fallback ({})", diagnostic),
    }

    Resolution {
        strategy: Strategy::Fallback(FallbackSender::new(&config.destination)),
        diagnostic: Some(diagnostic),
    }
}
