//! Sender mode selector

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Which sender implementation the bridge should use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum BridgeMode {
    /// Try the accelerated sender, fall back silently
    #[default]
    Auto,
    /// Require the accelerated sender, warn loudly when falling back
    Native,
    /// Always use the software fallback
    Python,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown bridge mode '{0}': expected one of auto, native, python")]
pub struct ModeParseError(pub String);

impl BridgeMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            BridgeMode::Auto => "auto",
            BridgeMode::Native => "native",
            BridgeMode::Python => "python",
        }
    }

    /// Whether resolution should attempt to load an accelerated sender
    pub const fn wants_accelerated(&self) -> bool {
        !matches!(self, BridgeMode::Python)
    }
}

impl fmt::Display for BridgeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BridgeMode {
    type Err = ModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(BridgeMode::Auto),
            "native" => Ok(BridgeMode::Native),
            "python" => Ok(BridgeMode::Python),
            _ => Err(ModeParseError(s.to_string())),
        }
    }
}

impl TryFrom<String> for BridgeMode {
    type Error = ModeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_and_whitespace_insensitive() {
        assert_eq!(" Native ".parse::<BridgeMode>(), Ok(BridgeMode::Native));
        assert_eq!("PYTHON".parse::<BridgeMode>(), Ok(BridgeMode::Python));
        assert_eq!("auto".parse::<BridgeMode>(), Ok(BridgeMode::Auto));
        assert_eq!(
            "turbo".parse::<BridgeMode>(),
            Err(ModeParseError("turbo".to_string()))
        );
    }

    #[test]
    fn test_display_matches_parse() {
        for mode in [BridgeMode::Auto, BridgeMode::Native, BridgeMode::Python] {
            assert_eq!(mode.to_string().parse::<BridgeMode>(), Ok(mode));
        }
        assert!(!BridgeMode::Python.wants_accelerated());
        assert!(BridgeMode::Auto.wants_accelerated());
    }
}
