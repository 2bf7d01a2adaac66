//! Delivery counters for one bridge sender

use serde::Serialize;
use std::path::{Path, PathBuf};

/// Cumulative packet counters
///
/// Counters only grow. `active` is true while the sender still owns an open
/// channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BridgeStats {
    pub sent: u64,
    pub dropped: u64,
    pub destination: PathBuf,
    pub active: bool,
}

impl BridgeStats {
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        Self {
            sent: 0,
            dropped: 0,
            destination: destination.into(),
            active: true,
        }
    }

    #[inline]
    pub fn record_sent(&mut self) {
        self.sent += 1;
    }

    #[inline]
    pub fn record_dropped(&mut self) {
        self.dropped += 1;
    }

    /// Packets attempted, successful or not
    pub fn attempted(&self) -> u64 {
        self.sent + self.dropped
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }
}
