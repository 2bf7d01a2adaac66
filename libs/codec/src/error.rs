//! Decode errors for received wire packets
//!
//! Encoding has no failure mode; only parsing bytes coming off the wire can
//! fail.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Datagram length does not match the fixed packet size
    #[error("Invalid packet length: expected {expected} bytes, got {got}")]
    InvalidLength { expected: usize, got: usize },

    /// Side byte outside the known range
    #[error("Unknown side byte {0} (expected 0 = buy, 1 = sell)")]
    UnknownSide(u8),

    /// Event type byte outside the known range
    #[error("Unknown event type byte {0} (expected 0 = book level, 1 = trade)")]
    UnknownKind(u8),
}
