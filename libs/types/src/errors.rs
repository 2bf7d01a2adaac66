//! Error types for normalized event validation

use thiserror::Error;

/// Monotonic timestamp ordering violations on a normalized event
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EventError {
    /// Decode happened before receipt
    #[error("Invariant violated: decoded_ns ({decoded_ns}) < recv_ns ({recv_ns})")]
    DecodedBeforeReceived { recv_ns: u64, decoded_ns: u64 },

    /// Processing happened before decode
    #[error("Invariant violated: proc_ns ({proc_ns}) < decoded_ns ({decoded_ns})")]
    ProcessedBeforeDecoded { decoded_ns: u64, proc_ns: u64 },
}
