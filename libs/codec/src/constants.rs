//! # Wire Constants
//!
//! Values shared with the receiving engine process. They define the binary
//! contract and must stay in lockstep with the engine's packet header.

/// Width of the null-padded symbol field
pub const SYMBOL_LEN: usize = 16;

/// Longest symbol that fits while keeping a terminating NUL
pub const MAX_SYMBOL_BYTES: usize = SYMBOL_LEN - 1;

/// Reserved alignment bytes between the enum bytes and the price
pub const RESERVED_LEN: usize = 6;

/// Encoded size of one wire packet in bytes
pub const PACKET_SIZE: usize = 56;

/// Layout revision. Bump on any field reorder or width change.
pub const WIRE_VERSION: u16 = 1;

/// Float size to integer lots multiplier (8 decimals)
pub const QTY_SCALE: u64 = 100_000_000;

/// Order id stamped on packets that carry no order reference
pub const NO_ORDER_ID: u64 = 0;
