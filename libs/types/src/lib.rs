//! # Bridge Types
//!
//! Normalized market event model shared between the normalization stage and
//! every sink. Events are plain values: sinks read them and never mutate them.
//!
//! ```rust
//! use bridge_types::{BookLevel, BookPayload, EventTimestamps, NormalizedEvent};
//!
//! let book = BookPayload::new(
//!     5,
//!     vec![BookLevel::new(43000.0, 0.05, 10)],
//!     vec![BookLevel::new(43001.0, 0.04, 9)],
//! );
//! let event = NormalizedEvent::book("okx", "BTC-USDT-SWAP", EventTimestamps::at(1), book);
//! assert!(event.check_timestamps().is_ok());
//! ```

pub mod errors;
pub mod event;

pub use errors::EventError;
pub use event::{
    BookLevel, BookPayload, EventPayload, EventTimestamps, NormalizedEvent, TradePayload,
};
