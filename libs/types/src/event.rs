//! Normalized market events
//!
//! Value types produced by the normalization stage and consumed read-only by
//! sinks. A [`NormalizedEvent`] carries exactly one [`EventPayload`] variant.

use crate::errors::EventError;
use serde::{Deserialize, Serialize};

/// Single order book level: (price, size, count)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BookLevel {
    pub price: f64,
    pub size: f64,
    /// Number of orders resting at this level
    pub count: u32,
}

impl BookLevel {
    pub const fn new(price: f64, size: f64, count: u32) -> Self {
        Self { price, size, count }
    }
}

/// Top-N order book snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookPayload {
    /// Declared depth of the snapshot
    pub n: u32,
    pub best_bid: f64,
    pub best_ask: f64,
    /// Bids, best first
    pub bids: Vec<BookLevel>,
    /// Asks, best first
    pub asks: Vec<BookLevel>,
}

impl BookPayload {
    /// Build a snapshot, deriving best bid/ask from the first level of each side
    ///
    /// An empty side reports a best price of `0.0`.
    pub fn new(n: u32, bids: Vec<BookLevel>, asks: Vec<BookLevel>) -> Self {
        let best_bid = bids.first().map_or(0.0, |level| level.price);
        let best_ask = asks.first().map_or(0.0, |level| level.price);
        Self {
            n,
            best_bid,
            best_ask,
            bids,
            asks,
        }
    }

    /// Total number of levels across both sides
    pub fn level_count(&self) -> usize {
        self.bids.len() + self.asks.len()
    }
}

/// Public trade print
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradePayload {
    pub price: f64,
    pub size: f64,
    /// Aggressor side as reported by the venue, usually `buy` or `sell`
    pub side: String,
    pub trade_id: Option<String>,
}

impl TradePayload {
    pub fn new(price: f64, size: f64, side: impl Into<String>) -> Self {
        Self {
            price,
            size,
            side: side.into(),
            trade_id: None,
        }
    }

    pub fn with_trade_id(mut self, trade_id: impl Into<String>) -> Self {
        self.trade_id = Some(trade_id.into());
        self
    }
}

/// Payload carried by a normalized event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventPayload {
    Book(BookPayload),
    Trade(TradePayload),
}

/// Timestamps attached to an event as it moves through the pipeline
///
/// The three monotonic readings must be non-decreasing:
/// `recv_mono_ns <= decoded_mono_ns <= proc_mono_ns`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTimestamps {
    /// Exchange-reported event time (epoch milliseconds)
    pub exchange_ms: u64,
    /// Local wall-clock receipt time (epoch milliseconds)
    pub recv_epoch_ms: u64,
    pub recv_mono_ns: u64,
    pub decoded_mono_ns: u64,
    pub proc_mono_ns: u64,
}

impl EventTimestamps {
    /// All monotonic readings taken at the same instant
    pub const fn at(mono_ns: u64) -> Self {
        Self {
            exchange_ms: 0,
            recv_epoch_ms: 0,
            recv_mono_ns: mono_ns,
            decoded_mono_ns: mono_ns,
            proc_mono_ns: mono_ns,
        }
    }

    pub fn check(&self) -> Result<(), EventError> {
        if self.decoded_mono_ns < self.recv_mono_ns {
            return Err(EventError::DecodedBeforeReceived {
                recv_ns: self.recv_mono_ns,
                decoded_ns: self.decoded_mono_ns,
            });
        }
        if self.proc_mono_ns < self.decoded_mono_ns {
            return Err(EventError::ProcessedBeforeDecoded {
                decoded_ns: self.decoded_mono_ns,
                proc_ns: self.proc_mono_ns,
            });
        }
        Ok(())
    }
}

/// Normalized market data event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedEvent {
    pub exchange: String,
    pub symbol: String,
    pub channel: String,
    pub event_type: String,
    pub timestamps: EventTimestamps,
    pub payload: EventPayload,
}

impl NormalizedEvent {
    /// Construct an event
    ///
    /// Timestamp ordering is asserted in debug builds; release builds accept
    /// the event as-is and callers may use [`NormalizedEvent::check_timestamps`].
    pub fn new(
        exchange: impl Into<String>,
        symbol: impl Into<String>,
        channel: impl Into<String>,
        event_type: impl Into<String>,
        timestamps: EventTimestamps,
        payload: EventPayload,
    ) -> Self {
        debug_assert!(
            timestamps.check().is_ok(),
            "Invariant violated: event timestamps out of order ({timestamps:?})"
        );
        Self {
            exchange: exchange.into(),
            symbol: symbol.into(),
            channel: channel.into(),
            event_type: event_type.into(),
            timestamps,
            payload,
        }
    }

    /// Top-N book event on the `books5` channel
    pub fn book(
        exchange: impl Into<String>,
        symbol: impl Into<String>,
        timestamps: EventTimestamps,
        book: BookPayload,
    ) -> Self {
        Self::new(
            exchange,
            symbol,
            "books5",
            "book_topn",
            timestamps,
            EventPayload::Book(book),
        )
    }

    /// Trade event on the `trades` channel
    pub fn trade(
        exchange: impl Into<String>,
        symbol: impl Into<String>,
        timestamps: EventTimestamps,
        trade: TradePayload,
    ) -> Self {
        Self::new(
            exchange,
            symbol,
            "trades",
            "trade",
            timestamps,
            EventPayload::Trade(trade),
        )
    }

    /// Monotonic receipt time, the timestamp stamped on outgoing packets
    #[inline]
    pub fn recv_ns(&self) -> u64 {
        self.timestamps.recv_mono_ns
    }

    pub fn check_timestamps(&self) -> Result<(), EventError> {
        self.timestamps.check()
    }
}
