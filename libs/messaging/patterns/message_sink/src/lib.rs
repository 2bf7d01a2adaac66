//! # Bridge Sink
//!
//! Last stage of the market-data pipeline: every [`NormalizedEvent`] is turned
//! into fixed-size wire packets and pushed, one datagram per packet, to the
//! trading engine's local socket.
//!
//! ## Strategies
//!
//! - **Accelerated**: an [`AcceleratedSender`] obtained from an
//!   [`AdapterLoader`]. With the `native` feature the built-in
//!   [`NativeLoader`](accelerated::NativeLoader) is tried by default.
//! - **Fallback**: a portable [`FallbackSender`], always available.
//!
//! The strategy is fixed once at construction by [`resolve_strategy`] based
//! on [`BridgeMode`](bridge_config::BridgeMode). Both strategies emit
//! identical bytes.
//!
//! ## Delivery
//!
//! Sends never block and never fail. A missing engine socket, a full receive
//! queue or any other send error counts the packet as dropped; the engine is
//! expected to tolerate gaps.
//!
//! ```rust,no_run
//! use bridge_config::BridgeConfig;
//! use bridge_sink::{BridgeSink, Sink};
//! # async fn run(event: bridge_types::NormalizedEvent) {
//! let mut sink = BridgeSink::new(BridgeConfig::from_env());
//! sink.write(&event).await;
//! sink.close().await;
//! # }
//! ```

pub mod accelerated;
pub mod bridge;
pub mod error;
pub mod fallback;
pub mod resolve;
pub mod stats;
pub mod test_utils;

use async_trait::async_trait;
use bridge_types::NormalizedEvent;
use std::fmt::Debug;

pub use accelerated::{default_loaders, AcceleratedSender, AdapterLoader};
pub use bridge::BridgeSink;
pub use error::AdapterError;
pub use fallback::{FallbackSender, SendOutcome};
pub use resolve::{resolve_strategy, Resolution, ResolutionDiagnostic, Strategy, StrategyKind};
pub use stats::BridgeStats;

/// Destination for normalized events
///
/// Sinks are driven by a single task; neither call reports errors to the
/// caller.
#[async_trait]
pub trait Sink: Send + Debug {
    async fn write(&mut self, event: &NormalizedEvent);

    /// Flush and release resources. Safe to call more than once.
    async fn close(&mut self);
}
