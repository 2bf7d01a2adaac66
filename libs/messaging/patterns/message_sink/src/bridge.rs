//! Engine bridge sink
//!
//! Converts each normalized event into wire packets and pushes them to the
//! engine's datagram socket through the strategy chosen at construction.

use crate::accelerated::{default_loaders, AdapterLoader};
use crate::resolve::{resolve_strategy, ResolutionDiagnostic, Strategy, StrategyKind};
use crate::stats::BridgeStats;
use crate::Sink;
use async_trait::async_trait;
use bridge_codec::{Side, NO_ORDER_ID, QTY_SCALE};
use bridge_config::BridgeConfig;
use bridge_types::{EventPayload, NormalizedEvent};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

#[derive(Debug)]
pub struct BridgeSink {
    destination: PathBuf,
    strategy: Strategy,
    diagnostic: Option<ResolutionDiagnostic>,
    closed: bool,
    /// Accelerated sender counters captured at close
    final_stats: Option<BridgeStats>,
}

impl BridgeSink {
    /// Resolve a strategy with the loaders compiled into this build
    pub fn new(config: BridgeConfig) -> Self {
        Self::with_loaders(config, &default_loaders())
    }

    pub fn with_loaders(config: BridgeConfig, loaders: &[Box<dyn AdapterLoader>]) -> Self {
        let resolution = resolve_strategy(&config, loaders);
        info!(
            "BridgeSink ready ({}, mode={}, socket={:?})",
            resolution.strategy.kind(),
            config.mode,
            config.destination
        );
        Self {
            destination: config.destination,
            strategy: resolution.strategy,
            diagnostic: resolution.diagnostic,
            closed: false,
            final_stats: None,
        }
    }

    /// Encode and send one event
    ///
    /// Never fails and never blocks; undeliverable packets are counted as
    /// dropped.
    pub fn send_event(&mut self, event: &NormalizedEvent) {
        let timestamp_ns = event.recv_ns();
        match (&mut self.strategy, &event.payload) {
            (Strategy::Accelerated(sender), EventPayload::Book(book)) => {
                sender.send_book(&event.symbol, &book.bids, &book.asks, timestamp_ns, QTY_SCALE)
            }
            (Strategy::Accelerated(sender), EventPayload::Trade(trade)) => sender.send_trade(
                &event.symbol,
                Side::from_label(&trade.side),
                trade.price,
                trade.size,
                timestamp_ns,
                NO_ORDER_ID,
                QTY_SCALE,
            ),
            (Strategy::Fallback(sender), EventPayload::Book(book)) => {
                sender.send_book(&event.symbol, book, timestamp_ns)
            }
            (Strategy::Fallback(sender), EventPayload::Trade(trade)) => {
                sender.send_trade(&event.symbol, trade, timestamp_ns)
            }
        }
    }

    /// Release the channel and log the final counters
    ///
    /// Idempotent. Accelerated sender errors are logged, never returned.
    pub fn shutdown(&mut self) {
        if self.closed {
            debug!("BridgeSink already closed");
            return;
        }
        self.closed = true;

        let kind = self.strategy.kind();
        let stats = match &mut self.strategy {
            Strategy::Accelerated(sender) => {
                let stats = match sender.stats() {
                    Ok(stats) => Some(stats),
                    Err(e) => {
                        warn!("Failed to read accelerated sender stats: {}", e);
                        None
                    }
                };
                if let Err(e) = sender.close() {
                    error!("Error closing accelerated sender: {}", e);
                }
                self.final_stats = stats.clone().map(|mut stats| {
                    stats.active = false;
                    stats
                });
                stats
            }
            Strategy::Fallback(sender) => {
                sender.close();
                Some(sender.stats().clone())
            }
        };

        match stats {
            Some(stats) => info!(
                sent = stats.sent,
                dropped = stats.dropped,
                "BridgeSink closed ({}) - sent={} dropped={} socket={:?}",
                kind,
                stats.sent,
                stats.dropped,
                self.destination
            ),
            None => info!(
                "BridgeSink closed ({}) - sent=unknown dropped=unknown socket={:?}",
                kind, self.destination
            ),
        }
    }

    /// Current counters
    ///
    /// `None` when the accelerated sender cannot report them.
    pub fn stats(&self) -> Option<BridgeStats> {
        match &self.strategy {
            Strategy::Fallback(sender) => Some(sender.stats().clone()),
            Strategy::Accelerated(_) if self.closed => self.final_stats.clone(),
            Strategy::Accelerated(sender) => sender.stats().ok(),
        }
    }

    pub fn strategy_kind(&self) -> StrategyKind {
        self.strategy.kind()
    }

    pub fn diagnostic(&self) -> Option<&ResolutionDiagnostic> {
        self.diagnostic.as_ref()
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

#[async_trait]
impl Sink for BridgeSink {
    async fn write(&mut self, event: &NormalizedEvent) {
        self.send_event(event);
    }

    async fn close(&mut self) {
        self.shutdown();
    }
}
