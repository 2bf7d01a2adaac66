//! # Bridge Benchmark Harness
//!
//! Measures encode-and-dispatch cost of the bridge sink per strategy. Every
//! run targets a socket path that does not exist, so each packet takes the
//! same drop path in the kernel and only the sender's own CPU cost differs.
//!
//! Protocol per mode: build a sink, write the synthetic event `warmup` times
//! (untimed), write it `events` times under the clock, close.

use bridge_config::{BridgeConfig, BridgeMode};
use bridge_sink::{BridgeSink, Sink, StrategyKind};
use bridge_types::{BookLevel, BookPayload, EventTimestamps, NormalizedEvent, TradePayload};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

pub const DEFAULT_EVENTS: u64 = 40_000;
pub const DEFAULT_WARMUP: u64 = 5_000;
pub const BOOK_DEPTH: usize = 5;

const MIN_ELAPSED_S: f64 = 1e-12;
const MIN_RATE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Book,
    Trade,
}

impl EventKind {
    /// Packets one event of this kind fans out to
    pub fn packets_per_event(&self) -> u64 {
        match self {
            EventKind::Book => 2 * BOOK_DEPTH as u64,
            EventKind::Trade => 1,
        }
    }
}

/// Fixed synthetic event: a 5x5 BTC-USDT-SWAP book or a single buy trade
pub fn synthetic_event(kind: EventKind) -> NormalizedEvent {
    let timestamps = EventTimestamps {
        exchange_ms: 1_700_000_000_000,
        recv_epoch_ms: 1_700_000_000_001,
        ..EventTimestamps::at(1_000_000)
    };
    match kind {
        EventKind::Book => {
            let bids = (0..BOOK_DEPTH)
                .map(|i| {
                    let i_f = i as f64;
                    BookLevel::new(43_000.0 - i_f, 0.05 + i_f * 0.01, 10 + i as u32)
                })
                .collect();
            let asks = (0..BOOK_DEPTH)
                .map(|i| {
                    let i_f = i as f64;
                    BookLevel::new(43_001.0 + i_f, 0.04 + i_f * 0.01, 9 + i as u32)
                })
                .collect();
            NormalizedEvent::book(
                "okx",
                "BTC-USDT-SWAP",
                timestamps,
                BookPayload::new(BOOK_DEPTH as u32, bids, asks),
            )
        }
        EventKind::Trade => NormalizedEvent::trade(
            "okx",
            "BTC-USDT-SWAP",
            timestamps,
            TradePayload::new(43_000.5, 0.123, "buy").with_trade_id("t1"),
        ),
    }
}

#[derive(Debug, Clone)]
pub struct BenchConfig {
    pub events: u64,
    pub warmup: u64,
    pub kind: EventKind,
    /// Socket path that must not exist
    pub destination: PathBuf,
}

impl BenchConfig {
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        Self {
            events: DEFAULT_EVENTS,
            warmup: DEFAULT_WARMUP,
            kind: EventKind::Book,
            destination: destination.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BenchResult {
    pub mode: BridgeMode,
    /// Strategy that actually handled the run
    pub served_by: StrategyKind,
    pub kind: EventKind,
    pub events: u64,
    pub packets: u64,
    pub elapsed_s: f64,
    pub events_per_s: f64,
    pub packets_per_s: f64,
    pub us_per_event: f64,
}

impl BenchResult {
    fn from_elapsed(
        mode: BridgeMode,
        served_by: StrategyKind,
        kind: EventKind,
        events: u64,
        elapsed_s: f64,
    ) -> Self {
        let elapsed_s = elapsed_s.max(MIN_ELAPSED_S);
        let packets = events * kind.packets_per_event();
        Self {
            mode,
            served_by,
            kind,
            events,
            packets,
            elapsed_s,
            events_per_s: events as f64 / elapsed_s,
            packets_per_s: packets as f64 / elapsed_s,
            us_per_event: elapsed_s * 1e6 / events.max(1) as f64,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub python: BenchResult,
    pub native: BenchResult,
    /// Accelerated events/s over fallback events/s
    pub speedup: f64,
}

/// Accelerated throughput relative to fallback throughput
pub fn speedup(native_events_per_s: f64, python_events_per_s: f64) -> f64 {
    native_events_per_s / python_events_per_s.max(MIN_RATE)
}

/// Benchmark one mode
///
/// A destination that exists puts the kernel's delivery path into the
/// measurement; the run still proceeds but logs a warning.
pub async fn run_mode(mode: BridgeMode, config: &BenchConfig) -> BenchResult {
    if config.destination.exists() {
        warn!(
            "Benchmark destination {:?} exists, results include socket delivery cost",
            config.destination
        );
    }
    let event = synthetic_event(config.kind);
    let mut sink = BridgeSink::new(BridgeConfig::new(&config.destination).with_mode(mode));
    let served_by = sink.strategy_kind();

    for _ in 0..config.warmup {
        sink.write(&event).await;
    }

    let start = Instant::now();
    for _ in 0..config.events {
        sink.write(&event).await;
    }
    let elapsed = start.elapsed();

    sink.close().await;

    let result = BenchResult::from_elapsed(
        mode,
        served_by,
        config.kind,
        config.events,
        elapsed.as_secs_f64(),
    );
    info!(
        "{} ({}): {:.0} events/s, {:.0} packets/s, {:.3} us/event",
        mode, served_by, result.events_per_s, result.packets_per_s, result.us_per_event
    );
    result
}

/// Run `python` then `native` under identical settings
pub async fn compare(config: &BenchConfig) -> Comparison {
    let python = run_mode(BridgeMode::Python, config).await;
    let native = run_mode(BridgeMode::Native, config).await;
    let speedup = speedup(native.events_per_s, python.events_per_s);
    Comparison {
        python,
        native,
        speedup,
    }
}
