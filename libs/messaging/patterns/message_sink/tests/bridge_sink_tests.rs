//! End-to-end behavior of the bridge sink against real datagram sockets

use bridge_codec::{PacketKind, Side};
use bridge_config::{BridgeConfig, BridgeMode};
use bridge_sink::test_utils::{
    absent_destination, CapturedLogs, FailingLoader, PacketReceiver, RecordingLoader,
};
use bridge_sink::{AdapterLoader, BridgeSink, Sink, StrategyKind};
use bridge_types::{BookLevel, BookPayload, EventTimestamps, NormalizedEvent, TradePayload};
use std::os::unix::net::UnixDatagram;

fn book_event(depth: usize, recv_ns: u64) -> NormalizedEvent {
    let bids = (0..depth)
        .map(|i| BookLevel::new(43_000.0 - i as f64, 0.05 + i as f64 * 0.01, 10 + i as u32))
        .collect();
    let asks = (0..depth)
        .map(|i| BookLevel::new(43_001.0 + i as f64, 0.04 + i as f64 * 0.01, 9 + i as u32))
        .collect();
    NormalizedEvent::book(
        "okx",
        "BTC-USDT-SWAP",
        EventTimestamps::at(recv_ns),
        BookPayload::new(depth as u32, bids, asks),
    )
}

fn trade_event(side: &str, price: f64, size: f64, recv_ns: u64) -> NormalizedEvent {
    NormalizedEvent::trade(
        "okx",
        "BTC-USDT",
        EventTimestamps::at(recv_ns),
        TradePayload::new(price, size, side),
    )
}

fn python_sink(destination: &std::path::Path) -> BridgeSink {
    BridgeSink::new(BridgeConfig::new(destination).with_mode(BridgeMode::Python))
}

#[tokio::test]
async fn test_absent_destination_drops_every_level() {
    let logs = CapturedLogs::default();
    let _guard = logs.install();
    let (_dir, path) = absent_destination();

    let mut sink = python_sink(&path);
    sink.write(&book_event(5, 1_000)).await;
    sink.close().await;

    let stats = sink.stats().unwrap();
    assert_eq!(stats.sent, 0);
    assert_eq!(stats.dropped, 10);
    assert!(!stats.active);
    assert_eq!(logs.count("INFO", "sent=0 dropped=10"), 1);
    assert_eq!(logs.count("WARN", "not found"), 1);
}

#[tokio::test]
async fn test_sell_trade_reaches_engine() {
    let receiver = PacketReceiver::bind().unwrap();
    let mut sink = python_sink(receiver.path());

    sink.write(&trade_event("sell", 100.5, 2.0, 5_555)).await;

    let packet = receiver.recv_packet().unwrap();
    assert_eq!(packet.symbol_str(), "BTC-USDT");
    assert_eq!(packet.side, 1);
    assert_eq!(packet.side().unwrap(), Side::Sell);
    assert_eq!(packet.kind().unwrap(), PacketKind::Trade);
    assert_eq!(packet.price(), 100.5);
    assert_eq!(packet.quantity(), 200_000_000);
    assert_eq!(packet.timestamp_ns(), 5_555);
    assert_eq!(packet.order_id(), 0);

    sink.close().await;
    let stats = sink.stats().unwrap();
    assert_eq!((stats.sent, stats.dropped), (1, 0));
}

#[tokio::test]
async fn test_book_levels_arrive_bids_then_asks() {
    let receiver = PacketReceiver::bind().unwrap();
    let mut sink = python_sink(receiver.path());

    sink.write(&book_event(3, 77)).await;

    let packets: Vec<_> = (0..6).map(|_| receiver.recv_packet().unwrap()).collect();
    let sides: Vec<_> = packets.iter().map(|p| p.side().unwrap()).collect();
    assert_eq!(
        sides,
        [Side::Buy, Side::Buy, Side::Buy, Side::Sell, Side::Sell, Side::Sell]
    );
    assert_eq!(packets[0].price(), 43_000.0);
    assert_eq!(packets[2].price(), 42_998.0);
    assert_eq!(packets[3].price(), 43_001.0);
    assert!(packets.iter().all(|p| p.kind().unwrap() == PacketKind::BookLevel));
    assert!(packets.iter().all(|p| p.timestamp_ns() == 77));
}

#[tokio::test]
async fn test_missing_destination_warns_once() {
    let logs = CapturedLogs::default();
    let _guard = logs.install();
    let (_dir, path) = absent_destination();

    let mut sink = python_sink(&path);
    for i in 0..20 {
        sink.write(&trade_event("buy", 1.0, 1.0, i)).await;
    }

    assert_eq!(logs.count("WARN", "not found"), 1);
    assert_eq!(sink.stats().unwrap().dropped, 20);
}

#[tokio::test]
async fn test_missing_warning_rearms_after_recovery() {
    let logs = CapturedLogs::default();
    let _guard = logs.install();
    let (_dir, path) = absent_destination();
    let mut sink = python_sink(&path);

    sink.write(&trade_event("buy", 1.0, 1.0, 1)).await;

    let engine = UnixDatagram::bind(&path).unwrap();
    sink.write(&trade_event("buy", 1.0, 1.0, 2)).await;
    assert_eq!(logs.count("INFO", "reachable again"), 1);

    drop(engine);
    std::fs::remove_file(&path).unwrap();
    sink.write(&trade_event("buy", 1.0, 1.0, 3)).await;

    let stats = sink.stats().unwrap();
    assert_eq!((stats.sent, stats.dropped), (1, 2));
    assert_eq!(logs.count("WARN", "not found"), 2);
}

#[tokio::test]
async fn test_python_mode_and_unavailable_accelerator_emit_same_bytes() {
    let python_rx = PacketReceiver::bind().unwrap();
    let native_rx = PacketReceiver::bind().unwrap();

    let mut python = python_sink(python_rx.path());
    let mut native = BridgeSink::with_loaders(
        BridgeConfig::new(native_rx.path()).with_mode(BridgeMode::Native),
        &[],
    );
    assert_eq!(python.strategy_kind(), StrategyKind::Fallback);
    assert_eq!(native.strategy_kind(), StrategyKind::Fallback);

    let events = [book_event(5, 10), trade_event("sell", 0.123_456_789, 3.3, 11)];
    let mut delivered = 0;
    for event in &events {
        python.write(event).await;
        native.write(event).await;

        let expected = python_rx.drain();
        assert_eq!(native_rx.drain(), expected);
        delivered += expected.len();
    }
    assert_eq!(delivered, 11);
}

#[cfg(all(feature = "native", target_os = "linux"))]
#[tokio::test]
async fn test_native_and_fallback_are_byte_identical() {
    let native_rx = PacketReceiver::bind().unwrap();
    let fallback_rx = PacketReceiver::bind().unwrap();

    let mut native =
        BridgeSink::new(BridgeConfig::new(native_rx.path()).with_mode(BridgeMode::Native));
    let mut fallback = python_sink(fallback_rx.path());
    assert_eq!(native.strategy_kind(), StrategyKind::Accelerated);
    assert!(native.diagnostic().is_none());

    let events = [
        book_event(5, 100),
        trade_event("buy", 43_000.5, 0.123, 101),
        trade_event("sell", 100.5, 2.0, 102),
        trade_event("BUY", 1.0, 0.000_000_019, 103),
    ];
    let mut delivered = 0;
    for event in &events {
        native.write(event).await;
        fallback.write(event).await;

        // One event at a time keeps each burst within the receive queue limit
        let expected = fallback_rx.drain();
        assert!(!expected.is_empty());
        assert_eq!(native_rx.drain(), expected);
        delivered += expected.len();
    }
    assert_eq!(delivered, 13);

    native.close().await;
    let stats = native.stats().unwrap();
    assert_eq!((stats.sent, stats.dropped, stats.active), (13, 0, false));
}

async fn assert_full_queue_drops_silently(mode: BridgeMode, served_by: StrategyKind) {
    let logs = CapturedLogs::default();
    let _guard = logs.install();
    let receiver = PacketReceiver::bind().unwrap();

    let mut sink = BridgeSink::new(BridgeConfig::new(receiver.path()).with_mode(mode));
    assert_eq!(sink.strategy_kind(), served_by);

    // Nothing reads until the end, so the receive queue fills up
    let trade = trade_event("buy", 1.0, 1.0, 1);
    for _ in 0..1_000 {
        sink.write(&trade).await;
    }
    sink.close().await;

    let stats = sink.stats().unwrap();
    assert_eq!(stats.sent + stats.dropped, 1_000);
    assert!(stats.sent > 0);
    assert!(stats.dropped > 0);
    assert_eq!(logs.count("WARN", ""), 0);
    assert_eq!(receiver.drain().len() as u64, stats.sent);
}

#[tokio::test]
async fn test_full_receive_queue_drops_silently_on_fallback() {
    assert_full_queue_drops_silently(BridgeMode::Python, StrategyKind::Fallback).await;
}

#[cfg(all(feature = "native", target_os = "linux"))]
#[tokio::test]
async fn test_full_receive_queue_drops_silently_on_native() {
    assert_full_queue_drops_silently(BridgeMode::Native, StrategyKind::Accelerated).await;
}

#[tokio::test]
async fn test_native_mode_warns_when_accelerator_fails() {
    let logs = CapturedLogs::default();
    let _guard = logs.install();
    let (_dir, path) = absent_destination();
    let loaders: Vec<Box<dyn AdapterLoader>> =
        vec![Box::new(FailingLoader::new("native", "library not found"))];

    let sink = BridgeSink::with_loaders(
        BridgeConfig::new(&path).with_mode(BridgeMode::Native),
        &loaders,
    );
    assert_eq!(sink.strategy_kind(), StrategyKind::Fallback);
    assert_eq!(logs.count("WARN", "QF_BRIDGE_MODE=native"), 1);
    assert!(logs.contents().contains("library not found"));
    assert_eq!(sink.diagnostic().unwrap().mode, BridgeMode::Native);
}

#[tokio::test]
async fn test_auto_mode_falls_back_quietly() {
    let logs = CapturedLogs::default();
    let _guard = logs.install();
    let (_dir, path) = absent_destination();
    let loaders: Vec<Box<dyn AdapterLoader>> =
        vec![Box::new(FailingLoader::new("native", "library not found"))];

    let sink = BridgeSink::with_loaders(BridgeConfig::new(&path), &loaders);
    assert_eq!(sink.strategy_kind(), StrategyKind::Fallback);
    assert_eq!(logs.count("WARN", ""), 0);
    assert!(sink.diagnostic().is_some());
}

#[tokio::test]
async fn test_close_is_idempotent() {
    let logs = CapturedLogs::default();
    let _guard = logs.install();
    let (_dir, path) = absent_destination();

    let mut sink = python_sink(&path);
    sink.write(&trade_event("buy", 1.0, 1.0, 1)).await;
    sink.close().await;
    sink.close().await;

    assert!(sink.is_closed());
    assert_eq!(logs.count("INFO", "BridgeSink closed"), 1);

    sink.write(&trade_event("buy", 1.0, 1.0, 2)).await;
    assert_eq!(sink.stats().unwrap().dropped, 2);
}

#[tokio::test]
async fn test_close_tolerates_accelerator_teardown_errors() {
    let logs = CapturedLogs::default();
    let _guard = logs.install();
    let (_dir, path) = absent_destination();
    let loader = RecordingLoader::failing_teardown();
    let loaders: Vec<Box<dyn AdapterLoader>> = vec![Box::new(loader.clone())];

    let mut sink = BridgeSink::with_loaders(BridgeConfig::new(&path), &loaders);
    assert_eq!(sink.strategy_kind(), StrategyKind::Accelerated);
    sink.write(&book_event(2, 5)).await;
    sink.close().await;
    sink.close().await;

    assert_eq!(loader.books().len(), 1);
    assert_eq!(loader.close_count(), 1);
    assert_eq!(logs.count("WARN", "stats unavailable"), 1);
    assert_eq!(logs.count("ERROR", "close failed"), 1);
    assert_eq!(logs.count("INFO", "sent=unknown"), 1);
    assert!(sink.stats().is_none());
}

#[tokio::test]
async fn test_accelerated_book_keeps_level_order() {
    let (_dir, path) = absent_destination();
    let loader = RecordingLoader::new();
    let loaders: Vec<Box<dyn AdapterLoader>> = vec![Box::new(loader.clone())];

    let mut sink = BridgeSink::with_loaders(BridgeConfig::new(&path), &loaders);
    let event = book_event(5, 9);
    sink.write(&event).await;
    sink.close().await;

    let books = loader.books();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].symbol, "BTC-USDT-SWAP");
    assert_eq!(books[0].bids[0].price, 43_000.0);
    assert_eq!(books[0].asks[4].price, 43_005.0);
    assert_eq!(books[0].timestamp_ns, 9);
    assert_eq!(sink.stats().unwrap().sent, 10);
}
