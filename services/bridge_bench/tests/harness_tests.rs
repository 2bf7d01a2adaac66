use bridge_bench::{compare, run_mode, BenchConfig, EventKind};
use bridge_config::BridgeMode;
use bridge_sink::test_utils::{CapturedLogs, PacketReceiver};
use bridge_sink::StrategyKind;

fn small_config(dir: &tempfile::TempDir, kind: EventKind) -> BenchConfig {
    BenchConfig {
        events: 200,
        warmup: 20,
        kind,
        destination: dir.path().join("missing.sock"),
    }
}

#[tokio::test]
async fn test_python_run_uses_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let result = run_mode(BridgeMode::Python, &small_config(&dir, EventKind::Book)).await;

    assert_eq!(result.served_by, StrategyKind::Fallback);
    assert_eq!(result.events, 200);
    assert_eq!(result.packets, 2_000);
    assert!(result.events_per_s > 0.0);
    assert!(result.us_per_event > 0.0);
}

#[tokio::test]
async fn test_compare_reports_both_modes() {
    let dir = tempfile::tempdir().unwrap();
    let comparison = compare(&small_config(&dir, EventKind::Trade)).await;

    assert_eq!(comparison.python.mode, BridgeMode::Python);
    assert_eq!(comparison.native.mode, BridgeMode::Native);
    assert_eq!(comparison.native.packets, 200);
    assert!(comparison.speedup.is_finite());
    assert!(comparison.speedup > 0.0);
    assert!(!dir.path().join("missing.sock").exists());

    let json = serde_json::to_value(&comparison).unwrap();
    assert_eq!(json["python"]["served_by"], "fallback");
    assert_eq!(json["native"]["kind"], "trade");
}

#[cfg(all(feature = "native", target_os = "linux"))]
#[tokio::test]
async fn test_native_run_is_accelerated() {
    let dir = tempfile::tempdir().unwrap();
    let result = run_mode(BridgeMode::Native, &small_config(&dir, EventKind::Book)).await;
    assert_eq!(result.served_by, StrategyKind::Accelerated);
}

#[tokio::test]
async fn test_existing_destination_is_flagged() {
    let logs = CapturedLogs::default();
    let _guard = logs.install();

    let dir = tempfile::tempdir().unwrap();
    run_mode(BridgeMode::Python, &small_config(&dir, EventKind::Trade)).await;
    assert_eq!(logs.count("WARN", "exists"), 0);

    let receiver = PacketReceiver::bind().unwrap();
    let config = BenchConfig {
        destination: receiver.path().to_path_buf(),
        ..small_config(&dir, EventKind::Trade)
    };
    let result = run_mode(BridgeMode::Python, &config).await;
    assert_eq!(result.events, 200);
    assert_eq!(logs.count("WARN", "exists"), 1);
}
