//! Bridge sink benchmark entry point
//!
//! Compares the fallback and accelerated senders against a missing socket in
//! a private temp directory and prints both results plus the speedup.

use anyhow::{Context, Result};
use bridge_bench::{compare, BenchConfig, Comparison, EventKind, DEFAULT_EVENTS, DEFAULT_WARMUP};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Timed writes per mode
    #[arg(long, default_value_t = DEFAULT_EVENTS)]
    events: u64,

    /// Untimed writes before the clock starts
    #[arg(long, default_value_t = DEFAULT_WARMUP)]
    warmup: u64,

    /// Synthetic event shape
    #[arg(long, value_enum, default_value_t = EventKind::Book)]
    kind: EventKind,

    /// Print the comparison as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "bridge_bench=info,warn".into()),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    let dir = tempfile::tempdir().context("Failed to create benchmark directory")?;
    let config = BenchConfig {
        events: args.events,
        warmup: args.warmup,
        kind: args.kind,
        destination: dir.path().join("missing.sock"),
    };
    info!(
        "Benchmarking {:?} events: warmup={} events={} socket={:?}",
        config.kind, config.warmup, config.events, config.destination
    );

    let comparison = compare(&config).await;

    if args.json {
        let json =
            serde_json::to_string_pretty(&comparison).context("Failed to serialize results")?;
        println!("{json}");
    } else {
        print_table(&comparison);
    }

    Ok(())
}

fn print_table(comparison: &Comparison) {
    println!(
        "{:<8} {:<12} {:>14} {:>14} {:>10}",
        "mode", "served_by", "events/s", "packets/s", "us/event"
    );
    for result in [&comparison.python, &comparison.native] {
        println!(
            "{:<8} {:<12} {:>14.0} {:>14.0} {:>10.3}",
            result.mode.as_str(),
            result.served_by.as_str(),
            result.events_per_s,
            result.packets_per_s,
            result.us_per_event
        );
    }
    println!("speedup (native/python): {:.2}x", comparison.speedup);
}
