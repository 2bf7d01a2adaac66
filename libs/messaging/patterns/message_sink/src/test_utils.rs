//! Test helpers for bridge sinks: a live engine-side receiver, log capture
//! and scripted accelerated senders.

use crate::accelerated::{AcceleratedSender, AdapterLoader};
use crate::error::AdapterError;
use crate::stats::BridgeStats;
use bridge_codec::{Side, WirePacket, PACKET_SIZE};
use bridge_types::BookLevel;
use std::io;
use std::os::unix::net::UnixDatagram;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tracing_subscriber::fmt::MakeWriter;

/// Temp directory and a socket path inside it that nothing is bound to
pub fn absent_destination() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("missing.sock");
    (dir, path)
}

/// Engine stand-in: a bound datagram socket in a private temp directory
#[derive(Debug)]
pub struct PacketReceiver {
    _dir: TempDir,
    path: PathBuf,
    socket: UnixDatagram,
}

impl PacketReceiver {
    pub fn bind() -> io::Result<Self> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("engine.sock");
        let socket = UnixDatagram::bind(&path)?;
        socket.set_read_timeout(Some(Duration::from_secs(2)))?;
        Ok(Self {
            _dir: dir,
            path,
            socket,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw bytes of the next datagram
    pub fn recv_raw(&self) -> io::Result<Vec<u8>> {
        let mut buf = [0u8; 2 * PACKET_SIZE];
        let n = self.socket.recv(&mut buf)?;
        Ok(buf[..n].to_vec())
    }

    /// Next datagram decoded as a packet
    pub fn recv_packet(&self) -> io::Result<WirePacket> {
        let raw = self.recv_raw()?;
        WirePacket::decode(&raw).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Every datagram already queued, without waiting
    pub fn drain(&self) -> Vec<Vec<u8>> {
        let mut packets = Vec::new();
        if self.socket.set_nonblocking(true).is_err() {
            return packets;
        }
        while let Ok(raw) = self.recv_raw() {
            packets.push(raw);
        }
        let _ = self.socket.set_nonblocking(false);
        packets
    }
}

/// Collects formatted log output of the current thread
#[derive(Debug, Clone, Default)]
pub struct CapturedLogs {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    /// Route this thread's `tracing` output here until the guard drops
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock().unwrap()).into_owned()
    }

    /// Lines at `level` (`"WARN"`, `"INFO"`, ...) containing `needle`
    pub fn count(&self, level: &str, needle: &str) -> usize {
        self.contents()
            .lines()
            .filter(|line| line.contains(level) && line.contains(needle))
            .count()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.lock().unwrap().extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedBook {
    pub symbol: String,
    pub bids: Vec<BookLevel>,
    pub asks: Vec<BookLevel>,
    pub timestamp_ns: u64,
    pub qty_scale: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedTrade {
    pub symbol: String,
    pub side: Side,
    pub price: f64,
    pub size: f64,
    pub timestamp_ns: u64,
    pub order_id: u64,
    pub qty_scale: u64,
}

#[derive(Debug, Default)]
struct Recording {
    loads: usize,
    books: Vec<RecordedBook>,
    trades: Vec<RecordedTrade>,
    closes: usize,
}

/// Loader handing out [`RecordingAdapter`]s that share one call log
#[derive(Debug, Clone, Default)]
pub struct RecordingLoader {
    recording: Arc<Mutex<Recording>>,
    fail_stats: bool,
    fail_close: bool,
}

impl RecordingLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adapters whose `stats` and `close` both return errors
    pub fn failing_teardown() -> Self {
        Self {
            fail_stats: true,
            fail_close: true,
            ..Self::default()
        }
    }

    pub fn load_count(&self) -> usize {
        self.recording.lock().unwrap().loads
    }

    pub fn books(&self) -> Vec<RecordedBook> {
        self.recording.lock().unwrap().books.clone()
    }

    pub fn trades(&self) -> Vec<RecordedTrade> {
        self.recording.lock().unwrap().trades.clone()
    }

    pub fn close_count(&self) -> usize {
        self.recording.lock().unwrap().closes
    }
}

impl AdapterLoader for RecordingLoader {
    fn name(&self) -> &str {
        "recording"
    }

    fn load(&self, destination: &Path) -> Result<Box<dyn AcceleratedSender>, AdapterError> {
        self.recording.lock().unwrap().loads += 1;
        Ok(Box::new(RecordingAdapter {
            recording: Arc::clone(&self.recording),
            stats: BridgeStats::new(destination),
            fail_stats: self.fail_stats,
            fail_close: self.fail_close,
        }))
    }
}

/// Accelerated sender that records calls and counts every packet as sent
#[derive(Debug)]
pub struct RecordingAdapter {
    recording: Arc<Mutex<Recording>>,
    stats: BridgeStats,
    fail_stats: bool,
    fail_close: bool,
}

impl AcceleratedSender for RecordingAdapter {
    fn send_book(
        &mut self,
        symbol: &str,
        bids: &[BookLevel],
        asks: &[BookLevel],
        timestamp_ns: u64,
        qty_scale: u64,
    ) {
        self.stats.sent += (bids.len() + asks.len()) as u64;
        self.recording.lock().unwrap().books.push(RecordedBook {
            symbol: symbol.to_string(),
            bids: bids.to_vec(),
            asks: asks.to_vec(),
            timestamp_ns,
            qty_scale,
        });
    }

    fn send_trade(
        &mut self,
        symbol: &str,
        side: Side,
        price: f64,
        size: f64,
        timestamp_ns: u64,
        order_id: u64,
        qty_scale: u64,
    ) {
        self.stats.record_sent();
        self.recording.lock().unwrap().trades.push(RecordedTrade {
            symbol: symbol.to_string(),
            side,
            price,
            size,
            timestamp_ns,
            order_id,
            qty_scale,
        });
    }

    fn stats(&self) -> Result<BridgeStats, AdapterError> {
        if self.fail_stats {
            return Err(AdapterError::Stats("stats unavailable".to_string()));
        }
        Ok(self.stats.clone())
    }

    fn close(&mut self) -> Result<(), AdapterError> {
        self.recording.lock().unwrap().closes += 1;
        self.stats.active = false;
        if self.fail_close {
            return Err(AdapterError::Close("close failed".to_string()));
        }
        Ok(())
    }
}

/// Loader that always fails construction
#[derive(Debug, Clone)]
pub struct FailingLoader {
    name: String,
    reason: String,
}

impl FailingLoader {
    pub fn new(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

impl AdapterLoader for FailingLoader {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self, _destination: &Path) -> Result<Box<dyn AcceleratedSender>, AdapterError> {
        Err(AdapterError::construction(&self.name, &self.reason))
    }
}
