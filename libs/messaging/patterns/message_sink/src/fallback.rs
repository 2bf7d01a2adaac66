//! Portable datagram sender
//!
//! Used whenever no accelerated sender is available or the configuration asks
//! for the portable path. Delivery is best effort: every failure is counted as
//! a drop and none of them reach the caller.

use crate::stats::BridgeStats;
use bridge_codec::{book_packets, WirePacket, PACKET_SIZE};
use bridge_types::{BookPayload, TradePayload};
use std::io;
use std::os::unix::net::UnixDatagram;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, trace, warn};
use zerocopy::AsBytes;

/// What happened to a single packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    /// Destination socket does not exist
    Missing,
    /// Backpressure, refused connection, short write or closed sender
    Dropped,
}

/// Non-blocking unbound datagram socket addressed per send
#[derive(Debug)]
pub struct FallbackSender {
    socket: Option<UnixDatagram>,
    stats: BridgeStats,
    /// Set after the first missing-destination warning, cleared on the next
    /// successful send
    warned_missing: bool,
}

impl FallbackSender {
    /// Open the local socket
    ///
    /// If the socket cannot be created the sender still exists and counts
    /// every packet as dropped.
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        let destination = destination.into();
        let socket = match open_socket() {
            Ok(socket) => Some(socket),
            Err(e) => {
                error!(
                    "Failed to create bridge datagram socket for {:?}: {}",
                    destination, e
                );
                None
            }
        };

        let mut stats = BridgeStats::new(destination);
        stats.active = socket.is_some();
        debug!(
            "Fallback bridge sender ready (socket={:?}, open={})",
            stats.destination, stats.active
        );

        Self {
            socket,
            stats,
            warned_missing: false,
        }
    }

    /// Send one packet as one datagram
    pub fn send_packet(&mut self, packet: &WirePacket) -> SendOutcome {
        let Some(socket) = &self.socket else {
            self.stats.record_dropped();
            return SendOutcome::Dropped;
        };

        match socket.send_to(packet.as_bytes(), &self.stats.destination) {
            Ok(PACKET_SIZE) => {
                if self.warned_missing {
                    info!("Bridge socket {:?} is reachable again", self.stats.destination);
                    self.warned_missing = false;
                }
                self.stats.record_sent();
                SendOutcome::Sent
            }
            Ok(written) => {
                trace!("Short bridge write: {} of {} bytes", written, PACKET_SIZE);
                self.stats.record_dropped();
                SendOutcome::Dropped
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                if !self.warned_missing {
                    warn!(
                        "Bridge socket {:?} not found, dropping packets until it appears",
                        self.stats.destination
                    );
                    self.warned_missing = true;
                }
                self.stats.record_dropped();
                SendOutcome::Missing
            }
            Err(e) => {
                trace!("Bridge packet dropped: {}", e);
                self.stats.record_dropped();
                SendOutcome::Dropped
            }
        }
    }

    /// Every bid then every ask, one packet per level
    pub fn send_book(&mut self, symbol: &str, book: &BookPayload, timestamp_ns: u64) {
        for packet in book_packets(symbol, book, timestamp_ns) {
            self.send_packet(&packet);
        }
    }

    pub fn send_trade(&mut self, symbol: &str, trade: &TradePayload, timestamp_ns: u64) {
        let packet = WirePacket::trade(symbol, trade, timestamp_ns);
        self.send_packet(&packet);
    }

    pub fn stats(&self) -> &BridgeStats {
        &self.stats
    }

    pub fn destination(&self) -> &Path {
        &self.stats.destination
    }

    pub fn is_open(&self) -> bool {
        self.socket.is_some()
    }

    /// Release the socket. Packets sent afterwards are counted as dropped.
    pub fn close(&mut self) {
        if self.socket.take().is_some() {
            debug!("Fallback bridge socket released ({:?})", self.stats.destination);
        }
        self.stats.active = false;
    }
}

fn open_socket() -> io::Result<UnixDatagram> {
    let socket = UnixDatagram::unbound()?;
    socket.set_nonblocking(true)?;
    Ok(socket)
}
