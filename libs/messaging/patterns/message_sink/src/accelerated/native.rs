//! Raw-socket accelerated sender
//!
//! Skips the per-send path conversion of the portable sender: the socket
//! address is resolved once at construction and packets are patched in place
//! from a per-event template.

use super::{AcceleratedSender, AdapterLoader};
use crate::error::AdapterError;
use crate::stats::BridgeStats;
use bridge_codec::{
    encode_symbol, scale_quantity, PacketKind, Side, WirePacket, NO_ORDER_ID, PACKET_SIZE,
};
use bridge_types::BookLevel;
use nix::sys::socket::{sendto, socket, AddressFamily, MsgFlags, SockFlag, SockType, UnixAddr};
use std::os::fd::{AsRawFd, OwnedFd};
use std::path::Path;
use tracing::debug;
use zerocopy::byteorder::{F64, U64};
use zerocopy::AsBytes;

pub const NATIVE_LOADER: &str = "native";

/// Loader for [`NativeSender`]
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeLoader;

impl AdapterLoader for NativeLoader {
    fn name(&self) -> &str {
        NATIVE_LOADER
    }

    fn load(&self, destination: &Path) -> Result<Box<dyn AcceleratedSender>, AdapterError> {
        Ok(Box::new(NativeSender::open(destination)?))
    }
}

#[derive(Debug)]
pub struct NativeSender {
    fd: Option<OwnedFd>,
    addr: UnixAddr,
    stats: BridgeStats,
}

impl NativeSender {
    /// Resolve the destination address and open a non-blocking datagram socket
    ///
    /// Fails when the path does not fit in a socket address or the socket
    /// cannot be created. The destination itself need not exist yet.
    pub fn open(destination: &Path) -> Result<Self, AdapterError> {
        let addr = UnixAddr::new(destination).map_err(|e| {
            AdapterError::construction(
                NATIVE_LOADER,
                format!("invalid socket path {:?}: {}", destination, e),
            )
        })?;
        let fd = socket(
            AddressFamily::Unix,
            SockType::Datagram,
            SockFlag::SOCK_NONBLOCK | SockFlag::SOCK_CLOEXEC,
            None,
        )
        .map_err(|e| AdapterError::construction(NATIVE_LOADER, format!("socket: {}", e)))?;

        debug!("Native bridge sender opened (socket={:?})", destination);
        Ok(Self {
            fd: Some(fd),
            addr,
            stats: BridgeStats::new(destination),
        })
    }

    #[inline]
    fn transmit(&mut self, packet: &WirePacket) {
        let Some(fd) = &self.fd else {
            self.stats.record_dropped();
            return;
        };
        match sendto(
            fd.as_raw_fd(),
            packet.as_bytes(),
            &self.addr,
            MsgFlags::MSG_DONTWAIT,
        ) {
            Ok(PACKET_SIZE) => self.stats.record_sent(),
            _ => self.stats.record_dropped(),
        }
    }

    fn send_levels(
        &mut self,
        template: &mut WirePacket,
        side: Side,
        levels: &[BookLevel],
        qty_scale: u64,
    ) {
        template.side = side.into();
        for level in levels {
            template.price = F64::new(level.price);
            template.quantity = U64::new(scale_quantity(level.size, qty_scale));
            self.transmit(template);
        }
    }
}

impl AcceleratedSender for NativeSender {
    fn send_book(
        &mut self,
        symbol: &str,
        bids: &[BookLevel],
        asks: &[BookLevel],
        timestamp_ns: u64,
        qty_scale: u64,
    ) {
        let mut template = WirePacket::from_encoded_symbol(
            encode_symbol(symbol),
            Side::Buy,
            PacketKind::BookLevel,
            0.0,
            0,
            timestamp_ns,
            NO_ORDER_ID,
        );
        self.send_levels(&mut template, Side::Buy, bids, qty_scale);
        self.send_levels(&mut template, Side::Sell, asks, qty_scale);
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
        let packet = WirePacket::new(
            symbol,
            side,
            PacketKind::Trade,
            price,
            scale_quantity(size, qty_scale),
            timestamp_ns,
            order_id,
        );
        self.transmit(&packet);
    }

    fn stats(&self) -> Result<BridgeStats, AdapterError> {
        Ok(self.stats.clone())
    }

    fn close(&mut self) -> Result<(), AdapterError> {
        // Dropping the OwnedFd closes the descriptor
        self.fd = None;
        self.stats.active = false;
        Ok(())
    }
}
