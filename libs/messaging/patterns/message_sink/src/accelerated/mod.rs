//! Accelerated sender seam
//!
//! An accelerated sender is an alternative implementation of the same packet
//! contract, usually tuned for lower per-packet overhead. It is obtained
//! through an [`AdapterLoader`] at resolution time and may be absent, in which
//! case the bridge uses the portable fallback. Both produce byte-identical
//! datagrams for the same input.

#[cfg(all(feature = "native", target_os = "linux"))]
mod native;

#[cfg(all(feature = "native", target_os = "linux"))]
pub use native::{NativeLoader, NativeSender, NATIVE_LOADER};

use crate::error::AdapterError;
use crate::stats::BridgeStats;
use bridge_codec::Side;
use bridge_types::BookLevel;
use std::fmt::Debug;
use std::path::Path;

/// Fast-path packet sender
///
/// Sends are fire-and-forget; delivery failures only show up in the counters
/// returned by [`AcceleratedSender::stats`].
pub trait AcceleratedSender: Send + Debug {
    /// One packet per level: every bid (buy side) then every ask (sell side)
    fn send_book(
        &mut self,
        symbol: &str,
        bids: &[BookLevel],
        asks: &[BookLevel],
        timestamp_ns: u64,
        qty_scale: u64,
    );

    #[allow(clippy::too_many_arguments)]
    fn send_trade(
        &mut self,
        symbol: &str,
        side: Side,
        price: f64,
        size: f64,
        timestamp_ns: u64,
        order_id: u64,
        qty_scale: u64,
    );

    fn stats(&self) -> Result<BridgeStats, AdapterError>;

    /// Release the channel. Later sends are counted as dropped.
    fn close(&mut self) -> Result<(), AdapterError>;
}

/// Produces an accelerated sender bound to a destination
pub trait AdapterLoader: Send + Sync + Debug {
    fn name(&self) -> &str;

    fn load(&self, destination: &Path) -> Result<Box<dyn AcceleratedSender>, AdapterError>;
}

/// Loaders compiled into this build, in preference order
pub fn default_loaders() -> Vec<Box<dyn AdapterLoader>> {
    #[allow(unused_mut)]
    let mut loaders: Vec<Box<dyn AdapterLoader>> = Vec::new();
    #[cfg(all(feature = "native", target_os = "linux"))]
    loaders.push(Box::new(NativeLoader));
    loaders
}
