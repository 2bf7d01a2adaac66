//! # Engine Bridge Codec
//!
//! Binary contract between the market-data pipeline and the trading engine.
//! Every normalized event leaves the pipeline as one or more fixed-size
//! [`WirePacket`]s, each sent as a single datagram.
//!
//! ## Layout
//!
//! `symbol[16] | side:u8 | event_type:u8 | reserved[6] | price:f64 |
//! quantity:u64 | timestamp_ns:u64 | order_id:u64`, little-endian,
//! [`PACKET_SIZE`] bytes. The engine maps the datagram straight onto its own
//! struct, so field order and widths are frozen; changes require a
//! [`WIRE_VERSION`] bump on both sides.
//!
//! ## Conversions
//!
//! - Symbols keep their first 15 ASCII bytes and are NUL padded
//! - Sizes become integer lots via [`scale_quantity`] (×10^8, truncated)
//! - Side labels map through [`Side::from_label`]
//!
//! ```rust
//! use bridge_codec::{PacketKind, Side, WirePacket, PACKET_SIZE};
//! use zerocopy::AsBytes;
//!
//! let packet = WirePacket::new("BTC-USDT", Side::Buy, PacketKind::Trade, 43000.5, 12_300_000, 1, 0);
//! assert_eq!(packet.as_bytes().len(), PACKET_SIZE);
//! ```

pub mod constants;
pub mod error;
pub mod packet;

pub use constants::*;
pub use error::CodecError;
pub use packet::{book_packets, encode_symbol, scale_quantity, PacketKind, Side, WirePacket};
