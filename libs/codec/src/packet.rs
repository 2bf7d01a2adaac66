//! Wire packet layout and encoding
//!
//! One [`WirePacket`] is one datagram. The struct is `repr(C)` with only
//! byte-aligned fields, so `as_bytes()` is the exact little-endian image the
//! engine reads, independent of host endianness or alignment.

use crate::constants::{
    MAX_SYMBOL_BYTES, NO_ORDER_ID, PACKET_SIZE, QTY_SCALE, RESERVED_LEN, SYMBOL_LEN,
};
use crate::error::CodecError;
use bridge_types::{BookLevel, BookPayload, TradePayload};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use zerocopy::byteorder::{LittleEndian, F64, U64};
use zerocopy::{AsBytes, FromBytes, FromZeroes};

/// Book side / trade aggressor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum Side {
    Buy = 0,
    Sell = 1,
}

impl Side {
    /// Map a venue side label: `"buy"` is a buy, anything else is a sell
    #[inline]
    pub fn from_label(label: &str) -> Self {
        if label == "buy" {
            Side::Buy
        } else {
            Side::Sell
        }
    }
}

/// Packet event type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum PacketKind {
    BookLevel = 0,
    Trade = 1,
}

/// Market data packet exchanged with the engine
///
/// ```text
/// offset  size  field
///      0    16  symbol (ASCII, NUL padded)
///     16     1  side
///     17     1  event_type
///     18     6  reserved
///     24     8  price (f64)
///     32     8  quantity (u64 lots)
///     40     8  timestamp_ns (u64)
///     48     8  order_id (u64)
/// ```
#[repr(C)]
#[derive(Debug, Clone, Copy, AsBytes, FromBytes, FromZeroes)]
pub struct WirePacket {
    pub symbol: [u8; SYMBOL_LEN],
    pub side: u8,
    pub event_type: u8,
    pub reserved: [u8; RESERVED_LEN],
    pub price: F64<LittleEndian>,
    pub quantity: U64<LittleEndian>,
    pub timestamp_ns: U64<LittleEndian>,
    pub order_id: U64<LittleEndian>,
}

const _: () = assert!(std::mem::size_of::<WirePacket>() == PACKET_SIZE);
const _: () = assert!(std::mem::align_of::<WirePacket>() == 1);

impl WirePacket {
    pub fn new(
        symbol: &str,
        side: Side,
        kind: PacketKind,
        price: f64,
        quantity: u64,
        timestamp_ns: u64,
        order_id: u64,
    ) -> Self {
        Self::from_encoded_symbol(
            encode_symbol(symbol),
            side,
            kind,
            price,
            quantity,
            timestamp_ns,
            order_id,
        )
    }

    /// Build from an already encoded symbol field
    ///
    /// Senders that emit many packets per event encode the symbol once.
    pub fn from_encoded_symbol(
        symbol: [u8; SYMBOL_LEN],
        side: Side,
        kind: PacketKind,
        price: f64,
        quantity: u64,
        timestamp_ns: u64,
        order_id: u64,
    ) -> Self {
        Self {
            symbol,
            side: side.into(),
            event_type: kind.into(),
            reserved: [0; RESERVED_LEN],
            price: F64::new(price),
            quantity: U64::new(quantity),
            timestamp_ns: U64::new(timestamp_ns),
            order_id: U64::new(order_id),
        }
    }

    /// One book level, quantity scaled by [`QTY_SCALE`]
    pub fn book_level(symbol: &str, side: Side, level: &BookLevel, timestamp_ns: u64) -> Self {
        Self::new(
            symbol,
            side,
            PacketKind::BookLevel,
            level.price,
            scale_quantity(level.size, QTY_SCALE),
            timestamp_ns,
            NO_ORDER_ID,
        )
    }

    /// One trade print, quantity scaled by [`QTY_SCALE`]
    pub fn trade(symbol: &str, trade: &TradePayload, timestamp_ns: u64) -> Self {
        Self::new(
            symbol,
            Side::from_label(&trade.side),
            PacketKind::Trade,
            trade.price,
            scale_quantity(trade.size, QTY_SCALE),
            timestamp_ns,
            NO_ORDER_ID,
        )
    }

    /// Parse a received datagram
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let packet = Self::read_from(bytes).ok_or(CodecError::InvalidLength {
            expected: PACKET_SIZE,
            got: bytes.len(),
        })?;
        packet.side()?;
        packet.kind()?;
        Ok(packet)
    }

    /// Symbol with trailing NUL padding stripped
    pub fn symbol_str(&self) -> String {
        let end = self
            .symbol
            .iter()
            .rposition(|&b| b != 0)
            .map_or(0, |last| last + 1);
        String::from_utf8_lossy(&self.symbol[..end]).into_owned()
    }

    pub fn side(&self) -> Result<Side, CodecError> {
        Side::try_from(self.side).map_err(|_| CodecError::UnknownSide(self.side))
    }

    pub fn kind(&self) -> Result<PacketKind, CodecError> {
        PacketKind::try_from(self.event_type).map_err(|_| CodecError::UnknownKind(self.event_type))
    }

    #[inline]
    pub fn price(&self) -> f64 {
        self.price.get()
    }

    #[inline]
    pub fn quantity(&self) -> u64 {
        self.quantity.get()
    }

    #[inline]
    pub fn timestamp_ns(&self) -> u64 {
        self.timestamp_ns.get()
    }

    #[inline]
    pub fn order_id(&self) -> u64 {
        self.order_id.get()
    }
}

/// Encode a symbol into the fixed-width field
///
/// Keeps at most [`MAX_SYMBOL_BYTES`] ASCII bytes; non-ASCII bytes are dropped
/// and the remainder is NUL padded. Never fails.
pub fn encode_symbol(symbol: &str) -> [u8; SYMBOL_LEN] {
    let mut field = [0u8; SYMBOL_LEN];
    let ascii = symbol.bytes().filter(u8::is_ascii).take(MAX_SYMBOL_BYTES);
    for (slot, byte) in field.iter_mut().zip(ascii) {
        *slot = byte;
    }
    field
}

/// Convert a float size into integer lots
///
/// Truncates toward zero. NaN and negative sizes give 0, values past
/// `u64::MAX` saturate.
#[inline]
pub fn scale_quantity(size: f64, scale: u64) -> u64 {
    (size * scale as f64) as u64
}

/// Packets for a book snapshot: every bid (buy side) then every ask (sell side)
pub fn book_packets<'a>(
    symbol: &str,
    book: &'a BookPayload,
    timestamp_ns: u64,
) -> impl Iterator<Item = WirePacket> + 'a {
    let encoded = encode_symbol(symbol);
    let level_packet = move |side: Side, level: &BookLevel| {
        WirePacket::from_encoded_symbol(
            encoded,
            side,
            PacketKind::BookLevel,
            level.price,
            scale_quantity(level.size, QTY_SCALE),
            timestamp_ns,
            NO_ORDER_ID,
        )
    };
    let bids = book.bids.iter().map(move |level| level_packet(Side::Buy, level));
    let asks = book.asks.iter().map(move |level| level_packet(Side::Sell, level));
    bids.chain(asks)
}
