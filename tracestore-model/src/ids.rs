use std::fmt;
use std::num::ParseIntError;

use thiserror::Error;

/// A 128-bit trace identifier, represented as two big-endian `u64` halves.
///
/// Jaeger and its storage backends have always carried trace ids this way on
/// the wire and in query parameters, so the split representation is kept
/// here rather than collapsing it into a single `u128` the way
/// `opentelemetry::trace::TraceId` does.
///
/// The all-zero id (`high == 0 && low == 0`) is reserved as the "absent /
/// not found" sentinel; `GetTrace` on that id always returns
/// [`crate::StorageNotFound`]-shaped errors regardless of backend state.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TraceId {
    high: u64,
    low: u64,
}

impl TraceId {
    /// The reserved "absent" trace id.
    pub const INVALID: TraceId = TraceId { high: 0, low: 0 };

    /// Construct a trace id from its two halves.
    pub const fn new(high: u64, low: u64) -> Self {
        TraceId { high, low }
    }

    /// The high 64 bits.
    pub const fn high(&self) -> u64 {
        self.high
    }

    /// The low 64 bits.
    pub const fn low(&self) -> u64 {
        self.low
    }

    /// True unless this is the reserved all-zero sentinel.
    pub const fn is_valid(&self) -> bool {
        self.high != 0 || self.low != 0
    }

    /// Construct a trace id from its 16-byte big-endian representation.
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        let mut high_bytes = [0u8; 8];
        let mut low_bytes = [0u8; 8];
        high_bytes.copy_from_slice(&bytes[0..8]);
        low_bytes.copy_from_slice(&bytes[8..16]);
        TraceId {
            high: u64::from_be_bytes(high_bytes),
            low: u64::from_be_bytes(low_bytes),
        }
    }

    /// Return the 16-byte big-endian representation.
    pub fn to_bytes(self) -> [u8; 16] {
        let mut out = [0u8; 16];
        out[0..8].copy_from_slice(&self.high.to_be_bytes());
        out[8..16].copy_from_slice(&self.low.to_be_bytes());
        out
    }

    /// Parse a trace id from a hex string of up to 32 characters. Shorter
    /// strings are treated as having an implicit zero high half when 16
    /// characters or fewer, matching Jaeger's historical 64-bit trace ids.
    pub fn from_hex(hex: &str) -> Result<Self, TraceIdParseError> {
        if hex.is_empty() || hex.len() > 32 {
            return Err(TraceIdParseError::Length(hex.len()));
        }
        if hex.len() <= 16 {
            let low = u64::from_str_radix(hex, 16)?;
            return Ok(TraceId { high: 0, low });
        }
        let split = hex.len() - 16;
        let high = u64::from_str_radix(&hex[..split], 16)?;
        let low = u64::from_str_radix(&hex[split..], 16)?;
        Ok(TraceId { high, low })
    }
}

/// Error returned when parsing a [`TraceId`] or [`SpanId`] from text fails.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TraceIdParseError {
    /// The hex string was empty or longer than the id allows.
    #[error("trace id hex string has invalid length {0}")]
    Length(usize),
    /// The string was not valid hexadecimal.
    #[error("invalid hex digits in id: {0}")]
    Hex(#[from] ParseIntError),
}

impl fmt::Debug for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}{:016x}", self.high, self.low)
    }
}

/// A 64-bit span identifier, unique within the trace it belongs to.
///
/// The all-zero id is reserved as "no span" (used e.g. for a root span's
/// missing parent).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpanId(u64);

impl SpanId {
    /// The reserved "absent" span id.
    pub const INVALID: SpanId = SpanId(0);

    /// Construct a span id from a raw `u64`.
    pub const fn new(id: u64) -> Self {
        SpanId(id)
    }

    /// The raw numeric value.
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// True unless this is the reserved all-zero sentinel.
    pub const fn is_valid(&self) -> bool {
        self.0 != 0
    }

    /// Construct a span id from its 8-byte big-endian representation.
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        SpanId(u64::from_be_bytes(bytes))
    }

    /// Return the 8-byte big-endian representation.
    pub fn to_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    /// Parse a span id from a hex string.
    pub fn from_hex(hex: &str) -> Result<Self, TraceIdParseError> {
        if hex.is_empty() || hex.len() > 16 {
            return Err(TraceIdParseError::Length(hex.len()));
        }
        Ok(SpanId(u64::from_str_radix(hex, 16)?))
    }
}

impl From<u64> for SpanId {
    fn from(value: u64) -> Self {
        SpanId(value)
    }
}

impl fmt::Debug for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_id_round_trips_through_bytes() {
        let id = TraceId::new(0x0123_4567_89ab_cdef, 0xfedc_ba98_7654_3210);
        assert_eq!(TraceId::from_bytes(id.to_bytes()), id);
    }

    #[test]
    fn trace_id_invalid_is_zero() {
        assert!(!TraceId::INVALID.is_valid());
        assert_eq!(TraceId::new(0, 0), TraceId::INVALID);
        assert!(TraceId::new(0, 1).is_valid());
    }

    #[test]
    fn trace_id_from_hex_pads_short_strings_as_low_bits() {
        let short = TraceId::from_hex("2a").unwrap();
        assert_eq!(short, TraceId::new(0, 0x2a));
    }

    #[test]
    fn trace_id_from_hex_rejects_overlong_strings() {
        let too_long = "0".repeat(33);
        assert!(matches!(
            TraceId::from_hex(&too_long),
            Err(TraceIdParseError::Length(33))
        ));
    }

    #[test]
    fn trace_id_display_is_32_hex_chars() {
        let id = TraceId::new(1, 2);
        assert_eq!(format!("{id}"), "00000000000000010000000000000002");
    }

    #[test]
    fn span_id_round_trips() {
        let id = SpanId::new(0x1122_3344_5566_7788);
        assert_eq!(SpanId::from_bytes(id.to_bytes()), id);
        assert_eq!(format!("{id}"), "1122334455667788");
    }

    #[test]
    fn span_id_invalid_is_zero() {
        assert!(!SpanId::INVALID.is_valid());
        assert!(SpanId::new(1).is_valid());
    }
}
