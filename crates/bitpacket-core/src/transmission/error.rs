use thiserror::Error;

/// Errors returned by bit reading and packet decoding.
///
/// # Examples
/// ```
/// use bitpacket_core::DecodeError;
///
/// let err = DecodeError::OutOfBounds { requested: 4, position: 22, bit_len: 24 };
/// assert!(err.to_string().contains("out of bounds"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("read out of bounds: need {requested} bits at offset {position}, stream has {bit_len}")]
    OutOfBounds {
        requested: u32,
        position: usize,
        bit_len: usize,
    },
    #[error("malformed subpacket length: declared {declared} bits, consumed {consumed}")]
    MalformedSubpacketLength { declared: usize, consumed: usize },
    #[error("unknown packet kind: type id {type_id}")]
    UnknownPacketKind { type_id: u8 },
    #[error("invalid bit count: {count} (expected 1..=32)")]
    InvalidBitCount { count: u32 },
    #[error("invalid hex input: {0}")]
    InvalidHex(String),
}

impl From<hex::FromHexError> for DecodeError {
    fn from(value: hex::FromHexError) -> Self {
        DecodeError::InvalidHex(value.to_string())
    }
}

/// Errors returned by packet encoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("{field} value {value} does not fit in {width} bits")]
    FieldOverflow {
        field: &'static str,
        value: u64,
        width: u32,
    },
}
