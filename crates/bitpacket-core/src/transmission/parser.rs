use num_bigint::BigUint;

use super::error::DecodeError;
use super::layout;
use super::reader::BitReader;
use crate::packet::{OperatorKind, Packet, PacketHeader};

/// How an operator declares the extent of its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthType {
    /// Children occupy exactly this many bits.
    TotalBitLength(usize),
    /// Exactly this many children follow.
    SubpacketCount(usize),
}

/// Decode every packet of a hex transmission.
pub fn decode_hex(hex_str: &str) -> Result<Vec<Packet>, DecodeError> {
    let mut reader = BitReader::from_hex(hex_str)?;
    decode_all(&mut reader)
}

/// Decode packets until only zero padding remains.
pub fn decode_all(reader: &mut BitReader) -> Result<Vec<Packet>, DecodeError> {
    let mut packets = Vec::new();
    while !reader.remaining_is_zero() {
        packets.push(decode_packet(reader)?);
    }
    Ok(packets)
}

/// Decode one packet, leaving the reader right after its last bit.
pub fn decode_packet(reader: &mut BitReader) -> Result<Packet, DecodeError> {
    let start = reader.position();
    let header = read_header(reader)?;

    let packet = if header.type_id == layout::LITERAL_TYPE_ID {
        let value = read_literal_value(reader)?;
        Packet::Literal { header, value }
    } else {
        let kind = OperatorKind::try_from(header.type_id)?;
        let length = read_length_type(reader)?;
        let children = read_children(reader, length)?;
        Packet::Operator {
            header,
            kind,
            children,
        }
    };

    log::debug!(
        "decoded packet v{} type {} at bit {} ({} bits)",
        header.version,
        header.type_id,
        start,
        reader.position() - start
    );
    Ok(packet)
}

fn read_header(reader: &mut BitReader) -> Result<PacketHeader, DecodeError> {
    let version = reader.read_bits(layout::VERSION_BITS)? as u8;
    let type_id = reader.read_bits(layout::TYPE_ID_BITS)? as u8;
    Ok(PacketHeader { version, type_id })
}

fn read_literal_value(reader: &mut BitReader) -> Result<BigUint, DecodeError> {
    let mut value = BigUint::default();
    loop {
        let more = reader.read_flag()?;
        let nibble = reader.read_bits(layout::LITERAL_NIBBLE_BITS)?;
        value = (value << layout::LITERAL_NIBBLE_BITS) | BigUint::from(nibble);
        if !more {
            return Ok(value);
        }
    }
}

pub(crate) fn read_length_type(reader: &mut BitReader) -> Result<LengthType, DecodeError> {
    let length_type = if reader.read_bits(layout::LENGTH_TYPE_BITS)? == layout::LENGTH_TYPE_TOTAL_BITS
    {
        LengthType::TotalBitLength(reader.read_bits(layout::TOTAL_BIT_LENGTH_BITS)? as usize)
    } else {
        LengthType::SubpacketCount(reader.read_bits(layout::SUBPACKET_COUNT_BITS)? as usize)
    };
    log::trace!("length descriptor {:?} at bit {}", length_type, reader.position());
    Ok(length_type)
}

fn read_children(reader: &mut BitReader, length: LengthType) -> Result<Vec<Packet>, DecodeError> {
    match length {
        LengthType::TotalBitLength(declared) => {
            let start = reader.position();
            let mut children = Vec::new();
            while reader.position() - start < declared {
                children.push(decode_packet(reader)?);
            }
            let consumed = reader.position() - start;
            if consumed != declared {
                return Err(DecodeError::MalformedSubpacketLength { declared, consumed });
            }
            Ok(children)
        }
        LengthType::SubpacketCount(count) => (0..count).map(|_| decode_packet(reader)).collect(),
    }
}
