use num_bigint::BigUint;
use num_traits::Zero;

use super::error::EncodeError;
use super::layout;
use crate::packet::Packet;

/// Operator length scheme used when encoding.
///
/// Decoded trees do not remember which scheme each operator used, so the
/// encoder applies one policy to every operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LengthPolicy {
    #[default]
    TotalBitLength,
    SubpacketCount,
}

/// Writes bits MSB-first into a byte buffer, zero-padding the last byte.
#[derive(Debug, Clone, Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    bit_len: usize,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the lowest `count` bits of `value` (`count` <= 32).
    pub fn write_bits(&mut self, value: u32, count: u32) {
        for shift in (0..count.min(layout::MAX_READ_BITS)).rev() {
            self.push_bit(((value >> shift) & 1) == 1);
        }
    }

    /// Append every bit written to `other`.
    pub fn append(&mut self, other: &BitWriter) {
        for idx in 0..other.bit_len {
            self.push_bit((other.bytes[idx / 8] & (0x80 >> (idx % 8))) != 0);
        }
    }

    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Uppercase hex, one digit per started nibble.
    pub fn to_hex(&self) -> String {
        let nibbles = self.bit_len.div_ceil(layout::BITS_PER_NIBBLE);
        let mut out = hex::encode_upper(&self.bytes);
        out.truncate(nibbles);
        out
    }

    fn push_bit(&mut self, bit: bool) {
        let bit_offset = self.bit_len % 8;
        if bit_offset == 0 {
            self.bytes.push(0);
        }
        if bit {
            if let Some(last) = self.bytes.last_mut() {
                *last |= 0x80 >> bit_offset;
            }
        }
        self.bit_len += 1;
    }
}

/// Encode a forest back into a hex transmission.
///
/// # Examples
/// ```
/// use bitpacket_core::{LengthPolicy, Packet, encode_hex};
///
/// let hex = encode_hex(&[Packet::literal(6, 2021u32)], LengthPolicy::default())?;
/// assert_eq!(hex, "D2FE28");
/// # Ok::<(), bitpacket_core::EncodeError>(())
/// ```
pub fn encode_hex(packets: &[Packet], policy: LengthPolicy) -> Result<String, EncodeError> {
    let mut writer = BitWriter::new();
    for packet in packets {
        encode_packet(&mut writer, packet, policy)?;
    }
    Ok(writer.to_hex())
}

pub fn encode_packet(
    writer: &mut BitWriter,
    packet: &Packet,
    policy: LengthPolicy,
) -> Result<(), EncodeError> {
    let header = packet.header();
    write_field(writer, "version", u64::from(header.version), layout::VERSION_BITS)?;
    write_field(writer, "type id", u64::from(header.type_id), layout::TYPE_ID_BITS)?;

    match packet {
        Packet::Literal { value, .. } => {
            write_literal_value(writer, value);
            Ok(())
        }
        Packet::Operator { children, .. } => {
            let mut body = BitWriter::new();
            for child in children {
                encode_packet(&mut body, child, policy)?;
            }
            match policy {
                LengthPolicy::TotalBitLength => {
                    writer.write_bits(layout::LENGTH_TYPE_TOTAL_BITS, layout::LENGTH_TYPE_BITS);
                    write_field(
                        writer,
                        "subpacket bit length",
                        body.bit_len() as u64,
                        layout::TOTAL_BIT_LENGTH_BITS,
                    )?;
                }
                LengthPolicy::SubpacketCount => {
                    writer.write_bits(
                        layout::LENGTH_TYPE_SUBPACKET_COUNT,
                        layout::LENGTH_TYPE_BITS,
                    );
                    write_field(
                        writer,
                        "subpacket count",
                        children.len() as u64,
                        layout::SUBPACKET_COUNT_BITS,
                    )?;
                }
            }
            writer.append(&body);
            Ok(())
        }
    }
}

fn write_field(
    writer: &mut BitWriter,
    field: &'static str,
    value: u64,
    width: u32,
) -> Result<(), EncodeError> {
    if value > layout::max_field_value(width) {
        return Err(EncodeError::FieldOverflow {
            field,
            value,
            width,
        });
    }
    writer.write_bits(value as u32, width);
    Ok(())
}

fn write_literal_value(writer: &mut BitWriter, value: &BigUint) {
    let nibbles = if value.is_zero() {
        vec![0]
    } else {
        value.to_radix_be(16)
    };
    let last = nibbles.len() - 1;
    for (idx, nibble) in nibbles.iter().enumerate() {
        let more = u32::from(idx != last);
        writer.write_bits(more, layout::LITERAL_CONTINUE_BITS);
        writer.write_bits(u32::from(*nibble), layout::LITERAL_NIBBLE_BITS);
    }
}

#[cfg(test)]
mod tests {
    use num_bigint::BigUint;

    use super::{BitWriter, LengthPolicy, encode_hex, encode_packet};
    use crate::packet::{OperatorKind, Packet, PacketHeader};
    use crate::transmission::error::EncodeError;
    use crate::transmission::parser::{decode_hex, decode_packet};
    use crate::transmission::reader::BitReader;

    fn strip_padding(hex: &str) -> &str {
        hex.trim_end_matches('0')
    }

    #[test]
    fn writer_packs_msb_first() {
        let mut writer = BitWriter::new();
        writer.write_bits(0b101, 3);
        writer.write_bits(0b11, 2);
        assert_eq!(writer.as_bytes(), &[0b1011_1000]);
        assert_eq!(writer.bit_len(), 5);
        assert_eq!(writer.to_hex(), "B8");
    }

    #[test]
    fn append_preserves_unaligned_bits() {
        let mut tail = BitWriter::new();
        tail.write_bits(0b1_0110, 5);

        let mut writer = BitWriter::new();
        writer.write_bits(0b11, 2);
        writer.append(&tail);
        assert_eq!(writer.bit_len(), 7);
        assert_eq!(writer.as_bytes(), &[0b1110_1100]);
    }

    #[test]
    fn round_trip_total_bit_length_operator() {
        let packets = decode_hex("38006F45291200").unwrap();
        let hex = encode_hex(&packets, LengthPolicy::TotalBitLength).unwrap();
        assert_eq!(strip_padding(&hex), strip_padding("38006F45291200"));
    }

    #[test]
    fn round_trip_subpacket_count_operator() {
        let packets = decode_hex("EE00D40C823060").unwrap();
        let hex = encode_hex(&packets, LengthPolicy::SubpacketCount).unwrap();
        assert_eq!(strip_padding(&hex), strip_padding("EE00D40C823060"));
    }

    #[test]
    fn re_encoded_tree_decodes_to_same_tree() {
        for input in [
            "8A004A801A8002F478",
            "620080001611562C8802118E34",
            "C0015000016115A2E0802F182340",
            "A0016C880162017C3686B18A3D4780",
            "9C0141080250320F1802104A08",
        ] {
            let packets = decode_hex(input).unwrap();
            for policy in [LengthPolicy::TotalBitLength, LengthPolicy::SubpacketCount] {
                let hex = encode_hex(&packets, policy).unwrap();
                assert_eq!(decode_hex(&hex).unwrap(), packets, "{input} via {policy:?}");
            }
        }
    }

    #[test]
    fn zero_literal_uses_one_group() {
        let mut writer = BitWriter::new();
        encode_packet(&mut writer, &Packet::literal(0, 0u32), LengthPolicy::default()).unwrap();
        assert_eq!(writer.bit_len(), 11);

        let mut reader = BitReader::with_bit_len(writer.as_bytes().to_vec(), writer.bit_len());
        assert_eq!(decode_packet(&mut reader).unwrap(), Packet::literal(0, 0u32));
    }

    #[test]
    fn large_literal_round_trips() {
        let value = BigUint::from(u64::MAX) * BigUint::from(u64::MAX);
        let packet = Packet::operator(
            3,
            OperatorKind::Product,
            vec![Packet::literal(1, value.clone()), Packet::literal(2, 1u32)],
        );
        let hex = encode_hex(std::slice::from_ref(&packet), LengthPolicy::default()).unwrap();
        assert_eq!(decode_hex(&hex).unwrap(), vec![packet]);
    }

    #[test]
    fn version_wider_than_three_bits_overflows() {
        let packet = Packet::Literal {
            header: PacketHeader {
                version: 8,
                type_id: 4,
            },
            value: BigUint::from(1u32),
        };
        let err = encode_hex(&[packet], LengthPolicy::default()).unwrap_err();
        assert_eq!(
            err,
            EncodeError::FieldOverflow {
                field: "version",
                value: 8,
                width: 3,
            }
        );
    }

    #[test]
    fn too_many_children_for_count_field_overflows() {
        let children = (0..2048).map(|_| Packet::literal(0, 1u32)).collect();
        let packet = Packet::operator(0, OperatorKind::Sum, children);
        let err = encode_hex(&[packet], LengthPolicy::SubpacketCount).unwrap_err();
        assert!(matches!(
            err,
            EncodeError::FieldOverflow {
                field: "subpacket count",
                ..
            }
        ));
    }
}
