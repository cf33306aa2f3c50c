//! Decoded packet tree.
//!
//! A transmission decodes into a forest of [`Packet`] values. Each packet is
//! either a literal carrying an unbounded integer or an operator owning an
//! ordered list of children. Trees are built once by the decoder and never
//! mutated afterwards.

use std::fmt;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::transmission::error::DecodeError;
use crate::transmission::layout;

/// Version and type id shared by every packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketHeader {
    /// 3-bit packet version (0-7).
    pub version: u8,
    /// 3-bit type id; 4 marks a literal.
    pub type_id: u8,
}

/// Operator semantics selected by the header type id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorKind {
    Sum,
    Product,
    Minimum,
    Maximum,
    GreaterThan,
    LessThan,
    EqualTo,
}

impl OperatorKind {
    pub fn type_id(self) -> u8 {
        match self {
            OperatorKind::Sum => 0,
            OperatorKind::Product => 1,
            OperatorKind::Minimum => 2,
            OperatorKind::Maximum => 3,
            OperatorKind::GreaterThan => 5,
            OperatorKind::LessThan => 6,
            OperatorKind::EqualTo => 7,
        }
    }

    /// Comparison operators take exactly two operands.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            OperatorKind::GreaterThan | OperatorKind::LessThan | OperatorKind::EqualTo
        )
    }

    fn as_str(self) -> &'static str {
        match self {
            OperatorKind::Sum => "sum",
            OperatorKind::Product => "product",
            OperatorKind::Minimum => "minimum",
            OperatorKind::Maximum => "maximum",
            OperatorKind::GreaterThan => "greater_than",
            OperatorKind::LessThan => "less_than",
            OperatorKind::EqualTo => "equal_to",
        }
    }
}

impl TryFrom<u8> for OperatorKind {
    type Error = DecodeError;

    fn try_from(type_id: u8) -> Result<Self, Self::Error> {
        match type_id {
            0 => Ok(OperatorKind::Sum),
            1 => Ok(OperatorKind::Product),
            2 => Ok(OperatorKind::Minimum),
            3 => Ok(OperatorKind::Maximum),
            5 => Ok(OperatorKind::GreaterThan),
            6 => Ok(OperatorKind::LessThan),
            7 => Ok(OperatorKind::EqualTo),
            _ => Err(DecodeError::UnknownPacketKind { type_id }),
        }
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded packet: a literal value or an operator over children.
///
/// # Examples
/// ```
/// use bitpacket_core::{OperatorKind, Packet};
///
/// let packet = Packet::operator(
///     1,
///     OperatorKind::Sum,
///     vec![Packet::literal(2, 1u32), Packet::literal(3, 2u32)],
/// );
/// assert_eq!(packet.type_id(), 0);
/// assert_eq!(packet.children().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Packet {
    Literal {
        header: PacketHeader,
        #[serde(with = "decimal")]
        value: BigUint,
    },
    Operator {
        header: PacketHeader,
        kind: OperatorKind,
        children: Vec<Packet>,
    },
}

impl Packet {
    pub fn literal(version: u8, value: impl Into<BigUint>) -> Self {
        Packet::Literal {
            header: PacketHeader {
                version,
                type_id: layout::LITERAL_TYPE_ID,
            },
            value: value.into(),
        }
    }

    pub fn operator(version: u8, kind: OperatorKind, children: Vec<Packet>) -> Self {
        Packet::Operator {
            header: PacketHeader {
                version,
                type_id: kind.type_id(),
            },
            kind,
            children,
        }
    }

    pub fn header(&self) -> &PacketHeader {
        match self {
            Packet::Literal { header, .. } | Packet::Operator { header, .. } => header,
        }
    }

    pub fn version(&self) -> u8 {
        self.header().version
    }

    pub fn type_id(&self) -> u8 {
        self.header().type_id
    }

    /// Children of an operator; empty for literals.
    pub fn children(&self) -> &[Packet] {
        match self {
            Packet::Literal { .. } => &[],
            Packet::Operator { children, .. } => children,
        }
    }
}

/// Shape counters for a decoded forest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    pub packets_total: u64,
    pub literals: u64,
    pub operators: u64,
    /// Nesting depth; a lone literal has depth 1.
    pub max_depth: u64,
}

pub fn tree_stats(packets: &[Packet]) -> TreeStats {
    let mut stats = TreeStats::default();
    for packet in packets {
        collect_stats(packet, 1, &mut stats);
    }
    stats
}

fn collect_stats(packet: &Packet, depth: u64, stats: &mut TreeStats) {
    stats.packets_total += 1;
    stats.max_depth = stats.max_depth.max(depth);
    match packet {
        Packet::Literal { .. } => stats.literals += 1,
        Packet::Operator { children, .. } => {
            stats.operators += 1;
            for child in children {
                collect_stats(child, depth + 1, stats);
            }
        }
    }
}

/// `BigUint` as a decimal string, so JSON consumers never lose precision.
pub(crate) mod decimal {
    use num_bigint::BigUint;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigUint, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse::<BigUint>().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_kind_maps_every_non_literal_type_id() {
        for type_id in [0u8, 1, 2, 3, 5, 6, 7] {
            let kind = OperatorKind::try_from(type_id).unwrap();
            assert_eq!(kind.type_id(), type_id);
        }
    }

    #[test]
    fn operator_kind_rejects_literal_and_wide_ids() {
        assert_eq!(
            OperatorKind::try_from(4),
            Err(DecodeError::UnknownPacketKind { type_id: 4 })
        );
        assert_eq!(
            OperatorKind::try_from(8),
            Err(DecodeError::UnknownPacketKind { type_id: 8 })
        );
    }

    #[test]
    fn tree_stats_counts_nested_shapes() {
        let forest = vec![
            Packet::operator(
                1,
                OperatorKind::Sum,
                vec![
                    Packet::literal(0, 1u32),
                    Packet::operator(2, OperatorKind::Product, vec![Packet::literal(3, 4u32)]),
                ],
            ),
            Packet::literal(5, 9u32),
        ];
        let stats = tree_stats(&forest);
        assert_eq!(stats.packets_total, 5);
        assert_eq!(stats.literals, 3);
        assert_eq!(stats.operators, 2);
        assert_eq!(stats.max_depth, 3);
    }

    #[test]
    fn literal_value_serializes_as_decimal_string() {
        let value = BigUint::from(u64::MAX) * BigUint::from(16u32);
        let packet = Packet::literal(6, value.clone());
        let json = serde_json::to_value(&packet).expect("packet json");
        assert_eq!(json["shape"], "literal");
        assert_eq!(json["value"], value.to_string());

        let back: Packet = serde_json::from_value(json).expect("packet from json");
        assert_eq!(back, packet);
    }
}
