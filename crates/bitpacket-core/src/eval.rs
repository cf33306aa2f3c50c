//! Packet tree reduction.
//!
//! Both reductions are pure walks over an immutable tree: `sum_versions`
//! looks only at headers, `evaluate` applies operator semantics with
//! unbounded integers so sums and products never wrap.

use num_bigint::BigUint;
use num_traits::{One, Zero};
use thiserror::Error;

use crate::packet::{OperatorKind, Packet};

/// Errors returned by evaluation.
///
/// # Examples
/// ```
/// use bitpacket_core::{EvalError, OperatorKind};
///
/// let err = EvalError::Arity {
///     kind: OperatorKind::GreaterThan,
///     expected: "exactly 2",
///     actual: 3,
/// };
/// assert!(err.to_string().contains("greater_than"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("{kind} expects {expected} operands, got {actual}")]
    Arity {
        kind: OperatorKind,
        expected: &'static str,
        actual: usize,
    },
}

/// Sum of every header version across the forest, descendants included.
pub fn sum_versions(packets: &[Packet]) -> u64 {
    packets
        .iter()
        .map(|packet| u64::from(packet.version()) + sum_versions(packet.children()))
        .sum()
}

/// Reduce a packet to its value.
///
/// # Examples
/// ```
/// use bitpacket_core::{decode_hex, evaluate};
///
/// let packets = decode_hex("C200B40A82")?;
/// assert_eq!(evaluate(&packets[0])?.to_string(), "3");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn evaluate(packet: &Packet) -> Result<BigUint, EvalError> {
    let (kind, children) = match packet {
        Packet::Literal { value, .. } => return Ok(value.clone()),
        Packet::Operator { kind, children, .. } => (*kind, children),
    };

    let operands = children
        .iter()
        .map(evaluate)
        .collect::<Result<Vec<_>, _>>()?;

    match kind {
        OperatorKind::Sum => Ok(operands.into_iter().fold(BigUint::zero(), |acc, v| acc + v)),
        OperatorKind::Product => Ok(operands.into_iter().fold(BigUint::one(), |acc, v| acc * v)),
        OperatorKind::Minimum => operands
            .into_iter()
            .min()
            .ok_or_else(|| at_least_one(kind)),
        OperatorKind::Maximum => operands
            .into_iter()
            .max()
            .ok_or_else(|| at_least_one(kind)),
        OperatorKind::GreaterThan | OperatorKind::LessThan | OperatorKind::EqualTo => {
            let [left, right] = <[BigUint; 2]>::try_from(operands).map_err(|operands| {
                EvalError::Arity {
                    kind,
                    expected: "exactly 2",
                    actual: operands.len(),
                }
            })?;
            let holds = match kind {
                OperatorKind::GreaterThan => left > right,
                OperatorKind::LessThan => left < right,
                _ => left == right,
            };
            Ok(if holds { BigUint::one() } else { BigUint::zero() })
        }
    }
}

fn at_least_one(kind: OperatorKind) -> EvalError {
    EvalError::Arity {
        kind,
        expected: "at least 1",
        actual: 0,
    }
}
