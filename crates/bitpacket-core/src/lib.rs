//! bitpacket core library for hex-encoded packet transmissions.
//!
//! This crate implements the decoding pipeline used by the CLI: a hex source
//! feeds a bit cursor, the transmission decoder (layout/reader/parser) turns
//! the bits into a packet tree, and the evaluator reduces that tree to a
//! version sum and a value collected into a deterministic report.
//! Decoding and evaluation are side-effect free; all I/O is isolated in the
//! `source` module. Bit widths and type ids live in `transmission::layout` so
//! the parser and writer stay minimal and agree with each other.
//!
//! Invariants:
//! - The bit cursor only moves forward and never reads past the last nibble.
//! - Each packet decode consumes exactly the bits of that packet.
//! - Evaluation uses unbounded integers; sums and products never wrap.
//!
//! # Examples
//! ```
//! use bitpacket_core::{decode_hex, evaluate, sum_versions};
//!
//! let packets = decode_hex("8A004A801A8002F478")?;
//! assert_eq!(sum_versions(&packets), 16);
//! assert_eq!(evaluate(&packets[0])?.to_string(), "15");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::{Deserialize, Serialize};

mod analysis;
mod eval;
mod packet;
mod source;
pub mod transmission;

pub use analysis::{
    AnalysisError, AnalysisOptions, INLINE_INPUT_LABEL, analyze_hex, analyze_hex_file,
    analyze_source,
};
pub use eval::{EvalError, evaluate, sum_versions};
pub use packet::{OperatorKind, Packet, PacketHeader, TreeStats, tree_stats};
pub use source::{HexFileSource, HexPayload, HexSource, HexStrSource, SourceError};
pub use transmission::error::{DecodeError, EncodeError};
pub use transmission::{
    BitReader, BitWriter, LengthPolicy, decode_all, decode_hex, decode_packet, encode_hex,
    encode_packet,
};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;
/// Default timestamp used when the input has no modification time.
pub const DEFAULT_GENERATED_AT: &str = "1970-01-01T00:00:00Z";

/// Decoding and evaluation report for one transmission.
///
/// # Examples
/// ```
/// use bitpacket_core::make_stub_report;
///
/// let report = make_stub_report("input.hex", 6);
/// assert_eq!(report.report_version, bitpacket_core::REPORT_VERSION);
/// assert_eq!(report.input.bits, 24);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    /// Tool identification metadata.
    pub tool: ToolInfo,
    /// RFC3339 timestamp: input modification time, or the epoch.
    pub generated_at: String,

    /// Input transmission metadata.
    pub input: InputInfo,

    /// Packets found at the top level of the stream.
    pub packets_top_level: u64,
    /// Packets in the whole forest, nested ones included.
    pub packets_total: u64,
    pub literals: u64,
    pub operators: u64,
    /// Deepest nesting level (a lone literal is 1).
    pub max_depth: u64,
    /// Sum of every packet version.
    pub version_sum: u64,
    /// Value of the first top-level packet, in decimal.
    pub value: String,
    /// Decoded packet tree, when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packets: Option<Vec<Packet>>,
}

/// Tool metadata embedded in reports.
///
/// # Examples
/// ```
/// use bitpacket_core::ToolInfo;
///
/// let tool = ToolInfo {
///     name: "bitpacket".to_string(),
///     version: "0.1.0".to_string(),
/// };
/// assert_eq!(tool.name, "bitpacket");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Tool name (e.g., "bitpacket").
    pub name: String,
    /// Tool version (semver).
    pub version: String,
}

/// Input metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputInfo {
    /// Input path as provided to the analyzer, or `<inline>`.
    pub path: String,
    /// Number of hex digits after trimming.
    pub nibbles: u64,
    /// Available bits (`nibbles * 4`).
    pub bits: u64,
}

/// Build a stub report with base fields filled and empty results.
pub fn make_stub_report(input_path: &str, input_nibbles: u64) -> Report {
    Report {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "bitpacket".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        generated_at: DEFAULT_GENERATED_AT.to_string(),
        input: InputInfo {
            path: input_path.to_string(),
            nibbles: input_nibbles,
            bits: input_nibbles * transmission::layout::BITS_PER_NIBBLE as u64,
        },
        packets_top_level: 0,
        packets_total: 0,
        literals: 0,
        operators: 0,
        max_depth: 0,
        version_sum: 0,
        value: "0".to_string(),
        packets: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_omits_tree_when_none() {
        let report = make_stub_report("input.hex", 4);
        let value = serde_json::to_value(&report).expect("report json");
        assert!(value.get("packets").is_none());
        assert_eq!(value["input"]["bits"], 16);
        assert_eq!(value["value"], "0");
    }

    #[test]
    fn report_tree_round_trips_through_json() {
        let mut report = make_stub_report("input.hex", 6);
        report.packets = Some(vec![Packet::operator(
            1,
            OperatorKind::LessThan,
            vec![Packet::literal(6, 10u32), Packet::literal(2, 20u32)],
        )]);

        let json = serde_json::to_string(&report).expect("report json");
        let back: Report = serde_json::from_str(&json).expect("report from json");
        assert_eq!(back.packets, report.packets);

        let value: serde_json::Value = serde_json::from_str(&json).expect("json value");
        let root = &value["packets"][0];
        assert_eq!(root["shape"], "operator");
        assert_eq!(root["kind"], "less_than");
        assert_eq!(root["children"][1]["value"], "20");
    }
}
