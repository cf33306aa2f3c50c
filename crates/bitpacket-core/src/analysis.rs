use std::path::Path;
use std::time::SystemTime;

use thiserror::Error;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::eval::{EvalError, evaluate, sum_versions};
use crate::packet::tree_stats;
use crate::source::{HexFileSource, HexPayload, HexSource, HexStrSource, SourceError};
use crate::transmission::error::DecodeError;
use crate::transmission::{BitReader, decode_all};
use crate::{DEFAULT_GENERATED_AT, Report, make_stub_report};

/// Label used for transmissions that do not come from a file.
pub const INLINE_INPUT_LABEL: &str = "<inline>";

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
    #[error("Evaluation error: {0}")]
    Eval(#[from] EvalError),
    #[error("transmission contains no packets")]
    EmptyTransmission,
}

/// Knobs for report generation.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalysisOptions {
    /// Embed the decoded packet tree in the report.
    pub include_tree: bool,
}

pub fn analyze_hex_file(path: &Path, options: AnalysisOptions) -> Result<Report, AnalysisError> {
    let source = HexFileSource::open(path)?;
    analyze_source(&path.display().to_string(), source, options)
}

pub fn analyze_hex(hex: &str, options: AnalysisOptions) -> Result<Report, AnalysisError> {
    analyze_source(INLINE_INPUT_LABEL, HexStrSource::new(hex), options)
}

pub fn analyze_source<S: HexSource>(
    label: &str,
    mut source: S,
    options: AnalysisOptions,
) -> Result<Report, AnalysisError> {
    let HexPayload { hex, modified } = source.read_hex()?;
    let mut reader = BitReader::from_hex(&hex)?;
    let packets = decode_all(&mut reader)?;
    let root = packets.first().ok_or(AnalysisError::EmptyTransmission)?;
    let value = evaluate(root)?;
    let version_sum = sum_versions(&packets);
    let stats = tree_stats(&packets);

    log::info!(
        "{}: {} top-level packets, {} total, version sum {}",
        label,
        packets.len(),
        stats.packets_total,
        version_sum
    );

    let mut report = make_stub_report(label, hex.len() as u64);
    report.generated_at =
        systime_to_rfc3339(modified).unwrap_or_else(|| DEFAULT_GENERATED_AT.to_string());
    report.packets_top_level = packets.len() as u64;
    report.packets_total = stats.packets_total;
    report.literals = stats.literals;
    report.operators = stats.operators;
    report.max_depth = stats.max_depth;
    report.version_sum = version_sum;
    report.value = value.to_string();
    if options.include_tree {
        report.packets = Some(packets);
    }
    Ok(report)
}

fn systime_to_rfc3339(ts: Option<SystemTime>) -> Option<String> {
    let ts = ts?;
    OffsetDateTime::from(ts).format(&Rfc3339).ok()
}
