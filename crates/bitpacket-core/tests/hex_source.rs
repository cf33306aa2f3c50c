use std::fs;

use bitpacket_core::{
    AnalysisError, AnalysisOptions, DecodeError, HexFileSource, HexSource, SourceError,
    analyze_hex_file,
};
use tempfile::TempDir;

#[test]
fn hex_file_source_trims_trailing_newline() {
    let temp = TempDir::new().expect("tempdir");
    let path = temp.path().join("input.hex");
    fs::write(&path, "C200B40A82\n").expect("write input");

    let mut source = HexFileSource::open(&path).expect("open source");
    let payload = source.read_hex().expect("read hex");
    assert_eq!(payload.hex, "C200B40A82");
    assert!(payload.modified.is_some());

    let again = source.read_hex().expect("read hex twice");
    assert_eq!(again.hex, payload.hex);
}

#[test]
fn hex_file_source_rejects_missing_file() {
    let temp = TempDir::new().expect("tempdir");
    let err = match HexFileSource::open(&temp.path().join("missing.hex")) {
        Ok(_) => panic!("expected missing file to be rejected"),
        Err(err) => err,
    };
    assert!(matches!(err, SourceError::Io(_)));
}

#[test]
fn truncated_file_reports_out_of_bounds() {
    let temp = TempDir::new().expect("tempdir");
    let path = temp.path().join("truncated.hex");
    fs::write(&path, "D2FE\n").expect("write input");

    let err = analyze_hex_file(&path, AnalysisOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        AnalysisError::Decode(DecodeError::OutOfBounds { .. })
    ));
}

#[test]
fn report_generated_at_follows_file_mtime() {
    let temp = TempDir::new().expect("tempdir");
    let path = temp.path().join("input.hex");
    fs::write(&path, "D2FE28").expect("write input");

    let report = analyze_hex_file(&path, AnalysisOptions::default()).expect("analyze hex");
    assert_ne!(report.generated_at, bitpacket_core::DEFAULT_GENERATED_AT);
    assert!(report.generated_at.ends_with('Z'));
}
