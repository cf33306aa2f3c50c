use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use bitpacket_core::{AnalysisOptions, DEFAULT_GENERATED_AT, analyze_hex_file};

fn main() -> ExitCode {
    if let Err(err) = run() {
        eprintln!("error: {}", err);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn run() -> Result<(), String> {
    let root = PathBuf::from("tests").join("golden");
    let entries =
        fs::read_dir(&root).map_err(|err| format!("failed to read {}: {}", root.display(), err))?;

    for entry in entries {
        let entry = entry.map_err(|err| format!("failed to read entry: {}", err))?;
        let case_dir = entry.path();
        let input = case_dir.join("input.hex");
        if !case_dir.is_dir() || !input.exists() {
            continue;
        }
        regenerate_one(&input, &case_dir.join("expected_report.json"))?;
    }

    Ok(())
}

fn regenerate_one(input: &Path, output: &Path) -> Result<(), String> {
    let mut report = analyze_hex_file(input, AnalysisOptions::default())
        .map_err(|err| format!("analysis failed for {}: {}", input.display(), err))?;
    // File mtimes differ between checkouts; keep fixtures stable.
    report.generated_at = DEFAULT_GENERATED_AT.to_string();
    let json = serde_json::to_string(&report)
        .map_err(|err| format!("JSON serialization failed: {}", err))?;
    fs::write(output, json)
        .map_err(|err| format!("failed to write {}: {}", output.display(), err))?;
    Ok(())
}
