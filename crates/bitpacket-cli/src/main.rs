use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use bitpacket_core::{AnalysisError, AnalysisOptions, DecodeError, EvalError, Report};
use clap::{Parser, Subcommand};
use glob::glob;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit ",
    env!("BITPACKET_BUILD_COMMIT"),
    ", ",
    env!("BITPACKET_BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "bitpacket")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Decoder and evaluator for hex-encoded packet transmissions.",
    long_about = None,
    after_help = "Examples:\n  bitpacket decode input.hex -o report.json\n  bitpacket decode --hex D2FE28 --stdout --tree\n  bitpacket eval input.hex"
)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a transmission and generate a versioned JSON report.
    #[command(aliases = ["analyse", "analyze"])]
    #[command(
        after_help = "Examples:\n  bitpacket decode input.hex -o report.json\n  bitpacket analyse 'inputs/*.hex' --stdout --pretty\n  bitpacket decode --hex 38006F45291200 --stdout --tree"
    )]
    Decode {
        /// Path to a .hex or .txt file holding the transmission
        #[arg(required_unless_present = "hex")]
        input: Option<PathBuf>,

        /// Transmission given inline as hex digits
        #[arg(long, conflicts_with = "input")]
        hex: Option<String>,

        /// Output report path (JSON)
        #[arg(short = 'o', long, required_unless_present = "stdout")]
        report: Option<PathBuf>,

        /// Write JSON report to stdout
        #[arg(long, conflicts_with = "report")]
        stdout: bool,

        /// Pretty-print JSON output
        #[arg(long, conflicts_with = "compact")]
        pretty: bool,

        /// Compact JSON output (default)
        #[arg(long)]
        compact: bool,

        /// Include the decoded packet tree in the report
        #[arg(long)]
        tree: bool,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,
    },
    /// Print the version sum and the evaluated value, one per line.
    Eval {
        /// Path to a .hex or .txt file holding the transmission
        #[arg(required_unless_present = "hex")]
        input: Option<PathBuf>,

        /// Transmission given inline as hex digits
        #[arg(long, conflicts_with = "input")]
        hex: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Decode {
            input,
            hex,
            report,
            stdout,
            pretty,
            compact,
            tree,
            quiet,
        } => cmd_decode(input, hex, report, stdout, pretty, compact, tree, quiet),
        Commands::Eval { input, hex } => cmd_eval(input, hex),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(err.to_string(), None)
    }
}

impl From<AnalysisError> for CliError {
    fn from(err: AnalysisError) -> Self {
        let hint: String = match &err {
            AnalysisError::Source(_) => "check that the input file is readable UTF-8 text".into(),
            AnalysisError::Decode(DecodeError::InvalidHex(_)) => {
                "the transmission must contain only hex digits".into()
            }
            AnalysisError::Decode(DecodeError::OutOfBounds { .. }) => {
                "the transmission looks truncated; check that the input is complete".into()
            }
            AnalysisError::Decode(DecodeError::MalformedSubpacketLength { .. }) => {
                "an operator's declared length does not match its subpackets".into()
            }
            AnalysisError::Decode(_) => "the transmission is not a valid packet stream".into(),
            AnalysisError::Eval(EvalError::Arity { kind, expected, .. }) => {
                format!("{kind} packets need {expected} subpacket(s)")
            }
            AnalysisError::EmptyTransmission => "the input holds only zero padding".into(),
        };
        CliError::new(format!("transmission analysis failed: {err}"), Some(hint))
    }
}

fn cmd_decode(
    input: Option<PathBuf>,
    hex: Option<String>,
    report: Option<PathBuf>,
    stdout: bool,
    pretty: bool,
    compact: bool,
    tree: bool,
    quiet: bool,
) -> Result<(), CliError> {
    let resolved_input = input.as_deref().map(resolve_input_path).transpose()?;
    let report = if stdout {
        None
    } else {
        Some(report.ok_or_else(|| {
            CliError::new(
                "missing output path",
                Some("use -o/--report or --stdout".to_string()),
            )
        })?)
    };

    if let (Some(input_path), Some(report_path)) = (resolved_input.as_ref(), report.as_ref()) {
        ensure_distinct_paths(input_path, report_path)?;
    }

    let options = AnalysisOptions { include_tree: tree };
    let rep = load_report(resolved_input.as_deref(), hex.as_deref(), options)?;
    let json = serialize_report(&rep, pretty, compact)?;

    let Some(report) = report else {
        print!("{}", json);
        return Ok(());
    };

    if let Some(parent) = report.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }

    fs::write(&report, json)
        .with_context(|| format!("Failed to write report: {}", report.display()))?;

    if !quiet {
        eprintln!("OK: report written -> {}", report.display());
    }
    Ok(())
}

fn cmd_eval(input: Option<PathBuf>, hex: Option<String>) -> Result<(), CliError> {
    let resolved_input = input.as_deref().map(resolve_input_path).transpose()?;
    let rep = load_report(
        resolved_input.as_deref(),
        hex.as_deref(),
        AnalysisOptions::default(),
    )?;
    println!("{}", rep.version_sum);
    println!("{}", rep.value);
    Ok(())
}

fn load_report(
    input: Option<&Path>,
    hex: Option<&str>,
    options: AnalysisOptions,
) -> Result<Report, CliError> {
    match (input, hex) {
        (_, Some(hex)) => Ok(bitpacket_core::analyze_hex(hex, options)?),
        (Some(input), None) => {
            validate_input_file(input)?;
            log::debug!("decoding transmission from {}", input.display());
            Ok(bitpacket_core::analyze_hex_file(input, options)?)
        }
        (None, None) => Err(CliError::new(
            "missing input",
            Some("pass an input file or --hex <DIGITS>".to_string()),
        )),
    }
}

fn ensure_distinct_paths(input: &Path, report_path: &Path) -> Result<(), CliError> {
    let Ok(input_abs) = fs::canonicalize(input) else {
        // Missing inputs are reported by validate_input_file.
        return Ok(());
    };
    let report_dir = match report_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let report_dir = match fs::canonicalize(report_dir) {
        Ok(dir) => dir,
        // Not created yet, so it cannot hold the input.
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(err) => {
            return Err(anyhow::Error::new(err)
                .context(format!(
                    "Failed to resolve output path: {}",
                    report_path.display()
                ))
                .into());
        }
    };
    let report_target = report_dir.join(
        report_path
            .file_name()
            .ok_or_else(|| anyhow::anyhow!("Invalid report path"))?,
    );
    if report_target == input_abs {
        return Err(CliError::new(
            format!(
                "report path must differ from input: {}",
                report_path.display()
            ),
            Some("choose a different output path".to_string()),
        ));
    }
    Ok(())
}

fn serialize_report(rep: &Report, pretty: bool, compact: bool) -> Result<String, CliError> {
    if pretty && compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    if pretty {
        serde_json::to_string_pretty(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("use a .hex or .txt file".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("use a .hex or .txt file".to_string()),
        ));
    }
    let ext = input
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if ext != "hex" && ext != "txt" {
        return Err(CliError::new(
            format!("unsupported input format '{}'", input.display()),
            Some("expected a .hex or .txt file".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }

    let mut matches = Vec::new();
    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    if matches.is_empty() {
        return Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern; expected .hex or .txt".to_string()),
        ));
    }
    if matches.len() > 1 {
        let hint = "pass a single transmission file, or run once per file".to_string();
        let mut message = format!(
            "multiple files match pattern '{}' ({} matches)",
            pattern,
            matches.len()
        );
        let listed = matches
            .iter()
            .take(3)
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>();
        message.push_str("; matches: ");
        message.push_str(&listed.join(", "));
        if matches.len() > 3 {
            message.push_str(", ...");
        }
        return Err(CliError::new(message, Some(hint)));
    }

    Ok(matches.remove(0))
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
