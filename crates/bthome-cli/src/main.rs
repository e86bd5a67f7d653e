use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glob::glob;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("BTHOME_BUILD_COMMIT"),
    " ",
    env!("BTHOME_BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "bthome")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Offline-first analyzer and decoder for BTHome v2 advertisement logs.",
    long_about = None,
    after_help = "Examples:\n  bthome log analyse gateway.btlog -o report.json\n  bthome log analyze gateway.btlog --stdout\n  bthome frame decode d2fc400164023412"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Operations on advertisement log files (offline-first).
    Log {
        #[command(subcommand)]
        command: LogCommands,
    },
    /// Operations on single advertisement frames.
    Frame {
        #[command(subcommand)]
        command: FrameCommands,
    },
}

#[derive(Subcommand, Debug)]
enum LogCommands {
    /// Analyse a .btlog capture and generate a versioned JSON report.
    #[command(alias = "analyze")]
    #[command(
        after_help = "Examples:\n  bthome log analyse gateway.btlog -o report.json\n  bthome log analyze gateway.btlog --stdout\n  bthome log analyse gateway.btlog -o report.json --strict"
    )]
    Analyse {
        /// Path to a .btlog advertisement log file
        input: PathBuf,

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

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,

        /// Exit with a non-zero code if rejected frames are present
        #[arg(long)]
        strict: bool,

        /// List rejected-frame summaries after analysis
        #[arg(long)]
        list_rejects: bool,
    },
}

#[derive(Subcommand, Debug)]
enum FrameCommands {
    /// Decode one hex-encoded advertisement frame and print its measurements.
    #[command(
        after_help = "Examples:\n  bthome frame decode d2fc400164023412\n  bthome frame decode d2fc400ce803 --address a4:c1:38:2f:6e:01"
    )]
    Decode {
        /// Frame bytes (envelope + payload) as a hex string
        hex: String,

        /// Device address to print alongside the measurements
        #[arg(long)]
        address: Option<String>,

        /// Exit with a non-zero code if the payload is truncated
        #[arg(long)]
        strict: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Log { command } => match command {
            LogCommands::Analyse {
                input,
                report,
                stdout,
                pretty,
                compact,
                quiet,
                strict,
                list_rejects,
            } => cmd_log_analyse(
                input,
                report,
                stdout,
                pretty,
                compact,
                quiet,
                strict,
                list_rejects,
            ),
        },
        Commands::Frame { command } => match command {
            FrameCommands::Decode {
                hex,
                address,
                strict,
            } => cmd_frame_decode(&hex, address, strict),
        },
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

fn cmd_log_analyse(
    input: PathBuf,
    report: Option<PathBuf>,
    stdout: bool,
    pretty: bool,
    compact: bool,
    quiet: bool,
    strict: bool,
    list_rejects: bool,
) -> Result<(), CliError> {
    let resolved_input = resolve_input_path(&input)?;
    validate_input_file(&resolved_input)?;
    let input_abs = fs::canonicalize(&resolved_input)
        .with_context(|| format!("Failed to resolve input path: {}", resolved_input.display()))?;
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

    if let Some(report_path) = report.as_ref() {
        let report_abs = report_path
            .parent()
            .map(|parent| {
                if parent.as_os_str().is_empty() {
                    fs::canonicalize(".")
                } else {
                    fs::canonicalize(parent)
                }
            })
            .transpose()
            .with_context(|| format!("Failed to resolve output path: {}", report_path.display()))?;
        if let Some(report_dir) = report_abs {
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
        }
    }

    let meta = fs::metadata(&resolved_input)
        .with_context(|| format!("Failed to read input file: {}", resolved_input.display()))?;

    if !meta.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("use a .btlog advertisement log file".to_string()),
        ));
    }

    let rep = bthome_core::analyze_log_file(&resolved_input).context("log analysis failed")?;
    let json = serialize_report(&rep, pretty, compact)?;

    if stdout {
        print!("{}", json);
        if list_rejects && !quiet {
            print_rejects(&rep);
        }
        if strict && !rep.rejects.is_empty() {
            return Err(CliError::new(
                "rejected frames detected",
                Some("use --list-rejects to inspect".to_string()),
            ));
        }
        return Ok(());
    }

    let report = report.expect("report required when not using stdout");
    if let Some(parent) = report.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }

    fs::write(&report, json)
        .with_context(|| format!("Failed to write report: {}", report.display()))?;

    if list_rejects && !quiet {
        print_rejects(&rep);
    }
    if !quiet {
        eprintln!("OK: report written -> {}", report.display());
    }
    if strict && !rep.rejects.is_empty() {
        return Err(CliError::new(
            "rejected frames detected",
            Some("use --list-rejects to inspect".to_string()),
        ));
    }
    Ok(())
}

fn cmd_frame_decode(
    hex_text: &str,
    address: Option<String>,
    strict: bool,
) -> Result<(), CliError> {
    let cleaned: String = hex_text
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let frame = hex::decode(&cleaned).map_err(|err| {
        CliError::new(
            format!("invalid hex input: {err}"),
            Some("pass the frame as an even-length hex string".to_string()),
        )
    })?;

    let decoded = bthome_core::decode_frame(&frame).map_err(|err| {
        CliError::new(
            format!("frame rejected: {err}"),
            Some("expected a BTHome v2 advertisement (service id 0xfcd2)".to_string()),
        )
    })?;

    if let Some(address) = address {
        println!("Address: {address}");
    }
    for measurement in &decoded.measurements {
        println!("{measurement}");
    }
    if let Some(cut) = decoded.truncated {
        eprintln!("warning: {cut}");
        if strict {
            return Err(CliError::new(
                "payload truncated",
                Some("the remaining bytes could not be decoded".to_string()),
            ));
        }
    }
    Ok(())
}

fn serialize_report(
    rep: &bthome_core::Report,
    pretty: bool,
    compact: bool,
) -> Result<String, CliError> {
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

fn print_rejects(rep: &bthome_core::Report) {
    eprintln!("Rejected frames:");
    for reject in &rep.rejects {
        eprintln!("  {} {} ({})", reject.severity, reject.id, reject.count);
    }
}

fn validate_input_file(input: &PathBuf) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("use a .btlog advertisement log file".to_string()),
        ));
    }
    let ext = input
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if ext != "btlog" {
        return Err(CliError::new(
            format!("unsupported input format '{}'", input.display()),
            Some("expected a .btlog advertisement log file".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &PathBuf) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.clone());
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
            Some("check the path or quote the pattern; expected a .btlog file".to_string()),
        ));
    }
    if matches.len() > 1 {
        let hint = "pass a single log file, or run once per file".to_string();
        let mut message = format!(
            "multiple files match pattern '{}' ({} matches)",
            pattern,
            matches.len()
        );
        let listed = matches.iter().take(3).collect::<Vec<_>>();
        if !listed.is_empty() {
            let mut details = String::new();
            details.push_str("; matches: ");
            details.push_str(
                &listed
                    .into_iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            );
            if matches.len() > 3 {
                details.push_str(", ...");
            }
            message.push_str(&details);
        }
        return Err(CliError::new(message, Some(hint)));
    }

    Ok(matches.remove(0))
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
