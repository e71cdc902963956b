//! # vitalgrid-cli
//!
//! Command-line front end for the vitalgrid extraction engine.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use vitalgrid_core::registry::PARAMETERS;
use vitalgrid_core::{
    extract_in_worker, ExtractOptions, ExtractionResult, Sample, SampleValue, UploadMeta,
};

/// vitalgrid - extract health metrics from spreadsheet exports
#[derive(Parser)]
#[command(name = "vitalgrid")]
#[command(author, version, about = "Extract health metrics from spreadsheets", long_about = None)]
struct Cli {
    /// Spreadsheet or delimited text file to read
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// YAML file with extraction options
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output format (json, summary)
    #[arg(short = 'f', long = "format", default_value = "json")]
    format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(short, long)]
    pretty: bool,

    /// Give up after this many seconds
    #[arg(short, long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Upload instant recorded in the result (RFC 3339, defaults to now)
    #[arg(long, value_name = "RFC3339", value_parser = parse_instant)]
    uploaded_at: Option<DateTime<Utc>>,

    /// Print the parameter registry as JSON and exit
    #[arg(long)]
    list_parameters: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Output format for results.
#[derive(Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    /// Full result document as JSON (default)
    #[default]
    Json,
    /// Latest value per parameter
    Summary,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_writer(std::io::stderr)
            .init();
    }

    if cli.list_parameters {
        println!("{}", to_json(&PARAMETERS, cli.pretty)?);
        return Ok(());
    }

    let Some(file) = cli.file.as_deref() else {
        Cli::parse_from(["vitalgrid", "--help"]);
        return Ok(());
    };

    let options = match &cli.config {
        Some(path) => load_options(path)?,
        None => ExtractOptions::default(),
    };
    let bytes =
        std::fs::read(file).with_context(|| format!("Failed to read file: {}", file.display()))?;
    let meta = UploadMeta::new(upload_name(file), cli.uploaded_at.unwrap_or_else(Utc::now));

    let result = run(bytes, meta, options, cli.timeout).await;
    match cli.format {
        OutputFormat::Json => println!("{}", to_json(&result, cli.pretty)?),
        OutputFormat::Summary => print_summary(&result),
    }

    if let Some(error) = &result.error {
        anyhow::bail!("extraction failed: {error}");
    }
    Ok(())
}

/// Parse an RFC 3339 instant.
fn parse_instant(s: &str) -> std::result::Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("invalid RFC 3339 timestamp '{s}': {e}"))
}

/// Load extraction options from a YAML file.
fn load_options(path: &Path) -> Result<ExtractOptions> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let options: ExtractOptions = serde_yaml::from_str(&text)
        .with_context(|| format!("Invalid config: {}", path.display()))?;
    tracing::debug!("loaded options {:?}", options);
    Ok(options)
}

fn upload_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Run one extraction, converting a timeout into a fallback result.
async fn run(
    bytes: Vec<u8>,
    meta: UploadMeta,
    options: ExtractOptions,
    timeout: Option<u64>,
) -> ExtractionResult {
    let Some(secs) = timeout else {
        return extract_in_worker(bytes, meta, options).await;
    };

    let started = Utc::now();
    let work = extract_in_worker(bytes, meta.clone(), options);
    match tokio::time::timeout(Duration::from_secs(secs), work).await {
        Ok(result) => result,
        Err(_) => ExtractionResult::fallback(
            &meta.name,
            meta.uploaded_at,
            started,
            format!("Extraction timed out after {secs}s"),
        ),
    }
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

/// Format a sample's value for display.
fn format_sample_value(value: &SampleValue) -> String {
    match value {
        SampleValue::Number(n) => format!("{n}"),
        SampleValue::BloodPressure {
            systolic,
            diastolic,
        } => {
            let side = |v: &Option<u16>| v.map_or_else(|| "?".to_string(), |v| v.to_string());
            format!("{}/{}", side(systolic), side(diastolic))
        }
    }
}

fn format_sample(sample: &Sample, unit: &str) -> String {
    let value = format_sample_value(&sample.value);
    let value = if unit.is_empty() {
        value
    } else {
        format!("{value} {unit}")
    };
    let when = sample
        .timestamp
        .map_or_else(|| "-".to_string(), |ts| ts.format("%Y-%m-%d %H:%M").to_string());
    format!("{value:<16} {when:<16} [{}]", sample.sheet)
}

/// Print the latest value of every found parameter.
fn print_summary(result: &ExtractionResult) {
    println!("{} {}", "vitalgrid".cyan().bold(), result.filename.bold());

    if let Some(error) = &result.error {
        println!("{} {error}", "Error:".red().bold());
        return;
    }

    for summary in &result.sheet_summaries {
        match summary.header_row_index {
            Some(index) => println!(
                "  sheet {}: header at row {}, {} data rows",
                summary.sheet_name.yellow(),
                index + 1,
                summary.row_count
            ),
            None => println!("  sheet {}: no header", summary.sheet_name.yellow()),
        }
    }
    println!();

    let mut found = 0;
    for parameter in PARAMETERS {
        let Some(sample) = result.metrics.latest(parameter.key) else {
            continue;
        };
        found += 1;
        let points = result.metrics.trend(parameter.key).len();
        println!(
            "  {:<24} {}  {}",
            parameter.label.green(),
            format_sample(sample, parameter.unit),
            format!("{points} points").dimmed()
        );
    }

    if found == 0 {
        println!("  {}", "No measurements found".yellow());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Write;

    // ========================================================================
    // Argument parsing tests
    // ========================================================================

    #[test]
    fn test_cli_parse_file() {
        let cli = Cli::parse_from(["vitalgrid", "halsa.xlsx"]);
        assert_eq!(cli.file, Some(PathBuf::from("halsa.xlsx")));
        assert!(cli.config.is_none());
        assert!(!cli.pretty);
        assert!(matches!(cli.format, OutputFormat::Json));
    }

    #[test]
    fn test_cli_parse_options() {
        let cli = Cli::parse_from([
            "vitalgrid",
            "-p",
            "-t",
            "30",
            "-f",
            "summary",
            "--uploaded-at",
            "2024-06-01T10:00:00+02:00",
            "halsa.csv",
        ]);
        assert!(cli.pretty);
        assert_eq!(cli.timeout, Some(30));
        assert!(matches!(cli.format, OutputFormat::Summary));
        assert_eq!(
            cli.uploaded_at,
            Some(Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_cli_rejects_bad_instant() {
        assert!(Cli::try_parse_from(["vitalgrid", "--uploaded-at", "igår", "x.csv"]).is_err());
    }

    #[test]
    fn test_cli_parse_verbose() {
        let cli = Cli::parse_from(["vitalgrid", "-v", "--list-parameters"]);
        assert!(cli.verbose);
        assert!(cli.list_parameters);
    }

    // ========================================================================
    // Helper tests
    // ========================================================================

    #[test]
    fn test_load_options() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "header_scan_rows: 5\nraw_label_cap: 10").unwrap();

        let options = load_options(file.path()).unwrap();
        assert_eq!(options.header_scan_rows, 5);
        assert_eq!(options.raw_label_cap, 10);
        assert_eq!(options.sample_rows, ExtractOptions::default().sample_rows);
    }

    #[test]
    fn test_load_options_errors() {
        assert!(load_options(Path::new("/nonexistent/vitalgrid.yaml")).is_err());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "header_scan_rows: many").unwrap();
        assert!(load_options(file.path()).is_err());
    }

    #[test]
    fn test_upload_name() {
        assert_eq!(upload_name(Path::new("/tmp/export/halsa.xlsx")), "halsa.xlsx");
        assert_eq!(upload_name(Path::new("puls.csv")), "puls.csv");
    }

    #[test]
    fn test_format_sample_value() {
        assert_eq!(format_sample_value(&SampleValue::Number(72.0)), "72");
        assert_eq!(format_sample_value(&SampleValue::Number(3.4)), "3.4");
        assert_eq!(
            format_sample_value(&SampleValue::BloodPressure {
                systolic: Some(120),
                diastolic: None
            }),
            "120/?"
        );
    }

    #[test]
    fn test_to_json_registry() {
        let json: serde_json::Value =
            serde_json::from_str(&to_json(&PARAMETERS, false).unwrap()).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 15);
        assert_eq!(json[0]["key"], "weight");
        assert_eq!(json[1]["isTimeline"], true);
    }

    // ========================================================================
    // Integration tests
    // ========================================================================

    #[tokio::test]
    async fn test_run_csv() {
        let bytes = b"Datum;Puls\n2024-01-01;61\n".to_vec();
        let meta = UploadMeta::new("puls.csv", Utc::now());
        let result = run(bytes, meta, ExtractOptions::default(), Some(30)).await;

        assert!(result.error.is_none());
        assert_eq!(
            result.metrics.latest("heartRate").unwrap().value,
            SampleValue::Number(61.0)
        );
    }

    #[tokio::test]
    async fn test_run_unsupported_file() {
        let meta = UploadMeta::new("notes.docx.bak", Utc::now());
        let result = run(b"hello".to_vec(), meta, ExtractOptions::default(), None).await;
        assert!(result.error.is_some());
    }
}
