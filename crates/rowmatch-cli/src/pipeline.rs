//! Match pipeline: ingest both files, match, assemble and write results.
//!
//! Kept free of argument parsing so it can be driven from tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use rowmatch_ingest::read_dataset;
use rowmatch_map::{CancelToken, MatchEngine, MatchObserver, ResultAssembler};
use rowmatch_model::{Collection, MatchConfig, MatchOutcome, ResultTable, Tabular};
use rowmatch_report::{OutputFormat, write_csv_file, write_json_file};
use tracing::{debug, info, info_span};

/// Everything needed for one run.
#[derive(Debug, Clone)]
pub struct MatchRequest {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub source_column: String,
    pub destination_column: String,
    pub config: MatchConfig,
    pub output: Option<PathBuf>,
    /// Explicit output format; otherwise taken from the output extension.
    pub format: Option<OutputFormat>,
}

/// Result of a finished (or cancelled) run.
#[derive(Debug)]
pub struct MatchRun {
    pub source_name: String,
    pub destination_name: String,
    pub source_rows: usize,
    pub destination_rows: usize,
    pub outcome: MatchOutcome,
    pub table: ResultTable,
    pub written: Option<(PathBuf, OutputFormat)>,
    pub elapsed: Duration,
}

/// Reads a JSON match configuration. Missing keys keep their defaults.
///
/// # Errors
///
/// Fails when the file cannot be read or is not a valid configuration.
pub fn load_config(path: &Path) -> Result<MatchConfig> {
    let text =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let config: MatchConfig = serde_json::from_str(&text)
        .with_context(|| format!("parse config {}", path.display()))?;
    debug!(path = %path.display(), ?config, "loaded config");
    Ok(config)
}

/// Output format: explicit choice, then the file extension, then CSV.
pub fn resolve_format(explicit: Option<OutputFormat>, output: Option<&Path>) -> OutputFormat {
    explicit
        .or_else(|| output.and_then(OutputFormat::from_path))
        .unwrap_or_default()
}

/// Runs the full pipeline for `request`.
///
/// The configuration and every column name are checked before any pair is
/// scored.
///
/// # Errors
///
/// Ingestion, configuration, column lookup and write failures. Pairs that
/// cannot be scored are not errors; they are listed in the outcome.
pub fn run_match(
    request: &MatchRequest,
    observer: &dyn MatchObserver,
    cancel: &CancelToken,
) -> Result<MatchRun> {
    let span = info_span!("run", source = %request.source.display(), destination = %request.destination.display());
    let _guard = span.enter();
    let start = Instant::now();

    let engine = MatchEngine::new(request.config.clone())?;
    let source = read_dataset(&request.source)?;
    let destination = read_dataset(&request.destination)?;

    let source_values = Collection::from_column(&source, &request.source_column)?;
    let target_values = Collection::from_column(&destination, &request.destination_column)?;
    let assembler = ResultAssembler::new(
        &source,
        &destination,
        &request.config.source_columns,
        &request.config.destination_columns,
    )?;
    info!(
        source_values = source_values.len(),
        target_values = target_values.len(),
        "datasets loaded"
    );

    let outcome = engine.run_with(&source_values, &target_values, observer, cancel);
    let table = assembler.assemble(&outcome);

    let written = match &request.output {
        Some(path) => {
            let format = resolve_format(request.format, Some(path));
            write_output(&table, path, format)?;
            info!(path = %path.display(), rows = table.len(), "results written");
            Some((path.clone(), format))
        }
        None => None,
    };

    Ok(MatchRun {
        source_name: source.name().to_string(),
        destination_name: destination.name().to_string(),
        source_rows: source.row_count(),
        destination_rows: destination.row_count(),
        outcome,
        table,
        written,
        elapsed: start.elapsed(),
    })
}

fn write_output(table: &ResultTable, path: &Path, format: OutputFormat) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create output directory {}", parent.display()))?;
    }
    match format {
        OutputFormat::Csv => write_csv_file(table, path),
        OutputFormat::Json => write_json_file(table, path),
    }
}
