use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use tracing::debug;

use rowmatch_model::{CellValue, Dataset};

/// Strips a byte order mark and outer whitespace; inner spacing is kept so
/// columns are selected exactly as they appear in the file.
fn normalize_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().to_string()
}

fn normalize_cell(raw: &str) -> CellValue {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    if trimmed.is_empty() {
        CellValue::Missing
    } else {
        CellValue::Text(trimmed.to_string())
    }
}

/// Appends `_2`, `_3`, ... to repeated header names; blank headers become
/// `Column<N>` (1-based position).
fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: BTreeMap<String, usize> = BTreeMap::new();
    headers
        .into_iter()
        .enumerate()
        .map(|(idx, header)| {
            let base = if header.is_empty() {
                format!("Column{}", idx + 1)
            } else {
                header
            };
            let count = seen.entry(base.clone()).or_insert(0);
            *count += 1;
            if *count == 1 {
                base
            } else {
                format!("{base}_{count}")
            }
        })
        .collect()
}

/// Pads or cuts a record to `width` cells; returns the row and how many
/// cells were cut.
fn fit_row<'r>(cells: impl Iterator<Item = &'r str>, width: usize) -> (Vec<CellValue>, usize) {
    let mut row = Vec::with_capacity(width);
    let mut dropped = 0usize;
    for cell in cells {
        if row.len() < width {
            row.push(normalize_cell(cell));
        } else {
            dropped += 1;
        }
    }
    row.resize(width, CellValue::Missing);
    (row, dropped)
}

/// Reads a CSV file with a header row into a [`Dataset`] named after the
/// file stem.
///
/// # Errors
///
/// Fails when the file cannot be opened or a record cannot be parsed.
pub fn read_dataset(path: &Path) -> Result<Dataset> {
    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let file =
        std::fs::File::open(path).with_context(|| format!("read csv: {}", path.display()))?;
    read_dataset_from_reader(file, &name).with_context(|| format!("read csv: {}", path.display()))
}

/// Reads CSV data with a header row from any reader.
///
/// Cells are trimmed and empty cells become [`CellValue::Missing`]; records
/// with no content are skipped. Records shorter than the header are padded
/// with missing cells, longer ones are cut to the header width.
///
/// # Errors
///
/// Fails when a record cannot be parsed.
pub fn read_dataset_from_reader<R: Read>(reader: R, name: &str) -> Result<Dataset> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let headers: Vec<String> = reader
        .headers()
        .context("read header row")?
        .iter()
        .map(normalize_header)
        .collect();
    let columns = dedupe_headers(headers);
    let width = columns.len();
    let mut dataset = Dataset::new(name, columns);

    let mut skipped = 0usize;
    let mut extra_cells = 0usize;
    for (idx, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("read record {}", idx + 1))?;
        let (row, dropped) = fit_row(record.iter(), width);
        extra_cells += dropped;
        if row.iter().all(|cell| *cell == CellValue::Missing) {
            skipped += 1;
            continue;
        }
        dataset.push_row(row);
    }
    debug!(
        dataset = name,
        columns = width,
        rows = dataset.rows.len(),
        skipped_empty = skipped,
        dropped_cells = extra_cells,
        "loaded csv"
    );
    Ok(dataset)
}
