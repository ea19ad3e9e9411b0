use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use rowmatch_model::ResultTable;

use crate::common::format_value;

/// Writes the header and one record per result row.
///
/// # Errors
///
/// Propagates CSV write failures.
pub fn write_csv<W: Write>(table: &ResultTable, writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer
        .write_record(&table.columns)
        .context("write csv header")?;
    for row in &table.rows {
        let record: Vec<String> = table.ordered_values(row).map(format_value).collect();
        writer.write_record(&record).context("write csv record")?;
    }
    writer.flush().context("flush csv output")?;
    Ok(())
}

/// # Errors
///
/// Fails when the file cannot be created or written.
pub fn write_csv_file(table: &ResultTable, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("create output file: {}", path.display()))?;
    write_csv(table, file).with_context(|| format!("write output file: {}", path.display()))
}
