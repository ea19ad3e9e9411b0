use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use rowmatch_model::{ResultTable, ResultValue};
use serde_json::{Map, Number, Value};

fn to_json(value: &ResultValue) -> Value {
    match value {
        ResultValue::Text(text) => Value::String(text.clone()),
        ResultValue::Score(score) => Number::from_f64(*score).map_or(Value::Null, Value::Number),
        ResultValue::Empty => Value::Null,
    }
}

/// Writes the table as a pretty-printed JSON array of objects.
///
/// Object keys follow the table's column order.
///
/// # Errors
///
/// Propagates serialisation and write failures.
pub fn write_json<W: Write>(table: &ResultTable, mut writer: W) -> Result<()> {
    let rows: Vec<Value> = table
        .rows
        .iter()
        .map(|row| {
            let object: Map<String, Value> = table
                .columns
                .iter()
                .zip(table.ordered_values(row))
                .map(|(column, value)| (column.clone(), to_json(value)))
                .collect();
            Value::Object(object)
        })
        .collect();
    serde_json::to_writer_pretty(&mut writer, &rows).context("serialize results")?;
    writeln!(writer).context("write json output")?;
    Ok(())
}

/// # Errors
///
/// Fails when the file cannot be created or written.
pub fn write_json_file(table: &ResultTable, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("create output file: {}", path.display()))?;
    write_json(table, file).with_context(|| format!("write output file: {}", path.display()))
}
