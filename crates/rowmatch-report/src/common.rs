use std::io::Write;
use std::path::Path;

use anyhow::Result;
use rowmatch_model::{ResultTable, ResultValue};

/// Result file format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl OutputFormat {
    /// Format implied by a file extension, if recognised.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Renders a score with at most two decimals and no trailing zeros.
pub fn format_score(score: f64) -> String {
    let text = format!("{score:.2}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

pub fn format_value(value: &ResultValue) -> String {
    match value {
        ResultValue::Text(text) => text.clone(),
        ResultValue::Score(score) => format_score(*score),
        ResultValue::Empty => String::new(),
    }
}

/// Writes `table` to `writer` in `format`.
///
/// # Errors
///
/// Propagates write and serialisation failures.
pub fn write_table<W: Write>(table: &ResultTable, format: OutputFormat, writer: W) -> Result<()> {
    match format {
        OutputFormat::Csv => crate::delimited::write_csv(table, writer),
        OutputFormat::Json => crate::json::write_json(table, writer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scores_drop_trailing_zeros() {
        assert_eq!(format_score(100.0), "100");
        assert_eq!(format_score(95.652_173_9), "95.65");
        assert_eq!(format_score(87.5), "87.5");
        assert_eq!(format_score(0.0), "0");
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(
            OutputFormat::from_path(Path::new("out/matches.JSON")),
            Some(OutputFormat::Json)
        );
        assert_eq!(
            OutputFormat::from_path(Path::new("matches.csv")),
            Some(OutputFormat::Csv)
        );
        assert_eq!(OutputFormat::from_path(Path::new("matches")), None);
    }
}
