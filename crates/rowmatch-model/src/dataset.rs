//! In-memory tabular data and the capability the engine needs from it.

use serde::{Deserialize, Serialize};

use crate::error::{MatchError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum CellValue {
    Text(String),
    Missing,
}

impl CellValue {
    /// Text content, or `None` for a missing cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            Self::Missing => None,
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            Self::Missing
        } else {
            Self::Text(value.to_string())
        }
    }
}

/// Read access to a table of nullable strings.
///
/// Implementors supply positional access; lookups by column name are
/// derived from it.
pub trait Tabular {
    /// Display name used in error messages (usually the file stem).
    fn name(&self) -> &str;

    fn column_names(&self) -> &[String];

    fn row_count(&self) -> usize;

    /// Cell at `(row, column position)`. `None` when missing or out of range.
    fn cell_at(&self, row: usize, column: usize) -> Option<&str>;

    fn column_index(&self, column: &str) -> Option<usize> {
        self.column_names().iter().position(|name| name == column)
    }

    fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.cell_at(row, idx)
    }

    /// The named column as a sequence of nullable strings, one per row.
    fn column(&self, column: &str) -> Result<Vec<Option<&str>>> {
        let idx = self
            .column_index(column)
            .ok_or_else(|| MatchError::column_not_found(column, self.name()))?;
        Ok((0..self.row_count())
            .map(|row| self.cell_at(row, idx))
            .collect())
    }
}

/// A named table of text cells held in memory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Dataset {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Builds a dataset from string literals; empty strings become missing cells.
    pub fn from_str_rows(name: &str, columns: &[&str], rows: &[&[&str]]) -> Self {
        let mut dataset = Self::new(name, columns.iter().map(|c| (*c).to_string()).collect());
        for row in rows {
            dataset.push_row(row.iter().map(|value| CellValue::from(*value)).collect());
        }
        dataset
    }

    pub fn push_row(&mut self, row: Vec<CellValue>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Tabular for Dataset {
    fn name(&self) -> &str {
        &self.name
    }

    fn column_names(&self) -> &[String] {
        &self.columns
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn cell_at(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column)?.as_text()
    }
}
