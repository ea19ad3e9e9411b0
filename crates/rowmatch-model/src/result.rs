//! Projected result rows.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Reserved column holding the similarity score.
pub const SIMILARITY_COLUMN: &str = "Similarity";
pub const SOURCE_PREFIX: &str = "Source_";
pub const DESTINATION_PREFIX: &str = "Destination_";

static EMPTY: ResultValue = ResultValue::Empty;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultValue {
    Text(String),
    Score(f64),
    Empty,
}

impl ResultValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_score(&self) -> Option<f64> {
        match self {
            Self::Score(score) => Some(*score),
            _ => None,
        }
    }
}

/// One output record: column name to value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub values: BTreeMap<String, ResultValue>,
}

impl ResultRow {
    pub fn get(&self, column: &str) -> Option<&ResultValue> {
        self.values.get(column)
    }

    pub fn insert(&mut self, column: impl Into<String>, value: ResultValue) {
        self.values.insert(column.into(), value);
    }

    pub fn similarity(&self) -> Option<f64> {
        self.get(SIMILARITY_COLUMN).and_then(ResultValue::as_score)
    }
}

/// Result rows plus the column order to render them in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    pub columns: Vec<String>,
    pub rows: Vec<ResultRow>,
}

impl ResultTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one row in column order; absent columns read as empty.
    pub fn ordered_values<'a>(
        &'a self,
        row: &'a ResultRow,
    ) -> impl Iterator<Item = &'a ResultValue> + 'a {
        self.columns
            .iter()
            .map(move |column| row.get(column).unwrap_or(&EMPTY))
    }
}
