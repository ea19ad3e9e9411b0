//! Source and target collections: the non-null values of one column.

use serde::{Deserialize, Serialize};

use crate::dataset::Tabular;
use crate::error::Result;

/// One value of a collection together with the row it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub index: usize,
    pub value: String,
}

/// Ordered `(row index, text)` pairs with missing values removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    entries: Vec<Entry>,
}

impl Collection {
    pub fn new(entries: Vec<Entry>) -> Self {
        Self { entries }
    }

    /// Collects a column, dropping missing and blank cells.
    ///
    /// Row indices refer back to the table; the text itself is kept as is.
    pub fn from_column<T: Tabular + ?Sized>(table: &T, column: &str) -> Result<Self> {
        let entries = table
            .column(column)?
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| {
                let value = value?;
                if value.trim().is_empty() {
                    return None;
                }
                Some(Entry {
                    index,
                    value: value.to_string(),
                })
            })
            .collect();
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(usize, S)> for Collection {
    fn from_iter<I: IntoIterator<Item = (usize, S)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(index, value)| Entry {
                    index,
                    value: value.into(),
                })
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
