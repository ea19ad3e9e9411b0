use thiserror::Error;

/// Errors raised before or around a matching run.
///
/// Scoring problems on individual pairs are not errors of the run; they are
/// collected as [`ScoringFailure`]s in the outcome instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    /// A configuration value is out of range or unrecognised.
    #[error("invalid configuration for {field}: {reason}")]
    InvalidConfiguration { field: &'static str, reason: String },

    /// A match or projection column does not exist in the dataset.
    #[error("column '{column}' not found in {dataset}")]
    ColumnNotFound { column: String, dataset: String },
}

impl MatchError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            field,
            reason: reason.into(),
        }
    }

    pub fn column_not_found(column: impl Into<String>, dataset: impl Into<String>) -> Self {
        Self::ColumnNotFound {
            column: column.into(),
            dataset: dataset.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MatchError>;

/// Why a single pair could not be scored.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoreError {
    /// The scorer produced a value outside `0..=100` (or NaN).
    #[error("score {0} is outside 0..=100")]
    OutOfRange(f64),
    /// The scorer rejected the pair.
    #[error("{0}")]
    Rejected(String),
}

/// A pair that was skipped during a run. It counts as score 0.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("could not score source row {source_index} against target row {target_index}: {reason}")]
pub struct ScoringFailure {
    pub source_index: usize,
    pub target_index: usize,
    pub query: String,
    pub candidate: String,
    pub reason: ScoreError,
}
