//! Data model for fuzzy row matching.
//!
//! Datasets and the collections derived from them, match records and run
//! outcomes, run configuration, result tables and the error taxonomy shared
//! by every crate in the workspace.

pub mod collection;
pub mod config;
pub mod dataset;
pub mod error;
pub mod record;
pub mod redact;
pub mod result;

pub use collection::{Collection, Entry};
pub use config::{DEFAULT_LIMIT, DEFAULT_THRESHOLD, Limit, MatchConfig, Processor, ScoringModel};
pub use dataset::{CellValue, Dataset, Tabular};
pub use error::{MatchError, Result, ScoreError, ScoringFailure};
pub use record::{MatchOutcome, MatchRecord, MatchStats};
pub use redact::{REDACTED_VALUE, log_data_enabled, redact_value, set_log_data};
pub use result::{
    DESTINATION_PREFIX, ResultRow, ResultTable, ResultValue, SIMILARITY_COLUMN, SOURCE_PREFIX,
};
