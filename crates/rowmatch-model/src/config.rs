//! Run configuration: threshold, scoring model, retrieval limit, projection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{MatchError, Result};

/// Minimum similarity accepted when none is configured.
pub const DEFAULT_THRESHOLD: f64 = 80.0;
/// Candidates kept per source value when none is configured.
pub const DEFAULT_LIMIT: usize = 5;

/// String similarity measure used to score a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringModel {
    /// Full-string indel similarity.
    #[default]
    Ratio,
    /// Best alignment of the shorter string inside the longer one.
    PartialRatio,
    /// Ratio after sorting whitespace-separated tokens.
    TokenSortRatio,
    /// Normalised Levenshtein edit distance.
    Levenshtein,
}

impl ScoringModel {
    pub const ALL: [Self; 4] = [
        Self::Ratio,
        Self::PartialRatio,
        Self::TokenSortRatio,
        Self::Levenshtein,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Ratio => "Ratio",
            Self::PartialRatio => "Partial Ratio",
            Self::TokenSortRatio => "Token Sort Ratio",
            Self::Levenshtein => "Levenshtein",
        }
    }

    pub fn efficiency(self) -> &'static str {
        match self {
            Self::Ratio | Self::TokenSortRatio => "Moderate Efficiency",
            Self::PartialRatio | Self::Levenshtein => "High Efficiency",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Ratio => {
                "General purpose string comparison that checks for character similarity."
            }
            Self::PartialRatio => {
                "Works well when substrings match, even if full strings are not exactly the same."
            }
            Self::TokenSortRatio => "Effective when comparing strings where words are rearranged.",
            Self::Levenshtein => {
                "Measures the number of single-character edits required to change one string to another."
            }
        }
    }
}

impl fmt::Display for ScoringModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ScoringModel {
    type Err = MatchError;

    /// Accepts labels and identifiers alike: `Partial Ratio`, `partial-ratio`,
    /// `partial_ratio` and `PartialRatio` all parse.
    fn from_str(raw: &str) -> Result<Self> {
        let key: String = raw
            .chars()
            .filter(|ch| !matches!(*ch, ' ' | '_' | '-'))
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "ratio" => Ok(Self::Ratio),
            "partialratio" => Ok(Self::PartialRatio),
            "tokensortratio" => Ok(Self::TokenSortRatio),
            "levenshtein" => Ok(Self::Levenshtein),
            _ => Err(MatchError::invalid(
                "model",
                format!("unknown model '{}'", raw.trim()),
            )),
        }
    }
}

/// How many candidates the retriever keeps per source value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Limit {
    /// Keep the `n` best candidates.
    Top(usize),
    /// Keep every candidate (exhaustive retrieval).
    All,
}

impl Limit {
    /// The cap, or `None` for exhaustive retrieval.
    pub fn cap(self) -> Option<usize> {
        match self {
            Self::Top(n) => Some(n),
            Self::All => None,
        }
    }
}

impl Default for Limit {
    fn default() -> Self {
        Self::Top(DEFAULT_LIMIT)
    }
}

/// Preprocessing applied to every value before scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Processor {
    /// Compare values exactly as ingested; case and punctuation count.
    #[default]
    Raw,
    /// Lowercase, turn every non-alphanumeric character into a space, trim.
    Normalize,
}

impl Processor {
    pub fn apply(self, value: &str) -> String {
        match self {
            Self::Raw => value.to_string(),
            Self::Normalize => value
                .chars()
                .map(|ch| if ch.is_alphanumeric() { ch } else { ' ' })
                .collect::<String>()
                .to_lowercase()
                .trim()
                .to_string(),
        }
    }
}

/// Complete configuration of one matching run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Minimum score (0..=100) for a pair to be accepted.
    pub threshold: f64,
    pub model: ScoringModel,
    pub limit: Limit,
    /// Source columns projected into results; empty means all.
    pub source_columns: Vec<String>,
    /// Destination columns projected into results; empty means all.
    pub destination_columns: Vec<String>,
    pub processor: Processor,
    /// Report source values without any accepted candidate.
    pub emit_unmatched: bool,
    /// Spread source values over the rayon thread pool.
    pub parallel: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            model: ScoringModel::default(),
            limit: Limit::default(),
            source_columns: Vec::new(),
            destination_columns: Vec::new(),
            processor: Processor::default(),
            emit_unmatched: false,
            parallel: false,
        }
    }
}

impl MatchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: ScoringModel) -> Self {
        self.model = model;
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: Limit) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub fn with_processor(mut self, processor: Processor) -> Self {
        self.processor = processor;
        self
    }

    #[must_use]
    pub fn with_source_columns(mut self, columns: Vec<String>) -> Self {
        self.source_columns = columns;
        self
    }

    #[must_use]
    pub fn with_destination_columns(mut self, columns: Vec<String>) -> Self {
        self.destination_columns = columns;
        self
    }

    #[must_use]
    pub fn with_emit_unmatched(mut self, enable: bool) -> Self {
        self.emit_unmatched = enable;
        self
    }

    #[must_use]
    pub fn with_parallel(mut self, enable: bool) -> Self {
        self.parallel = enable;
        self
    }

    /// Checks ranges before any scoring happens.
    ///
    /// # Errors
    ///
    /// [`MatchError::InvalidConfiguration`] when the threshold is outside
    /// `0..=100` (or NaN) or the limit is zero.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.threshold) {
            return Err(MatchError::invalid(
                "threshold",
                format!("{} is outside 0..=100", self.threshold),
            ));
        }
        if self.limit == Limit::Top(0) {
            return Err(MatchError::invalid("limit", "must be a positive integer"));
        }
        Ok(())
    }
}
