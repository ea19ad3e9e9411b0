//! Match records and the outcome of one run.

use serde::{Deserialize, Serialize};

use crate::error::ScoringFailure;

/// An accepted `(source row, target row)` pair with its similarity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub source_index: usize,
    pub target_index: usize,
    /// Similarity in `0..=100`.
    pub score: f64,
}

/// Counters collected while a run progresses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchStats {
    pub sources_total: usize,
    pub sources_processed: usize,
    pub targets_total: usize,
    /// Pairs handed to the scorer.
    pub pairs_scored: usize,
    /// Pairs ruled out by length bounds or early exit without scoring.
    pub pairs_pruned: usize,
}

/// Everything a run produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchOutcome {
    /// Grouped by source in source order, best score first within a group.
    pub records: Vec<MatchRecord>,
    /// Source rows without an accepted candidate. Only filled when
    /// unmatched reporting is enabled.
    pub unmatched_sources: Vec<usize>,
    pub skipped: Vec<ScoringFailure>,
    /// True when the run stopped early on request; `records` is then a prefix.
    pub cancelled: bool,
    pub stats: MatchStats,
}

impl MatchOutcome {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of distinct source rows with at least one record.
    pub fn matched_sources(&self) -> usize {
        let mut count = 0;
        let mut last = None;
        for record in &self.records {
            if last != Some(record.source_index) {
                count += 1;
                last = Some(record.source_index);
            }
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matched_sources_counts_groups() {
        let outcome = MatchOutcome {
            records: vec![
                MatchRecord {
                    source_index: 0,
                    target_index: 3,
                    score: 100.0,
                },
                MatchRecord {
                    source_index: 0,
                    target_index: 1,
                    score: 90.0,
                },
                MatchRecord {
                    source_index: 2,
                    target_index: 1,
                    score: 85.0,
                },
            ],
            ..MatchOutcome::default()
        };
        assert_eq!(outcome.matched_sources(), 2);
        assert_eq!(outcome.skipped_count(), 0);
    }

    #[test]
    fn record_serializes_with_field_names() {
        let record = MatchRecord {
            source_index: 1,
            target_index: 2,
            score: 87.5,
        };
        let json = serde_json::to_string(&record).expect("serialize record");
        assert_eq!(json, r#"{"source_index":1,"target_index":2,"score":87.5}"#);
    }
}
