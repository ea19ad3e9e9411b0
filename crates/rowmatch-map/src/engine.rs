//! Match engine: runs retrieval for every source value and keeps the
//! candidates that reach the threshold.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use rayon::prelude::*;
use rowmatch_model::{
    Collection, Entry, Limit, MatchConfig, MatchOutcome, MatchRecord, MatchStats, Result,
    ScoringFailure, redact_value,
};
use tracing::{debug, info, info_span, trace, warn};

use crate::retrieve::{CandidateIndex, Retriever};
use crate::score::{ModelScorer, Scorer};

/// Receives progress from a running match.
///
/// Called after each source value; in parallel mode calls may come from
/// several threads and `done` counts completions rather than positions.
pub trait MatchObserver: Sync {
    fn on_progress(&self, _done: usize, _total: usize) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl MatchObserver for NoopObserver {}

/// Shared flag asking a run to stop between source values.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Per-source result before merging.
struct SourceResult {
    records: Vec<MatchRecord>,
    failures: Vec<ScoringFailure>,
    scored: usize,
    pruned: usize,
}

/// Matches a source collection against a target collection.
///
/// # Example
///
/// ```ignore
/// use rowmatch_map::MatchEngine;
/// use rowmatch_model::{Collection, MatchConfig, ScoringModel};
///
/// let engine = MatchEngine::new(MatchConfig::new().with_model(ScoringModel::TokenSortRatio))?;
/// let outcome = engine.run(&source, &target);
/// ```
pub struct MatchEngine {
    config: MatchConfig,
    scorer: Box<dyn Scorer>,
}

impl MatchEngine {
    /// Creates an engine scoring with the configured model.
    ///
    /// # Errors
    ///
    /// Fails fast with `InvalidConfiguration` before any scoring.
    pub fn new(config: MatchConfig) -> Result<Self> {
        let scorer = ModelScorer::new(config.model);
        Self::with_scorer(config, Box::new(scorer))
    }

    /// Creates an engine with a custom scorer; `config.model` is ignored.
    ///
    /// # Errors
    ///
    /// Fails fast with `InvalidConfiguration` before any scoring.
    pub fn with_scorer(config: MatchConfig, scorer: Box<dyn Scorer>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, scorer })
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn run(&self, source: &Collection, target: &Collection) -> MatchOutcome {
        self.run_with(source, target, &NoopObserver, &CancelToken::new())
    }

    /// Runs the match, reporting progress and checking `cancel` between
    /// source values. A cancelled run returns the records of the source
    /// values completed before it stopped.
    pub fn run_with(
        &self,
        source: &Collection,
        target: &Collection,
        observer: &dyn MatchObserver,
        cancel: &CancelToken,
    ) -> MatchOutcome {
        let span = info_span!(
            "match",
            model = %self.config.model,
            sources = source.len(),
            targets = target.len(),
            threshold = self.config.threshold,
        );
        let _guard = span.enter();

        let mut outcome = MatchOutcome {
            stats: MatchStats {
                sources_total: source.len(),
                targets_total: target.len(),
                ..MatchStats::default()
            },
            ..MatchOutcome::default()
        };
        if source.is_empty() || target.is_empty() {
            debug!("empty input, nothing to match");
            return outcome;
        }

        let index = CandidateIndex::new(target, self.config.processor);
        let retriever = Retriever::new(self.scorer.as_ref(), self.config.limit)
            .with_score_cutoff(self.config.threshold);
        let total = source.len();

        let results: Vec<Option<(usize, SourceResult)>> = if self.config.parallel {
            let done = AtomicUsize::new(0);
            source
                .entries()
                .par_iter()
                .map(|entry| {
                    if cancel.is_cancelled() {
                        return None;
                    }
                    let result = self.match_source(entry, &retriever, &index);
                    let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
                    observer.on_progress(finished, total);
                    Some((entry.index, result))
                })
                .collect()
        } else {
            let mut results = Vec::with_capacity(total);
            for (pos, entry) in source.iter().enumerate() {
                if cancel.is_cancelled() {
                    break;
                }
                results.push(Some((entry.index, self.match_source(entry, &retriever, &index))));
                observer.on_progress(pos + 1, total);
            }
            results
        };

        // merge in source order, stopping at the first source that never ran
        for result in results {
            let Some((source_index, result)) = result else {
                break;
            };
            outcome.stats.sources_processed += 1;
            outcome.stats.pairs_scored += result.scored;
            outcome.stats.pairs_pruned += result.pruned;
            if result.records.is_empty() && self.config.emit_unmatched {
                outcome.unmatched_sources.push(source_index);
            }
            outcome.records.extend(result.records);
            outcome.skipped.extend(result.failures);
        }
        outcome.cancelled = outcome.stats.sources_processed < total;

        if outcome.cancelled {
            warn!(
                processed = outcome.stats.sources_processed,
                total, "match cancelled, returning partial results"
            );
        }
        if !outcome.skipped.is_empty() {
            warn!(
                skipped = outcome.skipped.len(),
                "some pairs could not be scored and were treated as score 0"
            );
        }
        info!(
            records = outcome.records.len(),
            matched_sources = outcome.matched_sources(),
            pairs_scored = outcome.stats.pairs_scored,
            pairs_pruned = outcome.stats.pairs_pruned,
            "match finished"
        );
        outcome
    }

    fn match_source(
        &self,
        entry: &Entry,
        retriever: &Retriever<'_>,
        index: &CandidateIndex<'_>,
    ) -> SourceResult {
        let retrieval = retriever.retrieve(&entry.value, index);
        let failures: Vec<ScoringFailure> = retrieval
            .failures
            .into_iter()
            .map(|(target_index, candidate, reason)| {
                warn!(
                    source_index = entry.index,
                    target_index,
                    query = redact_value(&entry.value),
                    candidate = redact_value(candidate),
                    %reason,
                    "skipping pair"
                );
                ScoringFailure {
                    source_index: entry.index,
                    target_index,
                    query: entry.value.clone(),
                    candidate: candidate.to_string(),
                    reason,
                }
            })
            .collect();
        let records: Vec<MatchRecord> = retrieval
            .candidates
            .iter()
            .filter(|candidate| candidate.score >= self.config.threshold)
            .map(|candidate| MatchRecord {
                source_index: entry.index,
                target_index: candidate.index,
                score: candidate.score,
            })
            .collect();
        trace!(
            source_index = entry.index,
            value = redact_value(&entry.value),
            accepted = records.len(),
            "source matched"
        );
        SourceResult {
            records,
            failures,
            scored: retrieval.scored,
            pruned: retrieval.pruned,
        }
    }
}

/// Matches `source` against `target` and returns the accepted records.
///
/// # Errors
///
/// `InvalidConfiguration` when `threshold` is outside `0..=100` or `limit`
/// is zero.
pub fn match_collections(
    source: &Collection,
    target: &Collection,
    scorer: &dyn Scorer,
    threshold: f64,
    limit: Limit,
) -> Result<Vec<MatchRecord>> {
    MatchConfig::new()
        .with_threshold(threshold)
        .with_limit(limit)
        .validate()?;
    let index = CandidateIndex::new(target, rowmatch_model::Processor::Raw);
    let retriever = Retriever::new(scorer, limit).with_score_cutoff(threshold);
    let mut records = Vec::new();
    for entry in source {
        records.extend(
            retriever
                .retrieve(&entry.value, &index)
                .candidates
                .iter()
                .filter(|candidate| candidate.score >= threshold)
                .map(|candidate| MatchRecord {
                    source_index: entry.index,
                    target_index: candidate.index,
                    score: candidate.score,
                }),
        );
    }
    Ok(records)
}
