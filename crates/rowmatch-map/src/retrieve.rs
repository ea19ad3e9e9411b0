//! Top-K candidate retrieval.
//!
//! Candidates are scanned in collection order while a buffer keeps the best
//! `limit` hits sorted by descending score, earlier candidates first on ties.
//! Two shortcuts avoid scoring pairs that cannot make it into the buffer:
//! a length-derived upper bound (see [`Scorer::upper_bound`]) and an early
//! exit once the buffer is full of perfect scores. Both leave the result
//! identical to an exhaustive scan.

use rowmatch_model::{Collection, Limit, Processor, ScoreError};

use crate::score::Scorer;

/// Slack added to length bounds so float rounding never prunes a reachable score.
const BOUND_EPSILON: f64 = 1e-9;

/// A retrieved candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate<'a> {
    /// Row index of the candidate in its dataset.
    pub index: usize,
    /// Candidate text as stored in the collection.
    pub value: &'a str,
    pub score: f64,
}

#[derive(Debug, Clone)]
struct Prepared<'a> {
    index: usize,
    value: &'a str,
    text: String,
    len: usize,
}

/// Target values prepared once per run: processed text and char length.
#[derive(Debug, Clone)]
pub struct CandidateIndex<'a> {
    processor: Processor,
    entries: Vec<Prepared<'a>>,
}

impl<'a> CandidateIndex<'a> {
    pub fn new(targets: &'a Collection, processor: Processor) -> Self {
        // values that process down to nothing are treated like blank cells
        let entries = targets
            .iter()
            .filter_map(|entry| {
                let text = processor.apply(&entry.value);
                if text.trim().is_empty() {
                    return None;
                }
                let len = text.chars().count();
                Some(Prepared {
                    index: entry.index,
                    value: entry.value.as_str(),
                    text,
                    len,
                })
            })
            .collect();
        Self { processor, entries }
    }

    pub fn processor(&self) -> Processor {
        self.processor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// What one retrieval produced.
#[derive(Debug, Clone, Default)]
pub struct Retrieval<'a> {
    /// Best candidates, highest score first.
    pub candidates: Vec<Candidate<'a>>,
    /// Candidates that could not be scored: `(row index, value, reason)`.
    pub failures: Vec<(usize, &'a str, ScoreError)>,
    pub scored: usize,
    pub pruned: usize,
}

/// Retrieves the best candidates for a query with a given scorer.
pub struct Retriever<'s> {
    scorer: &'s dyn Scorer,
    limit: Limit,
    score_cutoff: Option<f64>,
    pruning: bool,
}

impl<'s> Retriever<'s> {
    pub fn new(scorer: &'s dyn Scorer, limit: Limit) -> Self {
        Self {
            scorer,
            limit,
            score_cutoff: None,
            pruning: true,
        }
    }

    /// Only return candidates scoring at least `cutoff`.
    ///
    /// Candidates whose upper bound is below the cutoff are not scored.
    #[must_use]
    pub fn with_score_cutoff(mut self, cutoff: f64) -> Self {
        self.score_cutoff = Some(cutoff);
        self
    }

    /// Score every candidate. Results are the same; only the work differs.
    #[must_use]
    pub fn without_pruning(mut self) -> Self {
        self.pruning = false;
        self
    }

    /// Scores `query` against `index` and keeps the best hits.
    ///
    /// The query goes through the same processor as the candidates; a query
    /// that processes down to nothing retrieves nothing.
    pub fn retrieve<'a>(&self, query: &str, index: &CandidateIndex<'a>) -> Retrieval<'a> {
        let query = index.processor.apply(query);
        let query_len = query.chars().count();
        let cap = self.limit.cap();
        let mut out = Retrieval::default();
        if cap == Some(0) || query.trim().is_empty() {
            return out;
        }

        for (pos, entry) in index.entries.iter().enumerate() {
            if self.pruning {
                if let Some(cap) = cap {
                    if out.candidates.len() == cap && out.candidates[cap - 1].score >= 100.0 {
                        // nothing can beat a full buffer of perfect scores
                        out.pruned += index.entries.len() - pos;
                        break;
                    }
                }
                if self.excluded_by_bound(query_len, entry.len, &out.candidates, cap) {
                    out.pruned += 1;
                    continue;
                }
            }

            out.scored += 1;
            // a pair that cannot be scored is reported and ranks as score 0
            let score = match self.scorer.score(&query, &entry.text) {
                Ok(score) if score.is_finite() && (0.0..=100.0).contains(&score) => score,
                Ok(score) => {
                    out.failures
                        .push((entry.index, entry.value, ScoreError::OutOfRange(score)));
                    0.0
                }
                Err(err) => {
                    out.failures.push((entry.index, entry.value, err));
                    0.0
                }
            };
            if self.score_cutoff.is_some_and(|cutoff| score < cutoff) {
                continue;
            }
            insert_ranked(
                &mut out.candidates,
                Candidate {
                    index: entry.index,
                    value: entry.value,
                    score,
                },
                cap,
            );
        }
        out
    }

    fn excluded_by_bound(
        &self,
        query_len: usize,
        candidate_len: usize,
        kept: &[Candidate<'_>],
        cap: Option<usize>,
    ) -> bool {
        let bound = self.scorer.upper_bound(query_len, candidate_len) + BOUND_EPSILON;
        if self.score_cutoff.is_some_and(|cutoff| bound < cutoff) {
            return true;
        }
        // a later candidate loses ties, so it must strictly beat the last kept score
        matches!(cap, Some(cap) if kept.len() == cap && bound <= kept[cap - 1].score)
    }
}

/// Inserts after every kept candidate with a score >= the new one, then trims.
fn insert_ranked<'a>(kept: &mut Vec<Candidate<'a>>, candidate: Candidate<'a>, cap: Option<usize>) {
    let pos = kept.partition_point(|c| c.score >= candidate.score);
    if let Some(cap) = cap {
        if pos >= cap {
            return;
        }
        kept.insert(pos, candidate);
        kept.truncate(cap);
    } else {
        kept.insert(pos, candidate);
    }
}

/// Best `limit` candidates for `query` among `candidates`, values compared as is.
pub fn retrieve<'a>(
    query: &str,
    candidates: &'a Collection,
    scorer: &dyn Scorer,
    limit: Limit,
) -> Vec<Candidate<'a>> {
    let index = CandidateIndex::new(candidates, Processor::Raw);
    Retriever::new(scorer, limit)
        .retrieve(query, &index)
        .candidates
}
