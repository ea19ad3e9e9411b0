//! Similarity scorers on a 0..=100 scale.
//!
//! Ratio and Levenshtein come straight from `rapidfuzz` distances; Partial
//! Ratio and Token Sort Ratio are built on top of the Ratio score. All
//! lengths are counted in `char`s.

use rapidfuzz::distance::{indel, levenshtein as lev};
use rowmatch_model::{ScoreError, ScoringModel};

/// Scores a query against a candidate.
///
/// The query is the first argument; implementations may be asymmetric.
pub trait Scorer: Send + Sync {
    /// Similarity in `0..=100`.
    ///
    /// # Errors
    ///
    /// [`ScoreError`] when the pair cannot be scored.
    fn score(&self, query: &str, candidate: &str) -> Result<f64, ScoreError>;

    /// Highest score reachable for strings of these lengths.
    ///
    /// Used to rule candidates out without scoring them; must never be lower
    /// than a score the pair can actually reach.
    fn upper_bound(&self, _query_len: usize, _candidate_len: usize) -> f64 {
        100.0
    }
}

impl<F> Scorer for F
where
    F: Fn(&str, &str) -> Result<f64, ScoreError> + Send + Sync,
{
    fn score(&self, query: &str, candidate: &str) -> Result<f64, ScoreError> {
        self(query, candidate)
    }
}

/// One of the built-in scoring models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelScorer {
    model: ScoringModel,
}

impl ModelScorer {
    pub fn new(model: ScoringModel) -> Self {
        Self { model }
    }

    pub fn model(&self) -> ScoringModel {
        self.model
    }

    /// Infallible scoring with the configured model.
    pub fn similarity(&self, query: &str, candidate: &str) -> f64 {
        match self.model {
            ScoringModel::Ratio => ratio(query, candidate),
            ScoringModel::PartialRatio => partial_ratio(query, candidate),
            ScoringModel::TokenSortRatio => token_sort_ratio(query, candidate),
            ScoringModel::Levenshtein => levenshtein(query, candidate),
        }
    }
}

impl Scorer for ModelScorer {
    fn score(&self, query: &str, candidate: &str) -> Result<f64, ScoreError> {
        Ok(self.similarity(query, candidate))
    }

    fn upper_bound(&self, query_len: usize, candidate_len: usize) -> f64 {
        let (shorter, longer) = if query_len <= candidate_len {
            (query_len, candidate_len)
        } else {
            (candidate_len, query_len)
        };
        if longer == 0 {
            return 100.0;
        }
        match self.model {
            // indel distance is at least the length difference
            ScoringModel::Ratio => 200.0 * shorter as f64 / (shorter + longer) as f64,
            // edit distance is at least the length difference
            ScoringModel::Levenshtein => 100.0 * shorter as f64 / longer as f64,
            ScoringModel::PartialRatio | ScoringModel::TokenSortRatio => 100.0,
        }
    }
}

/// Normalised indel similarity: `100 * (1 - indel(a, b) / (len(a) + len(b)))`.
///
/// Two empty strings score 100.
pub fn ratio(a: &str, b: &str) -> f64 {
    100.0 * indel::normalized_similarity(a.chars(), b.chars())
}

fn ratio_chars(a: &[char], b: &[char]) -> f64 {
    100.0 * indel::normalized_similarity(a.iter().copied(), b.iter().copied())
}

/// Best Ratio of the shorter string against any window of the longer one.
///
/// Windows slide one character at a time and include the partial overlaps at
/// both edges, so a prefix or suffix match is found as well. Containment
/// scores 100.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (needle, haystack) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if needle.is_empty() {
        return if haystack.is_empty() { 100.0 } else { 0.0 };
    }
    if needle.len() == haystack.len() {
        return ratio_chars(&needle, &haystack);
    }

    let m = needle.len() as isize;
    let n = haystack.len() as isize;
    let mut best = 0.0_f64;
    for start in (1 - m)..n {
        let lo = start.max(0) as usize;
        let hi = (start + m).min(n) as usize;
        let score = ratio_chars(&needle, &haystack[lo..hi]);
        if score > best {
            best = score;
            if best >= 100.0 {
                break;
            }
        }
    }
    best
}

/// Ratio after sorting whitespace-separated tokens and rejoining them with
/// single spaces.
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

fn sorted_tokens(value: &str) -> String {
    let mut tokens: Vec<&str> = value.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// `100 - distance(a, b) * 100 / max(len(a), len(b))`.
///
/// Two empty strings score 100; exactly one empty string scores 0.
pub fn levenshtein(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 100.0;
    }
    let distance = lev::distance(a.chars(), b.chars());
    100.0 - distance as f64 * 100.0 / longest as f64
}
