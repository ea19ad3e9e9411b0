#![deny(unsafe_code)]
//! Fuzzy row matching engine.
//!
//! - [`score`]: string similarity on a 0..=100 scale
//! - [`retrieve`]: top-K candidate retrieval with length pruning
//! - [`engine`]: threshold filtering across a whole source collection
//! - [`assemble`]: projection of matched rows into result records

pub mod assemble;
pub mod engine;
pub mod retrieve;
pub mod score;

pub use assemble::{RecordSink, ResultAssembler};
pub use engine::{CancelToken, MatchEngine, MatchObserver, NoopObserver, match_collections};
pub use retrieve::{Candidate, CandidateIndex, Retrieval, Retriever, retrieve};
pub use score::{ModelScorer, Scorer, levenshtein, partial_ratio, ratio, token_sort_ratio};
