use std::sync::Mutex;

use rowmatch_map::{CancelToken, MatchEngine, MatchObserver, ModelScorer, match_collections};
use rowmatch_model::{
    Collection, Dataset, Limit, MatchConfig, MatchError, Processor, ScoreError, ScoringModel,
};

fn collection(values: &[&str]) -> Collection {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| (i, (*v).to_string()))
        .collect()
}

#[test]
fn empty_inputs_produce_empty_results() {
    let engine = MatchEngine::new(MatchConfig::default()).unwrap();
    let some = collection(&["Alice"]);
    let none = Collection::default();

    let outcome = engine.run(&none, &some);
    assert!(outcome.records.is_empty());
    assert!(!outcome.cancelled);

    let outcome = engine.run(&some, &none);
    assert!(outcome.records.is_empty());
    assert!(outcome.skipped.is_empty());
}

#[test]
fn token_sort_matches_reordered_names() {
    let config = MatchConfig::new()
        .with_model(ScoringModel::TokenSortRatio)
        .with_threshold(80.0)
        .with_limit(Limit::Top(5));
    let engine = MatchEngine::new(config).unwrap();
    let outcome = engine.run(
        &collection(&["Alice Smith"]),
        &collection(&["Smith, Alice", "Bob Jones"]),
    );

    assert_eq!(outcome.records.len(), 1);
    let record = outcome.records[0];
    assert_eq!((record.source_index, record.target_index), (0, 0));
    // the trailing comma on "Smith," is kept by the raw processor
    assert!((record.score - 100.0 * (1.0 - 1.0 / 23.0)).abs() < 1e-9);
}

#[test]
fn normalize_processor_removes_punctuation_before_scoring() {
    let config = MatchConfig::new()
        .with_model(ScoringModel::TokenSortRatio)
        .with_processor(Processor::Normalize);
    let engine = MatchEngine::new(config).unwrap();
    let outcome = engine.run(
        &collection(&["Alice Smith"]),
        &collection(&["Smith, Alice", "Bob Jones"]),
    );
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].score, 100.0);
}

#[test]
fn threshold_above_100_is_invalid_for_every_model() {
    for model in ScoringModel::ALL {
        let config = MatchConfig::new().with_model(model).with_threshold(101.0);
        assert!(matches!(
            MatchEngine::new(config),
            Err(MatchError::InvalidConfiguration { field: "threshold", .. })
        ));
    }
    let scorer = ModelScorer::new(ScoringModel::Ratio);
    let result = match_collections(
        &collection(&["a"]),
        &collection(&["a"]),
        &scorer,
        101.0,
        Limit::Top(5),
    );
    assert!(result.is_err());
}

#[test]
fn accented_characters_are_not_normalised() {
    let engine = MatchEngine::new(MatchConfig::new().with_threshold(0.0)).unwrap();
    let outcome = engine.run(&collection(&["café"]), &collection(&["cafe"]));
    assert_eq!(outcome.records.len(), 1);
    assert!((outcome.records[0].score - 75.0).abs() < 1e-9);
}

#[test]
fn records_are_grouped_by_source_with_best_first() {
    let config = MatchConfig::new()
        .with_model(ScoringModel::PartialRatio)
        .with_threshold(60.0);
    let engine = MatchEngine::new(config).unwrap();
    let source = collection(&["Acme", "Globex"]);
    let target = collection(&["Globex Inc", "Acme Corp", "Acmee", "Initech"]);
    let outcome = engine.run(&source, &target);

    let sources: Vec<usize> = outcome.records.iter().map(|r| r.source_index).collect();
    let mut sorted = sources.clone();
    sorted.sort_unstable();
    assert_eq!(sources, sorted);

    for group in outcome.records.chunk_by(|a, b| a.source_index == b.source_index) {
        assert!(group.windows(2).all(|w| w[0].score >= w[1].score));
    }
    assert_eq!(outcome.records[0].target_index, 1);
    assert!(outcome.records.iter().all(|r| r.score >= 60.0));
}

#[test]
fn limit_caps_candidates_per_source() {
    let engine = MatchEngine::new(
        MatchConfig::new()
            .with_threshold(0.0)
            .with_limit(Limit::Top(2)),
    )
    .unwrap();
    let outcome = engine.run(&collection(&["x"]), &collection(&["x", "xy", "xyz", "w"]));
    assert_eq!(outcome.records.len(), 2);

    let engine = MatchEngine::new(MatchConfig::new().with_threshold(0.0).with_limit(Limit::All))
        .unwrap();
    let outcome = engine.run(&collection(&["x"]), &collection(&["x", "xy", "xyz", "w"]));
    assert_eq!(outcome.records.len(), 4);
}

#[test]
fn sources_without_matches_contribute_nothing_by_default() {
    let source = collection(&["Alice", "Zzzz"]);
    let target = collection(&["Alice"]);

    let outcome = MatchEngine::new(MatchConfig::default())
        .unwrap()
        .run(&source, &target);
    assert_eq!(outcome.records.len(), 1);
    assert!(outcome.unmatched_sources.is_empty());

    let outcome = MatchEngine::new(MatchConfig::default().with_emit_unmatched(true))
        .unwrap()
        .run(&source, &target);
    assert_eq!(outcome.unmatched_sources, vec![1]);
}

#[test]
fn failing_pairs_are_counted_and_do_not_abort() {
    let scorer = |_: &str, candidate: &str| -> Result<f64, ScoreError> {
        if candidate.contains('?') {
            Err(ScoreError::Rejected("unreadable value".into()))
        } else {
            Ok(90.0)
        }
    };
    let engine = MatchEngine::with_scorer(MatchConfig::default(), Box::new(scorer)).unwrap();
    let outcome = engine.run(
        &collection(&["a", "b"]),
        &collection(&["ok", "b?d", "fine"]),
    );
    assert_eq!(outcome.records.len(), 4);
    assert_eq!(outcome.skipped_count(), 2);
    let failure = &outcome.skipped[1];
    assert_eq!((failure.source_index, failure.target_index), (1, 1));
    assert_eq!(failure.candidate, "b?d");
    assert!(failure.to_string().contains("unreadable value"));
}

#[test]
fn failing_pairs_score_zero_and_pass_a_zero_threshold() {
    let scorer =
        |_: &str, _: &str| -> Result<f64, ScoreError> { Err(ScoreError::Rejected("bad".into())) };
    let config = MatchConfig::new().with_threshold(0.0);
    let engine = MatchEngine::with_scorer(config, Box::new(scorer)).unwrap();
    let outcome = engine.run(&collection(&["a"]), &collection(&["b"]));

    assert_eq!(outcome.skipped_count(), 1);
    assert_eq!(outcome.records.len(), 1);
    let record = outcome.records[0];
    assert_eq!((record.source_index, record.target_index), (0, 0));
    assert_eq!(record.score, 0.0);
}

#[test]
fn punctuation_only_values_never_match_under_normalize() {
    let config = MatchConfig::new()
        .with_processor(Processor::Normalize)
        .with_emit_unmatched(true);
    let engine = MatchEngine::new(config).unwrap();
    let outcome = engine.run(&collection(&["???"]), &collection(&["---", "N/A", "#"]));

    assert!(outcome.records.is_empty());
    assert_eq!(outcome.unmatched_sources, vec![0]);
}

#[test]
fn parallel_run_matches_sequential_run() {
    let source = collection(&[
        "Alice Smith", "Bob Jones", "Carol White", "Dan Brown", "Eve Black", "",
    ]);
    let target = collection(&[
        "Smith Alice", "Jones, Bob", "Carol Whyte", "Daniel Brown", "Eva Black", "Frank",
    ]);
    for model in ScoringModel::ALL {
        let config = MatchConfig::new().with_model(model).with_threshold(50.0);
        let sequential = MatchEngine::new(config.clone()).unwrap().run(&source, &target);
        let parallel = MatchEngine::new(config.with_parallel(true))
            .unwrap()
            .run(&source, &target);
        assert_eq!(sequential.records, parallel.records, "{model}");
        assert_eq!(sequential.stats, parallel.stats, "{model}");
    }
}

struct CancelAfter {
    after: usize,
    token: CancelToken,
    seen: Mutex<Vec<(usize, usize)>>,
}

impl MatchObserver for CancelAfter {
    fn on_progress(&self, done: usize, total: usize) {
        self.seen.lock().unwrap().push((done, total));
        if done == self.after {
            self.token.cancel();
        }
    }
}

#[test]
fn cancellation_returns_completed_prefix() {
    let token = CancelToken::new();
    let observer = CancelAfter {
        after: 2,
        token: token.clone(),
        seen: Mutex::new(Vec::new()),
    };
    let engine = MatchEngine::new(MatchConfig::new().with_threshold(0.0)).unwrap();
    let source = collection(&["a", "b", "c", "d"]);
    let target = collection(&["a", "b", "c", "d"]);
    let outcome = engine.run_with(&source, &target, &observer, &token);

    assert!(outcome.cancelled);
    assert_eq!(outcome.stats.sources_processed, 2);
    assert!(outcome.records.iter().all(|r| r.source_index < 2));
    assert_eq!(*observer.seen.lock().unwrap(), vec![(1, 4), (2, 4)]);
}

#[test]
fn collections_built_from_datasets_keep_row_indices() {
    let source = Dataset::from_str_rows("src", &["name"], &[&[""], &["Bob Jones"]]);
    let target = Dataset::from_str_rows("dst", &["holder"], &[&["x"], &[""], &["Bob Jones"]]);
    let source = Collection::from_column(&source, "name").unwrap();
    let target = Collection::from_column(&target, "holder").unwrap();
    let outcome = MatchEngine::new(MatchConfig::default())
        .unwrap()
        .run(&source, &target);
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(
        (outcome.records[0].source_index, outcome.records[0].target_index),
        (1, 2)
    );
}
