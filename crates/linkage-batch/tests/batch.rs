//! Integration tests for batch jobs driven through the registry.

use std::cell::Cell;
use std::thread;
use std::time::Duration;

use linkage_batch::{
    AutoMatchStrategy, BatchError, BatchJobRegistry, BatchMatchConfig, BatchMatchJob,
    DuplicateHandling, JobStatus, MatchDecision,
};
use linkage_model::{AlgorithmType, FieldName, MatchingConfig, Record};

fn person(id: &str, first: &str, last: &str, birth: &str, village: &str) -> Record {
    Record::new(id)
        .with(FieldName::FirstName, first)
        .with(FieldName::LastName, last)
        .with(FieldName::BirthDate, birth)
        .with(FieldName::Village, village)
}

fn amanuel(id: &str) -> Record {
    person(id, "Amanuel", "Tesfaye", "1990-03-02", "Adi Ha")
}

fn targets() -> Vec<Record> {
    vec![
        amanuel("t-amanuel"),
        person("t-selam", "Selam", "Hagos", "1985-06-01", "Wukro"),
        person("t-kiros", "Kiros", "Hirut", "1968-01-30", "Wukro"),
    ]
}

fn sources() -> Vec<Record> {
    vec![
        amanuel("s-1"),
        person("s-2", "Selam", "Hagos", "1990-01-01", "Wukro"),
        person("s-3", "Zewdu", "Mengistu", "1950-12-12", "Axum"),
    ]
}

fn run(registry: &BatchJobRegistry, job_id: &str) -> BatchMatchJob {
    registry
        .run_batch_match_job(
            job_id,
            &MatchingConfig::default(),
            AlgorithmType::Deterministic,
            |_| {},
            |_| {},
        )
        .unwrap()
}

fn strategy(strategy: AutoMatchStrategy) -> BatchMatchConfig {
    BatchMatchConfig::default()
        .with_strategy(strategy)
        .with_batch_size(2)
}

// =========================================================================
// Decisions and progress
// =========================================================================

#[test]
fn threshold_based_run_counts_each_decision() {
    let registry = BatchJobRegistry::new();
    let id = registry
        .create_batch_match_job(sources(), targets(), strategy(AutoMatchStrategy::ThresholdBased))
        .unwrap();

    let mut seen = Vec::new();
    let completions = Cell::new(0);
    let job = registry
        .run_batch_match_job(
            &id,
            &MatchingConfig::default(),
            AlgorithmType::Deterministic,
            |progress| seen.push(progress.processed_records),
            |job| {
                assert_eq!(job.status, JobStatus::Completed);
                completions.set(completions.get() + 1);
            },
        )
        .unwrap();

    assert_eq!(seen, [1, 2, 3]);
    assert_eq!(completions.get(), 1);
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.algorithm_type, Some(AlgorithmType::Deterministic));
    assert_eq!(job.progress.auto_matched, 1);
    assert_eq!(job.progress.manual_review_queue, 1);
    assert_eq!(job.progress.no_match_found, 1);

    let decisions: Vec<_> = job.results.iter().map(|r| (r.source_id.as_str(), r.decision)).collect();
    assert_eq!(
        decisions,
        [
            ("s-1", MatchDecision::AutoMatched),
            ("s-2", MatchDecision::ManualReview),
            ("s-3", MatchDecision::NoMatch),
        ]
    );
    assert_eq!(job.results[0].accepted_ids().collect::<Vec<_>>(), ["t-amanuel"]);
    assert_eq!(job.results[1].candidates[0].candidate_record_id, "t-selam");

    let summary = registry.generate_batch_summary(&id).unwrap();
    assert_eq!(summary.needs_review, ["s-2"]);
    assert_eq!(summary.distribution.high, 1);
    assert_eq!(summary.processed_records, 3);
}

#[test]
fn manual_review_all_is_idempotent() {
    let registry = BatchJobRegistry::new();
    let config = strategy(AutoMatchStrategy::ManualReviewAll);
    let first = registry
        .create_batch_match_job(sources(), targets(), config.clone())
        .unwrap();
    let second = registry
        .create_batch_match_job(sources(), targets(), config)
        .unwrap();

    let a = run(&registry, &first);
    let b = run(&registry, &second);

    assert_eq!(a.progress.auto_matched, 0);
    assert_eq!(a.progress.manual_review_queue, b.progress.manual_review_queue);
    assert!(a.progress.manual_review_queue >= 2);
    for (left, right) in a.results.iter().zip(&b.results) {
        assert_eq!(left.candidates, right.candidates);
    }
}

#[test]
fn merge_links_a_target_claimed_twice() {
    let registry = BatchJobRegistry::new();
    let config = strategy(AutoMatchStrategy::ThresholdBased)
        .with_duplicate_handling(DuplicateHandling::Merge);
    let id = registry
        .create_batch_match_job(vec![amanuel("s-1"), amanuel("s-2")], targets(), config)
        .unwrap();

    let job = run(&registry, &id);

    assert_eq!(job.progress.auto_matched, 2);
    assert_eq!(job.results[1].duplicate_of.as_deref(), Some("s-1"));
}

#[test]
fn skip_sends_a_repeat_claim_to_review() {
    let registry = BatchJobRegistry::new();
    let config = strategy(AutoMatchStrategy::ThresholdBased);
    let id = registry
        .create_batch_match_job(vec![amanuel("s-1"), amanuel("s-2")], targets(), config)
        .unwrap();

    let job = run(&registry, &id);

    assert_eq!(job.progress.auto_matched, 1);
    assert_eq!(job.results[1].decision, MatchDecision::ManualReview);
}

#[test]
fn strict_strategies_accept_a_clear_leader() {
    for strict in [AutoMatchStrategy::BestMatchOnly, AutoMatchStrategy::HighConfidenceOnly] {
        let registry = BatchJobRegistry::new();
        let id = registry
            .create_batch_match_job(vec![amanuel("s-1")], targets(), strategy(strict))
            .unwrap();

        let job = run(&registry, &id);

        assert_eq!(job.results[0].decision, MatchDecision::AutoMatched, "{strict}");
        assert_eq!(job.results[0].accepted_ids().collect::<Vec<_>>(), ["t-amanuel"]);
    }
}

#[test]
fn tied_targets_go_to_review_even_when_one_candidate_is_kept() {
    let tied = vec![
        amanuel("t-1"),
        amanuel("t-2"),
        person("t-selam", "Selam", "Hagos", "1985-06-01", "Wukro"),
    ];
    for strict in [AutoMatchStrategy::BestMatchOnly, AutoMatchStrategy::HighConfidenceOnly] {
        for max_matches in [1, 5] {
            let registry = BatchJobRegistry::new();
            let config = strategy(strict).with_max_matches(max_matches);
            let id = registry
                .create_batch_match_job(vec![amanuel("s-1")], tied.clone(), config)
                .unwrap();

            let job = run(&registry, &id);
            let result = &job.results[0];

            assert_eq!(result.decision, MatchDecision::ManualReview, "{strict} max={max_matches}");
            assert_eq!(result.accepted_ids().count(), 0);
            assert!(result.candidates.len() <= max_matches);
            assert_eq!(job.progress.manual_review_queue, 1);
        }
    }
}

#[test]
fn threshold_based_takes_the_first_of_tied_targets() {
    let registry = BatchJobRegistry::new();
    let config = strategy(AutoMatchStrategy::ThresholdBased).with_max_matches(1);
    let id = registry
        .create_batch_match_job(vec![amanuel("s-1")], vec![amanuel("t-1"), amanuel("t-2")], config)
        .unwrap();

    let job = run(&registry, &id);

    assert_eq!(job.results[0].accepted_ids().collect::<Vec<_>>(), ["t-1"]);
    assert_eq!(job.results[0].candidates.len(), 1);
}

// =========================================================================
// Failures
// =========================================================================

#[test]
fn empty_target_pool_ends_in_error() {
    let registry = BatchJobRegistry::new();
    let id = registry
        .create_batch_match_job(sources(), Vec::new(), BatchMatchConfig::default())
        .unwrap();

    let completed = Cell::new(None);
    let job = registry
        .run_batch_match_job(
            &id,
            &MatchingConfig::default(),
            AlgorithmType::Probabilistic,
            |_| {},
            |job| completed.set(Some(job.status)),
        )
        .unwrap();

    assert_eq!(job.status, JobStatus::Error);
    assert_eq!(job.failure.as_deref(), Some("target pool is empty"));
    assert!(job.results.is_empty());
    assert_eq!(completed.get(), Some(JobStatus::Error));
}

#[test]
fn empty_source_list_ends_in_error() {
    let registry = BatchJobRegistry::new();
    let id = registry
        .create_batch_match_job(Vec::new(), targets(), BatchMatchConfig::default())
        .unwrap();
    assert_eq!(run(&registry, &id).status, JobStatus::Error);
}

#[test]
fn blank_source_ids_are_recorded_and_skipped() {
    let registry = BatchJobRegistry::new();
    let sources = vec![amanuel("s-1"), amanuel("  "), amanuel("s-3")];
    let id = registry
        .create_batch_match_job(sources, targets(), BatchMatchConfig::default())
        .unwrap();

    let job = run(&registry, &id);

    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.progress.processed_records, 3);
    assert_eq!(job.progress.errors, 1);
    assert_eq!(job.errors[0].position, 1);
    assert_eq!(job.errors[0].record_id, None);
    assert_eq!(job.results.len(), 2);
}

#[test]
fn invalid_batch_settings_are_rejected_at_creation() {
    let registry = BatchJobRegistry::new();
    let err = registry
        .create_batch_match_job(sources(), targets(), BatchMatchConfig::default().with_batch_size(0))
        .unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"invalid batch setting batchSize: must be at least 1");
}

#[test]
fn finished_jobs_cannot_run_again() {
    let registry = BatchJobRegistry::new();
    let id = registry
        .create_batch_match_job(sources(), targets(), BatchMatchConfig::default())
        .unwrap();
    run(&registry, &id);

    let err = registry
        .run_batch_match_job(
            &id,
            &MatchingConfig::default(),
            AlgorithmType::Deterministic,
            |_| {},
            |_| {},
        )
        .unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"batch job cannot move from completed to running");
    assert!(registry.cancel_batch_job(&id).is_err());
}

#[test]
fn pending_jobs_can_be_withdrawn() {
    let registry = BatchJobRegistry::new();
    let id = registry
        .create_batch_match_job(sources(), targets(), BatchMatchConfig::default())
        .unwrap();

    registry.cancel_batch_job(&id).unwrap();

    let job = registry.get_batch_job(&id).unwrap();
    assert_eq!(job.status, JobStatus::Cancelled);
    assert!(job.finished_at.is_some());
    let err = registry
        .run_batch_match_job(
            &id,
            &MatchingConfig::default(),
            AlgorithmType::Deterministic,
            |_| {},
            |_| {},
        )
        .unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"batch job cannot move from cancelled to running");
    assert!(registry.get_batch_job(&id).unwrap().results.is_empty());
}

#[test]
fn unknown_jobs_are_reported() {
    let registry = BatchJobRegistry::new();
    assert_eq!(
        registry.cancel_batch_job("batch-404"),
        Err(BatchError::UnknownJob("batch-404".to_string()))
    );
    assert!(registry.get_batch_job("batch-404").is_none());
}

// =========================================================================
// Cancellation and pause
// =========================================================================

#[test]
fn cancelling_after_a_chunk_keeps_earlier_results() {
    let registry = BatchJobRegistry::new();
    let sources: Vec<Record> = (0..10).map(|i| amanuel(&format!("s-{i}"))).collect();
    let config = BatchMatchConfig::default()
        .with_strategy(AutoMatchStrategy::ManualReviewAll)
        .with_batch_size(3);
    let id = registry.create_batch_match_job(sources, targets(), config).unwrap();

    let job = registry
        .run_batch_match_job(
            &id,
            &MatchingConfig::default(),
            AlgorithmType::Deterministic,
            |progress| {
                if progress.processed_records == 6 {
                    registry.cancel_batch_job(&id).unwrap();
                }
            },
            |_| {},
        )
        .unwrap();

    assert_eq!(job.status, JobStatus::Cancelled);
    assert!(job.progress.processed_records <= 2 * 3);
    let ids: Vec<_> = job.results.iter().map(|r| r.source_id.as_str()).collect();
    assert_eq!(ids, ["s-0", "s-1", "s-2", "s-3", "s-4", "s-5"]);
    assert_eq!(registry.get_batch_job(&id).unwrap(), job);
}

#[test]
fn paused_job_resumes_from_another_thread() {
    let registry = BatchJobRegistry::new();
    let sources: Vec<Record> = (0..4).map(|i| amanuel(&format!("s-{i}"))).collect();
    let config = BatchMatchConfig::default().with_batch_size(2);
    let id = registry.create_batch_match_job(sources, targets(), config).unwrap();

    thread::scope(|scope| {
        let (registry, id) = (&registry, id.as_str());
        let resumer = scope.spawn(move || {
            while registry.get_batch_job(id).map(|job| job.status) != Some(JobStatus::Paused) {
                thread::sleep(Duration::from_millis(1));
            }
            registry.resume_batch_job(id).unwrap();
        });

        let job = registry
            .run_batch_match_job(
                id,
                &MatchingConfig::default(),
                AlgorithmType::Deterministic,
                |progress| {
                    if progress.processed_records == 2 {
                        registry.pause_batch_job(id).unwrap();
                    }
                },
                |_| {},
            )
            .unwrap();

        resumer.join().unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.progress.processed_records, 4);
    });
}

#[test]
fn cancelling_a_paused_job_stops_it() {
    let registry = BatchJobRegistry::new();
    let sources: Vec<Record> = (0..4).map(|i| amanuel(&format!("s-{i}"))).collect();
    let config = BatchMatchConfig::default().with_batch_size(2);
    let id = registry.create_batch_match_job(sources, targets(), config).unwrap();

    thread::scope(|scope| {
        let (registry, id) = (&registry, id.as_str());
        let canceller = scope.spawn(move || {
            while registry.get_batch_job(id).map(|job| job.status) != Some(JobStatus::Paused) {
                thread::sleep(Duration::from_millis(1));
            }
            registry.cancel_batch_job(id).unwrap();
        });

        let job = registry
            .run_batch_match_job(
                id,
                &MatchingConfig::default(),
                AlgorithmType::Deterministic,
                |progress| {
                    if progress.processed_records == 2 {
                        registry.pause_batch_job(id).unwrap();
                    }
                },
                |_| {},
            )
            .unwrap();

        canceller.join().unwrap();
        assert_eq!(job.status, JobStatus::Cancelled);
        assert_eq!(job.progress.processed_records, 2);
    });
}
