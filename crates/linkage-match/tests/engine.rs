//! End-to-end tests for searching, fallback and duplicate detection.

use linkage_match::{
    DEFAULT_DUPLICATE_THRESHOLD, MatchOutcome, SearchOptions, classify, find_duplicates,
    find_matches, find_matches_for_record, find_matches_with_fallback, score_pair,
};
use linkage_model::{
    AlgorithmType, CommunityLeader, ConfidenceBand, FieldName, MatchingConfig, Record, Resolution,
    Thresholds,
};

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

fn unrelated(id: &str) -> Record {
    person(id, "Kiros", "Hirut", "1968-01-30", "Wukro")
}

fn scenario_config(algorithm: AlgorithmType) -> MatchingConfig {
    MatchingConfig::default()
        .with_thresholds(Thresholds::new(85.0, 60.0, 30.0).unwrap())
        .unwrap()
        .with_algorithm(algorithm)
}

// =========================================================================
// Interactive search
// =========================================================================

#[test]
fn exact_duplicate_is_the_only_high_candidate() {
    for algorithm in [AlgorithmType::Deterministic, AlgorithmType::Probabilistic] {
        let config = scenario_config(algorithm);
        let source = amanuel("src");
        let pool = vec![unrelated("r-unrelated"), amanuel("r-dup")];

        let outcome = find_matches_for_record(&source, &pool, &config);
        let candidates = outcome.candidates();

        assert_eq!(candidates.len(), 1, "{algorithm:?}");
        assert_eq!(candidates[0].candidate_record_id, "r-dup");
        assert!(candidates[0].score >= 85.0);
        assert_eq!(candidates[0].band, ConfidenceBand::High);
        assert_eq!(
            classify(candidates[0].score, &config.threshold()),
            ConfidenceBand::High
        );
        assert!(candidates[0].matched_on.contains(&FieldName::BirthDate));
    }
}

#[test]
fn unrelated_record_scores_below_low() {
    let config = scenario_config(AlgorithmType::Deterministic);
    let pair = score_pair(&amanuel("src"), &unrelated("x"), &config);
    assert!(pair.score < 30.0, "got {}", pair.score);
}

#[test]
fn field_scores_accompany_every_candidate() {
    let config = scenario_config(AlgorithmType::Deterministic);
    let outcome = find_matches(&amanuel("src"), &[amanuel("dup")], &config);
    let top = outcome.top().unwrap();
    assert_eq!(top.field_scores.len(), 4);
    assert_eq!(top.field_scores.get(FieldName::Village), Some(1.0));
}

#[test]
fn community_leader_never_changes_a_score() {
    let config = MatchingConfig::extended();
    let source = amanuel("src");
    let plain = amanuel("a");
    let with_leader = amanuel("b").with_community_leader(CommunityLeader {
        first_name: Some("Hagos".into()),
        middle_name: Some("G".into()),
        last_name: Some("Berhe".into()),
    });
    let source_with_leader = source.clone().with_community_leader(CommunityLeader {
        first_name: Some("Mulu".into()),
        ..CommunityLeader::default()
    });

    let base = score_pair(&source, &plain, &config);
    assert_eq!(score_pair(&source, &with_leader, &config).score, base.score);
    assert_eq!(score_pair(&source_with_leader, &plain, &config).score, base.score);
}

// =========================================================================
// Fallback policy
// =========================================================================

#[test]
fn deterministic_fallback_is_exposed_not_hidden() {
    let config = scenario_config(AlgorithmType::Probabilistic);
    let source = amanuel("src");
    let weak = person("weak", "Amanuel", "Gebru", "1990-07-15", "Adi Ha");

    let search = find_matches_with_fallback(&source, &[weak], &config, &SearchOptions::default());

    assert_eq!(search.primary_algorithm, AlgorithmType::Probabilistic);
    assert!(matches!(
        search.primary,
        MatchOutcome::NoneAboveThreshold { evaluated: 1, .. }
    ));
    let fallback = search.fallback.as_ref().expect("fallback ran");
    assert_eq!(fallback.top().unwrap().candidate_record_id, "weak");
    assert!(search.used_fallback());
    assert_eq!(search.preferred(), fallback);
}

#[test]
fn no_fallback_when_primary_ranks_something() {
    let config = scenario_config(AlgorithmType::Probabilistic);
    let search = find_matches_with_fallback(
        &amanuel("src"),
        &[amanuel("dup")],
        &config,
        &SearchOptions::default(),
    );
    assert!(search.fallback.is_none());
    assert!(!search.used_fallback());
}

// =========================================================================
// Duplicate detection
// =========================================================================

#[test]
fn duplicates_form_transitive_groups() {
    let pool = vec![
        amanuel("a"),
        amanuel("b"),
        unrelated("c"),
        person("d", "Amanual", "Tesfaye", "1990-03-02", "Adi Ha"),
        person("e", "Selam", "Hagos", "1985-06-01", "Wukro"),
        person("f", "Selam", "Hagos", "1985-06-01", "Wukro"),
    ];

    let groups = find_duplicates(&pool, &MatchingConfig::default(), DEFAULT_DUPLICATE_THRESHOLD);

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].id, "dup-1");
    assert_eq!(groups[0].record_ids(), ["a", "b", "d"]);
    assert_eq!(groups[0].similarity_score, 100.0);
    assert!(groups[0].matching_fields.contains(&FieldName::FirstName));
    assert_eq!(groups[0].resolution, Resolution::Pending);
    assert_eq!(groups[1].record_ids(), ["e", "f"]);
}

#[test]
fn duplicate_resolution_is_a_reviewer_action() {
    let pool = vec![amanuel("a"), amanuel("b")];
    let mut groups = find_duplicates(&pool, &MatchingConfig::default(), 85.0);
    groups[0].resolve(Resolution::Merged);
    assert_eq!(groups[0].resolution, Resolution::Merged);
}

#[test]
fn no_groups_without_duplicates() {
    let pool = vec![amanuel("a"), unrelated("b")];
    assert!(find_duplicates(&pool, &MatchingConfig::default(), 85.0).is_empty());
}
