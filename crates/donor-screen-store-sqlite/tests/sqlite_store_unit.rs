// crates/donor-screen-store-sqlite/tests/sqlite_store_unit.rs
// ============================================================================
// Module: SQLite Store Unit Tests
// Description: Targeted tests for the SQLite screening store.
// Purpose: Validate rule persistence, key uniqueness, submission evaluation
//          writes, and schema version enforcement.
// Dependencies: donor-screen-core, donor-screen-store-sqlite, tempfile
// ============================================================================

//! ## Overview
//! Unit-level tests for the durable store:
//! - Rule create/list/update/delete round trips
//! - Duplicate key rejection via the database constraint
//! - Evaluation writes that overwrite in place
//! - Unevaluated listing order and limits
//! - Schema version mismatch rejection

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use donor_screen_core::ComparisonOp;
use donor_screen_core::EvaluationResult;
use donor_screen_core::FieldPath;
use donor_screen_core::Recommendation;
use donor_screen_core::RuleCheck;
use donor_screen_core::RuleDraft;
use donor_screen_core::RuleKey;
use donor_screen_core::RulePatch;
use donor_screen_core::RuleStore;
use donor_screen_core::RuleStoreError;
use donor_screen_core::RuleType;
use donor_screen_core::RuleValue;
use donor_screen_core::Severity;
use donor_screen_core::Submission;
use donor_screen_core::SubmissionId;
use donor_screen_core::SubmissionStore;
use donor_screen_core::SubmissionStoreError;
use donor_screen_core::Timestamp;
use donor_screen_store_sqlite::SqliteScreeningStore;
use donor_screen_store_sqlite::SqliteStoreConfig;
use donor_screen_store_sqlite::SqliteStoreError;
use tempfile::TempDir;

fn open_store(dir: &TempDir) -> SqliteScreeningStore {
    let config = SqliteStoreConfig::new(dir.path().join("screening.db"));
    SqliteScreeningStore::open(&config).expect("store opens")
}

fn draft(key: &str) -> RuleDraft {
    RuleDraft {
        rule_key: RuleKey::new(key),
        rule_type: RuleType::SoftFlag,
        rule_name: format!("Rule {key}"),
        field_path: FieldPath::HasTattoosPiercings,
        check: RuleCheck {
            op: ComparisonOp::Eq,
            value: RuleValue::Bool(true),
        },
        severity: Severity::Low,
        is_active: true,
        display_order: 0,
        description: None,
    }
}

#[test]
fn rule_round_trip_survives_reopen() {
    let dir = TempDir::new().expect("tempdir");
    let config = SqliteStoreConfig::new(dir.path().join("screening.db"));
    {
        let store = SqliteScreeningStore::open(&config).expect("store opens");
        let mut bmi = draft("bmi-limit");
        bmi.rule_type = RuleType::HardDisqualify;
        bmi.field_path = FieldPath::CalculatedBmi;
        bmi.check = RuleCheck {
            op: ComparisonOp::Gt,
            value: RuleValue::Number(40.0),
        };
        bmi.severity = Severity::Critical;
        bmi.description = Some("BMI ceiling".to_string());
        store.create(bmi).expect("create");
    }
    let store = SqliteScreeningStore::open(&config).expect("reopen");
    let rules = store.list(false).expect("list");
    assert_eq!(rules.len(), 1);
    let rule = &rules[0];
    assert_eq!(rule.rule_key, RuleKey::new("bmi-limit"));
    assert_eq!(rule.rule_type, RuleType::HardDisqualify);
    assert_eq!(rule.field_path, FieldPath::CalculatedBmi);
    assert_eq!(rule.check.op, ComparisonOp::Gt);
    assert_eq!(rule.check.value, RuleValue::Number(40.0));
    assert_eq!(rule.severity, Severity::Critical);
    assert_eq!(rule.description.as_deref(), Some("BMI ceiling"));
}

#[test]
fn duplicate_rule_key_maps_to_constraint_error() {
    let dir = TempDir::new().expect("tempdir");
    let store = open_store(&dir);
    store.create(draft("tattoo")).expect("first create");
    let err = store.create(draft("tattoo"));
    assert!(matches!(err, Err(RuleStoreError::DuplicateRuleKey(_))));
    assert_eq!(store.list(false).expect("list").len(), 1);
}

#[test]
fn ill_typed_check_is_rejected_before_write() {
    let dir = TempDir::new().expect("tempdir");
    let store = open_store(&dir);
    let mut bad = draft("bad");
    bad.check = RuleCheck {
        op: ComparisonOp::Gt,
        value: RuleValue::Bool(true),
    };
    let err = store.create(bad);
    assert!(matches!(err, Err(RuleStoreError::Invalid(_))));
    assert!(store.list(false).expect("list").is_empty());
}

#[test]
fn update_merges_patch_and_preserves_key() {
    let dir = TempDir::new().expect("tempdir");
    let store = open_store(&dir);
    let created = store.create(draft("stable")).expect("create");
    let updated = store
        .update(
            created.id,
            RulePatch {
                rule_name: Some("Renamed".to_string()),
                severity: Some(Severity::High),
                is_active: Some(false),
                ..RulePatch::default()
            },
        )
        .expect("update");
    assert_eq!(updated.rule_key, RuleKey::new("stable"));
    assert_eq!(updated.rule_name, "Renamed");
    assert_eq!(updated.severity, Severity::High);
    assert!(!updated.is_active);
    assert!(store.list(true).expect("list").is_empty());
}

#[test]
fn delete_unknown_rule_reports_id() {
    let dir = TempDir::new().expect("tempdir");
    let store = open_store(&dir);
    let created = store.create(draft("doomed")).expect("create");
    store.delete(created.id).expect("delete");
    let err = store.delete(created.id);
    assert!(matches!(err, Err(RuleStoreError::UnknownRule(id)) if id == created.id));
}

#[test]
fn active_listing_orders_hard_rules_first() {
    let dir = TempDir::new().expect("tempdir");
    let store = open_store(&dir);
    let mut soft = draft("soft");
    soft.display_order = 1;
    store.create(soft).expect("soft");
    let mut hard = draft("hard");
    hard.rule_type = RuleType::HardDisqualify;
    hard.field_path = FieldPath::CalculatedBmi;
    hard.check = RuleCheck {
        op: ComparisonOp::Gt,
        value: RuleValue::Number(40.0),
    };
    hard.severity = Severity::Critical;
    hard.display_order = 9;
    store.create(hard).expect("hard");

    let keys: Vec<String> = store
        .list(true)
        .expect("list")
        .into_iter()
        .map(|rule| rule.rule_key.as_str().to_string())
        .collect();
    assert_eq!(keys, vec!["hard", "soft"]);
}

#[test]
fn evaluation_write_overwrites_in_place() {
    let dir = TempDir::new().expect("tempdir");
    let store = open_store(&dir);
    let id = SubmissionId::new("sub-1");
    let submission = Submission {
        has_tattoos_piercings: true,
        ..Submission::default()
    };
    store.insert_submission(&id, &submission).expect("insert");
    assert_eq!(store.get(&id).expect("get"), submission);

    let first = EvaluationResult {
        score: 95,
        recommendation: Recommendation::ReviewRequired,
        flags: Vec::new(),
        evaluated_at: Timestamp::from_unix_millis(1_700_000_000_000),
    };
    store.save_evaluation(&id, &first).expect("first write");
    assert!(store.list_unevaluated(10).expect("list").is_empty());

    let second = EvaluationResult {
        score: 100,
        recommendation: Recommendation::Suitable,
        flags: Vec::new(),
        evaluated_at: Timestamp::from_unix_millis(1_700_000_100_000),
    };
    store.save_evaluation(&id, &second).expect("second write");
    assert!(store.list_unevaluated(10).expect("list").is_empty());
}

#[test]
fn save_evaluation_for_unknown_submission_fails() {
    let dir = TempDir::new().expect("tempdir");
    let store = open_store(&dir);
    let result = EvaluationResult {
        score: 100,
        recommendation: Recommendation::Suitable,
        flags: Vec::new(),
        evaluated_at: Timestamp::from_unix_millis(1_700_000_000_000),
    };
    let err = store.save_evaluation(&SubmissionId::new("ghost"), &result);
    assert!(matches!(err, Err(SubmissionStoreError::UnknownSubmission(_))));
}

#[test]
fn unevaluated_listing_respects_limit_and_insertion_order() {
    let dir = TempDir::new().expect("tempdir");
    let store = open_store(&dir);
    for index in 0 .. 5 {
        store
            .insert_submission(&SubmissionId::new(format!("sub-{index}")), &Submission::default())
            .expect("insert");
    }
    let ids = store.list_unevaluated(3).expect("list");
    let raw: Vec<&str> = ids.iter().map(SubmissionId::as_str).collect();
    assert_eq!(raw, vec!["sub-0", "sub-1", "sub-2"]);
}

#[test]
fn schema_version_mismatch_is_rejected() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("screening.db");
    {
        let conn = rusqlite::Connection::open(&path).expect("raw open");
        conn.pragma_update(None, "user_version", 99).expect("set version");
    }
    let err = SqliteScreeningStore::open(&SqliteStoreConfig::new(path));
    assert!(matches!(
        err,
        Err(SqliteStoreError::VersionMismatch {
            expected: 1,
            actual: 99,
        })
    ));
}
