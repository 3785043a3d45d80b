// crates/donor-screen-core/tests/engine.rs
// ============================================================================
// Module: Screening Engine Tests
// Description: Engine evaluation over the in-memory stores.
// Purpose: Validate snapshot, persistence, and overwrite semantics.
// Dependencies: donor-screen-core
// ============================================================================

//! Engine and in-memory store contract tests.

use std::sync::Arc;

use donor_screen_core::ComparisonOp;
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
use donor_screen_core::ScoreWeights;
use donor_screen_core::Severity;
use donor_screen_core::Submission;
use donor_screen_core::SubmissionId;
use donor_screen_core::SubmissionStore;
use donor_screen_core::Timestamp;
use donor_screen_core::runtime::InMemoryRuleStore;
use donor_screen_core::runtime::InMemorySubmissionStore;
use donor_screen_core::runtime::ScreeningEngine;

fn draft(key: &str, field_path: FieldPath, op: ComparisonOp, value: RuleValue) -> RuleDraft {
    RuleDraft {
        rule_key: RuleKey::new(key),
        rule_type: RuleType::SoftFlag,
        rule_name: key.to_string(),
        field_path,
        check: RuleCheck {
            op,
            value,
        },
        severity: Severity::Low,
        is_active: true,
        display_order: 0,
        description: None,
    }
}

const AS_OF: Timestamp = Timestamp::from_unix_millis(1_700_000_000_000);

#[test]
fn duplicate_rule_key_fails_without_partial_write() -> Result<(), Box<dyn std::error::Error>> {
    let rules = InMemoryRuleStore::new();
    rules.create(draft(
        "tattoo",
        FieldPath::HasTattoosPiercings,
        ComparisonOp::Eq,
        RuleValue::Bool(true),
    ))?;
    // Same key on an inactive draft still collides; uniqueness spans all
    // rules.
    let mut second = draft(
        "tattoo",
        FieldPath::HasBeenPregnant,
        ComparisonOp::Eq,
        RuleValue::Bool(true),
    );
    second.is_active = false;
    let err = rules.create(second);
    assert!(matches!(err, Err(RuleStoreError::DuplicateRuleKey(_))));
    assert_eq!(rules.list(false)?.len(), 1);
    Ok(())
}

#[test]
fn ill_typed_check_is_rejected_at_save_time() {
    let rules = InMemoryRuleStore::new();
    // Ordering operator against a boolean field.
    let err = rules.create(draft(
        "bad-rule",
        FieldPath::HasChronicIllness,
        ComparisonOp::Gt,
        RuleValue::Number(1.0),
    ));
    assert!(matches!(err, Err(RuleStoreError::Invalid(_))));
    // Text value never matches a field kind in the closed set.
    let err = rules.create(draft(
        "text-rule",
        FieldPath::CalculatedAge,
        ComparisonOp::Eq,
        RuleValue::Text("eighteen".to_string()),
    ));
    assert!(matches!(err, Err(RuleStoreError::Invalid(_))));
}

#[test]
fn listing_orders_hard_rules_first() -> Result<(), Box<dyn std::error::Error>> {
    let rules = InMemoryRuleStore::new();
    let mut soft = draft(
        "soft",
        FieldPath::HasTattoosPiercings,
        ComparisonOp::Eq,
        RuleValue::Bool(true),
    );
    soft.display_order = 1;
    rules.create(soft)?;
    let mut hard = draft(
        "hard",
        FieldPath::CalculatedBmi,
        ComparisonOp::Gt,
        RuleValue::Number(40.0),
    );
    hard.rule_type = RuleType::HardDisqualify;
    hard.severity = Severity::Critical;
    hard.display_order = 9;
    rules.create(hard)?;

    let listed = rules.list(true)?;
    let keys: Vec<&str> = listed.iter().map(|rule| rule.rule_key.as_str()).collect();
    assert_eq!(keys, vec!["hard", "soft"]);
    Ok(())
}

#[test]
fn update_preserves_rule_key() -> Result<(), Box<dyn std::error::Error>> {
    let rules = InMemoryRuleStore::new();
    let created = rules.create(draft(
        "stable-key",
        FieldPath::HasTattoosPiercings,
        ComparisonOp::Eq,
        RuleValue::Bool(true),
    ))?;
    let updated = rules.update(
        created.id,
        RulePatch {
            rule_name: Some("Renamed".to_string()),
            severity: Some(Severity::High),
            ..RulePatch::default()
        },
    )?;
    assert_eq!(updated.rule_key, RuleKey::new("stable-key"));
    assert_eq!(updated.rule_name, "Renamed");
    Ok(())
}

#[test]
fn engine_persists_and_overwrites_results() -> Result<(), Box<dyn std::error::Error>> {
    let rules = Arc::new(InMemoryRuleStore::new());
    let submissions = Arc::new(InMemorySubmissionStore::new());
    let id = SubmissionId::new("sub-1");
    submissions.insert(
        id.clone(),
        Submission {
            has_tattoos_piercings: true,
            ..Submission::default()
        },
    )?;
    rules.create(draft(
        "tattoo",
        FieldPath::HasTattoosPiercings,
        ComparisonOp::Eq,
        RuleValue::Bool(true),
    ))?;

    let engine = ScreeningEngine::new(
        Arc::clone(&rules),
        Arc::clone(&submissions),
        ScoreWeights::default(),
    );
    let first = engine.evaluate(&id, AS_OF)?;
    assert_eq!(first.recommendation, Recommendation::ReviewRequired);
    assert_eq!(submissions.evaluation(&id)?.as_ref(), Some(&first));
    assert!(submissions.list_unevaluated(10)?.is_empty());

    // Deactivating the rule changes only future evaluations; re-running
    // overwrites the stored result with no history.
    let listed = rules.list(false)?;
    rules.set_active(listed[0].id, false)?;
    let second = engine.evaluate(&id, AS_OF)?;
    assert_eq!(second.recommendation, Recommendation::Suitable);
    assert_eq!(submissions.evaluation(&id)?.as_ref(), Some(&second));
    Ok(())
}

#[test]
fn unevaluated_listing_respects_limit_and_order() -> Result<(), Box<dyn std::error::Error>> {
    let submissions = InMemorySubmissionStore::new();
    for index in 0 .. 5 {
        submissions.insert(SubmissionId::new(format!("sub-{index}")), Submission::default())?;
    }
    let ids = submissions.list_unevaluated(3)?;
    let raw: Vec<&str> = ids.iter().map(SubmissionId::as_str).collect();
    assert_eq!(raw, vec!["sub-0", "sub-1", "sub-2"]);
    Ok(())
}
