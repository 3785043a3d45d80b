// crates/donor-screen-core/src/runtime/aggregator.rs
// ============================================================================
// Module: Donor Screen Evaluation Aggregator
// Description: Runs the evaluator over an active-rule snapshot.
// Purpose: Combine per-rule matches into a score and recommendation.
// Dependencies: crate::core, crate::runtime::evaluator, tracing
// ============================================================================

//! ## Overview
//! The aggregator is a pure function of a submission, a rule-set snapshot,
//! the score weights, and the as-of timestamp. Rule order affects only flag
//! ordering, never the score or recommendation. A rule whose field does not
//! resolve is skipped with a warning and contributes nothing; persistence is
//! the caller's responsibility.

// ============================================================================
// SECTION: Imports
// ============================================================================

use tracing::warn;

use crate::core::EvaluationFlag;
use crate::core::EvaluationResult;
use crate::core::FieldValue;
use crate::core::Recommendation;
use crate::core::RuleType;
use crate::core::ScoreWeights;
use crate::core::ScreeningRule;
use crate::core::Submission;
use crate::core::Timestamp;
use crate::runtime::evaluator::evaluate_rule;

// ============================================================================
// SECTION: Aggregate Evaluation
// ============================================================================

/// Evaluates a submission against an active-rule snapshot.
///
/// Deterministic and idempotent: unchanged inputs always yield an identical
/// result. Inactive rules in the snapshot are ignored.
#[must_use]
pub fn evaluate_submission(
    submission: &Submission,
    rules: &[ScreeningRule],
    weights: &ScoreWeights,
    evaluated_at: Timestamp,
) -> EvaluationResult {
    let mut flags = Vec::new();
    for rule in rules.iter().filter(|rule| rule.is_active) {
        let Some(actual) = rule.field_path.resolve(submission, evaluated_at) else {
            warn!(
                rule_key = %rule.rule_key,
                field = %rule.field_path,
                "field did not resolve; rule skipped"
            );
            continue;
        };
        if evaluate_rule(rule, &actual) {
            flags.push(build_flag(rule, actual));
        }
    }
    let score = score_flags(&flags, weights);
    let recommendation = recommend(&flags);
    EvaluationResult {
        score,
        recommendation,
        flags,
        evaluated_at,
    }
}

/// Builds a flag from a matched rule and its resolved value.
fn build_flag(rule: &ScreeningRule, actual: FieldValue) -> EvaluationFlag {
    let message = format!(
        "{} {} {} (actual {})",
        rule.field_path, rule.check.op, rule.check.value, actual
    );
    EvaluationFlag {
        rule_key: rule.rule_key.clone(),
        rule_name: rule.rule_name.clone(),
        rule_type: rule.rule_type,
        severity: rule.severity,
        message,
        actual_value: actual,
    }
}

/// Scores a flag set: 100 minus severity penalties, clamped to 0..=100.
///
/// Order-independent over the multiset of matched severities.
fn score_flags(flags: &[EvaluationFlag], weights: &ScoreWeights) -> u8 {
    let penalty: u32 = flags.iter().map(|flag| weights.penalty(flag.severity)).sum();
    u8::try_from(100_u32.saturating_sub(penalty).min(100)).unwrap_or(0)
}

/// Derives the recommendation from the flag set.
fn recommend(flags: &[EvaluationFlag]) -> Recommendation {
    if flags.iter().any(|flag| flag.rule_type == RuleType::HardDisqualify) {
        Recommendation::Unsuitable
    } else if flags.is_empty() {
        Recommendation::Suitable
    } else {
        Recommendation::ReviewRequired
    }
}
