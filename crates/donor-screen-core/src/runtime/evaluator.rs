// crates/donor-screen-core/src/runtime/evaluator.rs
// ============================================================================
// Module: Donor Screen Rule Evaluator
// Description: Pure match/no-match evaluation of one rule against a value.
// Purpose: Convert resolved field values into rule match outcomes.
// Dependencies: crate::core, tracing
// ============================================================================

//! ## Overview
//! The evaluator applies one rule's comparison spec to a resolved field
//! value. It is pure and side-effect-free: the same rule and value always
//! produce the same outcome. A value that cannot be compared (type mismatch)
//! never matches and never errors; the mismatch is logged as a warning
//! because save-time validation should have prevented it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use tracing::warn;

use crate::core::ComparisonOp;
use crate::core::FieldValue;
use crate::core::RuleValue;
use crate::core::ScreeningRule;

// ============================================================================
// SECTION: Rule Evaluation
// ============================================================================

/// Evaluates a rule's comparison spec against a resolved field value.
#[must_use]
pub fn evaluate_rule(rule: &ScreeningRule, actual: &FieldValue) -> bool {
    match rule.check.op {
        ComparisonOp::Gt | ComparisonOp::Gte | ComparisonOp::Lt | ComparisonOp::Lte => {
            match_ordering(rule, actual)
        }
        ComparisonOp::Eq => match_equality(actual, &rule.check.value) == Some(true),
        ComparisonOp::Neq => match_equality(actual, &rule.check.value) == Some(false),
    }
}

/// Applies a numeric ordering comparison.
///
/// Both sides must be numbers; anything else is "cannot evaluate" and does
/// not match.
fn match_ordering(rule: &ScreeningRule, actual: &FieldValue) -> bool {
    let (Some(actual), RuleValue::Number(expected)) = (actual.as_number(), &rule.check.value)
    else {
        warn!(
            rule_key = %rule.rule_key,
            field = %rule.field_path,
            op = %rule.check.op,
            "non-numeric operand for ordering comparison; rule does not match"
        );
        return false;
    };
    match rule.check.op {
        ComparisonOp::Gt => actual > *expected,
        ComparisonOp::Gte => actual >= *expected,
        ComparisonOp::Lt => actual < *expected,
        ComparisonOp::Lte => actual <= *expected,
        ComparisonOp::Eq | ComparisonOp::Neq => false,
    }
}

/// Type-aware equality between a resolved value and a rule value.
///
/// Returns `None` for mismatched kinds, which never match for either `eq`
/// or `neq`.
#[allow(
    clippy::float_cmp,
    reason = "Numeric equality is specified as exact; values are stored, not computed sums."
)]
fn match_equality(actual: &FieldValue, expected: &RuleValue) -> Option<bool> {
    match (actual, expected) {
        (FieldValue::Bool(actual), RuleValue::Bool(expected)) => Some(actual == expected),
        (FieldValue::Number(actual), RuleValue::Number(expected)) => Some(actual == expected),
        (FieldValue::Bool(_) | FieldValue::Number(_), _) => None,
    }
}
