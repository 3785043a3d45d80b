// crates/donor-screen-core/tests/evaluator.rs
// ============================================================================
// Module: Rule Evaluator Tests
// Description: Operator semantics for the pure rule evaluator.
// Purpose: Ensure type-aware matching and fail-closed mismatch handling.
// Dependencies: donor-screen-core
// ============================================================================

//! Operator-level tests for match/no-match outcomes.

use donor_screen_core::ComparisonOp;
use donor_screen_core::FieldPath;
use donor_screen_core::FieldValue;
use donor_screen_core::RuleCheck;
use donor_screen_core::RuleId;
use donor_screen_core::RuleKey;
use donor_screen_core::RuleType;
use donor_screen_core::RuleValue;
use donor_screen_core::ScreeningRule;
use donor_screen_core::Severity;
use donor_screen_core::runtime::evaluate_rule;

fn rule(field_path: FieldPath, op: ComparisonOp, value: RuleValue) -> ScreeningRule {
    ScreeningRule {
        id: RuleId::new(1),
        rule_key: RuleKey::new("test-rule"),
        rule_type: RuleType::SoftFlag,
        rule_name: "Test rule".to_string(),
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

#[test]
fn ordering_operators_compare_numbers() {
    let over = rule(FieldPath::CalculatedBmi, ComparisonOp::Gt, RuleValue::Number(40.0));
    assert!(evaluate_rule(&over, &FieldValue::Number(48.5)));
    assert!(!evaluate_rule(&over, &FieldValue::Number(40.0)));

    let at_least = rule(FieldPath::CalculatedAge, ComparisonOp::Gte, RuleValue::Number(18.0));
    assert!(evaluate_rule(&at_least, &FieldValue::Number(18.0)));
    assert!(!evaluate_rule(&at_least, &FieldValue::Number(17.0)));

    let under = rule(FieldPath::CalculatedAge, ComparisonOp::Lt, RuleValue::Number(65.0));
    assert!(evaluate_rule(&under, &FieldValue::Number(64.0)));
    assert!(!evaluate_rule(&under, &FieldValue::Number(65.0)));

    let at_most = rule(FieldPath::CalculatedBmi, ComparisonOp::Lte, RuleValue::Number(30.0));
    assert!(evaluate_rule(&at_most, &FieldValue::Number(30.0)));
    assert!(!evaluate_rule(&at_most, &FieldValue::Number(30.1)));
}

#[test]
fn ordering_with_non_numeric_operand_never_matches() {
    let check = rule(FieldPath::CalculatedBmi, ComparisonOp::Gt, RuleValue::Number(40.0));
    assert!(!evaluate_rule(&check, &FieldValue::Bool(true)));

    let bool_expected = rule(FieldPath::CalculatedBmi, ComparisonOp::Gt, RuleValue::Bool(true));
    assert!(!evaluate_rule(&bool_expected, &FieldValue::Number(48.5)));
}

#[test]
fn equality_is_type_aware() {
    let flagged = rule(FieldPath::HasTattoosPiercings, ComparisonOp::Eq, RuleValue::Bool(true));
    assert!(evaluate_rule(&flagged, &FieldValue::Bool(true)));
    assert!(!evaluate_rule(&flagged, &FieldValue::Bool(false)));

    let exact = rule(FieldPath::CalculatedAge, ComparisonOp::Eq, RuleValue::Number(18.0));
    assert!(evaluate_rule(&exact, &FieldValue::Number(18.0)));
    assert!(!evaluate_rule(&exact, &FieldValue::Number(18.5)));
}

#[test]
fn inequality_is_type_aware() {
    let not_pregnant = rule(FieldPath::HasBeenPregnant, ComparisonOp::Neq, RuleValue::Bool(true));
    assert!(evaluate_rule(&not_pregnant, &FieldValue::Bool(false)));
    assert!(!evaluate_rule(&not_pregnant, &FieldValue::Bool(true)));
}

#[test]
fn mismatched_kinds_never_match_for_eq_or_neq() {
    let eq = rule(FieldPath::HasChronicIllness, ComparisonOp::Eq, RuleValue::Number(1.0));
    assert!(!evaluate_rule(&eq, &FieldValue::Bool(true)));

    // neq across kinds also does not match; it is "cannot evaluate", not
    // "values differ".
    let neq = rule(FieldPath::HasChronicIllness, ComparisonOp::Neq, RuleValue::Number(1.0));
    assert!(!evaluate_rule(&neq, &FieldValue::Bool(true)));

    let text = rule(FieldPath::CalculatedAge, ComparisonOp::Eq, RuleValue::Text("18".to_string()));
    assert!(!evaluate_rule(&text, &FieldValue::Number(18.0)));
}

#[test]
fn evaluator_is_pure() {
    let check = rule(FieldPath::CalculatedBmi, ComparisonOp::Gt, RuleValue::Number(40.0));
    let value = FieldValue::Number(41.2);
    let first = evaluate_rule(&check, &value);
    for _ in 0 .. 16 {
        assert_eq!(evaluate_rule(&check, &value), first);
    }
}
