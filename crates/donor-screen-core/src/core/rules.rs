// crates/donor-screen-core/src/core/rules.rs
// ============================================================================
// Module: Donor Screen Rule Model
// Description: Screening rule records, comparison specs, and validation.
// Purpose: Define the admin-editable rule set consumed by the evaluator.
// Dependencies: crate::core::fields, serde, thiserror
// ============================================================================

//! ## Overview
//! Screening rules pair a submission field with a typed comparison. The
//! comparison value is coerced to its stored type at write time, and the
//! operator/value/field combination is validated exhaustively before a rule
//! is saved, so evaluation never encounters an ill-typed rule.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::fields::FieldKind;
use crate::core::fields::FieldPath;

// ============================================================================
// SECTION: Identifiers
// ============================================================================

/// Opaque store identity for a screening rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(i64);

impl RuleId {
    /// Creates a rule identifier from a raw store value.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw store value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable, globally unique rule key.
///
/// # Invariants
/// - Immutable after creation; flags reference rules by key even after the
///   rule's display fields change.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleKey(String);

impl RuleKey {
    /// Creates a rule key from a raw string.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// SECTION: Rule Classification
// ============================================================================

/// Rule classification controlling the recommendation outcome.
///
/// # Invariants
/// - Variants are stable for serialization and flag references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    /// A match forces an `unsuitable` recommendation outright.
    HardDisqualify,
    /// A match requires human review but does not by itself disqualify.
    SoftFlag,
}

impl RuleType {
    /// Returns a stable label for persistence and display.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HardDisqualify => "hard_disqualify",
            Self::SoftFlag => "soft_flag",
        }
    }

    /// Returns the sort rank used for rule listings.
    ///
    /// Hard disqualifiers are conventionally listed before soft flags;
    /// evaluation order does not affect the final recommendation.
    #[must_use]
    pub const fn sort_rank(self) -> u8 {
        match self {
            Self::HardDisqualify => 0,
            Self::SoftFlag => 1,
        }
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown rule type parse error.
#[derive(Debug, Error)]
#[error("unknown rule type: {0}")]
pub struct UnknownRuleType(pub String);

impl FromStr for RuleType {
    type Err = UnknownRuleType;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "hard_disqualify" => Ok(Self::HardDisqualify),
            "soft_flag" => Ok(Self::SoftFlag),
            other => Err(UnknownRuleType(other.to_string())),
        }
    }
}

/// Severity of a matched rule, driving the score penalty.
///
/// # Invariants
/// - Variants are stable for serialization and flag references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Zeroes the score on its own.
    Critical,
    /// Major concern.
    High,
    /// Moderate concern.
    Medium,
    /// Minor concern.
    Low,
}

impl Severity {
    /// Returns a stable label for persistence and display.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown severity parse error.
#[derive(Debug, Error)]
#[error("unknown severity: {0}")]
pub struct UnknownSeverity(pub String);

impl FromStr for Severity {
    type Err = UnknownSeverity;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "critical" => Ok(Self::Critical),
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(UnknownSeverity(other.to_string())),
        }
    }
}

// ============================================================================
// SECTION: Comparison Spec
// ============================================================================

/// Comparison operator applied to a resolved field value.
///
/// # Invariants
/// - Variants are stable for serialization and contract matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOp {
    /// Strictly greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Strictly less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// Type-aware equality.
    Eq,
    /// Type-aware inequality.
    Neq,
}

impl ComparisonOp {
    /// Returns a stable label for persistence and display.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Eq => "eq",
            Self::Neq => "neq",
        }
    }

    /// Returns true for the numeric ordering operators.
    #[must_use]
    pub const fn is_ordering(self) -> bool {
        matches!(self, Self::Gt | Self::Gte | Self::Lt | Self::Lte)
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown comparison operator parse error.
#[derive(Debug, Error)]
#[error("unknown comparison operator: {0}")]
pub struct UnknownComparisonOp(pub String);

impl FromStr for ComparisonOp {
    type Err = UnknownComparisonOp;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "gt" => Ok(Self::Gt),
            "gte" => Ok(Self::Gte),
            "lt" => Ok(Self::Lt),
            "lte" => Ok(Self::Lte),
            "eq" => Ok(Self::Eq),
            "neq" => Ok(Self::Neq),
            other => Err(UnknownComparisonOp(other.to_string())),
        }
    }
}

/// Typed comparison value stored on a rule.
///
/// # Invariants
/// - The stored type is fixed at write time by [`RuleValue::coerce`]; the
///   evaluator never re-parses raw strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RuleValue {
    /// Finite numeric value.
    Number(f64),
    /// Boolean value.
    Bool(bool),
    /// Case-sensitive string value.
    Text(String),
}

impl RuleValue {
    /// Coerces a raw value string into its typed form.
    ///
    /// Coercion order: exact `"true"`/`"false"` becomes a boolean; otherwise
    /// a parseable finite number becomes numeric; everything else stays a
    /// string. This runs at write time so stored rules always hold typed
    /// values.
    #[must_use]
    pub fn coerce(raw: &str) -> Self {
        match raw {
            "true" => return Self::Bool(true),
            "false" => return Self::Bool(false),
            _ => {}
        }
        if let Ok(number) = raw.parse::<f64>()
            && number.is_finite()
        {
            return Self::Number(number);
        }
        Self::Text(raw.to_string())
    }

    /// Returns a stable label for the value kind.
    #[must_use]
    pub const fn kind_label(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Bool(_) => "boolean",
            Self::Text(_) => "string",
        }
    }
}

impl fmt::Display for RuleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

/// Comparison spec pairing an operator with a typed value.
///
/// # Invariants
/// - [`validate_check`] holds for the owning rule's field path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleCheck {
    /// Comparison operator.
    pub op: ComparisonOp,
    /// Typed comparison value.
    pub value: RuleValue,
}

// ============================================================================
// SECTION: Rule Records
// ============================================================================

/// Persisted screening rule.
///
/// # Invariants
/// - `rule_key` is unique across all rules, active or not.
/// - `check` has been validated against `field_path` at save time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningRule {
    /// Store identity.
    pub id: RuleId,
    /// Stable unique key referenced by evaluation flags.
    pub rule_key: RuleKey,
    /// Rule classification.
    pub rule_type: RuleType,
    /// Display name embedded in flags.
    pub rule_name: String,
    /// Submission field the rule inspects.
    pub field_path: FieldPath,
    /// Comparison spec.
    pub check: RuleCheck,
    /// Severity driving the score penalty.
    pub severity: Severity,
    /// Whether the rule participates in evaluations.
    pub is_active: bool,
    /// Ordering within listings of the same rule type.
    pub display_order: i64,
    /// Optional admin-facing description.
    pub description: Option<String>,
}

/// Payload for creating a rule; the store assigns the identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDraft {
    /// Stable unique key.
    pub rule_key: RuleKey,
    /// Rule classification.
    pub rule_type: RuleType,
    /// Display name.
    pub rule_name: String,
    /// Submission field the rule inspects.
    pub field_path: FieldPath,
    /// Comparison spec.
    pub check: RuleCheck,
    /// Severity driving the score penalty.
    pub severity: Severity,
    /// Whether the rule starts active.
    pub is_active: bool,
    /// Ordering within listings of the same rule type.
    pub display_order: i64,
    /// Optional admin-facing description.
    pub description: Option<String>,
}

/// Partial update for an existing rule.
///
/// # Invariants
/// - Carries no `rule_key`; keys are immutable after creation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RulePatch {
    /// New rule classification, when set.
    pub rule_type: Option<RuleType>,
    /// New display name, when set.
    pub rule_name: Option<String>,
    /// New field path, when set.
    pub field_path: Option<FieldPath>,
    /// New comparison spec, when set.
    pub check: Option<RuleCheck>,
    /// New severity, when set.
    pub severity: Option<Severity>,
    /// New active state, when set.
    pub is_active: Option<bool>,
    /// New display order, when set.
    pub display_order: Option<i64>,
    /// New description, when set.
    pub description: Option<String>,
}

// ============================================================================
// SECTION: Save-Time Validation
// ============================================================================

/// Rule validation errors raised at save time.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum RuleValidationError {
    /// Ordering operator paired with a non-numeric comparison value.
    #[error("ordering operator {op} requires a numeric value, got {kind}")]
    OrderingNeedsNumber {
        /// Offending operator.
        op: ComparisonOp,
        /// Kind label of the supplied value.
        kind: &'static str,
    },
    /// Ordering operator targeting a non-numeric field.
    #[error("ordering operator {op} cannot target boolean field {field}")]
    OrderingNeedsNumericField {
        /// Offending operator.
        op: ComparisonOp,
        /// Targeted field path.
        field: FieldPath,
    },
    /// Equality value kind does not match the field's declared kind.
    #[error("{kind} value does not match field {field}")]
    KindMismatch {
        /// Kind label of the supplied value.
        kind: &'static str,
        /// Targeted field path.
        field: FieldPath,
    },
}

/// Validates a comparison spec against the field it targets.
///
/// Runs exhaustively at rule-save time so that evaluation never sees an
/// ill-typed operator/value/field combination.
///
/// # Errors
///
/// Returns [`RuleValidationError`] when the combination is inconsistent.
pub fn validate_check(field: FieldPath, check: &RuleCheck) -> Result<(), RuleValidationError> {
    if check.op.is_ordering() {
        if !matches!(check.value, RuleValue::Number(_)) {
            return Err(RuleValidationError::OrderingNeedsNumber {
                op: check.op,
                kind: check.value.kind_label(),
            });
        }
        if field.kind() != FieldKind::Number {
            return Err(RuleValidationError::OrderingNeedsNumericField {
                op: check.op,
                field,
            });
        }
        return Ok(());
    }
    let compatible = match (&check.value, field.kind()) {
        (RuleValue::Bool(_), FieldKind::Bool) | (RuleValue::Number(_), FieldKind::Number) => true,
        (RuleValue::Number(_) | RuleValue::Bool(_) | RuleValue::Text(_), _) => false,
    };
    if compatible {
        Ok(())
    } else {
        Err(RuleValidationError::KindMismatch {
            kind: check.value.kind_label(),
            field,
        })
    }
}
