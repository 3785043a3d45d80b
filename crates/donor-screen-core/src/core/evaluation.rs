// crates/donor-screen-core/src/core/evaluation.rs
// ============================================================================
// Module: Donor Screen Evaluation Records
// Description: Flags, scores, and recommendations produced by evaluations.
// Purpose: Define the result shape consumed by the approval workflow.
// Dependencies: crate::core::{fields, rules, time}, serde, thiserror
// ============================================================================

//! ## Overview
//! An evaluation run produces one flag per matched active rule, a 0..=100
//! score derived from severity penalties, and a tri-state recommendation.
//! Results overwrite the submission's prior evaluation; there is no history.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::fields::FieldValue;
use crate::core::rules::RuleKey;
use crate::core::rules::RuleType;
use crate::core::rules::Severity;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Recommendation
// ============================================================================

/// Tri-state engine recommendation.
///
/// # Invariants
/// - Variants are stable for serialization and workflow matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    /// No active rule matched.
    Suitable,
    /// At least one hard disqualifier matched.
    Unsuitable,
    /// Soft flags matched; human review required.
    ReviewRequired,
}

impl Recommendation {
    /// Returns a stable label for persistence and display.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Suitable => "suitable",
            Self::Unsuitable => "unsuitable",
            Self::ReviewRequired => "review_required",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown recommendation parse error.
#[derive(Debug, Error)]
#[error("unknown recommendation: {0}")]
pub struct UnknownRecommendation(pub String);

impl FromStr for Recommendation {
    type Err = UnknownRecommendation;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "suitable" => Ok(Self::Suitable),
            "unsuitable" => Ok(Self::Unsuitable),
            "review_required" => Ok(Self::ReviewRequired),
            other => Err(UnknownRecommendation(other.to_string())),
        }
    }
}

// ============================================================================
// SECTION: Flags
// ============================================================================

/// Record of one matched active rule.
///
/// # Invariants
/// - `rule_key` remains a valid reference even after the rule's display
///   fields change or the rule is deactivated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationFlag {
    /// Stable key of the matched rule.
    pub rule_key: RuleKey,
    /// Display name of the matched rule at evaluation time.
    pub rule_name: String,
    /// Classification of the matched rule.
    pub rule_type: RuleType,
    /// Severity of the matched rule.
    pub severity: Severity,
    /// Human-readable description of the match.
    pub message: String,
    /// Resolved field value that triggered the match.
    pub actual_value: FieldValue,
}

// ============================================================================
// SECTION: Score Weights
// ============================================================================

/// Per-severity score penalties.
///
/// The defaults (100/30/15/5) are an explicit design choice, not a confirmed
/// source formula; hosts may override them through configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    /// Penalty for a critical match.
    pub critical: u32,
    /// Penalty for a high match.
    pub high: u32,
    /// Penalty for a medium match.
    pub medium: u32,
    /// Penalty for a low match.
    pub low: u32,
}

impl ScoreWeights {
    /// Returns the penalty for a severity.
    #[must_use]
    pub const fn penalty(&self, severity: Severity) -> u32 {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            critical: 100,
            high: 30,
            medium: 15,
            low: 5,
        }
    }
}

// ============================================================================
// SECTION: Evaluation Result
// ============================================================================

/// Outcome of evaluating one submission against an active-rule snapshot.
///
/// # Invariants
/// - `score` is within 0..=100.
/// - `recommendation` is consistent with `flags` (any hard disqualifier
///   forces `Unsuitable`; any flag at all forces at least `ReviewRequired`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Suitability score from 0 (worst) to 100 (best).
    pub score: u8,
    /// Tri-state recommendation.
    pub recommendation: Recommendation,
    /// One flag per matched active rule.
    pub flags: Vec<EvaluationFlag>,
    /// Evaluation timestamp supplied by the host.
    pub evaluated_at: Timestamp,
}
