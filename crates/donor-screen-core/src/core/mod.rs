// crates/donor-screen-core/src/core/mod.rs
// ============================================================================
// Module: Donor Screen Core Model
// Description: Data model for rules, submissions, fields, and evaluations.
// Purpose: Provide the typed records shared by the runtime and stores.
// Dependencies: serde, thiserror, time
// ============================================================================

//! ## Overview
//! The core model is persistence-agnostic: rules and submissions are plain
//! serde records, field paths form a closed enum, and evaluation results are
//! pure values. Stores and hosts own all I/O.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod evaluation;
pub mod fields;
pub mod rules;
pub mod submission;
pub mod time;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use evaluation::EvaluationFlag;
pub use evaluation::EvaluationResult;
pub use evaluation::Recommendation;
pub use evaluation::ScoreWeights;
pub use evaluation::UnknownRecommendation;
pub use fields::FieldKind;
pub use fields::FieldPath;
pub use fields::FieldValue;
pub use fields::UnknownFieldPath;
pub use rules::ComparisonOp;
pub use rules::RuleCheck;
pub use rules::RuleDraft;
pub use rules::RuleId;
pub use rules::RuleKey;
pub use rules::RulePatch;
pub use rules::RuleType;
pub use rules::RuleValidationError;
pub use rules::RuleValue;
pub use rules::ScreeningRule;
pub use rules::Severity;
pub use rules::UnknownComparisonOp;
pub use rules::UnknownRuleType;
pub use rules::UnknownSeverity;
pub use rules::validate_check;
pub use submission::Submission;
pub use submission::SubmissionId;
pub use time::Timestamp;
