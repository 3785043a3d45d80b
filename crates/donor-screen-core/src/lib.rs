// crates/donor-screen-core/src/lib.rs
// ============================================================================
// Module: Donor Screen Core
// Description: Eligibility screening rule engine core.
// Purpose: Evaluate donor intake submissions against a configurable rule set.
// Dependencies: serde, thiserror, time, tracing
// ============================================================================

//! ## Overview
//! Donor Screen evaluates a donor intake submission against an admin-editable
//! set of screening rules and produces a recommendation (suitable /
//! unsuitable / review-required), a 0..=100 score, and one flag per matched
//! rule. The core is pure: rule snapshots are passed by value into the
//! aggregator, persistence lives behind the [`interfaces`] traits, and hosts
//! supply timestamps explicitly.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use core::ComparisonOp;
pub use core::EvaluationFlag;
pub use core::EvaluationResult;
pub use core::FieldKind;
pub use core::FieldPath;
pub use core::FieldValue;
pub use core::Recommendation;
pub use core::RuleCheck;
pub use core::RuleDraft;
pub use core::RuleId;
pub use core::RuleKey;
pub use core::RulePatch;
pub use core::RuleType;
pub use core::RuleValidationError;
pub use core::RuleValue;
pub use core::ScoreWeights;
pub use core::ScreeningRule;
pub use core::Severity;
pub use core::Submission;
pub use core::SubmissionId;
pub use core::Timestamp;
pub use core::UnknownFieldPath;
pub use core::validate_check;
pub use interfaces::RuleStore;
pub use interfaces::RuleStoreError;
pub use interfaces::SubmissionStore;
pub use interfaces::SubmissionStoreError;
