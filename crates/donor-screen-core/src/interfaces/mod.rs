// crates/donor-screen-core/src/interfaces/mod.rs
// ============================================================================
// Module: Donor Screen Interfaces
// Description: Backend-agnostic interfaces for rule and submission storage.
// Purpose: Define the contract surfaces used by the screening runtime.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! Interfaces define how the screening engine integrates with persistence
//! without embedding backend-specific details. Implementations must be
//! deterministic and fail closed on missing or invalid data: a create with a
//! colliding rule key leaves no partial write behind.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use thiserror::Error;

use crate::core::EvaluationResult;
use crate::core::RuleDraft;
use crate::core::RuleId;
use crate::core::RuleKey;
use crate::core::RulePatch;
use crate::core::RuleValidationError;
use crate::core::ScreeningRule;
use crate::core::Submission;
use crate::core::SubmissionId;

// ============================================================================
// SECTION: Rule Store
// ============================================================================

/// Rule store errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum RuleStoreError {
    /// Create attempted with an already-used rule key.
    #[error("duplicate rule key: {0}")]
    DuplicateRuleKey(RuleKey),
    /// Rule identifier does not exist.
    #[error("unknown rule: {0}")]
    UnknownRule(RuleId),
    /// Rule payload failed validation.
    #[error("invalid rule: {0}")]
    Invalid(String),
    /// Store I/O error.
    #[error("rule store io error: {0}")]
    Io(String),
    /// Store data is corrupted or fails integrity checks.
    #[error("rule store corruption: {0}")]
    Corrupt(String),
}

impl From<RuleValidationError> for RuleStoreError {
    fn from(err: RuleValidationError) -> Self {
        Self::Invalid(err.to_string())
    }
}

/// Admin-editable rule store supplying the active rule set.
pub trait RuleStore: Send + Sync {
    /// Creates a rule and assigns its store identity.
    ///
    /// # Errors
    ///
    /// Returns [`RuleStoreError::DuplicateRuleKey`] when the key collides
    /// with any existing rule (active or not), with no partial write, and
    /// [`RuleStoreError::Invalid`] when the comparison spec fails save-time
    /// validation.
    fn create(&self, draft: RuleDraft) -> Result<ScreeningRule, RuleStoreError>;

    /// Applies a partial update to an existing rule.
    ///
    /// The rule key is immutable; patches cannot carry one.
    ///
    /// # Errors
    ///
    /// Returns [`RuleStoreError::UnknownRule`] when the identifier does not
    /// exist and [`RuleStoreError::Invalid`] when the patched comparison
    /// spec fails validation.
    fn update(&self, id: RuleId, patch: RulePatch) -> Result<ScreeningRule, RuleStoreError>;

    /// Deletes a rule.
    ///
    /// # Errors
    ///
    /// Returns [`RuleStoreError::UnknownRule`] when the identifier does not
    /// exist.
    fn delete(&self, id: RuleId) -> Result<(), RuleStoreError>;

    /// Activates or deactivates a rule.
    ///
    /// # Errors
    ///
    /// Returns [`RuleStoreError::UnknownRule`] when the identifier does not
    /// exist.
    fn set_active(&self, id: RuleId, active: bool) -> Result<ScreeningRule, RuleStoreError>;

    /// Lists rules ordered by `(rule_type, display_order)` with hard
    /// disqualifiers first.
    ///
    /// # Errors
    ///
    /// Returns [`RuleStoreError`] when listing fails.
    fn list(&self, active_only: bool) -> Result<Vec<ScreeningRule>, RuleStoreError>;
}

impl<T: RuleStore + ?Sized> RuleStore for Arc<T> {
    fn create(&self, draft: RuleDraft) -> Result<ScreeningRule, RuleStoreError> {
        (**self).create(draft)
    }

    fn update(&self, id: RuleId, patch: RulePatch) -> Result<ScreeningRule, RuleStoreError> {
        (**self).update(id, patch)
    }

    fn delete(&self, id: RuleId) -> Result<(), RuleStoreError> {
        (**self).delete(id)
    }

    fn set_active(&self, id: RuleId, active: bool) -> Result<ScreeningRule, RuleStoreError> {
        (**self).set_active(id, active)
    }

    fn list(&self, active_only: bool) -> Result<Vec<ScreeningRule>, RuleStoreError> {
        (**self).list(active_only)
    }
}

// ============================================================================
// SECTION: Submission Store
// ============================================================================

/// Submission store errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum SubmissionStoreError {
    /// Submission identifier does not exist.
    #[error("unknown submission: {0}")]
    UnknownSubmission(SubmissionId),
    /// Store I/O error.
    #[error("submission store io error: {0}")]
    Io(String),
    /// Store data is corrupted or fails integrity checks.
    #[error("submission store corruption: {0}")]
    Corrupt(String),
}

/// Submission repository read by the engine and written with evaluation
/// results.
///
/// The engine reads intake fields and writes only the submission's own
/// evaluation fields; a re-evaluation overwrites the prior result
/// (last-writer-wins, no history).
pub trait SubmissionStore: Send + Sync {
    /// Loads a submission by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionStoreError::UnknownSubmission`] when the
    /// identifier does not exist.
    fn get(&self, id: &SubmissionId) -> Result<Submission, SubmissionStoreError>;

    /// Lists up to `limit` submissions with no evaluation result yet, in
    /// insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionStoreError`] when listing fails.
    fn list_unevaluated(&self, limit: usize) -> Result<Vec<SubmissionId>, SubmissionStoreError>;

    /// Persists an evaluation result onto the submission record, replacing
    /// any prior result.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionStoreError::UnknownSubmission`] when the
    /// identifier does not exist.
    fn save_evaluation(
        &self,
        id: &SubmissionId,
        result: &EvaluationResult,
    ) -> Result<(), SubmissionStoreError>;
}

impl<T: SubmissionStore + ?Sized> SubmissionStore for Arc<T> {
    fn get(&self, id: &SubmissionId) -> Result<Submission, SubmissionStoreError> {
        (**self).get(id)
    }

    fn list_unevaluated(&self, limit: usize) -> Result<Vec<SubmissionId>, SubmissionStoreError> {
        (**self).list_unevaluated(limit)
    }

    fn save_evaluation(
        &self,
        id: &SubmissionId,
        result: &EvaluationResult,
    ) -> Result<(), SubmissionStoreError> {
        (**self).save_evaluation(id, result)
    }
}
