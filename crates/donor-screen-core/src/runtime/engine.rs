// crates/donor-screen-core/src/runtime/engine.rs
// ============================================================================
// Module: Donor Screen Screening Engine
// Description: Single-submission evaluation over store interfaces.
// Purpose: Load, evaluate, and persist one submission's result.
// Dependencies: crate::core, crate::interfaces, crate::runtime::aggregator, thiserror
// ============================================================================

//! ## Overview
//! The engine wires the pure aggregator to the store interfaces: it loads
//! the submission, takes an active-rule snapshot by value, evaluates, and
//! writes the result back onto the submission record. A failure to load the
//! submission or the rule set is fatal to the call; the write is
//! last-writer-wins with no optimistic lock.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::EvaluationResult;
use crate::core::ScoreWeights;
use crate::core::SubmissionId;
use crate::core::Timestamp;
use crate::interfaces::RuleStore;
use crate::interfaces::RuleStoreError;
use crate::interfaces::SubmissionStore;
use crate::interfaces::SubmissionStoreError;
use crate::runtime::aggregator::evaluate_submission;

// ============================================================================
// SECTION: Engine Errors
// ============================================================================

/// Errors raised by single-submission evaluation.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Rule set could not be loaded.
    #[error(transparent)]
    Rules(#[from] RuleStoreError),
    /// Submission could not be loaded or written.
    #[error(transparent)]
    Submissions(#[from] SubmissionStoreError),
}

// ============================================================================
// SECTION: Screening Engine
// ============================================================================

/// Evaluates submissions against the current active-rule snapshot.
///
/// # Invariants
/// - Each evaluation reads one submission and a rule snapshot taken at call
///   time; rule edits affect future evaluations only.
pub struct ScreeningEngine<R, S> {
    /// Rule store supplying active-rule snapshots.
    rules: R,
    /// Submission repository read and written by evaluations.
    submissions: S,
    /// Score penalties applied by the aggregator.
    weights: ScoreWeights,
}

impl<R: RuleStore, S: SubmissionStore> ScreeningEngine<R, S> {
    /// Creates an engine over the provided stores.
    #[must_use]
    pub const fn new(rules: R, submissions: S, weights: ScoreWeights) -> Self {
        Self {
            rules,
            submissions,
            weights,
        }
    }

    /// Evaluates one submission as of the provided timestamp and persists
    /// the result.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when the submission or rule set cannot be
    /// loaded, or when the result cannot be written back.
    pub fn evaluate(
        &self,
        id: &SubmissionId,
        as_of: Timestamp,
    ) -> Result<EvaluationResult, EngineError> {
        let submission = self.submissions.get(id)?;
        let snapshot = self.rules.list(true)?;
        let result = evaluate_submission(&submission, &snapshot, &self.weights, as_of);
        self.submissions.save_evaluation(id, &result)?;
        Ok(result)
    }

    /// Returns the submission store backing this engine.
    #[must_use]
    pub const fn submissions(&self) -> &S {
        &self.submissions
    }
}
