// crates/donor-screen-core/src/runtime/memory.rs
// ============================================================================
// Module: Donor Screen In-Memory Stores
// Description: Deterministic in-memory rule and submission stores.
// Purpose: Back tests and embedded use without a database.
// Dependencies: crate::core, crate::interfaces, std
// ============================================================================

//! ## Overview
//! The in-memory stores implement the same contracts as the durable SQLite
//! store: unique rule keys, immutable keys on update, `(rule_type,
//! display_order)` listing, insertion-order unevaluated listing, and
//! overwrite-on-save evaluation results.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Mutex;

use crate::core::EvaluationResult;
use crate::core::RuleDraft;
use crate::core::RuleId;
use crate::core::RulePatch;
use crate::core::ScreeningRule;
use crate::core::Submission;
use crate::core::SubmissionId;
use crate::core::validate_check;
use crate::interfaces::RuleStore;
use crate::interfaces::RuleStoreError;
use crate::interfaces::SubmissionStore;
use crate::interfaces::SubmissionStoreError;

// ============================================================================
// SECTION: In-Memory Rule Store
// ============================================================================

/// Mutable rule table behind the store mutex.
#[derive(Debug, Default)]
struct RuleTable {
    /// Next identity to assign.
    next_id: i64,
    /// Rules in creation order.
    rules: Vec<ScreeningRule>,
}

/// In-memory [`RuleStore`] implementation.
#[derive(Debug, Default)]
pub struct InMemoryRuleStore {
    /// Rule table guarded for concurrent hosts.
    inner: Mutex<RuleTable>,
}

impl InMemoryRuleStore {
    /// Creates an empty rule store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RuleStore for InMemoryRuleStore {
    fn create(&self, draft: RuleDraft) -> Result<ScreeningRule, RuleStoreError> {
        validate_check(draft.field_path, &draft.check)?;
        let mut table =
            self.inner.lock().map_err(|_| RuleStoreError::Corrupt("lock poisoned".to_string()))?;
        if table.rules.iter().any(|rule| rule.rule_key == draft.rule_key) {
            return Err(RuleStoreError::DuplicateRuleKey(draft.rule_key));
        }
        table.next_id += 1;
        let rule = ScreeningRule {
            id: RuleId::new(table.next_id),
            rule_key: draft.rule_key,
            rule_type: draft.rule_type,
            rule_name: draft.rule_name,
            field_path: draft.field_path,
            check: draft.check,
            severity: draft.severity,
            is_active: draft.is_active,
            display_order: draft.display_order,
            description: draft.description,
        };
        table.rules.push(rule.clone());
        Ok(rule)
    }

    fn update(&self, id: RuleId, patch: RulePatch) -> Result<ScreeningRule, RuleStoreError> {
        let mut table =
            self.inner.lock().map_err(|_| RuleStoreError::Corrupt("lock poisoned".to_string()))?;
        let rule = table
            .rules
            .iter_mut()
            .find(|rule| rule.id == id)
            .ok_or(RuleStoreError::UnknownRule(id))?;
        let mut patched = rule.clone();
        if let Some(rule_type) = patch.rule_type {
            patched.rule_type = rule_type;
        }
        if let Some(rule_name) = patch.rule_name {
            patched.rule_name = rule_name;
        }
        if let Some(field_path) = patch.field_path {
            patched.field_path = field_path;
        }
        if let Some(check) = patch.check {
            patched.check = check;
        }
        if let Some(severity) = patch.severity {
            patched.severity = severity;
        }
        if let Some(is_active) = patch.is_active {
            patched.is_active = is_active;
        }
        if let Some(display_order) = patch.display_order {
            patched.display_order = display_order;
        }
        if let Some(description) = patch.description {
            patched.description = Some(description);
        }
        validate_check(patched.field_path, &patched.check)?;
        *rule = patched.clone();
        Ok(patched)
    }

    fn delete(&self, id: RuleId) -> Result<(), RuleStoreError> {
        let mut table =
            self.inner.lock().map_err(|_| RuleStoreError::Corrupt("lock poisoned".to_string()))?;
        let before = table.rules.len();
        table.rules.retain(|rule| rule.id != id);
        if table.rules.len() == before {
            return Err(RuleStoreError::UnknownRule(id));
        }
        Ok(())
    }

    fn set_active(&self, id: RuleId, active: bool) -> Result<ScreeningRule, RuleStoreError> {
        let mut table =
            self.inner.lock().map_err(|_| RuleStoreError::Corrupt("lock poisoned".to_string()))?;
        let rule = table
            .rules
            .iter_mut()
            .find(|rule| rule.id == id)
            .ok_or(RuleStoreError::UnknownRule(id))?;
        rule.is_active = active;
        Ok(rule.clone())
    }

    fn list(&self, active_only: bool) -> Result<Vec<ScreeningRule>, RuleStoreError> {
        let table =
            self.inner.lock().map_err(|_| RuleStoreError::Corrupt("lock poisoned".to_string()))?;
        let mut rules: Vec<ScreeningRule> = table
            .rules
            .iter()
            .filter(|rule| !active_only || rule.is_active)
            .cloned()
            .collect();
        rules.sort_by_key(|rule| (rule.rule_type.sort_rank(), rule.display_order));
        Ok(rules)
    }
}

// ============================================================================
// SECTION: In-Memory Submission Store
// ============================================================================

/// One submission row with its optional evaluation result.
#[derive(Debug)]
struct SubmissionRow {
    /// Submission identifier.
    id: SubmissionId,
    /// Intake record.
    submission: Submission,
    /// Latest evaluation result, overwritten on re-evaluation.
    evaluation: Option<EvaluationResult>,
}

/// In-memory [`SubmissionStore`] implementation.
#[derive(Debug, Default)]
pub struct InMemorySubmissionStore {
    /// Rows in insertion order.
    inner: Mutex<Vec<SubmissionRow>>,
}

impl InMemorySubmissionStore {
    /// Creates an empty submission store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a submission row with no evaluation result.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionStoreError::Io`] when the identifier already
    /// exists.
    pub fn insert(
        &self,
        id: SubmissionId,
        submission: Submission,
    ) -> Result<(), SubmissionStoreError> {
        let mut rows = self
            .inner
            .lock()
            .map_err(|_| SubmissionStoreError::Corrupt("lock poisoned".to_string()))?;
        if rows.iter().any(|row| row.id == id) {
            return Err(SubmissionStoreError::Io(format!("submission already exists: {id}")));
        }
        rows.push(SubmissionRow {
            id,
            submission,
            evaluation: None,
        });
        Ok(())
    }

    /// Returns the stored evaluation result for a submission, when present.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionStoreError::UnknownSubmission`] when the
    /// identifier does not exist.
    pub fn evaluation(
        &self,
        id: &SubmissionId,
    ) -> Result<Option<EvaluationResult>, SubmissionStoreError> {
        let rows = self
            .inner
            .lock()
            .map_err(|_| SubmissionStoreError::Corrupt("lock poisoned".to_string()))?;
        rows.iter()
            .find(|row| row.id == *id)
            .map(|row| row.evaluation.clone())
            .ok_or_else(|| SubmissionStoreError::UnknownSubmission(id.clone()))
    }
}

impl SubmissionStore for InMemorySubmissionStore {
    fn get(&self, id: &SubmissionId) -> Result<Submission, SubmissionStoreError> {
        let rows = self
            .inner
            .lock()
            .map_err(|_| SubmissionStoreError::Corrupt("lock poisoned".to_string()))?;
        rows.iter()
            .find(|row| row.id == *id)
            .map(|row| row.submission.clone())
            .ok_or_else(|| SubmissionStoreError::UnknownSubmission(id.clone()))
    }

    fn list_unevaluated(&self, limit: usize) -> Result<Vec<SubmissionId>, SubmissionStoreError> {
        let rows = self
            .inner
            .lock()
            .map_err(|_| SubmissionStoreError::Corrupt("lock poisoned".to_string()))?;
        Ok(rows
            .iter()
            .filter(|row| row.evaluation.is_none())
            .take(limit)
            .map(|row| row.id.clone())
            .collect())
    }

    fn save_evaluation(
        &self,
        id: &SubmissionId,
        result: &EvaluationResult,
    ) -> Result<(), SubmissionStoreError> {
        let mut rows = self
            .inner
            .lock()
            .map_err(|_| SubmissionStoreError::Corrupt("lock poisoned".to_string()))?;
        let row = rows
            .iter_mut()
            .find(|row| row.id == *id)
            .ok_or_else(|| SubmissionStoreError::UnknownSubmission(id.clone()))?;
        row.evaluation = Some(result.clone());
        Ok(())
    }
}
