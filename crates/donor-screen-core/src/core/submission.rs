// crates/donor-screen-core/src/core/submission.rs
// ============================================================================
// Module: Donor Screen Submission Model
// Description: Donor intake submission record consumed by evaluations.
// Purpose: Provide the read-only input shape for the field resolver.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! A submission is an external entity: the engine reads it and writes only
//! the evaluation fields back through the submission store. Derived values
//! (age, BMI) are never stored on the submission; the field resolver computes
//! them per evaluation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use time::Date;

// ============================================================================
// SECTION: Identifier
// ============================================================================

/// Opaque submission identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionId(String);

impl SubmissionId {
    /// Creates a submission identifier from a raw string.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// SECTION: Submission Record
// ============================================================================

/// Donor intake submission, read-only to the engine.
///
/// # Invariants
/// - Raw intake fields only; derived values (age, BMI) are computed by the
///   field resolver at evaluation time and never stored here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    /// Donor birth date, when provided.
    #[serde(default)]
    pub birth_date: Option<Date>,
    /// Height in inches, when provided.
    #[serde(default)]
    pub height_inches: Option<f64>,
    /// Weight in pounds, when provided.
    #[serde(default)]
    pub weight_pounds: Option<f64>,
    /// Donor reports a chronic illness.
    #[serde(default)]
    pub has_chronic_illness: bool,
    /// Donor reports a blood disorder.
    #[serde(default)]
    pub has_blood_disorder: bool,
    /// Donor currently takes medications.
    #[serde(default)]
    pub takes_medications: bool,
    /// Donor had surgery.
    #[serde(default)]
    pub had_surgery: bool,
    /// Donor has tattoos or piercings.
    #[serde(default)]
    pub has_tattoos_piercings: bool,
    /// Donor has been incarcerated.
    #[serde(default)]
    pub has_been_incarcerated: bool,
    /// Donor has traveled internationally.
    #[serde(default)]
    pub has_traveled_internationally: bool,
    /// Donor has received a blood transfusion.
    #[serde(default)]
    pub has_received_transfusion: bool,
    /// Donor has been pregnant.
    #[serde(default)]
    pub has_been_pregnant: bool,
}
