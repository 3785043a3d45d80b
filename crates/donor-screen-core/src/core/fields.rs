// crates/donor-screen-core/src/core/fields.rs
// ============================================================================
// Module: Donor Screen Field Resolver
// Description: Closed field-path set and typed value resolution.
// Purpose: Map rule field names to values extracted or derived from a submission.
// Dependencies: crate::core::{submission, time}, serde, thiserror, time
// ============================================================================

//! ## Overview
//! Field paths form a closed enum mapped to compiler-checked accessors, so a
//! persisted rule can never reference an unsupported field at evaluation
//! time; unknown names are rejected when a rule is authored. Derived fields
//! (age, BMI) are computed per evaluation and resolve to `None` when their
//! inputs are missing, which skips the rule without failing the evaluation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use time::Date;

use crate::core::submission::Submission;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Field Paths
// ============================================================================

/// Closed set of submission fields a rule may inspect.
///
/// # Invariants
/// - Variants are stable for serialization; adding a field is a code change
///   caught at build time, not a runtime lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldPath {
    /// Direct passthrough of `has_chronic_illness`.
    HasChronicIllness,
    /// Direct passthrough of `has_blood_disorder`.
    HasBloodDisorder,
    /// Direct passthrough of `takes_medications`.
    TakesMedications,
    /// Direct passthrough of `had_surgery`.
    HadSurgery,
    /// Direct passthrough of `has_tattoos_piercings`.
    HasTattoosPiercings,
    /// Direct passthrough of `has_been_incarcerated`.
    HasBeenIncarcerated,
    /// Direct passthrough of `has_traveled_internationally`.
    HasTraveledInternationally,
    /// Direct passthrough of `has_received_transfusion`.
    HasReceivedTransfusion,
    /// Direct passthrough of `has_been_pregnant`.
    HasBeenPregnant,
    /// Integer years between birth date and evaluation time.
    CalculatedAge,
    /// Body mass index derived from height and weight.
    CalculatedBmi,
}

/// Declared value kind of a field path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Boolean passthrough field.
    Bool,
    /// Derived numeric field.
    Number,
}

impl FieldPath {
    /// Every supported field path, in display order.
    pub const ALL: [Self; 11] = [
        Self::HasChronicIllness,
        Self::HasBloodDisorder,
        Self::TakesMedications,
        Self::HadSurgery,
        Self::HasTattoosPiercings,
        Self::HasBeenIncarcerated,
        Self::HasTraveledInternationally,
        Self::HasReceivedTransfusion,
        Self::HasBeenPregnant,
        Self::CalculatedAge,
        Self::CalculatedBmi,
    ];

    /// Returns a stable label for persistence and display.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HasChronicIllness => "has_chronic_illness",
            Self::HasBloodDisorder => "has_blood_disorder",
            Self::TakesMedications => "takes_medications",
            Self::HadSurgery => "had_surgery",
            Self::HasTattoosPiercings => "has_tattoos_piercings",
            Self::HasBeenIncarcerated => "has_been_incarcerated",
            Self::HasTraveledInternationally => "has_traveled_internationally",
            Self::HasReceivedTransfusion => "has_received_transfusion",
            Self::HasBeenPregnant => "has_been_pregnant",
            Self::CalculatedAge => "calculated_age",
            Self::CalculatedBmi => "calculated_bmi",
        }
    }

    /// Returns the declared value kind for this field.
    #[must_use]
    pub const fn kind(self) -> FieldKind {
        match self {
            Self::CalculatedAge | Self::CalculatedBmi => FieldKind::Number,
            Self::HasChronicIllness
            | Self::HasBloodDisorder
            | Self::TakesMedications
            | Self::HadSurgery
            | Self::HasTattoosPiercings
            | Self::HasBeenIncarcerated
            | Self::HasTraveledInternationally
            | Self::HasReceivedTransfusion
            | Self::HasBeenPregnant => FieldKind::Bool,
        }
    }

    /// Resolves this field against a submission.
    ///
    /// Boolean passthroughs always resolve. Derived fields resolve to `None`
    /// when their inputs are missing or non-positive; the aggregator skips
    /// the rule in that case.
    #[must_use]
    pub fn resolve(self, submission: &Submission, as_of: Timestamp) -> Option<FieldValue> {
        match self {
            Self::HasChronicIllness => Some(FieldValue::Bool(submission.has_chronic_illness)),
            Self::HasBloodDisorder => Some(FieldValue::Bool(submission.has_blood_disorder)),
            Self::TakesMedications => Some(FieldValue::Bool(submission.takes_medications)),
            Self::HadSurgery => Some(FieldValue::Bool(submission.had_surgery)),
            Self::HasTattoosPiercings => Some(FieldValue::Bool(submission.has_tattoos_piercings)),
            Self::HasBeenIncarcerated => Some(FieldValue::Bool(submission.has_been_incarcerated)),
            Self::HasTraveledInternationally => {
                Some(FieldValue::Bool(submission.has_traveled_internationally))
            }
            Self::HasReceivedTransfusion => {
                Some(FieldValue::Bool(submission.has_received_transfusion))
            }
            Self::HasBeenPregnant => Some(FieldValue::Bool(submission.has_been_pregnant)),
            Self::CalculatedAge => {
                let birth_date = submission.birth_date?;
                Some(FieldValue::Number(calculated_age(birth_date, as_of.utc_date())))
            }
            Self::CalculatedBmi => {
                let height = submission.height_inches?;
                let weight = submission.weight_pounds?;
                calculated_bmi(height, weight).map(FieldValue::Number)
            }
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown field path error, raised at rule-authoring surfaces.
#[derive(Debug, Error)]
#[error("unknown field path: {0}")]
pub struct UnknownFieldPath(pub String);

impl FromStr for FieldPath {
    type Err = UnknownFieldPath;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|path| path.as_str() == raw)
            .ok_or_else(|| UnknownFieldPath(raw.to_string()))
    }
}

// ============================================================================
// SECTION: Field Values
// ============================================================================

/// Typed value produced by field resolution.
///
/// # Invariants
/// - The variant matches the field's declared [`FieldKind`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    /// Boolean passthrough value.
    Bool(bool),
    /// Derived numeric value.
    Number(f64),
}

impl FieldValue {
    /// Returns the numeric value when present.
    #[must_use]
    pub const fn as_number(self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(value),
            Self::Bool(_) => None,
        }
    }

    /// Returns the boolean value when present.
    #[must_use]
    pub const fn as_bool(self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(value),
            Self::Number(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Number(value) => write!(f, "{value}"),
        }
    }
}

// ============================================================================
// SECTION: Derived Fields
// ============================================================================

/// Calendar-aware integer age in years.
///
/// Subtracts the year difference, then decrements by one when the as-of
/// month/day precedes the birth month/day. Matches donor age display
/// semantics rather than a naive day-count division.
fn calculated_age(birth_date: Date, as_of: Date) -> f64 {
    let mut years = i64::from(as_of.year()) - i64::from(birth_date.year());
    let as_of_ordinal = (u8::from(as_of.month()), as_of.day());
    let birth_ordinal = (u8::from(birth_date.month()), birth_date.day());
    if as_of_ordinal < birth_ordinal {
        years -= 1;
    }
    years as f64
}

/// BMI from imperial units, rounded to one decimal place.
///
/// Undefined when height or weight is non-positive.
fn calculated_bmi(height_inches: f64, weight_pounds: f64) -> Option<f64> {
    if height_inches <= 0.0 || weight_pounds <= 0.0 {
        return None;
    }
    let raw = (weight_pounds * 703.0) / (height_inches * height_inches);
    Some((raw * 10.0).round() / 10.0)
}
