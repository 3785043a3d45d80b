// crates/donor-screen-core/src/core/time.rs
// ============================================================================
// Module: Donor Screen Time Model
// Description: Canonical timestamp representation for evaluation records.
// Purpose: Provide deterministic, replayable time values across evaluations.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! Evaluations embed explicit timestamps so that re-running the aggregator on
//! unchanged inputs is reproducible. The aggregator never reads wall-clock
//! time itself; hosts supply the as-of instant when they trigger an
//! evaluation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Deserialize;
use serde::Serialize;
use time::Date;
use time::OffsetDateTime;

// ============================================================================
// SECTION: Timestamp
// ============================================================================

/// Canonical timestamp in unix epoch milliseconds.
///
/// # Invariants
/// - Values are explicitly provided by callers; the aggregator never reads
///   wall-clock time itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Creates a timestamp from unix epoch milliseconds.
    #[must_use]
    pub const fn from_unix_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Returns the timestamp as unix epoch milliseconds.
    #[must_use]
    pub const fn as_unix_millis(self) -> i64 {
        self.0
    }

    /// Reads the host wall clock.
    ///
    /// Intended for hosts (CLI, batch runner) that trigger evaluations; the
    /// aggregator itself only consumes timestamps passed in.
    #[must_use]
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX));
        Self(millis)
    }

    /// Returns the UTC calendar date for this timestamp.
    ///
    /// Used for calendar-aware age computation; out-of-range values collapse
    /// to the unix epoch date.
    #[must_use]
    pub fn utc_date(self) -> Date {
        OffsetDateTime::from_unix_timestamp(self.0.div_euclid(1_000))
            .unwrap_or(OffsetDateTime::UNIX_EPOCH)
            .date()
    }
}
