// crates/donor-screen-batch/src/lib.rs
// ============================================================================
// Module: Donor Screen Batch
// Description: Bounded-concurrency batch evaluation over the screening engine.
// Purpose: Evaluate backlogs of unevaluated submissions without overload.
// Dependencies: donor-screen-core, serde, thiserror, tokio, tracing
// ============================================================================

//! ## Overview
//! This crate drives the screening engine across the backlog of submissions
//! that have never been evaluated. Work is dispatched through a semaphore
//! that caps in-flight evaluations, with a pacing pause between dispatch
//! waves so a large backlog cannot monopolize the store. Per-submission
//! failures are logged and skipped; the batch keeps going.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod runner;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use runner::BatchConfig;
pub use runner::BatchError;
pub use runner::BatchReport;
pub use runner::BatchRunner;
pub use runner::CancelToken;
