// crates/donor-screen-core/src/runtime/mod.rs
// ============================================================================
// Module: Donor Screen Runtime
// Description: Evaluator, aggregator, engine, and in-memory stores.
// Purpose: Execute screening evaluations over the core model.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! The runtime layers the pure evaluator and aggregator under the engine,
//! which owns store access for a single evaluation. In-memory stores back
//! tests and embedded hosts.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod aggregator;
pub mod engine;
pub mod evaluator;
pub mod memory;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use aggregator::evaluate_submission;
pub use engine::EngineError;
pub use engine::ScreeningEngine;
pub use evaluator::evaluate_rule;
pub use memory::InMemoryRuleStore;
pub use memory::InMemorySubmissionStore;
