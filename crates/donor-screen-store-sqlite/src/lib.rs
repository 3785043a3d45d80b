// crates/donor-screen-store-sqlite/src/lib.rs
// ============================================================================
// Module: Donor Screen SQLite Store
// Description: Durable rule and submission stores backed by SQLite.
// Purpose: Persist screening rules and submission evaluation fields.
// Dependencies: donor-screen-core, rusqlite, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! This crate implements the core storage interfaces over a single `SQLite`
//! database file. Rules hold typed comparison specs serialized as JSON;
//! submissions carry their intake record plus the overwrite-in-place
//! evaluation columns consumed by the approval workflow.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod store;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use store::SqliteJournalMode;
pub use store::SqliteScreeningStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
