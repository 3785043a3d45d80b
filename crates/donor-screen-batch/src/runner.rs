// crates/donor-screen-batch/src/runner.rs
// ============================================================================
// Module: Batch Runner
// Description: Semaphore-bounded evaluation of the unevaluated backlog.
// Purpose: Process pending submissions in paced waves with cancellation.
// Dependencies: donor-screen-core, serde, thiserror, tokio, tracing
// ============================================================================

//! ## Overview
//! [`BatchRunner`] lists unevaluated submissions up to a configured limit
//! and evaluates them through the screening engine. In-flight work is capped
//! by a semaphore; after each full dispatch wave the runner pauses before
//! dispatching more. A listing failure aborts the batch, a per-submission
//! failure does not.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Duration;

use donor_screen_core::RuleStore;
use donor_screen_core::SubmissionStore;
use donor_screen_core::SubmissionStoreError;
use donor_screen_core::Timestamp;
use donor_screen_core::runtime::ScreeningEngine;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::info;
use tracing::warn;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default maximum submissions pulled per batch.
const DEFAULT_LIMIT: usize = 25;
/// Default cap on concurrent evaluations.
const DEFAULT_CONCURRENCY: usize = 3;
/// Default pause between dispatch waves (ms).
const DEFAULT_PAUSE_MS: u64 = 250;

// ============================================================================
// SECTION: Config
// ============================================================================

/// Batch sizing and pacing configuration.
///
/// # Invariants
/// - `limit` and `concurrency` must be nonzero; [`BatchRunner::run`] rejects
///   configs that violate this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct BatchConfig {
    /// Maximum submissions pulled per batch.
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Cap on concurrent evaluations.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Pause between dispatch waves, in milliseconds.
    #[serde(default = "default_pause_ms")]
    pub pause_ms: u64,
}

/// Returns the default batch limit.
const fn default_limit() -> usize {
    DEFAULT_LIMIT
}

/// Returns the default concurrency cap.
const fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

/// Returns the default pacing pause.
const fn default_pause_ms() -> u64 {
    DEFAULT_PAUSE_MS
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            concurrency: DEFAULT_CONCURRENCY,
            pause_ms: DEFAULT_PAUSE_MS,
        }
    }
}

// ============================================================================
// SECTION: Cancellation
// ============================================================================

/// Cooperative cancellation handle shared between a batch and its caller.
///
/// # Invariants
/// - Cancellation is sticky; a cancelled token never resets.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    /// Shared cancellation flag.
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a fresh, uncancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation of the batch holding this token.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Returns whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

// ============================================================================
// SECTION: Batch Errors
// ============================================================================

/// Errors that abort an entire batch.
///
/// # Invariants
/// - Per-submission evaluation failures are not represented here; they are
///   logged and reflected in [`BatchReport::processed`].
#[derive(Debug, Error)]
pub enum BatchError {
    /// Configuration cannot drive a batch.
    #[error("invalid batch config: {0}")]
    InvalidConfig(String),
    /// Backlog listing failed.
    #[error(transparent)]
    Backlog(#[from] SubmissionStoreError),
}

// ============================================================================
// SECTION: Batch Report
// ============================================================================

/// Outcome summary for one batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchReport {
    /// Submissions pulled from the backlog.
    pub requested: usize,
    /// Submissions evaluated and persisted successfully.
    pub processed: usize,
}

// ============================================================================
// SECTION: Batch Runner
// ============================================================================

/// Drives the screening engine across the unevaluated backlog.
///
/// # Invariants
/// - At most `concurrency` evaluations run at once.
/// - Cancellation stops dispatch; in-flight evaluations run to completion.
pub struct BatchRunner<R, S> {
    /// Engine evaluating and persisting each submission.
    engine: Arc<ScreeningEngine<R, S>>,
    /// Sizing and pacing settings.
    config: BatchConfig,
}

impl<R, S> BatchRunner<R, S>
where
    R: RuleStore + 'static,
    S: SubmissionStore + 'static,
{
    /// Creates a runner over the provided engine.
    #[must_use]
    pub const fn new(engine: Arc<ScreeningEngine<R, S>>, config: BatchConfig) -> Self {
        Self {
            engine,
            config,
        }
    }

    /// Runs one batch: lists the backlog, evaluates each submission as of
    /// the provided timestamp, and reports how many were persisted.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError`] when the config is unusable or the backlog
    /// cannot be listed. Individual evaluation failures are logged and
    /// excluded from the processed count.
    pub async fn run(
        &self,
        as_of: Timestamp,
        cancel: &CancelToken,
    ) -> Result<BatchReport, BatchError> {
        if self.config.limit == 0 {
            return Err(BatchError::InvalidConfig("limit must be nonzero".to_string()));
        }
        if self.config.concurrency == 0 {
            return Err(BatchError::InvalidConfig("concurrency must be nonzero".to_string()));
        }
        let ids = self.engine.submissions().list_unevaluated(self.config.limit)?;
        let requested = ids.len();
        info!(requested, "batch started");

        let semaphore = Arc::new(Semaphore::new(self.config.concurrency));
        let mut handles = Vec::with_capacity(requested);
        let mut dispatched = 0_usize;
        for id in ids {
            if cancel.is_cancelled() {
                warn!(dispatched, "batch cancelled before dispatch completed");
                break;
            }
            let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
                // The semaphore is never closed while the batch runs.
                break;
            };
            let engine = Arc::clone(&self.engine);
            handles.push(tokio::task::spawn_blocking(move || {
                let outcome = engine.evaluate(&id, as_of);
                drop(permit);
                (id, outcome)
            }));
            dispatched += 1;
            if dispatched.is_multiple_of(self.config.concurrency) && dispatched < requested {
                tokio::time::sleep(Duration::from_millis(self.config.pause_ms)).await;
            }
        }

        let mut processed = 0_usize;
        for handle in handles {
            match handle.await {
                Ok((_, Ok(_))) => processed += 1,
                Ok((id, Err(err))) => {
                    warn!(submission = id.as_str(), error = %err, "evaluation failed");
                }
                Err(err) => {
                    warn!(error = %err, "evaluation worker panicked");
                }
            }
        }
        info!(requested, processed, "batch finished");
        Ok(BatchReport {
            requested,
            processed,
        })
    }
}
