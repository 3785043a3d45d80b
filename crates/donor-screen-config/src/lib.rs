// crates/donor-screen-config/src/lib.rs
// ============================================================================
// Module: Donor Screen Config
// Description: Canonical configuration model and validation.
// Purpose: Load and validate TOML configuration for the screening service.
// Dependencies: donor-screen-batch, donor-screen-core, donor-screen-store-sqlite,
//               serde, thiserror, toml
// ============================================================================

//! ## Overview
//! One TOML file configures the whole service: the store location, the
//! scoring weights, and batch sizing. Every section is optional and falls
//! back to defaults, so an empty file is a valid config. Loading is strict
//! and fail-closed: oversized or non-UTF-8 files are rejected, and a parsed
//! config must pass validation before it is returned.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use donor_screen_batch::BatchConfig;
use donor_screen_core::ScoreWeights;
use donor_screen_store_sqlite::SqliteStoreConfig;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default config path when the caller does not supply one.
const DEFAULT_CONFIG_PATH: &str = "donor-screen.toml";
/// Default database path when the store section is absent.
const DEFAULT_DB_PATH: &str = "donor-screen.db";
/// Maximum accepted config file size in bytes.
const MAX_CONFIG_BYTES: u64 = 1_048_576;
/// Ceiling for any single severity penalty.
const MAX_PENALTY: u32 = 100;

// ============================================================================
// SECTION: Config Errors
// ============================================================================

/// Errors raised while loading or validating configuration.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("config read failed: {0}")]
    Io(String),
    /// Config file exceeds the accepted size limit.
    #[error("config file exceeds size limit ({0} bytes)")]
    Oversized(u64),
    /// Config file is not valid TOML.
    #[error("config parse failed: {0}")]
    Parse(String),
    /// Config parsed but failed validation.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Config Model
// ============================================================================

/// Top-level configuration for the screening service.
///
/// # Invariants
/// - All sections carry defaults; an empty TOML document is valid.
/// - A returned config has passed [`ScreeningConfig::validate`].
#[derive(Debug, Clone, Deserialize)]
pub struct ScreeningConfig {
    /// Durable store settings.
    #[serde(default = "default_store")]
    pub store: SqliteStoreConfig,
    /// Severity penalties applied during scoring.
    #[serde(default)]
    pub scoring: ScoreWeights,
    /// Batch sizing and pacing.
    #[serde(default)]
    pub batch: BatchConfig,
}

/// Returns the default store section.
fn default_store() -> SqliteStoreConfig {
    SqliteStoreConfig::new(PathBuf::from(DEFAULT_DB_PATH))
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        Self {
            store: default_store(),
            scoring: ScoreWeights::default(),
            batch: BatchConfig::default(),
        }
    }
}

impl ScreeningConfig {
    /// Loads configuration from the provided path, or from the default path
    /// when `path` is `None`. A missing default-path file yields the default
    /// config; a missing explicit path is an error.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, is oversized,
    /// fails to parse, or fails validation.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (resolved, explicit) = match path {
            Some(given) => (given.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        };
        if !explicit && !resolved.exists() {
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        }
        let metadata = fs::metadata(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if metadata.len() > MAX_CONFIG_BYTES {
            return Err(ConfigError::Oversized(metadata.len()));
        }
        let raw = fs::read_to_string(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        let config: Self =
            toml::from_str(&raw).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field constraints the types alone cannot enforce.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch.limit == 0 {
            return Err(ConfigError::Invalid("batch.limit must be nonzero".to_string()));
        }
        if self.batch.concurrency == 0 {
            return Err(ConfigError::Invalid("batch.concurrency must be nonzero".to_string()));
        }
        for (name, penalty) in [
            ("scoring.critical", self.scoring.critical),
            ("scoring.high", self.scoring.high),
            ("scoring.medium", self.scoring.medium),
            ("scoring.low", self.scoring.low),
        ] {
            if penalty > MAX_PENALTY {
                return Err(ConfigError::Invalid(format!(
                    "{name} exceeds the maximum penalty of {MAX_PENALTY}"
                )));
            }
        }
        if self.store.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("store.path must not be empty".to_string()));
        }
        Ok(())
    }
}
