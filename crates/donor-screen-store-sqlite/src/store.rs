// crates/donor-screen-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Screening Store
// Description: RuleStore and SubmissionStore over a SQLite connection.
// Purpose: Persist rules and submission evaluation fields durably.
// Dependencies: donor-screen-core, rusqlite, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! One database file holds both tables. Rule keys are enforced unique by a
//! constraint so a colliding create leaves no partial write. Evaluation
//! results overwrite the submission's evaluation columns in place
//! (last-writer-wins, no history). Loads fail closed on rows that no longer
//! parse.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Mutex;
use std::time::Duration;

use donor_screen_core::EvaluationResult;
use donor_screen_core::FieldPath;
use donor_screen_core::RuleCheck;
use donor_screen_core::RuleDraft;
use donor_screen_core::RuleId;
use donor_screen_core::RuleKey;
use donor_screen_core::RulePatch;
use donor_screen_core::RuleStore;
use donor_screen_core::RuleStoreError;
use donor_screen_core::RuleType;
use donor_screen_core::ScreeningRule;
use donor_screen_core::Severity;
use donor_screen_core::Submission;
use donor_screen_core::SubmissionId;
use donor_screen_core::SubmissionStore;
use donor_screen_core::SubmissionStoreError;
use donor_screen_core::validate_check;
use rusqlite::Connection;
use rusqlite::ErrorCode;
use rusqlite::OptionalExtension;
use rusqlite::Row;
use rusqlite::params;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteJournalMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteJournalMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// Configuration for the `SQLite` screening store.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `busy_timeout_ms` is interpreted as milliseconds.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteJournalMode,
}

/// Returns the default busy timeout.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

impl SqliteStoreConfig {
    /// Creates a config with defaults for the provided path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteJournalMode::default(),
        }
    }
}

// ============================================================================
// SECTION: Store Errors
// ============================================================================

/// Errors raised while opening or migrating the store.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Database could not be opened.
    #[error("sqlite open failed: {0}")]
    Open(String),
    /// Schema version in the file is incompatible.
    #[error("sqlite schema version mismatch (expected {expected}, got {actual})")]
    VersionMismatch {
        /// Version expected by this build.
        expected: i64,
        /// Version found in the database file.
        actual: i64,
    },
    /// Schema initialization failed.
    #[error("sqlite schema init failed: {0}")]
    Init(String),
}

// ============================================================================
// SECTION: Screening Store
// ============================================================================

/// Durable screening store implementing both storage interfaces.
///
/// # Invariants
/// - `rule_key` uniqueness is enforced by the database constraint.
/// - Evaluation columns are overwritten in place; the store keeps no
///   evaluation history.
pub struct SqliteScreeningStore {
    /// Connection guarded for concurrent hosts.
    conn: Mutex<Connection>,
}

impl SqliteScreeningStore {
    /// Opens (and, when new, initializes) the store at the configured path.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened, its
    /// schema cannot be initialized, or its schema version is incompatible.
    pub fn open(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        let conn = Connection::open(&config.path)
            .map_err(|err| SqliteStoreError::Open(err.to_string()))?;
        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))
            .map_err(|err| SqliteStoreError::Open(err.to_string()))?;
        conn.pragma_update(None, "journal_mode", config.journal_mode.pragma_value())
            .map_err(|err| SqliteStoreError::Open(err.to_string()))?;
        Self::migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates or verifies the schema.
    fn migrate(conn: &Connection) -> Result<(), SqliteStoreError> {
        let version: i64 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .map_err(|err| SqliteStoreError::Init(err.to_string()))?;
        if version == SCHEMA_VERSION {
            return Ok(());
        }
        if version != 0 {
            return Err(SqliteStoreError::VersionMismatch {
                expected: SCHEMA_VERSION,
                actual: version,
            });
        }
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS screening_rules (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                rule_key TEXT NOT NULL UNIQUE,
                rule_type TEXT NOT NULL,
                rule_name TEXT NOT NULL,
                field_path TEXT NOT NULL,
                check_json TEXT NOT NULL,
                severity TEXT NOT NULL,
                is_active INTEGER NOT NULL,
                display_order INTEGER NOT NULL,
                description TEXT
            );
            CREATE TABLE IF NOT EXISTS donor_submissions (
                submission_id TEXT PRIMARY KEY,
                intake_json TEXT NOT NULL,
                ai_score INTEGER,
                ai_recommendation TEXT,
                ai_evaluation TEXT,
                evaluation_flags TEXT,
                evaluated_at INTEGER
            );",
        )
        .map_err(|err| SqliteStoreError::Init(err.to_string()))?;
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)
            .map_err(|err| SqliteStoreError::Init(err.to_string()))?;
        Ok(())
    }

    /// Inserts a submission row with no evaluation result.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionStoreError::Io`] when the identifier already
    /// exists or the write fails.
    pub fn insert_submission(
        &self,
        id: &SubmissionId,
        submission: &Submission,
    ) -> Result<(), SubmissionStoreError> {
        let intake = serde_json::to_string(submission)
            .map_err(|err| SubmissionStoreError::Io(err.to_string()))?;
        let conn = self
            .conn
            .lock()
            .map_err(|_| SubmissionStoreError::Corrupt("lock poisoned".to_string()))?;
        conn.execute(
            "INSERT INTO donor_submissions (submission_id, intake_json) VALUES (?1, ?2)",
            params![id.as_str(), intake],
        )
        .map_err(|err| SubmissionStoreError::Io(err.to_string()))?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Row Mapping
// ============================================================================

/// Builds a screening rule from a `screening_rules` row.
fn rule_from_row(row: &Row<'_>) -> Result<ScreeningRule, RuleStoreError> {
    let id: i64 = row.get("id").map_err(rule_io)?;
    let rule_key: String = row.get("rule_key").map_err(rule_io)?;
    let rule_type: String = row.get("rule_type").map_err(rule_io)?;
    let field_path: String = row.get("field_path").map_err(rule_io)?;
    let check_json: String = row.get("check_json").map_err(rule_io)?;
    let severity: String = row.get("severity").map_err(rule_io)?;
    let check: RuleCheck = serde_json::from_str(&check_json)
        .map_err(|err| RuleStoreError::Corrupt(format!("check payload: {err}")))?;
    Ok(ScreeningRule {
        id: RuleId::new(id),
        rule_key: RuleKey::new(rule_key),
        rule_type: RuleType::from_str(&rule_type)
            .map_err(|err| RuleStoreError::Corrupt(err.to_string()))?,
        rule_name: row.get("rule_name").map_err(rule_io)?,
        field_path: FieldPath::from_str(&field_path)
            .map_err(|err| RuleStoreError::Corrupt(err.to_string()))?,
        check,
        severity: Severity::from_str(&severity)
            .map_err(|err| RuleStoreError::Corrupt(err.to_string()))?,
        is_active: row.get("is_active").map_err(rule_io)?,
        display_order: row.get("display_order").map_err(rule_io)?,
        description: row.get("description").map_err(rule_io)?,
    })
}

/// Maps a rusqlite error to a rule store I/O error.
fn rule_io(err: rusqlite::Error) -> RuleStoreError {
    RuleStoreError::Io(err.to_string())
}

/// Maps a rusqlite error from a rule write, detecting key collisions.
fn rule_write_error(err: rusqlite::Error, key: &RuleKey) -> RuleStoreError {
    if let rusqlite::Error::SqliteFailure(failure, _) = &err
        && failure.code == ErrorCode::ConstraintViolation
    {
        return RuleStoreError::DuplicateRuleKey(key.clone());
    }
    RuleStoreError::Io(err.to_string())
}

/// Maps a rusqlite error to a submission store I/O error.
fn submission_io(err: rusqlite::Error) -> SubmissionStoreError {
    SubmissionStoreError::Io(err.to_string())
}

// ============================================================================
// SECTION: RuleStore Implementation
// ============================================================================

impl RuleStore for SqliteScreeningStore {
    fn create(&self, draft: RuleDraft) -> Result<ScreeningRule, RuleStoreError> {
        validate_check(draft.field_path, &draft.check)?;
        let check_json =
            serde_json::to_string(&draft.check).map_err(|err| RuleStoreError::Io(err.to_string()))?;
        let conn =
            self.conn.lock().map_err(|_| RuleStoreError::Corrupt("lock poisoned".to_string()))?;
        conn.execute(
            "INSERT INTO screening_rules
                (rule_key, rule_type, rule_name, field_path, check_json, severity,
                 is_active, display_order, description)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                draft.rule_key.as_str(),
                draft.rule_type.as_str(),
                draft.rule_name,
                draft.field_path.as_str(),
                check_json,
                draft.severity.as_str(),
                draft.is_active,
                draft.display_order,
                draft.description,
            ],
        )
        .map_err(|err| rule_write_error(err, &draft.rule_key))?;
        let id = conn.last_insert_rowid();
        Ok(ScreeningRule {
            id: RuleId::new(id),
            rule_key: draft.rule_key,
            rule_type: draft.rule_type,
            rule_name: draft.rule_name,
            field_path: draft.field_path,
            check: draft.check,
            severity: draft.severity,
            is_active: draft.is_active,
            display_order: draft.display_order,
            description: draft.description,
        })
    }

    fn update(&self, id: RuleId, patch: RulePatch) -> Result<ScreeningRule, RuleStoreError> {
        let mut rule = {
            let conn = self
                .conn
                .lock()
                .map_err(|_| RuleStoreError::Corrupt("lock poisoned".to_string()))?;
            conn.query_row(
                "SELECT id, rule_key, rule_type, rule_name, field_path, check_json,
                        severity, is_active, display_order, description
                 FROM screening_rules WHERE id = ?1",
                params![id.get()],
                |row| Ok(rule_from_row(row)),
            )
            .optional()
            .map_err(rule_io)?
            .ok_or(RuleStoreError::UnknownRule(id))??
        };
        if let Some(rule_type) = patch.rule_type {
            rule.rule_type = rule_type;
        }
        if let Some(rule_name) = patch.rule_name {
            rule.rule_name = rule_name;
        }
        if let Some(field_path) = patch.field_path {
            rule.field_path = field_path;
        }
        if let Some(check) = patch.check {
            rule.check = check;
        }
        if let Some(severity) = patch.severity {
            rule.severity = severity;
        }
        if let Some(is_active) = patch.is_active {
            rule.is_active = is_active;
        }
        if let Some(display_order) = patch.display_order {
            rule.display_order = display_order;
        }
        if let Some(description) = patch.description {
            rule.description = Some(description);
        }
        validate_check(rule.field_path, &rule.check)?;
        let check_json =
            serde_json::to_string(&rule.check).map_err(|err| RuleStoreError::Io(err.to_string()))?;
        let conn =
            self.conn.lock().map_err(|_| RuleStoreError::Corrupt("lock poisoned".to_string()))?;
        // rule_key is deliberately absent from the update; keys are
        // immutable after creation.
        conn.execute(
            "UPDATE screening_rules SET
                rule_type = ?1, rule_name = ?2, field_path = ?3, check_json = ?4,
                severity = ?5, is_active = ?6, display_order = ?7, description = ?8
             WHERE id = ?9",
            params![
                rule.rule_type.as_str(),
                rule.rule_name,
                rule.field_path.as_str(),
                check_json,
                rule.severity.as_str(),
                rule.is_active,
                rule.display_order,
                rule.description,
                id.get(),
            ],
        )
        .map_err(rule_io)?;
        Ok(rule)
    }

    fn delete(&self, id: RuleId) -> Result<(), RuleStoreError> {
        let conn =
            self.conn.lock().map_err(|_| RuleStoreError::Corrupt("lock poisoned".to_string()))?;
        let affected = conn
            .execute("DELETE FROM screening_rules WHERE id = ?1", params![id.get()])
            .map_err(rule_io)?;
        if affected == 0 {
            return Err(RuleStoreError::UnknownRule(id));
        }
        Ok(())
    }

    fn set_active(&self, id: RuleId, active: bool) -> Result<ScreeningRule, RuleStoreError> {
        self.update(
            id,
            RulePatch {
                is_active: Some(active),
                ..RulePatch::default()
            },
        )
    }

    fn list(&self, active_only: bool) -> Result<Vec<ScreeningRule>, RuleStoreError> {
        let conn =
            self.conn.lock().map_err(|_| RuleStoreError::Corrupt("lock poisoned".to_string()))?;
        let sql = if active_only {
            "SELECT id, rule_key, rule_type, rule_name, field_path, check_json,
                    severity, is_active, display_order, description
             FROM screening_rules WHERE is_active = 1
             ORDER BY CASE rule_type WHEN 'hard_disqualify' THEN 0 ELSE 1 END, display_order"
        } else {
            "SELECT id, rule_key, rule_type, rule_name, field_path, check_json,
                    severity, is_active, display_order, description
             FROM screening_rules
             ORDER BY CASE rule_type WHEN 'hard_disqualify' THEN 0 ELSE 1 END, display_order"
        };
        let mut statement = conn.prepare(sql).map_err(rule_io)?;
        let rows = statement.query_map([], |row| Ok(rule_from_row(row))).map_err(rule_io)?;
        let mut rules = Vec::new();
        for row in rows {
            rules.push(row.map_err(rule_io)??);
        }
        Ok(rules)
    }
}

// ============================================================================
// SECTION: SubmissionStore Implementation
// ============================================================================

impl SubmissionStore for SqliteScreeningStore {
    fn get(&self, id: &SubmissionId) -> Result<Submission, SubmissionStoreError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| SubmissionStoreError::Corrupt("lock poisoned".to_string()))?;
        let intake: Option<String> = conn
            .query_row(
                "SELECT intake_json FROM donor_submissions WHERE submission_id = ?1",
                params![id.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(submission_io)?;
        let intake =
            intake.ok_or_else(|| SubmissionStoreError::UnknownSubmission(id.clone()))?;
        serde_json::from_str(&intake)
            .map_err(|err| SubmissionStoreError::Corrupt(format!("intake payload: {err}")))
    }

    fn list_unevaluated(&self, limit: usize) -> Result<Vec<SubmissionId>, SubmissionStoreError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| SubmissionStoreError::Corrupt("lock poisoned".to_string()))?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut statement = conn
            .prepare(
                "SELECT submission_id FROM donor_submissions
                 WHERE evaluated_at IS NULL ORDER BY rowid LIMIT ?1",
            )
            .map_err(submission_io)?;
        let rows = statement
            .query_map(params![limit], |row| row.get::<_, String>(0))
            .map_err(submission_io)?;
        let mut ids = Vec::new();
        for row in rows {
            ids.push(SubmissionId::new(row.map_err(submission_io)?));
        }
        Ok(ids)
    }

    fn save_evaluation(
        &self,
        id: &SubmissionId,
        result: &EvaluationResult,
    ) -> Result<(), SubmissionStoreError> {
        let evaluation = serde_json::to_string(result)
            .map_err(|err| SubmissionStoreError::Io(err.to_string()))?;
        let flags = serde_json::to_string(&result.flags)
            .map_err(|err| SubmissionStoreError::Io(err.to_string()))?;
        let conn = self
            .conn
            .lock()
            .map_err(|_| SubmissionStoreError::Corrupt("lock poisoned".to_string()))?;
        let affected = conn
            .execute(
                "UPDATE donor_submissions SET
                    ai_score = ?1, ai_recommendation = ?2, ai_evaluation = ?3,
                    evaluation_flags = ?4, evaluated_at = ?5
                 WHERE submission_id = ?6",
                params![
                    i64::from(result.score),
                    result.recommendation.as_str(),
                    evaluation,
                    flags,
                    result.evaluated_at.as_unix_millis(),
                    id.as_str(),
                ],
            )
            .map_err(submission_io)?;
        if affected == 0 {
            return Err(SubmissionStoreError::UnknownSubmission(id.clone()));
        }
        Ok(())
    }
}
