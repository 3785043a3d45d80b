// crates/donor-screen-config/tests/load_validation.rs
// ============================================================================
// Module: Config Load Validation Tests
// Description: Validate config loading guards and section defaults.
// Purpose: Ensure config input handling is strict and fail-closed.
// ============================================================================

//! Config load validation tests for donor-screen-config.

use std::io::Write;

use donor_screen_config::ConfigError;
use donor_screen_config::ScreeningConfig;
use tempfile::NamedTempFile;

type TestResult = Result<(), String>;

fn assert_invalid(result: Result<ScreeningConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config load".to_string()),
    }
}

fn write_config(body: &str) -> Result<NamedTempFile, String> {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(body.as_bytes()).map_err(|err| err.to_string())?;
    Ok(file)
}

#[test]
fn empty_file_yields_defaults() -> TestResult {
    let file = write_config("")?;
    let config = ScreeningConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    if config.scoring.critical != 100 || config.scoring.low != 5 {
        return Err("default scoring weights not applied".to_string());
    }
    if config.batch.limit != 25 || config.batch.concurrency != 3 {
        return Err("default batch sizing not applied".to_string());
    }
    Ok(())
}

#[test]
fn sections_override_defaults() -> TestResult {
    let file = write_config(
        "[store]\n\
         path = \"screening.db\"\n\
         journal_mode = \"delete\"\n\
         \n\
         [scoring]\n\
         critical = 90\n\
         high = 25\n\
         medium = 10\n\
         low = 2\n\
         \n\
         [batch]\n\
         limit = 50\n",
    )?;
    let config = ScreeningConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    if config.scoring.critical != 90 || config.scoring.low != 2 {
        return Err("scoring overrides not applied".to_string());
    }
    if config.batch.limit != 50 {
        return Err("batch limit override not applied".to_string());
    }
    if config.batch.concurrency != 3 {
        return Err("unset batch field lost its default".to_string());
    }
    Ok(())
}

#[test]
fn load_rejects_missing_explicit_path() -> TestResult {
    let missing = std::path::Path::new("does-not-exist.toml");
    assert_invalid(ScreeningConfig::load(Some(missing)), "config read failed")
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    let payload = vec![b'#'; 1_048_577];
    file.write_all(&payload).map_err(|err| err.to_string())?;
    assert_invalid(ScreeningConfig::load(Some(file.path())), "exceeds size limit")
}

#[test]
fn load_rejects_malformed_toml() -> TestResult {
    let file = write_config("[batch\nlimit = 5")?;
    assert_invalid(ScreeningConfig::load(Some(file.path())), "config parse failed")
}

#[test]
fn load_rejects_zero_concurrency() -> TestResult {
    let file = write_config("[batch]\nconcurrency = 0\n")?;
    assert_invalid(ScreeningConfig::load(Some(file.path())), "batch.concurrency")
}

#[test]
fn load_rejects_oversized_penalty() -> TestResult {
    let file = write_config("[scoring]\nhigh = 250\n")?;
    assert_invalid(ScreeningConfig::load(Some(file.path())), "scoring.high")
}
