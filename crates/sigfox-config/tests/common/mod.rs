// crates/sigfox-config/tests/common/mod.rs
// ============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for config validation tests.
// Purpose: Reduce duplication across sigfox-config integration tests.
// ============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use sigfox_config::ConfigError;
use sigfox_config::PipelineConfig;

/// Result type used by config tests.
pub type TestResult = Result<(), String>;

/// Parses a TOML string into a `PipelineConfig` for tests.
pub fn config_from_toml(toml_str: &str) -> Result<PipelineConfig, String> {
    PipelineConfig::from_toml_str(toml_str).map_err(|err| err.to_string())
}

/// Returns a minimal config with all defaults applied.
pub fn minimal_config() -> Result<PipelineConfig, String> {
    config_from_toml("")
}

/// Checks that `result` failed with a message containing `needle`.
pub fn assert_invalid<T>(result: Result<T, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config".to_string()),
    }
}

/// Parses and validates `toml_str`, expecting a validation failure.
pub fn assert_toml_invalid(toml_str: &str, needle: &str) -> TestResult {
    let config = config_from_toml(toml_str)?;
    assert_invalid(config.validate(), needle)
}
