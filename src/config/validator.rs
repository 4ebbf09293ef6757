//! Configuration validation rules.
//!
//! This module validates configuration for correctness:
//! - The base interpreter and tracked package must be named
//! - The environment directory must not be empty
//! - The entry point must be a non-empty module or script
//! - The registry URL must be http(s) and the timeout non-zero

use crate::config::schema::{BasecampConfig, EntryPoint};
use crate::error::{BasecampError, Result};

/// Validation error with context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Rule identifier
    pub rule: String,
    /// Human-readable error message
    pub message: String,
}

impl ValidationError {
    fn new(rule: &str, message: &str) -> Self {
        Self {
            rule: rule.to_string(),
            message: message.to_string(),
        }
    }
}

/// Validate a configuration and return all errors.
///
/// All problems are collected rather than stopping at the first one.
pub fn validate_config(config: &BasecampConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if config.python.trim().is_empty() {
        errors.push(ValidationError::new("empty-python", "'python' must name an interpreter"));
    }
    if config.tracked_package.trim().is_empty() {
        errors.push(ValidationError::new(
            "empty-tracked-package",
            "'tracked_package' must name a package",
        ));
    }
    if config.env_dir.as_os_str().is_empty() {
        errors.push(ValidationError::new("empty-env-dir", "'env_dir' must not be empty"));
    }

    let entry_empty = match &config.entry {
        EntryPoint::Module(module) => module.trim().is_empty(),
        EntryPoint::Script(path) => path.as_os_str().is_empty(),
    };
    if entry_empty {
        errors.push(ValidationError::new("empty-entry", "'entry' must not be empty"));
    }

    let url = config.registry.index_url.as_str();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        errors.push(ValidationError::new(
            "invalid-index-url",
            &format!("'registry.index_url' must be an http(s) URL, got '{}'", url),
        ));
    }
    if config.registry.timeout_ms == 0 {
        errors.push(ValidationError::new(
            "zero-timeout",
            "'registry.timeout_ms' must be greater than zero",
        ));
    }

    errors
}

/// Validate and convert the first problems into a single error.
pub fn ensure_valid(config: &BasecampConfig) -> Result<()> {
    let errors = validate_config(config);
    if errors.is_empty() {
        return Ok(());
    }

    for error in &errors {
        tracing::debug!("Config rule {} failed: {}", error.rule, error.message);
    }
    Err(BasecampError::ConfigValidationError {
        message: errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; "),
    })
}
