//! Tracing subscriber setup for hosts that do not install their own.

use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Invalid log filter '{directive}': {message}")]
    InvalidFilter { directive: String, message: String },
}

/// Installs a global `fmt` subscriber.
///
/// `RUST_LOG` takes precedence over `default_level` when set. Returns
/// `Ok(false)` if a global subscriber was already installed, so calling this
/// more than once is harmless.
///
/// # Errors
///
/// Returns `LoggingError::InvalidFilter` if the effective directive does not parse.
pub fn init(default_level: &str) -> Result<bool, LoggingError> {
    let directive = std::env::var("RUST_LOG").unwrap_or_else(|_| default_level.to_string());
    let filter = EnvFilter::try_new(&directive).map_err(|e| LoggingError::InvalidFilter {
        directive: directive.clone(),
        message: e.to_string(),
    })?;

    Ok(tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let first = init("debug").unwrap();
        let second = init("debug").unwrap();
        assert!(!(first && second));
    }

    #[test]
    fn test_invalid_directive() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let result = init("recipe_hub=loud");
        assert!(matches!(result, Err(LoggingError::InvalidFilter { .. })));
    }
}
