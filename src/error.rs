//! Tether and kite error types.
//!
//! Rope operations and configuration validation return [`KiteResult`]; the
//! systems that call them log the error and carry on, so one misconfigured
//! rope never takes the rest of the simulation down with it.
//!
//! Growth requests that exceed the current capacity are *not* errors: the
//! segment-count controller clamps them silently.

use std::fmt;

/// Top-level error enum for the kite simulation.
#[derive(Debug, Clone, PartialEq)]
pub enum KiteError {
    /// A collaborator needed to build or extend a rope (anchor body, segment
    /// template, payload template, tail body) is not available.
    MissingCollaborator {
        /// What was missing, for logging.
        what: &'static str,
    },

    /// `build` was called on a rope that already has segments or a kite.
    AlreadyBuilt,

    /// A segment removal was requested on a rope with no segments left.
    EmptyChain,

    /// A configuration value is outside its valid range.
    InvalidConfig {
        /// Name of the field (for logging).
        name: &'static str,
        /// The value that was rejected.
        value: f32,
        /// Human-readable description of the valid range.
        expected: &'static str,
    },
}

impl fmt::Display for KiteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KiteError::MissingCollaborator { what } => {
                write!(f, "missing collaborator: {} is not set", what)
            }
            KiteError::AlreadyBuilt => write!(f, "rope is already built"),
            KiteError::EmptyChain => write!(f, "rope has no segments to remove"),
            KiteError::InvalidConfig {
                name,
                value,
                expected,
            } => write!(
                f,
                "config value '{}' = {} is outside valid range {}",
                name, value, expected
            ),
        }
    }
}

impl std::error::Error for KiteError {}

/// Convenience alias: a `Result` using `KiteError` as the error type.
pub type KiteResult<T> = Result<T, KiteError>;

// ── Validation helpers ────────────────────────────────────────────────────────

/// Returns an error if `value` is not strictly positive.
pub fn validate_positive(name: &'static str, value: f32) -> KiteResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(KiteError::InvalidConfig {
            name,
            value,
            expected: "(0.0, ∞)",
        })
    }
}

/// Returns an error if `value` is negative.
pub fn validate_non_negative(name: &'static str, value: f32) -> KiteResult<()> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(KiteError::InvalidConfig {
            name,
            value,
            expected: "[0.0, ∞)",
        })
    }
}

/// Returns an error if `value` lies outside `[0, 1]`.
pub fn validate_unit_interval(name: &'static str, value: f32) -> KiteResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(KiteError::InvalidConfig {
            name,
            value,
            expected: "[0.0, 1.0]",
        })
    }
}
