//! Configuration and input validation errors.

use core::fmt;

use crate::common::ErrorSeverity;

/// Validation error types.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Value out of range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Field name
        field: String,
        /// The invalid value
        value: String,
        /// Minimum allowed value
        min: String,
        /// Maximum allowed value
        max: String,
    },

    /// Value is NaN or infinite
    #[error("{field} must be a finite number, got {value}")]
    NotFinite {
        /// Field name
        field: String,
        /// The offending value
        value: String,
    },

    /// Value must be strictly positive
    #[error("{field} must be greater than zero")]
    NotPositive {
        /// Field name
        field: String,
    },

    /// Invalid format
    #[error("Invalid format for field '{field}': {reason}")]
    InvalidFormat {
        /// Field name
        field: String,
        /// Reason for the format error
        reason: String,
    },

    /// Constraint violation
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

impl ValidationError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Error
    }

    /// Create an out of range error for a numeric value.
    pub fn out_of_range<T: fmt::Debug>(field: impl Into<String>, value: T, min: T, max: T) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            value: format!("{value:?}"),
            min: format!("{min:?}"),
            max: format!("{max:?}"),
        }
    }

    /// Create a non-finite value error.
    pub fn not_finite(field: impl Into<String>, value: f64) -> Self {
        ValidationError::NotFinite {
            field: field.into(),
            value: format!("{value:?}"),
        }
    }

    /// Create a not-positive error.
    pub fn not_positive(field: impl Into<String>) -> Self {
        ValidationError::NotPositive {
            field: field.into(),
        }
    }

    /// Create an invalid format error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a constraint violation error.
    pub fn constraint(msg: impl Into<String>) -> Self {
        ValidationError::ConstraintViolation(msg.into())
    }

    /// Check that `value` is finite.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NotFinite`] for NaN or infinite values.
    pub fn require_finite(field: &str, value: f64) -> Result<f64, Self> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(Self::not_finite(field, value))
        }
    }

    /// Check that `value` is finite and not negative.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NotFinite`] or [`ValidationError::OutOfRange`].
    pub fn require_non_negative(field: &str, value: f64) -> Result<f64, Self> {
        let value = Self::require_finite(field, value)?;
        if value < 0.0 {
            return Err(Self::out_of_range(field, value, 0.0, f64::MAX));
        }
        Ok(value)
    }
}
