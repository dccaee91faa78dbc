//! # Error Types
//!
//! Domain-specific error types for ledger-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  ledger-core errors (this file)                                        │
//! │  ├── CoreError        - Domain rule violations                         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  ledger-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → caller                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant aborts the single save it was raised from. Nothing is
//! retried and nothing is swallowed.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Domain rule violations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A purchase or sale tried to change its quantity or product under
    /// [`StockPolicy::Immutable`](crate::stock::StockPolicy::Immutable).
    ///
    /// ## When This Occurs
    /// ```text
    /// Sale VTE-20261016-A1B2C3 saved with quantity 30
    ///      │
    ///      ▼
    /// Edit quantity → 35
    ///      │
    ///      ▼
    /// StockFieldsLocked { reference: "VTE-20261016-A1B2C3" }
    /// ```
    #[error("Quantity and product of {reference} cannot change after creation")]
    StockFieldsLocked { reference: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any row is written, so a failing save leaves the database
/// untouched.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, stray characters).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// A date range ends before it starts.
    #[error("{field} ends ({end}) before it starts ({start})")]
    InvalidPeriod {
        field: String,
        start: String,
        end: String,
    },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::StockFieldsLocked {
            reference: "VTE-20261016-A1B2C3".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Quantity and product of VTE-20261016-A1B2C3 cannot change after creation"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "last_name".to_string(),
        };
        assert_eq!(err.to_string(), "last_name is required");

        let err = ValidationError::TooLong {
            field: "phone".to_string(),
            max: 20,
        };
        assert_eq!(err.to_string(), "phone must be at most 20 characters");

        let err = ValidationError::InvalidPeriod {
            field: "period".to_string(),
            start: "2026-10-31".to_string(),
            end: "2026-10-01".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "period ends (2026-10-01) before it starts (2026-10-31)"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
