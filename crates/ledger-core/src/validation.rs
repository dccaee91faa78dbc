//! # Validation Module
//!
//! Field validation for ledger records.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: *Input::validate() (THIS MODULE)                              │
//! │  ├── Required fields, max lengths                                       │
//! │  ├── Positive quantities, non-negative amounts                          │
//! │  └── Well-formed references and periods                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Database (SQLite)                                             │
//! │  ├── NOT NULL / CHECK constraints                                       │
//! │  ├── UNIQUE constraints (reference codes, plates)                       │
//! │  └── Foreign key constraints (cascade / set null)                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use ledger_core::validation::{validate_reference, validate_required_text};
//!
//! assert!(validate_reference("ACH-20261016-1A2B3C").is_ok());
//! assert!(validate_required_text("village", "  ", 100).is_err());
//! ```

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::money::Money;
use crate::quantity::Quantity;
use crate::{
    MAX_AMOUNT_CENTS, MAX_MEASURE_HUNDREDTHS, MAX_PHONE_LEN, MAX_PLATE_LEN,
    MAX_QUANTITY_HUNDREDTHS, MAX_REFERENCE_LEN,
};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required text field: non-blank and at most `max` characters.
pub fn validate_required_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    validate_max_len(field, value, max)
}

/// Validates an optional text field: when present, at most `max` characters.
pub fn validate_optional_text(
    field: &str,
    value: Option<&str>,
    max: usize,
) -> ValidationResult<()> {
    match value {
        Some(value) => validate_max_len(field, value.trim(), max),
        None => Ok(()),
    }
}

fn validate_max_len(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

/// Validates a phone number.
///
/// ## Rules
/// - Required, at most 20 characters
/// - Digits, spaces and `+ - . ( )` only
///
/// ## Example
/// ```rust
/// use ledger_core::validation::validate_phone;
///
/// assert!(validate_phone("+229 97 00 00 00").is_ok());
/// assert!(validate_phone("call me").is_err());
/// ```
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    validate_required_text("phone", phone, MAX_PHONE_LEN)?;

    let allowed = |c: char| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '.' | '(' | ')');
    if !phone.trim().chars().all(allowed) {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must contain only digits, spaces and + - . ( )".to_string(),
        });
    }

    Ok(())
}

/// Validates a reference code (purchase, sale, transport, salary payment).
///
/// ## Rules
/// - Required, at most 20 characters
/// - Letters, numbers, hyphens and underscores only
///
/// ## Example
/// ```rust
/// use ledger_core::validation::validate_reference;
///
/// assert!(validate_reference("VTE-20261016-00A1FF").is_ok());
/// assert!(validate_reference("").is_err());
/// assert!(validate_reference("has space").is_err());
/// ```
pub fn validate_reference(reference: &str) -> ValidationResult<()> {
    validate_code("reference", reference, MAX_REFERENCE_LEN, |c| {
        c.is_alphanumeric() || c == '-' || c == '_'
    })
}

/// Validates a reference code that may be left blank.
///
/// `None` and whitespace-only values pass: the record gets a generated code
/// on create and keeps its stored one on update.
pub fn validate_optional_reference(reference: Option<&str>) -> ValidationResult<()> {
    match normalize_optional(reference) {
        Some(reference) => validate_reference(&reference),
        None => Ok(()),
    }
}

/// Validates a truck plate.
///
/// ## Rules
/// - Required, at most 20 characters
/// - Letters, numbers, hyphens and spaces only
pub fn validate_plate(plate: &str) -> ValidationResult<()> {
    validate_code("plate", plate, MAX_PLATE_LEN, |c| {
        c.is_alphanumeric() || c == '-' || c == ' '
    })
}

fn validate_code(
    field: &str,
    value: &str,
    max: usize,
    allowed: impl Fn(char) -> bool,
) -> ValidationResult<()> {
    validate_required_text(field, value, max)?;

    if !value.trim().chars().all(allowed) {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "contains characters that are not allowed".to_string(),
        });
    }

    Ok(())
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (no search filter)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

/// Trims an optional text value; blank becomes `None`.
pub fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a purchase/sale quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must fit the stock column (≤ 99,999,999.99)
///
/// ## Example
/// ```rust
/// use ledger_core::{validation::validate_quantity, Quantity};
///
/// assert!(validate_quantity("quantity", Quantity::from_units(30)).is_ok());
/// assert!(validate_quantity("quantity", Quantity::zero()).is_err());
/// ```
pub fn validate_quantity(field: &str, qty: Quantity) -> ValidationResult<()> {
    if !qty.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    if qty.hundredths() > MAX_QUANTITY_HUNDREDTHS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: MAX_QUANTITY_HUNDREDTHS,
        });
    }

    Ok(())
}

/// Validates a monetary amount.
///
/// ## Rules
/// - Must be non-negative (>= 0); zero is allowed
/// - Must fit the money column (≤ 99,999,999.99)
///
/// ## Example
/// ```rust
/// use ledger_core::{validation::validate_amount, Money};
///
/// assert!(validate_amount("unit_price", Money::from_cents(1099)).is_ok());
/// assert!(validate_amount("unit_price", Money::zero()).is_ok());
/// assert!(validate_amount("unit_price", Money::from_cents(-100)).is_err());
/// ```
pub fn validate_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() || amount.cents() > MAX_AMOUNT_CENTS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_AMOUNT_CENTS,
        });
    }

    Ok(())
}

/// Validates a distance or capacity (0 to 9,999.99).
pub fn validate_measure(field: &str, value: Quantity) -> ValidationResult<()> {
    if value.is_negative() || value.hundredths() > MAX_MEASURE_HUNDREDTHS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_MEASURE_HUNDREDTHS,
        });
    }

    Ok(())
}

// =============================================================================
// Reference and Date Validators
// =============================================================================

/// Validates that a foreign reference is a UUID.
///
/// ## Example
/// ```rust
/// use ledger_core::validation::validate_uuid;
///
/// assert!(validate_uuid("product_id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("product_id", "not-a-uuid").is_err());
/// ```
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

/// Validates an optional foreign reference.
pub fn validate_optional_uuid(field: &str, id: Option<&str>) -> ValidationResult<()> {
    match id {
        Some(id) => validate_uuid(field, id),
        None => Ok(()),
    }
}

/// Validates that `end` is not before `start`.
pub fn validate_period(field: &str, start: NaiveDate, end: NaiveDate) -> ValidationResult<()> {
    if end < start {
        return Err(ValidationError::InvalidPeriod {
            field: field.to_string(),
            start: start.to_string(),
            end: end.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_validate_required_text() {
        assert!(validate_required_text("last_name", "Adjovi", 100).is_ok());
        assert!(matches!(
            validate_required_text("last_name", "   ", 100),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            validate_required_text("last_name", &"a".repeat(101), 100),
            Err(ValidationError::TooLong { max: 100, .. })
        ));
        // Length counts characters, not bytes
        assert!(validate_required_text("village", &"é".repeat(100), 100).is_ok());
    }

    #[test]
    fn test_validate_optional_text() {
        assert!(validate_optional_text("notes", None, 10).is_ok());
        assert!(validate_optional_text("notes", Some("short"), 10).is_ok());
        assert!(validate_optional_text("first_name", Some(&"x".repeat(11)), 10).is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("97000000").is_ok());
        assert!(validate_phone("+229 (97) 00-00.00").is_ok());
        assert!(validate_phone("").is_err());
        assert!(validate_phone("97abc").is_err());
        assert!(validate_phone(&"1".repeat(21)).is_err());
    }

    #[test]
    fn test_validate_optional_reference() {
        assert!(validate_optional_reference(None).is_ok());
        assert!(validate_optional_reference(Some("")).is_ok());
        assert!(validate_optional_reference(Some("   ")).is_ok());
        assert!(validate_optional_reference(Some(" ACH-0001 ")).is_ok());
        assert!(validate_optional_reference(Some("two words")).is_err());
    }

    #[test]
    fn test_validate_reference() {
        assert!(validate_reference("ACH-20261016-1A2B3C").is_ok());
        assert!(validate_reference("manual_42").is_ok());
        assert!(validate_reference("").is_err());
        assert!(validate_reference("with space").is_err());
        assert!(validate_reference(&"R".repeat(21)).is_err());
    }

    #[test]
    fn test_validate_plate() {
        assert!(validate_plate("AB 1234 RB").is_ok());
        assert!(validate_plate("AB-1234").is_ok());
        assert!(validate_plate("AB/1234").is_err());
        assert!(validate_plate(" ").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity("quantity", Quantity::from_hundredths(1)).is_ok());
        assert!(validate_quantity("quantity", Quantity::from_units(100)).is_ok());
        assert!(validate_quantity("quantity", Quantity::zero()).is_err());
        assert!(validate_quantity("quantity", Quantity::from_units(-1)).is_err());
        assert!(validate_quantity(
            "quantity",
            Quantity::from_hundredths(MAX_QUANTITY_HUNDREDTHS + 1)
        )
        .is_err());
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount("amount_received", Money::zero()).is_ok());
        assert!(validate_amount("amount_received", Money::from_cents(MAX_AMOUNT_CENTS)).is_ok());
        assert!(validate_amount("amount_received", Money::from_cents(-1)).is_err());
        assert!(
            validate_amount("amount_received", Money::from_cents(MAX_AMOUNT_CENTS + 1)).is_err()
        );
    }

    #[test]
    fn test_validate_measure() {
        assert!(validate_measure("capacity_tons", Quantity::from_units(30)).is_ok());
        assert!(validate_measure("capacity_tons", Quantity::zero()).is_ok());
        assert!(validate_measure("distance_to_hub", Quantity::from_units(10_000)).is_err());
        assert!(validate_measure("distance_to_hub", Quantity::from_units(-1)).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("agent_id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("agent_id", "").is_err());
        assert!(validate_uuid("agent_id", "123").is_err());
        assert!(validate_optional_uuid("sale_id", None).is_ok());
        assert!(validate_optional_uuid("sale_id", Some("nope")).is_err());
    }

    #[test]
    fn test_validate_period() {
        assert!(validate_period("period", date(2026, 10, 1), date(2026, 10, 31)).is_ok());
        assert!(validate_period("period", date(2026, 10, 1), date(2026, 10, 1)).is_ok());
        assert!(validate_period("period", date(2026, 10, 31), date(2026, 10, 1)).is_err());
    }

    #[test]
    fn test_normalize_optional() {
        assert_eq!(normalize_optional(Some("  note ")), Some("note".to_string()));
        assert_eq!(normalize_optional(Some("   ")), None);
        assert_eq!(normalize_optional(None), None);
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query("  maïs ").unwrap(), "maïs");
        assert!(validate_search_query(&"q".repeat(101)).is_err());
    }
}
