//! # Validation Module
//!
//! Input validation for booking requests and for fields read back from
//! storage.
//!
//! ## Where Validation Runs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Booking form                                                           │
//! │  ├── BookingDraft::new → guest names, email, phone, guest count        │
//! │  └── normalize_coupon_code → trimmed, upper-case, or None              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  lodging-db parsing boundary                                            │
//! │  ├── validate_price_cents / validate_percent_bps                       │
//! │  └── validate_days_of_week                                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  SQLite                                                                 │
//! │  └── NOT NULL / UNIQUE / CHECK constraints                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use lodging_core::validation::{normalize_coupon_code, validate_email};
//!
//! validate_email("guest@example.com").unwrap();
//! assert_eq!(normalize_coupon_code(" welcome2025 ").as_deref(), Some("WELCOME2025"));
//! ```

use crate::error::ValidationError;
use crate::{MAX_GUEST_NAME_LENGTH, MAX_RV_LENGTH_FEET};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Guest Contact Validators
// =============================================================================

/// Validates a first or last name.
///
/// ## Rules
/// - Must not be blank
/// - At most MAX_GUEST_NAME_LENGTH (100) characters
pub fn validate_guest_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > MAX_GUEST_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_GUEST_NAME_LENGTH,
        });
    }

    Ok(())
}

/// Validates an email address.
///
/// Only the shape is checked: one `@`, a non-empty local part and a domain
/// containing a dot. Deliverability is the mailer's problem.
///
/// ## Example
/// ```rust
/// use lodging_core::validation::validate_email;
///
/// assert!(validate_email("jane@example.com").is_ok());
/// assert!(validate_email("jane@localhost").is_err());
/// assert!(validate_email("").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: reason.to_string(),
    };

    if email.chars().any(char::is_whitespace) {
        return Err(invalid("must not contain spaces"));
    }

    let (local, domain) = email
        .split_once('@')
        .ok_or_else(|| invalid("missing @"))?;

    if local.is_empty() || domain.contains('@') {
        return Err(invalid("must look like name@domain.tld"));
    }

    match domain.rsplit_once('.') {
        Some((host, tld)) if !host.is_empty() && !tld.is_empty() => Ok(()),
        _ => Err(invalid("must look like name@domain.tld")),
    }
}

/// Validates a phone number.
///
/// ## Rules
/// - Digits plus `+ - ( ) . space` only
/// - Between 7 and 15 digits (E.164 upper bound)
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    let phone = phone.trim();

    if phone.is_empty() {
        return Err(ValidationError::Required {
            field: "phone".to_string(),
        });
    }

    if !phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')' | '.' | ' '))
    {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must contain only digits, spaces, and + - ( ) .".to_string(),
        });
    }

    let digits = phone.chars().filter(char::is_ascii_digit).count();
    if !(7..=15).contains(&digits) {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must contain between 7 and 15 digits".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Booking Validators
// =============================================================================

/// Guest count must be at least one. The per-site ceiling is checked against
/// the site itself in [`BookingDraft::new`](crate::booking::BookingDraft::new).
pub fn validate_guest_count(count: u32) -> ValidationResult<()> {
    if count == 0 {
        return Err(ValidationError::MustBePositive {
            field: "number of guests".to_string(),
        });
    }

    Ok(())
}

/// Validates an RV length in feet.
pub fn validate_rv_length(feet: u32) -> ValidationResult<()> {
    if feet == 0 || feet > MAX_RV_LENGTH_FEET {
        return Err(ValidationError::OutOfRange {
            field: "rv length".to_string(),
            min: 1,
            max: i64::from(MAX_RV_LENGTH_FEET),
        });
    }

    Ok(())
}

/// Normalizes a guest-entered coupon code.
///
/// Returns `None` for a blank code so callers can skip the lookup entirely.
pub fn normalize_coupon_code(code: &str) -> Option<String> {
    let code = code.trim();

    if code.is_empty() {
        None
    } else {
        Some(code.to_uppercase())
    }
}

// =============================================================================
// Stored Value Validators
// =============================================================================

/// Validates a price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
///
/// ## Example
/// ```rust
/// use lodging_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents("base price", 7500).is_ok());
/// assert!(validate_price_cents("base price", -100).is_err());
/// ```
pub fn validate_price_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a percentage in basis points against an inclusive range.
///
/// Tax and deposit use `0..=10000`; rule discounts allow negatives.
pub fn validate_percent_bps(field: &str, bps: i64, min: i64, max: i64) -> ValidationResult<()> {
    if bps < min || bps > max {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min,
            max,
        });
    }

    Ok(())
}

/// Validates weekday numbers (0 = Sunday .. 6 = Saturday).
pub fn validate_days_of_week(days: &[u8]) -> ValidationResult<()> {
    if days.is_empty() {
        return Err(ValidationError::Required {
            field: "days of week".to_string(),
        });
    }

    if let Some(day) = days.iter().find(|d| **d > 6) {
        return Err(ValidationError::InvalidFormat {
            field: "days of week".to_string(),
            reason: format!("{day} is not a weekday (0 = Sunday .. 6 = Saturday)"),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
