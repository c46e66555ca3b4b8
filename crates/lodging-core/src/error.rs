//! # Error Types
//!
//! Domain-specific error types for lodging-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  lodging-core errors (this file)                                       │
//! │  ├── CoreError          - Domain rule violations                       │
//! │  ├── ValidationError    - Input validation failures                    │
//! │  └── PricingError<E>    - What BookingEngine returns:                  │
//! │                           CoreError, or the store's own error E        │
//! │                                                                         │
//! │  lodging-db errors (separate crate)                                    │
//! │  └── DbError            - The E plugged into PricingError<E>           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → PricingError<DbError> → caller    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Propagation
//! - Invalid input (date range, guest count) fails before storage is touched
//! - An unusable coupon is NOT an error; it is `None`
//! - Storage errors pass through untouched in `PricingError::Storage`

use chrono::NaiveDate;
use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Site cannot be found.
    ///
    /// ## When This Occurs
    /// - Price calculation for a site id the store does not know
    #[error("Site not found: {0}")]
    SiteNotFound(String),

    /// Check-out is not strictly after check-in.
    ///
    /// ## When This Occurs
    /// - Same-day check-in/check-out (zero nights)
    /// - Dates swapped by the caller
    #[error("Check-out {check_out} must be after check-in {check_in}")]
    InvalidDateRange {
        check_in: NaiveDate,
        check_out: NaiveDate,
    },

    /// More guests than the site allows.
    #[error("Site allows at most {max} guests, {requested} requested")]
    GuestCountExceeded { requested: u32, max: u32 },

    /// Booking lifecycle transition that is not allowed.
    ///
    /// ## When This Occurs
    /// - Approving a cancelled booking
    /// - Re-opening a completed stay
    #[error("Booking cannot move from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input or a stored field doesn't meet
/// requirements.
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

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., malformed email, weekday outside 0-6).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Pricing Error
// =============================================================================

/// Errors returned by [`BookingEngine`](crate::engine::BookingEngine).
///
/// `E` is the storage collaborator's error type. It is carried unchanged so
/// callers can still match on it (e.g. `PricingError<DbError>`).
#[derive(Debug, Error)]
pub enum PricingError<E>
where
    E: std::error::Error + 'static,
{
    /// A domain rule rejected the request.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The storage collaborator failed.
    #[error("Storage error: {0}")]
    Storage(#[source] E),
}

impl<E> PricingError<E>
where
    E: std::error::Error + 'static,
{
    /// Returns the domain error, if this is one.
    pub fn as_core(&self) -> Option<&CoreError> {
        match self {
            PricingError::Core(err) => Some(err),
            PricingError::Storage(_) => None,
        }
    }

    /// Returns the storage error, if this is one.
    pub fn as_storage(&self) -> Option<&E> {
        match self {
            PricingError::Core(_) => None,
            PricingError::Storage(err) => Some(err),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
