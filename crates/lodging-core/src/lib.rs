//! # lodging-core: Pricing & Availability for a Small Campground
//!
//! This crate is the **heart** of the reservation system. It decides whether
//! a site is free and what a stay costs, as pure functions over data handed
//! to it by a storage collaborator.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Reservation System Architecture                     │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Booking page / checkout flow                   │   │
//! │  │     pick dates ──► see quote ──► enter coupon ──► pay deposit   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ lodging-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │  ┌────────────┐ ┌──────────┐ ┌──────────┐ ┌──────────────────┐ │   │
//! │  │  │availability│ │  rules   │ │  coupon  │ │     pricing      │ │   │
//! │  │  │  overlap   │ │ resolve  │ │redeemable│ │ tax / deposit    │ │   │
//! │  │  └────────────┘ └──────────┘ └──────────┘ └──────────────────┘ │   │
//! │  │                   engine: BookingEngine<S: PricingStore>        │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO LOGGING • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ PricingStore                           │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                lodging-db (Storage Layer)                       │   │
//! │  │          SQLite queries, migrations, repositories               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Sites, stay dates, settings, basis-point percentages
//! - [`money`] - Money type with integer arithmetic
//! - [`rules`] - Pricing rules and rate resolution
//! - [`coupon`] - Coupons and redemption checks
//! - [`availability`] - Overlap checks against blocking bookings
//! - [`pricing`] - The price breakdown
//! - [`booking`] - Booking records, lifecycle and drafts
//! - [`engine`] - `BookingEngine` and the `PricingStore` seam
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use lodging_core::money::Money;
//! use lodging_core::types::Percent;
//!
//! // Three nights at $75
//! let subtotal = Money::from_dollars(75).times(3);
//!
//! // 9.25% tax, rounded half away from zero
//! let tax = subtotal.percentage(Percent::from_bps(925));
//! assert_eq!(tax.cents(), 2081);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod availability;
pub mod booking;
pub mod coupon;
pub mod engine;
pub mod error;
pub mod money;
pub mod pricing;
pub mod rules;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use booking::{Booking, BookingDraft, BookingRequest, BookingStatus, PaymentStatus};
pub use coupon::{Coupon, CouponDiscount};
pub use engine::{BookingEngine, PricingStore, Quote};
pub use error::{CoreError, CoreResult, PricingError, ValidationError};
pub use money::Money;
pub use pricing::PriceBreakdown;
pub use rules::{PricingRule, RuleCondition, RuleScope};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Scope value for a pricing rule that covers every site.
pub const ALL_SITES_SCOPE: &str = "all";

/// Deposit share used when no settings record exists (50.00%).
pub const DEFAULT_DEPOSIT_BPS: i32 = 5000;

/// Longest first or last name accepted on the booking form.
pub const MAX_GUEST_NAME_LENGTH: usize = 100;

/// Longest rig the pads can take, in feet.
pub const MAX_RV_LENGTH_FEET: u32 = 100;
