//! # lodging-db: Storage Layer for the Lodging Engine
//!
//! SQLite storage for sites, bookings, pricing rules, coupons and settings,
//! plus the [`PricingStore`](lodging_core::PricingStore) implementation the
//! booking engine reads through.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Reservation Data Flow                              │
//! │                                                                         │
//! │  Checkout handler (quote, book, approve)                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   lodging-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  (booking.rs) │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │    │ SiteRepo      │    │ 001_initial_ │  │   │
//! │  │   │ PricingStore  │◄───│ BookingRepo   │    │   schema.sql │  │   │
//! │  │   │ (store.rs)    │    │ CouponRepo    │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │                  $LODGING_DATABASE_PATH                         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Environment-driven storage configuration
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`records`] - Row structs and their conversion into domain types
//! - [`repository`] - Repository implementations (site, booking, etc.)
//! - [`store`] - `PricingStore` for [`Database`]
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lodging_core::BookingEngine;
//! use lodging_db::{Database, StoreConfig};
//!
//! let db = Database::new(StoreConfig::from_env()?.db).await?;
//! let engine = BookingEngine::new(db.clone());
//!
//! let price = engine
//!     .calculate_booking_price("site-1", check_in, check_out, Some("WELCOME2025"))
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod records;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, StoreConfig};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::booking::BookingRepository;
pub use repository::coupon::CouponRepository;
pub use repository::pricing_rule::PricingRuleRepository;
pub use repository::settings::SettingsRepository;
pub use repository::site::SiteRepository;

// =============================================================================
// Logging
// =============================================================================

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,lodging=debug,sqlx=warn";

/// Installs a `tracing` subscriber that honors `RUST_LOG`.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
