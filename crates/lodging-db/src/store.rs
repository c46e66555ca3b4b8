//! # PricingStore for SQLite
//!
//! Plugs [`Database`] into `lodging_core::BookingEngine`.
//!
//! ```rust,ignore
//! let db = Database::new(StoreConfig::from_env()?.db).await?;
//! let engine = BookingEngine::new(db.clone());
//!
//! let quote = engine.quote("site-1", check_in, check_out, Some("welcome2025")).await?;
//! if let Some(breakdown) = quote.breakdown {
//!     let draft = BookingDraft::new(&site, request, breakdown)?;
//!     db.bookings().create_if_available(&draft).await?;
//! }
//! ```

use lodging_core::{Booking, Coupon, PricingRule, PricingStore, Settings, Site};

use crate::error::DbError;
use crate::pool::Database;

impl PricingStore for Database {
    type Error = DbError;

    async fn get_site(&self, site_id: &str) -> Result<Option<Site>, DbError> {
        self.sites().get_by_id(site_id).await
    }

    async fn get_bookings_for_site(&self, site_id: &str) -> Result<Vec<Booking>, DbError> {
        self.bookings().list_blocking_for_site(site_id).await
    }

    async fn get_pricing_rules(&self, site_id: &str) -> Result<Vec<PricingRule>, DbError> {
        self.pricing_rules().list_for_site(site_id).await
    }

    async fn get_coupon_by_code(&self, code: &str) -> Result<Option<Coupon>, DbError> {
        self.coupons().get_active_by_code(code).await
    }

    async fn get_settings(&self) -> Result<Settings, DbError> {
        self.settings().get_or_default().await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
