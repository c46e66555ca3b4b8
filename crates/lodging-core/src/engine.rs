//! # Booking Engine
//!
//! Orchestrates availability, rule resolution, coupon checks and price
//! calculation over an injected [`PricingStore`].
//!
//! ## Quote Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  quote(site, check_in, check_out, coupon?)                             │
//! │       │                                                                 │
//! │       ├── StayDates::new            → InvalidDateRange (no storage)     │
//! │       │                                                                 │
//! │       ├── get_bookings_for_site     → is_available                      │
//! │       │        └── false → Quote { available: false, breakdown: None }  │
//! │       │                                                                 │
//! │       ├── get_site                  → SiteNotFound                      │
//! │       ├── get_pricing_rules         → resolve_rate                      │
//! │       ├── get_coupon_by_code        → is_redeemable (None if not)       │
//! │       ├── get_settings                                                  │
//! │       │                                                                 │
//! │       └── calculate_price           → Quote { available: true, .. }     │
//! │                                                                         │
//! │  Any store failure → PricingError::Storage(e), never "available".      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::availability::is_available;
use crate::booking::Booking;
use crate::coupon::Coupon;
use crate::error::{CoreError, PricingError};
use crate::pricing::{calculate_price, PriceBreakdown, PricingInputs};
use crate::rules::{resolve_rate, PricingRule};
use crate::types::{Settings, Site, StayDates};
use crate::validation::normalize_coupon_code;

// =============================================================================
// Storage Seam
// =============================================================================

/// Read access the engine needs from storage.
///
/// Implementations decide how to filter; the engine re-checks the parts that
/// matter for correctness (blocking statuses, rule scope, coupon validity).
#[allow(async_fn_in_trait)]
pub trait PricingStore {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn get_site(&self, site_id: &str) -> Result<Option<Site>, Self::Error>;

    /// Approved and confirmed bookings for the site.
    async fn get_bookings_for_site(&self, site_id: &str) -> Result<Vec<Booking>, Self::Error>;

    /// Active rules scoped to the site or to all sites, priority descending.
    async fn get_pricing_rules(&self, site_id: &str) -> Result<Vec<PricingRule>, Self::Error>;

    /// Active coupon with exactly this (upper-case) code.
    async fn get_coupon_by_code(&self, code: &str) -> Result<Option<Coupon>, Self::Error>;

    /// Falls back to [`Settings::default`] when nothing is stored.
    async fn get_settings(&self) -> Result<Settings, Self::Error>;
}

/// Result type for engine operations.
pub type EngineResult<T, S> = Result<T, PricingError<<S as PricingStore>::Error>>;

// =============================================================================
// Quote
// =============================================================================

/// Availability and price in one answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub available: bool,
    /// Absent when the dates are taken.
    pub breakdown: Option<PriceBreakdown>,
}

// =============================================================================
// Engine
// =============================================================================

/// Stateless pricing and availability service.
#[derive(Debug, Clone)]
pub struct BookingEngine<S> {
    store: S,
}

impl<S: PricingStore> BookingEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// True iff no approved or confirmed booking shares a night with the
    /// requested stay.
    pub async fn check_availability(
        &self,
        site_id: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> EngineResult<bool, S> {
        let stay = StayDates::new(check_in, check_out)?;
        self.is_stay_available(site_id, &stay).await
    }

    async fn is_stay_available(&self, site_id: &str, stay: &StayDates) -> EngineResult<bool, S> {
        let bookings = self
            .store
            .get_bookings_for_site(site_id)
            .await
            .map_err(PricingError::Storage)?;

        Ok(is_available(stay, &bookings))
    }

    /// Looks up a coupon and returns it only if it can be redeemed now.
    pub async fn validate_coupon(&self, code: &str, nights: u32) -> EngineResult<Option<Coupon>, S> {
        self.validate_coupon_at(code, nights, Utc::now()).await
    }

    /// [`validate_coupon`](Self::validate_coupon) with an explicit clock.
    pub async fn validate_coupon_at(
        &self,
        code: &str,
        nights: u32,
        now: DateTime<Utc>,
    ) -> EngineResult<Option<Coupon>, S> {
        let Some(code) = normalize_coupon_code(code) else {
            return Ok(None);
        };

        let coupon = self
            .store
            .get_coupon_by_code(&code)
            .await
            .map_err(PricingError::Storage)?;

        Ok(coupon.filter(|coupon| coupon.is_redeemable(nights, now)))
    }

    /// Prices a stay. Does not check availability.
    pub async fn calculate_booking_price(
        &self,
        site_id: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
        coupon_code: Option<&str>,
    ) -> EngineResult<PriceBreakdown, S> {
        self.calculate_booking_price_at(site_id, check_in, check_out, coupon_code, Utc::now())
            .await
    }

    /// [`calculate_booking_price`](Self::calculate_booking_price) with an
    /// explicit clock for coupon windows.
    pub async fn calculate_booking_price_at(
        &self,
        site_id: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
        coupon_code: Option<&str>,
        now: DateTime<Utc>,
    ) -> EngineResult<PriceBreakdown, S> {
        let stay = StayDates::new(check_in, check_out)?;
        self.price_stay(site_id, &stay, coupon_code, now).await
    }

    async fn price_stay(
        &self,
        site_id: &str,
        stay: &StayDates,
        coupon_code: Option<&str>,
        now: DateTime<Utc>,
    ) -> EngineResult<PriceBreakdown, S> {
        let nights = stay.nights();

        let site = self
            .store
            .get_site(site_id)
            .await
            .map_err(PricingError::Storage)?
            .ok_or_else(|| CoreError::SiteNotFound(site_id.to_string()))?;

        let rules = self
            .store
            .get_pricing_rules(&site.id)
            .await
            .map_err(PricingError::Storage)?;
        let rate = resolve_rate(site.base_price, &site.id, stay.check_in(), nights, &rules);

        let coupon = match coupon_code {
            Some(code) => self.validate_coupon_at(code, nights, now).await?,
            None => None,
        };

        let settings = self
            .store
            .get_settings()
            .await
            .map_err(PricingError::Storage)?;

        Ok(calculate_price(PricingInputs {
            nights,
            rate: &rate,
            coupon: coupon.as_ref(),
            settings: &settings,
        }))
    }

    /// Availability first; price only when the dates are free.
    pub async fn quote(
        &self,
        site_id: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
        coupon_code: Option<&str>,
    ) -> EngineResult<Quote, S> {
        self.quote_at(site_id, check_in, check_out, coupon_code, Utc::now())
            .await
    }

    pub async fn quote_at(
        &self,
        site_id: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
        coupon_code: Option<&str>,
        now: DateTime<Utc>,
    ) -> EngineResult<Quote, S> {
        let stay = StayDates::new(check_in, check_out)?;

        if !self.is_stay_available(site_id, &stay).await? {
            return Ok(Quote {
                available: false,
                breakdown: None,
            });
        }

        let breakdown = self.price_stay(site_id, &stay, coupon_code, now).await?;
        Ok(Quote {
            available: true,
            breakdown: Some(breakdown),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::tests::{booking_on, site};
    use crate::booking::BookingStatus;
    use crate::coupon::CouponDiscount;
    use crate::money::Money;
    use crate::rules::{RuleCondition, RuleScope};
    use crate::types::Percent;
    use chrono::TimeZone;
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory store that counts every call.
    #[derive(Default)]
    struct MemoryStore {
        sites: Vec<Site>,
        bookings: Vec<Booking>,
        rules: Vec<PricingRule>,
        coupons: Vec<Coupon>,
        settings: Option<Settings>,
        calls: AtomicUsize,
    }

    impl MemoryStore {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn touch(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl PricingStore for MemoryStore {
        type Error = io::Error;

        async fn get_site(&self, site_id: &str) -> Result<Option<Site>, io::Error> {
            self.touch();
            Ok(self.sites.iter().find(|s| s.id == site_id).cloned())
        }

        async fn get_bookings_for_site(&self, site_id: &str) -> Result<Vec<Booking>, io::Error> {
            self.touch();
            Ok(self
                .bookings
                .iter()
                .filter(|b| b.site_id == site_id && b.status.blocks_availability())
                .cloned()
                .collect())
        }

        async fn get_pricing_rules(&self, site_id: &str) -> Result<Vec<PricingRule>, io::Error> {
            self.touch();
            let mut rules: Vec<_> = self
                .rules
                .iter()
                .filter(|r| r.active && r.scope.covers(site_id))
                .cloned()
                .collect();
            rules.sort_by(|a, b| b.priority.cmp(&a.priority));
            Ok(rules)
        }

        async fn get_coupon_by_code(&self, code: &str) -> Result<Option<Coupon>, io::Error> {
            self.touch();
            Ok(self
                .coupons
                .iter()
                .find(|c| c.active && c.code == code)
                .cloned())
        }

        async fn get_settings(&self) -> Result<Settings, io::Error> {
            self.touch();
            Ok(self.settings.unwrap_or_default())
        }
    }

    /// Every call fails.
    struct BrokenStore;

    impl PricingStore for BrokenStore {
        type Error = io::Error;

        async fn get_site(&self, _: &str) -> Result<Option<Site>, io::Error> {
            Err(io::Error::new(io::ErrorKind::ConnectionRefused, "down"))
        }

        async fn get_bookings_for_site(&self, _: &str) -> Result<Vec<Booking>, io::Error> {
            Err(io::Error::new(io::ErrorKind::ConnectionRefused, "down"))
        }

        async fn get_pricing_rules(&self, _: &str) -> Result<Vec<PricingRule>, io::Error> {
            Err(io::Error::new(io::ErrorKind::ConnectionRefused, "down"))
        }

        async fn get_coupon_by_code(&self, _: &str) -> Result<Option<Coupon>, io::Error> {
            Err(io::Error::new(io::ErrorKind::ConnectionRefused, "down"))
        }

        async fn get_settings(&self) -> Result<Settings, io::Error> {
            Err(io::Error::new(io::ErrorKind::ConnectionRefused, "down"))
        }
    }

    fn june(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    fn may_first() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap()
    }

    fn tennessee() -> Settings {
        Settings {
            tax_rate: Percent::from_bps(925),
            deposit_percentage: Percent::from_bps(5000),
        }
    }

    fn welcome(used_count: u32) -> Coupon {
        Coupon {
            id: "coupon-1".to_string(),
            code: "WELCOME2025".to_string(),
            description: "Welcome discount".to_string(),
            discount: CouponDiscount::Percentage(Percent::from_bps(1000)),
            valid_from: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            valid_until: Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 59).unwrap(),
            usage_limit: Some(100),
            used_count,
            minimum_stay: Some(2),
            active: true,
        }
    }

    fn rule(name: &str, condition: RuleCondition, bps: i32, priority: i32) -> PricingRule {
        PricingRule {
            id: format!("rule-{priority}"),
            name: name.to_string(),
            scope: RuleScope::AllSites,
            condition,
            discount: Some(Percent::from_bps(bps)),
            price_override: None,
            priority,
            active: true,
        }
    }

    fn store() -> MemoryStore {
        MemoryStore {
            sites: vec![site()],
            coupons: vec![welcome(0)],
            settings: Some(tennessee()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_three_night_breakdown() {
        let engine = BookingEngine::new(store());

        let b = engine
            .calculate_booking_price_at("site-1", june(1), june(4), None, may_first())
            .await
            .unwrap();

        assert_eq!(b.subtotal.cents(), 22500);
        assert_eq!(b.discount.cents(), 0);
        assert_eq!(b.tax.cents(), 2081);
        assert_eq!(b.total.cents(), 24581);
        assert_eq!(b.deposit_amount.cents(), 12291);
        assert_eq!(b.remaining_balance.cents(), 12290);
    }

    #[tokio::test]
    async fn test_breakdown_with_welcome_coupon() {
        let engine = BookingEngine::new(store());

        let b = engine
            .calculate_booking_price_at("site-1", june(1), june(4), Some("welcome2025"), may_first())
            .await
            .unwrap();

        assert_eq!(b.discount.cents(), 2250);
        assert_eq!(b.tax.cents(), 1873);
        assert_eq!(b.total.cents(), 22123);
        assert_eq!(b.discount_reason.as_deref(), Some("Coupon WELCOME2025"));
    }

    #[tokio::test]
    async fn test_week_with_weekend_and_length_rules() {
        let mut store = store();
        store.settings = None;
        store.rules = vec![
            rule(
                "Weekend Premium",
                RuleCondition::DayOfWeek {
                    days_of_week: vec![5, 6],
                },
                -1000,
                5,
            ),
            rule(
                "Weekly Stay Discount",
                RuleCondition::LengthOfStay { minimum_nights: 7 },
                1500,
                3,
            ),
        ];
        let engine = BookingEngine::new(store);

        // June 6 2025 is a Friday.
        let b = engine
            .calculate_booking_price_at("site-1", june(6), june(13), None, may_first())
            .await
            .unwrap();

        assert_eq!(b.subtotal.cents(), 52500);
        assert_eq!(b.discount.cents(), 2625);
        assert_eq!(
            b.discount_reason.as_deref(),
            Some("Weekend Premium, Weekly Stay Discount")
        );
        // No settings stored: no tax, half down.
        assert_eq!(b.tax, Money::zero());
        assert_eq!(b.deposit_amount.cents(), 24938);
        assert_eq!(b.deposit_amount + b.remaining_balance, b.total);
    }

    #[tokio::test]
    async fn test_unknown_site() {
        let engine = BookingEngine::new(store());

        let err = engine
            .calculate_booking_price("site-404", june(1), june(4), None)
            .await
            .unwrap_err();

        assert!(matches!(err, PricingError::Core(CoreError::SiteNotFound(id)) if id == "site-404"));
    }

    #[tokio::test]
    async fn test_invalid_range_checked_before_storage() {
        let engine = BookingEngine::new(BrokenStore);

        let err = engine
            .calculate_booking_price("site-1", june(4), june(4), None)
            .await
            .unwrap_err();
        assert!(matches!(err, PricingError::Core(CoreError::InvalidDateRange { .. })));

        let err = engine
            .check_availability("site-1", june(5), june(4))
            .await
            .unwrap_err();
        assert!(matches!(err, PricingError::Core(CoreError::InvalidDateRange { .. })));
    }

    #[tokio::test]
    async fn test_storage_errors_propagate() {
        let engine = BookingEngine::new(BrokenStore);

        let err = engine
            .check_availability("site-1", june(1), june(4))
            .await
            .unwrap_err();
        assert_eq!(
            err.as_storage().map(|e| e.kind()),
            Some(io::ErrorKind::ConnectionRefused)
        );

        let err = engine
            .calculate_booking_price("site-1", june(1), june(4), None)
            .await
            .unwrap_err();
        assert!(matches!(err, PricingError::Storage(_)));
    }

    #[tokio::test]
    async fn test_availability_ignores_non_blocking() {
        let mut store = store();
        store.bookings = vec![
            booking_on(june(10), june(13), BookingStatus::Pending),
            booking_on(june(10), june(13), BookingStatus::Cancelled),
            booking_on(june(1), june(5), BookingStatus::Confirmed),
        ];
        let engine = BookingEngine::new(store);

        assert!(engine.check_availability("site-1", june(10), june(13)).await.unwrap());
        assert!(engine.check_availability("site-1", june(5), june(8)).await.unwrap());
        assert!(!engine.check_availability("site-1", june(4), june(6)).await.unwrap());
    }

    #[tokio::test]
    async fn test_coupon_validation() {
        let mut store = store();
        store.coupons = vec![welcome(100)];
        let engine = BookingEngine::new(store);

        let used_up = engine
            .validate_coupon_at("WELCOME2025", 3, may_first())
            .await
            .unwrap();
        assert!(used_up.is_none());

        let engine = BookingEngine::new(self::store());
        assert!(engine
            .validate_coupon_at("welcome2025", 3, may_first())
            .await
            .unwrap()
            .is_some());
        assert!(engine
            .validate_coupon_at("welcome2025", 1, may_first())
            .await
            .unwrap()
            .is_none());
        assert!(engine
            .validate_coupon_at("NOPE", 3, may_first())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_blank_coupon_skips_lookup() {
        let engine = BookingEngine::new(store());

        assert!(engine.validate_coupon("   ", 3).await.unwrap().is_none());
        assert_eq!(engine.store().calls(), 0);
    }

    #[tokio::test]
    async fn test_exhausted_coupon_not_applied_to_price() {
        let mut store = store();
        store.coupons = vec![welcome(100)];
        let engine = BookingEngine::new(store);

        let b = engine
            .calculate_booking_price_at("site-1", june(1), june(4), Some("WELCOME2025"), may_first())
            .await
            .unwrap();

        assert_eq!(b.discount, Money::zero());
        assert_eq!(b.discount_reason, None);
    }

    #[tokio::test]
    async fn test_quote() {
        let mut store = store();
        store.bookings = vec![booking_on(june(1), june(4), BookingStatus::Approved)];
        let engine = BookingEngine::new(store);

        let taken = engine
            .quote_at("site-1", june(2), june(5), None, may_first())
            .await
            .unwrap();
        assert_eq!(
            taken,
            Quote {
                available: false,
                breakdown: None
            }
        );

        let free = engine
            .quote_at("site-1", june(4), june(7), None, may_first())
            .await
            .unwrap();
        assert!(free.available);
        assert_eq!(free.breakdown.map(|b| b.total.cents()), Some(24581));
    }

    #[tokio::test]
    async fn test_same_inputs_same_breakdown() {
        let engine = BookingEngine::new(store());

        let first = engine
            .calculate_booking_price_at("site-1", june(1), june(4), Some("WELCOME2025"), may_first())
            .await
            .unwrap();
        let second = engine
            .calculate_booking_price_at("site-1", june(1), june(4), Some("WELCOME2025"), may_first())
            .await
            .unwrap();

        assert_eq!(first, second);
    }
}
