//! # Coupons
//!
//! Guest-supplied codes granting an extra discount on top of pricing rules.
//!
//! ## Redemption Checks
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Guest enters "welcome2025"                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  normalize → "WELCOME2025" → store lookup (active coupons only)         │
//! │       │                                                                 │
//! │       ├── not found / inactive           → None                         │
//! │       ├── now outside [from, until]      → None                         │
//! │       ├── used_count >= usage_limit      → None                         │
//! │       ├── nights < minimum_stay          → None                         │
//! │       │                                                                 │
//! │       └── OK → Some(coupon) → "Coupon WELCOME2025" in discount reason   │
//! │                                                                         │
//! │  Unusable coupons are never errors. used_count is never touched here.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{not_allowed, Percent};

/// How a coupon reduces the price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum CouponDiscount {
    /// Percentage of the subtotal (before rule discounts are taken off).
    Percentage(Percent),
    /// Flat amount off the stay.
    Fixed(Money),
}

impl CouponDiscount {
    /// The storage name of the discount type.
    pub const fn kind(&self) -> &'static str {
        match self {
            CouponDiscount::Percentage(_) => "percentage",
            CouponDiscount::Fixed(_) => "fixed",
        }
    }

    /// Amount taken off a stay with the given subtotal.
    pub fn amount_for(&self, subtotal: Money) -> Money {
        match self {
            CouponDiscount::Percentage(pct) => subtotal.percentage(*pct),
            CouponDiscount::Fixed(amount) => *amount,
        }
    }
}

/// The two discount types a coupon record may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CouponKind {
    Percentage,
    Fixed,
}

impl FromStr for CouponKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "percentage" => Ok(CouponKind::Percentage),
            "fixed" => Ok(CouponKind::Fixed),
            _ => Err(not_allowed("coupon type", &["percentage", "fixed"])),
        }
    }
}

/// A promotional code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub id: String,

    /// Upper-case, unique.
    pub code: String,

    pub description: String,

    pub discount: CouponDiscount,

    /// Inclusive.
    #[ts(as = "String")]
    pub valid_from: DateTime<Utc>,

    /// Inclusive.
    #[ts(as = "String")]
    pub valid_until: DateTime<Utc>,

    /// `None` = unlimited.
    pub usage_limit: Option<u32>,

    pub used_count: u32,

    /// Minimum nights required, `None` = any stay.
    pub minimum_stay: Option<u32>,

    pub active: bool,
}

impl Coupon {
    /// `now` lies within `[valid_from, valid_until]`.
    pub fn is_within_window(&self, now: DateTime<Utc>) -> bool {
        now >= self.valid_from && now <= self.valid_until
    }

    /// The usage cap, if any, has not been reached.
    pub fn has_remaining_uses(&self) -> bool {
        match self.usage_limit {
            Some(limit) => self.used_count < limit,
            None => true,
        }
    }

    pub fn meets_minimum_stay(&self, nights: u32) -> bool {
        match self.minimum_stay {
            Some(minimum) => nights >= minimum,
            None => true,
        }
    }

    /// All redemption checks at once.
    ///
    /// ## Example
    /// ```rust
    /// use chrono::{TimeZone, Utc};
    /// use lodging_core::coupon::{Coupon, CouponDiscount};
    /// use lodging_core::types::Percent;
    ///
    /// let coupon = Coupon {
    ///     id: "c1".into(),
    ///     code: "WELCOME2025".into(),
    ///     description: "Welcome discount".into(),
    ///     discount: CouponDiscount::Percentage(Percent::from_bps(1000)),
    ///     valid_from: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
    ///     valid_until: Utc.with_ymd_and_hms(2025, 12, 31, 0, 0, 0).unwrap(),
    ///     usage_limit: Some(100),
    ///     used_count: 0,
    ///     minimum_stay: Some(2),
    ///     active: true,
    /// };
    ///
    /// let now = Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap();
    /// assert!(coupon.is_redeemable(3, now));
    /// assert!(!coupon.is_redeemable(1, now));
    /// ```
    pub fn is_redeemable(&self, nights: u32, now: DateTime<Utc>) -> bool {
        self.active
            && self.is_within_window(now)
            && self.has_remaining_uses()
            && self.meets_minimum_stay(nights)
    }

    /// Text added to the breakdown's discount reason.
    pub fn reason(&self) -> String {
        format!("Coupon {}", self.code)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn welcome() -> Coupon {
        Coupon {
            id: "coupon-1".to_string(),
            code: "WELCOME2025".to_string(),
            description: "Welcome discount for new guests".to_string(),
            discount: CouponDiscount::Percentage(Percent::from_bps(1000)),
            valid_from: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            valid_until: Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 59).unwrap(),
            usage_limit: Some(100),
            used_count: 0,
            minimum_stay: Some(2),
            active: true,
        }
    }

    #[test]
    fn test_redeemable_inside_window() {
        assert!(welcome().is_redeemable(3, at(2025, 6, 1)));
    }

    #[test]
    fn test_window_is_inclusive() {
        let coupon = welcome();
        assert!(coupon.is_redeemable(3, coupon.valid_from));
        assert!(coupon.is_redeemable(3, coupon.valid_until));
        assert!(!coupon.is_redeemable(3, at(2024, 12, 31)));
        assert!(!coupon.is_redeemable(3, at(2026, 1, 1)));
    }

    #[test]
    fn test_exhausted_coupon_is_never_redeemable() {
        let mut coupon = welcome();
        coupon.used_count = 100;
        assert!(!coupon.is_redeemable(3, at(2025, 6, 1)));

        coupon.used_count = 150;
        assert!(!coupon.is_redeemable(3, at(2025, 6, 1)));

        coupon.used_count = 99;
        assert!(coupon.is_redeemable(3, at(2025, 6, 1)));
    }

    #[test]
    fn test_unlimited_coupon() {
        let mut coupon = welcome();
        coupon.usage_limit = None;
        coupon.used_count = 10_000;
        assert!(coupon.has_remaining_uses());
    }

    #[test]
    fn test_minimum_stay() {
        let coupon = welcome();
        assert!(!coupon.is_redeemable(1, at(2025, 6, 1)));
        assert!(coupon.is_redeemable(2, at(2025, 6, 1)));

        let mut any_stay = welcome();
        any_stay.minimum_stay = None;
        assert!(any_stay.is_redeemable(1, at(2025, 6, 1)));
    }

    #[test]
    fn test_inactive_coupon() {
        let mut coupon = welcome();
        coupon.active = false;
        assert!(!coupon.is_redeemable(3, at(2025, 6, 1)));
    }

    #[test]
    fn test_discount_amounts() {
        let subtotal = Money::from_cents(22500);

        let pct = CouponDiscount::Percentage(Percent::from_bps(1000));
        assert_eq!(pct.amount_for(subtotal).cents(), 2250);

        let fixed = CouponDiscount::Fixed(Money::from_dollars(25));
        assert_eq!(fixed.amount_for(subtotal).cents(), 2500);
        assert_eq!(fixed.kind(), "fixed");
    }

    #[test]
    fn test_reason_uses_stored_code() {
        assert_eq!(welcome().reason(), "Coupon WELCOME2025");
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("fixed".parse::<CouponKind>().unwrap(), CouponKind::Fixed);
        assert!("bogo".parse::<CouponKind>().is_err());
    }
}
