//! # Domain Types
//!
//! Core domain types shared by every pricing component.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Site       │   │    StayDates    │   │    Settings     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  check_in       │   │  tax_rate       │       │
//! │  │  site_number    │   │  check_out (ex) │   │  deposit        │       │
//! │  │  base_price     │   │  nights()       │   └─────────────────┘       │
//! │  │  max_occupancy  │   └─────────────────┘                              │
//! │  │  status         │                                                    │
//! │  └─────────────────┘   ┌─────────────────┐                              │
//! │                        │     Percent     │                              │
//! │                        │  ─────────────  │                              │
//! │                        │  bps (i32)      │                              │
//! │                        │  925 = 9.25%    │                              │
//! │                        │  -1000 = +10%   │                              │
//! │                        │   (surcharge)   │                              │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Bookings live in [`crate::booking`], rules in [`crate::rules`], coupons
//! in [`crate::coupon`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::DEFAULT_DEPOSIT_BPS;

// =============================================================================
// Percent
// =============================================================================

/// A percentage represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 925 bps = 9.25% (Tennessee sales tax)
///
/// Signed, because pricing rules use a negative discount to express a price
/// increase: -1000 bps on a rule means "+10%".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Percent(i32);

impl Percent {
    /// Creates a percentage from basis points.
    #[inline]
    pub const fn from_bps(bps: i32) -> Self {
        Percent(bps)
    }

    /// Creates a percentage from a decimal percent (for convenience).
    ///
    /// ## Example
    /// ```rust
    /// use lodging_core::types::Percent;
    ///
    /// assert_eq!(Percent::from_percentage(9.25).bps(), 925);
    /// assert_eq!(Percent::from_percentage(-10.0).bps(), -1000);
    /// ```
    pub fn from_percentage(pct: f64) -> Self {
        Percent((pct * 100.0).round() as i32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> i32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero percent.
    #[inline]
    pub const fn zero() -> Self {
        Percent(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }
}

impl Default for Percent {
    fn default() -> Self {
        Percent::zero()
    }
}

impl Add for Percent {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Percent(self.0 + other.0)
    }
}

impl AddAssign for Percent {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percentage())
    }
}

// =============================================================================
// Stay Dates
// =============================================================================

/// A half-open stay `[check_in, check_out)`.
///
/// A guest checking out on day X frees the site for a guest checking in on
/// day X. Construction guarantees at least one night.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StayDates {
    #[ts(as = "String")]
    check_in: NaiveDate,
    #[ts(as = "String")]
    check_out: NaiveDate,
}

impl StayDates {
    /// Creates a stay, rejecting ranges that do not cover at least one night.
    ///
    /// ## Example
    /// ```rust
    /// use chrono::NaiveDate;
    /// use lodging_core::types::StayDates;
    ///
    /// let d = |day| NaiveDate::from_ymd_opt(2025, 6, day).unwrap();
    /// assert_eq!(StayDates::new(d(1), d(4)).unwrap().nights(), 3);
    /// assert!(StayDates::new(d(4), d(4)).is_err());
    /// ```
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> CoreResult<Self> {
        if check_out <= check_in {
            return Err(CoreError::InvalidDateRange {
                check_in,
                check_out,
            });
        }

        Ok(StayDates {
            check_in,
            check_out,
        })
    }

    #[inline]
    pub fn check_in(&self) -> NaiveDate {
        self.check_in
    }

    #[inline]
    pub fn check_out(&self) -> NaiveDate {
        self.check_out
    }

    /// Number of nights in the stay (always >= 1).
    pub fn nights(&self) -> u32 {
        let days = (self.check_out - self.check_in).num_days();
        u32::try_from(days).unwrap_or(u32::MAX)
    }

    /// Half-open overlap test: `a_start < b_end && a_end > b_start`.
    #[inline]
    pub fn overlaps(&self, other_check_in: NaiveDate, other_check_out: NaiveDate) -> bool {
        self.check_in < other_check_out && self.check_out > other_check_in
    }
}

// =============================================================================
// Site
// =============================================================================

/// What kind of unit a site is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SiteKind {
    /// An RV pad.
    Rv,
    /// The short-term rental house.
    Airbnb,
}

impl SiteKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SiteKind::Rv => "rv",
            SiteKind::Airbnb => "airbnb",
        }
    }
}

impl FromStr for SiteKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rv" => Ok(SiteKind::Rv),
            "airbnb" => Ok(SiteKind::Airbnb),
            _ => Err(not_allowed("site kind", &["rv", "airbnb"])),
        }
    }
}

/// Whether a site is currently offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SiteStatus {
    Active,
    Inactive,
    Maintenance,
}

impl SiteStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SiteStatus::Active => "active",
            SiteStatus::Inactive => "inactive",
            SiteStatus::Maintenance => "maintenance",
        }
    }
}

impl Default for SiteStatus {
    fn default() -> Self {
        SiteStatus::Active
    }
}

impl FromStr for SiteStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(SiteStatus::Active),
            "inactive" => Ok(SiteStatus::Inactive),
            "maintenance" => Ok(SiteStatus::Maintenance),
            _ => Err(not_allowed(
                "site status",
                &["active", "inactive", "maintenance"],
            )),
        }
    }
}

/// A bookable RV pad or rental unit.
///
/// Owned by an administrator; never modified while a price is computed.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub id: String,

    /// Number painted on the pad; used for ordering listings.
    pub site_number: i64,

    pub name: String,

    pub kind: SiteKind,

    pub description: String,

    /// Nightly price before any pricing rule.
    pub base_price: Money,

    pub max_occupancy: u32,

    pub status: SiteStatus,

    pub amenities: Vec<String>,

    pub features: Vec<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Site {
    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == SiteStatus::Active
    }
}

// =============================================================================
// Settings
// =============================================================================

/// The pricing-relevant slice of the business settings singleton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Sales tax applied after discounts.
    pub tax_rate: Percent,

    /// Share of the total collected at booking time.
    pub deposit_percentage: Percent,
}

/// No settings record: no tax, half down.
impl Default for Settings {
    fn default() -> Self {
        Settings {
            tax_rate: Percent::zero(),
            deposit_percentage: Percent::from_bps(DEFAULT_DEPOSIT_BPS),
        }
    }
}

pub(crate) fn not_allowed(field: &str, allowed: &[&str]) -> ValidationError {
    ValidationError::NotAllowed {
        field: field.to_string(),
        allowed: allowed.iter().map(|s| s.to_string()).collect(),
    }
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
    fn test_percent_from_percentage() {
        assert_eq!(Percent::from_percentage(9.25).bps(), 925);
        assert_eq!(Percent::from_percentage(-20.0).bps(), -2000);
        assert!((Percent::from_bps(925).percentage() - 9.25).abs() < 0.001);
    }

    #[test]
    fn test_percent_accumulates() {
        let mut total = Percent::zero();
        total += Percent::from_bps(1500);
        total += Percent::from_bps(-1000);
        assert_eq!(total, Percent::from_bps(500));
    }

    #[test]
    fn test_stay_dates_nights() {
        let stay = StayDates::new(date(2025, 6, 1), date(2025, 6, 8)).unwrap();
        assert_eq!(stay.nights(), 7);

        // Across a month boundary
        let stay = StayDates::new(date(2025, 1, 30), date(2025, 2, 2)).unwrap();
        assert_eq!(stay.nights(), 3);
    }

    #[test]
    fn test_stay_dates_rejects_non_positive_range() {
        assert!(matches!(
            StayDates::new(date(2025, 6, 5), date(2025, 6, 5)),
            Err(CoreError::InvalidDateRange { .. })
        ));
        assert!(StayDates::new(date(2025, 6, 5), date(2025, 6, 1)).is_err());
    }

    #[test]
    fn test_stay_overlap_is_half_open() {
        let stay = StayDates::new(date(2025, 6, 10), date(2025, 6, 13)).unwrap();

        // Existing stay checks out the day we check in
        assert!(!stay.overlaps(date(2025, 6, 7), date(2025, 6, 10)));
        // Existing stay checks in the day we check out
        assert!(!stay.overlaps(date(2025, 6, 13), date(2025, 6, 15)));
        // One shared night
        assert!(stay.overlaps(date(2025, 6, 12), date(2025, 6, 14)));
        // Fully contains us
        assert!(stay.overlaps(date(2025, 6, 1), date(2025, 6, 30)));
    }

    #[test]
    fn test_status_round_trip() {
        for status in [SiteStatus::Active, SiteStatus::Inactive, SiteStatus::Maintenance] {
            assert_eq!(status.as_str().parse::<SiteStatus>().unwrap(), status);
        }
        assert!("closed".parse::<SiteStatus>().is_err());
        assert_eq!("airbnb".parse::<SiteKind>().unwrap(), SiteKind::Airbnb);
    }

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert!(settings.tax_rate.is_zero());
        assert_eq!(settings.deposit_percentage.bps(), 5000);
    }
}
