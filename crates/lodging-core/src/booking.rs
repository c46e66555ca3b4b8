//! # Bookings
//!
//! Reservation records, their lifecycle, and the draft a caller builds once
//! a price has been computed.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   pending ──► approved ──► confirmed ──► completed                      │
//! │      │            │             │                                       │
//! │      │            ├──► rejected │                                       │
//! │      ├──► rejected│             │                                       │
//! │      │            │             │                                       │
//! │      └────────────┴─────────────┴──► cancelled                          │
//! │                                                                         │
//! │   Blocking availability: approved, confirmed                            │
//! │   Terminal: rejected, cancelled, completed                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Payment status moves independently:
//! `pending → deposit_paid → fully_paid`, with `refunded` reachable from any
//! paid state and a failed payment returning to `pending`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::pricing::PriceBreakdown;
use crate::types::{not_allowed, Site, StayDates};
use crate::validation::{
    normalize_coupon_code, validate_email, validate_guest_count, validate_guest_name,
    validate_phone, validate_rv_length,
};

// =============================================================================
// Status Enums
// =============================================================================

/// Where a booking is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Approved,
    Rejected,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Approved => "approved",
            BookingStatus::Rejected => "rejected",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }

    /// Statuses that hold the site's nights against other guests.
    pub const BLOCKING: [BookingStatus; 2] = [BookingStatus::Approved, BookingStatus::Confirmed];

    #[inline]
    pub const fn blocks_availability(&self) -> bool {
        matches!(self, BookingStatus::Approved | BookingStatus::Confirmed)
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingStatus::Rejected | BookingStatus::Cancelled | BookingStatus::Completed
        )
    }

    /// Whether staff or the payment flow may move a booking from `self` to
    /// `next`.
    pub const fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;

        matches!(
            (*self, next),
            (Pending, Approved)
                | (Pending, Rejected)
                | (Pending, Cancelled)
                | (Approved, Confirmed)
                | (Approved, Rejected)
                | (Approved, Cancelled)
                | (Confirmed, Cancelled)
                | (Confirmed, Completed)
        )
    }

    /// [`can_transition_to`](Self::can_transition_to) as a `CoreResult`.
    pub fn ensure_transition(&self, next: BookingStatus) -> CoreResult<()> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(CoreError::InvalidStatusTransition {
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "approved" => Ok(BookingStatus::Approved),
            "rejected" => Ok(BookingStatus::Rejected),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "completed" => Ok(BookingStatus::Completed),
            _ => Err(not_allowed(
                "booking status",
                &[
                    "pending",
                    "approved",
                    "rejected",
                    "confirmed",
                    "cancelled",
                    "completed",
                ],
            )),
        }
    }
}

/// Money collected so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    DepositPaid,
    FullyPaid,
    Refunded,
}

impl PaymentStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::DepositPaid => "deposit_paid",
            PaymentStatus::FullyPaid => "fully_paid",
            PaymentStatus::Refunded => "refunded",
        }
    }

    /// True once at least the deposit has been collected.
    pub const fn deposit_collected(&self) -> bool {
        matches!(self, PaymentStatus::DepositPaid | PaymentStatus::FullyPaid)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "deposit_paid" => Ok(PaymentStatus::DepositPaid),
            "fully_paid" => Ok(PaymentStatus::FullyPaid),
            "refunded" => Ok(PaymentStatus::Refunded),
            _ => Err(not_allowed(
                "payment status",
                &["pending", "deposit_paid", "fully_paid", "refunded"],
            )),
        }
    }
}

// =============================================================================
// Guest & Vehicle
// =============================================================================

/// Guest contact details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct GuestInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
}

impl GuestInfo {
    pub fn validate(&self) -> CoreResult<()> {
        validate_guest_name("first name", &self.first_name)?;
        validate_guest_name("last name", &self.last_name)?;
        validate_email(&self.email)?;
        validate_phone(&self.phone)?;
        Ok(())
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }
}

/// The guest's rig, for RV sites.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RvDetails {
    pub make: Option<String>,
    pub model: Option<String>,
    /// Feet.
    pub length: Option<u32>,
    pub license_plate: Option<String>,
}

impl RvDetails {
    pub fn validate(&self) -> CoreResult<()> {
        if let Some(length) = self.length {
            validate_rv_length(length)?;
        }
        Ok(())
    }
}

// =============================================================================
// Booking
// =============================================================================

/// The price snapshot stored with a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BookingPricing {
    #[serde(flatten)]
    pub breakdown: PriceBreakdown,
    pub deposit_paid: bool,
}

/// A stored reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub site_id: String,
    /// Site name at booking time.
    pub site_name: String,
    pub guest: GuestInfo,
    pub rv_details: Option<RvDetails>,
    #[ts(as = "String")]
    pub check_in: NaiveDate,
    /// Exclusive.
    #[ts(as = "String")]
    pub check_out: NaiveDate,
    pub nights: u32,
    pub guests: u32,
    pub pricing: BookingPricing,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    /// Payment provider's reference for the deposit.
    pub payment_ref: Option<String>,
    pub coupon_code: Option<String>,
    pub special_requests: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub approved_at: Option<DateTime<Utc>>,
    pub approved_by: Option<String>,
}

impl Booking {
    /// The booked nights as a [`StayDates`].
    pub fn stay(&self) -> CoreResult<StayDates> {
        StayDates::new(self.check_in, self.check_out)
    }
}

// =============================================================================
// Booking Request & Draft
// =============================================================================

/// What the guest submitted on the booking form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub site_id: String,
    pub stay: StayDates,
    pub guests: u32,
    pub guest: GuestInfo,
    pub rv_details: Option<RvDetails>,
    pub coupon_code: Option<String>,
    pub special_requests: Option<String>,
}

/// A validated booking ready to be written.
///
/// Always starts `pending` / `pending`; the storage layer assigns the id
/// and timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDraft {
    pub site_id: String,
    pub site_name: String,
    pub guest: GuestInfo,
    pub rv_details: Option<RvDetails>,
    pub stay: StayDates,
    pub guests: u32,
    pub pricing: BookingPricing,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub coupon_code: Option<String>,
    pub special_requests: Option<String>,
}

impl BookingDraft {
    /// Validates `request` against `site` and snapshots `breakdown`.
    ///
    /// ## Errors
    /// - `SiteNotFound` if the request names a different site
    /// - `GuestCountExceeded` past the site's max occupancy
    /// - `Validation` for bad contact details, RV length, or a breakdown
    ///   computed for a different number of nights
    pub fn new(site: &Site, request: BookingRequest, breakdown: PriceBreakdown) -> CoreResult<Self> {
        if request.site_id != site.id {
            return Err(CoreError::SiteNotFound(request.site_id));
        }

        request.guest.validate()?;
        validate_guest_count(request.guests)?;
        if request.guests > site.max_occupancy {
            return Err(CoreError::GuestCountExceeded {
                requested: request.guests,
                max: site.max_occupancy,
            });
        }

        if let Some(rv) = &request.rv_details {
            rv.validate()?;
        }

        if breakdown.nights != request.stay.nights() {
            return Err(ValidationError::InvalidFormat {
                field: "pricing".to_string(),
                reason: format!(
                    "priced for {} nights but the stay has {}",
                    breakdown.nights,
                    request.stay.nights()
                ),
            }
            .into());
        }

        let special_requests = request
            .special_requests
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(BookingDraft {
            site_id: site.id.clone(),
            site_name: site.name.clone(),
            guest: request.guest,
            rv_details: request.rv_details,
            stay: request.stay,
            guests: request.guests,
            pricing: BookingPricing {
                breakdown,
                deposit_paid: false,
            },
            status: BookingStatus::Pending,
            payment_status: PaymentStatus::Pending,
            coupon_code: request.coupon_code.as_deref().and_then(normalize_coupon_code),
            special_requests,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::{SiteKind, SiteStatus};

    pub(crate) fn breakdown(nights: u32) -> PriceBreakdown {
        PriceBreakdown {
            nights,
            price_per_night: Money::from_dollars(75),
            subtotal: Money::from_dollars(75).times(nights),
            discount: Money::zero(),
            discount_reason: None,
            tax: Money::zero(),
            total: Money::from_dollars(75).times(nights),
            deposit_amount: Money::zero(),
            remaining_balance: Money::from_dollars(75).times(nights),
        }
    }

    pub(crate) fn guest() -> GuestInfo {
        GuestInfo {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: "jane@example.com".to_string(),
            phone: "865-555-0142".to_string(),
            address: None,
            city: None,
            state: None,
            zip_code: None,
        }
    }

    /// A booking on site-1 with only the fields availability cares about.
    pub(crate) fn booking_on(check_in: NaiveDate, check_out: NaiveDate, status: BookingStatus) -> Booking {
        let nights = u32::try_from((check_out - check_in).num_days()).unwrap();
        Booking {
            id: format!("booking-{check_in}-{}", status.as_str()),
            site_id: "site-1".to_string(),
            site_name: "Riverside Retreat".to_string(),
            guest: guest(),
            rv_details: None,
            check_in,
            check_out,
            nights,
            guests: 2,
            pricing: BookingPricing {
                breakdown: breakdown(nights),
                deposit_paid: false,
            },
            status,
            payment_status: PaymentStatus::Pending,
            payment_ref: None,
            coupon_code: None,
            special_requests: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            approved_at: None,
            approved_by: None,
        }
    }

    pub(crate) fn site() -> Site {
        Site {
            id: "site-1".to_string(),
            site_number: 1,
            name: "Riverside Retreat".to_string(),
            kind: SiteKind::Rv,
            description: String::new(),
            base_price: Money::from_dollars(75),
            max_occupancy: 6,
            status: SiteStatus::Active,
            amenities: vec![],
            features: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn request(guests: u32) -> BookingRequest {
        let d = |day| NaiveDate::from_ymd_opt(2025, 6, day).unwrap();
        BookingRequest {
            site_id: "site-1".to_string(),
            stay: StayDates::new(d(1), d(4)).unwrap(),
            guests,
            guest: guest(),
            rv_details: Some(RvDetails {
                make: Some("Winnebago".to_string()),
                model: Some("View".to_string()),
                length: Some(25),
                license_plate: None,
            }),
            coupon_code: Some(" welcome2025 ".to_string()),
            special_requests: Some("   ".to_string()),
        }
    }

    #[test]
    fn test_draft_starts_pending() {
        let draft = BookingDraft::new(&site(), request(4), breakdown(3)).unwrap();

        assert_eq!(draft.status, BookingStatus::Pending);
        assert_eq!(draft.payment_status, PaymentStatus::Pending);
        assert!(!draft.pricing.deposit_paid);
        assert_eq!(draft.site_name, "Riverside Retreat");
        assert_eq!(draft.coupon_code.as_deref(), Some("WELCOME2025"));
        assert_eq!(draft.special_requests, None);
    }

    #[test]
    fn test_draft_rejects_too_many_guests() {
        let err = BookingDraft::new(&site(), request(7), breakdown(3)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::GuestCountExceeded {
                requested: 7,
                max: 6
            }
        ));
    }

    #[test]
    fn test_draft_rejects_bad_contact() {
        let mut req = request(2);
        req.guest.email = "not-an-email".to_string();
        let err = BookingDraft::new(&site(), req, breakdown(3)).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_draft_rejects_mismatched_breakdown() {
        let err = BookingDraft::new(&site(), request(2), breakdown(5)).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_draft_rejects_other_site() {
        let mut req = request(2);
        req.site_id = "site-2".to_string();
        let err = BookingDraft::new(&site(), req, breakdown(3)).unwrap_err();
        assert!(matches!(err, CoreError::SiteNotFound(id) if id == "site-2"));
    }

    #[test]
    fn test_status_transitions() {
        use BookingStatus::*;

        assert!(Pending.can_transition_to(Approved));
        assert!(Approved.can_transition_to(Confirmed));
        assert!(Confirmed.can_transition_to(Completed));
        assert!(Confirmed.can_transition_to(Cancelled));

        assert!(!Cancelled.can_transition_to(Approved));
        assert!(!Completed.can_transition_to(Pending));
        assert!(!Pending.can_transition_to(Pending));
        assert!(!Rejected.can_transition_to(Confirmed));

        let err = Cancelled.ensure_transition(Confirmed).unwrap_err();
        assert_eq!(err.to_string(), "Booking cannot move from cancelled to confirmed");
    }

    #[test]
    fn test_terminal_statuses_have_no_exits() {
        let all = [
            BookingStatus::Pending,
            BookingStatus::Approved,
            BookingStatus::Rejected,
            BookingStatus::Confirmed,
            BookingStatus::Cancelled,
            BookingStatus::Completed,
        ];

        for from in all.iter().filter(|s| s.is_terminal()) {
            assert!(all.iter().all(|to| !from.can_transition_to(*to)));
        }
    }

    #[test]
    fn test_status_round_trip_strings() {
        for status in BookingStatus::BLOCKING {
            assert!(status.blocks_availability());
            assert_eq!(status.as_str().parse::<BookingStatus>().unwrap(), status);
        }
        assert_eq!(
            "deposit_paid".parse::<PaymentStatus>().unwrap(),
            PaymentStatus::DepositPaid
        );
        assert!("paid".parse::<PaymentStatus>().is_err());
    }

    #[test]
    fn test_pricing_snapshot_flattens() {
        let pricing = BookingPricing {
            breakdown: breakdown(2),
            deposit_paid: true,
        };
        let json = serde_json::to_value(&pricing).unwrap();

        assert_eq!(json["subtotal"], 15000);
        assert_eq!(json["depositPaid"], true);
    }
}
