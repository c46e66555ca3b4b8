//! # Repository Module
//!
//! Database repository implementations for the reservation engine.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Layout                                    │
//! │                                                                         │
//! │  Caller                                                                 │
//! │       │                                                                 │
//! │       │  db.bookings().create_if_available(&draft)                      │
//! │       ▼                                                                 │
//! │  BookingRepository                                                      │
//! │  ├── SQL lives here, nowhere else                                       │
//! │  └── rows come back as *Record, parsed by records.rs                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! │                                                                         │
//! │  Each repository holds a cloned SqlitePool handle; constructing one    │
//! │  is cheap, so Database hands out a fresh one per call.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`SiteRepository`](site::SiteRepository) - Sites
//! - [`BookingRepository`](booking::BookingRepository) - Bookings and write guards
//! - [`PricingRuleRepository`](pricing_rule::PricingRuleRepository) - Pricing rules
//! - [`CouponRepository`](coupon::CouponRepository) - Coupons and usage counts
//! - [`SettingsRepository`](settings::SettingsRepository) - Tax and deposit settings

pub mod booking;
pub mod coupon;
pub mod pricing_rule;
pub mod settings;
pub mod site;

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{NaiveDate, Utc};
    use lodging_core::booking::{BookingPricing, GuestInfo, RvDetails};
    use lodging_core::pricing::PriceBreakdown;
    use lodging_core::{
        BookingDraft, BookingStatus, Money, PaymentStatus, Site, SiteKind, SiteStatus, StayDates,
    };

    use crate::{Database, DbConfig};

    pub async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    pub fn june(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    pub fn sample_site(id: &str, site_number: i64, base_price_cents: i64) -> Site {
        Site {
            id: id.to_string(),
            site_number,
            name: format!("Site {site_number}"),
            kind: SiteKind::Rv,
            description: "Level gravel pad".to_string(),
            base_price: Money::from_cents(base_price_cents),
            max_occupancy: 6,
            status: SiteStatus::Active,
            amenities: vec!["Water".to_string(), "50A Power".to_string()],
            features: vec!["Riverfront".to_string()],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// A pending draft priced at the site's base rate with no tax.
    pub fn sample_draft(site: &Site, check_in: NaiveDate, check_out: NaiveDate) -> BookingDraft {
        let stay = StayDates::new(check_in, check_out).unwrap();
        let subtotal = site.base_price.times(stay.nights());
        let deposit = Money::from_cents(subtotal.cents() / 2);

        BookingDraft {
            site_id: site.id.clone(),
            site_name: site.name.clone(),
            guest: GuestInfo {
                first_name: "Jane".to_string(),
                last_name: "Doe".to_string(),
                email: "jane@example.com".to_string(),
                phone: "865-555-0142".to_string(),
                address: None,
                city: Some("Townsend".to_string()),
                state: Some("TN".to_string()),
                zip_code: None,
            },
            rv_details: Some(RvDetails {
                make: Some("Airstream".to_string()),
                model: Some("Classic".to_string()),
                length: Some(30),
                license_plate: Some("TN-1234".to_string()),
            }),
            stay,
            guests: 2,
            pricing: BookingPricing {
                breakdown: PriceBreakdown {
                    nights: stay.nights(),
                    price_per_night: site.base_price,
                    subtotal,
                    discount: Money::zero(),
                    discount_reason: None,
                    tax: Money::zero(),
                    total: subtotal,
                    deposit_amount: deposit,
                    remaining_balance: subtotal - deposit,
                },
                deposit_paid: false,
            },
            status: BookingStatus::Pending,
            payment_status: PaymentStatus::Pending,
            coupon_code: Some("WELCOME2025".to_string()),
            special_requests: None,
        }
    }
}
