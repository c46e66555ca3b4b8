//! # Row Records
//!
//! Raw rows as SQLite stores them, and their conversion into lodging-core
//! entities.
//!
//! ## Parsing Boundary
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SQLite row ──► *Record (FromRow) ──► TryFrom ──► Site / Booking / ...  │
//! │                 strings, i64,           │                               │
//! │                 JSON text               ├── unknown enum string         │
//! │                                         ├── negative money              │
//! │                                         ├── bps out of range            │
//! │                                         ├── missing rule fields         │
//! │                                         └──► DbError::MalformedRecord   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing past this module ever sees an unchecked column.

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use sqlx::FromRow;

use lodging_core::booking::{BookingPricing, GuestInfo, RvDetails};
use lodging_core::coupon::CouponKind;
use lodging_core::pricing::PriceBreakdown;
use lodging_core::validation::{validate_days_of_week, validate_percent_bps, validate_price_cents};
use lodging_core::{
    Booking, Coupon, CouponDiscount, Money, Percent, PricingRule, RuleCondition, RuleScope,
    Settings, Site,
};

use crate::error::{DbError, DbResult};

/// 100.00%
const FULL_BPS: i64 = 10_000;

// =============================================================================
// Helpers
// =============================================================================

fn to_u32(entity: &str, id: &str, field: &str, value: i64) -> DbResult<u32> {
    u32::try_from(value)
        .map_err(|_| DbError::malformed(entity, id, format!("{field} out of range: {value}")))
}

fn to_bps(entity: &str, id: &str, field: &str, value: i64, min: i64, max: i64) -> DbResult<Percent> {
    validate_percent_bps(field, value, min, max).map_err(|e| DbError::malformed(entity, id, e))?;
    // min/max keep this inside i32
    Ok(Percent::from_bps(value as i32))
}

fn to_money(entity: &str, id: &str, field: &str, cents: i64) -> DbResult<Money> {
    validate_price_cents(field, cents).map_err(|e| DbError::malformed(entity, id, e))?;
    Ok(Money::from_cents(cents))
}

fn from_json<T: DeserializeOwned>(entity: &str, id: &str, field: &str, text: &str) -> DbResult<T> {
    serde_json::from_str(text)
        .map_err(|e| DbError::malformed(entity, id, format!("{field}: {e}")))
}

fn parse<T>(entity: &str, id: &str, value: &str) -> DbResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e| DbError::malformed(entity, id, e))
}

// =============================================================================
// Site
// =============================================================================

#[derive(Debug, Clone, FromRow)]
pub struct SiteRecord {
    pub id: String,
    pub site_number: i64,
    pub name: String,
    pub kind: String,
    pub description: String,
    pub base_price_cents: i64,
    pub max_occupancy: i64,
    pub status: String,
    pub amenities: String,
    pub features: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<SiteRecord> for Site {
    type Error = DbError;

    fn try_from(r: SiteRecord) -> DbResult<Self> {
        const E: &str = "site";
        Ok(Site {
            kind: parse(E, &r.id, &r.kind)?,
            status: parse(E, &r.id, &r.status)?,
            base_price: to_money(E, &r.id, "base price", r.base_price_cents)?,
            max_occupancy: to_u32(E, &r.id, "max occupancy", r.max_occupancy)?,
            amenities: from_json(E, &r.id, "amenities", &r.amenities)?,
            features: from_json(E, &r.id, "features", &r.features)?,
            site_number: r.site_number,
            name: r.name,
            description: r.description,
            created_at: r.created_at,
            updated_at: r.updated_at,
            id: r.id,
        })
    }
}

// =============================================================================
// Booking
// =============================================================================

#[derive(Debug, Clone, FromRow)]
pub struct BookingRecord {
    pub id: String,
    pub site_id: String,
    pub site_name: String,
    pub guest_first_name: String,
    pub guest_last_name: String,
    pub guest_email: String,
    pub guest_phone: String,
    pub guest_address: Option<String>,
    pub guest_city: Option<String>,
    pub guest_state: Option<String>,
    pub guest_zip_code: Option<String>,
    pub rv_details: Option<String>,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub nights: i64,
    pub guests: i64,
    pub price_per_night_cents: i64,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub discount_reason: Option<String>,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub deposit_cents: i64,
    pub remaining_cents: i64,
    pub deposit_paid: bool,
    pub status: String,
    pub payment_status: String,
    pub payment_ref: Option<String>,
    pub coupon_code: Option<String>,
    pub special_requests: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub approved_by: Option<String>,
}

impl TryFrom<BookingRecord> for Booking {
    type Error = DbError;

    fn try_from(r: BookingRecord) -> DbResult<Self> {
        const E: &str = "booking";

        if r.check_out <= r.check_in {
            return Err(DbError::malformed(E, &r.id, "check-out is not after check-in"));
        }

        let rv_details = match &r.rv_details {
            Some(text) => Some(from_json::<RvDetails>(E, &r.id, "rv details", text)?),
            None => None,
        };

        let nights = to_u32(E, &r.id, "nights", r.nights)?;
        let breakdown = PriceBreakdown {
            nights,
            price_per_night: Money::from_cents(r.price_per_night_cents),
            subtotal: Money::from_cents(r.subtotal_cents),
            discount: Money::from_cents(r.discount_cents),
            discount_reason: r.discount_reason,
            tax: Money::from_cents(r.tax_cents),
            total: Money::from_cents(r.total_cents),
            deposit_amount: Money::from_cents(r.deposit_cents),
            remaining_balance: Money::from_cents(r.remaining_cents),
        };

        Ok(Booking {
            status: parse(E, &r.id, &r.status)?,
            payment_status: parse(E, &r.id, &r.payment_status)?,
            guests: to_u32(E, &r.id, "guests", r.guests)?,
            site_id: r.site_id,
            site_name: r.site_name,
            guest: GuestInfo {
                first_name: r.guest_first_name,
                last_name: r.guest_last_name,
                email: r.guest_email,
                phone: r.guest_phone,
                address: r.guest_address,
                city: r.guest_city,
                state: r.guest_state,
                zip_code: r.guest_zip_code,
            },
            rv_details,
            check_in: r.check_in,
            check_out: r.check_out,
            nights,
            pricing: BookingPricing {
                breakdown,
                deposit_paid: r.deposit_paid,
            },
            payment_ref: r.payment_ref,
            coupon_code: r.coupon_code,
            special_requests: r.special_requests,
            created_at: r.created_at,
            updated_at: r.updated_at,
            approved_at: r.approved_at,
            approved_by: r.approved_by,
            id: r.id,
        })
    }
}

// =============================================================================
// Pricing Rule
// =============================================================================

#[derive(Debug, Clone, FromRow)]
pub struct PricingRuleRecord {
    pub id: String,
    pub name: String,
    pub site_id: String,
    pub rule_type: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub minimum_nights: Option<i64>,
    pub days_of_week: Option<String>,
    pub discount_bps: Option<i64>,
    pub price_override_cents: Option<i64>,
    pub priority: i64,
    pub active: bool,
}

impl PricingRuleRecord {
    fn condition(&self) -> DbResult<RuleCondition> {
        const E: &str = "pricing rule";
        let missing = |field: &str| DbError::malformed(E, &self.id, format!("{} rule without {field}", self.rule_type));

        match self.rule_type.as_str() {
            "seasonal" => {
                let start_date = self.start_date.ok_or_else(|| missing("start date"))?;
                let end_date = self.end_date.ok_or_else(|| missing("end date"))?;
                if end_date < start_date {
                    return Err(DbError::malformed(E, &self.id, "season ends before it starts"));
                }
                Ok(RuleCondition::Seasonal {
                    start_date,
                    end_date,
                })
            }
            "length-of-stay" => {
                let minimum = self.minimum_nights.ok_or_else(|| missing("minimum nights"))?;
                Ok(RuleCondition::LengthOfStay {
                    minimum_nights: to_u32(E, &self.id, "minimum nights", minimum)?,
                })
            }
            "day-of-week" => {
                let text = self.days_of_week.as_deref().ok_or_else(|| missing("days of week"))?;
                let days: Vec<u8> = from_json(E, &self.id, "days of week", text)?;
                validate_days_of_week(&days).map_err(|e| DbError::malformed(E, &self.id, e))?;
                Ok(RuleCondition::DayOfWeek { days_of_week: days })
            }
            other => Err(DbError::malformed(
                E,
                &self.id,
                format!("unsupported rule type '{other}'"),
            )),
        }
    }
}

impl TryFrom<PricingRuleRecord> for PricingRule {
    type Error = DbError;

    fn try_from(r: PricingRuleRecord) -> DbResult<Self> {
        const E: &str = "pricing rule";

        if r.discount_bps.is_none() && r.price_override_cents.is_none() {
            return Err(DbError::malformed(E, &r.id, "no discount or price override"));
        }

        let condition = r.condition()?;
        let discount = match r.discount_bps {
            Some(bps) => Some(to_bps(E, &r.id, "discount", bps, -FULL_BPS, FULL_BPS)?),
            None => None,
        };
        let price_override = match r.price_override_cents {
            Some(cents) => Some(to_money(E, &r.id, "price override", cents)?),
            None => None,
        };
        let priority = i32::try_from(r.priority)
            .map_err(|_| DbError::malformed(E, &r.id, "priority out of range"))?;

        Ok(PricingRule {
            scope: RuleScope::from_site_id(&r.site_id),
            condition,
            discount,
            price_override,
            priority,
            active: r.active,
            name: r.name,
            id: r.id,
        })
    }
}

// =============================================================================
// Coupon
// =============================================================================

#[derive(Debug, Clone, FromRow)]
pub struct CouponRecord {
    pub id: String,
    pub code: String,
    pub description: String,
    pub coupon_type: String,
    pub value: i64,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub usage_limit: Option<i64>,
    pub used_count: i64,
    pub minimum_stay: Option<i64>,
    pub active: bool,
}

impl TryFrom<CouponRecord> for Coupon {
    type Error = DbError;

    fn try_from(r: CouponRecord) -> DbResult<Self> {
        const E: &str = "coupon";

        let discount = match parse::<CouponKind>(E, &r.id, &r.coupon_type)? {
            CouponKind::Percentage => {
                CouponDiscount::Percentage(to_bps(E, &r.id, "value", r.value, 0, FULL_BPS)?)
            }
            CouponKind::Fixed => CouponDiscount::Fixed(to_money(E, &r.id, "value", r.value)?),
        };

        let usage_limit = match r.usage_limit {
            Some(limit) => Some(to_u32(E, &r.id, "usage limit", limit)?),
            None => None,
        };
        let minimum_stay = match r.minimum_stay {
            Some(nights) => Some(to_u32(E, &r.id, "minimum stay", nights)?),
            None => None,
        };

        Ok(Coupon {
            discount,
            usage_limit,
            minimum_stay,
            used_count: to_u32(E, &r.id, "used count", r.used_count)?,
            code: r.code,
            description: r.description,
            valid_from: r.valid_from,
            valid_until: r.valid_until,
            active: r.active,
            id: r.id,
        })
    }
}

// =============================================================================
// Settings
// =============================================================================

#[derive(Debug, Clone, FromRow)]
pub struct SettingsRecord {
    pub tax_rate_bps: i64,
    pub deposit_bps: i64,
}

impl TryFrom<SettingsRecord> for Settings {
    type Error = DbError;

    fn try_from(r: SettingsRecord) -> DbResult<Self> {
        const E: &str = "settings";
        Ok(Settings {
            tax_rate: to_bps(E, "1", "tax rate", r.tax_rate_bps, 0, FULL_BPS)?,
            deposit_percentage: to_bps(E, "1", "deposit percentage", r.deposit_bps, 0, FULL_BPS)?,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn rule_record() -> PricingRuleRecord {
        PricingRuleRecord {
            id: "rule-1".to_string(),
            name: "Weekend Premium".to_string(),
            site_id: "all".to_string(),
            rule_type: "day-of-week".to_string(),
            start_date: None,
            end_date: None,
            minimum_nights: None,
            days_of_week: Some("[5,6]".to_string()),
            discount_bps: Some(-1000),
            price_override_cents: None,
            priority: 5,
            active: true,
        }
    }

    #[test]
    fn test_day_of_week_rule_parses() {
        let rule = PricingRule::try_from(rule_record()).unwrap();

        assert_eq!(rule.scope, RuleScope::AllSites);
        assert_eq!(
            rule.condition,
            RuleCondition::DayOfWeek {
                days_of_week: vec![5, 6]
            }
        );
        assert_eq!(rule.discount, Some(Percent::from_bps(-1000)));
    }

    #[test]
    fn test_rule_without_adjustment_is_rejected() {
        let mut record = rule_record();
        record.discount_bps = None;

        let err = PricingRule::try_from(record).unwrap_err();
        assert!(matches!(err, DbError::MalformedRecord { ref entity, .. } if entity == "pricing rule"));
    }

    #[test]
    fn test_rule_with_bad_weekday_is_rejected() {
        let mut record = rule_record();
        record.days_of_week = Some("[5,9]".to_string());
        assert!(PricingRule::try_from(record).is_err());

        let mut record = rule_record();
        record.days_of_week = Some("fri,sat".to_string());
        assert!(PricingRule::try_from(record).is_err());
    }

    #[test]
    fn test_seasonal_rule_needs_both_dates() {
        let mut record = rule_record();
        record.rule_type = "seasonal".to_string();
        record.start_date = NaiveDate::from_ymd_opt(2025, 6, 1);
        assert!(PricingRule::try_from(record.clone()).is_err());

        record.end_date = NaiveDate::from_ymd_opt(2025, 8, 31);
        let rule = PricingRule::try_from(record).unwrap();
        assert_eq!(rule.condition.kind(), "seasonal");
    }

    #[test]
    fn test_custom_rule_type_is_rejected() {
        let mut record = rule_record();
        record.rule_type = "custom".to_string();
        assert!(PricingRule::try_from(record).is_err());
    }

    #[test]
    fn test_coupon_percentage_out_of_range() {
        let record = CouponRecord {
            id: "coupon-1".to_string(),
            code: "HALFOFF".to_string(),
            description: String::new(),
            coupon_type: "percentage".to_string(),
            value: 15_000,
            valid_from: Utc::now(),
            valid_until: Utc::now(),
            usage_limit: None,
            used_count: 0,
            minimum_stay: None,
            active: true,
        };

        assert!(Coupon::try_from(record).is_err());
    }

    #[test]
    fn test_settings_parse() {
        let settings = Settings::try_from(SettingsRecord {
            tax_rate_bps: 925,
            deposit_bps: 5000,
        })
        .unwrap();

        assert_eq!(settings.tax_rate.bps(), 925);
        assert!(Settings::try_from(SettingsRecord {
            tax_rate_bps: -1,
            deposit_bps: 5000,
        })
        .is_err());
    }
}
