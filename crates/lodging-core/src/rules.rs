//! # Pricing Rules
//!
//! Conditional adjustments to the nightly rate, and the resolver that folds
//! them into an effective rate.
//!
//! ## Accumulation, Not First-Match
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Rules arrive ordered by priority (descending) from the store.          │
//! │  Priority ONLY decides the order names appear in. Every applicable      │
//! │  rule contributes:                                                      │
//! │                                                                         │
//! │    price override   → replaces price_per_night (last one wins)          │
//! │    discount percent → added to cumulative_discount (may be negative)    │
//! │                                                                         │
//! │  Example, 7 nights starting Friday:                                     │
//! │    Weekend Premium      (-10%)  applies → cumulative = -10%             │
//! │    Weekly Stay Discount (+15%)  applies → cumulative =  +5%             │
//! │    Result: 5% off the subtotal, applied once                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::Percent;
use crate::ALL_SITES_SCOPE;

// =============================================================================
// Rule Scope
// =============================================================================

/// Which sites a rule covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case", tag = "scope", content = "siteId")]
pub enum RuleScope {
    /// Stored as the `"all"` site id.
    AllSites,
    Site(String),
}

impl RuleScope {
    /// Parses the stored scope column, where `"all"` means every site.
    pub fn from_site_id(site_id: &str) -> Self {
        if site_id == ALL_SITES_SCOPE {
            RuleScope::AllSites
        } else {
            RuleScope::Site(site_id.to_string())
        }
    }

    /// The value stored in the scope column.
    pub fn as_site_id(&self) -> &str {
        match self {
            RuleScope::AllSites => ALL_SITES_SCOPE,
            RuleScope::Site(id) => id,
        }
    }

    pub fn covers(&self, site_id: &str) -> bool {
        match self {
            RuleScope::AllSites => true,
            RuleScope::Site(id) => id == site_id,
        }
    }
}

// =============================================================================
// Rule Condition
// =============================================================================

/// When a rule is in effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum RuleCondition {
    /// Check-in falls inside `[start_date, end_date]` (both inclusive).
    /// Only the check-in date is compared; a stay may run past `end_date`.
    Seasonal {
        #[ts(as = "String")]
        start_date: NaiveDate,
        #[ts(as = "String")]
        end_date: NaiveDate,
    },

    /// Stay is at least `minimum_nights` long.
    LengthOfStay { minimum_nights: u32 },

    /// Check-in weekday is listed. 0 = Sunday .. 6 = Saturday.
    DayOfWeek { days_of_week: Vec<u8> },
}

impl RuleCondition {
    /// The kind name used in storage.
    pub const fn kind(&self) -> &'static str {
        match self {
            RuleCondition::Seasonal { .. } => "seasonal",
            RuleCondition::LengthOfStay { .. } => "length-of-stay",
            RuleCondition::DayOfWeek { .. } => "day-of-week",
        }
    }

    /// Whether the condition holds for a stay.
    pub fn holds(&self, check_in: NaiveDate, nights: u32) -> bool {
        match self {
            RuleCondition::Seasonal {
                start_date,
                end_date,
            } => check_in >= *start_date && check_in <= *end_date,
            RuleCondition::LengthOfStay { minimum_nights } => nights >= *minimum_nights,
            RuleCondition::DayOfWeek { days_of_week } => {
                let weekday = check_in.weekday().num_days_from_sunday() as u8;
                days_of_week.contains(&weekday)
            }
        }
    }
}

// =============================================================================
// Pricing Rule
// =============================================================================

/// A conditional adjustment to the nightly rate.
///
/// Normally exactly one of `discount` / `price_override` is set. If both
/// are, the override replaces the rate AND the percentage is accumulated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PricingRule {
    pub id: String,

    /// Shown to the guest in the discount reason list.
    pub name: String,

    pub scope: RuleScope,

    pub condition: RuleCondition,

    /// Percentage off the subtotal. Negative = price increase.
    pub discount: Option<Percent>,

    /// Absolute nightly price replacing the site's base price.
    pub price_override: Option<Money>,

    /// Higher first. Retrieval order only.
    pub priority: i32,

    pub active: bool,
}

impl PricingRule {
    /// Whether this rule affects a stay at `site_id` starting `check_in`.
    pub fn applies_to(&self, site_id: &str, check_in: NaiveDate, nights: u32) -> bool {
        self.active && self.scope.covers(site_id) && self.condition.holds(check_in, nights)
    }
}

// =============================================================================
// Resolution
// =============================================================================

/// Outcome of folding pricing rules over a stay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedRate {
    pub price_per_night: Money,
    pub cumulative_discount: Percent,
    /// In rule order; every applicable rule appears once.
    pub applied_rule_names: Vec<String>,
}

/// Folds `rules` (already in priority order) into an effective nightly rate.
///
/// Pure: same inputs always give the same result, and the numeric parts do
/// not depend on the order of `rules`.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use lodging_core::money::Money;
/// use lodging_core::rules::{resolve_rate, PricingRule, RuleCondition, RuleScope};
/// use lodging_core::types::Percent;
///
/// let weekly = PricingRule {
///     id: "r1".into(),
///     name: "Weekly Stay Discount".into(),
///     scope: RuleScope::AllSites,
///     condition: RuleCondition::LengthOfStay { minimum_nights: 7 },
///     discount: Some(Percent::from_bps(1500)),
///     price_override: None,
///     priority: 3,
///     active: true,
/// };
///
/// let check_in = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
/// let rate = resolve_rate(Money::from_cents(7500), "site-1", check_in, 7, &[weekly]);
/// assert_eq!(rate.cumulative_discount.bps(), 1500);
/// assert_eq!(rate.applied_rule_names, vec!["Weekly Stay Discount"]);
/// ```
pub fn resolve_rate(
    base_price: Money,
    site_id: &str,
    check_in: NaiveDate,
    nights: u32,
    rules: &[PricingRule],
) -> ResolvedRate {
    let mut resolved = ResolvedRate {
        price_per_night: base_price,
        cumulative_discount: Percent::zero(),
        applied_rule_names: Vec::new(),
    };

    for rule in rules
        .iter()
        .filter(|rule| rule.applies_to(site_id, check_in, nights))
    {
        if let Some(price) = rule.price_override {
            resolved.price_per_night = price;
        }
        if let Some(discount) = rule.discount {
            resolved.cumulative_discount += discount;
        }
        resolved.applied_rule_names.push(rule.name.clone());
    }

    resolved
}

// =============================================================================
// Unit Tests
// =============================================================================
