//! # Price Calculation
//!
//! Turns a resolved nightly rate, an optional coupon and the business
//! settings into the breakdown shown at checkout.
//!
//! ## Calculation Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  subtotal        = price_per_night × nights                            │
//! │  rule discount   = subtotal × cumulative%                               │
//! │  coupon discount = subtotal × coupon%      (percentage coupon)          │
//! │                  = flat amount             (fixed coupon)               │
//! │  discount        = min(rule + coupon, subtotal)                         │
//! │  after discount  = subtotal - discount                                  │
//! │  tax             = after discount × tax%                                │
//! │  total           = after discount + tax                                 │
//! │  deposit         = total × deposit%                                     │
//! │  remaining       = total - deposit                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every percentage application rounds half away from zero to the cent, so
//! `deposit + remaining == total` holds exactly.
//!
//! A surcharge (negative discount) raises the price and is never clamped.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::coupon::Coupon;
use crate::money::Money;
use crate::rules::ResolvedRate;
use crate::types::Settings;

/// Itemized price for one stay.
///
/// Field names are camelCase on the wire because the checkout page and the
/// payment session read this object directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub nights: u32,

    /// Nightly rate after overrides, before percentage discounts.
    pub price_per_night: Money,

    pub subtotal: Money,

    /// Rule and coupon discounts combined. Negative for a net surcharge.
    pub discount: Money,

    /// Names of every applied rule, then "Coupon CODE", joined by ", ".
    pub discount_reason: Option<String>,

    pub tax: Money,

    pub total: Money,

    pub deposit_amount: Money,

    pub remaining_balance: Money,
}

/// Everything [`calculate_price`] needs.
#[derive(Debug, Clone, Copy)]
pub struct PricingInputs<'a> {
    pub nights: u32,
    pub rate: &'a ResolvedRate,
    pub coupon: Option<&'a Coupon>,
    pub settings: &'a Settings,
}

/// Computes the breakdown.
///
/// ## Example
/// ```rust
/// use lodging_core::money::Money;
/// use lodging_core::pricing::{calculate_price, PricingInputs};
/// use lodging_core::rules::ResolvedRate;
/// use lodging_core::types::{Percent, Settings};
///
/// let rate = ResolvedRate {
///     price_per_night: Money::from_dollars(75),
///     cumulative_discount: Percent::zero(),
///     applied_rule_names: vec![],
/// };
/// let settings = Settings {
///     tax_rate: Percent::from_bps(925),
///     deposit_percentage: Percent::from_bps(5000),
/// };
///
/// let breakdown = calculate_price(PricingInputs {
///     nights: 3,
///     rate: &rate,
///     coupon: None,
///     settings: &settings,
/// });
///
/// assert_eq!(breakdown.total.cents(), 24581);
/// assert_eq!(breakdown.deposit_amount.cents(), 12291);
/// assert_eq!(breakdown.remaining_balance.cents(), 12290);
/// ```
pub fn calculate_price(inputs: PricingInputs<'_>) -> PriceBreakdown {
    let PricingInputs {
        nights,
        rate,
        coupon,
        settings,
    } = inputs;

    let subtotal = rate.price_per_night.times(nights);
    let rule_discount = subtotal.percentage(rate.cumulative_discount);

    let mut reasons = rate.applied_rule_names.clone();
    let coupon_discount = match coupon {
        Some(coupon) => {
            reasons.push(coupon.reason());
            coupon.discount.amount_for(subtotal)
        }
        None => Money::zero(),
    };

    let discount = (rule_discount + coupon_discount).min(subtotal);
    let after_discount = subtotal - discount;

    let tax = after_discount.percentage(settings.tax_rate);
    let total = after_discount + tax;

    let deposit_amount = total.percentage(settings.deposit_percentage);
    let remaining_balance = total - deposit_amount;

    PriceBreakdown {
        nights,
        price_per_night: rate.price_per_night,
        subtotal,
        discount,
        discount_reason: if reasons.is_empty() {
            None
        } else {
            Some(reasons.join(", "))
        },
        tax,
        total,
        deposit_amount,
        remaining_balance,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
