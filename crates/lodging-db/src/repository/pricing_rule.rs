//! # Pricing Rule Repository
//!
//! Stores seasonal, length-of-stay and day-of-week rules.
//!
//! ## Column Layout by Rule Type
//! ```text
//! ┌────────────────┬────────────────────────┬────────────────────────────┐
//! │ rule_type      │ required columns       │ example                    │
//! ├────────────────┼────────────────────────┼────────────────────────────┤
//! │ seasonal       │ start_date, end_date   │ 2025-06-01 .. 2025-08-31   │
//! │ length-of-stay │ minimum_nights         │ 7                          │
//! │ day-of-week    │ days_of_week (JSON)    │ [5,6]                      │
//! └────────────────┴────────────────────────┴────────────────────────────┘
//!   plus at least one of discount_bps / price_override_cents
//! ```

use chrono::Utc;
use lodging_core::{PricingRule, RuleCondition, ALL_SITES_SCOPE};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::records::PricingRuleRecord;

const RULE_COLUMNS: &str = r#"
    id, name, site_id, rule_type, start_date, end_date, minimum_nights,
    days_of_week, discount_bps, price_override_cents, priority, active
"#;

/// Repository for pricing rules.
#[derive(Debug, Clone)]
pub struct PricingRuleRepository {
    pool: SqlitePool,
}

impl PricingRuleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PricingRuleRepository { pool }
    }

    /// Active rules for the site or for all sites, highest priority first.
    pub async fn list_for_site(&self, site_id: &str) -> DbResult<Vec<PricingRule>> {
        let sql = format!(
            r#"
            SELECT {RULE_COLUMNS}
            FROM pricing_rules
            WHERE active = 1 AND (site_id = ?1 OR site_id = ?2)
            ORDER BY priority DESC, name ASC
            "#
        );
        let records: Vec<PricingRuleRecord> = sqlx::query_as(&sql)
            .bind(site_id)
            .bind(ALL_SITES_SCOPE)
            .fetch_all(&self.pool)
            .await?;

        debug!(site_id = %site_id, count = records.len(), "Loaded pricing rules");

        records.into_iter().map(PricingRule::try_from).collect()
    }

    /// Every rule, active or not.
    pub async fn list_all(&self) -> DbResult<Vec<PricingRule>> {
        let sql = format!("SELECT {RULE_COLUMNS} FROM pricing_rules ORDER BY priority DESC, name ASC");
        let records: Vec<PricingRuleRecord> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;

        records.into_iter().map(PricingRule::try_from).collect()
    }

    /// Inserts a rule.
    pub async fn insert(&self, rule: &PricingRule) -> DbResult<()> {
        debug!(id = %rule.id, name = %rule.name, kind = rule.condition.kind(), "Inserting pricing rule");

        if rule.discount.is_none() && rule.price_override.is_none() {
            return Err(DbError::malformed(
                "pricing rule",
                &rule.id,
                "no discount or price override",
            ));
        }

        let (start_date, end_date, minimum_nights, days_of_week) = match &rule.condition {
            RuleCondition::Seasonal {
                start_date,
                end_date,
            } => (Some(*start_date), Some(*end_date), None, None),
            RuleCondition::LengthOfStay { minimum_nights } => {
                (None, None, Some(i64::from(*minimum_nights)), None)
            }
            RuleCondition::DayOfWeek { days_of_week } => {
                let json = serde_json::to_string(days_of_week)
                    .map_err(|e| DbError::Internal(e.to_string()))?;
                (None, None, None, Some(json))
            }
        };

        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO pricing_rules (
                id, name, site_id, rule_type, start_date, end_date, minimum_nights,
                days_of_week, discount_bps, price_override_cents, priority, active,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
        )
        .bind(&rule.id)
        .bind(&rule.name)
        .bind(rule.scope.as_site_id())
        .bind(rule.condition.kind())
        .bind(start_date)
        .bind(end_date)
        .bind(minimum_nights)
        .bind(days_of_week)
        .bind(rule.discount.map(|d| d.bps()))
        .bind(rule.price_override.map(|p| p.cents()))
        .bind(rule.priority)
        .bind(rule.active)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
