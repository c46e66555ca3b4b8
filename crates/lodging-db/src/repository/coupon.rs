//! # Coupon Repository
//!
//! Coupon lookup, and the usage counter bumped once a booking using the
//! coupon is paid for.
//!
//! ## Usage Counter
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UPDATE coupons SET used_count = used_count + 1                         │
//! │  WHERE code = ? AND active = 1                                          │
//! │    AND (usage_limit IS NULL OR used_count < usage_limit)                │
//! │                                                                         │
//! │  1 row  → counted                                                       │
//! │  0 rows → unknown, inactive or exhausted (never exceeds the cap)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use lodging_core::validation::normalize_coupon_code;
use lodging_core::{Coupon, CouponDiscount};
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use crate::records::CouponRecord;

const COUPON_COLUMNS: &str = r#"
    id, code, description, coupon_type, value, valid_from, valid_until,
    usage_limit, used_count, minimum_stay, active
"#;

/// Repository for coupons.
#[derive(Debug, Clone)]
pub struct CouponRepository {
    pool: SqlitePool,
}

impl CouponRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CouponRepository { pool }
    }

    /// Active coupon with this code. The code is matched exactly; callers
    /// upper-case it first.
    pub async fn get_active_by_code(&self, code: &str) -> DbResult<Option<Coupon>> {
        debug!(code = %code, "Looking up coupon");

        let sql = format!("SELECT {COUPON_COLUMNS} FROM coupons WHERE code = ?1 AND active = 1");
        let record: Option<CouponRecord> = sqlx::query_as(&sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        record.map(Coupon::try_from).transpose()
    }

    /// Inserts a coupon, storing its code upper-case.
    pub async fn insert(&self, coupon: &Coupon) -> DbResult<()> {
        let code = normalize_coupon_code(&coupon.code)
            .ok_or_else(|| DbError::malformed("coupon", &coupon.id, "blank code"))?;

        debug!(id = %coupon.id, code = %code, "Inserting coupon");

        let value = match coupon.discount {
            CouponDiscount::Percentage(pct) => i64::from(pct.bps()),
            CouponDiscount::Fixed(amount) => amount.cents(),
        };

        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO coupons (
                id, code, description, coupon_type, value, valid_from, valid_until,
                usage_limit, used_count, minimum_stay, active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&coupon.id)
        .bind(&code)
        .bind(&coupon.description)
        .bind(coupon.discount.kind())
        .bind(value)
        .bind(coupon.valid_from)
        .bind(coupon.valid_until)
        .bind(coupon.usage_limit.map(i64::from))
        .bind(i64::from(coupon.used_count))
        .bind(coupon.minimum_stay.map(i64::from))
        .bind(coupon.active)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, code.clone()),
            other => other,
        })?;

        Ok(())
    }

    /// Counts one redemption. Returns `false` when the coupon is unknown,
    /// inactive or already at its cap.
    pub async fn increment_usage(&self, code: &str) -> DbResult<bool> {
        let Some(code) = normalize_coupon_code(code) else {
            return Ok(false);
        };

        let result = sqlx::query(
            r#"
            UPDATE coupons
            SET used_count = used_count + 1, updated_at = ?2
            WHERE code = ?1
              AND active = 1
              AND (usage_limit IS NULL OR used_count < usage_limit)
            "#,
        )
        .bind(&code)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        let counted = result.rows_affected() == 1;
        if counted {
            debug!(code = %code, "Coupon usage counted");
        } else {
            warn!(code = %code, "Coupon usage not counted (unknown, inactive or exhausted)");
        }

        Ok(counted)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::test_db;
    use chrono::TimeZone;
    use lodging_core::{Money, Percent};

    fn coupon(code: &str, usage_limit: Option<u32>) -> Coupon {
        Coupon {
            id: format!("coupon-{code}"),
            code: code.to_string(),
            description: "Test coupon".to_string(),
            discount: CouponDiscount::Percentage(Percent::from_bps(1000)),
            valid_from: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            valid_until: Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 59).unwrap(),
            usage_limit,
            used_count: 0,
            minimum_stay: Some(2),
            active: true,
        }
    }

    #[tokio::test]
    async fn test_code_stored_upper_case() {
        let db = test_db().await;
        db.coupons().insert(&coupon("welcome2025", Some(100))).await.unwrap();

        let found = db.coupons().get_active_by_code("WELCOME2025").await.unwrap().unwrap();
        assert_eq!(found.code, "WELCOME2025");
        assert_eq!(found.usage_limit, Some(100));
        assert_eq!(found.minimum_stay, Some(2));
        assert_eq!(found.discount, CouponDiscount::Percentage(Percent::from_bps(1000)));
    }

    #[tokio::test]
    async fn test_inactive_coupon_not_returned() {
        let db = test_db().await;
        let mut old = coupon("OLD", None);
        old.active = false;
        db.coupons().insert(&old).await.unwrap();

        assert!(db.coupons().get_active_by_code("OLD").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fixed_coupon_round_trip() {
        let db = test_db().await;
        let mut early = coupon("EARLYBIRD", Some(30));
        early.discount = CouponDiscount::Fixed(Money::from_dollars(25));
        db.coupons().insert(&early).await.unwrap();

        let found = db.coupons().get_active_by_code("EARLYBIRD").await.unwrap().unwrap();
        assert_eq!(found.discount, CouponDiscount::Fixed(Money::from_cents(2500)));
    }

    #[tokio::test]
    async fn test_increment_stops_at_limit() {
        let db = test_db().await;
        db.coupons().insert(&coupon("TWICE", Some(2))).await.unwrap();

        assert!(db.coupons().increment_usage("twice").await.unwrap());
        assert!(db.coupons().increment_usage("TWICE").await.unwrap());
        assert!(!db.coupons().increment_usage("TWICE").await.unwrap());

        let found = db.coupons().get_active_by_code("TWICE").await.unwrap().unwrap();
        assert_eq!(found.used_count, 2);
    }

    #[tokio::test]
    async fn test_increment_unknown_code() {
        let db = test_db().await;
        assert!(!db.coupons().increment_usage("NOPE").await.unwrap());
        assert!(!db.coupons().increment_usage("  ").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_code() {
        let db = test_db().await;
        db.coupons().insert(&coupon("SAME", None)).await.unwrap();

        let mut again = coupon("same", None);
        again.id = "other".to_string();
        let err = db.coupons().insert(&again).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { value, .. } if value == "SAME"));
    }
}
