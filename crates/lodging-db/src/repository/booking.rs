//! # Booking Repository
//!
//! Reads bookings for availability checks and writes new and updated
//! bookings.
//!
//! ## Write Guards
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Availability-Sensitive Writes                         │
//! │                                                                         │
//! │  create_if_available(draft)          update_status(id, approved)        │
//! │       │                                   │                             │
//! │       ▼                                   ▼                             │
//! │  BEGIN IMMEDIATE  ← takes the write lock before reading                 │
//! │       │                                                                 │
//! │       ├── load approved/confirmed bookings for the site                 │
//! │       ├── conflicting_bookings(stay, ..) non-empty? → ROLLBACK,         │
//! │       │                                              DbError::Conflict  │
//! │       ├── INSERT / UPDATE                                               │
//! │       ▼                                                                 │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Two guests racing for the same nights: the second one waits for the    │
//! │  lock, then sees the first booking and gets Conflict.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `create_booking` is the plain insert with no guard, for imports and
//! staff-entered bookings.

use chrono::{NaiveDate, Utc};
use lodging_core::availability::conflicting_bookings;
use lodging_core::{Booking, BookingDraft, BookingStatus, PaymentStatus, StayDates};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::records::BookingRecord;

const BOOKING_COLUMNS: &str = r#"
    id, site_id, site_name,
    guest_first_name, guest_last_name, guest_email, guest_phone,
    guest_address, guest_city, guest_state, guest_zip_code,
    rv_details, check_in, check_out, nights, guests,
    price_per_night_cents, subtotal_cents, discount_cents, discount_reason,
    tax_cents, total_cents, deposit_cents, remaining_cents, deposit_paid,
    status, payment_status, payment_ref, coupon_code, special_requests,
    created_at, updated_at, approved_at, approved_by
"#;

/// Repository for booking database operations.
#[derive(Debug, Clone)]
pub struct BookingRepository {
    pool: SqlitePool,
}

impl BookingRepository {
    /// Creates a new BookingRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BookingRepository { pool }
    }

    /// Gets a booking by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Booking>> {
        let mut conn = self.pool.acquire().await?;
        fetch_booking(&mut conn, id).await
    }

    /// All bookings for a site in any status, by check-in date.
    pub async fn list_for_site(&self, site_id: &str) -> DbResult<Vec<Booking>> {
        let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE site_id = ?1 ORDER BY check_in ASC");
        let records: Vec<BookingRecord> = sqlx::query_as(&sql)
            .bind(site_id)
            .fetch_all(&self.pool)
            .await?;

        records.into_iter().map(Booking::try_from).collect()
    }

    /// Approved and confirmed bookings for a site.
    pub async fn list_blocking_for_site(&self, site_id: &str) -> DbResult<Vec<Booking>> {
        let mut conn = self.pool.acquire().await?;
        fetch_blocking(&mut conn, site_id, None).await
    }

    /// Inserts a booking without checking availability.
    ///
    /// ## Returns
    /// The generated booking id.
    pub async fn create_booking(&self, draft: &BookingDraft) -> DbResult<String> {
        let id = Uuid::new_v4().to_string();
        let mut conn = self.pool.acquire().await?;
        insert_booking(&mut conn, &id, draft).await?;

        info!(id = %id, site_id = %draft.site_id, "Booking created");
        Ok(id)
    }

    /// Inserts a booking only if no approved or confirmed booking overlaps
    /// it, atomically with respect to other writers.
    ///
    /// ## Errors
    /// `DbError::Conflict` when the nights are already taken.
    pub async fn create_if_available(&self, draft: &BookingDraft) -> DbResult<String> {
        let id = Uuid::new_v4().to_string();
        let mut conn = self.pool.acquire().await?;

        begin_immediate(&mut conn).await?;
        let result = async {
            ensure_free(
                &mut conn,
                &draft.site_id,
                draft.stay.check_in(),
                draft.stay.check_out(),
                None,
            )
            .await?;
            insert_booking(&mut conn, &id, draft).await
        }
        .await;
        finish(&mut conn, result).await?;

        info!(id = %id, site_id = %draft.site_id, "Booking created after availability check");
        Ok(id)
    }

    /// Moves a booking to `new_status`.
    ///
    /// ## What This Does
    /// - Rejects transitions the lifecycle doesn't allow
    /// - Re-checks availability when the booking starts blocking its nights
    /// - Records `approved_at` / `approved_by` on approval
    pub async fn update_status(
        &self,
        id: &str,
        new_status: BookingStatus,
        actor: Option<&str>,
    ) -> DbResult<Booking> {
        let mut conn = self.pool.acquire().await?;

        begin_immediate(&mut conn).await?;
        let result = transition(&mut conn, id, new_status, actor).await;
        let booking = finish(&mut conn, result).await?;

        info!(id = %id, status = %new_status, actor = actor.unwrap_or("-"), "Booking status updated");
        Ok(booking)
    }

    /// Records a payment event.
    ///
    /// `deposit_paid` and `fully_paid` mark the deposit as paid; a return to
    /// `pending` (failed payment) clears it. `payment_ref` is kept when
    /// `None` is passed.
    pub async fn update_payment_status(
        &self,
        id: &str,
        status: PaymentStatus,
        payment_ref: Option<&str>,
    ) -> DbResult<Booking> {
        let deposit_paid = match status {
            PaymentStatus::DepositPaid | PaymentStatus::FullyPaid => Some(true),
            PaymentStatus::Pending => Some(false),
            PaymentStatus::Refunded => None,
        };

        let result = sqlx::query(
            r#"
            UPDATE bookings
            SET payment_status = ?2,
                payment_ref = COALESCE(?3, payment_ref),
                deposit_paid = COALESCE(?4, deposit_paid),
                updated_at = ?5
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .bind(payment_ref)
        .bind(deposit_paid)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Booking", id));
        }

        info!(id = %id, payment_status = %status, "Payment status updated");

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Booking", id))
    }
}

// =============================================================================
// Connection-Level Helpers
// =============================================================================

async fn fetch_booking(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Booking>> {
    let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1");
    let record: Option<BookingRecord> = sqlx::query_as(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    record.map(Booking::try_from).transpose()
}

async fn fetch_blocking(
    conn: &mut SqliteConnection,
    site_id: &str,
    exclude_id: Option<&str>,
) -> DbResult<Vec<Booking>> {
    let [first, second] = BookingStatus::BLOCKING;
    let sql = format!(
        r#"
        SELECT {BOOKING_COLUMNS}
        FROM bookings
        WHERE site_id = ?1
          AND status IN (?2, ?3)
          AND (?4 IS NULL OR id != ?4)
        ORDER BY check_in ASC
        "#
    );
    let records: Vec<BookingRecord> = sqlx::query_as(&sql)
        .bind(site_id)
        .bind(first.as_str())
        .bind(second.as_str())
        .bind(exclude_id)
        .fetch_all(&mut *conn)
        .await?;

    debug!(site_id = %site_id, count = records.len(), "Loaded blocking bookings");

    records.into_iter().map(Booking::try_from).collect()
}

async fn ensure_free(
    conn: &mut SqliteConnection,
    site_id: &str,
    check_in: NaiveDate,
    check_out: NaiveDate,
    exclude_id: Option<&str>,
) -> DbResult<()> {
    let stay = StayDates::new(check_in, check_out)?;
    let bookings = fetch_blocking(conn, site_id, exclude_id).await?;

    let conflicts = conflicting_bookings(&stay, &bookings);
    if let Some(first) = conflicts.first() {
        warn!(
            site_id = %site_id,
            check_in = %check_in,
            check_out = %check_out,
            conflicting_id = %first.id,
            "Dates already booked"
        );
        return Err(DbError::Conflict {
            site_id: site_id.to_string(),
            check_in,
            check_out,
        });
    }

    Ok(())
}

async fn insert_booking(conn: &mut SqliteConnection, id: &str, draft: &BookingDraft) -> DbResult<()> {
    debug!(id = %id, site_id = %draft.site_id, check_in = %draft.stay.check_in(), "Inserting booking");

    let rv_details = draft
        .rv_details
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| DbError::Internal(e.to_string()))?;
    let b = &draft.pricing.breakdown;
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO bookings (
            id, site_id, site_name,
            guest_first_name, guest_last_name, guest_email, guest_phone,
            guest_address, guest_city, guest_state, guest_zip_code,
            rv_details, check_in, check_out, nights, guests,
            price_per_night_cents, subtotal_cents, discount_cents, discount_reason,
            tax_cents, total_cents, deposit_cents, remaining_cents, deposit_paid,
            status, payment_status, coupon_code, special_requests,
            created_at, updated_at
        ) VALUES (
            ?1, ?2, ?3,
            ?4, ?5, ?6, ?7,
            ?8, ?9, ?10, ?11,
            ?12, ?13, ?14, ?15, ?16,
            ?17, ?18, ?19, ?20,
            ?21, ?22, ?23, ?24, ?25,
            ?26, ?27, ?28, ?29,
            ?30, ?30
        )
        "#,
    )
    .bind(id)
    .bind(&draft.site_id)
    .bind(&draft.site_name)
    .bind(&draft.guest.first_name)
    .bind(&draft.guest.last_name)
    .bind(&draft.guest.email)
    .bind(&draft.guest.phone)
    .bind(&draft.guest.address)
    .bind(&draft.guest.city)
    .bind(&draft.guest.state)
    .bind(&draft.guest.zip_code)
    .bind(rv_details)
    .bind(draft.stay.check_in())
    .bind(draft.stay.check_out())
    .bind(i64::from(draft.stay.nights()))
    .bind(i64::from(draft.guests))
    .bind(b.price_per_night.cents())
    .bind(b.subtotal.cents())
    .bind(b.discount.cents())
    .bind(&b.discount_reason)
    .bind(b.tax.cents())
    .bind(b.total.cents())
    .bind(b.deposit_amount.cents())
    .bind(b.remaining_balance.cents())
    .bind(draft.pricing.deposit_paid)
    .bind(draft.status.as_str())
    .bind(draft.payment_status.as_str())
    .bind(&draft.coupon_code)
    .bind(&draft.special_requests)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn transition(
    conn: &mut SqliteConnection,
    id: &str,
    new_status: BookingStatus,
    actor: Option<&str>,
) -> DbResult<Booking> {
    let current = fetch_booking(conn, id)
        .await?
        .ok_or_else(|| DbError::not_found("Booking", id))?;

    current.status.ensure_transition(new_status)?;

    if new_status.blocks_availability() && !current.status.blocks_availability() {
        ensure_free(conn, &current.site_id, current.check_in, current.check_out, Some(id)).await?;
    }

    let now = Utc::now();
    if new_status == BookingStatus::Approved {
        sqlx::query(
            "UPDATE bookings SET status = ?2, updated_at = ?3, approved_at = ?3, approved_by = ?4 WHERE id = ?1",
        )
        .bind(id)
        .bind(new_status.as_str())
        .bind(now)
        .bind(actor)
        .execute(&mut *conn)
        .await?;
    } else {
        sqlx::query("UPDATE bookings SET status = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(new_status.as_str())
            .bind(now)
            .execute(&mut *conn)
            .await?;
    }

    fetch_booking(conn, id)
        .await?
        .ok_or_else(|| DbError::not_found("Booking", id))
}

async fn begin_immediate(conn: &mut SqliteConnection) -> DbResult<()> {
    sqlx::query("BEGIN IMMEDIATE")
        .execute(&mut *conn)
        .await
        .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
    Ok(())
}

/// Commits on `Ok`, rolls back on `Err`.
async fn finish<T>(conn: &mut SqliteConnection, result: DbResult<T>) -> DbResult<T> {
    match result {
        Ok(value) => {
            sqlx::query("COMMIT")
                .execute(&mut *conn)
                .await
                .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = sqlx::query("ROLLBACK").execute(&mut *conn).await {
                warn!(error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
