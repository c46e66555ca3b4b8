//! # Settings Repository
//!
//! The single business-settings row (tax rate, deposit share).

use chrono::Utc;
use lodging_core::Settings;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;
use crate::records::SettingsRecord;

/// Repository for the settings singleton.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    /// The stored settings, if the row exists.
    pub async fn get(&self) -> DbResult<Option<Settings>> {
        let record: Option<SettingsRecord> =
            sqlx::query_as("SELECT tax_rate_bps, deposit_bps FROM settings WHERE id = 1")
                .fetch_optional(&self.pool)
                .await?;

        record.map(Settings::try_from).transpose()
    }

    /// The stored settings, or no tax and a 50% deposit.
    pub async fn get_or_default(&self) -> DbResult<Settings> {
        match self.get().await? {
            Some(settings) => Ok(settings),
            None => {
                debug!("No settings row, using defaults");
                Ok(Settings::default())
            }
        }
    }

    /// Writes the settings row, replacing any previous values.
    pub async fn upsert(&self, settings: &Settings) -> DbResult<()> {
        info!(
            tax_rate = %settings.tax_rate,
            deposit = %settings.deposit_percentage,
            "Saving settings"
        );

        sqlx::query(
            r#"
            INSERT INTO settings (id, tax_rate_bps, deposit_bps, updated_at)
            VALUES (1, ?1, ?2, ?3)
            ON CONFLICT (id) DO UPDATE SET
                tax_rate_bps = excluded.tax_rate_bps,
                deposit_bps = excluded.deposit_bps,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(settings.tax_rate.bps())
        .bind(settings.deposit_percentage.bps())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
