//! # Site Repository
//!
//! Database operations for bookable sites.

use lodging_core::{Site, SiteStatus};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::records::SiteRecord;

const SITE_COLUMNS: &str = r#"
    id, site_number, name, kind, description, base_price_cents, max_occupancy,
    status, amenities, features, created_at, updated_at
"#;

/// Repository for site database operations.
#[derive(Debug, Clone)]
pub struct SiteRepository {
    pool: SqlitePool,
}

impl SiteRepository {
    /// Creates a new SiteRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SiteRepository { pool }
    }

    /// Gets a site by ID, whatever its status.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Site>> {
        debug!(id = %id, "Fetching site");

        let sql = format!("SELECT {SITE_COLUMNS} FROM sites WHERE id = ?1");
        let record: Option<SiteRecord> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        record.map(Site::try_from).transpose()
    }

    /// Gets a site by the number on its pad.
    pub async fn get_by_number(&self, site_number: i64) -> DbResult<Option<Site>> {
        let sql = format!("SELECT {SITE_COLUMNS} FROM sites WHERE site_number = ?1");
        let record: Option<SiteRecord> = sqlx::query_as(&sql)
            .bind(site_number)
            .fetch_optional(&self.pool)
            .await?;

        record.map(Site::try_from).transpose()
    }

    /// Active sites, ordered by site number.
    pub async fn list_active(&self) -> DbResult<Vec<Site>> {
        let sql = format!(
            "SELECT {SITE_COLUMNS} FROM sites WHERE status = ?1 ORDER BY site_number ASC"
        );
        let records: Vec<SiteRecord> = sqlx::query_as(&sql)
            .bind(SiteStatus::Active.as_str())
            .fetch_all(&self.pool)
            .await?;

        debug!(count = records.len(), "Listed active sites");

        records.into_iter().map(Site::try_from).collect()
    }

    /// Inserts a new site.
    pub async fn insert(&self, site: &Site) -> DbResult<()> {
        debug!(id = %site.id, site_number = site.site_number, "Inserting site");

        let amenities = serde_json::to_string(&site.amenities)
            .map_err(|e| DbError::Internal(e.to_string()))?;
        let features = serde_json::to_string(&site.features)
            .map_err(|e| DbError::Internal(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO sites (
                id, site_number, name, kind, description, base_price_cents,
                max_occupancy, status, amenities, features, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&site.id)
        .bind(site.site_number)
        .bind(&site.name)
        .bind(site.kind.as_str())
        .bind(&site.description)
        .bind(site.base_price.cents())
        .bind(i64::from(site.max_occupancy))
        .bind(site.status.as_str())
        .bind(amenities)
        .bind(features)
        .bind(site.created_at)
        .bind(site.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Number of sites in any status.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sites")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::repository::test_support::{sample_site, test_db};
    use lodging_core::SiteStatus;

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = test_db().await;
        let site = sample_site("site-1", 1, 7500);
        db.sites().insert(&site).await.unwrap();

        let loaded = db.sites().get_by_id("site-1").await.unwrap().unwrap();
        assert_eq!(loaded.name, site.name);
        assert_eq!(loaded.base_price.cents(), 7500);
        assert_eq!(loaded.amenities, vec!["Water".to_string(), "50A Power".to_string()]);

        let by_number = db.sites().get_by_number(1).await.unwrap().unwrap();
        assert_eq!(by_number.id, "site-1");

        assert!(db.sites().get_by_id("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_active_ordered_by_number() {
        let db = test_db().await;
        db.sites().insert(&sample_site("site-3", 3, 6800)).await.unwrap();
        db.sites().insert(&sample_site("site-1", 1, 7500)).await.unwrap();

        let mut closed = sample_site("site-2", 2, 7000);
        closed.status = SiteStatus::Maintenance;
        db.sites().insert(&closed).await.unwrap();

        let active = db.sites().list_active().await.unwrap();
        let numbers: Vec<i64> = active.iter().map(|s| s.site_number).collect();
        assert_eq!(numbers, vec![1, 3]);
        assert_eq!(db.sites().count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_duplicate_site_number() {
        let db = test_db().await;
        db.sites().insert(&sample_site("site-1", 1, 7500)).await.unwrap();

        let err = db
            .sites()
            .insert(&sample_site("site-x", 1, 7500))
            .await
            .unwrap_err();
        assert!(matches!(err, crate::DbError::UniqueViolation { .. }));
    }
}
