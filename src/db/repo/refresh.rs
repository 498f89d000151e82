use super::Repository;
use crate::db::store::{RefreshMetadataStore, StoreError};
use crate::domain::{RefreshMetadata, RefreshStatus, TimeMs};
use async_trait::async_trait;
use sqlx::Row;

#[async_trait]
impl RefreshMetadataStore for Repository {
    async fn get_metadata(&self, key: &str) -> Result<Option<RefreshMetadata>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT last_updated_ms, status, record_count, error_message
            FROM refresh_metadata
            WHERE key = ?
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let status_str: String = row.try_get("status")?;
        let status = status_str
            .parse::<RefreshStatus>()
            .map_err(StoreError::Corrupt)?;

        Ok(Some(RefreshMetadata {
            last_updated: TimeMs::new(row.try_get("last_updated_ms")?),
            status,
            record_count: row.try_get("record_count")?,
            error_message: row.try_get("error_message")?,
        }))
    }

    async fn put_metadata(
        &self,
        key: &str,
        metadata: &RefreshMetadata,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO refresh_metadata (key, last_updated_ms, status, record_count, error_message)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                last_updated_ms = excluded.last_updated_ms,
                status = excluded.status,
                record_count = excluded.record_count,
                error_message = excluded.error_message
            "#,
        )
        .bind(key)
        .bind(metadata.last_updated.as_ms())
        .bind(metadata.status.as_str())
        .bind(metadata.record_count)
        .bind(metadata.error_message.as_deref())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn try_acquire_lease(
        &self,
        key: &str,
        holder: &str,
        now: TimeMs,
        ttl_ms: i64,
    ) -> Result<bool, StoreError> {
        // The conditional DO UPDATE only fires for an expired lease, so a live
        // lease leaves zero rows affected.
        let result = sqlx::query(
            r#"
            INSERT INTO refresh_leases (key, holder, expires_at_ms)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                holder = excluded.holder,
                expires_at_ms = excluded.expires_at_ms
            WHERE refresh_leases.expires_at_ms <= ?
            "#,
        )
        .bind(key)
        .bind(holder)
        .bind(now.saturating_add_ms(ttl_ms).as_ms())
        .bind(now.as_ms())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn renew_lease(
        &self,
        key: &str,
        holder: &str,
        now: TimeMs,
        ttl_ms: i64,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE refresh_leases SET expires_at_ms = ? WHERE key = ? AND holder = ?",
        )
        .bind(now.saturating_add_ms(ttl_ms).as_ms())
        .bind(key)
        .bind(holder)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn release_lease(&self, key: &str, holder: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM refresh_leases WHERE key = ? AND holder = ?")
            .bind(key)
            .bind(holder)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::setup_test_db;
    use super::*;
    use crate::domain::CATALOG_REFRESH_KEY;

    #[tokio::test]
    async fn test_metadata_absent_until_first_write() {
        let (repo, _temp) = setup_test_db().await;
        assert!(repo.get_metadata(CATALOG_REFRESH_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_metadata_upsert_overwrites_singleton() {
        let (repo, _temp) = setup_test_db().await;

        let started = RefreshMetadata::in_progress(TimeMs::new(1000), 0);
        repo.put_metadata(CATALOG_REFRESH_KEY, &started).await.unwrap();
        assert_eq!(
            repo.get_metadata(CATALOG_REFRESH_KEY).await.unwrap(),
            Some(started)
        );

        let done = RefreshMetadata::succeeded(TimeMs::new(2000), 12, 2);
        repo.put_metadata(CATALOG_REFRESH_KEY, &done).await.unwrap();
        let loaded = repo.get_metadata(CATALOG_REFRESH_KEY).await.unwrap().unwrap();
        assert_eq!(loaded.status, RefreshStatus::Success);
        assert_eq!(loaded.record_count, 12);
        assert_eq!(loaded.error_message.as_deref(), Some("2 errors occurred"));

        let (rows,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM refresh_metadata")
            .fetch_one(repo.pool())
            .await
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn test_lease_is_exclusive_until_released() {
        let (repo, _temp) = setup_test_db().await;
        let now = TimeMs::new(10_000);

        assert!(repo
            .try_acquire_lease(CATALOG_REFRESH_KEY, "a", now, 60_000)
            .await
            .unwrap());
        assert!(!repo
            .try_acquire_lease(CATALOG_REFRESH_KEY, "b", now, 60_000)
            .await
            .unwrap());

        // Releasing with the wrong holder is a no-op.
        repo.release_lease(CATALOG_REFRESH_KEY, "b").await.unwrap();
        assert!(!repo
            .try_acquire_lease(CATALOG_REFRESH_KEY, "b", now, 60_000)
            .await
            .unwrap());

        repo.release_lease(CATALOG_REFRESH_KEY, "a").await.unwrap();
        assert!(repo
            .try_acquire_lease(CATALOG_REFRESH_KEY, "b", now, 60_000)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_expired_lease_can_be_taken_over() {
        let (repo, _temp) = setup_test_db().await;

        assert!(repo
            .try_acquire_lease(CATALOG_REFRESH_KEY, "crashed", TimeMs::new(0), 1_000)
            .await
            .unwrap());
        assert!(repo
            .try_acquire_lease(CATALOG_REFRESH_KEY, "next", TimeMs::new(1_000), 1_000)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_renewal_extends_only_the_holders_lease() {
        let (repo, _temp) = setup_test_db().await;

        assert!(repo
            .try_acquire_lease(CATALOG_REFRESH_KEY, "a", TimeMs::new(0), 1_000)
            .await
            .unwrap());
        assert!(!repo
            .renew_lease(CATALOG_REFRESH_KEY, "b", TimeMs::new(500), 1_000)
            .await
            .unwrap());
        assert!(repo
            .renew_lease(CATALOG_REFRESH_KEY, "a", TimeMs::new(500), 1_000)
            .await
            .unwrap());

        // Renewed to 1_500, so still held at 1_200.
        assert!(!repo
            .try_acquire_lease(CATALOG_REFRESH_KEY, "b", TimeMs::new(1_200), 1_000)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_renewal_fails_after_takeover_or_release() {
        let (repo, _temp) = setup_test_db().await;

        assert!(repo
            .try_acquire_lease(CATALOG_REFRESH_KEY, "slow", TimeMs::new(0), 1_000)
            .await
            .unwrap());
        assert!(repo
            .try_acquire_lease(CATALOG_REFRESH_KEY, "next", TimeMs::new(2_000), 1_000)
            .await
            .unwrap());
        assert!(!repo
            .renew_lease(CATALOG_REFRESH_KEY, "slow", TimeMs::new(2_100), 1_000)
            .await
            .unwrap());

        repo.release_lease(CATALOG_REFRESH_KEY, "next").await.unwrap();
        assert!(!repo
            .renew_lease(CATALOG_REFRESH_KEY, "next", TimeMs::new(2_200), 1_000)
            .await
            .unwrap());
    }
}
