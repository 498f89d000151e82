//! Repository layer for database operations.
//!
//! This module provides the `Repository` struct for all database operations.
//! Methods are organized across submodules by table:
//! - `catalog.rs` - Catalog items (`neos`)
//! - `refresh.rs` - Refresh metadata and the refresh lease
//!
//! Ownership records live here; they belong to the user-records side of the
//! system and the catalog only reads them.

mod catalog;
mod refresh;

use crate::db::store::{OwnershipLookup, StoreError};
use crate::domain::{Owner, TimeMs};
use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;
use sqlx::Row;

/// Repository for database operations.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // =========================================================================
    // Ownership operations
    // =========================================================================

    /// Record `owner` as the current owner of `neo_id`, replacing any
    /// previous owner so at most one exists.
    ///
    /// # Errors
    /// Returns an error if the upsert fails.
    pub async fn assign_owner(&self, neo_id: &str, owner: &Owner) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO neo_owners (neo_id, user_id, display_name, acquired_at_ms)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(neo_id) DO UPDATE SET
                user_id = excluded.user_id,
                display_name = excluded.display_name,
                acquired_at_ms = excluded.acquired_at_ms
            "#,
        )
        .bind(neo_id)
        .bind(&owner.user_id)
        .bind(&owner.display_name)
        .bind(TimeMs::now().as_ms())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Remove any owner of `neo_id`. Returns whether a row was removed.
    pub async fn clear_owner(&self, neo_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM neo_owners WHERE neo_id = ?")
            .bind(neo_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl OwnershipLookup for Repository {
    async fn find_owner_of(&self, neo_id: &str) -> Result<Option<Owner>, StoreError> {
        let row = sqlx::query("SELECT user_id, display_name FROM neo_owners WHERE neo_id = ?")
            .bind(neo_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| Owner {
            user_id: r.get("user_id"),
            display_name: r.get("display_name"),
        }))
    }
}
