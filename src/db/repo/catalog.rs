use super::Repository;
use crate::db::store::{CatalogStore, StoreError};
use crate::domain::{CatalogItem, CatalogPredicate, TimeMs};
use async_trait::async_trait;
use sqlx::sqlite::{Sqlite, SqliteRow};
use sqlx::{QueryBuilder, Row};

const ITEM_COLUMNS: &str = r#"
    id, neo_reference_id, name, nasa_jpl_url, absolute_magnitude_h,
    estimated_diameter, is_potentially_hazardous, is_sentry_object,
    close_approach_data, orbital_data, price, size
"#;

/// Orbit class codes are matched case-insensitively by storing them upper-cased.
fn normalize_orbit_type(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

fn row_to_item(row: &SqliteRow) -> Result<CatalogItem, StoreError> {
    let estimated_diameter: Option<String> = row.try_get("estimated_diameter")?;
    let close_approach_data: String = row.try_get("close_approach_data")?;
    let orbital_data: Option<String> = row.try_get("orbital_data")?;

    Ok(CatalogItem {
        id: row.try_get("id")?,
        neo_reference_id: row.try_get("neo_reference_id")?,
        name: row.try_get("name")?,
        nasa_jpl_url: row.try_get("nasa_jpl_url")?,
        absolute_magnitude_h: row.try_get("absolute_magnitude_h")?,
        estimated_diameter: estimated_diameter
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?,
        is_potentially_hazardous_asteroid: row.try_get("is_potentially_hazardous")?,
        is_sentry_object: row.try_get("is_sentry_object")?,
        close_approach_data: serde_json::from_str(&close_approach_data)?,
        orbital_data: orbital_data.as_deref().map(serde_json::from_str).transpose()?,
        price: row.try_get("price")?,
        size: row.try_get("size")?,
    })
}

#[async_trait]
impl CatalogStore for Repository {
    async fn upsert_item(&self, item: &CatalogItem) -> Result<(), StoreError> {
        let estimated_diameter = item
            .estimated_diameter
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let close_approach_data = serde_json::to_string(&item.close_approach_data)?;
        let orbital_data = item
            .orbital_data
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let orbit_class_type = item.orbit_class_type().map(normalize_orbit_type);
        let now = TimeMs::now().as_ms();

        sqlx::query(
            r#"
            INSERT INTO neos (
                id, neo_reference_id, name, nasa_jpl_url, absolute_magnitude_h,
                estimated_diameter, is_potentially_hazardous, is_sentry_object,
                close_approach_data, orbital_data, orbit_class_type, price, size,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                neo_reference_id = excluded.neo_reference_id,
                name = excluded.name,
                nasa_jpl_url = excluded.nasa_jpl_url,
                absolute_magnitude_h = excluded.absolute_magnitude_h,
                estimated_diameter = excluded.estimated_diameter,
                is_potentially_hazardous = excluded.is_potentially_hazardous,
                is_sentry_object = excluded.is_sentry_object,
                close_approach_data = excluded.close_approach_data,
                orbital_data = excluded.orbital_data,
                orbit_class_type = excluded.orbit_class_type,
                price = excluded.price,
                size = excluded.size,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&item.id)
        .bind(&item.neo_reference_id)
        .bind(&item.name)
        .bind(&item.nasa_jpl_url)
        .bind(item.absolute_magnitude_h)
        .bind(estimated_diameter)
        .bind(item.is_potentially_hazardous_asteroid)
        .bind(item.is_sentry_object)
        .bind(close_approach_data)
        .bind(orbital_data)
        .bind(orbit_class_type)
        .bind(item.price)
        .bind(item.size)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_item(&self, id: &str) -> Result<Option<CatalogItem>, StoreError> {
        let row = sqlx::query(&format!("SELECT {} FROM neos WHERE id = ?", ITEM_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_item).transpose()
    }

    async fn count_items(&self) -> Result<i64, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM neos")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn query_items(
        &self,
        predicate: &CatalogPredicate,
    ) -> Result<Vec<CatalogItem>, StoreError> {
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {} FROM neos WHERE 1 = 1", ITEM_COLUMNS));

        if let Some(hazardous) = predicate.hazardous {
            qb.push(" AND is_potentially_hazardous = ").push_bind(hazardous);
        }
        if let Some(min) = predicate.size_min {
            qb.push(" AND size >= ").push_bind(min);
        }
        if let Some(max) = predicate.size_max {
            qb.push(" AND size <= ").push_bind(max);
        }
        if let Some(min) = predicate.price_min {
            qb.push(" AND price >= ").push_bind(min);
        }
        if let Some(max) = predicate.price_max {
            qb.push(" AND price <= ").push_bind(max);
        }
        if !predicate.orbit_types.is_empty() {
            qb.push(" AND orbit_class_type IN (");
            let mut separated = qb.separated(", ");
            for orbit_type in &predicate.orbit_types {
                separated.push_bind(normalize_orbit_type(orbit_type));
            }
            separated.push_unseparated(")");
        }
        qb.push(" ORDER BY rowid ASC");

        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter().map(row_to_item).collect()
    }
}
