use crate::models::{FlatProfile, NewFlatProfile};
use sqlx::{PgPool, Result as SqlxResult};
use uuid::Uuid;

/// Repository for flat listings
pub struct FlatRepository {
    pool: PgPool,
}

impl FlatRepository {
    /// Create a new FlatRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new listing
    pub async fn create(&self, owner_id: &str, flat: &NewFlatProfile) -> SqlxResult<FlatProfile> {
        sqlx::query_as::<_, FlatProfile>(
            r#"
            INSERT INTO flat_profiles (
                owner_id, house_name, address, total_rent, max_occupancy, location,
                distance_from_college, has_wifi, has_geyser, has_parking, allows_guests
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING
                id, owner_id, house_name, address, total_rent, max_occupancy, location,
                distance_from_college, has_wifi, has_geyser, has_parking, allows_guests, created_at
            "#,
        )
        .bind(owner_id)
        .bind(flat.house_name.trim())
        .bind(flat.address.trim())
        .bind(flat.total_rent)
        .bind(flat.max_occupancy)
        .bind(flat.location.trim())
        .bind(flat.distance_from_college)
        .bind(flat.has_wifi)
        .bind(flat.has_geyser)
        .bind(flat.has_parking)
        .bind(flat.allows_guests)
        .fetch_one(&self.pool)
        .await
    }

    /// All listings, newest first
    pub async fn find_all(&self) -> SqlxResult<Vec<FlatProfile>> {
        sqlx::query_as::<_, FlatProfile>(
            r#"
            SELECT
                id, owner_id, house_name, address, total_rent, max_occupancy, location,
                distance_from_college, has_wifi, has_geyser, has_parking, allows_guests, created_at
            FROM flat_profiles
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    /// Find a listing by UUID
    pub async fn find_by_id(&self, id: Uuid) -> SqlxResult<Option<FlatProfile>> {
        sqlx::query_as::<_, FlatProfile>(
            r#"
            SELECT
                id, owner_id, house_name, address, total_rent, max_occupancy, location,
                distance_from_college, has_wifi, has_geyser, has_parking, allows_guests, created_at
            FROM flat_profiles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Delete a listing
    pub async fn delete(&self, id: Uuid) -> SqlxResult<bool> {
        let rows_affected = sqlx::query("DELETE FROM flat_profiles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }
}
