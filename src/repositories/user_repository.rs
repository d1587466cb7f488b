use crate::models::{User, UserStatus};
use sqlx::{PgPool, Result as SqlxResult};

/// Repository for user data access
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new UserRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert or refresh a user profile.
    ///
    /// Name and email always follow the identity claims; phone number and
    /// picture are only overwritten when provided.
    pub async fn upsert(
        &self,
        id: &str,
        name: &str,
        email: &str,
        phone_number: Option<&str>,
        profile_picture: Option<&str>,
    ) -> SqlxResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, email, phone_number, profile_picture, status)
            VALUES ($1, $2, $3, COALESCE($4, ''), $5, $6)
            ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name,
                email = EXCLUDED.email,
                phone_number = COALESCE($4, users.phone_number),
                profile_picture = COALESCE($5, users.profile_picture)
            RETURNING id, name, email, phone_number, status, profile_picture, created_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(phone_number)
        .bind(profile_picture)
        .bind(UserStatus::Active.as_str())
        .fetch_one(&self.pool)
        .await
    }

    /// Find a user by id
    pub async fn find_by_id(&self, id: &str) -> SqlxResult<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, phone_number, status, profile_picture, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Find a user by email (case-insensitive)
    pub async fn find_by_email(&self, email: &str) -> SqlxResult<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, phone_number, status, profile_picture, created_at
            FROM users
            WHERE LOWER(email) = LOWER($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }
}
