use crate::error::RepositoryError;
use crate::models::{GroupStatus, HackathonGroup, MembershipStatus};
use sqlx::{PgPool, Result as SqlxResult};
use uuid::Uuid;

/// Repository for hackathon group data access
pub struct GroupRepository {
    pool: PgPool,
}

impl GroupRepository {
    /// Create a new GroupRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new open group with its creator as the first approved member
    pub async fn create(
        &self,
        creator_id: &str,
        group_name: &str,
        description: Option<&str>,
        max_members: i32,
    ) -> Result<HackathonGroup, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let group = sqlx::query_as::<_, HackathonGroup>(
            r#"
            INSERT INTO hackathon_groups (group_name, description, creator_id, status, member_count, max_members)
            VALUES ($1, $2, $3, $4, 1, $5)
            RETURNING id, group_name, description, creator_id, status, member_count, max_members, group_image, created_at
            "#,
        )
        .bind(group_name)
        .bind(description)
        .bind(creator_id)
        .bind(GroupStatus::Open.as_str())
        .bind(max_members)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO group_members (group_id, user_id, status, requested_at, approved_at)
            VALUES ($1, $2, $3, $4, $4)
            "#,
        )
        .bind(group.id)
        .bind(creator_id)
        .bind(MembershipStatus::Approved.as_str())
        .bind(group.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(group)
    }

    /// Find a group by UUID
    pub async fn find_by_id(&self, id: Uuid) -> SqlxResult<Option<HackathonGroup>> {
        sqlx::query_as::<_, HackathonGroup>(
            r#"
            SELECT id, group_name, description, creator_id, status, member_count, max_members, group_image, created_at
            FROM hackathon_groups
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Open groups, newest first, optionally leaving out one creator's groups
    pub async fn find_open(&self, exclude_creator: Option<&str>) -> SqlxResult<Vec<HackathonGroup>> {
        sqlx::query_as::<_, HackathonGroup>(
            r#"
            SELECT id, group_name, description, creator_id, status, member_count, max_members, group_image, created_at
            FROM hackathon_groups
            WHERE status = 'open'
                AND ($1::TEXT IS NULL OR creator_id <> $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(exclude_creator)
        .fetch_all(&self.pool)
        .await
    }

    /// Groups created by a user, newest first
    pub async fn find_by_creator(&self, creator_id: &str) -> SqlxResult<Vec<HackathonGroup>> {
        sqlx::query_as::<_, HackathonGroup>(
            r#"
            SELECT id, group_name, description, creator_id, status, member_count, max_members, group_image, created_at
            FROM hackathon_groups
            WHERE creator_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(creator_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Mark a group closed
    pub async fn close(&self, id: Uuid) -> SqlxResult<Option<HackathonGroup>> {
        sqlx::query_as::<_, HackathonGroup>(
            r#"
            UPDATE hackathon_groups
            SET status = $2
            WHERE id = $1
            RETURNING id, group_name, description, creator_id, status, member_count, max_members, group_image, created_at
            "#,
        )
        .bind(id)
        .bind(GroupStatus::Closed.as_str())
        .fetch_optional(&self.pool)
        .await
    }
}
