use crate::models::{GroupPost, PostType};
use sqlx::{PgPool, Result as SqlxResult};
use uuid::Uuid;

/// Repository for group board posts
pub struct PostRepository {
    pool: PgPool,
}

impl PostRepository {
    /// Create a new PostRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new post
    pub async fn create(
        &self,
        group_id: Uuid,
        user_id: &str,
        message: &str,
        post_type: PostType,
        added_members: &[String],
    ) -> SqlxResult<GroupPost> {
        sqlx::query_as::<_, GroupPost>(
            r#"
            INSERT INTO group_posts (group_id, user_id, message, post_type, added_members)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, group_id, user_id, message, post_type, added_members, created_at
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .bind(message)
        .bind(post_type.as_str())
        .bind(added_members)
        .fetch_one(&self.pool)
        .await
    }

    /// Posts on a group's board, oldest first
    pub async fn find_by_group(&self, group_id: Uuid) -> SqlxResult<Vec<GroupPost>> {
        sqlx::query_as::<_, GroupPost>(
            r#"
            SELECT id, group_id, user_id, message, post_type, added_members, created_at
            FROM group_posts
            WHERE group_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await
    }
}
