use crate::error::RepositoryError;
use crate::models::{GroupMember, HackathonGroup, MembershipStatus, PostType};
use sqlx::{PgConnection, PgPool, Result as SqlxResult};
use uuid::Uuid;

/// Repository for group membership data access
pub struct GroupMemberRepository {
    pool: PgPool,
}

/// Lock a group row for the rest of the transaction
async fn lock_group(conn: &mut PgConnection, group_id: Uuid) -> Result<HackathonGroup, RepositoryError> {
    sqlx::query_as::<_, HackathonGroup>(
        r#"
        SELECT id, group_name, description, creator_id, status, member_count, max_members, group_image, created_at
        FROM hackathon_groups
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(group_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| RepositoryError::NotFound("Group not found".to_string()))
}

async fn membership_of(
    conn: &mut PgConnection,
    group_id: Uuid,
    user_id: &str,
) -> SqlxResult<Option<MembershipStatus>> {
    let status = sqlx::query_scalar::<_, String>(
        "SELECT status FROM group_members WHERE group_id = $1 AND user_id = $2",
    )
    .bind(group_id)
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(status.and_then(|s| MembershipStatus::from_str(&s).ok()))
}

impl GroupMemberRepository {
    /// Create a new GroupMemberRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// File a pending join request
    pub async fn request_join(&self, group_id: Uuid, user_id: &str) -> Result<GroupMember, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let group = lock_group(&mut tx, group_id).await?;
        let membership = membership_of(&mut tx, group_id, user_id).await?;
        group.check_join_request(membership)?;

        let member = sqlx::query_as::<_, GroupMember>(
            r#"
            INSERT INTO group_members (group_id, user_id, status)
            VALUES ($1, $2, $3)
            RETURNING group_id, user_id, status, requested_at, approved_at
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .bind(MembershipStatus::Pending.as_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(member)
    }

    /// Approve a pending request on behalf of `approver_id`.
    ///
    /// Bumps the member count and records a `member_added` post in the same
    /// transaction.
    pub async fn approve(
        &self,
        group_id: Uuid,
        approver_id: &str,
        user_id: &str,
    ) -> Result<(HackathonGroup, GroupMember), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let group = lock_group(&mut tx, group_id).await?;
        let membership = membership_of(&mut tx, group_id, user_id).await?;
        group.check_approval(approver_id, membership)?;

        let member = sqlx::query_as::<_, GroupMember>(
            r#"
            UPDATE group_members
            SET status = $3, approved_at = NOW()
            WHERE group_id = $1 AND user_id = $2
            RETURNING group_id, user_id, status, requested_at, approved_at
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .bind(MembershipStatus::Approved.as_str())
        .fetch_one(&mut *tx)
        .await?;

        let group = sqlx::query_as::<_, HackathonGroup>(
            r#"
            UPDATE hackathon_groups
            SET member_count = member_count + 1
            WHERE id = $1
            RETURNING id, group_name, description, creator_id, status, member_count, max_members, group_image, created_at
            "#,
        )
        .bind(group_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO group_posts (group_id, user_id, message, post_type, added_members)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(group_id)
        .bind(approver_id)
        .bind(format!("{} joined the team", user_id))
        .bind(PostType::MemberAdded.as_str())
        .bind(vec![user_id.to_string()])
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((group, member))
    }

    /// Membership state of a user, `None` if they never asked to join
    pub async fn membership(&self, group_id: Uuid, user_id: &str) -> SqlxResult<Option<MembershipStatus>> {
        let mut conn = self.pool.acquire().await?;
        membership_of(&mut conn, group_id, user_id).await
    }

    /// Check if a user is an approved member of a group
    pub async fn is_member(&self, group_id: Uuid, user_id: &str) -> SqlxResult<bool> {
        Ok(self.membership(group_id, user_id).await? == Some(MembershipStatus::Approved))
    }

    /// Approved member ids in join order (creator first)
    pub async fn approved_members(&self, group_id: Uuid) -> SqlxResult<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT user_id
            FROM group_members
            WHERE group_id = $1 AND status = 'approved'
            ORDER BY approved_at ASC, requested_at ASC
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Pending requester ids, oldest request first
    pub async fn pending_members(&self, group_id: Uuid) -> SqlxResult<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT user_id
            FROM group_members
            WHERE group_id = $1 AND status = 'pending'
            ORDER BY requested_at ASC
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Groups a user has been approved into, most recent first
    pub async fn groups_for_user(&self, user_id: &str) -> SqlxResult<Vec<Uuid>> {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT group_id
            FROM group_members
            WHERE user_id = $1 AND status = 'approved'
            ORDER BY approved_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }
}
