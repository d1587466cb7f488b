use crate::error::RepositoryError;
use crate::models::{CollegeEvent, EventDraft, EventFeedback, EventRegistration, EventStatus};
use sqlx::{PgPool, Result as SqlxResult};
use uuid::Uuid;

macro_rules! event_columns {
    () => {
        r#"
        id,
        user_id,
        title,
        description,
        start_date,
        end_date,
        location,
        status,
        event_type,
        max_participants,
        current_participants,
        organizer,
        contact_info,
        category,
        tags,
        attachments,
        created_at,
        updated_at
        "#
    };
}

/// Repository for college event data access
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    /// Create a new EventRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new event with no participants
    pub async fn create(&self, creator_id: &str, draft: &EventDraft) -> SqlxResult<CollegeEvent> {
        sqlx::query_as::<_, CollegeEvent>(concat!(
            r#"
            INSERT INTO events (
                user_id, title, description, start_date, end_date, location,
                event_type, max_participants, status, organizer, contact_info,
                category, tags, attachments
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING "#,
            event_columns!()
        ))
        .bind(creator_id)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.start_date)
        .bind(draft.end_date)
        .bind(&draft.location)
        .bind(draft.event_type.as_str())
        .bind(draft.max_participants)
        .bind(draft.status.as_str())
        .bind(&draft.organizer)
        .bind(&draft.contact_info)
        .bind(&draft.category)
        .bind(&draft.tags)
        .bind(&draft.attachments)
        .fetch_one(&self.pool)
        .await
    }

    /// Find an event by UUID
    pub async fn find_by_id(&self, id: Uuid) -> SqlxResult<Option<CollegeEvent>> {
        sqlx::query_as::<_, CollegeEvent>(concat!(
            "SELECT ",
            event_columns!(),
            " FROM events WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Replace the editable fields of an event.
    ///
    /// Capacity may not drop below the number of people already registered.
    pub async fn update(&self, id: Uuid, draft: &EventDraft) -> Result<CollegeEvent, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_scalar::<_, i32>(
            "SELECT current_participants FROM events WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| RepositoryError::NotFound("Event not found".to_string()))?;

        if draft.max_participants < current {
            return Err(RepositoryError::BusinessRule(format!(
                "Maximum participants cannot be lower than the {} already registered",
                current
            )));
        }

        let event = sqlx::query_as::<_, CollegeEvent>(concat!(
            r#"
            UPDATE events
            SET title = $2,
                description = $3,
                start_date = $4,
                end_date = $5,
                location = $6,
                event_type = $7,
                max_participants = $8,
                status = $9,
                organizer = $10,
                contact_info = $11,
                category = $12,
                tags = $13,
                attachments = $14,
                updated_at = NOW()
            WHERE id = $1
            RETURNING "#,
            event_columns!()
        ))
        .bind(id)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.start_date)
        .bind(draft.end_date)
        .bind(&draft.location)
        .bind(draft.event_type.as_str())
        .bind(draft.max_participants)
        .bind(draft.status.as_str())
        .bind(&draft.organizer)
        .bind(&draft.contact_info)
        .bind(&draft.category)
        .bind(&draft.tags)
        .bind(&draft.attachments)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(event)
    }

    /// Update event status
    pub async fn update_status(&self, id: Uuid, status: EventStatus) -> SqlxResult<Option<CollegeEvent>> {
        sqlx::query_as::<_, CollegeEvent>(concat!(
            r#"
            UPDATE events
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING "#,
            event_columns!()
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
    }

    /// Find events with the given status, newest first
    pub async fn find_by_status(&self, status: EventStatus) -> SqlxResult<Vec<CollegeEvent>> {
        sqlx::query_as::<_, CollegeEvent>(concat!(
            "SELECT ",
            event_columns!(),
            " FROM events WHERE status = $1 ORDER BY created_at DESC"
        ))
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await
    }

    /// All events, earliest start first
    pub async fn find_all_by_start(&self) -> SqlxResult<Vec<CollegeEvent>> {
        sqlx::query_as::<_, CollegeEvent>(concat!(
            "SELECT ",
            event_columns!(),
            " FROM events ORDER BY start_date ASC, created_at ASC"
        ))
        .fetch_all(&self.pool)
        .await
    }

    /// Register a user for an event.
    ///
    /// The event row is locked for the duration of the check so concurrent
    /// registrations cannot overshoot capacity.
    pub async fn register(
        &self,
        event_id: Uuid,
        user_id: &str,
        user_full_name: &str,
    ) -> Result<CollegeEvent, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let event = sqlx::query_as::<_, CollegeEvent>(concat!(
            "SELECT ",
            event_columns!(),
            " FROM events WHERE id = $1 FOR UPDATE"
        ))
        .bind(event_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| RepositoryError::NotFound("Event not found".to_string()))?;

        let already_registered = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM event_registrations
                WHERE event_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        event.check_registration(already_registered)?;

        sqlx::query(
            r#"
            INSERT INTO event_registrations (event_id, user_id, user_full_name)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .bind(user_full_name)
        .execute(&mut *tx)
        .await?;

        let updated = sqlx::query_as::<_, CollegeEvent>(concat!(
            r#"
            UPDATE events
            SET current_participants = current_participants + 1, updated_at = NOW()
            WHERE id = $1
            RETURNING "#,
            event_columns!()
        ))
        .bind(event_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Check whether a user is registered for an event
    pub async fn is_registered(&self, event_id: Uuid, user_id: &str) -> SqlxResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM event_registrations
                WHERE event_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
    }

    /// Registrations for an event, oldest first
    pub async fn registrations(&self, event_id: Uuid) -> SqlxResult<Vec<EventRegistration>> {
        sqlx::query_as::<_, EventRegistration>(
            r#"
            SELECT event_id, user_id, user_full_name, registered_at
            FROM event_registrations
            WHERE event_id = $1
            ORDER BY registered_at ASC
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Names of registered users, in registration order
    pub async fn registered_user_names(&self, event_id: Uuid) -> SqlxResult<Vec<String>> {
        let registrations = self.registrations(event_id).await?;
        Ok(registrations.into_iter().map(|r| r.user_full_name).collect())
    }

    /// Record feedback for an event
    pub async fn add_feedback(
        &self,
        event_id: Uuid,
        user_id: &str,
        rating: i16,
        comment: Option<&str>,
    ) -> SqlxResult<EventFeedback> {
        let mut tx = self.pool.begin().await?;

        let feedback = sqlx::query_as::<_, EventFeedback>(
            r#"
            INSERT INTO event_feedback (event_id, user_id, rating, comment)
            VALUES ($1, $2, $3, $4)
            RETURNING id, event_id, user_id, rating, comment, created_at
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .bind(rating)
        .bind(comment)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE events SET updated_at = NOW() WHERE id = $1")
            .bind(event_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(feedback)
    }

    /// Feedback for an event, oldest first
    pub async fn feedback_for_event(&self, event_id: Uuid) -> SqlxResult<Vec<EventFeedback>> {
        sqlx::query_as::<_, EventFeedback>(
            r#"
            SELECT id, event_id, user_id, rating, comment, created_at
            FROM event_feedback
            WHERE event_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await
    }
}
