use crate::auth::Caller;
use crate::error::{option_to_result, AppError, AppResult};
use crate::models::{CollegeEvent, EventDraft, EventFeedback, EventStatus};
use crate::repositories::EventRepository;
use crate::websocket::ChangeFeed;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

const ADMIN_ONLY: &str = "Only admins can manage events";

/// Service for managing college events
pub struct EventService {
    event_repo: Arc<EventRepository>,
    feed: ChangeFeed,
}

impl EventService {
    pub fn new(event_repo: Arc<EventRepository>, feed: ChangeFeed) -> Self {
        Self { event_repo, feed }
    }

    /// Create a new college event
    pub async fn create_college_event(&self, caller: &Caller, draft: EventDraft) -> AppResult<CollegeEvent> {
        caller.require_admin(ADMIN_ONLY)?;
        draft.validate().map_err(AppError::Validation)?;

        info!("Creating event: title={}, creator={}", draft.title, caller.user_id);

        let event = self.event_repo.create(&caller.user_id, &draft).await?;

        info!("Created event {} ({})", event.title, event.id);
        self.feed.event_changed(event.id);
        Ok(event)
    }

    /// Replace an event's editable fields
    pub async fn update_college_event(
        &self,
        caller: &Caller,
        event_id: Uuid,
        draft: EventDraft,
    ) -> AppResult<CollegeEvent> {
        caller.require_admin(ADMIN_ONLY)?;
        draft.validate().map_err(AppError::Validation)?;

        let event = self.event_repo.update(event_id, &draft).await?;

        info!("Updated event {} by {}", event_id, caller.user_id);
        self.feed.event_changed(event_id);
        Ok(event)
    }

    /// Move an event between pending, approved and rejected
    pub async fn update_event_status(
        &self,
        caller: &Caller,
        event_id: Uuid,
        status: EventStatus,
    ) -> AppResult<CollegeEvent> {
        caller.require_admin(ADMIN_ONLY)?;

        let event = option_to_result(
            self.event_repo.update_status(event_id, status).await?,
            "Event not found",
        )?;

        info!("Event {} is now {}", event_id, status.as_str());
        self.feed.event_changed(event_id);
        Ok(event)
    }

    pub async fn get_event(&self, event_id: Uuid) -> AppResult<CollegeEvent> {
        option_to_result(self.event_repo.find_by_id(event_id).await?, "Event not found")
    }

    /// Events with the given status, newest first
    pub async fn get_events_by_status(&self, status: EventStatus) -> AppResult<Vec<CollegeEvent>> {
        Ok(self.event_repo.find_by_status(status).await?)
    }

    /// All events, earliest start first
    pub async fn get_ongoing_and_upcoming_events(&self) -> AppResult<Vec<CollegeEvent>> {
        Ok(self.event_repo.find_all_by_start().await?)
    }

    /// Register the caller for an event
    pub async fn register_for_event(&self, caller: &Caller, event_id: Uuid) -> AppResult<CollegeEvent> {
        let event = self
            .event_repo
            .register(event_id, &caller.user_id, caller.display_name())
            .await?;

        info!(
            "Registered {} for event {} ({}/{})",
            caller.user_id, event_id, event.current_participants, event.max_participants
        );
        self.feed.event_changed(event_id);
        Ok(event)
    }

    /// Leave feedback on an event the caller registered for
    pub async fn add_event_feedback(
        &self,
        caller: &Caller,
        event_id: Uuid,
        rating: i32,
        comment: Option<&str>,
    ) -> AppResult<EventFeedback> {
        self.get_event(event_id).await?;

        if !self.event_repo.is_registered(event_id, &caller.user_id).await? {
            return Err(AppError::Forbidden(
                "Only registered users can provide feedback".to_string(),
            ));
        }

        let rating = EventFeedback::validate_rating(rating).map_err(AppError::Validation)?;
        let comment = comment.map(str::trim).filter(|c| !c.is_empty());

        let feedback = self
            .event_repo
            .add_feedback(event_id, &caller.user_id, rating, comment)
            .await?;

        info!("Feedback {} recorded for event {}", feedback.id, event_id);
        self.feed.event_changed(event_id);
        Ok(feedback)
    }

    pub async fn get_event_feedback(&self, event_id: Uuid) -> AppResult<Vec<EventFeedback>> {
        self.get_event(event_id).await?;
        Ok(self.event_repo.feedback_for_event(event_id).await?)
    }

    /// Names of registered users, in registration order
    pub async fn get_registered_user_names(&self, event_id: Uuid) -> AppResult<Vec<String>> {
        self.get_event(event_id).await?;
        Ok(self.event_repo.registered_user_names(event_id).await?)
    }
}
