use crate::error::RepositoryError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Approval status of a college event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Pending,
    Approved,
    Rejected,
}

impl EventStatus {
    /// Convert from database string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(EventStatus::Pending),
            "approved" => Ok(EventStatus::Approved),
            "rejected" => Ok(EventStatus::Rejected),
            _ => Err(format!("Invalid event status: {}", s)),
        }
    }

    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Pending => "pending",
            EventStatus::Approved => "approved",
            EventStatus::Rejected => "rejected",
        }
    }
}

impl From<EventStatus> for String {
    fn from(status: EventStatus) -> Self {
        status.as_str().to_string()
    }
}

/// Kind of college event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Academic,
    Sports,
    Cultural,
    Other,
}

impl EventType {
    /// Convert from database string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "academic" => Ok(EventType::Academic),
            "sports" => Ok(EventType::Sports),
            "cultural" => Ok(EventType::Cultural),
            "other" => Ok(EventType::Other),
            _ => Err(format!("Invalid event type: {}", s)),
        }
    }

    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Academic => "academic",
            EventType::Sports => "sports",
            EventType::Cultural => "cultural",
            EventType::Other => "other",
        }
    }
}

/// College event model
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CollegeEvent {
    pub id: Uuid,
    pub user_id: String, // Creator
    pub title: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub location: String,
    pub status: String, // Stored as TEXT, use EventStatus enum for type safety
    pub event_type: String, // Stored as TEXT, use EventType enum for type safety
    pub max_participants: i32,
    pub current_participants: i32,
    pub organizer: Option<String>,
    pub contact_info: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub attachments: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CollegeEvent {
    /// Get status as an enum
    pub fn status_enum(&self) -> EventStatus {
        EventStatus::from_str(&self.status).unwrap_or(EventStatus::Pending)
    }

    /// Get event type as an enum
    pub fn event_type_enum(&self) -> EventType {
        EventType::from_str(&self.event_type).unwrap_or(EventType::Other)
    }

    pub fn is_full(&self) -> bool {
        self.current_participants >= self.max_participants
    }

    pub fn is_approved(&self) -> bool {
        self.status_enum() == EventStatus::Approved
    }

    /// Check whether a user may register for this event
    pub fn check_registration(&self, already_registered: bool) -> Result<(), RepositoryError> {
        if self.is_full() {
            return Err(RepositoryError::BusinessRule("Event is full".to_string()));
        }

        if already_registered {
            return Err(RepositoryError::BusinessRule(
                "Already registered for this event".to_string(),
            ));
        }

        Ok(())
    }
}

/// Editable fields of an event, shared by create and update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub location: String,
    pub event_type: EventType,
    pub max_participants: i32,
    pub status: EventStatus,
    pub organizer: Option<String>,
    pub contact_info: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub attachments: Vec<String>,
}

impl EventDraft {
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Title is required".to_string());
        }

        if self.location.trim().is_empty() {
            return Err("Location is required".to_string());
        }

        if self.end_date < self.start_date {
            return Err("End date must be after start date".to_string());
        }

        if self.max_participants < 1 {
            return Err("Maximum participants must be at least 1".to_string());
        }

        Ok(())
    }
}

/// A user's registration for an event
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventRegistration {
    pub event_id: Uuid,
    pub user_id: String,
    pub user_full_name: String,
    pub registered_at: DateTime<Utc>,
}

/// Feedback left by a registered attendee
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventFeedback {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: String,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl EventFeedback {
    pub const MIN_RATING: i32 = 1;
    pub const MAX_RATING: i32 = 5;

    pub fn validate_rating(rating: i32) -> Result<i16, String> {
        if !(Self::MIN_RATING..=Self::MAX_RATING).contains(&rating) {
            return Err(format!(
                "Rating must be between {} and {}",
                Self::MIN_RATING,
                Self::MAX_RATING
            ));
        }
        Ok(rating as i16)
    }
}
