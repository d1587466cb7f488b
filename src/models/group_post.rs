use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostType {
    Message,
    MemberAdded,
}

impl PostType {
    /// Convert from database string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s {
            "message" => Ok(PostType::Message),
            "member_added" => Ok(PostType::MemberAdded),
            _ => Err(format!("Invalid post type: {}", s)),
        }
    }

    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            PostType::Message => "message",
            PostType::MemberAdded => "member_added",
        }
    }
}

/// Entry on a group's activity board
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GroupPost {
    pub id: Uuid,
    pub group_id: Uuid,
    pub user_id: String,
    pub message: String,
    pub post_type: String,
    pub added_members: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl GroupPost {
    pub const MAX_MESSAGE_LEN: usize = 2000;

    pub fn post_type_enum(&self) -> PostType {
        PostType::from_str(&self.post_type).unwrap_or(PostType::Message)
    }

    /// Trimmed message body, or the reason it cannot be posted
    pub fn validate_message(message: &str) -> Result<&str, String> {
        let trimmed = message.trim();
        if trimmed.is_empty() {
            return Err("Message cannot be empty".to_string());
        }
        if trimmed.chars().count() > Self::MAX_MESSAGE_LEN {
            return Err(format!(
                "Message cannot exceed {} characters",
                Self::MAX_MESSAGE_LEN
            ));
        }
        Ok(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_validation() {
        assert_eq!(GroupPost::validate_message("  hi team ").unwrap(), "hi team");
        assert!(GroupPost::validate_message("   ").is_err());
        assert!(GroupPost::validate_message(&"x".repeat(2001)).is_err());
    }

    #[test]
    fn test_post_type_strings() {
        assert_eq!(PostType::from_str("member_added").unwrap(), PostType::MemberAdded);
        assert_eq!(PostType::Message.as_str(), "message");
    }
}
