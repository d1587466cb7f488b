use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Membership state of a user in a hackathon group.
/// A user with no row has not asked to join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipStatus {
    Pending,
    Approved,
}

impl MembershipStatus {
    /// Convert from database string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(MembershipStatus::Pending),
            "approved" => Ok(MembershipStatus::Approved),
            _ => Err(format!("Invalid membership status: {}", s)),
        }
    }

    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipStatus::Pending => "pending",
            MembershipStatus::Approved => "approved",
        }
    }
}

impl From<MembershipStatus> for String {
    fn from(status: MembershipStatus) -> Self {
        status.as_str().to_string()
    }
}

/// Group Member model representing a user's membership in a hackathon group
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GroupMember {
    pub group_id: Uuid,
    pub user_id: String,
    pub status: String, // Stored as TEXT in DB, use MembershipStatus enum for type safety
    pub requested_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
}

impl GroupMember {
    /// Get the status as an enum
    pub fn status_enum(&self) -> MembershipStatus {
        MembershipStatus::from_str(&self.status).unwrap_or(MembershipStatus::Pending)
    }

    pub fn is_approved(&self) -> bool {
        self.status_enum() == MembershipStatus::Approved
    }
}
