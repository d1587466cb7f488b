use crate::error::RepositoryError;
use crate::models::MembershipStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Whether a group still accepts join requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupStatus {
    Open,
    Closed,
}

impl GroupStatus {
    /// Convert from database string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "open" => Ok(GroupStatus::Open),
            "closed" => Ok(GroupStatus::Closed),
            _ => Err(format!("Invalid group status: {}", s)),
        }
    }

    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupStatus::Open => "open",
            GroupStatus::Closed => "closed",
        }
    }
}

/// Hackathon team looking for members
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct HackathonGroup {
    pub id: Uuid,
    pub group_name: String,
    pub description: Option<String>,
    pub creator_id: String,
    pub status: String, // Stored as TEXT, use GroupStatus enum for type safety
    pub member_count: i32,
    pub max_members: i32,
    pub group_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl HackathonGroup {
    pub const MIN_MEMBERS: i32 = 2;
    pub const MAX_MEMBERS: i32 = 10;

    /// Get status as an enum
    pub fn status_enum(&self) -> GroupStatus {
        GroupStatus::from_str(&self.status).unwrap_or(GroupStatus::Open)
    }

    pub fn is_open(&self) -> bool {
        self.status_enum() == GroupStatus::Open
    }

    pub fn is_full(&self) -> bool {
        self.member_count >= self.max_members
    }

    pub fn is_creator(&self, user_id: &str) -> bool {
        self.creator_id == user_id
    }

    /// Validate the team size requested at creation
    pub fn validate_max_members(max_members: i32) -> Result<(), String> {
        if !(Self::MIN_MEMBERS..=Self::MAX_MEMBERS).contains(&max_members) {
            return Err(format!(
                "Max members must be between {} and {}",
                Self::MIN_MEMBERS,
                Self::MAX_MEMBERS
            ));
        }
        Ok(())
    }

    /// Check whether a user with the given membership may ask to join
    pub fn check_join_request(
        &self,
        membership: Option<MembershipStatus>,
    ) -> Result<(), RepositoryError> {
        if !self.is_open() {
            return Err(RepositoryError::BusinessRule("Group is closed".to_string()));
        }

        if self.is_full() {
            return Err(RepositoryError::BusinessRule("Group is full".to_string()));
        }

        match membership {
            Some(MembershipStatus::Pending) => Err(RepositoryError::BusinessRule(
                "Already requested to join".to_string(),
            )),
            Some(MembershipStatus::Approved) => {
                Err(RepositoryError::BusinessRule("Already a member".to_string()))
            }
            None => Ok(()),
        }
    }

    /// Check whether `approver_id` may approve a user with the given membership
    pub fn check_approval(
        &self,
        approver_id: &str,
        membership: Option<MembershipStatus>,
    ) -> Result<(), RepositoryError> {
        if !self.is_creator(approver_id) {
            return Err(RepositoryError::BusinessRule(
                "Only the creator can approve requests".to_string(),
            ));
        }

        if membership != Some(MembershipStatus::Pending) {
            return Err(RepositoryError::BusinessRule(
                "No pending request found".to_string(),
            ));
        }

        if !self.is_open() {
            return Err(RepositoryError::BusinessRule("Group is closed".to_string()));
        }

        if self.is_full() {
            return Err(RepositoryError::BusinessRule("Group is full".to_string()));
        }

        Ok(())
    }
}
