//! Domain models for the Campus Hub backend.
//!
//! This module contains all database-backed models representing
//! the core entities of the platform, together with the membership
//! and capacity rules that guard them.

pub mod event;
pub mod flat_profile;
pub mod group_member;
pub mod group_post;
pub mod hackathon_group;
pub mod user;

// Re-export all models for convenient access
pub use event::{CollegeEvent, EventDraft, EventFeedback, EventRegistration, EventStatus, EventType};
pub use flat_profile::{FlatProfile, FlatSearch, NewFlatProfile};
pub use group_member::{GroupMember, MembershipStatus};
pub use group_post::{GroupPost, PostType};
pub use hackathon_group::{GroupStatus, HackathonGroup};
pub use user::{User, UserStatus};

use chrono::{DateTime, TimeZone, Utc};

/// Convert a timestamp to Unix epoch milliseconds (wire format)
pub fn to_millis(dt: DateTime<Utc>) -> i64 {
    dt.timestamp_millis()
}

/// Parse Unix epoch milliseconds (wire format)
pub fn from_millis(ms: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms).single()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_millis_round_trip() {
        let ms = 1_735_689_600_123;
        let dt = from_millis(ms).unwrap();
        assert_eq!(to_millis(dt), ms);
    }
}
