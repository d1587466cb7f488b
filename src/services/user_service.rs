use crate::auth::Caller;
use crate::error::{option_to_result, AppResult};
use crate::models::User;
use crate::repositories::{GroupMemberRepository, UserRepository};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// A user's profile together with the groups they belong to
#[derive(Debug)]
pub struct UserProfile {
    pub user: User,
    pub group_ids: Vec<Uuid>,
}

/// Service for user profiles
pub struct UserService {
    user_repo: Arc<UserRepository>,
    member_repo: Arc<GroupMemberRepository>,
}

impl UserService {
    pub fn new(user_repo: Arc<UserRepository>, member_repo: Arc<GroupMemberRepository>) -> Self {
        Self {
            user_repo,
            member_repo,
        }
    }

    /// Store the caller's profile, refreshing name and email from the identity
    pub async fn sync_user(
        &self,
        caller: &Caller,
        phone_number: Option<&str>,
        profile_picture: Option<&str>,
    ) -> AppResult<UserProfile> {
        let user = self
            .user_repo
            .upsert(
                &caller.user_id,
                caller.display_name(),
                &caller.email,
                phone_number,
                profile_picture,
            )
            .await?;

        debug!("Synced user {}", user.id);
        self.with_groups(user).await
    }

    pub async fn get_user(&self, user_id: &str) -> AppResult<UserProfile> {
        let user = option_to_result(self.user_repo.find_by_id(user_id).await?, "User not found")?;
        self.with_groups(user).await
    }

    async fn with_groups(&self, user: User) -> AppResult<UserProfile> {
        let group_ids = self.member_repo.groups_for_user(&user.id).await?;
        Ok(UserProfile { user, group_ids })
    }
}
