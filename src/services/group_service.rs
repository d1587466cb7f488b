use crate::auth::Caller;
use crate::error::{option_to_result, AppError, AppResult};
use crate::models::{GroupMember, GroupPost, HackathonGroup, PostType};
use crate::repositories::{GroupMemberRepository, GroupRepository, PostRepository};
use crate::websocket::ChangeFeed;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Service for managing hackathon groups
pub struct GroupService {
    group_repo: Arc<GroupRepository>,
    member_repo: Arc<GroupMemberRepository>,
    post_repo: Arc<PostRepository>,
    feed: ChangeFeed,
}

impl GroupService {
    pub fn new(
        group_repo: Arc<GroupRepository>,
        member_repo: Arc<GroupMemberRepository>,
        post_repo: Arc<PostRepository>,
        feed: ChangeFeed,
    ) -> Self {
        Self {
            group_repo,
            member_repo,
            post_repo,
            feed,
        }
    }

    /// Create a new hackathon group with the caller as its first member
    pub async fn create_hackathon_group(
        &self,
        caller: &Caller,
        group_name: &str,
        description: Option<&str>,
        max_members: i32,
    ) -> AppResult<HackathonGroup> {
        let group_name = group_name.trim();
        if group_name.is_empty() {
            return Err(AppError::Validation("Group name is required".to_string()));
        }
        HackathonGroup::validate_max_members(max_members).map_err(AppError::Validation)?;

        info!("Creating group: name={}, creator={}", group_name, caller.user_id);

        let description = description.map(str::trim).filter(|d| !d.is_empty());
        let group = self
            .group_repo
            .create(&caller.user_id, group_name, description, max_members)
            .await?;

        info!("Created group {} ({})", group.group_name, group.id);
        self.feed.group_changed(group.id);
        Ok(group)
    }

    pub async fn get_group(&self, group_id: Uuid) -> AppResult<HackathonGroup> {
        option_to_result(self.group_repo.find_by_id(group_id).await?, "Group not found")
    }

    /// Open groups, newest first, leaving out those created by `exclude_user`
    pub async fn get_all_ongoing_hackathons(&self, exclude_user: Option<&str>) -> AppResult<Vec<HackathonGroup>> {
        let exclude_user = exclude_user.filter(|u| !u.is_empty());
        Ok(self.group_repo.find_open(exclude_user).await?)
    }

    pub async fn get_my_created_hackathons(&self, caller: &Caller) -> AppResult<Vec<HackathonGroup>> {
        Ok(self.group_repo.find_by_creator(&caller.user_id).await?)
    }

    /// Ask to join a group
    pub async fn request_to_join_group(&self, caller: &Caller, group_id: Uuid) -> AppResult<GroupMember> {
        let member = self.member_repo.request_join(group_id, &caller.user_id).await?;

        info!("{} requested to join group {}", caller.user_id, group_id);
        self.feed.group_changed(group_id);
        Ok(member)
    }

    /// Approve a pending request. Only the group's creator may do this.
    pub async fn approve_group_request(
        &self,
        caller: &Caller,
        group_id: Uuid,
        user_id: &str,
    ) -> AppResult<GroupMember> {
        let (group, member) = self
            .member_repo
            .approve(group_id, &caller.user_id, user_id)
            .await?;

        info!(
            "Approved {} into group {} ({}/{})",
            user_id, group_id, group.member_count, group.max_members
        );
        self.feed.group_changed(group_id);
        Ok(member)
    }

    /// Approved member ids, creator first
    pub async fn get_group_members(&self, group_id: Uuid) -> AppResult<Vec<String>> {
        self.get_group(group_id).await?;
        Ok(self.member_repo.approved_members(group_id).await?)
    }

    /// Pending requester ids, visible to the creator only
    pub async fn get_pending_requests(&self, caller: &Caller, group_id: Uuid) -> AppResult<Vec<String>> {
        let group = self.get_group(group_id).await?;
        if !group.is_creator(&caller.user_id) {
            return Err(AppError::Forbidden(
                "Only the creator can view join requests".to_string(),
            ));
        }
        Ok(self.member_repo.pending_members(group_id).await?)
    }

    /// Stop accepting requests. Closing a closed group is a no-op.
    pub async fn close_group(&self, caller: &Caller, group_id: Uuid) -> AppResult<HackathonGroup> {
        let group = self.get_group(group_id).await?;
        if !group.is_creator(&caller.user_id) {
            return Err(AppError::Forbidden(
                "Only the creator can close the group".to_string(),
            ));
        }

        if !group.is_open() {
            return Ok(group);
        }

        let group = option_to_result(self.group_repo.close(group_id).await?, "Group not found")?;

        info!("Closed group {}", group_id);
        self.feed.group_changed(group_id);
        Ok(group)
    }

    /// Post a message on the group board
    pub async fn post_to_group(&self, caller: &Caller, group_id: Uuid, message: &str) -> AppResult<GroupPost> {
        self.require_member(caller, group_id).await?;
        let message = GroupPost::validate_message(message).map_err(AppError::Validation)?;

        let post = self
            .post_repo
            .create(group_id, &caller.user_id, message, PostType::Message, &[])
            .await?;

        self.feed.group_changed(group_id);
        Ok(post)
    }

    pub async fn get_group_posts(&self, caller: &Caller, group_id: Uuid) -> AppResult<Vec<GroupPost>> {
        self.require_member(caller, group_id).await?;
        Ok(self.post_repo.find_by_group(group_id).await?)
    }

    async fn require_member(&self, caller: &Caller, group_id: Uuid) -> AppResult<()> {
        self.get_group(group_id).await?;
        if !self.member_repo.is_member(group_id, &caller.user_id).await? {
            return Err(AppError::Forbidden("Only members can post".to_string()));
        }
        Ok(())
    }
}
