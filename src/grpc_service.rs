//! gRPC service implementation for Campus Hub
//!
//! This module implements the CampusService gRPC handlers using tonic.
//! The proto definitions are compiled at build time via build.rs.

use crate::auth::{Caller, IdentityVerifier};
use crate::error::AppError;
use crate::models::{
    from_millis, to_millis, CollegeEvent, EventDraft, EventFeedback, EventStatus, EventType,
    FlatProfile, FlatSearch, GroupMember, GroupPost, HackathonGroup, NewFlatProfile,
};
use crate::services::UserProfile;
use crate::AppState;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use tonic::{Request, Response, Status};
use tracing::info;
use uuid::Uuid;

// Include the generated proto code
pub mod proto {
    tonic::include_proto!("campus");

    /// File descriptor set for gRPC reflection
    pub const FILE_DESCRIPTOR_SET: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/campus_descriptor.bin"));
}

use proto::campus_service_server::{CampusService, CampusServiceServer};
use proto::{
    AddEventFeedbackRequest, AddFlatProfileRequest, ApproveGroupRequestRequest,
    CreateCollegeEventRequest, CreateHackathonGroupRequest, DeleteFlatProfileRequest,
    DeleteFlatProfileResponse, Empty, EventFields, EventListResponse, EventResponse,
    FeedbackListResponse, FeedbackResponse, FlatListResponse, FlatResponse,
    GetAllOngoingHackathonsRequest, GetEventRequest, GetEventsByStatusRequest, GetUserRequest,
    GroupListResponse, GroupMembersResponse, GroupRequest, GroupResponse, MembershipResponse,
    PostListResponse, PostResponse, PostToGroupRequest, RegisterForEventRequest,
    RegisteredUserNamesResponse, SearchFlatProfilesRequest, SyncUserRequest,
    UpdateCollegeEventRequest, UpdateEventStatusRequest, UserResponse,
};

/// gRPC service implementation
pub struct CampusGrpcService {
    app_state: Arc<AppState>,
    verifier: IdentityVerifier,
}

impl CampusGrpcService {
    /// Create a new gRPC service
    pub fn new(app_state: Arc<AppState>, verifier: IdentityVerifier) -> Self {
        Self { app_state, verifier }
    }

    /// Create a tonic server for this service
    pub fn into_server(self) -> CampusServiceServer<Self> {
        CampusServiceServer::new(self)
    }

    /// Authenticate the caller from request metadata
    fn caller<T>(&self, request: &Request<T>) -> Result<Caller, Status> {
        self.verifier
            .caller_from_metadata(request.metadata())
            .map_err(Status::from)
    }

    /// Helper to parse UUID from string
    fn parse_uuid(s: &str, field_name: &str) -> Result<Uuid, Status> {
        Uuid::parse_str(s.trim())
            .map_err(|_| Status::invalid_argument(format!("Invalid {}: {}", field_name, s)))
    }
}

fn parse_decimal(s: &str, field_name: &str) -> Result<Decimal, Status> {
    Decimal::from_str(s.trim())
        .map_err(|_| Status::invalid_argument(format!("Invalid {}: {}", field_name, s)))
}

fn parse_optional_decimal(s: Option<&str>, field_name: &str) -> Result<Option<Decimal>, Status> {
    match s.map(str::trim) {
        Some(s) if !s.is_empty() => parse_decimal(s, field_name).map(Some),
        _ => Ok(None),
    }
}

fn parse_event_status(s: &str) -> Result<EventStatus, Status> {
    EventStatus::from_str(s.trim()).map_err(Status::invalid_argument)
}

fn parse_timestamp(ms: i64, field_name: &str) -> Result<chrono::DateTime<chrono::Utc>, Status> {
    if ms <= 0 {
        return Err(Status::invalid_argument(format!("{} is required", field_name)));
    }
    from_millis(ms).ok_or_else(|| Status::invalid_argument(format!("Invalid {}", field_name)))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Convert wire event fields into a draft. An empty status means pending.
fn event_draft(fields: Option<EventFields>) -> Result<EventDraft, Status> {
    let fields = fields.ok_or_else(|| Status::invalid_argument("event is required"))?;

    let status = if fields.status.trim().is_empty() {
        EventStatus::Pending
    } else {
        parse_event_status(&fields.status)?
    };

    Ok(EventDraft {
        title: fields.title.trim().to_string(),
        description: fields.description,
        start_date: parse_timestamp(fields.start_date, "start_date")?,
        end_date: parse_timestamp(fields.end_date, "end_date")?,
        location: fields.location.trim().to_string(),
        event_type: EventType::from_str(fields.event_type.trim()).map_err(Status::invalid_argument)?,
        max_participants: fields.max_participants,
        status,
        organizer: non_empty(fields.organizer),
        contact_info: non_empty(fields.contact_info),
        category: non_empty(fields.category),
        tags: fields.tags,
        attachments: fields.attachments,
    })
}

impl From<CollegeEvent> for EventResponse {
    fn from(event: CollegeEvent) -> Self {
        Self {
            event_id: event.id.to_string(),
            user_id: event.user_id,
            title: event.title,
            description: event.description,
            start_date: to_millis(event.start_date),
            end_date: to_millis(event.end_date),
            location: event.location,
            status: event.status,
            event_type: event.event_type,
            max_participants: event.max_participants,
            current_participants: event.current_participants,
            organizer: event.organizer,
            contact_info: event.contact_info,
            category: event.category,
            tags: event.tags,
            attachments: event.attachments,
            created_at: to_millis(event.created_at),
            updated_at: to_millis(event.updated_at),
        }
    }
}

impl From<EventFeedback> for FeedbackResponse {
    fn from(feedback: EventFeedback) -> Self {
        Self {
            feedback_id: feedback.id.to_string(),
            event_id: feedback.event_id.to_string(),
            user_id: feedback.user_id,
            rating: i32::from(feedback.rating),
            comment: feedback.comment,
            created_at: to_millis(feedback.created_at),
        }
    }
}

impl From<HackathonGroup> for GroupResponse {
    fn from(group: HackathonGroup) -> Self {
        Self {
            group_id: group.id.to_string(),
            group_name: group.group_name,
            description: group.description,
            creator_id: group.creator_id,
            status: group.status,
            member_count: group.member_count,
            max_members: group.max_members,
            group_image: group.group_image,
            created_at: to_millis(group.created_at),
        }
    }
}

impl From<GroupMember> for MembershipResponse {
    fn from(member: GroupMember) -> Self {
        Self {
            group_id: member.group_id.to_string(),
            user_id: member.user_id,
            status: member.status,
            requested_at: to_millis(member.requested_at),
            approved_at: member.approved_at.map(to_millis),
        }
    }
}

impl From<GroupPost> for PostResponse {
    fn from(post: GroupPost) -> Self {
        Self {
            post_id: post.id.to_string(),
            group_id: post.group_id.to_string(),
            user_id: post.user_id,
            message: post.message,
            post_type: post.post_type,
            added_members: post.added_members,
            created_at: to_millis(post.created_at),
        }
    }
}

impl From<FlatProfile> for FlatResponse {
    fn from(flat: FlatProfile) -> Self {
        let rent_per_person = flat.rent_per_person();
        Self {
            flat_id: flat.id.to_string(),
            owner_id: flat.owner_id,
            house_name: flat.house_name,
            address: flat.address,
            total_rent: flat.total_rent.to_string(),
            max_occupancy: flat.max_occupancy,
            location: flat.location,
            distance_from_college: flat.distance_from_college.to_string(),
            has_wifi: flat.has_wifi,
            has_geyser: flat.has_geyser,
            has_parking: flat.has_parking,
            allows_guests: flat.allows_guests,
            rent_per_person: rent_per_person.to_string(),
            created_at: to_millis(flat.created_at),
        }
    }
}

impl From<UserProfile> for UserResponse {
    fn from(profile: UserProfile) -> Self {
        let user = profile.user;
        let status = user.status_enum().as_str().to_string();
        Self {
            user_id: user.id,
            name: user.name,
            email: user.email,
            phone_number: user.phone_number,
            status,
            profile_picture: user.profile_picture,
            group_ids: profile.group_ids.iter().map(Uuid::to_string).collect(),
            created_at: to_millis(user.created_at),
        }
    }
}

impl TryFrom<AddFlatProfileRequest> for NewFlatProfile {
    type Error = Status;

    fn try_from(req: AddFlatProfileRequest) -> Result<Self, Status> {
        Ok(Self {
            total_rent: parse_decimal(&req.total_rent, "total_rent")?,
            distance_from_college: parse_decimal(&req.distance_from_college, "distance_from_college")?,
            house_name: req.house_name.trim().to_string(),
            address: req.address.trim().to_string(),
            max_occupancy: req.max_occupancy,
            location: req.location.trim().to_string(),
            has_wifi: req.has_wifi,
            has_geyser: req.has_geyser,
            has_parking: req.has_parking,
            allows_guests: req.allows_guests,
        })
    }
}

impl TryFrom<SearchFlatProfilesRequest> for FlatSearch {
    type Error = Status;

    fn try_from(req: SearchFlatProfilesRequest) -> Result<Self, Status> {
        Ok(Self {
            max_rent_per_person: parse_optional_decimal(req.max_rent_per_person.as_deref(), "max_rent_per_person")?,
            max_distance: parse_optional_decimal(req.max_distance.as_deref(), "max_distance")?,
            location: non_empty(req.location),
            needs_wifi: req.needs_wifi,
            needs_geyser: req.needs_geyser,
            needs_parking: req.needs_parking,
            needs_guests: req.needs_guests,
        })
    }
}

fn event_list(events: Vec<CollegeEvent>) -> EventListResponse {
    EventListResponse {
        events: events.into_iter().map(EventResponse::from).collect(),
    }
}

fn group_list(groups: Vec<HackathonGroup>) -> GroupListResponse {
    GroupListResponse {
        groups: groups.into_iter().map(GroupResponse::from).collect(),
    }
}

fn flat_list(flats: Vec<FlatProfile>) -> FlatListResponse {
    FlatListResponse {
        flats: flats.into_iter().map(FlatResponse::from).collect(),
    }
}

#[tonic::async_trait]
impl CampusService for CampusGrpcService {
    /// Create a college event (admins only)
    async fn create_college_event(
        &self,
        request: Request<CreateCollegeEventRequest>,
    ) -> Result<Response<EventResponse>, Status> {
        let caller = self.caller(&request)?;
        let req = request.into_inner();
        let draft = event_draft(req.event)?;

        info!("CreateCollegeEvent request: title={}, caller={}", draft.title, caller.user_id);

        let event = self
            .app_state
            .event_service
            .create_college_event(&caller, draft)
            .await?;

        Ok(Response::new(event.into()))
    }

    async fn update_college_event(
        &self,
        request: Request<UpdateCollegeEventRequest>,
    ) -> Result<Response<EventResponse>, Status> {
        let caller = self.caller(&request)?;
        let req = request.into_inner();
        let event_id = Self::parse_uuid(&req.event_id, "event_id")?;
        let draft = event_draft(req.event)?;

        info!("UpdateCollegeEvent request: event={}", event_id);

        let event = self
            .app_state
            .event_service
            .update_college_event(&caller, event_id, draft)
            .await?;

        Ok(Response::new(event.into()))
    }

    async fn update_event_status(
        &self,
        request: Request<UpdateEventStatusRequest>,
    ) -> Result<Response<EventResponse>, Status> {
        let caller = self.caller(&request)?;
        let req = request.into_inner();
        let event_id = Self::parse_uuid(&req.event_id, "event_id")?;
        let status = parse_event_status(&req.status)?;

        info!("UpdateEventStatus request: event={}, status={}", event_id, status.as_str());

        let event = self
            .app_state
            .event_service
            .update_event_status(&caller, event_id, status)
            .await?;

        Ok(Response::new(event.into()))
    }

    async fn get_event(&self, request: Request<GetEventRequest>) -> Result<Response<EventResponse>, Status> {
        self.caller(&request)?;
        let event_id = Self::parse_uuid(&request.get_ref().event_id, "event_id")?;

        info!("GetEvent request: event={}", event_id);

        let event = self.app_state.event_service.get_event(event_id).await?;
        Ok(Response::new(event.into()))
    }

    async fn get_events_by_status(
        &self,
        request: Request<GetEventsByStatusRequest>,
    ) -> Result<Response<EventListResponse>, Status> {
        self.caller(&request)?;
        let status = parse_event_status(&request.get_ref().status)?;

        info!("GetEventsByStatus request: status={}", status.as_str());

        let events = self.app_state.event_service.get_events_by_status(status).await?;
        Ok(Response::new(event_list(events)))
    }

    async fn get_ongoing_and_upcoming_events(
        &self,
        request: Request<Empty>,
    ) -> Result<Response<EventListResponse>, Status> {
        self.caller(&request)?;

        info!("GetOngoingAndUpcomingEvents request");

        let events = self
            .app_state
            .event_service
            .get_ongoing_and_upcoming_events()
            .await?;
        Ok(Response::new(event_list(events)))
    }

    async fn register_for_event(
        &self,
        request: Request<RegisterForEventRequest>,
    ) -> Result<Response<EventResponse>, Status> {
        let caller = self.caller(&request)?;
        let event_id = Self::parse_uuid(&request.get_ref().event_id, "event_id")?;

        info!("RegisterForEvent request: event={}, user={}", event_id, caller.user_id);

        let event = self
            .app_state
            .event_service
            .register_for_event(&caller, event_id)
            .await?;

        Ok(Response::new(event.into()))
    }

    async fn add_event_feedback(
        &self,
        request: Request<AddEventFeedbackRequest>,
    ) -> Result<Response<FeedbackResponse>, Status> {
        let caller = self.caller(&request)?;
        let req = request.into_inner();
        let event_id = Self::parse_uuid(&req.event_id, "event_id")?;

        info!("AddEventFeedback request: event={}, rating={}", event_id, req.rating);

        let feedback = self
            .app_state
            .event_service
            .add_event_feedback(&caller, event_id, req.rating, req.comment.as_deref())
            .await?;

        Ok(Response::new(feedback.into()))
    }

    async fn get_event_feedback(
        &self,
        request: Request<GetEventRequest>,
    ) -> Result<Response<FeedbackListResponse>, Status> {
        self.caller(&request)?;
        let event_id = Self::parse_uuid(&request.get_ref().event_id, "event_id")?;

        info!("GetEventFeedback request: event={}", event_id);

        let feedback = self.app_state.event_service.get_event_feedback(event_id).await?;
        Ok(Response::new(FeedbackListResponse {
            feedback: feedback.into_iter().map(FeedbackResponse::from).collect(),
        }))
    }

    async fn get_registered_user_names(
        &self,
        request: Request<GetEventRequest>,
    ) -> Result<Response<RegisteredUserNamesResponse>, Status> {
        self.caller(&request)?;
        let event_id = Self::parse_uuid(&request.get_ref().event_id, "event_id")?;

        info!("GetRegisteredUserNames request: event={}", event_id);

        let registered_user_names = self
            .app_state
            .event_service
            .get_registered_user_names(event_id)
            .await?;
        Ok(Response::new(RegisteredUserNamesResponse { registered_user_names }))
    }

    /// Create a hackathon group led by the caller
    async fn create_hackathon_group(
        &self,
        request: Request<CreateHackathonGroupRequest>,
    ) -> Result<Response<GroupResponse>, Status> {
        let caller = self.caller(&request)?;
        let req = request.into_inner();

        info!("CreateHackathonGroup request: name={}, creator={}", req.group_name, caller.user_id);

        let group = self
            .app_state
            .group_service
            .create_hackathon_group(&caller, &req.group_name, req.description.as_deref(), req.max_members)
            .await?;

        Ok(Response::new(group.into()))
    }

    async fn get_all_ongoing_hackathons(
        &self,
        request: Request<GetAllOngoingHackathonsRequest>,
    ) -> Result<Response<GroupListResponse>, Status> {
        self.caller(&request)?;
        let req = request.into_inner();

        info!("GetAllOngoingHackathons request: exclude={:?}", req.exclude_user_id);

        let groups = self
            .app_state
            .group_service
            .get_all_ongoing_hackathons(req.exclude_user_id.as_deref())
            .await?;
        Ok(Response::new(group_list(groups)))
    }

    async fn get_my_created_hackathons(
        &self,
        request: Request<Empty>,
    ) -> Result<Response<GroupListResponse>, Status> {
        let caller = self.caller(&request)?;

        info!("GetMyCreatedHackathons request: creator={}", caller.user_id);

        let groups = self
            .app_state
            .group_service
            .get_my_created_hackathons(&caller)
            .await?;
        Ok(Response::new(group_list(groups)))
    }

    async fn request_to_join_group(
        &self,
        request: Request<GroupRequest>,
    ) -> Result<Response<MembershipResponse>, Status> {
        let caller = self.caller(&request)?;
        let group_id = Self::parse_uuid(&request.get_ref().group_id, "group_id")?;

        info!("RequestToJoinGroup request: group={}, user={}", group_id, caller.user_id);

        let member = self
            .app_state
            .group_service
            .request_to_join_group(&caller, group_id)
            .await?;

        Ok(Response::new(member.into()))
    }

    async fn approve_group_request(
        &self,
        request: Request<ApproveGroupRequestRequest>,
    ) -> Result<Response<MembershipResponse>, Status> {
        let caller = self.caller(&request)?;
        let req = request.into_inner();
        let group_id = Self::parse_uuid(&req.group_id, "group_id")?;
        let user_id = req.user_id.trim();
        if user_id.is_empty() {
            return Err(Status::invalid_argument("user_id is required"));
        }

        info!("ApproveGroupRequest request: group={}, user={}", group_id, user_id);

        let member = self
            .app_state
            .group_service
            .approve_group_request(&caller, group_id, user_id)
            .await?;

        Ok(Response::new(member.into()))
    }

    async fn get_group_members(
        &self,
        request: Request<GroupRequest>,
    ) -> Result<Response<GroupMembersResponse>, Status> {
        self.caller(&request)?;
        let group_id = Self::parse_uuid(&request.get_ref().group_id, "group_id")?;

        info!("GetGroupMembers request: group={}", group_id);

        let members = self.app_state.group_service.get_group_members(group_id).await?;
        Ok(Response::new(GroupMembersResponse {
            group_id: group_id.to_string(),
            members,
        }))
    }

    async fn get_pending_requests(
        &self,
        request: Request<GroupRequest>,
    ) -> Result<Response<GroupMembersResponse>, Status> {
        let caller = self.caller(&request)?;
        let group_id = Self::parse_uuid(&request.get_ref().group_id, "group_id")?;

        info!("GetPendingRequests request: group={}, caller={}", group_id, caller.user_id);

        let members = self
            .app_state
            .group_service
            .get_pending_requests(&caller, group_id)
            .await?;
        Ok(Response::new(GroupMembersResponse {
            group_id: group_id.to_string(),
            members,
        }))
    }

    async fn close_group(&self, request: Request<GroupRequest>) -> Result<Response<GroupResponse>, Status> {
        let caller = self.caller(&request)?;
        let group_id = Self::parse_uuid(&request.get_ref().group_id, "group_id")?;

        info!("CloseGroup request: group={}", group_id);

        let group = self.app_state.group_service.close_group(&caller, group_id).await?;
        Ok(Response::new(group.into()))
    }

    async fn post_to_group(
        &self,
        request: Request<PostToGroupRequest>,
    ) -> Result<Response<PostResponse>, Status> {
        let caller = self.caller(&request)?;
        let req = request.into_inner();
        let group_id = Self::parse_uuid(&req.group_id, "group_id")?;

        info!("PostToGroup request: group={}, user={}", group_id, caller.user_id);

        let post = self
            .app_state
            .group_service
            .post_to_group(&caller, group_id, &req.message)
            .await?;

        Ok(Response::new(post.into()))
    }

    async fn get_group_posts(
        &self,
        request: Request<GroupRequest>,
    ) -> Result<Response<PostListResponse>, Status> {
        let caller = self.caller(&request)?;
        let group_id = Self::parse_uuid(&request.get_ref().group_id, "group_id")?;

        info!("GetGroupPosts request: group={}, caller={}", group_id, caller.user_id);

        let posts = self
            .app_state
            .group_service
            .get_group_posts(&caller, group_id)
            .await?;
        Ok(Response::new(PostListResponse {
            posts: posts.into_iter().map(PostResponse::from).collect(),
        }))
    }

    async fn get_flat_profiles(&self, request: Request<Empty>) -> Result<Response<FlatListResponse>, Status> {
        self.caller(&request)?;

        info!("GetFlatProfiles request");

        let flats = self.app_state.flat_service.get_flat_profiles().await?;
        Ok(Response::new(flat_list(flats)))
    }

    async fn search_flat_profiles(
        &self,
        request: Request<SearchFlatProfilesRequest>,
    ) -> Result<Response<FlatListResponse>, Status> {
        self.caller(&request)?;
        let search = FlatSearch::try_from(request.into_inner())?;

        info!("SearchFlatProfiles request: {:?}", search);

        let flats = self.app_state.flat_service.search_flat_profiles(&search).await?;
        Ok(Response::new(flat_list(flats)))
    }

    async fn add_flat_profile(
        &self,
        request: Request<AddFlatProfileRequest>,
    ) -> Result<Response<FlatResponse>, Status> {
        let caller = self.caller(&request)?;
        let flat = NewFlatProfile::try_from(request.into_inner())?;

        info!("AddFlatProfile request: house={}, owner={}", flat.house_name, caller.user_id);

        let flat = self.app_state.flat_service.add_flat_profile(&caller, flat).await?;
        Ok(Response::new(flat.into()))
    }

    async fn delete_flat_profile(
        &self,
        request: Request<DeleteFlatProfileRequest>,
    ) -> Result<Response<DeleteFlatProfileResponse>, Status> {
        let caller = self.caller(&request)?;
        let flat_id = Self::parse_uuid(&request.get_ref().flat_id, "flat_id")?;

        info!("DeleteFlatProfile request: flat={}", flat_id);

        let deleted = self
            .app_state
            .flat_service
            .delete_flat_profile(&caller, flat_id)
            .await?;
        Ok(Response::new(DeleteFlatProfileResponse { deleted }))
    }

    async fn sync_user(&self, request: Request<SyncUserRequest>) -> Result<Response<UserResponse>, Status> {
        let caller = self.caller(&request)?;
        let req = request.into_inner();
        let phone_number = non_empty(req.phone_number);
        let profile_picture = non_empty(req.profile_picture);

        info!("SyncUser request: user={}", caller.user_id);

        let profile = self
            .app_state
            .user_service
            .sync_user(&caller, phone_number.as_deref(), profile_picture.as_deref())
            .await?;
        Ok(Response::new(profile.into()))
    }

    async fn get_user(&self, request: Request<GetUserRequest>) -> Result<Response<UserResponse>, Status> {
        self.caller(&request)?;
        let user_id = request.get_ref().user_id.trim().to_string();
        if user_id.is_empty() {
            return Err(AppError::Validation("user_id is required".to_string()).into());
        }

        info!("GetUser request: user={}", user_id);

        let profile = self.app_state.user_service.get_user(&user_id).await?;
        Ok(Response::new(profile.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonic::Code;

    fn fields() -> EventFields {
        EventFields {
            title: "  Tech Fest  ".to_string(),
            description: "Annual festival".to_string(),
            start_date: 1_767_225_600_000,
            end_date: 1_767_312_000_000,
            location: "Main Auditorium".to_string(),
            event_type: "cultural".to_string(),
            max_participants: 200,
            status: String::new(),
            organizer: Some("  ".to_string()),
            contact_info: Some("fest@viit.ac.in".to_string()),
            category: None,
            tags: vec!["music".to_string()],
            attachments: vec![],
        }
    }

    #[test]
    fn test_event_draft_defaults_status_to_pending() {
        let draft = event_draft(Some(fields())).unwrap();
        assert_eq!(draft.status, EventStatus::Pending);
        assert_eq!(draft.event_type, EventType::Cultural);
        assert_eq!(draft.title, "Tech Fest");
        assert_eq!(draft.organizer, None);
        assert_eq!(draft.contact_info.as_deref(), Some("fest@viit.ac.in"));
        assert_eq!(to_millis(draft.start_date), 1_767_225_600_000);
    }

    #[test]
    fn test_event_draft_rejects_unknown_type_and_missing_body() {
        let mut bad = fields();
        bad.event_type = "party".to_string();
        assert_eq!(event_draft(Some(bad)).unwrap_err().code(), Code::InvalidArgument);
        assert_eq!(event_draft(None).unwrap_err().code(), Code::InvalidArgument);

        let mut no_start = fields();
        no_start.start_date = 0;
        assert_eq!(event_draft(Some(no_start)).unwrap_err().code(), Code::InvalidArgument);
    }

    #[test]
    fn test_flat_request_parses_decimals() {
        let req = AddFlatProfileRequest {
            house_name: "Sunrise Residency".to_string(),
            address: "12 Lake Road, Kondhwa".to_string(),
            total_rent: "15000".to_string(),
            max_occupancy: 4,
            location: "Kondhwa".to_string(),
            distance_from_college: "1.5".to_string(),
            has_wifi: true,
            has_geyser: false,
            has_parking: true,
            allows_guests: false,
        };

        let flat = NewFlatProfile::try_from(req.clone()).unwrap();
        assert_eq!(flat.total_rent, Decimal::new(15000, 0));
        assert_eq!(flat.distance_from_college, Decimal::new(15, 1));

        let bad = AddFlatProfileRequest {
            total_rent: "fifteen thousand".to_string(),
            ..req
        };
        assert_eq!(NewFlatProfile::try_from(bad).unwrap_err().code(), Code::InvalidArgument);
    }

    #[test]
    fn test_search_request_ignores_blank_filters() {
        let search = FlatSearch::try_from(SearchFlatProfilesRequest {
            location: Some("   ".to_string()),
            max_rent_per_person: Some(String::new()),
            max_distance: Some("2".to_string()),
            needs_wifi: true,
            ..Default::default()
        })
        .unwrap();

        assert_eq!(search.location, None);
        assert_eq!(search.max_rent_per_person, None);
        assert_eq!(search.max_distance, Some(Decimal::new(2, 0)));
        assert!(search.needs_wifi);
    }

    #[test]
    fn test_parse_uuid_reports_field() {
        let status = CampusGrpcService::parse_uuid("nope", "group_id").unwrap_err();
        assert_eq!(status.code(), Code::InvalidArgument);
        assert!(status.message().contains("group_id"));
    }
}
