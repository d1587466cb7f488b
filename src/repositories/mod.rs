pub mod event_repository;
pub mod flat_repository;
pub mod group_member_repository;
pub mod group_repository;
pub mod post_repository;
pub mod user_repository;

// Re-export all repositories for convenient access
pub use event_repository::EventRepository;
pub use flat_repository::FlatRepository;
pub use group_member_repository::GroupMemberRepository;
pub use group_repository::GroupRepository;
pub use post_repository::PostRepository;
pub use user_repository::UserRepository;
