pub mod event_service;
pub mod flat_service;
pub mod group_service;
pub mod user_service;

pub use event_service::EventService;
pub use flat_service::FlatService;
pub use group_service::GroupService;
pub use user_service::{UserProfile, UserService};
