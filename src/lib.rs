//! Campus Hub Backend Library
//!
//! This module exposes the backend components for use by tests and other consumers.

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod grpc_service;
pub mod models;
pub mod repositories;
pub mod services;
pub mod websocket;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, AppResult};

use database::Database;
use repositories::*;
use services::{EventService, FlatService, GroupService, UserService};
use std::sync::Arc;
use websocket::ChangeFeed;

/// Application state containing all repositories and services
pub struct AppState {
    pub database: Database,
    pub feed: ChangeFeed,
    pub event_service: EventService,
    pub group_service: GroupService,
    pub flat_service: FlatService,
    pub user_service: UserService,
}

impl AppState {
    /// Create a new AppState with initialized repositories
    pub fn new(pool: sqlx::PgPool, feed: ChangeFeed) -> Self {
        let database = Database::new(pool.clone());

        let event_repo = Arc::new(EventRepository::new(pool.clone()));
        let group_repo = Arc::new(GroupRepository::new(pool.clone()));
        let member_repo = Arc::new(GroupMemberRepository::new(pool.clone()));
        let post_repo = Arc::new(PostRepository::new(pool.clone()));
        let flat_repo = Arc::new(FlatRepository::new(pool.clone()));
        let user_repo = Arc::new(UserRepository::new(pool));

        Self {
            database,
            event_service: EventService::new(event_repo, feed.clone()),
            group_service: GroupService::new(group_repo, member_repo.clone(), post_repo, feed.clone()),
            flat_service: FlatService::new(flat_repo, feed.clone()),
            user_service: UserService::new(user_repo, member_repo),
            feed,
        }
    }
}
