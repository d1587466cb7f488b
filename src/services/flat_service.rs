use crate::auth::Caller;
use crate::error::{option_to_result, AppError, AppResult};
use crate::models::{FlatProfile, FlatSearch, NewFlatProfile};
use crate::repositories::FlatRepository;
use crate::websocket::ChangeFeed;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Service for shared-housing listings
pub struct FlatService {
    flat_repo: Arc<FlatRepository>,
    feed: ChangeFeed,
}

impl FlatService {
    pub fn new(flat_repo: Arc<FlatRepository>, feed: ChangeFeed) -> Self {
        Self { flat_repo, feed }
    }

    pub async fn get_flat_profiles(&self) -> AppResult<Vec<FlatProfile>> {
        Ok(self.flat_repo.find_all().await?)
    }

    /// Listings matching `search`, cheapest per person first
    pub async fn search_flat_profiles(&self, search: &FlatSearch) -> AppResult<Vec<FlatProfile>> {
        let mut flats: Vec<FlatProfile> = self
            .flat_repo
            .find_all()
            .await?
            .into_iter()
            .filter(|flat| search.matches(flat))
            .collect();

        flats.sort_by(|a, b| {
            a.rent_per_person()
                .cmp(&b.rent_per_person())
                .then(a.distance_from_college.cmp(&b.distance_from_college))
        });
        Ok(flats)
    }

    pub async fn add_flat_profile(&self, caller: &Caller, flat: NewFlatProfile) -> AppResult<FlatProfile> {
        flat.validate().map_err(AppError::Validation)?;

        let profile = self.flat_repo.create(&caller.user_id, &flat).await?;

        info!("Listed flat {} ({}) by {}", profile.house_name, profile.id, caller.user_id);
        self.feed.flats_changed();
        Ok(profile)
    }

    /// Remove a listing. Owners and admins only.
    pub async fn delete_flat_profile(&self, caller: &Caller, flat_id: Uuid) -> AppResult<bool> {
        let flat = option_to_result(self.flat_repo.find_by_id(flat_id).await?, "Flat profile not found")?;

        if !flat.is_owned_by(&caller.user_id) && !caller.is_admin() {
            return Err(AppError::Forbidden(
                "Only the owner can delete this listing".to_string(),
            ));
        }

        let deleted = self.flat_repo.delete(flat_id).await?;

        info!("Deleted flat {} by {}", flat_id, caller.user_id);
        self.feed.flats_changed();
        Ok(deleted)
    }
}
