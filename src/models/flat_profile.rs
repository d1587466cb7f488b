use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Shared-housing listing
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FlatProfile {
    pub id: Uuid,
    pub owner_id: String,
    pub house_name: String,
    pub address: String,
    pub total_rent: Decimal,
    pub max_occupancy: i32,
    pub location: String,
    pub distance_from_college: Decimal, // km
    pub has_wifi: bool,
    pub has_geyser: bool,
    pub has_parking: bool,
    pub allows_guests: bool,
    pub created_at: DateTime<Utc>,
}

impl FlatProfile {
    /// Rent split evenly across a full flat, rounded up to the next rupee
    pub fn rent_per_person(&self) -> Decimal {
        if self.max_occupancy <= 0 {
            return self.total_rent.ceil();
        }
        (self.total_rent / Decimal::from(self.max_occupancy)).ceil()
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }
}

/// Listing submitted by a student
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFlatProfile {
    pub house_name: String,
    pub address: String,
    pub total_rent: Decimal,
    pub max_occupancy: i32,
    pub location: String,
    pub distance_from_college: Decimal,
    pub has_wifi: bool,
    pub has_geyser: bool,
    pub has_parking: bool,
    pub allows_guests: bool,
}

impl NewFlatProfile {
    pub const MIN_TOTAL_RENT: i64 = 1000;
    pub const MAX_OCCUPANCY: i32 = 10;

    pub fn validate(&self) -> Result<(), String> {
        if self.house_name.trim().chars().count() < 3 {
            return Err("House name must be at least 3 characters.".to_string());
        }

        if self.address.trim().chars().count() < 10 {
            return Err("Address must be at least 10 characters.".to_string());
        }

        if self.total_rent < Decimal::from(Self::MIN_TOTAL_RENT) {
            return Err("Total rent must be at least ₹1,000.".to_string());
        }

        if self.max_occupancy < 1 {
            return Err("Maximum occupancy must be at least 1.".to_string());
        }

        if self.max_occupancy > Self::MAX_OCCUPANCY {
            return Err("Maximum occupancy cannot exceed 10.".to_string());
        }

        if self.location.trim().chars().count() < 5 {
            return Err("Location must be at least 5 characters.".to_string());
        }

        if self.distance_from_college.is_sign_negative() {
            return Err("Distance must be a positive number.".to_string());
        }

        Ok(())
    }
}

/// Filters for browsing listings. Empty filters match everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlatSearch {
    pub location: Option<String>,
    pub max_rent_per_person: Option<Decimal>,
    pub max_distance: Option<Decimal>,
    pub needs_wifi: bool,
    pub needs_geyser: bool,
    pub needs_parking: bool,
    pub needs_guests: bool,
}

impl FlatSearch {
    pub fn matches(&self, flat: &FlatProfile) -> bool {
        if let Some(location) = self.location.as_deref().map(str::trim) {
            if !location.is_empty() {
                let needle = location.to_lowercase();
                let in_location = flat.location.to_lowercase().contains(&needle);
                let in_address = flat.address.to_lowercase().contains(&needle);
                if !in_location && !in_address {
                    return false;
                }
            }
        }

        if let Some(max_rent) = self.max_rent_per_person {
            if flat.rent_per_person() > max_rent {
                return false;
            }
        }

        if let Some(max_distance) = self.max_distance {
            if flat.distance_from_college > max_distance {
                return false;
            }
        }

        (!self.needs_wifi || flat.has_wifi)
            && (!self.needs_geyser || flat.has_geyser)
            && (!self.needs_parking || flat.has_parking)
            && (!self.needs_guests || flat.allows_guests)
    }
}
