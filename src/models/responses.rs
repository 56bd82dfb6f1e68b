use serde::{Deserialize, Serialize};
use crate::models::domain::{Photo, Profile, User, UserId};

/// Photo entry on a profile card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoView {
    pub image: String,
    pub order: i32,
}

impl From<&Photo> for PhotoView {
    fn from(photo: &Photo) -> Self {
        Self {
            image: photo.image.clone(),
            order: photo.order,
        }
    }
}

/// Profile as served in a deck, with ratios derived from the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileCard {
    pub id: i64,
    pub first_name: String,
    pub bio: String,
    pub job_title: String,
    pub company: String,
    pub photos: Vec<PhotoView>,
    pub swipe_ratio: Option<u8>,
    pub acceptance_ratio: Option<u8>,
}

impl ProfileCard {
    pub fn new(profile: &Profile, swipe_ratio: Option<u8>, acceptance_ratio: Option<u8>) -> Self {
        Self {
            id: profile.id,
            first_name: profile.first_name.clone(),
            bio: profile.bio.clone(),
            job_title: profile.job_title.clone(),
            company: profile.company.clone(),
            photos: profile.photos.iter().map(PhotoView::from).collect(),
            swipe_ratio,
            acceptance_ratio,
        }
    }
}

/// Current user with their own card
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserView {
    pub id: UserId,
    pub username: String,
    pub profile: Option<ProfileCard>,
}

impl UserView {
    pub fn new(user: &User, profile: Option<ProfileCard>) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            profile,
        }
    }
}

/// Response for a newly recorded swipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwipeResponse {
    pub status: String,
    pub match_made: bool,
}

/// Response for a swipe on an already decided pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// One match from the point of view of the requesting user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchView {
    pub user_id: UserId,
    pub matched_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchListResponse {
    pub matches: Vec<MatchView>,
    pub count: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
