use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    LedgerSnapshot, Match, NewProfile, NewUser, Photo, Profile, Swipe, SwipeDirection, User,
    UserId, UserPair,
};

/// Errors that can occur when talking to a storage backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Corrupt row: {0}")]
    CorruptRow(String),
}

/// Reject a swipe the schema would refuse: a user swiping on themselves
pub(crate) fn check_swipe_pair(swiper_id: UserId, swiped_id: UserId) -> Result<(), StoreError> {
    if swiper_id == swiped_id {
        return Err(StoreError::InvalidInput(format!(
            "user {} cannot swipe on themselves",
            swiper_id
        )));
    }
    Ok(())
}

/// Photo positions start at zero
pub(crate) fn check_photo_order(order: i32) -> Result<(), StoreError> {
    if order < 0 {
        return Err(StoreError::InvalidInput(format!(
            "photo order must be non-negative, got {}",
            order
        )));
    }
    Ok(())
}

/// Storage port for identities, profiles, the swipe ledger and matches
///
/// Implementations must enforce two uniqueness rules at the storage
/// layer: one swipe per ordered `(swiper, swiped)` pair and one match per
/// [`UserPair`]. Conflicting inserts are reported through the return
/// value, never as errors.
#[async_trait]
pub trait SwipeStore: Send + Sync {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;

    async fn find_user(&self, user_id: UserId) -> Result<Option<User>, StoreError>;

    async fn user_exists(&self, user_id: UserId) -> Result<bool, StoreError> {
        Ok(self.find_user(user_id).await?.is_some())
    }

    /// Create the profile for a user; fails with `Conflict` if one exists
    async fn create_profile(&self, user_id: UserId, profile: NewProfile)
        -> Result<Profile, StoreError>;

    /// Attach a photo; a negative `order` is `InvalidInput`
    async fn add_photo(&self, profile_id: i64, image: &str, order: i32)
        -> Result<Photo, StoreError>;

    async fn profile_for_user(&self, user_id: UserId) -> Result<Option<Profile>, StoreError>;

    /// Profiles not owned by `user_id` and not already swiped on by them,
    /// ascending by profile id
    async fn candidate_profiles(&self, user_id: UserId) -> Result<Vec<Profile>, StoreError>;

    /// Insert a swipe; `None` if the ordered pair already has one
    ///
    /// A self-swipe is `InvalidInput` and an unknown user is `NotFound`.
    async fn insert_swipe(
        &self,
        swiper_id: UserId,
        swiped_id: UserId,
        direction: SwipeDirection,
    ) -> Result<Option<Swipe>, StoreError>;

    async fn find_swipe(
        &self,
        swiper_id: UserId,
        swiped_id: UserId,
    ) -> Result<Option<Swipe>, StoreError>;

    /// Insert a match; `false` if the pair is already matched
    async fn insert_match(&self, pair: UserPair) -> Result<bool, StoreError>;

    async fn matches_for(&self, user_id: UserId) -> Result<Vec<Match>, StoreError>;

    /// Every pair where both users swiped right on each other
    async fn reciprocated_pairs(&self) -> Result<Vec<UserPair>, StoreError>;

    async fn ledger_snapshot(&self, user_id: UserId) -> Result<LedgerSnapshot, StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError>;
}
