use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tokio::sync::RwLock;

use crate::core::selector::exclude_decided;
use crate::models::{
    LedgerSnapshot, Match, NewProfile, NewUser, Photo, Profile, Swipe, SwipeDirection, User,
    UserId, UserPair,
};
use crate::services::store::{check_photo_order, check_swipe_pair, StoreError, SwipeStore};

#[derive(Default)]
struct MemoryState {
    next_user_id: i64,
    next_profile_id: i64,
    next_photo_id: i64,
    users: BTreeMap<UserId, User>,
    usernames: HashSet<String>,
    /// profile id -> profile, photos kept sorted
    profiles: BTreeMap<i64, Profile>,
    profile_by_user: HashMap<UserId, i64>,
    /// Keyed by ordered (swiper, swiped); the map key is the uniqueness constraint
    swipes: BTreeMap<(UserId, UserId), Swipe>,
    matches: BTreeMap<UserPair, Match>,
}

/// In-process store for development and tests
///
/// Each operation takes the lock once, so a swipe insert and the
/// following reciprocity check are two separate critical sections,
/// the same as two autocommitted statements against PostgreSQL.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of swipes in the ledger
    pub async fn swipe_count(&self) -> usize {
        self.state.read().await.swipes.len()
    }

    /// Number of recorded matches
    pub async fn match_count(&self) -> usize {
        self.state.read().await.matches.len()
    }

    /// Drop a match row, leaving the ledger untouched
    ///
    /// Lets tests simulate a crash between the swipe and match writes.
    pub async fn remove_match(&self, pair: UserPair) -> bool {
        self.state.write().await.matches.remove(&pair).is_some()
    }
}

#[async_trait]
impl SwipeStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut state = self.state.write().await;
        if !state.usernames.insert(user.username.clone()) {
            return Err(StoreError::Conflict(format!(
                "username '{}' is taken",
                user.username
            )));
        }

        state.next_user_id += 1;
        let record = User {
            id: state.next_user_id,
            username: user.username,
            first_name: user.first_name,
            date_of_birth: user.date_of_birth,
            created_at: Utc::now(),
        };
        state.users.insert(record.id, record.clone());

        Ok(record)
    }

    async fn find_user(&self, user_id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.state.read().await.users.get(&user_id).cloned())
    }

    async fn create_profile(
        &self,
        user_id: UserId,
        profile: NewProfile,
    ) -> Result<Profile, StoreError> {
        let mut state = self.state.write().await;
        let first_name = match state.users.get(&user_id) {
            Some(user) => user.first_name.clone(),
            None => return Err(StoreError::NotFound(format!("user {}", user_id))),
        };
        if state.profile_by_user.contains_key(&user_id) {
            return Err(StoreError::Conflict(format!(
                "user {} already has a profile",
                user_id
            )));
        }

        state.next_profile_id += 1;
        let record = Profile {
            id: state.next_profile_id,
            user_id,
            first_name,
            bio: profile.bio,
            job_title: profile.job_title,
            company: profile.company,
            photos: Vec::new(),
        };
        state.profile_by_user.insert(user_id, record.id);
        state.profiles.insert(record.id, record.clone());

        Ok(record)
    }

    async fn add_photo(
        &self,
        profile_id: i64,
        image: &str,
        order: i32,
    ) -> Result<Photo, StoreError> {
        check_photo_order(order)?;

        let mut state = self.state.write().await;
        if !state.profiles.contains_key(&profile_id) {
            return Err(StoreError::NotFound(format!("profile {}", profile_id)));
        }
        state.next_photo_id += 1;
        let photo = Photo {
            id: state.next_photo_id,
            profile_id,
            image: image.to_string(),
            order,
        };

        let profile = state
            .profiles
            .get_mut(&profile_id)
            .ok_or_else(|| StoreError::NotFound(format!("profile {}", profile_id)))?;
        profile.photos.push(photo.clone());
        profile.photos.sort_by_key(|p| (p.order, p.id));

        Ok(photo)
    }

    async fn profile_for_user(&self, user_id: UserId) -> Result<Option<Profile>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .profile_by_user
            .get(&user_id)
            .and_then(|id| state.profiles.get(id))
            .cloned())
    }

    async fn candidate_profiles(&self, user_id: UserId) -> Result<Vec<Profile>, StoreError> {
        let state = self.state.read().await;
        let decided: BTreeSet<UserId> = state
            .swipes
            .range((user_id, UserId::MIN)..=(user_id, UserId::MAX))
            .map(|(&(_, swiped), _)| swiped)
            .collect();

        Ok(exclude_decided(
            user_id,
            state.profiles.values().cloned(),
            &decided,
        ))
    }

    async fn insert_swipe(
        &self,
        swiper_id: UserId,
        swiped_id: UserId,
        direction: SwipeDirection,
    ) -> Result<Option<Swipe>, StoreError> {
        check_swipe_pair(swiper_id, swiped_id)?;

        let mut state = self.state.write().await;
        if !state.users.contains_key(&swiper_id) || !state.users.contains_key(&swiped_id) {
            return Err(StoreError::NotFound(format!(
                "swipe {} -> {} references an unknown user",
                swiper_id, swiped_id
            )));
        }

        let key = (swiper_id, swiped_id);
        if state.swipes.contains_key(&key) {
            return Ok(None);
        }

        let swipe = Swipe {
            swiper_id,
            swiped_id,
            direction,
            created_at: Utc::now(),
        };
        state.swipes.insert(key, swipe.clone());

        Ok(Some(swipe))
    }

    async fn find_swipe(
        &self,
        swiper_id: UserId,
        swiped_id: UserId,
    ) -> Result<Option<Swipe>, StoreError> {
        Ok(self
            .state
            .read()
            .await
            .swipes
            .get(&(swiper_id, swiped_id))
            .cloned())
    }

    async fn insert_match(&self, pair: UserPair) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        if state.matches.contains_key(&pair) {
            return Ok(false);
        }
        state.matches.insert(
            pair,
            Match {
                pair,
                created_at: Utc::now(),
            },
        );
        Ok(true)
    }

    async fn matches_for(&self, user_id: UserId) -> Result<Vec<Match>, StoreError> {
        let state = self.state.read().await;
        let mut matches: Vec<Match> = state
            .matches
            .values()
            .filter(|m| m.pair.contains(user_id))
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matches)
    }

    async fn reciprocated_pairs(&self) -> Result<Vec<UserPair>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .swipes
            .values()
            .filter(|s| s.direction.is_right() && s.swiper_id < s.swiped_id)
            .filter(|s| {
                state
                    .swipes
                    .get(&(s.swiped_id, s.swiper_id))
                    .is_some_and(|back| back.direction.is_right())
            })
            .filter_map(|s| UserPair::new(s.swiper_id, s.swiped_id))
            .collect())
    }

    async fn ledger_snapshot(&self, user_id: UserId) -> Result<LedgerSnapshot, StoreError> {
        let state = self.state.read().await;
        let mut snapshot = LedgerSnapshot {
            user_id,
            ..LedgerSnapshot::default()
        };

        for swipe in state.swipes.values() {
            if swipe.swiper_id == user_id {
                snapshot.sent.push(swipe.clone());
            } else if swipe.swiped_id == user_id {
                snapshot.received.push(swipe.clone());
            }
        }

        Ok(snapshot)
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}
