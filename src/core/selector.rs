use std::collections::BTreeSet;
use std::sync::Arc;

use crate::core::ratios::RatioCalculator;
use crate::models::{Profile, ProfileCard, UserId};
use crate::services::{StoreError, SwipeStore};

/// Drop the requester's own profile and every profile they already swiped on
///
/// Output is ascending by profile id.
pub fn exclude_decided<I>(user_id: UserId, profiles: I, decided: &BTreeSet<UserId>) -> Vec<Profile>
where
    I: IntoIterator<Item = Profile>,
{
    let mut deck: Vec<Profile> = profiles
        .into_iter()
        .filter(|p| p.user_id != user_id && !decided.contains(&p.user_id))
        .collect();
    deck.sort_by_key(|p| p.id);
    deck
}

/// Builds the deck of profiles a user has not acted on yet
#[derive(Clone)]
pub struct CandidateSelector {
    store: Arc<dyn SwipeStore>,
    ratios: RatioCalculator,
}

impl CandidateSelector {
    pub fn new(store: Arc<dyn SwipeStore>, ratios: RatioCalculator) -> Self {
        Self { store, ratios }
    }

    /// Fresh read of the deck for `user_id`; empty when nothing is left
    pub async fn next_deck(&self, user_id: UserId) -> Result<Vec<ProfileCard>, StoreError> {
        let mut profiles = self.store.candidate_profiles(user_id).await?;
        profiles.sort_by_key(|p| p.id);

        let mut deck = Vec::with_capacity(profiles.len());
        for profile in &profiles {
            deck.push(self.card(profile).await?);
        }

        tracing::debug!("Built deck of {} profiles for user {}", deck.len(), user_id);

        Ok(deck)
    }

    /// Card for a single profile with its owner's ratios
    pub async fn card(&self, profile: &Profile) -> Result<ProfileCard, StoreError> {
        let ratios = self.ratios.ratios(profile.user_id).await?;
        Ok(ProfileCard::new(
            profile,
            ratios.swipe_ratio,
            ratios.acceptance_ratio,
        ))
    }
}
