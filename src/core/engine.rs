use std::sync::Arc;
use thiserror::Error;

use crate::models::{Match, SwipeDirection, SwipeOutcome, UserId, UserPair};
use crate::services::{StoreError, SwipeStore};

/// Errors surfaced by the match engine
#[derive(Debug, Error)]
pub enum SwipeError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

/// Records swipes and turns mutual right-swipes into matches
///
/// # Flow
/// 1. Validate direction and reject self-swipes
/// 2. Insert the swipe; a duplicate ordered pair is a no-op
/// 3. On a right swipe, look for the reverse right swipe
/// 4. Insert the match for the unordered pair, ignoring a lost race
#[derive(Clone)]
pub struct MatchEngine {
    store: Arc<dyn SwipeStore>,
}

impl MatchEngine {
    pub fn new(store: Arc<dyn SwipeStore>) -> Self {
        Self { store }
    }

    pub async fn record_swipe(
        &self,
        swiper_id: UserId,
        swiped_id: UserId,
        direction: &str,
    ) -> Result<SwipeOutcome, SwipeError> {
        let direction = direction
            .parse::<SwipeDirection>()
            .map_err(|e| SwipeError::InvalidArgument(e.to_string()))?;

        let pair = UserPair::new(swiper_id, swiped_id).ok_or_else(|| {
            SwipeError::InvalidArgument("users cannot swipe on themselves".to_string())
        })?;

        if !self.store.user_exists(swiped_id).await? {
            return Err(SwipeError::NotFound(format!("user {}", swiped_id)));
        }

        let swipe = match self.store.insert_swipe(swiper_id, swiped_id, direction).await? {
            Some(swipe) => swipe,
            None => {
                tracing::debug!("Duplicate swipe {} -> {} ignored", swiper_id, swiped_id);
                return Ok(SwipeOutcome::DUPLICATE);
            }
        };

        tracing::debug!(
            "Recorded swipe {} -> {} ({})",
            swipe.swiper_id,
            swipe.swiped_id,
            swipe.direction
        );

        if !direction.is_right() {
            return Ok(SwipeOutcome {
                created: true,
                match_formed: false,
            });
        }

        let reciprocated = self
            .store
            .find_swipe(swiped_id, swiper_id)
            .await?
            .is_some_and(|back| back.direction.is_right());

        if !reciprocated {
            return Ok(SwipeOutcome {
                created: true,
                match_formed: false,
            });
        }

        if self.store.insert_match(pair).await? {
            tracing::info!("Match formed between users {} and {}", pair.low(), pair.high());
        } else {
            tracing::debug!(
                "Match between {} and {} already recorded",
                pair.low(),
                pair.high()
            );
        }

        Ok(SwipeOutcome {
            created: true,
            match_formed: true,
        })
    }

    /// Materialize a match row for every reciprocated pair that lacks one
    ///
    /// Returns the number of rows written. Repairs the gap left when a
    /// process dies between the swipe write and the match write.
    pub async fn reconcile_matches(&self) -> Result<usize, SwipeError> {
        let pairs = self.store.reciprocated_pairs().await?;
        let mut created = 0;

        for pair in pairs {
            if self.store.insert_match(pair).await? {
                tracing::warn!(
                    "Reconciled missing match between users {} and {}",
                    pair.low(),
                    pair.high()
                );
                created += 1;
            }
        }

        Ok(created)
    }

    pub async fn matches_for(&self, user_id: UserId) -> Result<Vec<Match>, SwipeError> {
        Ok(self.store.matches_for(user_id).await?)
    }
}
