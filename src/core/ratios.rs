use std::collections::HashSet;
use std::sync::Arc;

use crate::models::{LedgerSnapshot, UserId};
use crate::services::{StoreError, SwipeStore};

/// Swipe and acceptance ratios for one user, as whole percentages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ratios {
    pub swipe_ratio: Option<u8>,
    pub acceptance_ratio: Option<u8>,
}

impl Ratios {
    pub fn from_snapshot(snapshot: &LedgerSnapshot) -> Self {
        Self {
            swipe_ratio: swipe_ratio(snapshot),
            acceptance_ratio: acceptance_ratio(snapshot),
        }
    }
}

/// `numerator / denominator` as a percentage, rounded half to even
///
/// Integer arithmetic only, so 12.5% rounds to 12 and 37.5% to 38
/// without floating point drift. `None` when the denominator is zero.
pub fn rounded_percentage(numerator: u64, denominator: u64) -> Option<u8> {
    if denominator == 0 {
        return None;
    }

    let scaled = numerator.min(denominator) * 100;
    let quotient = scaled / denominator;
    let twice_remainder = (scaled % denominator) * 2;

    let rounded = match twice_remainder.cmp(&denominator) {
        std::cmp::Ordering::Less => quotient,
        std::cmp::Ordering::Greater => quotient + 1,
        std::cmp::Ordering::Equal if quotient % 2 == 0 => quotient,
        std::cmp::Ordering::Equal => quotient + 1,
    };

    Some(rounded as u8)
}

/// Share of sent swipes that went right
///
/// `None` when the user has never swiped, which is distinct from
/// `Some(0)` for a user who rejected everyone.
pub fn swipe_ratio(snapshot: &LedgerSnapshot) -> Option<u8> {
    let total = snapshot.sent.len() as u64;
    let right = snapshot
        .sent
        .iter()
        .filter(|s| s.direction.is_right())
        .count() as u64;

    rounded_percentage(right, total)
}

/// Share of received right-swipes that this user reciprocated
///
/// Computed from the ledger alone, so a reciprocated pair counts even if
/// its match row has not been written yet.
pub fn acceptance_ratio(snapshot: &LedgerSnapshot) -> Option<u8> {
    let liked: HashSet<UserId> = snapshot
        .sent
        .iter()
        .filter(|s| s.direction.is_right())
        .map(|s| s.swiped_id)
        .collect();

    let admirers: HashSet<UserId> = snapshot
        .received
        .iter()
        .filter(|s| s.direction.is_right())
        .map(|s| s.swiper_id)
        .collect();

    let reciprocated = admirers.intersection(&liked).count() as u64;

    rounded_percentage(reciprocated, admirers.len() as u64)
}

/// Read-only ratio lookups against the swipe ledger
#[derive(Clone)]
pub struct RatioCalculator {
    store: Arc<dyn SwipeStore>,
}

impl RatioCalculator {
    pub fn new(store: Arc<dyn SwipeStore>) -> Self {
        Self { store }
    }

    pub async fn ratios(&self, user_id: UserId) -> Result<Ratios, StoreError> {
        let snapshot = self.store.ledger_snapshot(user_id).await?;
        Ok(Ratios::from_snapshot(&snapshot))
    }

    pub async fn swipe_ratio(&self, user_id: UserId) -> Result<Option<u8>, StoreError> {
        let snapshot = self.store.ledger_snapshot(user_id).await?;
        Ok(swipe_ratio(&snapshot))
    }

    pub async fn acceptance_ratio(&self, user_id: UserId) -> Result<Option<u8>, StoreError> {
        let snapshot = self.store.ledger_snapshot(user_id).await?;
        Ok(acceptance_ratio(&snapshot))
    }
}
