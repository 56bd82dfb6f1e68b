use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identity key shared by users, swipes and matches
pub type UserId = i64;

/// User identity record
///
/// Credentials live with the identity provider; only the fields the
/// swipe flow reads are kept here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub first_name: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// Fields required to register a user in the identity store
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub username: String,
    pub first_name: String,
    pub date_of_birth: Option<NaiveDate>,
}

/// Profile shown on a card, one per user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    pub user_id: UserId,
    pub first_name: String,
    pub bio: String,
    pub job_title: String,
    pub company: String,
    /// Sorted by `order`, ties by insertion
    pub photos: Vec<Photo>,
}

/// Editable profile attributes
#[derive(Debug, Clone, Default)]
pub struct NewProfile {
    pub bio: String,
    pub job_title: String,
    pub company: String,
}

/// Photo attached to a profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub id: i64,
    pub profile_id: i64,
    /// Reference into the external image storage
    pub image: String,
    pub order: i32,
}

/// Swipe direction: left rejects, right accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    Left,
    Right,
}

impl SwipeDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwipeDirection::Left => "left",
            SwipeDirection::Right => "right",
        }
    }

    pub fn is_right(&self) -> bool {
        matches!(self, SwipeDirection::Right)
    }
}

impl fmt::Display for SwipeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a direction string is neither `left` nor `right`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidDirection(pub String);

impl fmt::Display for InvalidDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid direction '{}', expected 'left' or 'right'", self.0)
    }
}

impl std::error::Error for InvalidDirection {}

impl FromStr for SwipeDirection {
    type Err = InvalidDirection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(SwipeDirection::Left),
            "right" => Ok(SwipeDirection::Right),
            other => Err(InvalidDirection(other.to_string())),
        }
    }
}

/// A recorded decision from `swiper_id` toward `swiped_id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Swipe {
    pub swiper_id: UserId,
    pub swiped_id: UserId,
    pub direction: SwipeDirection,
    pub created_at: DateTime<Utc>,
}

/// Unordered pair of distinct users, stored low id first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserPair {
    low: UserId,
    high: UserId,
}

impl UserPair {
    /// Returns `None` when both ids are the same user
    pub fn new(a: UserId, b: UserId) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self { low: a, high: b }),
            std::cmp::Ordering::Greater => Some(Self { low: b, high: a }),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn low(&self) -> UserId {
        self.low
    }

    pub fn high(&self) -> UserId {
        self.high
    }

    pub fn contains(&self, user_id: UserId) -> bool {
        self.low == user_id || self.high == user_id
    }

    /// The member of the pair that is not `user_id`
    pub fn other(&self, user_id: UserId) -> Option<UserId> {
        if user_id == self.low {
            Some(self.high)
        } else if user_id == self.high {
            Some(self.low)
        } else {
            None
        }
    }
}

/// Mutual right-swipe between two users
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub pair: UserPair,
    pub created_at: DateTime<Utc>,
}

/// Result of recording a swipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwipeOutcome {
    pub created: bool,
    pub match_formed: bool,
}

impl SwipeOutcome {
    /// Outcome for a swipe on an ordered pair that was already decided
    pub const DUPLICATE: SwipeOutcome = SwipeOutcome {
        created: false,
        match_formed: false,
    };
}

/// All swipes touching one user, as read from the ledger
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerSnapshot {
    pub user_id: UserId,
    /// Swipes where the user is the swiper
    pub sent: Vec<Swipe>,
    /// Swipes where the user is the swiped target
    pub received: Vec<Swipe>,
}
