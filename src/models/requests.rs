use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::models::UserId;

/// Request to record a swipe
///
/// `direction` stays a string here; the engine rejects anything other
/// than `left` or `right` with an invalid-argument error. `swiped_id` is
/// not range-checked: ids that name no user are a not-found error.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SwipeRequest {
    pub swiped_id: UserId,
    #[serde(default)]
    #[validate(length(min = 1, max = 5))]
    pub direction: String,
}
