// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    InvalidDirection, LedgerSnapshot, Match, NewProfile, NewUser, Photo, Profile, Swipe,
    SwipeDirection, SwipeOutcome, User, UserId, UserPair,
};
pub use requests::SwipeRequest;
pub use responses::{
    ErrorResponse, HealthResponse, MatchListResponse, MatchView, MessageResponse, PhotoView,
    ProfileCard, SwipeResponse, UserView,
};
