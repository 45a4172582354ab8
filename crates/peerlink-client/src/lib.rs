//! Peerlink Client Library
//!
//! Shared between the Peerlink server and anything that talks to it.
//!
//! ## Modules
//!
//! - **models**: request bodies and JSON views of users, profiles and posts
//! - **store**: explicit client state snapshot with pure reducers
//! - **api** (feature `http`): typed REST client and action producers

pub mod models;
pub mod store;

#[cfg(feature = "http")]
pub mod api;

pub use models::{
    split_skills, CommentView, EducationInput, EducationView, ErrorBody, ExperienceInput,
    ExperienceView, FieldViolation, LikeView, LoginInput, MessageBody, PostView, ProfileInput,
    ProfileView, RegisterInput, SocialLinks, TextInput, TokenResponse, UserRef, UserView,
};
pub use store::{reduce, Action, Alert, AlertKind, ClientState, Context, RequestError};

#[cfg(feature = "http")]
pub use api::{ApiClient, ClientError};
