//! Database schemas for Peerlink
//!
//! Three collections. Profiles and posts embed their sub-lists inline.

mod metadata;
mod post;
mod profile;
mod user;

pub use metadata::Metadata;
pub use post::{CommentDoc, LikeDoc, PostDoc, POST_COLLECTION};
pub use profile::{EducationDoc, ExperienceDoc, ProfileDoc, PROFILE_COLLECTION};
pub use user::{UserDoc, USER_COLLECTION};

use bson::DateTime;

pub(crate) fn to_utc(date: DateTime) -> chrono::DateTime<chrono::Utc> {
    date.to_chrono()
}
