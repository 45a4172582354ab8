//! Profile document schema
//!
//! One profile per user. Experience and education entries live inline,
//! newest first.

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use peerlink_client::{EducationView, ExperienceView, ProfileView, SocialLinks, UserRef};
use serde::{Deserialize, Serialize};

use super::to_utc;
use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for profiles
pub const PROFILE_COLLECTION: &str = "profiles";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ExperienceDoc {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub company: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub from: DateTime,
    /// Always None while `current` is set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<DateTime>,
    #[serde(default)]
    pub current: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ExperienceDoc {
    pub fn to_view(&self) -> ExperienceView {
        ExperienceView {
            id: self.id.to_hex(),
            title: self.title.clone(),
            company: self.company.clone(),
            location: self.location.clone(),
            from: to_utc(self.from),
            to: self.to.map(to_utc),
            current: self.current,
            description: self.description.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct EducationDoc {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub school: String,
    pub degree: String,
    pub fieldofstudy: String,
    pub from: DateTime,
    /// Always None while `current` is set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<DateTime>,
    #[serde(default)]
    pub current: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl EducationDoc {
    pub fn to_view(&self) -> EducationView {
        EducationView {
            id: self.id.to_hex(),
            school: self.school.clone(),
            degree: self.degree.clone(),
            fieldofstudy: self.fieldofstudy.clone(),
            from: to_utc(self.from),
            to: self.to.map(to_utc),
            current: self.current,
            description: self.description.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ProfileDoc {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    #[serde(default)]
    pub metadata: Metadata,

    /// Owning user; unique across profiles
    pub user: ObjectId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub githubusername: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub social: SocialLinks,
    #[serde(default)]
    pub experience: Vec<ExperienceDoc>,
    #[serde(default)]
    pub education: Vec<EducationDoc>,

    pub date: DateTime,
}

impl ProfileDoc {
    /// Render with the owning user's name and avatar joined in.
    /// A profile whose user has vanished still renders, with blank user fields.
    pub fn to_view(&self, user: Option<UserRef>) -> ProfileView {
        let user = user.unwrap_or_else(|| UserRef {
            id: self.user.to_hex(),
            name: String::new(),
            avatar: String::new(),
        });

        ProfileView {
            id: self.id.to_hex(),
            user,
            company: self.company.clone(),
            website: self.website.clone(),
            location: self.location.clone(),
            bio: self.bio.clone(),
            status: self.status.clone(),
            githubusername: self.githubusername.clone(),
            skills: self.skills.clone(),
            social: self.social.clone(),
            experience: self.experience.iter().map(ExperienceDoc::to_view).collect(),
            education: self.education.iter().map(EducationDoc::to_view).collect(),
            date: to_utc(self.date),
        }
    }
}

impl IntoIndexes for ProfileDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "user": 1 },
            Some(
                IndexOptions::builder()
                    .unique(true)
                    .name("user_unique".to_string())
                    .build(),
            ),
        )]
    }
}

impl MutMetadata for ProfileDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
