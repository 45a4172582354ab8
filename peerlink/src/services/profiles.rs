//! Profile mutation service
//!
//! One profile per user. Submitting the profile form rebuilds every form
//! field from the request; experience, education and identity survive.

use std::collections::HashMap;
use std::sync::Arc;

use bson::{oid::ObjectId, DateTime};
use peerlink_client::{
    split_skills, EducationInput, ExperienceInput, FieldViolation, ProfileInput, ProfileView,
    SocialLinks,
};
use tracing::{debug, info};

use crate::auth::AuthUser;
use crate::db::schemas::{EducationDoc, ExperienceDoc, Metadata, ProfileDoc};
use crate::store::{PostStore, ProfileStore, UserStore};
use crate::types::{EntityId, PeerlinkError, Result};
use crate::validation::{non_blank, Violations};

const NO_PROFILE: &str = "There is no profile for this user";

#[derive(Clone)]
pub struct ProfileService {
    users: Arc<dyn UserStore>,
    profiles: Arc<dyn ProfileStore>,
    posts: Arc<dyn PostStore>,
}

/// Validated form fields of a profile submission
struct ProfileFields {
    company: Option<String>,
    website: Option<String>,
    location: Option<String>,
    bio: Option<String>,
    status: String,
    githubusername: Option<String>,
    skills: Vec<String>,
    social: SocialLinks,
}

impl ProfileFields {
    fn from_input(input: ProfileInput) -> Result<Self> {
        let mut violations = Violations::new();
        violations.require("status", input.status.as_deref(), "Status is required");
        violations.require("skills", input.skills.as_deref(), "Skills is required");
        violations.finish()?;

        Ok(Self {
            company: non_blank(input.company),
            website: non_blank(input.website),
            location: non_blank(input.location),
            bio: non_blank(input.bio),
            status: input.status.unwrap_or_default().trim().to_string(),
            githubusername: non_blank(input.githubusername),
            skills: split_skills(input.skills.as_deref().unwrap_or_default()),
            social: SocialLinks {
                youtube: non_blank(input.youtube),
                facebook: non_blank(input.facebook),
                twitter: non_blank(input.twitter),
                instagram: non_blank(input.instagram),
                linkedin: non_blank(input.linkedin),
            },
        })
    }

    /// Fresh document for `user`, keeping identity and sub-lists from `previous`
    fn into_doc(self, user: ObjectId, previous: Option<ProfileDoc>) -> ProfileDoc {
        let (id, metadata, date, experience, education) = match previous {
            Some(old) => (old.id, old.metadata, old.date, old.experience, old.education),
            None => (
                ObjectId::new(),
                Metadata::new(),
                DateTime::now(),
                Vec::new(),
                Vec::new(),
            ),
        };

        ProfileDoc {
            id,
            metadata,
            user,
            company: self.company,
            website: self.website,
            location: self.location,
            bio: self.bio,
            status: self.status,
            githubusername: self.githubusername,
            skills: self.skills,
            social: self.social,
            experience,
            education,
            date,
        }
    }
}

/// Shared date handling for experience and education entries
fn entry_dates(
    violations: &mut Violations,
    from: Option<&str>,
    to: Option<&str>,
    current: bool,
) -> (Option<DateTime>, Option<DateTime>) {
    violations.require("from", from, "from date is required");
    let from = violations.date("from", from);
    let to = violations.date("to", to);
    (from, if current { None } else { to })
}

impl ProfileService {
    pub fn new(
        users: Arc<dyn UserStore>,
        profiles: Arc<dyn ProfileStore>,
        posts: Arc<dyn PostStore>,
    ) -> Self {
        Self {
            users,
            profiles,
            posts,
        }
    }

    /// Create the caller's profile, or rebuild its form fields from `input`
    pub async fn upsert_profile(&self, auth: AuthUser, input: ProfileInput) -> Result<ProfileView> {
        let fields = ProfileFields::from_input(input)?;
        let existing = self.profiles.find_profile_by_user(auth.id).await?;

        let saved = match existing {
            Some(old) => {
                let doc = fields.into_doc(auth.id.oid(), Some(old));
                debug!("Replacing profile {} for user {}", doc.id, auth.id);
                self.profiles.replace_profile(doc).await?
            }
            None => {
                let doc = fields.into_doc(auth.id.oid(), None);
                info!("Creating profile {} for user {}", doc.id, auth.id);
                self.profiles.insert_profile(doc).await?
            }
        };

        self.render(saved).await
    }

    pub async fn get_own_profile(&self, auth: AuthUser) -> Result<ProfileView> {
        let profile = self.own(auth).await?;
        self.render(profile).await
    }

    /// Every profile, with owner name and avatar joined in
    pub async fn list_profiles(&self) -> Result<Vec<ProfileView>> {
        let profiles = self.profiles.list_profiles().await?;
        let ids: Vec<EntityId> = profiles.iter().map(|p| p.user.into()).collect();
        let users: HashMap<ObjectId, _> = self
            .users
            .find_users(&ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u.to_ref()))
            .collect();

        Ok(profiles
            .iter()
            .map(|p| p.to_view(users.get(&p.user).cloned()))
            .collect())
    }

    /// Public profile lookup by owner id
    pub async fn get_profile_by_user(&self, user_id: &str) -> Result<ProfileView> {
        let user = EntityId::parse(user_id)?;
        let profile = self
            .profiles
            .find_profile_by_user(user)
            .await?
            .ok_or_else(|| PeerlinkError::NotFound("Profile not found".into()))?;
        self.render(profile).await
    }

    pub async fn add_experience(
        &self,
        auth: AuthUser,
        input: ExperienceInput,
    ) -> Result<ProfileView> {
        let current = input.is_current();
        let mut violations = Violations::new();
        violations.require("title", input.title.as_deref(), "Title is required");
        violations.require("company", input.company.as_deref(), "Company is required");
        let (from, to) = entry_dates(
            &mut violations,
            input.from.as_deref(),
            input.to.as_deref(),
            current,
        );
        violations.finish()?;
        let from = from.ok_or_else(missing_from)?;

        let mut profile = self.own(auth).await?;
        let entry = ExperienceDoc {
            id: ObjectId::new(),
            title: input.title.unwrap_or_default().trim().to_string(),
            company: input.company.unwrap_or_default().trim().to_string(),
            location: non_blank(input.location),
            from,
            to,
            current,
            description: non_blank(input.description),
        };
        debug!("Adding experience {} to profile {}", entry.id, profile.id);
        profile.experience.insert(0, entry);

        let saved = self.profiles.replace_profile(profile).await?;
        self.render(saved).await
    }

    pub async fn add_education(
        &self,
        auth: AuthUser,
        input: EducationInput,
    ) -> Result<ProfileView> {
        let current = input.is_current();
        let mut violations = Violations::new();
        violations.require("school", input.school.as_deref(), "school is required");
        violations.require("degree", input.degree.as_deref(), "degree is required");
        violations.require(
            "fieldofstudy",
            input.fieldofstudy.as_deref(),
            "fieldofstudy is required",
        );
        let (from, to) = entry_dates(
            &mut violations,
            input.from.as_deref(),
            input.to.as_deref(),
            current,
        );
        violations.finish()?;
        let from = from.ok_or_else(missing_from)?;

        let mut profile = self.own(auth).await?;
        let entry = EducationDoc {
            id: ObjectId::new(),
            school: input.school.unwrap_or_default().trim().to_string(),
            degree: input.degree.unwrap_or_default().trim().to_string(),
            fieldofstudy: input.fieldofstudy.unwrap_or_default().trim().to_string(),
            from,
            to,
            current,
            description: non_blank(input.description),
        };
        debug!("Adding education {} to profile {}", entry.id, profile.id);
        profile.education.insert(0, entry);

        let saved = self.profiles.replace_profile(profile).await?;
        self.render(saved).await
    }

    /// Remove one experience entry. An id that matches nothing leaves the
    /// list unchanged but the profile is still written back.
    pub async fn remove_experience(&self, auth: AuthUser, entry_id: &str) -> Result<ProfileView> {
        let entry = EntityId::parse(entry_id)?;
        let mut profile = self.own(auth).await?;
        profile.experience.retain(|e| e.id != entry.oid());

        let saved = self.profiles.replace_profile(profile).await?;
        self.render(saved).await
    }

    /// Remove one education entry, with the same unmatched-id behavior as experience
    pub async fn remove_education(&self, auth: AuthUser, entry_id: &str) -> Result<ProfileView> {
        let entry = EntityId::parse(entry_id)?;
        let mut profile = self.own(auth).await?;
        profile.education.retain(|e| e.id != entry.oid());

        let saved = self.profiles.replace_profile(profile).await?;
        self.render(saved).await
    }

    /// Delete the caller's posts, profile and user record, in that order
    pub async fn delete_account(&self, auth: AuthUser) -> Result<()> {
        let posts = self.posts.delete_posts_by_user(auth.id).await?;
        let profile = self.profiles.delete_profile_by_user(auth.id).await?;
        let user = self.users.delete_user(auth.id).await?;

        info!(
            "Deleted account {} (posts: {}, profile: {}, user: {})",
            auth.id, posts, profile, user
        );
        Ok(())
    }

    async fn own(&self, auth: AuthUser) -> Result<ProfileDoc> {
        self.profiles
            .find_profile_by_user(auth.id)
            .await?
            .ok_or_else(|| PeerlinkError::NotFound(NO_PROFILE.into()))
    }

    async fn render(&self, profile: ProfileDoc) -> Result<ProfileView> {
        let user = self.users.find_user(profile.user.into()).await?;
        Ok(profile.to_view(user.map(|u| u.to_ref())))
    }
}

fn missing_from() -> PeerlinkError {
    PeerlinkError::Validation(vec![FieldViolation::new(
        "from",
        "from date is required",
    )])
}
