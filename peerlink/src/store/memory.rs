//! In-memory stores
//!
//! Same contract as the MongoDB stores, held in process memory. Used when
//! dev mode runs without a database, and by tests.

use bson::DateTime;
use tokio::sync::RwLock;

use super::{PostStore, ProfileStore, UserStore};
use crate::db::schemas::{PostDoc, ProfileDoc, UserDoc};
use crate::types::{EntityId, PeerlinkError, Result};

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<Vec<UserDoc>>,
    profiles: RwLock<Vec<ProfileDoc>>,
    posts: RwLock<Vec<PostDoc>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn missing(kind: &str, id: impl std::fmt::Display) -> PeerlinkError {
    PeerlinkError::NotFound(format!("{kind} {id} not found"))
}

#[async_trait::async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, mut user: UserDoc) -> Result<UserDoc> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(PeerlinkError::UserExists);
        }
        let now = DateTime::now();
        user.metadata.created_at = Some(now);
        user.metadata.updated_at = Some(now);
        users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: EntityId) -> Result<Option<UserDoc>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id.oid()).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserDoc>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_users(&self, ids: &[EntityId]) -> Result<Vec<UserDoc>> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .filter(|u| ids.iter().any(|id| id.oid() == u.id))
            .cloned()
            .collect())
    }

    async fn delete_user(&self, id: EntityId) -> Result<bool> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|u| u.id != id.oid());
        Ok(users.len() != before)
    }
}

#[async_trait::async_trait]
impl ProfileStore for MemoryStore {
    async fn find_profile_by_user(&self, user: EntityId) -> Result<Option<ProfileDoc>> {
        let profiles = self.profiles.read().await;
        Ok(profiles.iter().find(|p| p.user == user.oid()).cloned())
    }

    async fn list_profiles(&self) -> Result<Vec<ProfileDoc>> {
        Ok(self.profiles.read().await.clone())
    }

    async fn insert_profile(&self, mut profile: ProfileDoc) -> Result<ProfileDoc> {
        let mut profiles = self.profiles.write().await;
        if profiles.iter().any(|p| p.user == profile.user) {
            return Err(PeerlinkError::Database(format!(
                "duplicate profile for user {}",
                profile.user
            )));
        }
        let now = DateTime::now();
        profile.metadata.created_at = Some(now);
        profile.metadata.updated_at = Some(now);
        profiles.push(profile.clone());
        Ok(profile)
    }

    async fn replace_profile(&self, mut profile: ProfileDoc) -> Result<ProfileDoc> {
        let mut profiles = self.profiles.write().await;
        let slot = profiles
            .iter_mut()
            .find(|p| p.id == profile.id)
            .ok_or_else(|| missing("Profile", profile.id))?;
        profile.metadata.updated_at = Some(DateTime::now());
        *slot = profile.clone();
        Ok(profile)
    }

    async fn delete_profile_by_user(&self, user: EntityId) -> Result<bool> {
        let mut profiles = self.profiles.write().await;
        let before = profiles.len();
        profiles.retain(|p| p.user != user.oid());
        Ok(profiles.len() != before)
    }
}

#[async_trait::async_trait]
impl PostStore for MemoryStore {
    async fn insert_post(&self, mut post: PostDoc) -> Result<PostDoc> {
        let now = DateTime::now();
        post.metadata.created_at = Some(now);
        post.metadata.updated_at = Some(now);
        self.posts.write().await.push(post.clone());
        Ok(post)
    }

    async fn list_posts(&self) -> Result<Vec<PostDoc>> {
        // Reverse first so posts sharing a timestamp keep newest-inserted first
        let mut posts: Vec<PostDoc> = self.posts.read().await.iter().rev().cloned().collect();
        posts.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(posts)
    }

    async fn find_post(&self, id: EntityId) -> Result<Option<PostDoc>> {
        let posts = self.posts.read().await;
        Ok(posts.iter().find(|p| p.id == id.oid()).cloned())
    }

    async fn replace_post(&self, mut post: PostDoc) -> Result<PostDoc> {
        let mut posts = self.posts.write().await;
        let slot = posts
            .iter_mut()
            .find(|p| p.id == post.id)
            .ok_or_else(|| missing("Post", post.id))?;
        post.metadata.updated_at = Some(DateTime::now());
        *slot = post.clone();
        Ok(post)
    }

    async fn delete_post(&self, id: EntityId) -> Result<bool> {
        let mut posts = self.posts.write().await;
        let before = posts.len();
        posts.retain(|p| p.id != id.oid());
        Ok(posts.len() != before)
    }

    async fn delete_posts_by_user(&self, user: EntityId) -> Result<u64> {
        let mut posts = self.posts.write().await;
        let before = posts.len();
        posts.retain(|p| p.user != user.oid());
        Ok((before - posts.len()) as u64)
    }
}
