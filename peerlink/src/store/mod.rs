//! Storage seam for users, profiles and posts
//!
//! Services talk to these traits only. `MongoStore` backs production;
//! `MemoryStore` backs dev mode without a database and the test suite.
//!
//! Every mutation is a single read-modify-write of one document with no
//! optimistic locking: concurrent writers to the same document race and the
//! last write wins.

mod memory;
mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

use std::sync::Arc;

use crate::db::schemas::{PostDoc, ProfileDoc, UserDoc};
use crate::db::MongoClient;
use crate::types::{EntityId, Result};

#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `UserExists` when the email is taken
    async fn insert_user(&self, user: UserDoc) -> Result<UserDoc>;
    async fn find_user(&self, id: EntityId) -> Result<Option<UserDoc>>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserDoc>>;
    async fn find_users(&self, ids: &[EntityId]) -> Result<Vec<UserDoc>>;
    async fn delete_user(&self, id: EntityId) -> Result<bool>;
}

#[async_trait::async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find_profile_by_user(&self, user: EntityId) -> Result<Option<ProfileDoc>>;
    async fn list_profiles(&self) -> Result<Vec<ProfileDoc>>;
    async fn insert_profile(&self, profile: ProfileDoc) -> Result<ProfileDoc>;
    /// Overwrite the stored profile with the same `_id`
    async fn replace_profile(&self, profile: ProfileDoc) -> Result<ProfileDoc>;
    async fn delete_profile_by_user(&self, user: EntityId) -> Result<bool>;
}

#[async_trait::async_trait]
pub trait PostStore: Send + Sync {
    async fn insert_post(&self, post: PostDoc) -> Result<PostDoc>;
    /// Newest first
    async fn list_posts(&self) -> Result<Vec<PostDoc>>;
    async fn find_post(&self, id: EntityId) -> Result<Option<PostDoc>>;
    /// Overwrite the stored post with the same `_id`
    async fn replace_post(&self, post: PostDoc) -> Result<PostDoc>;
    async fn delete_post(&self, id: EntityId) -> Result<bool>;
    async fn delete_posts_by_user(&self, user: EntityId) -> Result<u64>;
}

/// Which backend a `Stores` bundle is using
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Mongo,
    Memory,
}

impl StoreKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKind::Mongo => "mongodb",
            StoreKind::Memory => "memory",
        }
    }
}

/// The three stores, shared by every service
#[derive(Clone)]
pub struct Stores {
    pub kind: StoreKind,
    pub users: Arc<dyn UserStore>,
    pub profiles: Arc<dyn ProfileStore>,
    pub posts: Arc<dyn PostStore>,
}

impl Stores {
    pub fn memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            kind: StoreKind::Memory,
            users: store.clone(),
            profiles: store.clone(),
            posts: store,
        }
    }

    pub async fn mongo(client: &MongoClient) -> Result<Self> {
        let store = Arc::new(MongoStore::open(client).await?);
        Ok(Self {
            kind: StoreKind::Mongo,
            users: store.clone(),
            profiles: store.clone(),
            posts: store,
        })
    }
}
