//! MongoDB-backed stores

use bson::{doc, oid::ObjectId};

use super::{PostStore, ProfileStore, UserStore};
use crate::db::schemas::{
    PostDoc, ProfileDoc, UserDoc, POST_COLLECTION, PROFILE_COLLECTION, USER_COLLECTION,
};
use crate::db::{MongoClient, MongoCollection};
use crate::types::{EntityId, PeerlinkError, Result};

/// MongoDB duplicate key error code
const DUPLICATE_KEY: &str = "E11000";

pub struct MongoStore {
    users: MongoCollection<UserDoc>,
    profiles: MongoCollection<ProfileDoc>,
    posts: MongoCollection<PostDoc>,
}

impl MongoStore {
    /// Open all three collections, applying their indexes
    pub async fn open(client: &MongoClient) -> Result<Self> {
        Ok(Self {
            users: client.collection(USER_COLLECTION).await?,
            profiles: client.collection(PROFILE_COLLECTION).await?,
            posts: client.collection(POST_COLLECTION).await?,
        })
    }
}

#[async_trait::async_trait]
impl UserStore for MongoStore {
    async fn insert_user(&self, user: UserDoc) -> Result<UserDoc> {
        self.users.insert_one(user).await.map_err(|e| match e {
            PeerlinkError::Database(msg) if msg.contains(DUPLICATE_KEY) => {
                PeerlinkError::UserExists
            }
            other => other,
        })
    }

    async fn find_user(&self, id: EntityId) -> Result<Option<UserDoc>> {
        self.users.find_one(doc! { "_id": id.oid() }).await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserDoc>> {
        self.users.find_one(doc! { "email": email }).await
    }

    async fn find_users(&self, ids: &[EntityId]) -> Result<Vec<UserDoc>> {
        let oids: Vec<ObjectId> = ids.iter().map(EntityId::oid).collect();
        self.users
            .find_many(doc! { "_id": { "$in": oids } }, None)
            .await
    }

    async fn delete_user(&self, id: EntityId) -> Result<bool> {
        self.users.delete_one(doc! { "_id": id.oid() }).await
    }
}

#[async_trait::async_trait]
impl ProfileStore for MongoStore {
    async fn find_profile_by_user(&self, user: EntityId) -> Result<Option<ProfileDoc>> {
        self.profiles.find_one(doc! { "user": user.oid() }).await
    }

    async fn list_profiles(&self) -> Result<Vec<ProfileDoc>> {
        self.profiles.find_many(doc! {}, None).await
    }

    async fn insert_profile(&self, profile: ProfileDoc) -> Result<ProfileDoc> {
        self.profiles.insert_one(profile).await
    }

    async fn replace_profile(&self, profile: ProfileDoc) -> Result<ProfileDoc> {
        self.profiles.replace_by_id(profile.id, profile).await
    }

    async fn delete_profile_by_user(&self, user: EntityId) -> Result<bool> {
        self.profiles.delete_one(doc! { "user": user.oid() }).await
    }
}

#[async_trait::async_trait]
impl PostStore for MongoStore {
    async fn insert_post(&self, post: PostDoc) -> Result<PostDoc> {
        self.posts.insert_one(post).await
    }

    async fn list_posts(&self) -> Result<Vec<PostDoc>> {
        self.posts
            .find_many(doc! {}, Some(doc! { "date": -1 }))
            .await
    }

    async fn find_post(&self, id: EntityId) -> Result<Option<PostDoc>> {
        self.posts.find_one(doc! { "_id": id.oid() }).await
    }

    async fn replace_post(&self, post: PostDoc) -> Result<PostDoc> {
        self.posts.replace_by_id(post.id, post).await
    }

    async fn delete_post(&self, id: EntityId) -> Result<bool> {
        self.posts.delete_one(doc! { "_id": id.oid() }).await
    }

    async fn delete_posts_by_user(&self, user: EntityId) -> Result<u64> {
        self.posts.delete_many(doc! { "user": user.oid() }).await
    }
}
