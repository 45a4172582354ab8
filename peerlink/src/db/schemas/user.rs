//! User document schema
//!
//! Account credentials plus the avatar reference snapshotted into posts.

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use peerlink_client::{UserRef, UserView};
use serde::{Deserialize, Serialize};

use super::to_utc;
use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for users
pub const USER_COLLECTION: &str = "users";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct UserDoc {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    #[serde(default)]
    pub metadata: Metadata,

    pub name: String,

    /// Stored lower-cased; unique across users
    pub email: String,

    /// Argon2 password hash
    pub password_hash: String,

    pub avatar: String,

    /// Registration time
    pub date: DateTime,
}

impl UserDoc {
    pub fn new(name: String, email: String, password_hash: String, avatar: String) -> Self {
        Self {
            id: ObjectId::new(),
            metadata: Metadata::new(),
            name,
            email,
            password_hash,
            avatar,
            date: DateTime::now(),
        }
    }

    pub fn to_view(&self) -> UserView {
        UserView {
            id: self.id.to_hex(),
            name: self.name.clone(),
            email: self.email.clone(),
            avatar: self.avatar.clone(),
            date: to_utc(self.date),
        }
    }

    pub fn to_ref(&self) -> UserRef {
        UserRef {
            id: self.id.to_hex(),
            name: self.name.clone(),
            avatar: self.avatar.clone(),
        }
    }
}

impl IntoIndexes for UserDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "email": 1 },
            Some(
                IndexOptions::builder()
                    .unique(true)
                    .name("email_unique".to_string())
                    .build(),
            ),
        )]
    }
}

impl MutMetadata for UserDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
