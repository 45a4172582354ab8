//! Post document schema
//!
//! Author name and avatar are copied in when the post or comment is written
//! and are not kept in sync with the user afterwards.

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use peerlink_client::{CommentView, LikeView, PostView};
use serde::{Deserialize, Serialize};

use super::to_utc;
use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for posts
pub const POST_COLLECTION: &str = "posts";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LikeDoc {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub user: ObjectId,
}

impl LikeDoc {
    pub fn new(user: ObjectId) -> Self {
        Self {
            id: ObjectId::new(),
            user,
        }
    }

    pub fn to_view(&self) -> LikeView {
        LikeView {
            id: self.id.to_hex(),
            user: self.user.to_hex(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CommentDoc {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub user: ObjectId,
    pub text: String,
    pub name: String,
    pub avatar: String,
    pub date: DateTime,
}

impl CommentDoc {
    pub fn to_view(&self) -> CommentView {
        CommentView {
            id: self.id.to_hex(),
            user: self.user.to_hex(),
            text: self.text.clone(),
            name: self.name.clone(),
            avatar: self.avatar.clone(),
            date: to_utc(self.date),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PostDoc {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    #[serde(default)]
    pub metadata: Metadata,

    pub user: ObjectId,
    pub text: String,
    pub name: String,
    pub avatar: String,

    /// At most one entry per user, newest first
    #[serde(default)]
    pub likes: Vec<LikeDoc>,

    /// Newest first
    #[serde(default)]
    pub comments: Vec<CommentDoc>,

    pub date: DateTime,
}

impl PostDoc {
    pub fn new(user: ObjectId, text: String, name: String, avatar: String) -> Self {
        Self {
            id: ObjectId::new(),
            metadata: Metadata::new(),
            user,
            text,
            name,
            avatar,
            likes: Vec::new(),
            comments: Vec::new(),
            date: DateTime::now(),
        }
    }

    pub fn is_liked_by(&self, user: ObjectId) -> bool {
        self.likes.iter().any(|like| like.user == user)
    }

    pub fn like_views(&self) -> Vec<LikeView> {
        self.likes.iter().map(LikeDoc::to_view).collect()
    }

    pub fn comment_views(&self) -> Vec<CommentView> {
        self.comments.iter().map(CommentDoc::to_view).collect()
    }

    pub fn to_view(&self) -> PostView {
        PostView {
            id: self.id.to_hex(),
            user: self.user.to_hex(),
            text: self.text.clone(),
            name: self.name.clone(),
            avatar: self.avatar.clone(),
            likes: self.like_views(),
            comments: self.comment_views(),
            date: to_utc(self.date),
        }
    }
}

impl IntoIndexes for PostDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            (
                doc! { "user": 1 },
                Some(IndexOptions::builder().name("user_index".to_string()).build()),
            ),
            (
                doc! { "date": -1 },
                Some(IndexOptions::builder().name("date_desc".to_string()).build()),
            ),
        ]
    }
}

impl MutMetadata for PostDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
