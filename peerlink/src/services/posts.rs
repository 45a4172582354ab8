//! Post interaction service
//!
//! Existence is always checked before ownership, so a missing post or
//! comment reports `NotFound` whoever asks.

use std::sync::Arc;

use bson::{oid::ObjectId, DateTime};
use peerlink_client::{CommentView, LikeView, PostView};
use tracing::{debug, info};

use crate::auth::AuthUser;
use crate::db::schemas::{CommentDoc, LikeDoc, PostDoc, UserDoc};
use crate::store::{PostStore, UserStore};
use crate::types::{EntityId, PeerlinkError, Result};
use crate::validation::Violations;

const NOT_AUTHORIZED: &str = "User not authorized";

#[derive(Clone)]
pub struct PostService {
    users: Arc<dyn UserStore>,
    posts: Arc<dyn PostStore>,
}

fn require_text(text: &str) -> Result<String> {
    let mut violations = Violations::new();
    violations.require("text", Some(text), "Text is required");
    violations.finish()?;
    Ok(text.trim().to_string())
}

impl PostService {
    pub fn new(users: Arc<dyn UserStore>, posts: Arc<dyn PostStore>) -> Self {
        Self { users, posts }
    }

    /// Publish a post with the caller's current name and avatar copied in
    pub async fn create_post(&self, auth: AuthUser, text: &str) -> Result<PostView> {
        let text = require_text(text)?;
        let author = self.author(auth).await?;

        let post = PostDoc::new(author.id, text, author.name, author.avatar);
        let post = self.posts.insert_post(post).await?;
        info!("User {} created post {}", auth.id, post.id);
        Ok(post.to_view())
    }

    /// Newest first
    pub async fn list_posts(&self) -> Result<Vec<PostView>> {
        let posts = self.posts.list_posts().await?;
        Ok(posts.iter().map(PostDoc::to_view).collect())
    }

    pub async fn get_post(&self, post_id: &str) -> Result<PostView> {
        Ok(self.post(post_id).await?.to_view())
    }

    pub async fn delete_post(&self, auth: AuthUser, post_id: &str) -> Result<()> {
        let post = self.post(post_id).await?;
        if post.user != auth.id.oid() {
            return Err(PeerlinkError::Forbidden(NOT_AUTHORIZED.into()));
        }

        self.posts.delete_post(post.id.into()).await?;
        info!("User {} deleted post {}", auth.id, post.id);
        Ok(())
    }

    /// Add the caller to the post's likes, newest first
    pub async fn like_post(&self, auth: AuthUser, post_id: &str) -> Result<Vec<LikeView>> {
        let mut post = self.post(post_id).await?;
        if post.is_liked_by(auth.id.oid()) {
            return Err(PeerlinkError::AlreadyLiked);
        }

        post.likes.insert(0, LikeDoc::new(auth.id.oid()));
        let post = self.posts.replace_post(post).await?;
        debug!("User {} liked post {}", auth.id, post.id);
        Ok(post.like_views())
    }

    /// Drop every like the caller holds on the post
    pub async fn unlike_post(&self, auth: AuthUser, post_id: &str) -> Result<Vec<LikeView>> {
        let mut post = self.post(post_id).await?;
        if !post.is_liked_by(auth.id.oid()) {
            return Err(PeerlinkError::NotLiked);
        }

        post.likes.retain(|like| like.user != auth.id.oid());
        let post = self.posts.replace_post(post).await?;
        debug!("User {} unliked post {}", auth.id, post.id);
        Ok(post.like_views())
    }

    pub async fn add_comment(
        &self,
        auth: AuthUser,
        post_id: &str,
        text: &str,
    ) -> Result<Vec<CommentView>> {
        let text = require_text(text)?;
        let mut post = self.post(post_id).await?;
        let author = self.author(auth).await?;

        let comment = CommentDoc {
            id: ObjectId::new(),
            user: author.id,
            text,
            name: author.name,
            avatar: author.avatar,
            date: DateTime::now(),
        };
        debug!("User {} commented {} on post {}", auth.id, comment.id, post.id);
        post.comments.insert(0, comment);

        let post = self.posts.replace_post(post).await?;
        Ok(post.comment_views())
    }

    pub async fn delete_comment(
        &self,
        auth: AuthUser,
        post_id: &str,
        comment_id: &str,
    ) -> Result<Vec<CommentView>> {
        let mut post = self.post(post_id).await?;
        let comment_id = EntityId::parse(comment_id)?;

        let comment = post
            .comments
            .iter()
            .find(|c| c.id == comment_id.oid())
            .ok_or_else(|| PeerlinkError::NotFound("Comment does not exist".into()))?;
        if comment.user != auth.id.oid() {
            return Err(PeerlinkError::Forbidden(NOT_AUTHORIZED.into()));
        }

        post.comments.retain(|c| c.id != comment_id.oid());
        let post = self.posts.replace_post(post).await?;
        debug!("User {} removed comment {} from post {}", auth.id, comment_id, post.id);
        Ok(post.comment_views())
    }

    async fn post(&self, post_id: &str) -> Result<PostDoc> {
        let id = EntityId::parse(post_id)?;
        self.posts
            .find_post(id)
            .await?
            .ok_or_else(|| PeerlinkError::NotFound("Post not found".into()))
    }

    async fn author(&self, auth: AuthUser) -> Result<UserDoc> {
        self.users
            .find_user(auth.id)
            .await?
            .ok_or_else(|| PeerlinkError::NotFound("User not found".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Stores;

    struct Fixture {
        stores: Stores,
        service: PostService,
    }

    fn fixture() -> Fixture {
        let stores = Stores::memory();
        let service = PostService::new(stores.users.clone(), stores.posts.clone());
        Fixture { stores, service }
    }

    async fn user(stores: &Stores, name: &str) -> AuthUser {
        let doc = UserDoc::new(
            name.to_string(),
            format!("{}@example.com", name.to_lowercase()),
            "hash".to_string(),
            format!("https://avatars.test/{name}"),
        );
        let doc = stores.users.insert_user(doc).await.unwrap();
        AuthUser { id: doc.id.into() }
    }

    #[tokio::test]
    async fn test_create_post_snapshots_author() {
        let f = fixture();
        let ada = user(&f.stores, "Ada").await;

        let post = f.service.create_post(ada, "hello").await.unwrap();
        assert_eq!(post.name, "Ada");
        assert_eq!(post.avatar, "https://avatars.test/Ada");
        assert_eq!(post.user, ada.id.to_string());

        f.stores.users.delete_user(ada.id).await.unwrap();
        let fetched = f.service.get_post(&post.id).await.unwrap();
        assert_eq!(fetched.name, "Ada");
    }

    #[tokio::test]
    async fn test_empty_text_rejected() {
        let f = fixture();
        let ada = user(&f.stores, "Ada").await;

        let err = f.service.create_post(ada, "   ").await.unwrap_err();
        assert!(matches!(err, PeerlinkError::Validation(_)));
        assert!(f.service.list_posts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_like_twice_rejected_and_unlike_restores() {
        let f = fixture();
        let ada = user(&f.stores, "Ada").await;
        let grace = user(&f.stores, "Grace").await;
        let post = f.service.create_post(ada, "hello").await.unwrap();

        let likes = f.service.like_post(grace, &post.id).await.unwrap();
        assert_eq!(likes.len(), 1);
        assert_eq!(likes[0].user, grace.id.to_string());

        let again = f.service.like_post(grace, &post.id).await.unwrap_err();
        assert!(matches!(again, PeerlinkError::AlreadyLiked));

        let likes = f.service.unlike_post(grace, &post.id).await.unwrap();
        assert!(likes.is_empty());
    }

    #[tokio::test]
    async fn test_unlike_never_liked_rejected() {
        let f = fixture();
        let ada = user(&f.stores, "Ada").await;
        let post = f.service.create_post(ada, "hello").await.unwrap();

        let err = f.service.unlike_post(ada, &post.id).await.unwrap_err();
        assert!(matches!(err, PeerlinkError::NotLiked));
    }

    #[tokio::test]
    async fn test_like_newest_first() {
        let f = fixture();
        let ada = user(&f.stores, "Ada").await;
        let grace = user(&f.stores, "Grace").await;
        let post = f.service.create_post(ada, "hello").await.unwrap();

        f.service.like_post(ada, &post.id).await.unwrap();
        let likes = f.service.like_post(grace, &post.id).await.unwrap();
        assert_eq!(likes[0].user, grace.id.to_string());
        assert_eq!(likes[1].user, ada.id.to_string());
    }

    #[tokio::test]
    async fn test_like_missing_post_is_not_found() {
        let f = fixture();
        let ada = user(&f.stores, "Ada").await;

        let err = f
            .service
            .like_post(ada, &ObjectId::new().to_hex())
            .await
            .unwrap_err();
        assert!(matches!(err, PeerlinkError::NotFound(_)));

        let err = f.service.like_post(ada, "garbage").await.unwrap_err();
        assert!(matches!(err, PeerlinkError::InvalidIdentifier(_)));
    }

    #[tokio::test]
    async fn test_delete_post_checks_existence_then_owner() {
        let f = fixture();
        let ada = user(&f.stores, "Ada").await;
        let grace = user(&f.stores, "Grace").await;
        let post = f.service.create_post(ada, "hello").await.unwrap();

        let missing = f
            .service
            .delete_post(grace, &ObjectId::new().to_hex())
            .await
            .unwrap_err();
        assert!(matches!(missing, PeerlinkError::NotFound(_)));

        let not_owner = f.service.delete_post(grace, &post.id).await.unwrap_err();
        assert!(matches!(not_owner, PeerlinkError::Forbidden(_)));

        f.service.delete_post(ada, &post.id).await.unwrap();
        assert!(matches!(
            f.service.get_post(&post.id).await,
            Err(PeerlinkError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_comments_prepend_and_owner_removes() {
        let f = fixture();
        let ada = user(&f.stores, "Ada").await;
        let grace = user(&f.stores, "Grace").await;
        let post = f.service.create_post(ada, "hello").await.unwrap();

        f.service.add_comment(ada, &post.id, "first").await.unwrap();
        let comments = f.service.add_comment(grace, &post.id, "second").await.unwrap();
        assert_eq!(comments[0].text, "second");
        assert_eq!(comments[0].name, "Grace");
        assert_eq!(comments[1].text, "first");

        let grace_comment = comments[0].id.clone();
        let not_owner = f
            .service
            .delete_comment(ada, &post.id, &grace_comment)
            .await
            .unwrap_err();
        assert!(matches!(not_owner, PeerlinkError::Forbidden(_)));

        let missing = f
            .service
            .delete_comment(ada, &post.id, &ObjectId::new().to_hex())
            .await
            .unwrap_err();
        assert!(matches!(missing, PeerlinkError::NotFound(_)));

        let remaining = f
            .service
            .delete_comment(grace, &post.id, &grace_comment)
            .await
            .unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].text, "first");
    }

    #[tokio::test]
    async fn test_empty_comment_rejected() {
        let f = fixture();
        let ada = user(&f.stores, "Ada").await;
        let post = f.service.create_post(ada, "hello").await.unwrap();

        let err = f.service.add_comment(ada, &post.id, "").await.unwrap_err();
        assert!(matches!(err, PeerlinkError::Validation(_)));
    }

    #[tokio::test]
    async fn test_list_posts_newest_first() {
        let f = fixture();
        let ada = user(&f.stores, "Ada").await;

        f.service.create_post(ada, "older").await.unwrap();
        f.service.create_post(ada, "newer").await.unwrap();

        let texts: Vec<String> = f
            .service
            .list_posts()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.text)
            .collect();
        assert_eq!(texts, vec!["newer", "older"]);
    }
}
