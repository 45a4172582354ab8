//! Typed HTTP client for the Peerlink REST API
//!
//! Two layers:
//! - request methods (`posts()`, `like_post()`, ...) returning typed bodies
//!   or a [`ClientError`]
//! - action producers (`load_posts()`, `add_like()`, ...) that turn the
//!   outcome of a call into the [`Action`]s a view dispatches into its
//!   [`Context`](crate::store::Context)

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::models::{
    CommentView, EducationInput, ErrorBody, ExperienceInput, LikeView, LoginInput, MessageBody,
    PostView, ProfileInput, ProfileView, RegisterInput, TextInput, TokenResponse, UserView,
};
use crate::store::{Action, RequestError};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP {status}: {}", body.msg)]
    Status { status: u16, body: ErrorBody },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response body: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn status(&self) -> u16 {
        match self {
            ClientError::Status { status, .. } => *status,
            _ => 0,
        }
    }

    /// One alert per field violation, or the top-level message
    pub fn alerts(&self) -> Vec<Action> {
        match self {
            ClientError::Status { body, .. } if !body.errors.is_empty() => body
                .errors
                .iter()
                .map(|violation| Action::danger(violation.msg.clone()))
                .collect(),
            ClientError::Status { body, .. } => vec![Action::danger(body.msg.clone())],
            other => vec![Action::danger(other.to_string())],
        }
    }

    pub fn to_request_error(&self) -> RequestError {
        let msg = match self {
            ClientError::Status { status, body } => StatusCode::from_u16(*status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .map(str::to_string)
                .unwrap_or_else(|| body.msg.clone()),
            other => other.to_string(),
        };
        RequestError {
            msg,
            status: self.status(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Copy of this client that authenticates with `token`
    pub fn with_token(&self, token: Option<String>) -> Self {
        Self {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            token,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let response = builder
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .json::<ErrorBody>()
                .await
                .unwrap_or_else(|_| {
                    ErrorBody::message(status.canonical_reason().unwrap_or("Request failed"))
                });
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
    ) -> Result<T, ClientError> {
        self.send(self.request(method, path)).await
    }

    async fn call_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        self.send(self.request(method, path).json(body)).await
    }

    // -------------------------------------------------------------------------
    // Accounts
    // -------------------------------------------------------------------------

    pub async fn register(&self, input: &RegisterInput) -> Result<TokenResponse, ClientError> {
        self.call_json(Method::POST, "/api/users", input).await
    }

    pub async fn login(&self, input: &LoginInput) -> Result<TokenResponse, ClientError> {
        self.call_json(Method::POST, "/api/auth", input).await
    }

    pub async fn current_user(&self) -> Result<UserView, ClientError> {
        self.call(Method::GET, "/api/auth").await
    }

    // -------------------------------------------------------------------------
    // Profiles
    // -------------------------------------------------------------------------

    pub async fn current_profile(&self) -> Result<ProfileView, ClientError> {
        self.call(Method::GET, "/api/profiles/me").await
    }

    pub async fn profiles(&self) -> Result<Vec<ProfileView>, ClientError> {
        self.call(Method::GET, "/api/profiles").await
    }

    pub async fn profile_by_user(&self, user_id: &str) -> Result<ProfileView, ClientError> {
        self.call(Method::GET, &format!("/api/profiles/user/{user_id}"))
            .await
    }

    pub async fn upsert_profile(&self, input: &ProfileInput) -> Result<ProfileView, ClientError> {
        self.call_json(Method::POST, "/api/profiles", input).await
    }

    pub async fn delete_account(&self) -> Result<MessageBody, ClientError> {
        self.call(Method::DELETE, "/api/profiles").await
    }

    pub async fn add_experience(
        &self,
        input: &ExperienceInput,
    ) -> Result<ProfileView, ClientError> {
        self.call_json(Method::PUT, "/api/profiles/experience", input)
            .await
    }

    pub async fn delete_experience(&self, id: &str) -> Result<ProfileView, ClientError> {
        self.call(Method::DELETE, &format!("/api/profiles/experience/{id}"))
            .await
    }

    pub async fn add_education(&self, input: &EducationInput) -> Result<ProfileView, ClientError> {
        self.call_json(Method::PUT, "/api/profiles/education", input)
            .await
    }

    pub async fn delete_education(&self, id: &str) -> Result<ProfileView, ClientError> {
        self.call(Method::DELETE, &format!("/api/profiles/education/{id}"))
            .await
    }

    pub async fn github_repos(&self, username: &str) -> Result<Vec<JsonValue>, ClientError> {
        self.call(Method::GET, &format!("/api/profiles/github/{username}"))
            .await
    }

    // -------------------------------------------------------------------------
    // Posts
    // -------------------------------------------------------------------------

    pub async fn posts(&self) -> Result<Vec<PostView>, ClientError> {
        self.call(Method::GET, "/api/posts").await
    }

    pub async fn post(&self, id: &str) -> Result<PostView, ClientError> {
        self.call(Method::GET, &format!("/api/posts/{id}")).await
    }

    pub async fn create_post(&self, text: &str) -> Result<PostView, ClientError> {
        let body = TextInput::new(text);
        self.call_json(Method::POST, "/api/posts", &body).await
    }

    pub async fn delete_post(&self, id: &str) -> Result<MessageBody, ClientError> {
        self.call(Method::DELETE, &format!("/api/posts/{id}")).await
    }

    pub async fn like_post(&self, id: &str) -> Result<Vec<LikeView>, ClientError> {
        self.call(Method::PUT, &format!("/api/posts/likes/{id}")).await
    }

    pub async fn unlike_post(&self, id: &str) -> Result<Vec<LikeView>, ClientError> {
        self.call(Method::PUT, &format!("/api/posts/unlikes/{id}"))
            .await
    }

    pub async fn add_comment(
        &self,
        post_id: &str,
        text: &str,
    ) -> Result<Vec<CommentView>, ClientError> {
        let body = TextInput::new(text);
        self.call_json(Method::POST, &format!("/api/posts/comment/{post_id}"), &body)
            .await
    }

    pub async fn delete_comment(
        &self,
        post_id: &str,
        comment_id: &str,
    ) -> Result<Vec<CommentView>, ClientError> {
        self.call(
            Method::DELETE,
            &format!("/api/posts/comment/{post_id}/{comment_id}"),
        )
        .await
    }

    // -------------------------------------------------------------------------
    // Action producers
    // -------------------------------------------------------------------------

    pub async fn load_user(&self) -> Vec<Action> {
        match self.current_user().await {
            Ok(user) => vec![Action::UserLoaded(user)],
            Err(_) => vec![Action::AuthError],
        }
    }

    pub async fn register_account(&self, input: &RegisterInput) -> Vec<Action> {
        match self.register(input).await {
            Ok(TokenResponse { token }) => vec![Action::RegisterSuccess { token }],
            Err(e) => with_alerts(&e, Action::RegisterFail),
        }
    }

    pub async fn log_in(&self, input: &LoginInput) -> Vec<Action> {
        match self.login(input).await {
            Ok(TokenResponse { token }) => vec![Action::LoginSuccess { token }],
            Err(e) => with_alerts(&e, Action::LoginFail),
        }
    }

    pub async fn load_current_profile(&self) -> Vec<Action> {
        match self.current_profile().await {
            Ok(profile) => vec![Action::GetProfile(profile)],
            Err(e) => vec![Action::ProfileError(e.to_request_error())],
        }
    }

    pub async fn load_profiles(&self) -> Vec<Action> {
        let mut actions = vec![Action::ClearProfile];
        match self.profiles().await {
            Ok(profiles) => actions.push(Action::GetProfiles(profiles)),
            Err(e) => actions.push(Action::ProfileError(e.to_request_error())),
        }
        actions
    }

    pub async fn load_profile_by_user(&self, user_id: &str) -> Vec<Action> {
        match self.profile_by_user(user_id).await {
            Ok(profile) => vec![Action::GetProfile(profile)],
            Err(e) => vec![Action::ProfileError(e.to_request_error())],
        }
    }

    pub async fn load_repos(&self, username: &str) -> Vec<Action> {
        match self.github_repos(username).await {
            Ok(repos) => vec![Action::GetRepos(repos)],
            Err(e) => vec![Action::ProfileError(e.to_request_error())],
        }
    }

    pub async fn save_profile(&self, input: &ProfileInput, edit: bool) -> Vec<Action> {
        match self.upsert_profile(input).await {
            Ok(profile) => vec![
                Action::GetProfile(profile),
                Action::success(if edit { "Profile Updated" } else { "Profile Created" }),
            ],
            Err(e) => with_alerts(&e, Action::ProfileError(e.to_request_error())),
        }
    }

    pub async fn save_experience(&self, input: &ExperienceInput) -> Vec<Action> {
        match self.add_experience(input).await {
            Ok(profile) => vec![
                Action::UpdateProfile(profile),
                Action::success("Experience added"),
            ],
            Err(e) => with_alerts(&e, Action::ProfileError(e.to_request_error())),
        }
    }

    pub async fn save_education(&self, input: &EducationInput) -> Vec<Action> {
        match self.add_education(input).await {
            Ok(profile) => vec![
                Action::UpdateProfile(profile),
                Action::success("Education added"),
            ],
            Err(e) => with_alerts(&e, Action::ProfileError(e.to_request_error())),
        }
    }

    pub async fn remove_experience(&self, id: &str) -> Vec<Action> {
        match self.delete_experience(id).await {
            Ok(profile) => vec![
                Action::UpdateProfile(profile),
                Action::success("Experience Removed"),
            ],
            Err(e) => vec![Action::ProfileError(e.to_request_error())],
        }
    }

    pub async fn remove_education(&self, id: &str) -> Vec<Action> {
        match self.delete_education(id).await {
            Ok(profile) => vec![
                Action::UpdateProfile(profile),
                Action::success("Education Removed"),
            ],
            Err(e) => vec![Action::ProfileError(e.to_request_error())],
        }
    }

    /// Caller is responsible for confirming with the user first.
    pub async fn remove_account(&self) -> Vec<Action> {
        match self.delete_account().await {
            Ok(_) => vec![
                Action::ClearProfile,
                Action::AccountDeleted,
                Action::success("Your account has permanently been deleted"),
            ],
            Err(e) => vec![Action::ProfileError(e.to_request_error())],
        }
    }

    pub async fn load_posts(&self) -> Vec<Action> {
        match self.posts().await {
            Ok(posts) => vec![Action::GetPosts(posts)],
            Err(e) => vec![Action::PostError(e.to_request_error())],
        }
    }

    pub async fn load_post(&self, id: &str) -> Vec<Action> {
        match self.post(id).await {
            Ok(post) => vec![Action::GetPost(post)],
            Err(e) => vec![Action::PostError(e.to_request_error())],
        }
    }

    pub async fn add_post(&self, text: &str) -> Vec<Action> {
        match self.create_post(text).await {
            Ok(post) => vec![Action::AddPost(post), Action::success("Post created")],
            Err(e) => vec![Action::PostError(e.to_request_error())],
        }
    }

    pub async fn remove_post(&self, id: &str) -> Vec<Action> {
        match self.delete_post(id).await {
            Ok(_) => vec![
                Action::DeletePost(id.to_string()),
                Action::success("Post Removed"),
            ],
            Err(e) => vec![Action::PostError(e.to_request_error())],
        }
    }

    pub async fn add_like(&self, id: &str) -> Vec<Action> {
        match self.like_post(id).await {
            Ok(likes) => vec![Action::UpdateLikes {
                id: id.to_string(),
                likes,
            }],
            Err(e) => vec![Action::PostError(e.to_request_error())],
        }
    }

    pub async fn remove_like(&self, id: &str) -> Vec<Action> {
        match self.unlike_post(id).await {
            Ok(likes) => vec![Action::UpdateLikes {
                id: id.to_string(),
                likes,
            }],
            Err(e) => vec![Action::PostError(e.to_request_error())],
        }
    }

    pub async fn comment(&self, post_id: &str, text: &str) -> Vec<Action> {
        match self.add_comment(post_id, text).await {
            Ok(comments) => vec![Action::AddComment(comments), Action::success("comment added")],
            Err(e) => vec![Action::PostError(e.to_request_error())],
        }
    }

    pub async fn remove_comment(&self, post_id: &str, comment_id: &str) -> Vec<Action> {
        match self.delete_comment(post_id, comment_id).await {
            Ok(_) => vec![
                Action::RemoveComment(comment_id.to_string()),
                Action::success("comment removed"),
            ],
            Err(e) => vec![Action::PostError(e.to_request_error())],
        }
    }
}

fn with_alerts(error: &ClientError, failure: Action) -> Vec<Action> {
    let mut actions = error.alerts();
    actions.push(failure);
    actions
}
