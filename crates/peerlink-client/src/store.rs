//! Client-side state store
//!
//! The browser keeps one snapshot of everything the views render: auth
//! status, pending alerts, and the profile and post caches. Views never
//! mutate it directly. They hand an [`Action`] to [`reduce`], which returns
//! the next snapshot and leaves the previous one untouched.
//!
//! ```ignore
//! let mut ctx = Context::default();
//! ctx.dispatch(Action::LoginSuccess { token });
//! assert!(ctx.state().auth.is_authenticated);
//! ```

use serde_json::Value as JsonValue;

use crate::models::{CommentView, LikeView, PostView, ProfileView, UserView};

// =============================================================================
// State
// =============================================================================

/// Failure of a request, as shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestError {
    pub msg: String,
    pub status: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Success,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub id: u64,
    pub msg: String,
    pub kind: AlertKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthState {
    pub token: Option<String>,
    pub is_authenticated: bool,
    pub loading: bool,
    pub user: Option<UserView>,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            token: None,
            is_authenticated: false,
            loading: true,
            user: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertState {
    pub alerts: Vec<Alert>,
    next_id: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileState {
    pub profile: Option<ProfileView>,
    pub profiles: Vec<ProfileView>,
    pub repos: Vec<JsonValue>,
    pub loading: bool,
    pub error: Option<RequestError>,
}

impl Default for ProfileState {
    fn default() -> Self {
        Self {
            profile: None,
            profiles: Vec::new(),
            repos: Vec::new(),
            loading: true,
            error: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostState {
    pub posts: Vec<PostView>,
    pub post: Option<PostView>,
    pub loading: bool,
    pub error: Option<RequestError>,
}

impl Default for PostState {
    fn default() -> Self {
        Self {
            posts: Vec::new(),
            post: None,
            loading: true,
            error: None,
        }
    }
}

/// Full client snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientState {
    pub auth: AuthState,
    pub alert: AlertState,
    pub profile: ProfileState,
    pub post: PostState,
}

// =============================================================================
// Actions
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // auth
    RegisterSuccess { token: String },
    RegisterFail,
    LoginSuccess { token: String },
    LoginFail,
    UserLoaded(UserView),
    AuthError,
    Logout,
    AccountDeleted,

    // alerts
    SetAlert { msg: String, kind: AlertKind },
    RemoveAlert(u64),

    // profiles
    GetProfile(ProfileView),
    UpdateProfile(ProfileView),
    GetProfiles(Vec<ProfileView>),
    GetRepos(Vec<JsonValue>),
    ClearProfile,
    ProfileError(RequestError),

    // posts
    GetPosts(Vec<PostView>),
    GetPost(PostView),
    AddPost(PostView),
    DeletePost(String),
    UpdateLikes { id: String, likes: Vec<LikeView> },
    AddComment(Vec<CommentView>),
    RemoveComment(String),
    PostError(RequestError),
}

impl Action {
    pub fn success(msg: impl Into<String>) -> Self {
        Action::SetAlert {
            msg: msg.into(),
            kind: AlertKind::Success,
        }
    }

    pub fn danger(msg: impl Into<String>) -> Self {
        Action::SetAlert {
            msg: msg.into(),
            kind: AlertKind::Danger,
        }
    }
}

// =============================================================================
// Reducers
// =============================================================================

/// Compute the next snapshot. `state` is never modified.
pub fn reduce(state: &ClientState, action: Action) -> ClientState {
    ClientState {
        auth: reduce_auth(&state.auth, &action),
        alert: reduce_alert(&state.alert, &action),
        profile: reduce_profile(&state.profile, &action),
        post: reduce_post(&state.post, action),
    }
}

fn reduce_auth(state: &AuthState, action: &Action) -> AuthState {
    match action {
        Action::RegisterSuccess { token } | Action::LoginSuccess { token } => AuthState {
            token: Some(token.clone()),
            is_authenticated: true,
            loading: false,
            user: state.user.clone(),
        },
        Action::UserLoaded(user) => AuthState {
            token: state.token.clone(),
            is_authenticated: true,
            loading: false,
            user: Some(user.clone()),
        },
        Action::RegisterFail
        | Action::LoginFail
        | Action::AuthError
        | Action::Logout
        | Action::AccountDeleted => AuthState {
            token: None,
            is_authenticated: false,
            loading: false,
            user: None,
        },
        _ => state.clone(),
    }
}

fn reduce_alert(state: &AlertState, action: &Action) -> AlertState {
    match action {
        Action::SetAlert { msg, kind } => {
            let mut alerts = state.alerts.clone();
            alerts.push(Alert {
                id: state.next_id,
                msg: msg.clone(),
                kind: *kind,
            });
            AlertState {
                alerts,
                next_id: state.next_id + 1,
            }
        }
        Action::RemoveAlert(id) => AlertState {
            alerts: state
                .alerts
                .iter()
                .filter(|alert| alert.id != *id)
                .cloned()
                .collect(),
            next_id: state.next_id,
        },
        _ => state.clone(),
    }
}

fn reduce_profile(state: &ProfileState, action: &Action) -> ProfileState {
    let mut next = state.clone();
    match action {
        Action::GetProfile(profile) | Action::UpdateProfile(profile) => {
            next.profile = Some(profile.clone());
            next.loading = false;
        }
        Action::GetProfiles(profiles) => {
            next.profiles = profiles.clone();
            next.loading = false;
        }
        Action::GetRepos(repos) => {
            next.repos = repos.clone();
            next.loading = false;
        }
        Action::ClearProfile | Action::Logout | Action::AccountDeleted => {
            next.profile = None;
            next.repos = Vec::new();
            next.loading = false;
        }
        Action::ProfileError(error) => {
            next.error = Some(error.clone());
            next.profile = None;
            next.loading = false;
        }
        _ => {}
    }
    next
}

fn reduce_post(state: &PostState, action: Action) -> PostState {
    let mut next = state.clone();
    match action {
        Action::GetPosts(posts) => {
            next.posts = posts;
            next.loading = false;
        }
        Action::GetPost(post) => {
            next.post = Some(post);
            next.loading = false;
        }
        Action::AddPost(post) => {
            next.posts.insert(0, post);
            next.loading = false;
        }
        Action::DeletePost(id) => {
            next.posts.retain(|post| post.id != id);
            next.loading = false;
        }
        Action::UpdateLikes { id, likes } => {
            for post in next.posts.iter_mut().filter(|post| post.id == id) {
                post.likes = likes.clone();
            }
            if let Some(post) = next.post.as_mut().filter(|post| post.id == id) {
                post.likes = likes;
            }
            next.loading = false;
        }
        Action::AddComment(comments) => {
            if let Some(post) = next.post.as_mut() {
                post.comments = comments;
            }
            next.loading = false;
        }
        Action::RemoveComment(comment_id) => {
            if let Some(post) = next.post.as_mut() {
                post.comments.retain(|comment| comment.id != comment_id);
            }
            next.loading = false;
        }
        Action::PostError(error) => {
            next.error = Some(error);
            next.loading = false;
        }
        _ => {}
    }
    next
}

// =============================================================================
// Context
// =============================================================================

/// Handle passed to view code: the current snapshot plus a way to advance it.
#[derive(Debug, Clone, Default)]
pub struct Context {
    state: ClientState,
}

impl Context {
    pub fn new(state: ClientState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &ClientState {
        &self.state
    }

    pub fn dispatch(&mut self, action: Action) {
        self.state = reduce(&self.state, action);
    }

    pub fn dispatch_all(&mut self, actions: impl IntoIterator<Item = Action>) {
        for action in actions {
            self.dispatch(action);
        }
    }

    /// Bearer token to attach to API calls, if logged in
    pub fn token(&self) -> Option<&str> {
        self.state.auth.token.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn post(id: &str) -> PostView {
        PostView {
            id: id.to_string(),
            user: "u1".to_string(),
            text: "hello".to_string(),
            name: "Ada".to_string(),
            avatar: "//avatar".to_string(),
            likes: Vec::new(),
            comments: Vec::new(),
            date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn comment(id: &str) -> CommentView {
        CommentView {
            id: id.to_string(),
            user: "u2".to_string(),
            text: "nice".to_string(),
            name: "Grace".to_string(),
            avatar: "//avatar".to_string(),
            date: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_reduce_leaves_previous_snapshot_untouched() {
        let before = ClientState::default();
        let after = reduce(
            &before,
            Action::LoginSuccess {
                token: "t".to_string(),
            },
        );

        assert!(!before.auth.is_authenticated);
        assert!(after.auth.is_authenticated);
        assert_eq!(after.auth.token.as_deref(), Some("t"));
    }

    #[test]
    fn test_logout_clears_auth_and_profile() {
        let mut ctx = Context::default();
        ctx.dispatch(Action::LoginSuccess {
            token: "t".to_string(),
        });
        ctx.dispatch(Action::GetRepos(vec![serde_json::json!({ "name": "repo" })]));
        ctx.dispatch(Action::Logout);

        assert!(ctx.token().is_none());
        assert!(ctx.state().profile.repos.is_empty());
        assert!(ctx.state().profile.profile.is_none());
    }

    #[test]
    fn test_alerts_get_unique_ids_and_can_be_removed() {
        let mut ctx = Context::default();
        ctx.dispatch(Action::success("Post created"));
        ctx.dispatch(Action::danger("Text is required"));

        let ids: Vec<u64> = ctx.state().alert.alerts.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![0, 1]);

        ctx.dispatch(Action::RemoveAlert(0));
        assert_eq!(ctx.state().alert.alerts.len(), 1);
        assert_eq!(ctx.state().alert.alerts[0].kind, AlertKind::Danger);
    }

    #[test]
    fn test_add_post_prepends_and_delete_removes() {
        let mut ctx = Context::default();
        ctx.dispatch(Action::GetPosts(vec![post("a")]));
        ctx.dispatch(Action::AddPost(post("b")));

        let ids: Vec<&str> = ctx.state().post.posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);

        ctx.dispatch(Action::DeletePost("a".to_string()));
        assert_eq!(ctx.state().post.posts.len(), 1);
    }

    #[test]
    fn test_update_likes_targets_matching_post() {
        let mut ctx = Context::default();
        ctx.dispatch(Action::GetPosts(vec![post("a"), post("b")]));
        ctx.dispatch(Action::UpdateLikes {
            id: "b".to_string(),
            likes: vec![LikeView {
                id: "l1".to_string(),
                user: "u2".to_string(),
            }],
        });

        assert!(ctx.state().post.posts[0].likes.is_empty());
        assert_eq!(ctx.state().post.posts[1].likes.len(), 1);
    }

    #[test]
    fn test_comments_replace_and_remove_on_current_post() {
        let mut ctx = Context::default();
        ctx.dispatch(Action::GetPost(post("a")));
        ctx.dispatch(Action::AddComment(vec![comment("c2"), comment("c1")]));
        ctx.dispatch(Action::RemoveComment("c1".to_string()));

        let current = ctx.state().post.post.as_ref().unwrap();
        assert_eq!(current.comments.len(), 1);
        assert_eq!(current.comments[0].id, "c2");
    }

    #[test]
    fn test_profile_error_records_status() {
        let next = reduce(
            &ClientState::default(),
            Action::ProfileError(RequestError {
                msg: "Not Found".to_string(),
                status: 404,
            }),
        );

        assert_eq!(next.profile.error.as_ref().map(|e| e.status), Some(404));
        assert!(!next.profile.loading);
    }
}
