//! HTTP server implementation
//!
//! hyper http1 over a tokio `TcpListener`, one task per connection.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::auth::JwtValidator;
use crate::config::Args;
use crate::db::MongoClient;
use crate::routes::{self, HttpResponse};
use crate::services::{AccountService, GithubClient, PostService, ProfileService};
use crate::store::{StoreKind, Stores};
use crate::types::{PeerlinkError, Result};

/// Shared application state
pub struct AppState {
    pub args: Args,
    pub jwt: JwtValidator,
    /// Backend the services are running on
    pub store_kind: StoreKind,
    pub accounts: AccountService,
    pub profiles: ProfileService,
    pub posts: PostService,
    pub github: GithubClient,
    pub started_at: Instant,
}

impl AppState {
    /// Wire every service onto one set of stores
    pub fn with_stores(args: Args, stores: Stores) -> Result<Self> {
        let secret = args
            .jwt_secret()
            .ok_or_else(|| PeerlinkError::Config("JWT_SECRET is not set".into()))?;
        let jwt = JwtValidator::new(secret, args.jwt_expiry_seconds)?;

        let accounts = AccountService::new(stores.users.clone(), jwt.clone());
        let profiles = ProfileService::new(
            stores.users.clone(),
            stores.profiles.clone(),
            stores.posts.clone(),
        );
        let posts = PostService::new(stores.users.clone(), stores.posts.clone());
        let github = GithubClient::new(
            &args.github,
            Duration::from_millis(args.request_timeout_ms),
        );

        Ok(Self {
            args,
            jwt,
            store_kind: stores.kind,
            accounts,
            profiles,
            posts,
            github,
            started_at: Instant::now(),
        })
    }

    /// State backed by process memory (dev mode without MongoDB, tests)
    pub fn in_memory(args: Args) -> Result<Self> {
        Self::with_stores(args, Stores::memory())
    }

    /// State backed by MongoDB; indexes are applied on open
    pub async fn with_mongo(args: Args, mongo: &MongoClient) -> Result<Self> {
        let stores = Stores::mongo(mongo).await?;
        Self::with_stores(args, stores)
    }
}

/// Start the HTTP server
pub async fn run(state: Arc<AppState>) -> Result<()> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!(
        "Peerlink listening on {} (store: {})",
        state.args.listen,
        state.store_kind.as_str()
    );

    if state.args.dev_mode {
        warn!("Development mode enabled - do not expose this instance");
    }

    serve_listener(state, listener).await
}

/// Accept connections on an already bound listener until it fails for good
pub async fn serve_listener(state: Arc<AppState>, listener: TcpListener) -> Result<()> {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { Ok::<_, Infallible>(serve(state, addr, req).await) }
                    });

                    if let Err(err) = http1::Builder::new()
                        .serve_connection(io, service)
                        .await
                    {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Route one request inside its own span
async fn serve(state: Arc<AppState>, addr: SocketAddr, req: Request<Incoming>) -> HttpResponse {
    let request_id = Uuid::new_v4();
    let span = info_span!(
        "request",
        id = %request_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    async move {
        let started = Instant::now();
        let response = routes::handle_request(state, req).await;
        info!(
            "[{}] {} in {}ms",
            addr,
            response.status().as_u16(),
            started.elapsed().as_millis()
        );
        response
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_production_state_requires_secret() {
        let args = Args::parse_from(["peerlink"]);
        assert!(matches!(
            AppState::in_memory(args),
            Err(PeerlinkError::Config(_))
        ));
    }

    #[test]
    fn test_in_memory_state() {
        let args = Args::parse_from(["peerlink", "--jwt-secret", "s3cret"]);
        let state = AppState::in_memory(args).unwrap();
        assert_eq!(state.store_kind, StoreKind::Memory);
        assert_eq!(state.jwt.expiry_seconds(), 360000);
    }

    mod client {
        //! The typed client against a live in-memory server

        use super::*;
        use peerlink_client::{
            Action, ApiClient, LoginInput, ProfileInput, RegisterInput, RequestError,
        };

        async fn spawn_server() -> ApiClient {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(serve_listener(routes::test_support::state(), listener));
            ApiClient::new(format!("http://{addr}"))
        }

        async fn signed_in(client: &ApiClient, name: &str) -> ApiClient {
            let input = RegisterInput {
                name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase()),
                password: "secret123".to_string(),
            };
            match client.register_account(&input).await.as_slice() {
                [Action::RegisterSuccess { token }] => client.with_token(Some(token.clone())),
                other => panic!("register failed: {other:?}"),
            }
        }

        fn bad_request() -> RequestError {
            RequestError {
                msg: "Bad Request".to_string(),
                status: 400,
            }
        }

        #[tokio::test]
        async fn test_failed_login_alerts_then_fails() {
            let client = spawn_server().await;
            signed_in(&client, "Ada").await;

            let input = LoginInput {
                email: "ada@example.com".to_string(),
                password: "wrong-password".to_string(),
            };
            assert_eq!(
                client.log_in(&input).await,
                vec![Action::danger("Invalid Credentials"), Action::LoginFail]
            );
        }

        #[tokio::test]
        async fn test_profile_violations_become_alerts() {
            let client = spawn_server().await;
            let ada = signed_in(&client, "Ada").await;

            let actions = ada.save_profile(&ProfileInput::default(), false).await;
            assert_eq!(
                actions,
                vec![
                    Action::danger("Status is required"),
                    Action::danger("Skills is required"),
                    Action::ProfileError(bad_request()),
                ]
            );

            let input = ProfileInput {
                status: Some("Developer".into()),
                skills: Some("rust, go".into()),
                ..Default::default()
            };
            let actions = ada.save_profile(&input, false).await;
            match actions.as_slice() {
                [Action::GetProfile(profile), alert] => {
                    assert_eq!(profile.skills, vec!["rust", "go"]);
                    assert_eq!(*alert, Action::success("Profile Created"));
                }
                other => panic!("unexpected actions: {other:?}"),
            }
        }

        #[tokio::test]
        async fn test_second_like_is_post_error() {
            let client = spawn_server().await;
            let ada = signed_in(&client, "Ada").await;
            let grace = signed_in(&client, "Grace").await;

            let post = match ada.add_post("hello").await.as_slice() {
                [Action::AddPost(post), _] => post.clone(),
                other => panic!("post failed: {other:?}"),
            };

            match grace.add_like(&post.id).await.as_slice() {
                [Action::UpdateLikes { id, likes }] => {
                    assert_eq!(id, &post.id);
                    assert_eq!(likes.len(), 1);
                }
                other => panic!("like failed: {other:?}"),
            }
            assert_eq!(
                grace.add_like(&post.id).await,
                vec![Action::PostError(bad_request())]
            );

            match grace.load_posts().await.as_slice() {
                [Action::GetPosts(posts)] => assert_eq!(posts[0].likes.len(), 1),
                other => panic!("load failed: {other:?}"),
            }
        }

        #[tokio::test]
        async fn test_comment_and_account_removal() {
            let client = spawn_server().await;
            let ada = signed_in(&client, "Ada").await;

            let post = match ada.add_post("hello").await.as_slice() {
                [Action::AddPost(post), _] => post.clone(),
                other => panic!("post failed: {other:?}"),
            };
            let comment_id = match ada.comment(&post.id, "first").await.as_slice() {
                [Action::AddComment(comments), _] => comments[0].id.clone(),
                other => panic!("comment failed: {other:?}"),
            };
            assert_eq!(
                ada.remove_comment(&post.id, &comment_id).await,
                vec![
                    Action::RemoveComment(comment_id.clone()),
                    Action::success("comment removed"),
                ]
            );

            assert_eq!(
                ada.remove_account().await,
                vec![
                    Action::ClearProfile,
                    Action::AccountDeleted,
                    Action::success("Your account has permanently been deleted"),
                ]
            );
            assert_eq!(ada.load_user().await, vec![Action::AuthError]);
        }
    }
}
