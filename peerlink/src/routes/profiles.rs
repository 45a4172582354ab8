//! Profile routes
//!
//! Public:
//! - `GET /api/profiles`
//! - `GET /api/profiles/user/{user_id}`
//! - `GET /api/profiles/github/{username}`
//!
//! Authenticated:
//! - `GET /api/profiles/me`
//! - `POST /api/profiles` (create or rebuild)
//! - `DELETE /api/profiles` (deletes posts, profile and user)
//! - `PUT /api/profiles/experience`, `DELETE /api/profiles/experience/{id}`
//! - `PUT /api/profiles/education`, `DELETE /api/profiles/education/{id}`

use bytes::Bytes;
use hyper::body::Body;
use hyper::{Method, Request, StatusCode};
use peerlink_client::{EducationInput, ExperienceInput, ProfileInput};

use super::response::{
    message_response, method_not_allowed, not_found, ok_json, parse_json_body, HttpResponse,
};
use super::BoxError;
use crate::auth::authorize;
use crate::server::AppState;
use crate::types::Result;

pub async fn handle<B>(state: &AppState, req: Request<B>, rest: &[&str]) -> Result<HttpResponse>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let limit = state.args.max_body_bytes;

    match (req.method(), rest) {
        (&Method::GET, []) => Ok(ok_json(&state.profiles.list_profiles().await?)),
        (&Method::POST, []) => {
            let auth = authorize(req.headers(), &state.jwt)?;
            let input: ProfileInput = parse_json_body(req, limit).await?;
            Ok(ok_json(&state.profiles.upsert_profile(auth, input).await?))
        }
        (&Method::DELETE, []) => {
            let auth = authorize(req.headers(), &state.jwt)?;
            state.profiles.delete_account(auth).await?;
            Ok(message_response(StatusCode::OK, "User deleted"))
        }
        (&Method::GET, ["me"]) => {
            let auth = authorize(req.headers(), &state.jwt)?;
            Ok(ok_json(&state.profiles.get_own_profile(auth).await?))
        }
        (&Method::GET, ["user", user_id]) => {
            Ok(ok_json(&state.profiles.get_profile_by_user(user_id).await?))
        }
        (&Method::GET, ["github", username]) => {
            Ok(ok_json(&state.github.fetch_repos(username).await?))
        }
        (&Method::PUT, ["experience"]) => {
            let auth = authorize(req.headers(), &state.jwt)?;
            let input: ExperienceInput = parse_json_body(req, limit).await?;
            Ok(ok_json(&state.profiles.add_experience(auth, input).await?))
        }
        (&Method::DELETE, ["experience", entry_id]) => {
            let auth = authorize(req.headers(), &state.jwt)?;
            Ok(ok_json(&state.profiles.remove_experience(auth, entry_id).await?))
        }
        (&Method::PUT, ["education"]) => {
            let auth = authorize(req.headers(), &state.jwt)?;
            let input: EducationInput = parse_json_body(req, limit).await?;
            Ok(ok_json(&state.profiles.add_education(auth, input).await?))
        }
        (&Method::DELETE, ["education", entry_id]) => {
            let auth = authorize(req.headers(), &state.jwt)?;
            Ok(ok_json(&state.profiles.remove_education(auth, entry_id).await?))
        }
        (_, [] | ["me"] | ["user", _] | ["github", _])
        | (_, ["experience"] | ["experience", _] | ["education"] | ["education", _]) => {
            Ok(method_not_allowed())
        }
        _ => Ok(not_found(req.uri().path())),
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use hyper::{Method, StatusCode};
    use peerlink_client::{PostView, ProfileView};
    use serde_json::json;

    async fn create_profile(state: &std::sync::Arc<crate::server::AppState>, token: &str) {
        let (status, json) = call(
            state,
            Method::POST,
            "/api/profiles",
            Some(token),
            Some(json!({ "status": "Developer", "skills": "js, node", "company": "Acme" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "profile failed: {json}");
    }

    #[tokio::test]
    async fn test_create_and_read_profile() {
        let state = state();
        let token = register(&state, "Ada").await;
        create_profile(&state, &token).await;

        let (status, json) =
            call(&state, Method::GET, "/api/profiles/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        let me: ProfileView = decode(json);
        assert_eq!(me.skills, vec!["js", "node"]);
        assert_eq!(me.user.name, "Ada");

        let uri = format!("/api/profiles/user/{}", me.user.id);
        let (status, json) = call(&state, Method::GET, &uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["_id"], me.id.as_str());

        let (status, json) = call(&state, Method::GET, "/api/profiles", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_profile_requires_status_and_skills() {
        let state = state();
        let token = register(&state, "Ada").await;

        let (status, json) = call(
            &state,
            Method::POST,
            "/api/profiles",
            Some(&token),
            Some(json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["errors"][0]["msg"], "Status is required");
        assert_eq!(json["errors"][1]["msg"], "Skills is required");
    }

    #[tokio::test]
    async fn test_private_routes_need_token() {
        let state = state();
        for (method, uri) in [
            (Method::GET, "/api/profiles/me"),
            (Method::POST, "/api/profiles"),
            (Method::DELETE, "/api/profiles"),
            (Method::PUT, "/api/profiles/experience"),
            (Method::DELETE, "/api/profiles/education/5f0c0c0c0c0c0c0c0c0c0c0c"),
        ] {
            let (status, _) = call(&state, method, uri, None, None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_profile_lookup_ids() {
        let state = state();

        let (status, _) = call(&state, Method::GET, "/api/profiles/user/garbage", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, json) = call(
            &state,
            Method::GET,
            "/api/profiles/user/5f0c0c0c0c0c0c0c0c0c0c0c",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["msg"], "Profile not found");
    }

    #[tokio::test]
    async fn test_experience_add_and_remove() {
        let state = state();
        let token = register(&state, "Ada").await;
        create_profile(&state, &token).await;

        let (status, json) = call(
            &state,
            Method::PUT,
            "/api/profiles/experience",
            Some(&token),
            Some(json!({ "title": "Engineer", "company": "Acme", "from": "2020-01-01" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let profile: ProfileView = decode(json);
        let entry = profile.experience[0].id.clone();

        let uri = format!("/api/profiles/experience/{entry}");
        let (status, json) = call(&state, Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        let profile: ProfileView = decode(json);
        assert!(profile.experience.is_empty());
    }

    #[tokio::test]
    async fn test_delete_account_cascades() {
        let state = state();
        let token = register(&state, "Ada").await;
        create_profile(&state, &token).await;
        let (_, json) = call(
            &state,
            Method::POST,
            "/api/posts",
            Some(&token),
            Some(json!({ "text": "hello" })),
        )
        .await;
        let post: PostView = decode(json);

        let (status, json) =
            call(&state, Method::DELETE, "/api/profiles", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["msg"], "User deleted");

        let (status, _) = call(&state, Method::GET, "/api/auth", Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = call(&state, Method::GET, "/api/profiles/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let uri = format!("/api/posts/{}", post.id);
        let (status, _) = call(&state, Method::GET, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_github_rejects_bad_username() {
        let state = state();
        let uri = "/api/profiles/github/bad--name";
        let (status, _) = call(&state, Method::GET, uri, None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_wrong_method_is_405() {
        let state = state();
        let (status, _) = call(&state, Method::PATCH, "/api/profiles/me", None, None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }
}
