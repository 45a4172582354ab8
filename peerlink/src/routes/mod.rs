//! HTTP routes for Peerlink
//!
//! `handle_request` splits the path into decoded segments and hands the
//! request to the resource that owns the prefix. Resource handlers return
//! `Result`; failures are rendered here in one place.

pub mod auth_routes;
pub mod health;
pub mod posts;
pub mod profiles;
pub mod response;
pub mod users;

use std::sync::Arc;

use bytes::Bytes;
use hyper::body::Body;
use hyper::{Method, Request};
use tracing::debug;

use crate::server::AppState;
pub use health::health_check;
pub use response::{error_response, json_response, HttpResponse};

/// Error bound for request bodies (hyper's `Incoming` in production, `Full` in tests)
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Percent-decoded, non-empty path segments
pub fn path_segments(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(|s| {
            urlencoding::decode(s)
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| s.to_string())
        })
        .collect()
}

/// Route one request
pub async fn handle_request<B>(state: Arc<AppState>, req: Request<B>) -> HttpResponse
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let segments = path_segments(&path);
    let segments: Vec<&str> = segments.iter().map(String::as_str).collect();

    if method == Method::OPTIONS {
        return response::preflight();
    }

    let result = match segments.as_slice() {
        ["health"] | ["healthz"] => match method {
            Method::GET => Ok(health_check(&state)),
            _ => Ok(response::method_not_allowed()),
        },
        ["api", "users", rest @ ..] => users::handle(&state, req, rest).await,
        ["api", "auth", rest @ ..] => auth_routes::handle(&state, req, rest).await,
        ["api", "profiles", rest @ ..] => profiles::handle(&state, req, rest).await,
        ["api", "posts", rest @ ..] => posts::handle(&state, req, rest).await,
        _ => {
            debug!("No route for {} {}", method, path);
            Ok(response::not_found(&path))
        }
    };

    result.unwrap_or_else(|err| error_response(&err))
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Request builders and response readers for route tests

    use super::*;
    use http_body_util::{BodyExt, Full};
    use hyper::StatusCode;
    use serde::de::DeserializeOwned;
    use serde_json::Value as JsonValue;

    use crate::config::Args;
    use clap::Parser;

    pub fn state() -> Arc<AppState> {
        let args = Args::parse_from(["peerlink", "--dev-mode"]);
        Arc::new(AppState::in_memory(args).unwrap())
    }

    pub fn request(
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<JsonValue>,
    ) -> Request<Full<Bytes>> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let body = body.map(|b| b.to_string()).unwrap_or_default();
        builder
            .header("content-type", "application/json")
            .body(Full::new(Bytes::from(body)))
            .unwrap()
    }

    pub async fn call(
        state: &Arc<AppState>,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<JsonValue>,
    ) -> (StatusCode, JsonValue) {
        let response = handle_request(state.clone(), request(method, uri, token, body)).await;
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            JsonValue::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    pub fn decode<T: DeserializeOwned>(value: JsonValue) -> T {
        serde_json::from_value(value).unwrap()
    }

    /// Register a user and return its token
    pub async fn register(state: &Arc<AppState>, name: &str) -> String {
        let body = serde_json::json!({
            "name": name,
            "email": format!("{}@example.com", name.to_lowercase()),
            "password": "secret123",
        });
        let (status, json) = call(state, Method::POST, "/api/users", None, Some(body)).await;
        assert_eq!(status, StatusCode::OK, "register failed: {json}");
        json["token"].as_str().unwrap().to_string()
    }
}
