//! Session routes
//!
//! - `POST /api/auth` - login, returns `{token}`
//! - `GET /api/auth` - the authenticated user, without credentials

use bytes::Bytes;
use hyper::body::Body;
use hyper::{Method, Request};
use peerlink_client::{LoginInput, TokenResponse};

use super::response::{method_not_allowed, not_found, ok_json, parse_json_body, HttpResponse};
use super::BoxError;
use crate::auth::authorize;
use crate::server::AppState;
use crate::types::Result;

pub async fn handle<B>(state: &AppState, req: Request<B>, rest: &[&str]) -> Result<HttpResponse>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    match (req.method(), rest) {
        (&Method::GET, []) => {
            let auth = authorize(req.headers(), &state.jwt)?;
            let user = state.accounts.current_user(auth).await?;
            Ok(ok_json(&user))
        }
        (&Method::POST, []) => {
            let input: LoginInput = parse_json_body(req, state.args.max_body_bytes).await?;
            let token = state.accounts.login(input).await?;
            Ok(ok_json(&TokenResponse { token }))
        }
        (_, []) => Ok(method_not_allowed()),
        _ => Ok(not_found(req.uri().path())),
    }
}
