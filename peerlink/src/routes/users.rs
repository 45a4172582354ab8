//! Account registration routes
//!
//! - `POST /api/users` - register, returns `{token}`

use bytes::Bytes;
use hyper::body::Body;
use hyper::{Method, Request};
use peerlink_client::{RegisterInput, TokenResponse};

use super::response::{method_not_allowed, not_found, ok_json, parse_json_body, HttpResponse};
use super::BoxError;
use crate::server::AppState;
use crate::types::Result;

pub async fn handle<B>(state: &AppState, req: Request<B>, rest: &[&str]) -> Result<HttpResponse>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    match (req.method(), rest) {
        (&Method::POST, []) => {
            let input: RegisterInput = parse_json_body(req, state.args.max_body_bytes).await?;
            let token = state.accounts.register(input).await?;
            Ok(ok_json(&TokenResponse { token }))
        }
        (_, []) => Ok(method_not_allowed()),
        _ => Ok(not_found(req.uri().path())),
    }
}
