//! Post routes (all authenticated)
//!
//! - `POST /api/posts`, `GET /api/posts`
//! - `GET /api/posts/{id}`, `DELETE /api/posts/{id}`
//! - `PUT /api/posts/likes/{id}`, `PUT /api/posts/unlikes/{id}`
//! - `POST /api/posts/comment/{id}`, `DELETE /api/posts/comment/{id}/{comment_id}`

use bytes::Bytes;
use hyper::body::Body;
use hyper::{Method, Request, StatusCode};
use peerlink_client::TextInput;

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
    let known = matches!(
        rest,
        [] | [_] | ["likes", _] | ["unlikes", _] | ["comment", _] | ["comment", _, _]
    );
    if !known {
        return Ok(not_found(req.uri().path()));
    }

    let auth = authorize(req.headers(), &state.jwt)?;
    let limit = state.args.max_body_bytes;
    let posts = &state.posts;

    match (req.method(), rest) {
        (&Method::POST, []) => {
            let input: TextInput = parse_json_body(req, limit).await?;
            Ok(ok_json(&posts.create_post(auth, input.text()).await?))
        }
        (&Method::GET, []) => Ok(ok_json(&posts.list_posts().await?)),
        (&Method::GET, [post_id]) => Ok(ok_json(&posts.get_post(post_id).await?)),
        (&Method::DELETE, [post_id]) => {
            posts.delete_post(auth, post_id).await?;
            Ok(message_response(StatusCode::OK, "Post removed"))
        }
        (&Method::PUT, ["likes", post_id]) => Ok(ok_json(&posts.like_post(auth, post_id).await?)),
        (&Method::PUT, ["unlikes", post_id]) => {
            Ok(ok_json(&posts.unlike_post(auth, post_id).await?))
        }
        (&Method::POST, ["comment", post_id]) => {
            let input: TextInput = parse_json_body(req, limit).await?;
            Ok(ok_json(&posts.add_comment(auth, post_id, input.text()).await?))
        }
        (&Method::DELETE, ["comment", post_id, comment_id]) => Ok(ok_json(
            &posts.delete_comment(auth, post_id, comment_id).await?,
        )),
        _ => Ok(method_not_allowed()),
    }
}
