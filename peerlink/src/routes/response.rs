//! Response and request body helpers shared by every route

use bytes::Bytes;
use http_body_util::{BodyExt, Full, Limited};
use hyper::body::Body;
use hyper::header::{HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS};
use hyper::header::{ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE, CONTENT_TYPE};
use hyper::{Request, Response, StatusCode};
use peerlink_client::{ErrorBody, MessageBody};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{error, warn};

use super::BoxError;
use crate::types::{PeerlinkError, Result};

pub type HttpResponse = Response<Full<Bytes>>;

const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type, Authorization, x-auth-token";

fn with_cors(mut response: HttpResponse) -> HttpResponse {
    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOWED_METHODS));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOWED_HEADERS));
    response
}

pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> HttpResponse {
    let json = serde_json::to_vec(body).unwrap_or_else(|_| b"{}".to_vec());

    let mut response = Response::new(Full::new(Bytes::from(json)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    with_cors(response)
}

pub fn ok_json<T: Serialize>(body: &T) -> HttpResponse {
    json_response(StatusCode::OK, body)
}

pub fn message_response(status: StatusCode, msg: &str) -> HttpResponse {
    json_response(status, &MessageBody::new(msg))
}

/// Render a failure. Client errors log at warn, everything else at error.
pub fn error_response(err: &PeerlinkError) -> HttpResponse {
    let status = err.status_code();
    if err.is_client_error() {
        warn!("{} {}", status.as_u16(), err);
    } else {
        error!("{} {}", status.as_u16(), err);
    }
    json_response(status, &err.to_body())
}

pub fn not_found(path: &str) -> HttpResponse {
    json_response(
        StatusCode::NOT_FOUND,
        &ErrorBody::message(format!("Route not found: {path}")),
    )
}

pub fn method_not_allowed() -> HttpResponse {
    message_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

pub fn preflight() -> HttpResponse {
    let mut response = with_cors(Response::new(Full::new(Bytes::new())));
    *response.status_mut() = StatusCode::NO_CONTENT;
    response
        .headers_mut()
        .insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static("86400"));
    response
}

/// Read at most `limit` bytes and decode them as JSON. An empty body decodes as `{}`.
pub async fn parse_json_body<T, B>(req: Request<B>, limit: usize) -> Result<T>
where
    T: DeserializeOwned,
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let body = Limited::new(req.into_body(), limit)
        .collect()
        .await
        .map_err(|e| PeerlinkError::Http(format!("Failed to read body: {e}")))?;

    let bytes = body.to_bytes();
    let bytes: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
        b"{}"
    } else {
        &bytes
    };

    serde_json::from_slice(bytes).map_err(|e| PeerlinkError::Http(format!("Invalid JSON: {e}")))
}
