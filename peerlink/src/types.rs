//! Shared error type and identifiers

use std::fmt;
use std::str::FromStr;

use bson::oid::ObjectId;
use hyper::StatusCode;
use peerlink_client::{ErrorBody, FieldViolation};
use serde::{Deserialize, Serialize};

pub type Result<T> = std::result::Result<T, PeerlinkError>;

#[derive(Debug, thiserror::Error)]
pub enum PeerlinkError {
    #[error("Validation failed")]
    Validation(Vec<FieldViolation>),

    #[error("No token, authorization denied")]
    Unauthenticated,

    #[error("Token is not valid")]
    InvalidCredential,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Post already been liked")]
    AlreadyLiked,

    #[error("This post has not been liked")]
    NotLiked,

    #[error("User already exists")]
    UserExists,

    #[error("Invalid Credentials")]
    InvalidLogin,

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Auth error: {0}")]
    Auth(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PeerlinkError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PeerlinkError::Validation(_)
            | PeerlinkError::InvalidIdentifier(_)
            | PeerlinkError::AlreadyLiked
            | PeerlinkError::NotLiked
            | PeerlinkError::UserExists
            | PeerlinkError::InvalidLogin
            | PeerlinkError::Http(_) => StatusCode::BAD_REQUEST,
            PeerlinkError::Unauthenticated
            | PeerlinkError::InvalidCredential
            | PeerlinkError::Forbidden(_) => StatusCode::UNAUTHORIZED,
            PeerlinkError::NotFound(_) => StatusCode::NOT_FOUND,
            PeerlinkError::Upstream(_) => StatusCode::BAD_GATEWAY,
            PeerlinkError::Database(_)
            | PeerlinkError::Auth(_)
            | PeerlinkError::Config(_)
            | PeerlinkError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// True for failures the caller caused; everything else is logged as an error.
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// JSON body shown to the caller. Internal details stay in the logs.
    pub fn to_body(&self) -> ErrorBody {
        match self {
            PeerlinkError::Validation(violations) => ErrorBody {
                msg: self.to_string(),
                errors: violations.clone(),
            },
            PeerlinkError::Upstream(_) => ErrorBody::message("Upstream service unavailable"),
            e if e.status_code() == StatusCode::INTERNAL_SERVER_ERROR => {
                ErrorBody::message("Server error")
            }
            e => ErrorBody::message(e.to_string()),
        }
    }
}

impl From<mongodb::error::Error> for PeerlinkError {
    fn from(e: mongodb::error::Error) -> Self {
        PeerlinkError::Database(e.to_string())
    }
}

/// Validated document identifier.
///
/// Parsing is the only way to build one from user input, so a malformed id
/// surfaces as `InvalidIdentifier` before any lookup happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(ObjectId);

impl EntityId {
    pub fn new() -> Self {
        Self(ObjectId::new())
    }

    pub fn parse(raw: &str) -> Result<Self> {
        ObjectId::parse_str(raw.trim())
            .map(Self)
            .map_err(|_| PeerlinkError::InvalidIdentifier(raw.to_string()))
    }

    pub fn oid(&self) -> ObjectId {
        self.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ObjectId> for EntityId {
    fn from(oid: ObjectId) -> Self {
        Self(oid)
    }
}

impl FromStr for EntityId {
    type Err = PeerlinkError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_hex())
    }
}
