//! Peerlink - developer profiles, posts and comments
//!
//! A REST API over MongoDB. Users register and log in, keep one profile with
//! experience and education, publish short posts, and like or comment on
//! each other's posts.
//!
//! ## Services
//!
//! - **Accounts**: registration, login, bearer tokens
//! - **Profiles**: profile upsert, experience/education, cascading account deletion
//! - **Posts**: posts, likes, comments with ownership checks
//! - **Github**: repository listing passthrough

pub mod auth;
pub mod config;
pub mod db;
pub mod routes;
pub mod server;
pub mod services;
pub mod store;
pub mod types;
pub mod validation;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{EntityId, PeerlinkError, Result};
