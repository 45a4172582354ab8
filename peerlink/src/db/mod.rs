//! MongoDB access layer
//!
//! Typed collections plus the document schemas for users, profiles and posts.

pub mod mongo;
pub mod schemas;

pub use mongo::{IntoIndexes, MongoClient, MongoCollection, MutMetadata};
