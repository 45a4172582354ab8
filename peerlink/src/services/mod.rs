//! Business logic services
//!
//! Each service owns the rules for one area and talks to storage only
//! through the traits in [`crate::store`].
//!
//! ## Services
//!
//! - **Accounts**: registration, login, current user
//! - **Profiles**: profile upsert, experience/education, account deletion
//! - **Posts**: posts, likes, comments
//! - **Github**: repository listing passthrough

pub mod accounts;
pub mod github;
pub mod posts;
pub mod profiles;

pub use accounts::{gravatar_url, AccountService};
pub use github::GithubClient;
pub use posts::PostService;
pub use profiles::ProfileService;
