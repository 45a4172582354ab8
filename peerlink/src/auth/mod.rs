//! Authentication and authorization for Peerlink
//!
//! Provides:
//! - Password hashing with Argon2
//! - JWT token generation and validation
//! - The request guard that turns a bearer token into an [`AuthUser`]

pub mod guard;
pub mod jwt;
pub mod password;

pub use guard::{authorize, AuthUser};
pub use jwt::{extract_token_from_header, Claims, JwtValidator, TokenInput, TokenValidationResult};
pub use password::{hash_password, verify_password};
