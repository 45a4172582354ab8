//! Password hashing and verification using Argon2id

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::types::PeerlinkError;

/// Hash a password, returning a PHC string that embeds salt and parameters
pub fn hash_password(password: &str) -> Result<String, PeerlinkError> {
    // Fresh random salt per hash
    let salt = SaltString::generate(&mut OsRng);

    // Argon2id with the crate's default cost parameters
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PeerlinkError::Auth(format!("Failed to hash password: {e}")))
}

/// Check `password` against a stored PHC hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PeerlinkError> {
    // The stored string carries algorithm, salt and parameters
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| PeerlinkError::Auth(format!("Invalid password hash format: {e}")))?;

    // A mismatch is a normal outcome, not an error
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
