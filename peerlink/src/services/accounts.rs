//! Account registration and login

use std::sync::Arc;

use peerlink_client::{LoginInput, RegisterInput, UserView};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::auth::{hash_password, verify_password, AuthUser, JwtValidator, TokenInput};
use crate::db::schemas::UserDoc;
use crate::store::UserStore;
use crate::types::{EntityId, PeerlinkError, Result};
use crate::validation::{is_email, Violations};

/// Minimum password length accepted at registration
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserStore>,
    jwt: JwtValidator,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserStore>, jwt: JwtValidator) -> Self {
        Self { users, jwt }
    }

    /// Create an account and return a signed token for it
    pub async fn register(&self, input: RegisterInput) -> Result<String> {
        let mut violations = Violations::new();
        violations.require("name", Some(input.name.as_str()), "Name is required");
        violations.check("email", is_email(&input.email), "Please include a valid email");
        violations.check(
            "password",
            input.password.chars().count() >= MIN_PASSWORD_LEN,
            "Please enter a password with 6 or more characters",
        );
        violations.finish()?;

        let email = normalize_email(&input.email);
        if self.users.find_user_by_email(&email).await?.is_some() {
            return Err(PeerlinkError::UserExists);
        }

        let password_hash = hash_password(&input.password)?;
        let user = UserDoc::new(
            input.name.trim().to_string(),
            email.clone(),
            password_hash,
            gravatar_url(&email),
        );
        let user = self.users.insert_user(user).await?;

        info!("Registered user {} ({})", user.id, email);
        self.issue(user.id.into())
    }

    /// Exchange email and password for a signed token
    pub async fn login(&self, input: LoginInput) -> Result<String> {
        let mut violations = Violations::new();
        violations.check("email", is_email(&input.email), "Please include a valid email");
        violations.require("password", Some(input.password.as_str()), "Password is required");
        violations.finish()?;

        let email = normalize_email(&input.email);
        let user = match self.users.find_user_by_email(&email).await? {
            Some(user) => user,
            None => {
                warn!("Login failed - unknown email: {}", email);
                return Err(PeerlinkError::InvalidLogin);
            }
        };

        if !verify_password(&input.password, &user.password_hash)? {
            warn!("Login failed - wrong password: {}", email);
            return Err(PeerlinkError::InvalidLogin);
        }

        self.issue(user.id.into())
    }

    /// The caller's account, without credentials
    pub async fn current_user(&self, auth: AuthUser) -> Result<UserView> {
        self.users
            .find_user(auth.id)
            .await?
            .map(|user| user.to_view())
            .ok_or_else(|| PeerlinkError::NotFound("User not found".into()))
    }

    fn issue(&self, user_id: EntityId) -> Result<String> {
        self.jwt.generate_token(TokenInput { user_id })
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Gravatar URL for an email (SHA-256 of the trimmed, lower-cased address)
pub fn gravatar_url(email: &str) -> String {
    let digest = Sha256::digest(normalize_email(email).as_bytes());
    format!(
        "https://www.gravatar.com/avatar/{}?s=200&r=pg&d=mm",
        hex::encode(digest)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Stores;

    fn service() -> AccountService {
        AccountService::new(Stores::memory().users, JwtValidator::new_dev())
    }

    fn register_input(email: &str) -> RegisterInput {
        RegisterInput {
            name: "Ada Lovelace".into(),
            email: email.into(),
            password: "engine42".into(),
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let accounts = service();
        let token = accounts
            .register(register_input("Ada@Example.com"))
            .await
            .unwrap();
        assert!(!token.is_empty());

        let login = accounts
            .login(LoginInput {
                email: "ada@example.com".into(),
                password: "engine42".into(),
            })
            .await;
        assert!(login.is_ok());
    }

    #[tokio::test]
    async fn test_register_validation_lists_all_fields() {
        let err = service()
            .register(RegisterInput {
                name: " ".into(),
                email: "nope".into(),
                password: "123".into(),
            })
            .await
            .unwrap_err();

        match err {
            PeerlinkError::Validation(list) => {
                let params: Vec<&str> = list.iter().map(|v| v.param.as_str()).collect();
                assert_eq!(params, vec!["name", "email", "password"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_duplicate_registration_rejected() {
        let accounts = service();
        accounts.register(register_input("ada@example.com")).await.unwrap();

        let err = accounts
            .register(register_input("ADA@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, PeerlinkError::UserExists));
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let accounts = service();
        accounts.register(register_input("ada@example.com")).await.unwrap();

        let wrong_password = accounts
            .login(LoginInput {
                email: "ada@example.com".into(),
                password: "wrong-password".into(),
            })
            .await
            .unwrap_err();
        let unknown = accounts
            .login(LoginInput {
                email: "grace@example.com".into(),
                password: "engine42".into(),
            })
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, PeerlinkError::InvalidLogin));
        assert!(matches!(unknown, PeerlinkError::InvalidLogin));
    }

    #[tokio::test]
    async fn test_current_user_hides_password() {
        let stores = Stores::memory();
        let jwt = JwtValidator::new_dev();
        let accounts = AccountService::new(stores.users.clone(), jwt.clone());

        let token = accounts.register(register_input("ada@example.com")).await.unwrap();
        let claims = jwt.verify_token(&token).claims.unwrap();
        let auth = AuthUser {
            id: EntityId::parse(&claims.sub).unwrap(),
        };

        let view = accounts.current_user(auth).await.unwrap();
        assert_eq!(view.email, "ada@example.com");
        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("password"));
    }

    #[test]
    fn test_gravatar_url_normalizes_email() {
        assert_eq!(gravatar_url(" Ada@Example.com "), gravatar_url("ada@example.com"));
        assert!(gravatar_url("ada@example.com").starts_with("https://www.gravatar.com/avatar/"));
    }
}
