#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Account registration, password login, and bearer sessions.
//!
//! [`IdentityProvider`] turns credentials into an authenticated
//! [`Identity`], which is what the editorial service authorizes against.
//! [`local::LocalIdentityProvider`] keeps accounts in the editorial store
//! and sessions in process memory.

pub mod local;
pub mod password;

use chrono::{DateTime, Utc};
use election_map_editorial::models::{Identity, Role, User};
use election_map_editorial::store::StoreError;
use thiserror::Error;

/// Shortest accepted username.
pub const MIN_USERNAME_LEN: usize = 3;

/// Longest accepted username.
pub const MAX_USERNAME_LEN: usize = 32;

/// Shortest accepted password.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Errors returned by identity operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown username or wrong password. The two are not distinguished.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// The bearer token is unknown or has expired.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// Another account already uses the username.
    #[error("Username '{username}' is already taken")]
    UsernameTaken {
        /// Requested username.
        username: String,
    },

    /// A username or password does not meet the account rules.
    #[error("Validation error: {message}")]
    Validation {
        /// Description of what is wrong.
        message: String,
    },

    /// Password hashing failed.
    #[error("Password hash error: {0}")]
    Hash(String),

    /// The backing store failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// An authenticated session handed out by [`IdentityProvider::login`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Opaque bearer token.
    pub token: String,
    /// Who the session belongs to.
    pub identity: Identity,
    /// When the token stops being accepted.
    pub expires_at: DateTime<Utc>,
}

/// Source of authenticated identities.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Creates an account.
    ///
    /// # Errors
    ///
    /// * [`AuthError::Validation`] if the username or password is rejected
    /// * [`AuthError::UsernameTaken`] if the username is in use
    async fn register(&self, username: &str, password: &str, role: Role)
    -> Result<User, AuthError>;

    /// Exchanges a username and password for a session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown user or a
    /// wrong password.
    async fn login(&self, username: &str, password: &str) -> Result<Session, AuthError>;

    /// Resolves a bearer token to the identity it was issued for.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidToken`] if the token is unknown or expired.
    async fn authenticate(&self, token: &str) -> Result<Identity, AuthError>;
}

/// Checks a username against the account rules.
///
/// # Errors
///
/// Returns [`AuthError::Validation`] unless the username is 3 to 32
/// characters of ASCII letters, digits, `_`, `.`, or `-`.
pub fn validate_username(username: &str) -> Result<(), AuthError> {
    let len = username.chars().count();
    if !(MIN_USERNAME_LEN..=MAX_USERNAME_LEN).contains(&len) {
        return Err(AuthError::Validation {
            message: format!(
                "username must be {MIN_USERNAME_LEN} to {MAX_USERNAME_LEN} characters"
            ),
        });
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        return Err(AuthError::Validation {
            message: "username may only contain letters, digits, '_', '.' and '-'".to_string(),
        });
    }
    Ok(())
}

/// Checks a password against the account rules.
///
/// # Errors
///
/// Returns [`AuthError::Validation`] if the password is shorter than
/// [`MIN_PASSWORD_LEN`] characters.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::Validation {
            message: format!("password must be at least {MIN_PASSWORD_LEN} characters"),
        });
    }
    Ok(())
}
