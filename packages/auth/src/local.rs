//! Identity provider backed by the editorial store and in-process sessions.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use election_map_editorial::models::{Identity, Role, User};
use election_map_editorial::service::DEFAULT_STORE_TIMEOUT;
use election_map_editorial::store::{EditorialStore, StoreError, with_timeout};

use crate::password::PasswordHasher;
use crate::{AuthError, IdentityProvider, Session, validate_password, validate_username};

/// Default session lifetime in hours.
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 12;

/// [`IdentityProvider`] that stores Argon2id hashes in the user table and
/// keeps sessions in memory. Sessions do not survive a restart.
pub struct LocalIdentityProvider {
    store: Arc<dyn EditorialStore>,
    hasher: PasswordHasher,
    ttl: Duration,
    store_timeout: StdDuration,
    sessions: RwLock<HashMap<String, Session>>,
}

impl LocalIdentityProvider {
    /// Creates a provider with default hashing costs and a
    /// [`DEFAULT_SESSION_TTL_HOURS`] session lifetime.
    #[must_use]
    pub fn new(store: Arc<dyn EditorialStore>) -> Self {
        Self {
            store,
            hasher: PasswordHasher::default(),
            ttl: Duration::hours(DEFAULT_SESSION_TTL_HOURS),
            store_timeout: DEFAULT_STORE_TIMEOUT,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Overrides the session lifetime.
    #[must_use]
    pub const fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Overrides the per-operation store timeout.
    #[must_use]
    pub const fn with_store_timeout(mut self, timeout: StdDuration) -> Self {
        self.store_timeout = timeout;
        self
    }

    /// Overrides the password hasher.
    #[must_use]
    pub fn with_hasher(mut self, hasher: PasswordHasher) -> Self {
        self.hasher = hasher;
        self
    }

    /// Drops every session whose expiry has passed.
    fn purge_expired(sessions: &mut HashMap<String, Session>) {
        let now = Utc::now();
        let before = sessions.len();
        sessions.retain(|_, session| session.expires_at > now);
        let purged = before - sessions.len();
        if purged > 0 {
            log::debug!("Purged {purged} expired session(s)");
        }
    }
}

fn poisoned() -> AuthError {
    AuthError::Store(StoreError::Database(
        "session table lock poisoned".to_string(),
    ))
}

#[async_trait::async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn register(
        &self,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<User, AuthError> {
        validate_username(username)?;
        validate_password(password)?;

        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            username: username.to_string(),
            password_hash: self.hasher.hash(password)?,
            role,
            created_at: Utc::now(),
        };

        match with_timeout(self.store_timeout, self.store.insert_user(&user)).await {
            Ok(()) => {}
            Err(StoreError::Conflict { .. }) => {
                return Err(AuthError::UsernameTaken {
                    username: username.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        }

        log::info!("Registered {username} as {role}");

        Ok(user)
    }

    async fn login(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        let Some(user) = with_timeout(
            self.store_timeout,
            self.store.find_user_by_username(username),
        )
        .await?
        else {
            log::debug!("Login for unknown user {username}");
            return Err(AuthError::InvalidCredentials);
        };

        if !self.hasher.verify(password, &user.password_hash)? {
            log::debug!("Wrong password for {username}");
            return Err(AuthError::InvalidCredentials);
        }

        let session = Session {
            token: uuid::Uuid::new_v4().to_string(),
            identity: user.identity(),
            expires_at: Utc::now() + self.ttl,
        };

        let mut sessions = self.sessions.write().map_err(|_| poisoned())?;
        Self::purge_expired(&mut sessions);
        sessions.insert(session.token.clone(), session.clone());

        log::info!("{username} logged in");

        Ok(session)
    }

    async fn authenticate(&self, token: &str) -> Result<Identity, AuthError> {
        let mut sessions = self.sessions.write().map_err(|_| poisoned())?;
        Self::purge_expired(&mut sessions);

        sessions
            .get(token)
            .map(|session| session.identity.clone())
            .ok_or(AuthError::InvalidToken)
    }
}
