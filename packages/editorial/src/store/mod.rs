//! Persistence for users and articles.
//!
//! [`EditorialStore`] is the seam between the editorial service and its
//! backing storage. Every method is a single atomic operation; there are no
//! transactions spanning several articles.
//!
//! Two implementations ship: [`memory::MemoryStore`] for tests and
//! ephemeral runs, and [`sqlite::SqliteStore`] for persistent deployments.

pub mod memory;
pub mod sqlite;

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use election_map_editorial_models::{Article, ArticleStatus, ArticleWithAuthor, User};
use thiserror::Error;

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A database query or command failed.
    #[error("Database error: {0}")]
    Database(String),

    /// A uniqueness constraint was violated.
    #[error("Conflict: {message}")]
    Conflict {
        /// Description of the conflicting value.
        message: String,
    },

    /// A stored row could not be decoded.
    #[error("Corrupt row: {message}")]
    Corrupt {
        /// Description of what could not be decoded.
        message: String,
    },

    /// The operation did not finish in time.
    #[error("Store operation timed out after {0:?}")]
    Timeout(Duration),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome of a conditional status update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusUpdate {
    /// The status matched and was changed.
    Applied(Article),
    /// The article exists but its status no longer matched; nothing changed.
    Stale(ArticleStatus),
    /// No article has the given ID.
    Missing,
}

/// Backing storage for users and articles.
#[async_trait::async_trait]
pub trait EditorialStore: Send + Sync {
    /// Inserts a new user.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] if the username is taken.
    async fn insert_user(&self, user: &User) -> Result<(), StoreError>;

    /// Looks up a user by username.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the lookup fails.
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Looks up a user by ID.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the lookup fails.
    async fn find_user(&self, id: &str) -> Result<Option<User>, StoreError>;

    /// Lists every user, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails.
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;

    /// Inserts a new article.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the insert fails.
    async fn insert_article(&self, article: &Article) -> Result<(), StoreError>;

    /// Looks up an article by ID.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the lookup fails.
    async fn find_article(&self, id: &str) -> Result<Option<Article>, StoreError>;

    /// Replaces an article's title and body, leaving its status untouched.
    ///
    /// Returns the updated article, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the update fails.
    async fn update_content(
        &self,
        id: &str,
        title: &str,
        body: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Article>, StoreError>;

    /// Sets an article's status to `new` only if it is currently
    /// `expected`. Content is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the update fails.
    async fn update_status(
        &self,
        id: &str,
        expected: ArticleStatus,
        new: ArticleStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<StatusUpdate, StoreError>;

    /// Lists articles with author details, oldest first, optionally
    /// restricted to one status.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails.
    async fn list_articles(
        &self,
        status: Option<ArticleStatus>,
    ) -> Result<Vec<ArticleWithAuthor>, StoreError>;
}

/// Runs a store operation with an upper bound on its duration.
///
/// # Errors
///
/// Returns [`StoreError::Timeout`] if `fut` does not finish within
/// `timeout`, or the operation's own error.
pub async fn with_timeout<T, F>(timeout: Duration, fut: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>> + Send,
{
    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| StoreError::Timeout(timeout))?
}

/// Store location that selects [`memory::MemoryStore`] instead of `SQLite`.
pub const IN_MEMORY: &str = ":memory:";

/// Opens the store at `location`: [`IN_MEMORY`] for a volatile store,
/// anything else as a `SQLite` database path.
///
/// # Errors
///
/// Returns [`StoreError`] if the `SQLite` database cannot be opened or its
/// schema cannot be created.
pub async fn open(location: &str) -> Result<Arc<dyn EditorialStore>, StoreError> {
    if location == IN_MEMORY {
        log::warn!("Using in-memory editorial store; nothing will be persisted");
        return Ok(Arc::new(memory::MemoryStore::new()));
    }

    Ok(Arc::new(sqlite::SqliteStore::open(Path::new(location)).await?))
}
