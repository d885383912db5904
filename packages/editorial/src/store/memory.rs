//! In-process store backed by a `RwLock`.
//!
//! Nothing survives a restart. Used by tests and when the server is started
//! with `EDITORIAL_DB_PATH=:memory:`.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use election_map_editorial_models::{Article, ArticleStatus, ArticleWithAuthor, User};

use super::{EditorialStore, StatusUpdate, StoreError};

#[derive(Debug, Default)]
struct State {
    users: Vec<User>,
    articles: Vec<Article>,
}

/// Volatile [`EditorialStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::Database("memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, StoreError> {
        self.state
            .write()
            .map_err(|_| StoreError::Database("memory store lock poisoned".to_string()))
    }
}

#[async_trait::async_trait]
impl EditorialStore for MemoryStore {
    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        let mut state = self.write()?;
        if state.users.iter().any(|u| u.username == user.username) {
            return Err(StoreError::Conflict {
                message: format!("username '{}' is taken", user.username),
            });
        }
        state.users.push(user.clone());
        Ok(())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .read()?
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_user(&self, id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.read()?.users.iter().find(|u| u.id == id).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.read()?.users.clone())
    }

    async fn insert_article(&self, article: &Article) -> Result<(), StoreError> {
        let mut state = self.write()?;
        if state.articles.iter().any(|a| a.id == article.id) {
            return Err(StoreError::Conflict {
                message: format!("article '{}' already exists", article.id),
            });
        }
        state.articles.push(article.clone());
        Ok(())
    }

    async fn find_article(&self, id: &str) -> Result<Option<Article>, StoreError> {
        Ok(self.read()?.articles.iter().find(|a| a.id == id).cloned())
    }

    async fn update_content(
        &self,
        id: &str,
        title: &str,
        body: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Article>, StoreError> {
        let mut state = self.write()?;
        let Some(article) = state.articles.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };

        title.clone_into(&mut article.title);
        body.clone_into(&mut article.body);
        article.updated_at = updated_at;

        Ok(Some(article.clone()))
    }

    async fn update_status(
        &self,
        id: &str,
        expected: ArticleStatus,
        new: ArticleStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<StatusUpdate, StoreError> {
        let mut state = self.write()?;
        let Some(article) = state.articles.iter_mut().find(|a| a.id == id) else {
            return Ok(StatusUpdate::Missing);
        };

        if article.status != expected {
            return Ok(StatusUpdate::Stale(article.status));
        }

        article.status = new;
        article.updated_at = updated_at;

        Ok(StatusUpdate::Applied(article.clone()))
    }

    async fn list_articles(
        &self,
        status: Option<ArticleStatus>,
    ) -> Result<Vec<ArticleWithAuthor>, StoreError> {
        let state = self.read()?;

        let mut articles: Vec<ArticleWithAuthor> = state
            .articles
            .iter()
            .filter(|a| status.is_none_or(|s| a.status == s))
            .filter_map(|article| {
                let author = state.users.iter().find(|u| u.id == article.author_id)?;
                Some(ArticleWithAuthor {
                    article: article.clone(),
                    author_username: author.username.clone(),
                    author_role: author.role,
                })
            })
            .collect();

        articles.sort_by(|a, b| {
            a.article
                .created_at
                .cmp(&b.article.created_at)
                .then_with(|| a.article.id.cmp(&b.article.id))
        });

        Ok(articles)
    }
}
