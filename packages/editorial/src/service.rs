//! Article operations: create, edit, list, and status transitions.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use election_map_editorial_models::{
    Article, ArticleStatus, ArticleWithAuthor, Identity, Operation,
};

use crate::EditorialError;
use crate::policy::authorize;
use crate::store::{EditorialStore, StatusUpdate, with_timeout};
use crate::workflow::check_transition;

/// Default upper bound on a single store operation.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest accepted article title, in characters.
pub const MAX_TITLE_CHARS: usize = 200;

/// Editorial operations over a shared store.
///
/// The access policy is checked first on every operation, before input
/// validation, store access, or workflow checks.
#[derive(Clone)]
pub struct ArticleService {
    store: Arc<dyn EditorialStore>,
    timeout: Duration,
}

impl ArticleService {
    /// Creates a service using [`DEFAULT_STORE_TIMEOUT`].
    #[must_use]
    pub fn new(store: Arc<dyn EditorialStore>) -> Self {
        Self {
            store,
            timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    /// Overrides the per-operation store timeout.
    #[must_use]
    pub const fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Creates a new article in the initial stage, authored by `caller`.
    ///
    /// # Errors
    ///
    /// * [`EditorialError::Forbidden`] if the caller's role may not create
    /// * [`EditorialError::Validation`] for a blank title or body
    /// * [`EditorialError::Store`] if the insert fails
    pub async fn create(
        &self,
        caller: &Identity,
        title: &str,
        body: &str,
    ) -> Result<Article, EditorialError> {
        authorize(caller.role, Operation::CreateArticle)?;
        let (title, body) = validate_content(title, body)?;

        let now = Utc::now();
        let article = Article {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            body,
            status: ArticleStatus::INITIAL,
            author_id: caller.user_id.clone(),
            created_at: now,
            updated_at: now,
        };

        with_timeout(self.timeout, self.store.insert_article(&article)).await?;
        log::info!("{} created article {}", caller.username, article.id);

        Ok(article)
    }

    /// Replaces an article's title and body. The status is unchanged.
    ///
    /// # Errors
    ///
    /// * [`EditorialError::Forbidden`] if the caller's role may not edit
    /// * [`EditorialError::Validation`] for a blank title or body
    /// * [`EditorialError::NotFound`] if the article does not exist
    /// * [`EditorialError::Store`] if the update fails
    pub async fn edit(
        &self,
        caller: &Identity,
        id: &str,
        title: &str,
        body: &str,
    ) -> Result<Article, EditorialError> {
        authorize(caller.role, Operation::EditArticle)?;
        let (title, body) = validate_content(title, body)?;

        let updated = with_timeout(
            self.timeout,
            self.store.update_content(id, &title, &body, Utc::now()),
        )
        .await?
        .ok_or_else(|| EditorialError::NotFound { id: id.to_string() })?;

        log::info!("{} edited article {id}", caller.username);

        Ok(updated)
    }

    /// Lists articles oldest first with author details, optionally only
    /// those in `status`.
    ///
    /// # Errors
    ///
    /// * [`EditorialError::Forbidden`] if the caller's role may not list
    /// * [`EditorialError::Store`] if the query fails
    pub async fn list(
        &self,
        caller: &Identity,
        status: Option<ArticleStatus>,
    ) -> Result<Vec<ArticleWithAuthor>, EditorialError> {
        authorize(caller.role, Operation::ListArticles)?;

        Ok(with_timeout(self.timeout, self.store.list_articles(status)).await?)
    }

    /// Moves an article to `requested`, which must be the stage directly
    /// after its current one.
    ///
    /// # Errors
    ///
    /// * [`EditorialError::Forbidden`] if the caller's role may not change
    ///   status, regardless of whether the transition would be legal
    /// * [`EditorialError::NotFound`] if the article does not exist
    /// * [`EditorialError::IllegalTransition`] if `requested` is not the next
    ///   stage; the article is left unchanged
    /// * [`EditorialError::Store`] if the update fails
    pub async fn transition(
        &self,
        caller: &Identity,
        id: &str,
        requested: ArticleStatus,
    ) -> Result<Article, EditorialError> {
        authorize(caller.role, Operation::ChangeStatus)?;

        let article = with_timeout(self.timeout, self.store.find_article(id))
            .await?
            .ok_or_else(|| EditorialError::NotFound { id: id.to_string() })?;

        check_transition(article.status, requested)?;

        let update = with_timeout(
            self.timeout,
            self.store
                .update_status(id, article.status, requested, Utc::now()),
        )
        .await?;

        match update {
            StatusUpdate::Applied(updated) => {
                log::info!(
                    "{} moved article {id} from {} to {requested}",
                    caller.username,
                    article.status
                );
                Ok(updated)
            }
            StatusUpdate::Stale(current) => {
                Err(EditorialError::IllegalTransition { current, requested })
            }
            StatusUpdate::Missing => Err(EditorialError::NotFound { id: id.to_string() }),
        }
    }
}

/// Trims and checks article content.
fn validate_content(title: &str, body: &str) -> Result<(String, String), EditorialError> {
    let title = title.trim();
    let body = body.trim();

    if title.is_empty() {
        return Err(EditorialError::Validation {
            message: "title must not be empty".to_string(),
        });
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(EditorialError::Validation {
            message: format!("title must be at most {MAX_TITLE_CHARS} characters"),
        });
    }
    if body.is_empty() {
        return Err(EditorialError::Validation {
            message: "body must not be empty".to_string(),
        });
    }

    Ok((title.to_string(), body.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;
    use crate::store::memory::MemoryStore;
    use chrono::DateTime;
    use election_map_editorial_models::{Role, User};

    async fn setup() -> (ArticleService, Arc<MemoryStore>, Identity, Identity, Identity) {
        let store = Arc::new(MemoryStore::new());
        let mut identities = Vec::new();

        for (name, role) in [
            ("writer", Role::Writer),
            ("editor", Role::Editor),
            ("admin", Role::Admin),
        ] {
            let user = User {
                id: uuid::Uuid::new_v4().to_string(),
                username: name.to_string(),
                password_hash: String::new(),
                role,
                created_at: Utc::now(),
            };
            store.insert_user(&user).await.unwrap();
            identities.push(user.identity());
        }

        let admin = identities.pop().unwrap();
        let editor = identities.pop().unwrap();
        let writer = identities.pop().unwrap();

        (
            ArticleService::new(store.clone()),
            store,
            writer,
            editor,
            admin,
        )
    }

    #[tokio::test]
    async fn created_articles_start_in_draft() {
        let (service, _, writer, _, _) = setup().await;
        let article = service
            .create(&writer, "  Results from Afar  ", "Counting continues.")
            .await
            .unwrap();

        assert_eq!(article.status, ArticleStatus::Draft);
        assert_eq!(article.title, "Results from Afar");
        assert_eq!(article.author_id, writer.user_id);
        assert_eq!(article.created_at, article.updated_at);
    }

    #[tokio::test]
    async fn only_writers_create() {
        let (service, _, _, editor, admin) = setup().await;

        for caller in [&editor, &admin] {
            let err = service.create(caller, "t", "b").await.unwrap_err();
            assert!(matches!(err, EditorialError::Forbidden { .. }));
        }
    }

    #[tokio::test]
    async fn blank_content_is_rejected() {
        let (service, store, writer, _, _) = setup().await;

        for (title, body) in [("", "body"), ("   ", "body"), ("title", " \n ")] {
            let err = service.create(&writer, title, body).await.unwrap_err();
            assert!(matches!(err, EditorialError::Validation { .. }), "{err}");
        }
        let long_title = "x".repeat(MAX_TITLE_CHARS + 1);
        assert!(matches!(
            service.create(&writer, &long_title, "body").await,
            Err(EditorialError::Validation { .. })
        ));

        assert!(store.list_articles(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn full_workflow_reaches_published() {
        let (service, _, writer, editor, admin) = setup().await;
        let article = service.create(&writer, "Title", "Body").await.unwrap();

        let reviewed = service
            .transition(&editor, &article.id, ArticleStatus::Review)
            .await
            .unwrap();
        assert_eq!(reviewed.status, ArticleStatus::Review);
        assert_eq!(reviewed.title, article.title);
        assert!(reviewed.updated_at >= article.updated_at);

        let published = service
            .transition(&admin, &article.id, ArticleStatus::Published)
            .await
            .unwrap();
        assert_eq!(published.status, ArticleStatus::Published);

        for &requested in ArticleStatus::all() {
            assert!(matches!(
                service.transition(&admin, &article.id, requested).await,
                Err(EditorialError::IllegalTransition {
                    current: ArticleStatus::Published,
                    ..
                })
            ));
        }
    }

    #[tokio::test]
    async fn skipping_to_published_is_rejected_without_mutation() {
        let (service, store, writer, editor, _) = setup().await;
        let article = service.create(&writer, "Title", "Body").await.unwrap();

        let err = service
            .transition(&editor, &article.id, ArticleStatus::Published)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            EditorialError::IllegalTransition {
                current: ArticleStatus::Draft,
                requested: ArticleStatus::Published,
            }
        ));
        let message = err.to_string();
        assert!(message.contains("draft") && message.contains("published"));

        let stored = store.find_article(&article.id).await.unwrap().unwrap();
        assert_eq!(stored, article);
    }

    #[tokio::test]
    async fn writer_cannot_transition_even_when_legal() {
        let (service, store, writer, _, _) = setup().await;
        let article = service.create(&writer, "Title", "Body").await.unwrap();

        let err = service
            .transition(&writer, &article.id, ArticleStatus::Review)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EditorialError::Forbidden {
                operation: Operation::ChangeStatus,
                role: Role::Writer,
            }
        ));

        // Forbidden takes precedence over not-found and illegal transitions
        assert!(matches!(
            service
                .transition(&writer, "missing", ArticleStatus::Published)
                .await,
            Err(EditorialError::Forbidden { .. })
        ));

        let stored = store.find_article(&article.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ArticleStatus::Draft);
    }

    #[tokio::test]
    async fn edits_keep_status() {
        let (service, _, writer, editor, admin) = setup().await;
        let article = service.create(&writer, "Title", "Body").await.unwrap();
        service
            .transition(&editor, &article.id, ArticleStatus::Review)
            .await
            .unwrap();

        let edited = service
            .edit(&editor, &article.id, "New title", "New body")
            .await
            .unwrap();
        assert_eq!(edited.status, ArticleStatus::Review);
        assert_eq!(edited.title, "New title");
        assert_eq!(edited.created_at, article.created_at);

        assert!(matches!(
            service.edit(&admin, &article.id, "t", "b").await,
            Err(EditorialError::Forbidden { .. })
        ));
    }

    #[tokio::test]
    async fn missing_articles_are_not_found() {
        let (service, _, writer, editor, _) = setup().await;

        assert!(matches!(
            service.edit(&writer, "nope", "t", "b").await,
            Err(EditorialError::NotFound { .. })
        ));
        assert!(matches!(
            service
                .transition(&editor, "nope", ArticleStatus::Review)
                .await,
            Err(EditorialError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn list_filters_by_status_and_attaches_authors() {
        let (service, _, writer, editor, admin) = setup().await;
        let first = service.create(&writer, "First", "Body").await.unwrap();
        let second = service.create(&writer, "Second", "Body").await.unwrap();
        service
            .transition(&editor, &second.id, ArticleStatus::Review)
            .await
            .unwrap();

        let all = service.list(&admin, None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|a| a.author_username == "writer"));
        assert!(all.iter().all(|a| a.author_role == Role::Writer));

        let drafts = service
            .list(&writer, Some(ArticleStatus::Draft))
            .await
            .unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].article.id, first.id);

        assert!(
            service
                .list(&editor, Some(ArticleStatus::Published))
                .await
                .unwrap()
                .is_empty()
        );
    }

    /// Store that never answers.
    struct StalledStore;

    #[async_trait::async_trait]
    impl crate::store::EditorialStore for StalledStore {
        async fn insert_user(&self, _: &User) -> Result<(), StoreError> {
            std::future::pending().await
        }
        async fn find_user_by_username(&self, _: &str) -> Result<Option<User>, StoreError> {
            std::future::pending().await
        }
        async fn find_user(&self, _: &str) -> Result<Option<User>, StoreError> {
            std::future::pending().await
        }
        async fn list_users(&self) -> Result<Vec<User>, StoreError> {
            std::future::pending().await
        }
        async fn insert_article(&self, _: &Article) -> Result<(), StoreError> {
            std::future::pending().await
        }
        async fn find_article(&self, _: &str) -> Result<Option<Article>, StoreError> {
            std::future::pending().await
        }
        async fn update_content(
            &self,
            _: &str,
            _: &str,
            _: &str,
            _: DateTime<Utc>,
        ) -> Result<Option<Article>, StoreError> {
            std::future::pending().await
        }
        async fn update_status(
            &self,
            _: &str,
            _: ArticleStatus,
            _: ArticleStatus,
            _: DateTime<Utc>,
        ) -> Result<StatusUpdate, StoreError> {
            std::future::pending().await
        }
        async fn list_articles(
            &self,
            _: Option<ArticleStatus>,
        ) -> Result<Vec<ArticleWithAuthor>, StoreError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn stalled_store_times_out() {
        let service = ArticleService::new(Arc::new(StalledStore))
            .with_store_timeout(Duration::from_millis(20));
        let caller = Identity {
            user_id: "u".to_string(),
            username: "reader".to_string(),
            role: Role::Admin,
        };

        assert!(matches!(
            service.list(&caller, None).await,
            Err(EditorialError::Store(StoreError::Timeout(_)))
        ));
    }
}
