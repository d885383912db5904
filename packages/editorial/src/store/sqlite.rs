//! Persistent store backed by `SQLite` via `switchy_database`.
//!
//! The schema is created on open. Timestamps are stored as fixed-width
//! RFC 3339 strings so lexical order matches chronological order.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use election_map_editorial_models::{Article, ArticleStatus, ArticleWithAuthor, Role, User};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue, Row};
use switchy_database_connection::init_sqlite_rusqlite;

use super::{EditorialStore, StatusUpdate, StoreError};

/// Default path for the editorial database.
pub const DEFAULT_DB_PATH: &str = "data/editorial.db";

const ARTICLE_COLUMNS: &str = "a.id AS id, a.title AS title, a.body AS body, a.status AS status, \
     a.author_id AS author_id, a.created_at AS created_at, a.updated_at AS updated_at";

/// [`EditorialStore`] persisted in a `SQLite` file.
pub struct SqliteStore {
    db: Box<dyn Database>,
}

impl SqliteStore {
    /// Opens (or creates) the database at `path` and ensures the schema
    /// exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the database cannot be opened or schema
    /// creation fails.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = init_sqlite_rusqlite(Some(path)).map_err(|e| StoreError::Database(e.to_string()))?;
        ensure_schema(db.as_ref()).await?;

        log::info!("Opened editorial database at {}", path.display());

        Ok(Self { db })
    }
}

/// Creates all tables if they don't already exist.
async fn ensure_schema(db: &dyn Database) -> Result<(), StoreError> {
    db.exec_raw(
        "CREATE TABLE IF NOT EXISTS users (
            id            TEXT PRIMARY KEY,
            username      TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            role          TEXT NOT NULL,
            created_at    TEXT NOT NULL
        )",
    )
    .await
    .map_err(db_err)?;

    db.exec_raw(
        "CREATE TABLE IF NOT EXISTS articles (
            id          TEXT PRIMARY KEY,
            title       TEXT NOT NULL,
            body        TEXT NOT NULL,
            status      TEXT NOT NULL,
            author_id   TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        )",
    )
    .await
    .map_err(db_err)?;

    db.exec_raw(
        "CREATE INDEX IF NOT EXISTS idx_articles_status_created
         ON articles (status, created_at)",
    )
    .await
    .map_err(db_err)?;

    // SQLite has foreign key enforcement off by default
    db.exec_raw("PRAGMA foreign_keys = ON")
        .await
        .map_err(db_err)?;

    Ok(())
}

#[async_trait::async_trait]
impl EditorialStore for SqliteStore {
    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        if self.find_user_by_username(&user.username).await?.is_some() {
            return Err(username_taken(&user.username));
        }

        let result = self
            .db
            .exec_raw_params(
                "INSERT INTO users (id, username, password_hash, role, created_at)
                 VALUES ($1, $2, $3, $4, $5)",
                &[
                    DatabaseValue::String(user.id.clone()),
                    DatabaseValue::String(user.username.clone()),
                    DatabaseValue::String(user.password_hash.clone()),
                    DatabaseValue::String(user.role.to_string()),
                    DatabaseValue::String(timestamp(user.created_at)),
                ],
            )
            .await;

        if let Err(e) = result {
            let err = db_err(e);
            // Lost a race with a concurrent registration of the same name
            if self.find_user_by_username(&user.username).await?.is_some() {
                return Err(username_taken(&user.username));
            }
            return Err(err);
        }

        Ok(())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let rows = self
            .db
            .query_raw_params(
                "SELECT id, username, password_hash, role, created_at
                 FROM users WHERE username = $1",
                &[DatabaseValue::String(username.to_string())],
            )
            .await
            .map_err(db_err)?;

        rows.first().map(user_from_row).transpose()
    }

    async fn find_user(&self, id: &str) -> Result<Option<User>, StoreError> {
        let rows = self
            .db
            .query_raw_params(
                "SELECT id, username, password_hash, role, created_at
                 FROM users WHERE id = $1",
                &[DatabaseValue::String(id.to_string())],
            )
            .await
            .map_err(db_err)?;

        rows.first().map(user_from_row).transpose()
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let rows = self
            .db
            .query_raw_params(
                "SELECT id, username, password_hash, role, created_at
                 FROM users ORDER BY created_at, id",
                &[],
            )
            .await
            .map_err(db_err)?;

        rows.iter().map(user_from_row).collect()
    }

    async fn insert_article(&self, article: &Article) -> Result<(), StoreError> {
        self.db
            .exec_raw_params(
                "INSERT INTO articles (id, title, body, status, author_id, created_at, updated_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
                &[
                    DatabaseValue::String(article.id.clone()),
                    DatabaseValue::String(article.title.clone()),
                    DatabaseValue::String(article.body.clone()),
                    DatabaseValue::String(article.status.to_string()),
                    DatabaseValue::String(article.author_id.clone()),
                    DatabaseValue::String(timestamp(article.created_at)),
                    DatabaseValue::String(timestamp(article.updated_at)),
                ],
            )
            .await
            .map_err(db_err)?;

        Ok(())
    }

    async fn find_article(&self, id: &str) -> Result<Option<Article>, StoreError> {
        let rows = self
            .db
            .query_raw_params(
                &format!("SELECT {ARTICLE_COLUMNS} FROM articles a WHERE a.id = $1"),
                &[DatabaseValue::String(id.to_string())],
            )
            .await
            .map_err(db_err)?;

        rows.first().map(article_from_row).transpose()
    }

    async fn update_content(
        &self,
        id: &str,
        title: &str,
        body: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Article>, StoreError> {
        let updated = self
            .db
            .exec_raw_params(
                "UPDATE articles SET title = $1, body = $2, updated_at = $3 WHERE id = $4",
                &[
                    DatabaseValue::String(title.to_string()),
                    DatabaseValue::String(body.to_string()),
                    DatabaseValue::String(timestamp(updated_at)),
                    DatabaseValue::String(id.to_string()),
                ],
            )
            .await
            .map_err(db_err)?;

        if updated == 0 {
            return Ok(None);
        }

        self.find_article(id).await
    }

    async fn update_status(
        &self,
        id: &str,
        expected: ArticleStatus,
        new: ArticleStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<StatusUpdate, StoreError> {
        // RETURNING reads the row in the same statement as the write
        let rows = self
            .db
            .query_raw_params(
                "UPDATE articles SET status = $1, updated_at = $2
                 WHERE id = $3 AND status = $4
                 RETURNING id, title, body, status, author_id, created_at, updated_at",
                &[
                    DatabaseValue::String(new.to_string()),
                    DatabaseValue::String(timestamp(updated_at)),
                    DatabaseValue::String(id.to_string()),
                    DatabaseValue::String(expected.to_string()),
                ],
            )
            .await
            .map_err(db_err)?;

        if let Some(row) = rows.first() {
            return Ok(StatusUpdate::Applied(article_from_row(row)?));
        }

        Ok(match self.find_article(id).await? {
            None => StatusUpdate::Missing,
            Some(article) => StatusUpdate::Stale(article.status),
        })
    }

    async fn list_articles(
        &self,
        status: Option<ArticleStatus>,
    ) -> Result<Vec<ArticleWithAuthor>, StoreError> {
        let base = format!(
            "SELECT {ARTICLE_COLUMNS}, u.username AS author_username, u.role AS author_role
             FROM articles a JOIN users u ON u.id = a.author_id"
        );

        let rows = match status {
            Some(status) => {
                self.db
                    .query_raw_params(
                        &format!("{base} WHERE a.status = $1 ORDER BY a.created_at, a.id"),
                        &[DatabaseValue::String(status.to_string())],
                    )
                    .await
            }
            None => {
                self.db
                    .query_raw_params(&format!("{base} ORDER BY a.created_at, a.id"), &[])
                    .await
            }
        }
        .map_err(db_err)?;

        rows.iter()
            .map(|row| {
                Ok(ArticleWithAuthor {
                    article: article_from_row(row)?,
                    author_username: text(row, "author_username")?,
                    author_role: parse_enum::<Role>(row, "author_role")?,
                })
            })
            .collect()
    }
}

fn db_err(e: impl std::fmt::Display) -> StoreError {
    StoreError::Database(e.to_string())
}

fn username_taken(username: &str) -> StoreError {
    StoreError::Conflict {
        message: format!("username '{username}' is taken"),
    }
}

/// Fixed-width RFC 3339 with microseconds and a `Z` suffix.
fn timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn text(row: &Row, column: &str) -> Result<String, StoreError> {
    row.to_value(column).map_err(|e| StoreError::Corrupt {
        message: format!("column '{column}': {e:?}"),
    })
}

fn parse_time(row: &Row, column: &str) -> Result<DateTime<Utc>, StoreError> {
    let raw = text(row, column)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt {
            message: format!("column '{column}' is not a timestamp ({raw}): {e}"),
        })
}

fn parse_enum<T>(row: &Row, column: &str) -> Result<T, StoreError>
where
    T: std::str::FromStr,
{
    let raw = text(row, column)?;
    raw.parse().map_err(|_| StoreError::Corrupt {
        message: format!("column '{column}' has unknown value '{raw}'"),
    })
}

fn user_from_row(row: &Row) -> Result<User, StoreError> {
    Ok(User {
        id: text(row, "id")?,
        username: text(row, "username")?,
        password_hash: text(row, "password_hash")?,
        role: parse_enum(row, "role")?,
        created_at: parse_time(row, "created_at")?,
    })
}

fn article_from_row(row: &Row) -> Result<Article, StoreError> {
    Ok(Article {
        id: text(row, "id")?,
        title: text(row, "title")?,
        body: text(row, "body")?,
        status: parse_enum(row, "status")?,
        author_id: text(row, "author_id")?,
        created_at: parse_time(row, "created_at")?,
        updated_at: parse_time(row, "updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn base_time() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-05-21T06:00:00.123456Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn user(username: &str, role: Role) -> User {
        User {
            id: uuid::Uuid::new_v4().to_string(),
            username: username.to_string(),
            password_hash: "$argon2id$v=19$placeholder".to_string(),
            role,
            created_at: base_time(),
        }
    }

    fn article(author: &User, created_at: DateTime<Utc>) -> Article {
        Article {
            id: uuid::Uuid::new_v4().to_string(),
            title: "Turnout in Addis Ababa".to_string(),
            body: "Polling stations opened at 6am.".to_string(),
            status: ArticleStatus::Draft,
            author_id: author.id.clone(),
            created_at,
            updated_at: created_at,
        }
    }

    #[tokio::test]
    async fn round_trips_users_and_articles() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(&dir.path().join("editorial.db"))
            .await
            .unwrap();

        let writer = user("hanna", Role::Writer);
        store.insert_user(&writer).await.unwrap();
        assert!(matches!(
            store.insert_user(&user("hanna", Role::Admin)).await,
            Err(StoreError::Conflict { .. })
        ));
        assert_eq!(
            store.find_user_by_username("hanna").await.unwrap(),
            Some(writer.clone())
        );

        let now = base_time();
        let first = article(&writer, now);
        let second = article(&writer, now + Duration::seconds(1));
        store.insert_article(&second).await.unwrap();
        store.insert_article(&first).await.unwrap();

        let listed = store.list_articles(None).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].article.id, first.id);
        assert_eq!(listed[0].author_username, "hanna");
        assert_eq!(listed[0].author_role, Role::Writer);

        let applied = store
            .update_status(&first.id, ArticleStatus::Draft, ArticleStatus::Review, now)
            .await
            .unwrap();
        assert!(matches!(applied, StatusUpdate::Applied(ref a) if a.status == ArticleStatus::Review));

        let stale = store
            .update_status(&first.id, ArticleStatus::Draft, ArticleStatus::Review, now)
            .await
            .unwrap();
        assert_eq!(stale, StatusUpdate::Stale(ArticleStatus::Review));

        let missing = store
            .update_status("nope", ArticleStatus::Draft, ArticleStatus::Review, now)
            .await
            .unwrap();
        assert_eq!(missing, StatusUpdate::Missing);

        let in_review = store
            .list_articles(Some(ArticleStatus::Review))
            .await
            .unwrap();
        assert_eq!(in_review.len(), 1);
        assert_eq!(in_review[0].article.id, first.id);

        let edited = store
            .update_content(&second.id, "New title", "New body", now)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(edited.title, "New title");
        assert_eq!(edited.status, ArticleStatus::Draft);
        assert_eq!(
            store.update_content("nope", "t", "b", now).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn concurrent_transitions_apply_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(&dir.path().join("editorial.db"))
            .await
            .unwrap();

        let writer = user("meron", Role::Writer);
        store.insert_user(&writer).await.unwrap();
        let draft = article(&writer, base_time());
        store.insert_article(&draft).await.unwrap();

        let later = base_time() + Duration::seconds(5);
        let (a, b) = tokio::join!(
            store.update_status(&draft.id, ArticleStatus::Draft, ArticleStatus::Review, later),
            store.update_status(&draft.id, ArticleStatus::Draft, ArticleStatus::Review, later),
        );
        let outcomes = [a.unwrap(), b.unwrap()];

        let applied: Vec<&Article> = outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                StatusUpdate::Applied(article) => Some(article),
                _ => None,
            })
            .collect();
        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].status, ArticleStatus::Review);
        assert_eq!(applied[0].updated_at, later);
        assert_eq!(applied[0].title, draft.title);
        assert!(outcomes.contains(&StatusUpdate::Stale(ArticleStatus::Review)));
    }
}
