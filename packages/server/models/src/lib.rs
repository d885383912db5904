#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the election map server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the stored editorial types so that, for example, password hashes
//! can never reach a response body.

use chrono::{DateTime, Utc};
use election_map_editorial_models::{Article, ArticleStatus, ArticleWithAuthor, Role, User};
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the server is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
}

/// Body of `POST /api/auth/register` and `POST /api/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsRequest {
    /// Login name.
    pub username: String,
    /// Plain-text password.
    pub password: String,
}

/// A user account as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiUser {
    /// Account UUID.
    pub id: String,
    /// Login name.
    pub username: String,
    /// Account role.
    pub role: Role,
    /// When the account was registered.
    pub created_at: DateTime<Utc>,
}

impl From<User> for ApiUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// Successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Bearer token for the `Authorization` header.
    pub token: String,
    /// When the token expires.
    pub expires_at: DateTime<Utc>,
    /// Account the token belongs to.
    pub user: ApiSessionUser,
}

/// The account details carried by a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSessionUser {
    /// Account UUID.
    pub id: String,
    /// Login name.
    pub username: String,
    /// Account role.
    pub role: Role,
}

/// Body of `POST /api/articles` and `PUT /api/articles/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleRequest {
    /// Headline.
    pub title: String,
    /// Body text.
    pub body: String,
}

/// Body of `POST /api/articles/{id}/transition`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionRequest {
    /// Requested workflow stage.
    pub status: ArticleStatus,
}

/// Query parameters for `GET /api/articles`.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleListParams {
    /// Only return articles in this stage.
    pub status: Option<ArticleStatus>,
}

/// An article as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiArticle {
    /// Article UUID.
    pub id: String,
    /// Headline.
    pub title: String,
    /// Body text.
    pub body: String,
    /// Workflow stage.
    pub status: ArticleStatus,
    /// Author's account UUID.
    pub author_id: String,
    /// Author's username, present in listings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_username: Option<String>,
    /// Author's role, present in listings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_role: Option<Role>,
    /// When the article was created.
    pub created_at: DateTime<Utc>,
    /// When the article last changed.
    pub updated_at: DateTime<Utc>,
}

impl From<Article> for ApiArticle {
    fn from(article: Article) -> Self {
        Self {
            id: article.id,
            title: article.title,
            body: article.body,
            status: article.status,
            author_id: article.author_id,
            author_username: None,
            author_role: None,
            created_at: article.created_at,
            updated_at: article.updated_at,
        }
    }
}

impl From<ArticleWithAuthor> for ApiArticle {
    fn from(row: ArticleWithAuthor) -> Self {
        Self {
            author_username: Some(row.author_username),
            author_role: Some(row.author_role),
            ..row.article.into()
        }
    }
}
