#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Editorial content types.
//!
//! Articles move through a strictly linear publication workflow
//! ([`ArticleStatus`]). Who may do what is decided by the caller's [`Role`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Account role.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    /// Drafts and revises articles.
    Writer,
    /// Revises articles and moves them through review.
    Editor,
    /// Moves articles through review and publication.
    Admin,
}

impl Role {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Writer, Self::Editor, Self::Admin]
    }
}

/// Publication stage of an article.
///
/// Stages form a total order and a strict chain: `Draft` → `Review` →
/// `Published`. There is no branching, skipping, or moving backwards.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ArticleStatus {
    /// Being written; the initial stage.
    Draft,
    /// Awaiting editorial approval.
    Review,
    /// Publicly visible; terminal.
    Published,
}

impl ArticleStatus {
    /// Stage every new article starts in.
    pub const INITIAL: Self = Self::Draft;

    /// Returns all variants in workflow order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Draft, Self::Review, Self::Published]
    }

    /// The only stage reachable from this one, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Draft => Some(Self::Review),
            Self::Review => Some(Self::Published),
            Self::Published => None,
        }
    }

    /// Whether moving from `self` to `requested` is a legal transition.
    #[must_use]
    pub fn can_transition_to(self, requested: Self) -> bool {
        self.next() == Some(requested)
    }

    /// Whether no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        self.next().is_none()
    }
}

/// Something a caller can ask the editorial service to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Operation {
    /// Create a new article.
    CreateArticle,
    /// Change an article's title or body.
    EditArticle,
    /// Move an article to another workflow stage.
    ChangeStatus,
    /// List articles.
    ListArticles,
}

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// UUID.
    pub id: String,
    /// Unique login name.
    pub username: String,
    /// Argon2 PHC hash string.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Account role.
    pub role: Role,
    /// When the account was registered.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Returns the caller identity for this account.
    #[must_use]
    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.id.clone(),
            username: self.username.clone(),
            role: self.role,
        }
    }
}

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Account UUID.
    pub user_id: String,
    /// Account username.
    pub username: String,
    /// Account role.
    pub role: Role,
}

/// An editorial article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// UUID.
    pub id: String,
    /// Headline.
    pub title: String,
    /// Body text.
    pub body: String,
    /// Workflow stage.
    pub status: ArticleStatus,
    /// Author's user ID. The article does not own the user.
    pub author_id: String,
    /// When the article was created.
    pub created_at: DateTime<Utc>,
    /// When the article's content or status last changed.
    pub updated_at: DateTime<Utc>,
}

/// An article with its author's public details attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleWithAuthor {
    /// The article.
    #[serde(flatten)]
    pub article: Article,
    /// Author's username.
    pub author_username: String,
    /// Author's role.
    pub author_role: Role,
}
