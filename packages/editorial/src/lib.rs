#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Editorial workflow for election coverage articles.
//!
//! Every request goes through the same gates, in order:
//!
//! 1. [`policy`] decides whether the caller's role may invoke the operation,
//! 2. input is validated,
//! 3. [`workflow`] decides whether a requested status change is legal,
//! 4. the change is applied as a single atomic [`store`] operation.
//!
//! [`service::ArticleService`] wires these together.

pub mod policy;
pub mod service;
pub mod store;
pub mod workflow;

pub use election_map_editorial_models as models;

use election_map_editorial_models::{ArticleStatus, Operation, Role};
use thiserror::Error;

use crate::store::StoreError;

/// Errors returned by editorial operations.
#[derive(Debug, Error)]
pub enum EditorialError {
    /// Required input is missing or malformed.
    #[error("Validation error: {message}")]
    Validation {
        /// Description of what is wrong.
        message: String,
    },

    /// The caller's role may not invoke the operation.
    #[error("Role '{role}' may not {operation}")]
    Forbidden {
        /// Operation that was attempted.
        operation: Operation,
        /// Caller's role.
        role: Role,
    },

    /// The requested status is not the next stage after the current one.
    #[error("Illegal transition from '{current}' to '{requested}'")]
    IllegalTransition {
        /// Article's status at the time of the request.
        current: ArticleStatus,
        /// Status the caller asked for.
        requested: ArticleStatus,
    },

    /// The referenced article does not exist.
    #[error("Article not found: {id}")]
    NotFound {
        /// Requested article ID.
        id: String,
    },

    /// The backing store failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
