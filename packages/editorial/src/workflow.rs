//! Publication workflow state machine.
//!
//! `Draft` → `Review` → `Published`, one step at a time, forwards only.

use election_map_editorial_models::ArticleStatus;

use crate::EditorialError;

/// Checks that `requested` is exactly the stage after `current`.
///
/// # Errors
///
/// Returns [`EditorialError::IllegalTransition`] for same-stage, backward,
/// and skip-ahead requests, and for any request from a terminal stage.
pub fn check_transition(
    current: ArticleStatus,
    requested: ArticleStatus,
) -> Result<(), EditorialError> {
    if current.can_transition_to(requested) {
        Ok(())
    } else {
        Err(EditorialError::IllegalTransition { current, requested })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ArticleStatus::{Draft, Published, Review};

    #[test]
    fn forward_single_steps_are_legal() {
        assert!(check_transition(Draft, Review).is_ok());
        assert!(check_transition(Review, Published).is_ok());
    }

    #[test]
    fn skipping_ahead_is_illegal() {
        let err = check_transition(Draft, Published).unwrap_err();

        assert!(matches!(
            err,
            EditorialError::IllegalTransition {
                current: Draft,
                requested: Published,
            }
        ));
        assert_eq!(
            err.to_string(),
            "Illegal transition from 'draft' to 'published'"
        );
    }

    #[test]
    fn same_stage_and_backward_are_illegal() {
        for &status in ArticleStatus::all() {
            assert!(check_transition(status, status).is_err());
        }
        assert!(check_transition(Review, Draft).is_err());
        assert!(check_transition(Published, Review).is_err());
        assert!(check_transition(Published, Draft).is_err());
    }

    #[test]
    fn published_is_terminal() {
        for &requested in ArticleStatus::all() {
            assert!(check_transition(Published, requested).is_err());
        }
    }
}
