//! Role-based access policy.
//!
//! A static table from [`Operation`] to the roles allowed to invoke it. The
//! policy looks only at the caller's role and the operation, never at the
//! article.

use election_map_editorial_models::{Operation, Role};

use crate::EditorialError;

/// Roles permitted to invoke `operation`.
#[must_use]
pub const fn permitted_roles(operation: Operation) -> &'static [Role] {
    match operation {
        Operation::CreateArticle => &[Role::Writer],
        Operation::EditArticle => &[Role::Writer, Role::Editor],
        Operation::ChangeStatus => &[Role::Editor, Role::Admin],
        Operation::ListArticles => &[Role::Writer, Role::Editor, Role::Admin],
    }
}

/// Whether `role` may invoke `operation`.
#[must_use]
pub fn is_permitted(role: Role, operation: Operation) -> bool {
    permitted_roles(operation).contains(&role)
}

/// Checks that `role` may invoke `operation`.
///
/// # Errors
///
/// Returns [`EditorialError::Forbidden`] if it may not.
pub fn authorize(role: Role, operation: Operation) -> Result<(), EditorialError> {
    if is_permitted(role, operation) {
        Ok(())
    } else {
        log::debug!("Denied {operation} to role {role}");
        Err(EditorialError::Forbidden { operation, role })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_writers_create() {
        assert!(is_permitted(Role::Writer, Operation::CreateArticle));
        assert!(!is_permitted(Role::Editor, Operation::CreateArticle));
        assert!(!is_permitted(Role::Admin, Operation::CreateArticle));
    }

    #[test]
    fn writers_and_editors_edit() {
        assert!(is_permitted(Role::Writer, Operation::EditArticle));
        assert!(is_permitted(Role::Editor, Operation::EditArticle));
        assert!(!is_permitted(Role::Admin, Operation::EditArticle));
    }

    #[test]
    fn editors_and_admins_change_status() {
        assert!(!is_permitted(Role::Writer, Operation::ChangeStatus));
        assert!(is_permitted(Role::Editor, Operation::ChangeStatus));
        assert!(is_permitted(Role::Admin, Operation::ChangeStatus));
    }

    #[test]
    fn every_role_lists() {
        for role in Role::all() {
            assert!(is_permitted(*role, Operation::ListArticles));
        }
    }

    #[test]
    fn denial_names_role_and_operation() {
        let err = authorize(Role::Writer, Operation::ChangeStatus).unwrap_err();

        assert!(matches!(
            err,
            EditorialError::Forbidden {
                operation: Operation::ChangeStatus,
                role: Role::Writer,
            }
        ));
        assert_eq!(err.to_string(), "Role 'writer' may not change_status");
    }
}
