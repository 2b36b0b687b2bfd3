/// Task access policy
///
/// Every task operation consults [`authorize`] with the caller, the operation,
/// and (for single-task operations) the target task before touching the store.
///
/// # Policy
///
/// | Operation | Admin | User |
/// |---|---|---|
/// | `Create`, `AdminUpdate`, `Delete` | yes | no |
/// | `ListAll`, `Summary` | yes | yes |
/// | `ListForUser(id)` | yes | only own id |
/// | `View`, `UpdateStatus` | yes | only when assignee |
///
/// # Example
///
/// ```
/// use taskdesk_shared::auth::authorization::{authorize, TaskOperation};
/// use taskdesk_shared::auth::middleware::AuthContext;
/// use taskdesk_shared::models::user::Role;
///
/// let user = AuthContext::new(3, Role::User);
/// assert!(authorize(&user, TaskOperation::ListForUser(3), None).is_ok());
/// assert!(authorize(&user, TaskOperation::ListForUser(4), None).is_err());
/// assert!(authorize(&user, TaskOperation::Delete, None).is_err());
/// ```

use super::middleware::AuthContext;
use crate::models::task::Task;
use crate::models::user::Role;

/// Error type for authorization checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// Caller doesn't have the required role
    #[error("Insufficient permissions: requires {required} role")]
    InsufficientRole { required: Role },

    /// Caller isn't the task's assignee
    #[error("Not authorized to access this task")]
    NotAssignee,

    /// Caller asked for another user's tasks
    #[error("Not authorized to view tasks of another user")]
    OtherUser,
}

/// Operations governed by the policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOperation {
    Create,
    ListAll,
    Summary,
    ListForUser(i64),
    View,
    UpdateStatus,
    AdminUpdate,
    Delete,
}

/// Requires the caller to hold `required`
pub fn require_role(auth: &AuthContext, required: Role) -> Result<(), AuthzError> {
    if auth.role != required {
        return Err(AuthzError::InsufficientRole { required });
    }

    Ok(())
}

/// Decides whether `auth` may perform `operation`
///
/// `target` is the task for `View` and `UpdateStatus`. A non-admin with no
/// target is denied; callers load the task first and report a missing one as
/// not found before asking.
pub fn authorize(
    auth: &AuthContext,
    operation: TaskOperation,
    target: Option<&Task>,
) -> Result<(), AuthzError> {
    match operation {
        TaskOperation::Create | TaskOperation::AdminUpdate | TaskOperation::Delete => {
            require_role(auth, Role::Admin)
        }
        TaskOperation::ListAll | TaskOperation::Summary => Ok(()),
        TaskOperation::ListForUser(user_id) => {
            if auth.is_admin() || auth.user_id == user_id {
                Ok(())
            } else {
                Err(AuthzError::OtherUser)
            }
        }
        TaskOperation::View | TaskOperation::UpdateStatus => {
            if auth.is_admin() {
                return Ok(());
            }
            match target {
                Some(task) if task.is_assigned_to(auth.user_id) => Ok(()),
                _ => Err(AuthzError::NotAssignee),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::{TaskPriority, TaskStatus};
    use chrono::Utc;

    fn task_for(assigned_to: Option<i64>) -> Task {
        Task {
            id: 1,
            title: "t".to_string(),
            description: None,
            assigned_to,
            due_date: None,
            priority: TaskPriority::Medium,
            status: TaskStatus::Open,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    const ADMIN: AuthContext = AuthContext { user_id: 1, role: Role::Admin };
    const USER: AuthContext = AuthContext { user_id: 2, role: Role::User };

    #[test]
    fn test_admin_only_operations() {
        for op in [TaskOperation::Create, TaskOperation::AdminUpdate, TaskOperation::Delete] {
            assert!(authorize(&ADMIN, op, None).is_ok());
            assert_eq!(
                authorize(&USER, op, None),
                Err(AuthzError::InsufficientRole { required: Role::Admin })
            );
        }
    }

    #[test]
    fn test_any_authenticated_operations() {
        for op in [TaskOperation::ListAll, TaskOperation::Summary] {
            assert!(authorize(&ADMIN, op, None).is_ok());
            assert!(authorize(&USER, op, None).is_ok());
        }
    }

    #[test]
    fn test_list_for_user() {
        assert!(authorize(&USER, TaskOperation::ListForUser(2), None).is_ok());
        assert_eq!(
            authorize(&USER, TaskOperation::ListForUser(3), None),
            Err(AuthzError::OtherUser)
        );
        assert!(authorize(&ADMIN, TaskOperation::ListForUser(3), None).is_ok());
    }

    #[test]
    fn test_assignee_operations() {
        let mine = task_for(Some(2));
        let theirs = task_for(Some(9));
        let unassigned = task_for(None);

        for op in [TaskOperation::View, TaskOperation::UpdateStatus] {
            assert!(authorize(&USER, op, Some(&mine)).is_ok());
            assert_eq!(authorize(&USER, op, Some(&theirs)), Err(AuthzError::NotAssignee));
            assert_eq!(authorize(&USER, op, Some(&unassigned)), Err(AuthzError::NotAssignee));
            assert_eq!(authorize(&USER, op, None), Err(AuthzError::NotAssignee));
            assert!(authorize(&ADMIN, op, Some(&theirs)).is_ok());
        }
    }

    #[test]
    fn test_require_role() {
        assert!(require_role(&ADMIN, Role::Admin).is_ok());
        let err = require_role(&USER, Role::Admin).unwrap_err();
        assert!(err.to_string().contains("admin"));
    }
}
