//! Caller identity and the single capability check every operation goes through.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::CirculationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Librarian,
}

impl Role {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "student" => Some(Role::Student),
            "librarian" => Some(Role::Librarian),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Librarian => "librarian",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authenticated identity as supplied by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: i32,
    pub role: Role,
}

impl Caller {
    pub fn student(user_id: i32) -> Self {
        Self {
            user_id,
            role: Role::Student,
        }
    }

    pub fn librarian(user_id: i32) -> Self {
        Self {
            user_id,
            role: Role::Librarian,
        }
    }
}

/// Operations gated by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Borrow,
    RequestReturn,
    ViewOwnDashboard,
    VerifyReturn,
    RejectReturn,
    MarkFinePaid,
    SettleFine,
    ManageCatalogue,
    ViewCirculation,
    RunSweep,
}

impl Action {
    pub fn required_role(self) -> Role {
        match self {
            Action::Borrow | Action::RequestReturn | Action::ViewOwnDashboard => Role::Student,
            Action::VerifyReturn
            | Action::RejectReturn
            | Action::MarkFinePaid
            | Action::SettleFine
            | Action::ManageCatalogue
            | Action::ViewCirculation
            | Action::RunSweep => Role::Librarian,
        }
    }

    fn denial(self) -> &'static str {
        match self {
            Action::Borrow => "Only students can borrow books",
            Action::RequestReturn => "Only students can request returns",
            Action::ViewOwnDashboard => "Only students have a dashboard",
            Action::VerifyReturn => "Only librarians can verify returns",
            Action::RejectReturn => "Only librarians can reject returns",
            Action::MarkFinePaid | Action::SettleFine => "Only librarians can settle fines",
            Action::ManageCatalogue => "Only librarians can manage the catalogue",
            Action::ViewCirculation => "Only librarians can view circulation records",
            Action::RunSweep => "Only librarians can run the overdue sweep",
        }
    }
}

/// Allow or deny `action` for `caller`.
pub fn authorize(caller: &Caller, action: Action) -> Result<(), CirculationError> {
    if caller.role == action.required_role() {
        Ok(())
    } else {
        tracing::info!(
            "Denied {:?} to user {} with role {}",
            action,
            caller.user_id,
            caller.role
        );
        Err(CirculationError::PermissionDenied(action.denial().to_string()))
    }
}

/// Ownership check for student actions on a specific student profile.
pub fn ensure_owner(caller: &Caller, owner_user_id: Option<i32>) -> Result<(), CirculationError> {
    if owner_user_id == Some(caller.user_id) {
        Ok(())
    } else {
        Err(CirculationError::PermissionDenied(
            "This record belongs to another student".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_students_cannot_run_librarian_actions() {
        let student = Caller::student(7);
        assert!(authorize(&student, Action::Borrow).is_ok());
        assert!(authorize(&student, Action::RequestReturn).is_ok());
        for action in [
            Action::VerifyReturn,
            Action::RejectReturn,
            Action::MarkFinePaid,
            Action::SettleFine,
            Action::ManageCatalogue,
            Action::RunSweep,
        ] {
            assert!(matches!(
                authorize(&student, action),
                Err(CirculationError::PermissionDenied(_))
            ));
        }
    }

    #[test]
    fn test_librarians_cannot_borrow() {
        let librarian = Caller::librarian(1);
        assert!(authorize(&librarian, Action::VerifyReturn).is_ok());
        assert_eq!(
            authorize(&librarian, Action::Borrow),
            Err(CirculationError::PermissionDenied(
                "Only students can borrow books".to_string()
            ))
        );
    }

    #[test]
    fn test_ownership() {
        let caller = Caller::student(3);
        assert!(ensure_owner(&caller, Some(3)).is_ok());
        assert!(ensure_owner(&caller, Some(4)).is_err());
        assert!(ensure_owner(&caller, None).is_err());
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("librarian"), Some(Role::Librarian));
        assert_eq!(Role::parse("admin"), None);
    }
}
