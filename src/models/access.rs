//! Authorization predicate.
//!
//! Handlers state what they need as a [`Requirement`]; [`authorize`] turns
//! the caller's claims into an allow/deny [`Decision`].

use uuid::Uuid;

use super::user::{Role, UserClaims};
use crate::{error::AppError, i18n::Message};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// Caller must hold the role
    Role(Role),
    /// Caller is the given user, or holds the role
    SelfOrRole(Uuid, Role),
    /// Caller is the given user
    Owner(Uuid),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(Message),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn into_result(self) -> Result<(), AppError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(msg) => Err(AppError::Authorization(msg)),
        }
    }
}

pub fn authorize(caller: &UserClaims, requirement: &Requirement) -> Decision {
    match requirement {
        Requirement::Role(role) if caller.has_role(*role) => Decision::Allow,
        Requirement::Role(role) => {
            Decision::Deny(Message::new("error.auth.role_required").arg("role", role))
        }
        Requirement::SelfOrRole(id, role) if caller.user_id == *id || caller.has_role(*role) => {
            Decision::Allow
        }
        Requirement::SelfOrRole(id, _) => {
            Decision::Deny(Message::new("error.auth.edit_forbidden").arg("user", id.simple()))
        }
        Requirement::Owner(id) if caller.user_id == *id => Decision::Allow,
        Requirement::Owner(id) => {
            Decision::Deny(Message::new("error.auth.owner_only").arg("user", id.simple()))
        }
    }
}
