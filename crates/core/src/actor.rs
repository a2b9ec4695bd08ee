//! The acting identity passed into every lifecycle operation.
//!
//! Authentication happens at the transport edge; by the time an [`Actor`]
//! exists its id and role are trusted. Authorization decisions are made
//! against this value explicitly rather than against ambient request state.

use crate::error::CoreError;
use crate::roles::{ROLE_ADMIN, ROLE_STUDENT};
use crate::types::DbId;

/// A verified user acting on the system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: DbId,
    pub role: String,
}

impl Actor {
    pub fn new(user_id: DbId, role: impl Into<String>) -> Self {
        Self {
            user_id,
            role: role.into(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }

    pub fn is_student(&self) -> bool {
        self.role == ROLE_STUDENT
    }

    /// Whether this actor may act on a resource owned by `owner_id`.
    ///
    /// Owners always may; admins may act on anyone's resources.
    pub fn can_manage(&self, owner_id: DbId) -> bool {
        self.user_id == owner_id || self.is_admin()
    }

    /// Like [`can_manage`](Self::can_manage) but returns `Forbidden` with
    /// `action` embedded in the message.
    pub fn ensure_can_manage(&self, owner_id: DbId, action: &str) -> Result<(), CoreError> {
        if self.can_manage(owner_id) {
            Ok(())
        } else {
            Err(CoreError::Forbidden(format!(
                "You do not have permission to {action}"
            )))
        }
    }
}
