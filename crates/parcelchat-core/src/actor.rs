use parcelchat_types::Role;

use crate::error::{ChatError, Result};

/// Caller of a chat operation. Public widget traffic is anonymous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Actor {
    role: Option<Role>,
}

impl Actor {
    pub fn anonymous() -> Self {
        Self { role: None }
    }

    pub fn with_role(role: Role) -> Self {
        Self { role: Some(role) }
    }

    pub fn admin() -> Self {
        Self::with_role(Role::Admin)
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    /// 401 when nobody is authenticated, 403 when the role is not ADMIN
    pub fn require_admin(&self) -> Result<()> {
        match self.role {
            None => Err(ChatError::Unauthorized),
            Some(Role::Admin) => Ok(()),
            Some(Role::User) => Err(ChatError::Forbidden),
        }
    }
}
