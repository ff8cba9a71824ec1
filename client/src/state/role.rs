//! Canonical role resolution.
//!
//! DESIGN
//! ======
//! Backend payloads disagree between `role`, `user_type`, superuser flags and
//! legacy employee markers. Resolution is a total, priority-ordered function:
//! the first matching signal wins and every input yields exactly one role.
//! There is no canonical "employee"; employees resolve to `Manager`.

#[cfg(test)]
#[path = "role_test.rs"]
mod role_test;

use std::fmt;

use crate::net::types::User;

/// Raw role value carried by invited team members.
pub const INVITED_MEMBER_ROLE: &str = "membre_invite";

/// Authorization role used by every guard and menu decision.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CanonicalRole {
    #[default]
    Guest,
    Admin,
    Manager,
    Client,
}

impl CanonicalRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Guest => "guest",
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Client => "client",
        }
    }

    /// Whether this role works on the admin side of the portal.
    pub fn is_staff(self) -> bool {
        matches!(self, Self::Admin | Self::Manager)
    }

    /// Whether this role satisfies `allowed`.
    ///
    /// An empty set admits any role. Managers inherit admin-gated access;
    /// admins do not inherit manager-only access.
    pub fn satisfies(self, allowed: &[CanonicalRole]) -> bool {
        allowed.is_empty()
            || allowed.contains(&self)
            || (self == Self::Manager && allowed.contains(&Self::Admin))
    }
}

impl fmt::Display for CanonicalRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve the canonical role of `user`.
pub fn resolve_role(user: Option<&User>) -> CanonicalRole {
    let Some(user) = user else {
        return CanonicalRole::Guest;
    };
    if user.is_superuser {
        return CanonicalRole::Admin;
    }

    let role = user.role.as_deref().map(str::to_lowercase);
    let role = role.as_deref();
    let user_type = user.user_type.as_deref().map(str::to_lowercase);
    let user_type = user_type.as_deref();

    if matches!(role, Some("admin" | "administrateur")) {
        return CanonicalRole::Admin;
    }
    if matches!(role, Some("manager" | "gestionnaire")) || user_type == Some("employee") {
        return CanonicalRole::Manager;
    }
    if matches!(role, Some("employee" | "employé")) {
        return CanonicalRole::Manager;
    }
    if matches!(role, Some("client" | "owner" | INVITED_MEMBER_ROLE)) || user_type == Some("client") {
        return CanonicalRole::Client;
    }
    if user.employee_id.is_some() {
        return CanonicalRole::Manager;
    }
    CanonicalRole::Client
}

/// Whether `user` is an invited team member (a restricted `Client`).
pub fn is_invited_member(user: &User) -> bool {
    user.role
        .as_deref()
        .is_some_and(|role| role.eq_ignore_ascii_case(INVITED_MEMBER_ROLE))
}
