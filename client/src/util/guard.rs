//! Route authorization decisions.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every guarded page asks `authorize` what to do on each render. The answer
//! is a tagged decision; the `RouteGuard` component turns it into a loading
//! indicator, the page, or a navigation.
//!
//! DESIGN
//! ======
//! Checks run in a fixed order and the first match wins:
//! loading, unauthenticated, deactivated, first login, unverified, forbidden.
//! Invited-member confinement is a separate check applied by the client
//! section layout on top of this one.
//!
//! TRADE-OFFS
//! ==========
//! First-login onboarding applies to every account, staff included. The
//! subscription page therefore only requires a session (see
//! `routes::requirement_for`), and invited members pending first login may
//! stay on it; either rule missing would bounce between two redirects.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use crate::net::types::User;
use crate::routes::{
    ADMIN_UNAUTHORIZED_PATH, AUTH_UNAUTHORIZED_PATH, CLIENT_SUBSCRIPTION_PATH, CLIENT_UNAUTHORIZED_PATH,
    INVITED_MEMBER_PATHS, LOGIN_PATH, VERIFY_EMAIL_PATH, first_login_path, invited_member_may_visit, is_auth_path,
};
use crate::state::role::{CanonicalRole, is_invited_member, resolve_role};

/// Access rule attached to a route.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RouteRequirement {
    /// Empty means any authenticated user.
    pub allowed_roles: &'static [CanonicalRole],
    pub require_verification: bool,
}

impl RouteRequirement {
    pub const ANY_AUTHENTICATED: Self = Self { allowed_roles: &[], require_verification: false };

    pub const fn roles(allowed_roles: &'static [CanonicalRole]) -> Self {
        Self { allowed_roles, require_verification: false }
    }

    #[must_use]
    pub const fn verified(self) -> Self {
        Self { require_verification: true, ..self }
    }
}

/// Requested location, split the way the router reports it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RouteLocation {
    pub path: String,
    /// Without the leading `?`.
    pub query: String,
    /// Without the leading `#`.
    pub hash: String,
}

impl RouteLocation {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), ..Self::default() }
    }

    /// Split `path?query#hash`.
    pub fn parse(full: &str) -> Self {
        let (rest, hash) = full.split_once('#').unwrap_or((full, ""));
        let (path, query) = rest.split_once('?').unwrap_or((rest, ""));
        Self { path: path.to_owned(), query: query.to_owned(), hash: hash.to_owned() }
    }

    /// `path?query#hash`, omitting empty parts.
    pub fn full(&self) -> String {
        let mut full = self.path.clone();
        if !self.query.is_empty() {
            full.push('?');
            full.push_str(self.query.trim_start_matches('?'));
        }
        if !self.hash.is_empty() {
            full.push('#');
            full.push_str(self.hash.trim_start_matches('#'));
        }
        full
    }
}

/// What the guard can see of the auth state.
#[derive(Clone, Copy, Debug)]
pub struct AuthSnapshot<'a> {
    pub loading: bool,
    pub user: Option<&'a User>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DenyReason {
    Unauthenticated,
    Deactivated,
    FirstLoginPending,
    Unverified,
    Forbidden,
    OutsideInvitedScope,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Redirect {
    pub to: String,
    /// Location to come back to once the reason is resolved.
    pub return_to: Option<String>,
    pub reason: DenyReason,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    Loading,
    Allow,
    Redirect(Redirect),
}

impl GuardDecision {
    fn redirect(to: impl Into<String>, return_to: Option<String>, reason: DenyReason) -> Self {
        Self::Redirect(Redirect { to: to.into(), return_to, reason })
    }
}

/// Decide whether `location` may render under `requirement`.
pub fn authorize(snapshot: AuthSnapshot<'_>, location: &RouteLocation, requirement: RouteRequirement) -> GuardDecision {
    if snapshot.loading {
        return GuardDecision::Loading;
    }
    let Some(user) = snapshot.user else {
        return GuardDecision::redirect(LOGIN_PATH, Some(location.full()), DenyReason::Unauthenticated);
    };
    if !user.is_active {
        return GuardDecision::redirect(AUTH_UNAUTHORIZED_PATH, None, DenyReason::Deactivated);
    }

    let role = resolve_role(Some(user));
    if user.is_first_login && location.path != CLIENT_SUBSCRIPTION_PATH {
        return GuardDecision::redirect(first_login_path(), None, DenyReason::FirstLoginPending);
    }
    if requirement.require_verification && !user.is_verified {
        return GuardDecision::redirect(VERIFY_EMAIL_PATH, Some(location.full()), DenyReason::Unverified);
    }
    if !role.satisfies(requirement.allowed_roles) {
        return GuardDecision::redirect(forbidden_target(role, user), None, DenyReason::Forbidden);
    }
    GuardDecision::Allow
}

/// Landing page for a user denied by role.
pub fn forbidden_target(role: CanonicalRole, user: &User) -> String {
    if role.is_staff() {
        ADMIN_UNAUTHORIZED_PATH.to_owned()
    } else if user.tenant_id.is_none() {
        first_login_path()
    } else {
        CLIENT_UNAUTHORIZED_PATH.to_owned()
    }
}

/// Redirect for an invited member outside their allowed pages.
pub fn confine_invited_member(user: &User, path: &str) -> Option<Redirect> {
    if !is_invited_member(user) || invited_member_may_visit(path) {
        return None;
    }
    if user.is_first_login && path == CLIENT_SUBSCRIPTION_PATH {
        return None;
    }
    Some(Redirect {
        to: INVITED_MEMBER_PATHS[0].to_owned(),
        return_to: None,
        reason: DenyReason::OutsideInvitedScope,
    })
}

/// Whether `target` may be used as a post-login destination.
///
/// Only same-origin paths outside the auth pages qualify.
pub fn is_safe_return_to(target: &str) -> bool {
    let path = target.split(['?', '#']).next().unwrap_or(target);
    target.starts_with('/') && !target.starts_with("//") && !target.contains('\\') && !is_auth_path(path)
}
