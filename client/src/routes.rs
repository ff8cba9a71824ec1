//! Portal route table.
//!
//! SYSTEM CONTEXT
//! ==============
//! One table drives the router's guard requirements and the sidebar menus,
//! so a page's access rule and its menu entry cannot drift apart.

#[cfg(test)]
#[path = "routes_test.rs"]
mod routes_test;

use crate::state::role::CanonicalRole;
use crate::util::guard::RouteRequirement;
use crate::util::nav_menu::MenuKind;

pub const AUTH_PREFIX: &str = "/auth";
pub const LOGIN_PATH: &str = "/auth/login";
pub const REGISTER_PATH: &str = "/auth/register";
pub const AUTH_UNAUTHORIZED_PATH: &str = "/auth/unauthorized";
pub const VERIFY_EMAIL_PATH: &str = "/auth/verify-email";
pub const FORGOT_PASSWORD_PATH: &str = "/auth/forgot-password";
/// Followed by `/<uidb64>/<token>`.
pub const PASSWORD_RESET_PATH: &str = "/auth/password-reset";
/// Path of the link the backend mails, carrying `uid` and `token` as query.
pub const RESET_LINK_PATH: &str = "/reset-password-confirm";

pub const ADMIN_INDEX_PATH: &str = "/admin/index";
pub const ADMIN_UNAUTHORIZED_PATH: &str = "/admin/unauthorized";

pub const CLIENT_DASHBOARD_PATH: &str = "/client/dashboard";
pub const CLIENT_PROFILE_PATH: &str = "/client/profile";
pub const CLIENT_PROFILE_EDIT_PATH: &str = "/client/profile-edit";
pub const CLIENT_SOURCE_PATH: &str = "/client/source";
pub const CLIENT_DESTINATION_PATH: &str = "/client/destination";
pub const CLIENT_SUBSCRIPTION_PATH: &str = "/client/subscription";
pub const CLIENT_MANAGE_TEAM_PATH: &str = "/client/manage-team";
pub const CLIENT_UNAUTHORIZED_PATH: &str = "/client/unauthorized";

pub const FIRST_LOGIN_QUERY: &str = "firstLogin=true";

/// Client pages an invited member may open; the first is their landing page.
pub const INVITED_MEMBER_PATHS: [&str; 3] = [CLIENT_SOURCE_PATH, CLIENT_DESTINATION_PATH, CLIENT_PROFILE_PATH];

const STAFF: &[CanonicalRole] = &[CanonicalRole::Admin];
const CLIENTS: &[CanonicalRole] = &[CanonicalRole::Client];

const STAFF_ONLY: RouteRequirement = RouteRequirement::roles(STAFF);
const CLIENTS_ONLY: RouteRequirement = RouteRequirement::roles(CLIENTS);

const ALL_STAFF_MENUS: &[MenuKind] = &[MenuKind::Admin, MenuKind::Manager];
const ADMIN_MENU: &[MenuKind] = &[MenuKind::Admin];
const CLIENT_MENU: &[MenuKind] = &[MenuKind::Client];
const NO_MENU: &[MenuKind] = &[];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Section {
    Admin,
    Client,
}

/// One guarded page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PortalRoute {
    /// Path pattern; `:name` segments match any single segment.
    pub path: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub section: Section,
    pub requirement: RouteRequirement,
    /// Sidebar menus listing this page.
    pub menus: &'static [MenuKind],
}

const fn admin(path: &'static str, name: &'static str, icon: &'static str, menus: &'static [MenuKind]) -> PortalRoute {
    PortalRoute { path, name, icon, section: Section::Admin, requirement: STAFF_ONLY, menus }
}

const fn client(path: &'static str, name: &'static str, icon: &'static str, in_menu: bool) -> PortalRoute {
    let menus = if in_menu { CLIENT_MENU } else { NO_MENU };
    PortalRoute { path, name, icon, section: Section::Client, requirement: CLIENTS_ONLY, menus }
}

/// Every guarded page.
///
/// No entry requires a verified email: the gate is opt-in through
/// `RouteRequirement::verified` for pages that need it.
pub const ROUTES: &[PortalRoute] = &[
    admin(ADMIN_INDEX_PATH, "Dashboard", "ni ni-tv-2 text-primary", ALL_STAFF_MENUS),
    admin("/admin/profile", "My profile", "ni ni-single-02 text-orange", ALL_STAFF_MENUS),
    admin("/admin/profile-edit", "Edit profile", "ni ni-single-02 text-orange", NO_MENU),
    admin("/admin/clients", "Clients", "ni ni-single-02 text-blue", ALL_STAFF_MENUS),
    admin("/admin/subscriptions", "Subscriptions", "ni ni-credit-card text-green", ALL_STAFF_MENUS),
    admin("/admin/employees", "Employees", "ni ni-badge text-yellow", ADMIN_MENU),
    client(CLIENT_PROFILE_PATH, "My profile", "ni ni-single-02 text-orange", true),
    client(CLIENT_PROFILE_EDIT_PATH, "Edit profile", "ni ni-single-02 text-orange", false),
    client(CLIENT_SOURCE_PATH, "Source", "ni ni-folder-17 text-cyan", true),
    client("/client/assistant", "AI assistant", "ni ni-atom text-purple", true),
    client(CLIENT_DESTINATION_PATH, "Destination", "ni ni-key-25 text-success", true),
    client("/client/data-source", "Data source", "ni ni-cloud-upload-96 text-blue", true),
    client("/client/data-source/:id", "Data source details", "ni ni-cloud-upload-96 text-blue", false),
    client(CLIENT_SUBSCRIPTION_PATH, "Subscription", "ni ni-credit-card text-info", true),
    client(CLIENT_MANAGE_TEAM_PATH, "Manage team", "ni ni-settings-gear-65 text-purple", true),
];

/// Table entry for a concrete path (query and hash ignored).
pub fn route_for(path: &str) -> Option<&'static PortalRoute> {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    ROUTES.iter().find(|route| pattern_matches(route.path, path))
}

/// Requirement enforced for `path`; unknown paths fall back to their section.
///
/// The unauthorized pages and the subscription page (where first-login
/// onboarding sends every account) only need a signed-in user.
pub fn requirement_for(path: &str) -> RouteRequirement {
    if path == ADMIN_UNAUTHORIZED_PATH || path == CLIENT_UNAUTHORIZED_PATH || path == CLIENT_SUBSCRIPTION_PATH {
        return RouteRequirement::ANY_AUTHENTICATED;
    }
    if let Some(route) = route_for(path) {
        return route.requirement;
    }
    if path.starts_with("/admin/") { STAFF_ONLY } else { CLIENTS_ONLY }
}

/// Whether an invited member may open `path`.
pub fn invited_member_may_visit(path: &str) -> bool {
    INVITED_MEMBER_PATHS
        .iter()
        .any(|allowed| path == *allowed || path.strip_prefix(allowed).is_some_and(|rest| rest.starts_with('/')))
}

pub fn is_auth_path(path: &str) -> bool {
    path == AUTH_PREFIX || path.strip_prefix(AUTH_PREFIX).is_some_and(|rest| rest.starts_with('/'))
}

pub fn first_login_path() -> String {
    format!("{CLIENT_SUBSCRIPTION_PATH}?{FIRST_LOGIN_QUERY}")
}

fn pattern_matches(pattern: &str, path: &str) -> bool {
    let path = path.trim_end_matches('/');
    let mut pattern_segments = pattern.split('/');
    let mut path_segments = path.split('/');
    loop {
        match (pattern_segments.next(), path_segments.next()) {
            (None, None) => return true,
            (Some(expected), Some(actual)) => {
                let wildcard = expected.starts_with(':') && !actual.is_empty();
                if !wildcard && expected != actual {
                    return false;
                }
            }
            _ => return false,
        }
    }
}
