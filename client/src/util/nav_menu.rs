//! Sidebar menu selection.
//!
//! SYSTEM CONTEXT
//! ==============
//! The sidebar shows one of three menus built from the route table. Invited
//! members get the client menu with every entry outside their allowed pages
//! greyed out rather than removed, so they can see what the account offers.

#[cfg(test)]
#[path = "nav_menu_test.rs"]
mod nav_menu_test;

use crate::net::types::User;
use crate::routes::{ADMIN_INDEX_PATH, CLIENT_PROFILE_PATH, INVITED_MEMBER_PATHS, ROUTES, invited_member_may_visit};
use crate::state::role::{CanonicalRole, is_invited_member, resolve_role};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MenuKind {
    Admin,
    Manager,
    Client,
}

impl MenuKind {
    pub fn for_role(role: CanonicalRole) -> Self {
        match role {
            CanonicalRole::Admin => Self::Admin,
            CanonicalRole::Manager => Self::Manager,
            CanonicalRole::Client | CanonicalRole::Guest => Self::Client,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuEntry {
    pub path: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
    /// Disabled entries render greyed out and ignore clicks.
    pub enabled: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavMenu {
    pub kind: MenuKind,
    /// Brand link target.
    pub home: &'static str,
    pub entries: Vec<MenuEntry>,
}

/// Menu for `user`, or `None` when nobody is signed in.
///
/// `role_override` forces a menu regardless of the resolved role.
pub fn select_menu(role_override: Option<CanonicalRole>, user: Option<&User>) -> Option<NavMenu> {
    let user = user?;
    let kind = MenuKind::for_role(role_override.unwrap_or_else(|| resolve_role(Some(user))));
    let invited = kind == MenuKind::Client && is_invited_member(user);

    let entries = ROUTES
        .iter()
        .filter(|route| route.menus.contains(&kind))
        .map(|route| MenuEntry {
            path: route.path,
            label: route.name,
            icon: route.icon,
            enabled: !invited || invited_member_may_visit(route.path),
        })
        .collect();

    let home = match kind {
        MenuKind::Admin | MenuKind::Manager => ADMIN_INDEX_PATH,
        MenuKind::Client if invited => INVITED_MEMBER_PATHS[0],
        MenuKind::Client => CLIENT_PROFILE_PATH,
    };
    Some(NavMenu { kind, home, entries })
}
