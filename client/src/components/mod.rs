//! Reusable UI component modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Components render the portal chrome (layouts, sidebar, navbar, notices)
//! and the route guard shell, reading shared auth state from the
//! `AuthProvider` context.

pub mod layout;
pub mod navbar;
pub mod notice_bar;
pub mod route_guard;
pub mod sidebar;
