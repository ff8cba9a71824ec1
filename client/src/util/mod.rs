//! Utility helpers shared across client UI modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Utility modules keep browser access and the pure authorization and menu
//! decisions out of page and component code, so they can be tested without
//! a DOM.

pub mod browser;
pub mod guard;
pub mod nav_menu;
