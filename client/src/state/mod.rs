//! Client-side application state.
//!
//! SYSTEM CONTEXT
//! ==============
//! `session` persists tokens and the user record, `role` derives the
//! canonical role, `auth` runs the sign-in flows, and `auth_context` exposes
//! all of it to components as Leptos context.

pub mod auth;
pub mod auth_context;
pub mod role;
pub mod session;
pub mod storage;
