//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Auth pages render standalone under `AuthLayout`; section pages render
//! inside the guarded admin and client layouts.

pub mod accept_invitation;
pub mod login;
pub mod password_reset;
pub mod register;
pub mod section;
pub mod unauthorized;
pub mod verify_email;
