//! Networking modules for the portal REST backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! `transport` performs raw requests, `http` layers bearer auth and token
//! refresh on top, `api` wraps individual endpoints, and `types` defines the
//! wire schema plus the one user-normalization step.

pub mod api;
pub mod http;
pub mod transport;
pub mod types;
