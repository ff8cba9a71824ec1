//! # portal-client
//!
//! Leptos + WASM frontend for the data-portal web app.
//!
//! This crate holds the session store, the authenticated HTTP client with
//! single-flight token refresh, role resolution, the route guard, the
//! role-aware navigation, and the pages and layouts built on them. The
//! `server` crate renders it through `leptos_axum`; the `hydrate` feature
//! builds the browser bundle.

pub mod app;
pub mod components;
pub mod config;
pub mod net;
pub mod pages;
pub mod routes;
pub mod state;
pub mod util;

#[cfg(test)]
mod test_support;

/// Browser entry point: attach to the server-rendered markup.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
    leptos::mount::hydrate_body(app::App);
}
