//! Access-denied screens for the auth, admin and client sections.

use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

use crate::routes::LOGIN_PATH;
use crate::state::auth::landing_path;
use crate::state::auth_context::use_auth;

/// Shown under `/admin/unauthorized` and `/client/unauthorized`.
#[component]
pub fn UnauthorizedPage() -> impl IntoView {
    let auth = use_auth();
    let home = move || auth.state.with(|state| state.user.as_ref().map_or(LOGIN_PATH, landing_path));

    view! {
        <section class="unauthorized">
            <h1>"Access denied"</h1>
            <p>"Your account does not have permission to open this page."</p>
            <a class="btn" href=home>"Back to my space"</a>
        </section>
    }
}

/// Shown under `/auth/unauthorized`, where deactivated accounts land.
#[component]
pub fn AccountDisabledPage() -> impl IntoView {
    let auth = use_auth();
    let navigate = use_navigate();

    let on_sign_out = move |_| {
        let next = auth.logout();
        navigate(next, leptos_router::NavigateOptions { replace: true, ..Default::default() });
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"Account unavailable"</h1>
                <p class="login-message">
                    "This account has been deactivated. Contact your administrator to restore access."
                </p>
                <button class="login-button" on:click=on_sign_out>
                    "Sign out"
                </button>
            </div>
        </div>
    }
}
