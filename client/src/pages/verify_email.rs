//! Reminder shown when a page requires a verified email address.

use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

use crate::state::auth_context::use_auth;

#[component]
pub fn VerifyEmailPage() -> impl IntoView {
    let auth = use_auth();
    let navigate = use_navigate();

    let email = move || auth.state.with(|state| state.user.as_ref().map(|user| user.email.clone()));

    let on_sign_out = move |_| {
        let next = auth.logout();
        navigate(next, leptos_router::NavigateOptions { replace: true, ..Default::default() });
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"Verify your email"</h1>
                <p class="login-message">
                    {move || match email() {
                        Some(address) => format!("We sent a verification link to {address}."),
                        None => "We sent you a verification link.".to_owned(),
                    }}
                </p>
                <p class="login-hint">"Open the link, then sign in again to continue."</p>
                <button class="login-button" on:click=on_sign_out>
                    "Back to sign in"
                </button>
            </div>
        </div>
    }
}
