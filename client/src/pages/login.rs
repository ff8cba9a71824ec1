//! Login page for clients and employees.
//!
//! DESIGN
//! ======
//! The page only collects input; trimming, validation and error wording live
//! in the auth service so every sign-in path reports failures the same way.
//! The portal toggle picks which backend login endpoint is used.

#[cfg(test)]
#[path = "login_test.rs"]
mod login_test;

use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

use crate::net::api::LoginPortal;
use crate::net::types::Credentials;
use crate::routes::{FORGOT_PASSWORD_PATH, REGISTER_PATH};
use crate::state::auth_context::use_auth;

fn portal_label(portal: LoginPortal) -> &'static str {
    match portal {
        LoginPortal::Client => "Client",
        LoginPortal::Employee => "Employee",
    }
}

fn submit_label(busy: bool) -> &'static str {
    if busy { "Signing in..." } else { "Sign in" }
}

/// Sign-up is only offered to clients; employee accounts are provisioned.
fn offers_registration(portal: LoginPortal) -> bool {
    portal == LoginPortal::Client
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let auth = use_auth();
    let navigate = use_navigate();

    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let portal = RwSignal::new(LoginPortal::default());
    let remember = RwSignal::new(auth.service().session().remember_me());
    let busy = RwSignal::new(false);

    auth.clear_error();

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get_untracked() {
            return;
        }
        busy.set(true);
        auth.clear_error();
        auth.service().session().set_remember_me(remember.get_untracked());

        let credentials = Credentials { email: email.get_untracked(), password: password.get_untracked() };
        let selected = portal.get_untracked();
        let navigate = navigate.clone();
        leptos::task::spawn_local(async move {
            match auth.login(credentials, selected).await {
                Ok(outcome) => navigate(&outcome.redirect_to, leptos_router::NavigateOptions::default()),
                Err(_) => {
                    password.set(String::new());
                    busy.set(false);
                }
            }
        });
    };

    let portal_button = move |choice: LoginPortal| {
        view! {
            <button
                type="button"
                class="login-portal__option"
                class:login-portal__option--active=move || portal.get() == choice
                aria-pressed=move || if portal.get() == choice { "true" } else { "false" }
                on:click=move |_| portal.set(choice)
            >
                {portal_label(choice)}
            </button>
        }
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"Sign in"</h1>
                <div class="login-portal" role="group" aria-label="Account type">
                    {portal_button(LoginPortal::Client)}
                    {portal_button(LoginPortal::Employee)}
                </div>
                <form class="login-form" on:submit=on_submit>
                    <input
                        class="login-input"
                        type="email"
                        autocomplete="username"
                        placeholder="you@example.com"
                        prop:value=move || email.get()
                        on:input=move |ev| email.set(event_target_value(&ev))
                    />
                    <input
                        class="login-input"
                        type="password"
                        autocomplete="current-password"
                        placeholder="Password"
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                    <label class="login-remember">
                        <input
                            type="checkbox"
                            prop:checked=move || remember.get()
                            on:change=move |ev| remember.set(event_target_checked(&ev))
                        />
                        "Remember me"
                    </label>
                    <button class="login-button" type="submit" disabled=move || busy.get()>
                        {move || submit_label(busy.get())}
                    </button>
                </form>
                {move || {
                    auth.state
                        .with(|state| state.error.clone())
                        .map(|message| view! { <p class="login-message login-message--error">{message}</p> })
                }}
                <p class="login-card__footer">
                    <a href=FORGOT_PASSWORD_PATH>"Forgot password?"</a>
                </p>
                <Show when=move || offers_registration(portal.get())>
                    <p class="login-card__footer">
                        "No account yet? "
                        <a href=REGISTER_PATH>"Create one"</a>
                    </p>
                </Show>
            </div>
        </div>
    }
}
