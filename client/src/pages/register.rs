//! Client self-registration.

use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

use crate::net::types::RegisterRequest;
use crate::routes::LOGIN_PATH;
use crate::state::auth::{MIN_PASSWORD_LEN, RegisterOutcome};
use crate::state::auth_context::use_auth;

#[component]
pub fn RegisterPage() -> impl IntoView {
    let auth = use_auth();
    let navigate = use_navigate();

    let first_name = RwSignal::new(String::new());
    let last_name = RwSignal::new(String::new());
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let password_confirm = RwSignal::new(String::new());
    let busy = RwSignal::new(false);
    let registered = RwSignal::new(false);

    auth.clear_error();

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get_untracked() {
            return;
        }
        busy.set(true);
        auth.clear_error();

        let request = RegisterRequest {
            email: email.get_untracked(),
            password: password.get_untracked(),
            password_confirm: password_confirm.get_untracked(),
            first_name: first_name.get_untracked(),
            last_name: last_name.get_untracked(),
        };
        let navigate = navigate.clone();
        leptos::task::spawn_local(async move {
            match auth.register(request).await {
                Ok(RegisterOutcome::SignedIn(outcome)) => {
                    navigate(&outcome.redirect_to, leptos_router::NavigateOptions::default());
                }
                Ok(RegisterOutcome::Registered) => {
                    registered.set(true);
                    busy.set(false);
                }
                Err(_) => busy.set(false),
            }
        });
    };

    let field = move |label: &'static str, kind: &'static str, value: RwSignal<String>| {
        view! {
            <label class="login-field">
                <span class="login-field__label">{label}</span>
                <input
                    class="login-input"
                    type=kind
                    prop:value=move || value.get()
                    on:input=move |ev| value.set(event_target_value(&ev))
                />
            </label>
        }
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"Create an account"</h1>
                <Show
                    when=move || registered.get()
                    fallback=move || {
                        view! {
                            <form class="login-form" on:submit=on_submit.clone()>
                                {field("First name", "text", first_name)}
                                {field("Last name", "text", last_name)}
                                {field("Email", "email", email)}
                                {field("Password", "password", password)}
                                {field("Confirm password", "password", password_confirm)}
                                <p class="login-hint">
                                    {format!("At least {MIN_PASSWORD_LEN} characters.")}
                                </p>
                                <button class="login-button" type="submit" disabled=move || busy.get()>
                                    "Create account"
                                </button>
                            </form>
                        }
                    }
                >
                    <p class="login-message">
                        "Your account has been created. Check your inbox to activate it, then sign in."
                    </p>
                </Show>
                {move || {
                    auth.state
                        .with(|state| state.error.clone())
                        .map(|message| {
                            view! { <p class="login-message login-message--error">{message}</p> }
                        })
                }}
                <p class="login-card__footer">
                    "Already registered? "
                    <a href=LOGIN_PATH>"Sign in"</a>
                </p>
            </div>
        </div>
    }
}
