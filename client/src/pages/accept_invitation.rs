//! Invitation acceptance: check the token, then set a password.
//!
//! SYSTEM CONTEXT
//! ==============
//! Reached from the invitation email at `/auth/activation/:token`. The token
//! is checked once the page hydrates; only a valid invitation shows the
//! password form. A successful acceptance signs the member in.

#[cfg(test)]
#[path = "accept_invitation_test.rs"]
mod accept_invitation_test;

use leptos::prelude::*;
use leptos::tachys::view::any_view::IntoAny;
use leptos_router::hooks::{use_navigate, use_params_map};

use crate::net::types::Invitation;
use crate::routes::LOGIN_PATH;
use crate::state::auth::MIN_PASSWORD_LEN;
use crate::state::auth_context::use_auth;

#[derive(Clone, Debug, PartialEq, Eq)]
enum InvitationStatus {
    Checking,
    Valid(Invitation),
    Invalid(String),
}

fn invitation_heading(invitation: &Invitation) -> String {
    match invitation.tenant_name.as_deref().filter(|name| !name.is_empty()) {
        Some(tenant) => format!("Join {tenant}"),
        None => "Join your team".to_owned(),
    }
}

fn invitation_subtitle(invitation: &Invitation) -> Option<String> {
    invitation
        .email
        .as_deref()
        .filter(|email| !email.is_empty())
        .map(|email| format!("Choose a password for {email}."))
}

#[component]
pub fn AcceptInvitationPage() -> impl IntoView {
    let auth = use_auth();
    let navigate = use_navigate();
    let params = use_params_map();
    let token = move || params.with(|params| params.get("token").unwrap_or_default());

    let status = RwSignal::new(InvitationStatus::Checking);
    let password = RwSignal::new(String::new());
    let confirm = RwSignal::new(String::new());
    let busy = RwSignal::new(false);

    auth.clear_error();

    Effect::new(move || {
        let token = token();
        status.set(InvitationStatus::Checking);
        leptos::task::spawn_local(async move {
            let next = match auth.check_invitation(token).await {
                Ok(invitation) => InvitationStatus::Valid(invitation),
                Err(err) => InvitationStatus::Invalid(err.to_string()),
            };
            status.set(next);
        });
    });

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get_untracked() {
            return;
        }
        busy.set(true);
        auth.clear_error();

        let navigate = navigate.clone();
        let (token, password, confirm) = (token(), password.get_untracked(), confirm.get_untracked());
        leptos::task::spawn_local(async move {
            match auth.accept_invitation(token, password, confirm).await {
                Ok(outcome) => navigate(&outcome.redirect_to, leptos_router::NavigateOptions::default()),
                Err(_) => busy.set(false),
            }
        });
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                {move || match status.get() {
                    InvitationStatus::Checking => {
                        view! { <p class="login-message" role="status">"Checking your invitation..."</p> }.into_any()
                    }
                    InvitationStatus::Invalid(message) => {
                        view! {
                            <h1>"Invitation unavailable"</h1>
                            <p class="login-message login-message--error">{message}</p>
                            <a class="login-button" href=LOGIN_PATH>"Go to sign in"</a>
                        }
                            .into_any()
                    }
                    InvitationStatus::Valid(invitation) => {
                        view! {
                            <h1>{invitation_heading(&invitation)}</h1>
                            <p class="login-card__subtitle">{invitation_subtitle(&invitation)}</p>
                            <form class="login-form" on:submit=on_submit.clone()>
                                <input
                                    class="login-input"
                                    type="password"
                                    autocomplete="new-password"
                                    placeholder="Password"
                                    prop:value=move || password.get()
                                    on:input=move |ev| password.set(event_target_value(&ev))
                                />
                                <input
                                    class="login-input"
                                    type="password"
                                    autocomplete="new-password"
                                    placeholder="Confirm password"
                                    prop:value=move || confirm.get()
                                    on:input=move |ev| confirm.set(event_target_value(&ev))
                                />
                                <p class="login-hint">{format!("At least {MIN_PASSWORD_LEN} characters.")}</p>
                                <button class="login-button" type="submit" disabled=move || busy.get()>
                                    "Accept invitation"
                                </button>
                            </form>
                        }
                            .into_any()
                    }
                }}
                {move || {
                    auth.state
                        .with(|state| state.error.clone())
                        .map(|message| {
                            view! { <p class="login-message login-message--error">{message}</p> }
                        })
                }}
            </div>
        </div>
    }
}
