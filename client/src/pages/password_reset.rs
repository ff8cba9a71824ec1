//! Forgotten-password flow: request a reset email, then set a new password.
//!
//! SYSTEM CONTEXT
//! ==============
//! The backend mails a link to `/reset-password-confirm?uid=..&token=..`.
//! `ResetLinkRedirect` turns it into `/auth/password-reset/:uidb64/:token`,
//! where `ResetPasswordPage` collects the new password. A reset never signs
//! the user in; they land on the login page with a notice.

#[cfg(test)]
#[path = "password_reset_test.rs"]
mod password_reset_test;

use leptos::prelude::*;
use leptos_router::components::Redirect;
use leptos_router::hooks::{use_navigate, use_params_map, use_query_map};

use crate::routes::{FORGOT_PASSWORD_PATH, LOGIN_PATH, PASSWORD_RESET_PATH};
use crate::state::auth::MIN_PASSWORD_LEN;
use crate::state::auth_context::use_auth;
use crate::util::browser::Notice;

const RESET_DONE: &str = "Your password has been reset. You can now sign in.";
const RESET_SENT: &str = "If an account exists for this address, a reset link is on its way.";

fn is_link_segment(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '='))
}

/// Reset page for the mailed link's `uid` and `token`, if both are usable.
fn reset_link_target(uid: Option<&str>, token: Option<&str>) -> Option<String> {
    let uid = uid.map(str::trim).filter(|uid| is_link_segment(uid))?;
    let token = token.map(str::trim).filter(|token| is_link_segment(token))?;
    Some(format!("{PASSWORD_RESET_PATH}/{uid}/{token}"))
}

fn reset_done_notice() -> Notice {
    Notice::info(RESET_DONE)
}

#[component]
pub fn ForgotPasswordPage() -> impl IntoView {
    let auth = use_auth();

    let email = RwSignal::new(String::new());
    let busy = RwSignal::new(false);
    let sent = RwSignal::new(false);

    auth.clear_error();

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get_untracked() {
            return;
        }
        busy.set(true);
        auth.clear_error();

        let email = email.get_untracked();
        leptos::task::spawn_local(async move {
            let done = auth.request_password_reset(email).await.is_ok();
            sent.set(done);
            busy.set(false);
        });
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"Forgot password"</h1>
                <Show
                    when=move || sent.get()
                    fallback=move || {
                        view! {
                            <form class="login-form" on:submit=on_submit>
                                <input
                                    class="login-input"
                                    type="email"
                                    autocomplete="email"
                                    placeholder="you@example.com"
                                    prop:value=move || email.get()
                                    on:input=move |ev| email.set(event_target_value(&ev))
                                />
                                <button class="login-button" type="submit" disabled=move || busy.get()>
                                    "Send reset link"
                                </button>
                            </form>
                        }
                    }
                >
                    <p class="login-message" role="status">{RESET_SENT}</p>
                </Show>
                {move || {
                    auth.state
                        .with(|state| state.error.clone())
                        .map(|message| view! { <p class="login-message login-message--error">{message}</p> })
                }}
                <p class="login-card__footer">
                    <a href=LOGIN_PATH>"Back to sign in"</a>
                </p>
            </div>
        </div>
    }
}

#[component]
pub fn ResetPasswordPage() -> impl IntoView {
    let auth = use_auth();
    let navigate = use_navigate();
    let notice = expect_context::<RwSignal<Option<Notice>>>();
    let params = use_params_map();
    let param = move |name: &str| params.with_untracked(|params| params.get(name).unwrap_or_default());

    let password = RwSignal::new(String::new());
    let confirm = RwSignal::new(String::new());
    let busy = RwSignal::new(false);

    auth.clear_error();

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get_untracked() {
            return;
        }
        busy.set(true);
        auth.clear_error();

        let navigate = navigate.clone();
        let (uidb64, token) = (param("uidb64"), param("token"));
        let (password, confirm) = (password.get_untracked(), confirm.get_untracked());
        leptos::task::spawn_local(async move {
            match auth.confirm_password_reset(uidb64, token, password, confirm).await {
                Ok(()) => {
                    notice.set(Some(reset_done_notice()));
                    navigate(LOGIN_PATH, leptos_router::NavigateOptions::default());
                }
                Err(_) => busy.set(false),
            }
        });
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"Choose a new password"</h1>
                <form class="login-form" on:submit=on_submit>
                    <input
                        class="login-input"
                        type="password"
                        autocomplete="new-password"
                        placeholder="New password"
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
                        "Reset password"
                    </button>
                </form>
                {move || {
                    auth.state
                        .with(|state| state.error.clone())
                        .map(|message| view! { <p class="login-message login-message--error">{message}</p> })
                }}
                <p class="login-card__footer">
                    <a href=FORGOT_PASSWORD_PATH>"Request a new link"</a>
                </p>
            </div>
        </div>
    }
}

/// Entry point for the mailed link; unusable links restart the flow.
#[component]
pub fn ResetLinkRedirect() -> impl IntoView {
    let query = use_query_map();
    let target = query.with_untracked(|query| {
        reset_link_target(query.get("uid").as_deref(), query.get("token").as_deref())
    });
    let path = target.unwrap_or_else(|| FORGOT_PASSWORD_PATH.to_owned());
    view! { <Redirect path/> }
}
