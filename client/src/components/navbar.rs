//! Top bar with the signed-in user's name and account actions.

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

use crate::routes::CLIENT_PROFILE_EDIT_PATH;
use crate::state::auth_context::use_auth;

const ADMIN_PROFILE_EDIT_PATH: &str = "/admin/profile-edit";

#[component]
pub fn Navbar() -> impl IntoView {
    let auth = use_auth();
    let navigate = use_navigate();

    let display_name = move || auth.state.with(|state| state.user.as_ref().map(|user| user.display_name()));
    let edit_locked = move || auth.state.with(|state| state.is_invited_member());
    let edit_href = move || {
        if auth.state.with(|state| state.role().is_staff()) {
            ADMIN_PROFILE_EDIT_PATH
        } else {
            CLIENT_PROFILE_EDIT_PATH
        }
    };

    let on_logout = move |_| {
        let next = auth.logout();
        navigate(next, NavigateOptions { replace: true, ..NavigateOptions::default() });
    };

    view! {
        <header class="navbar">
            <span class="navbar__spacer"></span>
            <Show when=move || display_name().is_some()>
                <span class="navbar__user">{move || display_name().unwrap_or_default()}</span>
                <a
                    class="navbar__action"
                    class:navbar__action--disabled=edit_locked
                    href=edit_href
                    aria-disabled=move || if edit_locked() { "true" } else { "false" }
                    title=move || if edit_locked() { "Not available for invited members" } else { "Edit profile" }
                    on:click=move |ev| {
                        if edit_locked() {
                            ev.prevent_default();
                        }
                    }
                >
                    "Edit profile"
                </a>
                <button class="btn navbar__logout" on:click=on_logout.clone()>
                    "Logout"
                </button>
            </Show>
        </header>
    }
}
