//! Role-aware sidebar navigation.

use leptos::prelude::*;
use leptos_router::hooks::use_location;

use crate::state::auth::AuthState;
use crate::state::role::CanonicalRole;
use crate::util::nav_menu::{MenuKind, select_menu};

/// Sidebar for the current user. `force` pins a menu regardless of role.
#[component]
pub fn Sidebar(#[prop(optional)] force: Option<CanonicalRole>) -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let location = use_location();

    let menu = Memo::new(move |_| auth.with(|state| select_menu(force, state.user.as_ref())));

    move || {
        menu.get().map(|menu| {
            let title = match menu.kind {
                MenuKind::Admin => "Administration",
                MenuKind::Manager => "Management",
                MenuKind::Client => "My space",
            };
            let entries = menu
                .entries
                .into_iter()
                .map(|entry| {
                    let active = move || location.pathname.get() == entry.path;
                    let disabled = !entry.enabled;
                    view! {
                        <li class="sidebar__item">
                            <a
                                href=entry.path
                                class="sidebar__link"
                                class:sidebar__link--active=active
                                class:sidebar__link--disabled=disabled
                                aria-disabled=if disabled { "true" } else { "false" }
                                tabindex=if disabled { "-1" } else { "0" }
                                on:click=move |ev| {
                                    if disabled {
                                        ev.prevent_default();
                                    }
                                }
                            >
                                <i class=entry.icon></i>
                                <span>{entry.label}</span>
                            </a>
                        </li>
                    }
                })
                .collect_view();

            view! {
                <nav class="sidebar" aria-label=title>
                    <a class="sidebar__brand" href=menu.home>
                        "Portal"
                    </a>
                    <h6 class="sidebar__heading">{title}</h6>
                    <ul class="sidebar__nav">{entries}</ul>
                </nav>
            }
        })
    }
}
