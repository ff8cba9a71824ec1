//! Section layouts: guard, chrome, and the routed page outlet.
//!
//! ARCHITECTURE
//! ============
//! The admin and client sections wrap their chrome in `RouteGuard`, so
//! nothing under them renders before the guard allows it. The client layout
//! additionally confines invited members to their allowed pages.

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::components::Outlet;
use leptos_router::hooks::{use_location, use_navigate};

use crate::components::navbar::Navbar;
use crate::components::notice_bar::NoticeBar;
use crate::components::route_guard::RouteGuard;
use crate::components::sidebar::Sidebar;
use crate::state::auth_context::use_auth;
use crate::util::guard::confine_invited_member;

#[component]
pub fn AdminLayout() -> impl IntoView {
    view! {
        <RouteGuard>
            <div class="portal portal--admin">
                <Sidebar/>
                <div class="portal__main">
                    <Navbar/>
                    <NoticeBar/>
                    <main class="portal__content">
                        <Outlet/>
                    </main>
                </div>
            </div>
        </RouteGuard>
    }
}

#[component]
pub fn ClientLayout() -> impl IntoView {
    let auth = use_auth();
    let location = use_location();
    let navigate = use_navigate();

    let confinement = Memo::new(move |_| {
        let path = location.pathname.get();
        auth.state
            .with(|state| state.user.as_ref().and_then(|user| confine_invited_member(user, &path)))
    });

    Effect::new(move || {
        if let Some(redirect) = confinement.get() {
            navigate(&redirect.to, NavigateOptions { replace: true, ..NavigateOptions::default() });
        }
    });

    view! {
        <RouteGuard>
            <div class="portal portal--client">
                <Sidebar/>
                <div class="portal__main">
                    <Navbar/>
                    <NoticeBar/>
                    <main class="portal__content">
                        <Show when=move || confinement.with(Option::is_none)>
                            <Outlet/>
                        </Show>
                    </main>
                </div>
            </div>
        </RouteGuard>
    }
}

/// Chrome-free layout for the sign-in pages.
#[component]
pub fn AuthLayout() -> impl IntoView {
    view! {
        <div class="auth-layout">
            <NoticeBar/>
            <main class="auth-layout__content">
                <Outlet/>
            </main>
        </div>
    }
}
