//! Rendering shell for route authorization.
//!
//! SYSTEM CONTEXT
//! ==============
//! Wraps a section of the app. Each navigation re-runs `authorize` for the
//! current location; a redirect decision records the return-to location on
//! the auth state and replaces the history entry.

use leptos::prelude::*;
use leptos::tachys::view::any_view::IntoAny;
use leptos_router::NavigateOptions;
use leptos_router::hooks::{use_location, use_navigate};

use crate::routes::requirement_for;
use crate::state::auth_context::use_auth;
use crate::util::guard::{GuardDecision, RouteLocation, RouteRequirement, authorize};

/// Render `children` only when the current user may see the current route.
///
/// Without an explicit `requirement`, the route table entry for the current
/// path applies.
#[component]
pub fn RouteGuard(#[prop(optional)] requirement: Option<RouteRequirement>, children: ChildrenFn) -> impl IntoView {
    let auth = use_auth();
    let location = use_location();
    let navigate = use_navigate();

    let decision = Memo::new(move |_| {
        let route = RouteLocation {
            path: location.pathname.get(),
            query: location.search.get().trim_start_matches('?').to_owned(),
            hash: location.hash.get().trim_start_matches('#').to_owned(),
        };
        let requirement = requirement.unwrap_or_else(|| requirement_for(&route.path));
        auth.state.with(|state| authorize(state.snapshot(), &route, requirement))
    });

    Effect::new(move || {
        if let GuardDecision::Redirect(redirect) = decision.get() {
            leptos::logging::log!("guard: {:?} -> {}", redirect.reason, redirect.to);
            auth.remember_return_to(redirect.return_to);
            navigate(&redirect.to, NavigateOptions { replace: true, ..NavigateOptions::default() });
        }
    });

    move || match decision.get() {
        GuardDecision::Allow => children().into_any(),
        GuardDecision::Loading => view! {
            <div class="route-guard route-guard--loading" role="status" aria-live="polite">
                "Loading..."
            </div>
        }
        .into_any(),
        GuardDecision::Redirect(_) => ().into_any(),
    }
}
