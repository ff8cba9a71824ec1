//! Frame for a section page, titled from the route table.

use leptos::prelude::*;
use leptos_meta::Title;
use leptos_router::hooks::use_location;

use crate::routes::route_for;

#[component]
pub fn SectionPage() -> impl IntoView {
    let location = use_location();
    let route = Memo::new(move |_| route_for(&location.pathname.get()).copied());

    let name = move || route.get().map_or("Portal", |route| route.name);
    let icon = move || route.get().map_or("", |route| route.icon);

    view! {
        <Title text=name/>
        <section class="section-page">
            <header class="section-page__header">
                <i class=icon></i>
                <h1>{name}</h1>
            </header>
            <div class="section-page__body"></div>
        </section>
    }
}
