//! Transient notice banner fed by the HTTP client's error channel.

use leptos::prelude::*;

use crate::util::browser::{Notice, NoticeLevel};

#[cfg(feature = "hydrate")]
const DISMISS_AFTER: std::time::Duration = std::time::Duration::from_secs(6);

#[component]
pub fn NoticeBar() -> impl IntoView {
    let notice = expect_context::<RwSignal<Option<Notice>>>();

    #[cfg(feature = "hydrate")]
    Effect::new(move || {
        if let Some(current) = notice.get() {
            leptos::task::spawn_local(async move {
                gloo_timers::future::sleep(DISMISS_AFTER).await;
                // A newer notice keeps its own timer.
                if notice.get_untracked().as_ref() == Some(&current) {
                    notice.set(None);
                }
            });
        }
    });

    move || {
        notice.get().map(|current| {
            let class = match current.level {
                NoticeLevel::Error => "notice notice--error",
                NoticeLevel::Info => "notice notice--info",
            };
            view! {
                <div class=class role="alert">
                    <span class="notice__message">{current.message}</span>
                    <button class="notice__close" aria-label="Dismiss" on:click=move |_| notice.set(None)>
                        "×"
                    </button>
                </div>
            }
        })
    }
}
