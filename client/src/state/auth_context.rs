//! Reactive auth context shared by every page.
//!
//! SYSTEM CONTEXT
//! ==============
//! `AuthProvider` builds the session store, HTTP client and auth service
//! once per app, exposes them through `AuthContext`, and keeps the
//! `RwSignal<AuthState>` in step with the session store.
//!
//! DESIGN
//! ======
//! - The signal is a read-through copy: every session change (same tab via
//!   store listeners, other tabs via the window `storage` event) reloads the
//!   user from the store.
//! - The restore runs in an effect, so the server render and the first
//!   hydrated render both see `loading = true` and agree.
//! - The service is `!Send`, so it lives in local storage behind a
//!   `StoredValue`; the context itself stays `Copy`.

use std::rc::Rc;

use leptos::prelude::*;

use crate::config::PortalConfig;
use crate::net::api::LoginPortal;
use crate::net::http::ApiClient;
use crate::net::transport::Transport;
use crate::net::types::{Credentials, Invitation, RegisterRequest};
use crate::state::auth::{AuthError, AuthService, AuthState, LoginOutcome, RegisterOutcome};
use crate::state::role::CanonicalRole;
use crate::state::session::SessionStore;
use crate::util::browser::{Notice, WindowBrowser};

/// Handle to the auth signal and the flows that update it.
#[derive(Clone, Copy)]
pub struct AuthContext {
    pub state: RwSignal<AuthState>,
    service: StoredValue<AuthService, LocalStorage>,
}

impl AuthContext {
    pub fn service(&self) -> AuthService {
        self.service.get_value()
    }

    pub fn api(&self) -> ApiClient {
        self.service.with_value(|service| service.api().clone())
    }

    /// Re-read the user from the session store and finish loading.
    pub fn reload(&self) {
        let user = self.service().restore();
        self.state.update(|state| {
            state.user = user;
            state.loading = false;
        });
    }

    pub fn has_role(&self, roles: &[CanonicalRole]) -> bool {
        self.state.with(|state| state.has_role(roles))
    }

    pub fn clear_error(&self) {
        if self.state.with_untracked(|state| state.error.is_some()) {
            self.state.update(|state| state.error = None);
        }
    }

    /// Remember where a guard turned the visitor away.
    pub fn remember_return_to(&self, target: Option<String>) {
        if target.is_some() {
            self.state.update(|state| state.return_to = target);
        }
    }

    /// # Errors
    ///
    /// Returns the flow's `AuthError`; its message is also stored on the state.
    pub async fn login(self, credentials: Credentials, portal: LoginPortal) -> Result<LoginOutcome, AuthError> {
        let return_to = self.state.with_untracked(|state| state.return_to.clone());
        let result = self.service().login(credentials, portal, return_to.as_deref()).await;
        self.settle(&result, true);
        result
    }

    /// # Errors
    ///
    /// Returns the flow's `AuthError`; its message is also stored on the state.
    pub async fn register(self, request: RegisterRequest) -> Result<RegisterOutcome, AuthError> {
        let result = self.service().register(request).await;
        self.settle(&result, matches!(result, Ok(RegisterOutcome::SignedIn(_))));
        result
    }

    /// # Errors
    ///
    /// Returns `AuthError::InvitationInvalid` for unusable tokens.
    pub async fn check_invitation(self, token: String) -> Result<Invitation, AuthError> {
        self.service().check_invitation(&token).await
    }

    /// # Errors
    ///
    /// Returns the flow's `AuthError`; its message is also stored on the state.
    pub async fn accept_invitation(
        self,
        token: String,
        password: String,
        confirm: String,
    ) -> Result<LoginOutcome, AuthError> {
        let result = self.service().accept_invitation(&token, &password, &confirm).await;
        self.settle(&result, true);
        result
    }

    /// # Errors
    ///
    /// Returns the flow's `AuthError`; its message is also stored on the state.
    pub async fn request_password_reset(self, email: String) -> Result<(), AuthError> {
        let result = self.service().request_password_reset(&email).await;
        self.settle(&result, false);
        result
    }

    /// # Errors
    ///
    /// Returns the flow's `AuthError`; its message is also stored on the state.
    pub async fn confirm_password_reset(
        self,
        uidb64: String,
        token: String,
        password: String,
        confirm: String,
    ) -> Result<(), AuthError> {
        let result = self.service().confirm_password_reset(&uidb64, &token, &password, &confirm).await;
        self.settle(&result, false);
        result
    }

    /// Sign out; returns the page to navigate to.
    pub fn logout(&self) -> &'static str {
        let next = self.service().logout();
        self.state.update(|state| {
            state.user = None;
            state.error = None;
            state.return_to = None;
        });
        next
    }

    fn settle<T>(&self, result: &Result<T, AuthError>, signed_in: bool) {
        let error = result.as_ref().err().map(ToString::to_string);
        let user = if signed_in && error.is_none() { self.service().restore() } else { None };
        self.state.update(|state| {
            state.error = error;
            if let Some(user) = user {
                state.user = Some(user);
                state.return_to = None;
            }
            state.loading = false;
        });
    }
}

/// Auth context of the current app.
pub fn use_auth() -> AuthContext {
    expect_context::<AuthContext>()
}

fn build_service(notice: RwSignal<Option<Notice>>) -> AuthService {
    let browser = WindowBrowser::new().with_notice_sink(move |n| notice.set(Some(n)));

    #[cfg(feature = "hydrate")]
    let (session, transport): (SessionStore, Rc<dyn Transport>) = (
        SessionStore::new(crate::state::storage::BrowserStorage),
        Rc::new(crate::net::transport::GlooTransport),
    );
    #[cfg(not(feature = "hydrate"))]
    let (session, transport): (SessionStore, Rc<dyn Transport>) =
        (SessionStore::in_memory(), Rc::new(crate::net::transport::OfflineTransport));

    let api = ApiClient::new(PortalConfig::from_build_env(), transport, Rc::new(session), Rc::new(browser));
    AuthService::new(api)
}

/// Provides `AuthContext`, `RwSignal<AuthState>` and the notice channel.
#[component]
pub fn AuthProvider(children: Children) -> impl IntoView {
    let state = RwSignal::new(AuthState::default());
    let notice = RwSignal::new(None::<Notice>);
    let auth = AuthContext { state, service: StoredValue::new_local(build_service(notice)) };

    provide_context(auth);
    provide_context(state);
    provide_context(notice);

    let subscription = auth.service.with_value(|service| service.session().subscribe(move || auth.reload()));
    on_cleanup(move || {
        auth.service.with_value(|service| service.session().unsubscribe(subscription));
    });

    #[cfg(feature = "hydrate")]
    {
        let handle = window_event_listener(leptos::ev::storage, move |_| auth.reload());
        on_cleanup(move || handle.remove());
    }

    Effect::new(move || auth.reload());

    children()
}
