//! Authenticated HTTP client for the portal backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every backend call goes through `ApiClient::send`. It attaches the stored
//! bearer token, recovers from an expired access token with one silent
//! refresh, and surfaces server and network failures as notices.
//!
//! DESIGN
//! ======
//! - A 401 from a public endpoint (login, register, refresh, invitations) is
//!   returned to the caller untouched.
//! - Any other 401 runs the refresh exchange, then replays the request once.
//!   The replay's outcome is final.
//! - Concurrent 401s share one in-flight refresh: the first caller starts it,
//!   later callers await the same `Shared` future.
//! - When the refresh fails, the session is cleared and the page is sent to
//!   the login screen, unless it is already under `/auth`.
//!
//! ERROR HANDLING
//! ==============
//! 5xx and unreachable-server failures post a notice before the error is
//! returned; 4xx errors are left to the caller.

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;

use std::cell::RefCell;
use std::rc::Rc;

use futures::FutureExt;
use futures::future::{LocalBoxFuture, Shared};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::PortalConfig;
use crate::net::transport::{HttpRequest, HttpResponse, Method, Transport};
use crate::net::types::{RefreshRequest, RefreshResponse};
use crate::routes::{LOGIN_PATH, is_auth_path};
use crate::state::session::SessionStore;
use crate::util::browser::{Browser, Notice};

pub const SERVER_ERROR_MESSAGE: &str = "The server encountered an error. Please try again later.";
pub const UNREACHABLE_MESSAGE: &str = "Unable to reach the server. Check your connection.";

/// Request relative to the API base URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<String>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self { method: Method::Get, path: path.into(), body: None }
    }

    /// # Errors
    ///
    /// Returns `ApiError::Encode` if `body` cannot be serialized.
    pub fn post<B: Serialize>(path: impl Into<String>, body: &B) -> Result<Self, ApiError> {
        let body = serde_json::to_string(body).map_err(|e| ApiError::Encode(e.to_string()))?;
        Ok(Self { method: Method::Post, path: path.into(), body: Some(body) })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("request failed with status {status}")]
    Status { status: u16, body: String },
    #[error("server error ({status})")]
    Server { status: u16 },
    #[error("network error: {0}")]
    Network(String),
    #[error("could not encode request: {0}")]
    Encode(String),
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } | Self::Server { status } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Parsed JSON error body, when the backend sent one.
    pub fn body_json(&self) -> Option<serde_json::Value> {
        match self {
            Self::Status { body, .. } => serde_json::from_str(body).ok(),
            _ => None,
        }
    }
}

/// Why the silent token refresh could not produce a new access token.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RefreshError {
    #[error("no refresh token stored")]
    MissingToken,
    #[error("refresh rejected with status {0}")]
    Rejected(u16),
    #[error("refresh response unusable: {0}")]
    Malformed(String),
    #[error("refresh request failed: {0}")]
    Transport(String),
    #[error("refreshed token could not be stored: {0}")]
    Session(String),
    #[error("session ended while the refresh was in flight")]
    SessionEnded,
}

type SharedRefresh = Shared<LocalBoxFuture<'static, Result<String, RefreshError>>>;

struct Inner {
    config: PortalConfig,
    transport: Rc<dyn Transport>,
    session: Rc<SessionStore>,
    browser: Rc<dyn Browser>,
    refresh_in_flight: RefCell<Option<SharedRefresh>>,
}

/// Cheap-to-clone handle; clones share the session and the in-flight refresh.
#[derive(Clone)]
pub struct ApiClient {
    inner: Rc<Inner>,
}

impl ApiClient {
    pub fn new(
        config: PortalConfig,
        transport: Rc<dyn Transport>,
        session: Rc<SessionStore>,
        browser: Rc<dyn Browser>,
    ) -> Self {
        Self {
            inner: Rc::new(Inner { config, transport, session, browser, refresh_in_flight: RefCell::new(None) }),
        }
    }

    pub fn config(&self) -> &PortalConfig {
        &self.inner.config
    }

    pub fn session(&self) -> &Rc<SessionStore> {
        &self.inner.session
    }

    /// Send `request`, refreshing and replaying once on an expired token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for any non-2xx outcome or transport failure.
    pub async fn send(&self, request: ApiRequest) -> Result<HttpResponse, ApiError> {
        let (response, sent_with) = self.dispatch(&request).await?;
        if response.status != 401 || self.inner.config.is_public_path(&request.path) {
            return self.settle(response);
        }

        // Another caller may have refreshed while this request was in flight.
        let current = self.inner.session.authorization_header();
        let refreshed = if current.is_some() && current != sent_with {
            Ok(())
        } else {
            self.refresh_access_token().await.map(|_| ())
        };

        match refreshed {
            Ok(()) => {
                let (replay, _) = self.dispatch(&request).await?;
                self.settle(replay)
            }
            Err(err) => {
                leptos::logging::warn!("session refresh failed: {err}");
                self.inner.session.clear();
                if !is_auth_path(&self.inner.browser.location_path()) {
                    self.inner.browser.hard_redirect(LOGIN_PATH);
                }
                self.settle(response)
            }
        }
    }

    /// `send` and decode a JSON body.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Decode` when the body does not decode as `T`.
    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let response = self.send(request).await?;
        response.json().map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Exchange the stored refresh token for a new access token.
    ///
    /// At most one exchange runs at a time; concurrent callers get the
    /// outcome of the one already in flight.
    ///
    /// # Errors
    ///
    /// Returns `RefreshError` if no new token could be obtained and stored.
    pub async fn refresh_access_token(&self) -> Result<String, RefreshError> {
        let refresh = {
            let mut slot = self.inner.refresh_in_flight.borrow_mut();
            if let Some(in_flight) = slot.as_ref() {
                in_flight.clone()
            } else {
                let fresh = run_refresh(
                    Rc::clone(&self.inner.transport),
                    Rc::clone(&self.inner.session),
                    self.inner.config.url(&self.inner.config.endpoints.token_refresh),
                )
                .boxed_local()
                .shared();
                *slot = Some(fresh.clone());
                fresh
            }
        };

        let outcome = refresh.clone().await;
        let mut slot = self.inner.refresh_in_flight.borrow_mut();
        if slot.as_ref().is_some_and(|current| current.ptr_eq(&refresh)) {
            *slot = None;
        }
        outcome
    }

    async fn dispatch(&self, request: &ApiRequest) -> Result<(HttpResponse, Option<String>), ApiError> {
        let mut headers = json_headers(request.body.is_some());
        let authorization = self.inner.session.authorization_header();
        if let Some(value) = &authorization {
            headers.push(("Authorization".to_owned(), value.clone()));
        }
        let http = HttpRequest {
            method: request.method,
            url: self.inner.config.url(&request.path),
            headers,
            body: request.body.clone(),
        };

        match self.inner.transport.send(http).await {
            Ok(response) => Ok((response, authorization)),
            Err(err) => {
                self.inner.browser.notify(Notice::error(UNREACHABLE_MESSAGE));
                Err(ApiError::Network(err.to_string()))
            }
        }
    }

    fn settle(&self, response: HttpResponse) -> Result<HttpResponse, ApiError> {
        match response.status {
            200..=299 => Ok(response),
            status @ 500.. => {
                self.inner.browser.notify(Notice::error(SERVER_ERROR_MESSAGE));
                Err(ApiError::Server { status })
            }
            status => Err(ApiError::Status { status, body: response.body }),
        }
    }
}

async fn run_refresh(
    transport: Rc<dyn Transport>,
    session: Rc<SessionStore>,
    url: String,
) -> Result<String, RefreshError> {
    let refresh = session.refresh_token().ok_or(RefreshError::MissingToken)?;
    let body = serde_json::to_string(&RefreshRequest { refresh: &refresh })
        .map_err(|e| RefreshError::Malformed(e.to_string()))?;
    let request = HttpRequest { method: Method::Post, url, headers: json_headers(true), body: Some(body) };

    let response = transport
        .send(request)
        .await
        .map_err(|e| RefreshError::Transport(e.to_string()))?;
    if !response.is_success() {
        return Err(RefreshError::Rejected(response.status));
    }
    let parsed: RefreshResponse = response.json().map_err(|e| RefreshError::Malformed(e.to_string()))?;

    // Logout or another failed refresh may have cleared the store meanwhile.
    if session.refresh_token().as_deref() != Some(refresh.as_str()) || session.load_user().is_none() {
        return Err(RefreshError::SessionEnded);
    }
    session
        .update_access_token(&parsed.access)
        .map_err(|e| RefreshError::Session(e.to_string()))?;
    leptos::logging::log!("access token refreshed");
    Ok(parsed.access)
}

fn json_headers(with_body: bool) -> Vec<(String, String)> {
    let mut headers = vec![("Accept".to_owned(), "application/json".to_owned())];
    if with_body {
        headers.push(("Content-Type".to_owned(), "application/json".to_owned()));
    }
    headers
}
