//! Persisted authentication session.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session store is the single source of truth for tokens and the cached
//! user record. The auth context and HTTP client both read through it; neither
//! keeps a second copy beyond one render.
//!
//! DESIGN
//! ======
//! - A session is an access token plus a user record. A token without a
//!   parseable user (or the reverse) reads as "no session".
//! - Writes are validated up front and rolled back if the backend rejects one
//!   of them, so the stored record never ends up partially updated.
//! - Legacy `token` / `refresh` keys are read once, migrated to the canonical
//!   keys and deleted.
//! - Every mutation refreshes the default `Authorization` header value and
//!   notifies same-tab listeners.
//! - `remember_me` is a login-form preference, not session data: `clear`
//!   leaves it so the next login form starts with the user's last choice.
//! - The access token only changes in place while a user is stored; a
//!   refresh landing after `clear` cannot bring the session back.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde_json::Value;

use crate::net::types::User;
use crate::state::storage::{MemoryStorage, SessionStorage, StorageError};

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const USER_KEY: &str = "user";
pub const REMEMBER_ME_KEY: &str = "remember_me";

// TODO: drop the legacy fallback once stored sessions from the `token`/`refresh` era have expired.
const LEGACY_ACCESS_TOKEN_KEY: &str = "token";
const LEGACY_REFRESH_TOKEN_KEY: &str = "refresh";

/// Snapshot of the stored session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    refresh_token: Option<String>,
    pub user: User,
    /// UI-only hint for the login form.
    pub remember_me: bool,
}

impl Session {
    pub(crate) fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }
}

/// Session write failures.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("access token is empty")]
    EmptyAccessToken,
    #[error("no session to update")]
    NoSession,
    #[error("user record could not be serialized: {0}")]
    Serialize(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Handle returned by [`SessionStore::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Listener = Rc<dyn Fn()>;

/// Session persistence over an injected [`SessionStorage`].
pub struct SessionStore {
    storage: Box<dyn SessionStorage>,
    authorization: RefCell<Option<String>>,
    listeners: RefCell<Vec<(SubscriptionId, Listener)>>,
    next_listener: Cell<u64>,
}

impl SessionStore {
    pub fn new(storage: impl SessionStorage + 'static) -> Self {
        Self {
            storage: Box::new(storage),
            authorization: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
            next_listener: Cell::new(0),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::new())
    }

    /// Persist the access token and any provided optional fields.
    ///
    /// Unset optional fields keep their stored value.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` for an empty token, an unserializable user, or a
    /// rejected write. On error the store is left unchanged.
    pub fn save(&self, access: &str, refresh: Option<&str>, user: Option<&User>) -> Result<(), SessionError> {
        if access.trim().is_empty() {
            return Err(SessionError::EmptyAccessToken);
        }
        let user_json = user
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| SessionError::Serialize(e.to_string()))?;

        let mut writes = vec![(ACCESS_TOKEN_KEY, access.to_owned())];
        if let Some(refresh) = refresh.filter(|r| !r.is_empty()) {
            writes.push((REFRESH_TOKEN_KEY, refresh.to_owned()));
        }
        if let Some(json) = user_json {
            writes.push((USER_KEY, json));
        }
        self.write_all(&writes)?;

        self.storage.remove(LEGACY_ACCESS_TOKEN_KEY);
        self.storage.remove(LEGACY_REFRESH_TOKEN_KEY);
        let has_user = self.storage.get(USER_KEY).is_some();
        self.set_authorization(has_user.then_some(access));
        self.notify();
        Ok(())
    }

    /// Replace only the access token after a silent refresh.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoSession` when no user is stored, so a late
    /// refresh cannot revive a cleared session. Otherwise as `save`.
    pub(crate) fn update_access_token(&self, access: &str) -> Result<(), SessionError> {
        if self.storage.get(USER_KEY).is_none() {
            return Err(SessionError::NoSession);
        }
        self.save(access, None, None)
    }

    pub fn set_remember_me(&self, remember: bool) {
        if remember {
            let _ = self.storage.set(REMEMBER_ME_KEY, "true");
        } else {
            self.storage.remove(REMEMBER_ME_KEY);
        }
    }

    pub fn remember_me(&self) -> bool {
        self.storage.get(REMEMBER_ME_KEY).as_deref() == Some("true")
    }

    /// Current user, or `None` when there is no valid session.
    ///
    /// A stored record that fails to parse is logged, cleared, and reported
    /// as no session.
    pub fn load_user(&self) -> Option<User> {
        let Some(token) = self.access_token() else {
            self.set_authorization(None);
            return None;
        };
        let Some(raw) = self.storage.get(USER_KEY) else {
            self.set_authorization(None);
            return None;
        };

        let parsed = serde_json::from_str::<Value>(&raw)
            .map_err(|e| e.to_string())
            .and_then(|value| User::from_wire(&value).map_err(|e| e.to_string()));
        match parsed {
            Ok(user) => {
                self.set_authorization(Some(&token));
                Some(user)
            }
            Err(reason) => {
                leptos::logging::warn!("discarding corrupt session record: {reason}");
                self.clear();
                None
            }
        }
    }

    /// Whole stored session, if valid.
    pub fn load_session(&self) -> Option<Session> {
        let user = self.load_user()?;
        let access_token = self.access_token()?;
        Some(Session {
            access_token,
            refresh_token: self.refresh_token(),
            user,
            remember_me: self.remember_me(),
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.load_user().is_some()
    }

    /// Remove every session key. Safe to call on an empty store.
    pub fn clear(&self) {
        for key in [
            ACCESS_TOKEN_KEY,
            REFRESH_TOKEN_KEY,
            USER_KEY,
            LEGACY_ACCESS_TOKEN_KEY,
            LEGACY_REFRESH_TOKEN_KEY,
        ] {
            self.storage.remove(key);
        }
        self.set_authorization(None);
        self.notify();
    }

    /// `Bearer <token>` for outgoing requests, if a token and a user are stored.
    pub fn authorization_header(&self) -> Option<String> {
        if let Some(header) = self.authorization.borrow().clone() {
            return Some(header);
        }
        self.storage.get(USER_KEY)?;
        let token = self.access_token()?;
        self.set_authorization(Some(&token));
        self.authorization.borrow().clone()
    }

    pub(crate) fn refresh_token(&self) -> Option<String> {
        self.read_migrating(REFRESH_TOKEN_KEY, LEGACY_REFRESH_TOKEN_KEY)
    }

    /// Register a same-tab change listener.
    pub fn subscribe(&self, listener: impl Fn() + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_listener.get());
        self.next_listener.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners.borrow_mut().retain(|(existing, _)| *existing != id);
    }

    fn access_token(&self) -> Option<String> {
        self.read_migrating(ACCESS_TOKEN_KEY, LEGACY_ACCESS_TOKEN_KEY)
    }

    fn read_migrating(&self, key: &str, legacy_key: &str) -> Option<String> {
        if let Some(value) = self.storage.get(key).filter(|v| !v.is_empty()) {
            if self.storage.get(legacy_key).is_some() {
                self.storage.remove(legacy_key);
            }
            return Some(value);
        }
        let value = self.storage.get(legacy_key).filter(|v| !v.is_empty())?;
        if self.storage.set(key, &value).is_ok() {
            self.storage.remove(legacy_key);
        }
        Some(value)
    }

    fn write_all(&self, writes: &[(&'static str, String)]) -> Result<(), SessionError> {
        let previous = writes
            .iter()
            .map(|(key, _)| (*key, self.storage.get(key)))
            .collect::<Vec<_>>();

        for (key, value) in writes {
            if let Err(err) = self.storage.set(key, value) {
                for (key, value) in &previous {
                    match value {
                        Some(value) => {
                            let _ = self.storage.set(key, value);
                        }
                        None => self.storage.remove(key),
                    }
                }
                return Err(err.into());
            }
        }
        Ok(())
    }

    fn set_authorization(&self, token: Option<&str>) {
        *self.authorization.borrow_mut() = token.map(|t| format!("Bearer {t}"));
    }

    fn notify(&self) {
        let listeners = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect::<Vec<_>>();
        for listener in listeners {
            listener();
        }
    }
}
