//! Backend endpoint configuration.
//!
//! The browser has no process environment, so the API base URL is fixed at
//! build time from `PORTAL_API_BASE_URL` and falls back to the local backend.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Backend endpoint paths, relative to the API base URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    pub client_login: String,
    pub employee_login: String,
    pub token: String,
    pub token_refresh: String,
    pub client_register: String,
    pub check_invitation: String,
    pub verify_invitation: String,
    pub password_reset: String,
    pub password_reset_confirm: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            client_login: "/client/login/".to_owned(),
            employee_login: "/employee/login/".to_owned(),
            token: "/token/".to_owned(),
            token_refresh: "/token/refresh/".to_owned(),
            client_register: "/auth/client/register/".to_owned(),
            check_invitation: "/api/team/check-invitation/".to_owned(),
            verify_invitation: "/api/team/verify-invitation/".to_owned(),
            password_reset: "/password-reset/".to_owned(),
            password_reset_confirm: "/password-reset-confirm/".to_owned(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PortalConfig {
    pub api_base_url: String,
    pub endpoints: Endpoints,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self::with_base_url(DEFAULT_API_BASE_URL)
    }
}

impl PortalConfig {
    /// Config from the build environment (`PORTAL_API_BASE_URL`).
    pub fn from_build_env() -> Self {
        Self::with_base_url(option_env!("PORTAL_API_BASE_URL").unwrap_or(DEFAULT_API_BASE_URL))
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self { api_base_url: normalize_base_url(base_url), endpoints: Endpoints::default() }
    }

    /// Endpoints that answer 401 as part of their normal contract.
    ///
    /// A 401 from one of these is a credential error, not an expired session,
    /// and must never trigger a token refresh.
    pub fn public_paths(&self) -> [&str; 9] {
        let e = &self.endpoints;
        [
            &e.client_login,
            &e.employee_login,
            &e.token,
            &e.token_refresh,
            &e.client_register,
            &e.check_invitation,
            &e.verify_invitation,
            &e.password_reset,
            &e.password_reset_confirm,
        ]
    }

    pub fn is_public_path(&self, path: &str) -> bool {
        let path = path.split(['?', '#']).next().unwrap_or(path);
        self.public_paths().iter().any(|public| path.starts_with(public))
    }

    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_owned();
        }
        if path.starts_with('/') {
            format!("{}{path}", self.api_base_url)
        } else {
            format!("{}/{path}", self.api_base_url)
        }
    }
}

fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() { DEFAULT_API_BASE_URL.to_owned() } else { trimmed.to_owned() }
}
