//! Auth-session state and flows for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! `AuthState` is the reactive snapshot route guards and user-aware components
//! read. `AuthService` runs the flows that change it (login, registration,
//! invitation acceptance, password reset, logout) against the backend and the session store.
//! The Leptos wrapper in `auth_context` owns the signal; this module stays
//! framework-free so the flows are testable with scripted transports.
//!
//! ERROR HANDLING
//! ==============
//! Flows return `AuthError` whose `Display` text is ready for the form that
//! started the flow. A failed login clears any half-written session.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::rc::Rc;

use crate::net::api::{self, LoginPortal};
use crate::net::http::{ApiClient, ApiError};
use crate::net::types::{
    AuthGrant, Credentials, Invitation, RegisterRequest, User, error_body_field_lines, error_body_message,
};
use crate::routes::{
    ADMIN_INDEX_PATH, CLIENT_MANAGE_TEAM_PATH, CLIENT_PROFILE_PATH, INVITED_MEMBER_PATHS, LOGIN_PATH,
};
use crate::state::role::{CanonicalRole, is_invited_member, resolve_role};
use crate::state::session::{SessionError, SessionStore};
use crate::util::guard::{AuthSnapshot, is_safe_return_to};

pub const MIN_PASSWORD_LEN: usize = 8;

/// Authentication state tracking the current user and loading status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<User>,
    /// True until the stored session has been read once.
    pub loading: bool,
    /// Message from the last failed flow.
    pub error: Option<String>,
    /// Location a guard turned away, honored by the next login.
    pub return_to: Option<String>,
}

impl Default for AuthState {
    fn default() -> Self {
        Self { user: None, loading: true, error: None, return_to: None }
    }
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn role(&self) -> CanonicalRole {
        resolve_role(self.user.as_ref())
    }

    /// Whether a signed-in user satisfies `roles`, with the same manager
    /// inheritance the route guard applies.
    pub fn has_role(&self, roles: &[CanonicalRole]) -> bool {
        self.is_authenticated() && self.role().satisfies(roles)
    }

    pub fn is_invited_member(&self) -> bool {
        self.user.as_ref().is_some_and(is_invited_member)
    }

    pub fn snapshot(&self) -> AuthSnapshot<'_> {
        AuthSnapshot { loading: self.loading, user: self.user.as_ref() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),
    #[error("Invalid email or password.")]
    InvalidCredentials,
    #[error("{0}")]
    Forbidden(String),
    #[error("The server encountered an error. Please try again later.")]
    Server,
    #[error("Unable to reach the server. Check your connection.")]
    Network,
    #[error("The server response was incomplete. Please try again.")]
    IncompleteResponse,
    #[error("{0}")]
    InvitationInvalid(String),
    #[error("{0}")]
    ResetLinkInvalid(String),
    #[error("Your session could not be saved: {0}")]
    Session(#[from] SessionError),
}

/// Where a completed sign-in lands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoginOutcome {
    pub user: User,
    pub redirect_to: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// The backend issued tokens; the user is signed in.
    SignedIn(LoginOutcome),
    /// Account created; the user still has to log in.
    Registered,
}

/// Default page for `user` after sign-in.
pub fn landing_path(user: &User) -> &'static str {
    if resolve_role(Some(user)).is_staff() {
        ADMIN_INDEX_PATH
    } else if is_invited_member(user) {
        INVITED_MEMBER_PATHS[0]
    } else {
        CLIENT_PROFILE_PATH
    }
}

/// `return_to` when it is a safe internal path, else the role landing page.
pub fn post_login_path(user: &User, return_to: Option<&str>) -> String {
    match return_to {
        Some(target) if is_safe_return_to(target) => target.to_owned(),
        _ => landing_path(user).to_owned(),
    }
}

/// Client-side checks for a new password.
///
/// # Errors
///
/// Returns `AuthError::Validation` naming the first failed rule.
pub fn validate_new_password(password: &str, confirm: &str) -> Result<(), AuthError> {
    if password.is_empty() {
        return Err(AuthError::Validation("Password is required.".to_owned()));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters."
        )));
    }
    if password != confirm {
        return Err(AuthError::Validation("Passwords do not match.".to_owned()));
    }
    Ok(())
}

fn login_error(err: &ApiError) -> AuthError {
    match err {
        ApiError::Status { status: 400, body } => AuthError::Validation(
            error_body_message(body).unwrap_or_else(|| "Invalid login request.".to_owned()),
        ),
        ApiError::Status { status: 401, .. } => AuthError::InvalidCredentials,
        ApiError::Status { status: 403, body } => AuthError::Forbidden(
            error_body_message(body).unwrap_or_else(|| "Access denied for this account.".to_owned()),
        ),
        ApiError::Status { body, .. } => AuthError::Validation(
            error_body_message(body).unwrap_or_else(|| "Login failed. Please try again.".to_owned()),
        ),
        ApiError::Server { .. } => AuthError::Server,
        ApiError::Network(_) => AuthError::Network,
        ApiError::Encode(_) | ApiError::Decode(_) => AuthError::IncompleteResponse,
    }
}

fn register_error(err: &ApiError) -> AuthError {
    match err {
        ApiError::Status { body, .. } => AuthError::Validation(
            error_body_field_lines(body)
                .or_else(|| error_body_message(body))
                .unwrap_or_else(|| "Registration failed. Please check the form.".to_owned()),
        ),
        other => login_error(other),
    }
}

fn invitation_error(err: &ApiError) -> AuthError {
    match err {
        ApiError::Status { status: 400 | 404 | 410, body } => AuthError::InvitationInvalid(
            error_body_message(body).unwrap_or_else(|| "This invitation is invalid or has expired.".to_owned()),
        ),
        other => login_error(other),
    }
}

fn reset_link_error(err: &ApiError) -> AuthError {
    match err {
        ApiError::Status { status: 400 | 404, body } => AuthError::ResetLinkInvalid(
            error_body_message(body).unwrap_or_else(|| "This reset link is invalid or has expired.".to_owned()),
        ),
        other => login_error(other),
    }
}

/// Runs auth flows against the backend and the session store.
#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn session(&self) -> &Rc<SessionStore> {
        self.api.session()
    }

    /// User from the stored session, if any.
    pub fn restore(&self) -> Option<User> {
        self.session().load_user()
    }

    /// Sign in through `portal`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` for missing fields, rejected credentials, backend
    /// or network failure, or an unusable grant.
    pub async fn login(
        &self,
        credentials: Credentials,
        portal: LoginPortal,
        return_to: Option<&str>,
    ) -> Result<LoginOutcome, AuthError> {
        let email = credentials.email.trim().to_owned();
        if email.is_empty() || credentials.password.is_empty() {
            return Err(AuthError::Validation("Email and password are required.".to_owned()));
        }
        let credentials = Credentials { email, password: credentials.password };

        match api::login(&self.api, portal, &credentials).await {
            Ok(mut grant) => {
                if grant.user.user_type.is_none() {
                    grant.user.user_type = Some(portal.user_type().to_owned());
                }
                let user = self.establish(&grant)?;
                leptos::logging::log!("signed in as {} ({})", user.email, resolve_role(Some(&user)));
                let redirect_to = post_login_path(&user, return_to);
                Ok(LoginOutcome { user, redirect_to })
            }
            Err(err) => {
                leptos::logging::warn!("login failed: {err}");
                self.session().clear();
                Err(login_error(&err))
            }
        }
    }

    /// Install tokens obtained outside the login form.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Session` if the session cannot be stored.
    pub fn login_with_tokens(&self, access: &str, refresh: Option<&str>, user: User) -> Result<User, AuthError> {
        let grant = AuthGrant { access: access.to_owned(), refresh: refresh.map(str::to_owned), user };
        self.establish(&grant)
    }

    /// Create a client account, signing in when the backend returns tokens.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for form problems (client-side or the
    /// backend's per-field messages), or a transport-level `AuthError`.
    pub async fn register(&self, request: RegisterRequest) -> Result<RegisterOutcome, AuthError> {
        let request = RegisterRequest { email: request.email.trim().to_owned(), ..request };
        if request.email.is_empty() || request.first_name.trim().is_empty() || request.last_name.trim().is_empty() {
            return Err(AuthError::Validation("All fields are required.".to_owned()));
        }
        validate_new_password(&request.password, &request.password_confirm)?;

        let payload = api::register(&self.api, &request).await.map_err(|err| register_error(&err))?;
        let Ok(mut grant) = AuthGrant::from_payload(&payload) else {
            return Ok(RegisterOutcome::Registered);
        };
        if grant.user.user_type.is_none() {
            grant.user.user_type = Some(LoginPortal::Client.user_type().to_owned());
        }
        let user = self.establish(&grant)?;
        let redirect_to = landing_path(&user).to_owned();
        Ok(RegisterOutcome::SignedIn(LoginOutcome { user, redirect_to }))
    }

    /// Look up an invitation before showing the acceptance form.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvitationInvalid` for unknown, used or expired
    /// tokens.
    pub async fn check_invitation(&self, token: &str) -> Result<Invitation, AuthError> {
        if token.trim().is_empty() {
            return Err(AuthError::InvitationInvalid("Missing invitation token.".to_owned()));
        }
        let invitation = api::check_invitation(&self.api, token).await.map_err(|err| invitation_error(&err))?;
        if invitation.valid {
            Ok(invitation)
        } else {
            Err(AuthError::InvitationInvalid("This invitation is invalid or has expired.".to_owned()))
        }
    }

    /// Set the invited member's password and sign them in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for password rule failures, otherwise
    /// the backend's rejection mapped to `AuthError`.
    pub async fn accept_invitation(&self, token: &str, password: &str, confirm: &str) -> Result<LoginOutcome, AuthError> {
        validate_new_password(password, confirm)?;
        let grant = api::verify_invitation(&self.api, token, password)
            .await
            .map_err(|err| invitation_error(&err))?;
        let user = self.establish(&grant)?;
        let redirect_to = if is_invited_member(&user) { INVITED_MEMBER_PATHS[0] } else { CLIENT_MANAGE_TEAM_PATH };
        Ok(LoginOutcome { user, redirect_to: redirect_to.to_owned() })
    }

    /// Ask the backend to mail a reset link to `email`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for a blank or rejected address, or a
    /// transport-level `AuthError`.
    pub async fn request_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AuthError::Validation("Email is required.".to_owned()));
        }
        api::request_password_reset(&self.api, email).await.map_err(|err| {
            leptos::logging::warn!("password reset request failed: {err}");
            register_error(&err)
        })
    }

    /// Set a new password from an emailed reset link. Does not sign in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for password rule failures and
    /// `AuthError::ResetLinkInvalid` for a missing, used or expired link.
    pub async fn confirm_password_reset(
        &self,
        uidb64: &str,
        token: &str,
        password: &str,
        confirm: &str,
    ) -> Result<(), AuthError> {
        if uidb64.trim().is_empty() || token.trim().is_empty() {
            return Err(AuthError::ResetLinkInvalid("This reset link is incomplete.".to_owned()));
        }
        validate_new_password(password, confirm)?;
        api::confirm_password_reset(&self.api, uidb64, token, password)
            .await
            .map_err(|err| reset_link_error(&err))
    }

    /// Drop the session; returns the page to show next.
    pub fn logout(&self) -> &'static str {
        self.session().clear();
        LOGIN_PATH
    }

    fn establish(&self, grant: &AuthGrant) -> Result<User, AuthError> {
        let session = self.session();
        session.clear();
        session.save(&grant.access, grant.refresh.as_deref(), Some(&grant.user))?;
        Ok(grant.user.clone())
    }
}

