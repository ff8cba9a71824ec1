//! Portal backend endpoints.
//!
//! Thin typed wrappers over `ApiClient`: each builds the request for one
//! endpoint and decodes its success payload. Error interpretation is left to
//! the auth flows that call them.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use serde_json::Value;

use super::http::{ApiClient, ApiError, ApiRequest};
use super::types::{
    AuthGrant, Credentials, Invitation, PasswordResetConfirmRequest, PasswordResetRequest, RegisterRequest,
    VerifyInvitationRequest,
};
use crate::config::Endpoints;

/// Which login endpoint a credential pair is sent to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoginPortal {
    #[default]
    Client,
    Employee,
}

impl LoginPortal {
    /// `user_type` recorded when the backend user omits it.
    pub fn user_type(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Employee => "employee",
        }
    }

    fn endpoint(self, endpoints: &Endpoints) -> &str {
        match self {
            Self::Client => &endpoints.client_login,
            Self::Employee => &endpoints.employee_login,
        }
    }
}

fn invitation_path(base: &str, token: &str) -> String {
    let base = base.trim_end_matches('/');
    let token = token.trim().trim_matches('/');
    format!("{base}/{token}/")
}

fn reset_confirm_path(base: &str, uidb64: &str, token: &str) -> String {
    invitation_path(&invitation_path(base, uidb64), token)
}

fn grant(value: &Value) -> Result<AuthGrant, ApiError> {
    AuthGrant::from_payload(value).map_err(|e| ApiError::Decode(e.to_string()))
}

/// `POST /client/login/` or `/employee/login/`.
///
/// # Errors
///
/// Returns `ApiError` for rejected credentials, transport failures, or a
/// response missing the tokens or user.
pub async fn login(client: &ApiClient, portal: LoginPortal, credentials: &Credentials) -> Result<AuthGrant, ApiError> {
    let path = portal.endpoint(&client.config().endpoints).to_owned();
    let value: Value = client.send_json(ApiRequest::post(path, credentials)?).await?;
    grant(&value)
}

/// `POST /auth/client/register/`. The payload may carry tokens.
///
/// # Errors
///
/// Returns `ApiError`; a 400 body holds per-field messages.
pub async fn register(client: &ApiClient, request: &RegisterRequest) -> Result<Value, ApiError> {
    let path = client.config().endpoints.client_register.clone();
    let response = client.send(ApiRequest::post(path, request)?).await?;
    if response.body.trim().is_empty() {
        return Ok(Value::Null);
    }
    response.json().map_err(|e| ApiError::Decode(e.to_string()))
}

/// `GET /api/team/check-invitation/<token>/`.
///
/// # Errors
///
/// Returns `ApiError`; unknown or expired tokens answer 404/400/410.
pub async fn check_invitation(client: &ApiClient, token: &str) -> Result<Invitation, ApiError> {
    let path = invitation_path(&client.config().endpoints.check_invitation, token);
    client.send_json(ApiRequest::get(path)).await
}

/// `POST /api/team/verify-invitation/<token>/` with the new password.
///
/// # Errors
///
/// Returns `ApiError` for a rejected token or password, or an incomplete
/// grant.
pub async fn verify_invitation(client: &ApiClient, token: &str, password: &str) -> Result<AuthGrant, ApiError> {
    let path = invitation_path(&client.config().endpoints.verify_invitation, token);
    let request = ApiRequest::post(path, &VerifyInvitationRequest { password })?;
    let value: Value = client.send_json(request).await?;
    grant(&value)
}

/// `POST /password-reset/`: the backend mails a reset link to `email`.
///
/// # Errors
///
/// Returns `ApiError`; a 400 body explains a rejected address.
pub async fn request_password_reset(client: &ApiClient, email: &str) -> Result<(), ApiError> {
    let path = client.config().endpoints.password_reset.clone();
    client.send(ApiRequest::post(path, &PasswordResetRequest { email })?).await?;
    Ok(())
}

/// `POST /password-reset-confirm/<uidb64>/<token>/` with the new password.
///
/// # Errors
///
/// Returns `ApiError`; an invalid or expired link answers 400.
pub async fn confirm_password_reset(
    client: &ApiClient,
    uidb64: &str,
    token: &str,
    new_password: &str,
) -> Result<(), ApiError> {
    let path = reset_confirm_path(&client.config().endpoints.password_reset_confirm, uidb64, token);
    client.send(ApiRequest::post(path, &PasswordResetConfirmRequest { new_password })?).await?;
    Ok(())
}
