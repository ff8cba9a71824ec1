//! Wire DTOs for the portal backend and the canonical `User` shape.
//!
//! DESIGN
//! ======
//! The backend emits user records with inconsistent spellings (`first_name`,
//! `prenom`, `firstName`; numeric or string ids; nested `tenant` objects).
//! `User::from_wire` is the single normalization point at the ingestion
//! boundary. Nothing downstream of it checks alternate field names.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::state::role::INVITED_MEMBER_ROLE;

/// Canonical authenticated principal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Backend identifier, always carried as a string.
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    /// Raw backend category (`"client"`, `"employee"`, ...).
    #[serde(default)]
    pub user_type: Option<String>,
    /// Raw backend role string; free-form and possibly inconsistent with `user_type`.
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Set until the user has picked a subscription.
    #[serde(default)]
    pub is_first_login: bool,
    #[serde(default)]
    pub is_verified: bool,
    /// Present once the user belongs to an established tenant.
    #[serde(default)]
    pub tenant_id: Option<String>,
    /// Legacy employee marker kept for role resolution of old payloads.
    #[serde(default)]
    pub employee_id: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Reasons a wire record cannot become a `User`.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum UserShapeError {
    #[error("user record is not a JSON object")]
    NotAnObject,
    #[error("user record is missing `{0}`")]
    MissingField(&'static str),
}

impl User {
    /// Minimal active user with no role signals.
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            first_name: String::new(),
            last_name: String::new(),
            user_type: None,
            role: None,
            is_superuser: false,
            is_active: true,
            is_first_login: false,
            is_verified: false,
            tenant_id: None,
            employee_id: None,
        }
    }

    /// Normalize a backend (or previously stored) user record.
    ///
    /// # Errors
    ///
    /// Returns `UserShapeError` when the value is not an object or lacks a
    /// non-empty `id` or `email`.
    pub fn from_wire(value: &Value) -> Result<Self, UserShapeError> {
        let Value::Object(map) = value else {
            return Err(UserShapeError::NotAnObject);
        };

        let id = scalar_field(map, &["id", "user_id", "pk"])
            .filter(|id| !id.is_empty())
            .ok_or(UserShapeError::MissingField("id"))?;
        let email = text_field(map, &["email"])
            .filter(|email| !email.trim().is_empty())
            .ok_or(UserShapeError::MissingField("email"))?;

        let tenant_id = scalar_field(map, &["tenant_id", "tenantId"]).or_else(|| {
            map.get("tenant")
                .and_then(Value::as_object)
                .and_then(|tenant| scalar_field(tenant, &["id"]))
        });

        // `role_client` marks invited members on some client payloads even
        // when `role` still says "client".
        let role = match (text_field(map, &["role"]), text_field(map, &["role_client"])) {
            (_, Some(role_client)) if role_client.eq_ignore_ascii_case(INVITED_MEMBER_ROLE) => Some(role_client),
            (Some(role), _) => Some(role),
            (None, role_client) => role_client,
        };

        Ok(Self {
            id,
            email,
            first_name: text_field(map, &["first_name", "firstName", "prenom"]).unwrap_or_default(),
            last_name: text_field(map, &["last_name", "lastName", "nom"]).unwrap_or_default(),
            user_type: text_field(map, &["user_type", "userType"]),
            role,
            is_superuser: flag_field(map, &["is_superuser", "isSuperuser"]).unwrap_or(false),
            is_active: flag_field(map, &["is_active", "isActive"]).unwrap_or(true),
            is_first_login: flag_field(map, &["is_first_login", "isFirstLogin"]).unwrap_or(false),
            is_verified: flag_field(map, &["is_verified", "isVerified"]).unwrap_or(false),
            tenant_id,
            employee_id: scalar_field(map, &["employee_id", "employeeId"]),
        })
    }

    /// "First Last" when both names are known, else the email.
    pub fn display_name(&self) -> String {
        let first = self.first_name.trim();
        let last = self.last_name.trim();
        if !first.is_empty() && !last.is_empty() {
            format!("{first} {last}")
        } else {
            self.email.clone()
        }
    }
}

fn text_field(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| map.get(*key).and_then(Value::as_str))
        .map(str::to_owned)
}

fn scalar_field(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match map.get(*key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn flag_field(map: &Map<String, Value>, keys: &[&str]) -> Option<bool> {
    keys.iter().find_map(|key| map.get(*key).and_then(Value::as_bool))
}

/// Login request body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Body of `POST /token/refresh/`.
#[derive(Clone, Debug, Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

/// Successful refresh response.
#[derive(Clone, Debug, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
}

/// Tokens + user returned by login and invitation verification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthGrant {
    pub access: String,
    pub refresh: Option<String>,
    pub user: User,
}

/// Reasons a grant payload is unusable.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GrantError {
    #[error("response has no access token")]
    MissingAccess,
    #[error("response has no user")]
    MissingUser,
    #[error("invalid user record: {0}")]
    User(#[from] UserShapeError),
}

impl AuthGrant {
    /// Parse `{ access, refresh, user }`.
    ///
    /// # Errors
    ///
    /// Returns `GrantError` when the access token or user is missing, or the
    /// user record fails normalization.
    pub fn from_payload(value: &Value) -> Result<Self, GrantError> {
        let access = value
            .get("access")
            .and_then(Value::as_str)
            .filter(|access| !access.is_empty())
            .ok_or(GrantError::MissingAccess)?
            .to_owned();
        let refresh = value
            .get("refresh")
            .and_then(Value::as_str)
            .filter(|refresh| !refresh.is_empty())
            .map(str::to_owned);
        let user = match value.get("user") {
            None | Some(Value::Null) => return Err(GrantError::MissingUser),
            Some(user) => User::from_wire(user)?,
        };
        Ok(Self { access, refresh, user })
    }
}

/// Client self-registration request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub first_name: String,
    pub last_name: String,
}

/// Invitation metadata from `GET /api/team/check-invitation/<token>/`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Invitation {
    #[serde(default)]
    pub valid: bool,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub tenant_name: Option<String>,
}

/// Body of `POST /api/team/verify-invitation/<token>/`.
#[derive(Clone, Debug, Serialize)]
pub struct VerifyInvitationRequest<'a> {
    pub password: &'a str,
}

/// Body of `POST /password-reset/`.
#[derive(Clone, Debug, Serialize)]
pub struct PasswordResetRequest<'a> {
    pub email: &'a str,
}

/// Body of `POST /password-reset-confirm/<uidb64>/<token>/`.
#[derive(Clone, Debug, Serialize)]
pub struct PasswordResetConfirmRequest<'a> {
    pub new_password: &'a str,
}

/// Extract a single human-readable message from a DRF-style error body.
///
/// Order: `non_field_errors` (joined), `detail`, `error`, then the first
/// field's first message.
pub fn error_body_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let map = value.as_object()?;

    if let Some(messages) = map.get("non_field_errors").and_then(Value::as_array) {
        let joined = messages.iter().filter_map(Value::as_str).collect::<Vec<_>>().join(" ");
        if !joined.is_empty() {
            return Some(joined);
        }
    }
    for key in ["detail", "error"] {
        if let Some(message) = map.get(key).and_then(Value::as_str) {
            return Some(message.to_owned());
        }
    }
    map.values().find_map(|field| match field {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => items.first().and_then(Value::as_str).map(str::to_owned),
        _ => None,
    })
}

/// Flatten every field error as `field: a, b`, one line per field.
pub fn error_body_field_lines(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let map = value.as_object()?;
    let lines = map
        .iter()
        .filter_map(|(field, errors)| {
            let text = match errors {
                Value::String(s) => s.clone(),
                Value::Array(items) => items.iter().filter_map(Value::as_str).collect::<Vec<_>>().join(", "),
                _ => return None,
            };
            Some(format!("{field}: {text}"))
        })
        .collect::<Vec<_>>();
    if lines.is_empty() { None } else { Some(lines.join("\n")) }
}
