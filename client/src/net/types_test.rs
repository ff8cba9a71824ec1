use super::*;
use serde_json::json;

// =============================================================
// User::from_wire
// =============================================================

#[test]
fn from_wire_reads_canonical_fields() {
    let user = User::from_wire(&json!({
        "id": "u1",
        "email": "a@b.com",
        "first_name": "Ada",
        "last_name": "Lovelace",
        "user_type": "client",
        "role": "owner",
        "is_superuser": false,
        "is_active": true,
        "is_first_login": true,
        "is_verified": true,
        "tenant_id": "t9",
    }))
    .unwrap();

    assert_eq!(user.id, "u1");
    assert_eq!(user.first_name, "Ada");
    assert_eq!(user.user_type.as_deref(), Some("client"));
    assert_eq!(user.role.as_deref(), Some("owner"));
    assert!(user.is_first_login);
    assert!(user.is_verified);
    assert_eq!(user.tenant_id.as_deref(), Some("t9"));
}

#[test]
fn from_wire_accepts_alternate_spellings() {
    let user = User::from_wire(&json!({
        "id": 42,
        "email": "x@y.fr",
        "prenom": "Jean",
        "lastName": "Dupont",
        "userType": "employee",
        "isSuperuser": true,
        "isFirstLogin": true,
        "tenant": { "id": 7 },
        "employee_id": 3,
    }))
    .unwrap();

    assert_eq!(user.id, "42");
    assert_eq!(user.first_name, "Jean");
    assert_eq!(user.last_name, "Dupont");
    assert_eq!(user.user_type.as_deref(), Some("employee"));
    assert!(user.is_superuser);
    assert!(user.is_first_login);
    assert_eq!(user.tenant_id.as_deref(), Some("7"));
    assert_eq!(user.employee_id.as_deref(), Some("3"));
}

#[test]
fn from_wire_defaults_active_when_absent() {
    let user = User::from_wire(&json!({ "id": "u1", "email": "a@b.com" })).unwrap();
    assert!(user.is_active);
    assert!(!user.is_superuser);
    assert!(user.role.is_none());
}

#[test]
fn from_wire_prefers_invited_role_client_over_plain_role() {
    let user = User::from_wire(&json!({
        "id": "u1",
        "email": "a@b.com",
        "role": "client",
        "role_client": "MEMBRE_INVITE",
    }))
    .unwrap();
    assert_eq!(user.role.as_deref(), Some("MEMBRE_INVITE"));
}

#[test]
fn from_wire_falls_back_to_role_client() {
    let user = User::from_wire(&json!({ "id": "u1", "email": "a@b.com", "role_client": "CLIENT" })).unwrap();
    assert_eq!(user.role.as_deref(), Some("CLIENT"));
}

#[test]
fn from_wire_rejects_missing_id_or_email() {
    assert_eq!(
        User::from_wire(&json!({ "email": "a@b.com" })),
        Err(UserShapeError::MissingField("id"))
    );
    assert_eq!(User::from_wire(&json!({ "id": "u1" })), Err(UserShapeError::MissingField("email")));
    assert_eq!(
        User::from_wire(&json!({ "id": "u1", "email": "  " })),
        Err(UserShapeError::MissingField("email"))
    );
    assert_eq!(User::from_wire(&json!("nope")), Err(UserShapeError::NotAnObject));
}

#[test]
fn serialized_user_normalizes_back_to_itself() {
    let mut user = User::new("u1", "a@b.com");
    user.first_name = "Ada".to_owned();
    user.role = Some("manager".to_owned());
    user.tenant_id = Some("t1".to_owned());
    user.is_active = false;

    let value = serde_json::to_value(&user).unwrap();
    assert_eq!(User::from_wire(&value).unwrap(), user);
}

#[test]
fn display_name_uses_full_name_or_email() {
    let mut user = User::new("u1", "a@b.com");
    assert_eq!(user.display_name(), "a@b.com");
    user.first_name = "Ada".to_owned();
    assert_eq!(user.display_name(), "a@b.com");
    user.last_name = "Lovelace".to_owned();
    assert_eq!(user.display_name(), "Ada Lovelace");
}

// =============================================================
// AuthGrant
// =============================================================

#[test]
fn grant_parses_tokens_and_user() {
    let grant = AuthGrant::from_payload(&json!({
        "access": "acc",
        "refresh": "ref",
        "user": { "id": "u1", "email": "a@b.com" },
    }))
    .unwrap();
    assert_eq!(grant.access, "acc");
    assert_eq!(grant.refresh.as_deref(), Some("ref"));
    assert_eq!(grant.user.id, "u1");
}

#[test]
fn grant_requires_access_and_user() {
    assert_eq!(
        AuthGrant::from_payload(&json!({ "user": { "id": "u1", "email": "a@b.com" } })),
        Err(GrantError::MissingAccess)
    );
    assert_eq!(AuthGrant::from_payload(&json!({ "access": "acc" })), Err(GrantError::MissingUser));
    assert_eq!(
        AuthGrant::from_payload(&json!({ "access": "acc", "user": { "id": "u1" } })),
        Err(GrantError::User(UserShapeError::MissingField("email")))
    );
}

// =============================================================
// Error bodies
// =============================================================

#[test]
fn error_body_message_prefers_non_field_errors() {
    let body = r#"{"non_field_errors":["Bad","credentials"],"detail":"ignored"}"#;
    assert_eq!(error_body_message(body).as_deref(), Some("Bad credentials"));
}

#[test]
fn error_body_message_reads_detail_then_error() {
    assert_eq!(error_body_message(r#"{"detail":"Nope"}"#).as_deref(), Some("Nope"));
    assert_eq!(error_body_message(r#"{"error":"Expired"}"#).as_deref(), Some("Expired"));
}

#[test]
fn error_body_message_falls_back_to_first_field() {
    assert_eq!(
        error_body_message(r#"{"email":["Enter a valid email."]}"#).as_deref(),
        Some("Enter a valid email.")
    );
    assert_eq!(error_body_message("not json"), None);
}

#[test]
fn error_body_field_lines_joins_each_field() {
    let body = r#"{"email":["taken"],"password":["too short","too common"]}"#;
    assert_eq!(
        error_body_field_lines(body).as_deref(),
        Some("email: taken\npassword: too short, too common")
    );
    assert_eq!(error_body_field_lines("{}"), None);
}
