use super::*;

fn user_with(role: Option<&str>, user_type: Option<&str>) -> User {
    let mut user = User::new("u1", "a@b.com");
    user.role = role.map(str::to_owned);
    user.user_type = user_type.map(str::to_owned);
    user
}

// =============================================================
// resolve_role
// =============================================================

#[test]
fn no_user_is_guest() {
    assert_eq!(resolve_role(None), CanonicalRole::Guest);
}

#[test]
fn superuser_overrides_any_role() {
    let mut user = user_with(Some("client"), Some("client"));
    user.is_superuser = true;
    assert_eq!(resolve_role(Some(&user)), CanonicalRole::Admin);
}

#[test]
fn admin_role_strings_are_case_insensitive() {
    for role in ["admin", "ADMIN", "Administrateur"] {
        assert_eq!(resolve_role(Some(&user_with(Some(role), None))), CanonicalRole::Admin, "{role}");
    }
}

#[test]
fn manager_and_gestionnaire_resolve_to_manager() {
    for role in ["manager", "Gestionnaire"] {
        assert_eq!(resolve_role(Some(&user_with(Some(role), None))), CanonicalRole::Manager, "{role}");
    }
}

#[test]
fn employee_user_type_beats_client_role() {
    let user = user_with(Some("client"), Some("employee"));
    assert_eq!(resolve_role(Some(&user)), CanonicalRole::Manager);
}

#[test]
fn employee_role_collapses_into_manager() {
    assert_eq!(resolve_role(Some(&user_with(Some("employee"), None))), CanonicalRole::Manager);
    assert_eq!(resolve_role(Some(&user_with(Some("EMPLOYÉ"), None))), CanonicalRole::Manager);
}

#[test]
fn client_family_roles_resolve_to_client() {
    for role in ["client", "Owner", "MEMBRE_INVITE"] {
        assert_eq!(resolve_role(Some(&user_with(Some(role), None))), CanonicalRole::Client, "{role}");
    }
    assert_eq!(resolve_role(Some(&user_with(None, Some("client")))), CanonicalRole::Client);
}

#[test]
fn client_user_type_does_not_override_manager_role() {
    let user = user_with(Some("manager"), Some("client"));
    assert_eq!(resolve_role(Some(&user)), CanonicalRole::Manager);
}

#[test]
fn legacy_employee_id_without_role_is_manager() {
    let mut user = user_with(None, None);
    user.employee_id = Some("17".to_owned());
    assert_eq!(resolve_role(Some(&user)), CanonicalRole::Manager);
}

#[test]
fn legacy_employee_id_loses_to_client_role() {
    let mut user = user_with(Some("owner"), None);
    user.employee_id = Some("17".to_owned());
    assert_eq!(resolve_role(Some(&user)), CanonicalRole::Client);
}

#[test]
fn unknown_signals_default_to_client() {
    assert_eq!(resolve_role(Some(&user_with(Some("auditor"), Some("partner")))), CanonicalRole::Client);
    assert_eq!(resolve_role(Some(&user_with(None, None))), CanonicalRole::Client);
}

#[test]
fn every_combination_resolves_to_a_defined_role() {
    let roles = [None, Some(""), Some("admin"), Some("employee"), Some("membre_invite"), Some("???")];
    let types = [None, Some("client"), Some("employee"), Some("")];
    for role in roles {
        for user_type in types {
            for superuser in [false, true] {
                let mut user = user_with(role, user_type);
                user.is_superuser = superuser;
                let resolved = resolve_role(Some(&user));
                assert_ne!(resolved, CanonicalRole::Guest, "{role:?} {user_type:?}");
            }
        }
    }
}

// =============================================================
// satisfies
// =============================================================

#[test]
fn empty_requirement_admits_everyone() {
    for role in [CanonicalRole::Admin, CanonicalRole::Manager, CanonicalRole::Client] {
        assert!(role.satisfies(&[]));
    }
}

#[test]
fn manager_inherits_admin_but_not_the_reverse() {
    assert!(CanonicalRole::Manager.satisfies(&[CanonicalRole::Admin]));
    assert!(!CanonicalRole::Admin.satisfies(&[CanonicalRole::Manager]));
}

#[test]
fn client_never_satisfies_staff_requirements() {
    assert!(!CanonicalRole::Client.satisfies(&[CanonicalRole::Admin, CanonicalRole::Manager]));
}

// =============================================================
// is_invited_member
// =============================================================

#[test]
fn invited_member_flag_reads_raw_role_only() {
    assert!(is_invited_member(&user_with(Some("MEMBRE_INVITE"), None)));
    assert!(is_invited_member(&user_with(Some("membre_invite"), Some("client"))));
    assert!(!is_invited_member(&user_with(Some("owner"), None)));
    assert!(!is_invited_member(&user_with(None, Some("membre_invite"))));
}

#[test]
fn role_display_is_lowercase() {
    assert_eq!(CanonicalRole::Manager.to_string(), "manager");
    assert!(CanonicalRole::Manager.is_staff());
    assert!(!CanonicalRole::Client.is_staff());
}
