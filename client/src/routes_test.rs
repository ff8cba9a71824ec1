use super::*;

#[test]
fn every_section_route_is_role_gated() {
    for route in ROUTES {
        let expected = match route.section {
            Section::Admin => CanonicalRole::Admin,
            Section::Client => CanonicalRole::Client,
        };
        assert_eq!(route.requirement.allowed_roles, [expected], "{}", route.path);
        let prefix = match route.section {
            Section::Admin => "/admin/",
            Section::Client => "/client/",
        };
        assert!(route.path.starts_with(prefix), "{}", route.path);
    }
}

#[test]
fn route_lookup_handles_params_query_and_trailing_slash() {
    assert_eq!(route_for("/client/data-source/42").map(|r| r.name), Some("Data source details"));
    assert_eq!(route_for("/client/data-source").map(|r| r.name), Some("Data source"));
    assert_eq!(route_for("/admin/clients/?page=2").map(|r| r.path), Some("/admin/clients"));
    assert_eq!(route_for("/client/data-source/42/extra"), None);
    assert_eq!(route_for("/nowhere"), None);
}

#[test]
fn unknown_paths_fall_back_to_section_requirement() {
    assert_eq!(requirement_for("/admin/new-page").allowed_roles, [CanonicalRole::Admin]);
    assert_eq!(requirement_for("/client/new-page").allowed_roles, [CanonicalRole::Client]);
}

#[test]
fn invited_allow_list_matches_whole_segments() {
    assert!(invited_member_may_visit("/client/source"));
    assert!(invited_member_may_visit("/client/profile/"));
    assert!(!invited_member_may_visit("/client/profile-edit"));
    assert!(!invited_member_may_visit("/client/sources"));
}

#[test]
fn auth_paths_cover_the_auth_section_only() {
    assert!(is_auth_path("/auth/login"));
    assert!(is_auth_path("/auth/activation/tok"));
    assert!(!is_auth_path("/authors"));
    assert!(!is_auth_path("/client/profile"));
}

#[test]
fn first_login_path_carries_indicator() {
    assert_eq!(first_login_path(), "/client/subscription?firstLogin=true");
}

#[test]
fn unauthorized_pages_only_need_a_session() {
    assert_eq!(requirement_for("/admin/unauthorized"), RouteRequirement::ANY_AUTHENTICATED);
    assert_eq!(requirement_for("/client/unauthorized"), RouteRequirement::ANY_AUTHENTICATED);
}

#[test]
fn subscription_page_only_needs_a_session() {
    assert_eq!(requirement_for(CLIENT_SUBSCRIPTION_PATH), RouteRequirement::ANY_AUTHENTICATED);
    assert_eq!(requirement_for(CLIENT_PROFILE_PATH).allowed_roles, [CanonicalRole::Client]);
}

#[test]
fn email_verification_is_opt_in() {
    assert!(ROUTES.iter().all(|route| !route.requirement.require_verification));
    assert!(requirement_for(CLIENT_PROFILE_PATH).verified().require_verification);
}

#[test]
fn password_reset_pages_live_in_the_auth_section() {
    assert!(is_auth_path(FORGOT_PASSWORD_PATH));
    assert!(is_auth_path(&format!("{PASSWORD_RESET_PATH}/MQ/tok")));
    assert!(!is_auth_path(RESET_LINK_PATH));
}
