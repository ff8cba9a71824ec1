use super::*;

fn invitation(email: Option<&str>, tenant_name: Option<&str>) -> Invitation {
    Invitation { valid: true, email: email.map(str::to_owned), tenant_name: tenant_name.map(str::to_owned) }
}

#[test]
fn heading_names_the_inviting_tenant() {
    assert_eq!(invitation_heading(&invitation(None, Some("Acme"))), "Join Acme");
}

#[test]
fn heading_falls_back_without_tenant_name() {
    assert_eq!(invitation_heading(&invitation(None, None)), "Join your team");
    assert_eq!(invitation_heading(&invitation(None, Some(""))), "Join your team");
}

#[test]
fn subtitle_mentions_invited_email() {
    assert_eq!(
        invitation_subtitle(&invitation(Some("new@acme.test"), None)),
        Some("Choose a password for new@acme.test.".to_owned())
    );
    assert_eq!(invitation_subtitle(&invitation(None, None)), None);
}
