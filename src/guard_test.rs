use super::*;
use crate::test_helpers::sample_user;

fn logged_out() -> Session {
    Session::default()
}

fn signed_in(role: Role) -> Session {
    Session {
        access_token: Some("access".to_owned()),
        refresh_token: Some("refresh".to_owned()),
        user: Some(sample_user(role)),
        is_authenticated: true,
    }
}

/// Tokens set, `/auth/me` not answered yet.
fn tokens_only() -> Session {
    Session { user: None, ..signed_in(Role::Patient) }
}

// =============================================================
// evaluate
// =============================================================

#[test]
fn unauthenticated_goes_to_login() {
    assert_eq!(evaluate(&logged_out(), Some(&[Role::Doctor])), GuardDecision::Redirect("/login"));
    assert_eq!(evaluate(&logged_out(), None), GuardDecision::Redirect("/login"));
}

#[test]
fn wrong_role_goes_to_own_home() {
    assert_eq!(evaluate(&signed_in(Role::Patient), Some(&[Role::Admin])), GuardDecision::Redirect("/app/dashboard"));
    assert_eq!(evaluate(&signed_in(Role::Doctor), Some(&[Role::Patient])), GuardDecision::Redirect("/doctor/dashboard"));
    assert_eq!(evaluate(&signed_in(Role::Admin), Some(&[Role::Doctor])), GuardDecision::Redirect("/admin/dashboard"));
}

#[test]
fn allowed_role_renders() {
    assert_eq!(evaluate(&signed_in(Role::Doctor), Some(&[Role::Doctor, Role::Admin])), GuardDecision::Render);
}

#[test]
fn no_role_restriction_renders_for_any_signed_in_user() {
    assert_eq!(evaluate(&signed_in(Role::Patient), None), GuardDecision::Render);
    assert_eq!(evaluate(&tokens_only(), None), GuardDecision::Render);
}

#[test]
fn restricted_page_waits_for_profile() {
    assert_eq!(evaluate(&tokens_only(), Some(&[Role::Admin])), GuardDecision::AwaitProfile);
}

#[test]
fn restored_session_without_access_token_passes() {
    let restored = Session { access_token: None, ..signed_in(Role::Patient) };
    assert_eq!(evaluate(&restored, Some(&[Role::Patient])), GuardDecision::Render);
}

#[test]
fn every_role_has_a_home_served_by_its_own_pages() {
    for role in Role::ALL {
        let route = route_for(home_path(role)).unwrap();
        assert!(matches!(route.access, Access::Roles(roles) if roles == [role]));
    }
}

// =============================================================
// Route table
// =============================================================

#[test]
fn route_for_matches_params() {
    let route = route_for("/app/schedule/0b7e5c1a").unwrap();
    assert_eq!(route.page, "patient.schedule");
    assert_eq!(route.matches("/app/schedule/0b7e5c1a"), Some(vec![("doctorId", "0b7e5c1a")]));
}

#[test]
fn route_for_ignores_query_and_trailing_slash() {
    assert_eq!(route_for("/admin/users/?skip=50").unwrap().page, "admin.users");
    assert_eq!(route_for("/?next=x").unwrap().page, "landing");
}

#[test]
fn route_for_rejects_partial_and_unknown_paths() {
    assert!(route_for("/app/schedule").is_none());
    assert!(route_for("/app/schedule/a/b").is_none());
    assert!(route_for("/nope").is_none());
}

#[test]
fn evaluate_path_protects_by_table() {
    assert_eq!(evaluate_path(&logged_out(), "/doctor/agenda"), GuardDecision::Redirect("/login"));
    assert_eq!(evaluate_path(&signed_in(Role::Patient), "/admin/users"), GuardDecision::Redirect("/app/dashboard"));
    assert_eq!(evaluate_path(&signed_in(Role::Patient), "/app/payment/42"), GuardDecision::Render);
    assert_eq!(evaluate_path(&logged_out(), "/does-not-exist"), GuardDecision::Render);
}

// =============================================================
// Public pages
// =============================================================

#[test]
fn public_pages_render_when_logged_out() {
    for path in ["/", "/login", "/register"] {
        assert_eq!(public_redirect(&logged_out(), path), None);
        assert_eq!(evaluate_path(&logged_out(), path), GuardDecision::Render);
    }
}

#[test]
fn signed_in_user_is_sent_home_from_public_pages() {
    let doctor = signed_in(Role::Doctor);
    assert_eq!(public_redirect(&doctor, "/"), Some("/doctor/dashboard"));
    assert_eq!(public_redirect(&doctor, "/login"), Some("/doctor/dashboard"));
    assert_eq!(evaluate_path(&doctor, "/register"), GuardDecision::Redirect("/doctor/dashboard"));
}

#[test]
fn landing_waits_for_profile_but_login_falls_back() {
    assert_eq!(public_redirect(&tokens_only(), "/"), None);
    assert_eq!(public_redirect(&tokens_only(), "/login"), Some(DEFAULT_HOME));
}
