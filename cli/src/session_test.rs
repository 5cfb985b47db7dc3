use super::*;
use crate::fake::FakeBackend;
use crate::store::SESSION_KEYS;

fn session(email: &str) -> Session {
    Session {
        email: email.to_owned(),
        username: records::username_from_email(email),
        profile: Some(UserProfile::seed(email, "2026-01-01T00:00:00Z")),
        token: "tok".to_owned(),
    }
}

fn store_with(session: Option<&Session>) -> (tempfile::TempDir, LocalStore) {
    let dir = tempfile::tempdir().unwrap();
    let mut local = LocalStore::open(dir.path()).unwrap();
    if let Some(session) = session {
        session.save(&mut local).unwrap();
    }
    (dir, local)
}

#[test]
fn loading_never_redirects() {
    assert_eq!(GateState::Loading.decide(), GateDecision::Pending);
}

#[test]
fn resolved_states_decide() {
    let s = session("a@x.com");
    assert_eq!(GateState::Resolved(Some(s.clone())).decide(), GateDecision::Authorized(s));
    assert_eq!(GateState::Resolved(None).decide(), GateDecision::RedirectToLogin);
}

#[test]
fn session_round_trips_through_local_store() {
    let s = session("a@x.com");
    let (_dir, local) = store_with(Some(&s));
    assert_eq!(Session::load(&local), Some(s));
}

#[test]
fn session_without_profile_leaves_user_data_unset() {
    let mut s = session("a@x.com");
    s.profile = None;
    let (_dir, local) = store_with(Some(&s));
    assert_eq!(local.get(crate::store::KEY_USER_DATA), None);
    assert_eq!(Session::load(&local).unwrap().profile, None);
}

#[tokio::test]
async fn gate_without_local_session_skips_observation() {
    let backend = FakeBackend::default().signed_in_as("a@x.com");
    let (_dir, local) = store_with(None);
    let state = resolve_gate(&backend, &local).await.unwrap();
    assert_eq!(state.decide(), GateDecision::RedirectToLogin);
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn gate_authorizes_matching_session_with_one_observation() {
    let backend = FakeBackend::default().signed_in_as("a@x.com");
    let s = session("a@x.com");
    let (_dir, local) = store_with(Some(&s));
    let state = resolve_gate(&backend, &local).await.unwrap();
    assert_eq!(state.decide(), GateDecision::Authorized(s));
    assert_eq!(backend.calls(), vec!["current_session"]);
}

#[tokio::test]
async fn gate_redirects_when_provider_reports_signed_out() {
    let backend = FakeBackend::default();
    let (_dir, local) = store_with(Some(&session("a@x.com")));
    let state = resolve_gate(&backend, &local).await.unwrap();
    assert_eq!(state.decide(), GateDecision::RedirectToLogin);
}

#[tokio::test]
async fn gate_redirects_on_account_mismatch() {
    let backend = FakeBackend::default().signed_in_as("b@x.com");
    let (_dir, local) = store_with(Some(&session("a@x.com")));
    assert_eq!(resolve_gate(&backend, &local).await.unwrap(), GateState::Resolved(None));
}

#[tokio::test]
async fn logout_clears_all_keys_then_gate_redirects() {
    let backend = FakeBackend::default().signed_in_as("a@x.com");
    let (dir, mut local) = store_with(Some(&session("a@x.com")));

    logout(&backend, &mut local).await.unwrap();

    let reopened = LocalStore::open(dir.path()).unwrap();
    for key in SESSION_KEYS {
        assert_eq!(reopened.get(key), None, "{key} survived logout");
    }
    let state = resolve_gate(&backend, &reopened).await.unwrap();
    assert_eq!(state.decide(), GateDecision::RedirectToLogin);
}

#[tokio::test]
async fn logout_clears_locally_even_if_provider_fails() {
    let backend = FakeBackend::default().signed_in_as("a@x.com");
    backend.fail("sign_out");
    let (_dir, mut local) = store_with(Some(&session("a@x.com")));
    logout(&backend, &mut local).await.unwrap();
    assert_eq!(Session::load(&local), None);
}
