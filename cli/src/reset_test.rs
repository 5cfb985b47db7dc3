use super::*;
use crate::fake::FakeBackend;

#[tokio::test]
async fn valid_email_sends_reset() {
    let backend = FakeBackend::default();
    let message = ResetFlow::new().request_reset(&backend, " ada@example.com ").await.unwrap();
    assert_eq!(message, messages::RESET_SENT);
    assert_eq!(backend.reset_requests(), vec!["ada@example.com".to_owned()]);
}

#[tokio::test]
async fn malformed_email_sends_nothing() {
    let backend = FakeBackend::default();
    let err = ResetFlow::new().request_reset(&backend, "ada@").await.unwrap_err();
    assert_eq!(err, FlowError::invalid(messages::INVALID_EMAIL));
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn provider_failure_maps_to_reset_failed() {
    let backend = FakeBackend::default();
    backend.fail("send_password_reset");
    let err = ResetFlow::new().request_reset(&backend, "ada@example.com").await.unwrap_err();
    assert_eq!(err, FlowError::failed(messages::RESET_FAILED));
}

#[tokio::test]
async fn concurrent_requests_are_refused_while_busy() {
    let backend = FakeBackend::default();
    let flow = ResetFlow::new();
    let (first, second) = tokio::join!(
        flow.request_reset(&backend, "ada@example.com"),
        flow.request_reset(&backend, "ada@example.com"),
    );
    assert_eq!(first, Ok(messages::RESET_SENT));
    assert_eq!(second, Err(FlowError::Busy));
    assert_eq!(backend.reset_requests().len(), 1);
}

#[tokio::test]
async fn confirm_with_valid_token_updates_password() {
    let backend = FakeBackend::default().with_account("ada@example.com", "old-pass");
    let flow = ResetFlow::new();
    assert_eq!(
        flow.confirm_reset(&backend, "reset-ada@example.com", "new-pass").await,
        Ok(messages::PASSWORD_UPDATED)
    );
    backend.sign_in("ada@example.com", "new-pass").await.unwrap();
}

#[tokio::test]
async fn confirm_with_bad_token_shows_service_message() {
    let backend = FakeBackend::default();
    let err = ResetFlow::new().confirm_reset(&backend, "bogus", "new-pass").await.unwrap_err();
    assert_eq!(err, FlowError::failed("auth/invalid-reset-token"));
}

#[tokio::test]
async fn confirm_requires_a_token() {
    let backend = FakeBackend::default();
    let err = ResetFlow::new().confirm_reset(&backend, "  ", "new-pass").await.unwrap_err();
    assert!(matches!(err, FlowError::Invalid(_)));
    assert!(backend.calls().is_empty());
}
