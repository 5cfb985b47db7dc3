use super::*;
use crate::state::test_helpers;

#[test]
fn hash_reset_token_is_stable_and_trimmed() {
    let a = hash_reset_token("abc");
    assert_eq!(a, hash_reset_token("  abc\n"));
    assert_ne!(a, hash_reset_token("abd"));
    assert_eq!(a.len(), 64);
}

#[test]
fn reset_link_joins_without_double_slash() {
    assert_eq!(
        reset_link("https://pool.example.com/", "t0k"),
        "https://pool.example.com/forgot-password?token=t0k"
    );
}

#[test]
fn account_errors_map_to_reset_errors() {
    assert!(matches!(ResetError::from(AccountError::InvalidEmail), ResetError::InvalidEmail));
    assert!(matches!(ResetError::from(AccountError::WeakPassword), ResetError::WeakPassword));
}

#[tokio::test]
async fn malformed_email_fails_before_any_database_io() {
    let state = test_helpers::test_app_state();
    let mailer = test_helpers::RecordingMailer::default();
    let err = request_reset(&state.pool, &mailer, "http://localhost", "bob").await.unwrap_err();
    assert!(matches!(err, ResetError::InvalidEmail));
    assert!(mailer.sent().is_empty());
}

#[tokio::test]
async fn weak_password_fails_before_token_is_consumed() {
    let state = test_helpers::test_app_state();
    let err = confirm_reset(&state.pool, "whatever", "123").await.unwrap_err();
    assert!(matches!(err, ResetError::WeakPassword));
}

#[cfg(feature = "live-db-tests")]
mod live {
    use super::*;

    #[tokio::test]
    async fn reset_round_trip_revokes_sessions() {
        let pool = test_helpers::live_pool().await;
        let email = format!("reset-{}@example.com", Uuid::new_v4().simple());
        let account = account::register(&pool, &email, "first-pass").await.unwrap();
        session::create_session(&pool, account.id, 1).await.unwrap();

        let mailer = test_helpers::RecordingMailer::default();
        request_reset(&pool, &mailer, "http://localhost:3000", &email).await.unwrap();
        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);

        confirm_reset(&pool, &sent[0].token, "second-pass").await.unwrap();
        assert!(account::sign_in(&pool, &email, "second-pass").await.is_ok());
        assert!(matches!(
            confirm_reset(&pool, &sent[0].token, "third-pass").await,
            Err(ResetError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn unknown_email_is_silent() {
        let pool = test_helpers::live_pool().await;
        let mailer = test_helpers::RecordingMailer::default();
        request_reset(&pool, &mailer, "http://localhost:3000", "nobody-here@example.com")
            .await
            .unwrap();
        assert!(mailer.sent().is_empty());
    }
}
