use super::*;

#[test]
fn hash_then_verify_accepts_same_password() {
    let hash = hash_password("hunter22").unwrap();
    assert!(hash.starts_with("$argon2id$"));
    assert!(verify_password("hunter22", &hash).unwrap());
}

#[test]
fn verify_rejects_wrong_password() {
    let hash = hash_password("hunter22").unwrap();
    assert!(!verify_password("hunter23", &hash).unwrap());
}

#[test]
fn hashes_are_salted() {
    let a = hash_password("same-password").unwrap();
    let b = hash_password("same-password").unwrap();
    assert_ne!(a, b);
}

#[test]
fn verify_malformed_hash_is_error() {
    assert!(matches!(verify_password("x", "not-a-phc-string"), Err(AccountError::Hash(_))));
}

#[test]
fn normalize_email_trims_and_validates() {
    assert_eq!(normalize_email("  a@x.com ").unwrap(), "a@x.com");
    assert!(matches!(normalize_email("bob"), Err(AccountError::InvalidEmail)));
    assert!(matches!(normalize_email(""), Err(AccountError::InvalidEmail)));
}

#[test]
fn password_strength_counts_characters() {
    assert!(check_password_strength("12345").is_err());
    assert!(check_password_strength("123456").is_ok());
    assert!(check_password_strength("éééééé").is_ok());
}

#[cfg(feature = "live-db-tests")]
mod live {
    use super::*;
    use crate::state::test_helpers::live_pool;

    fn unique_email() -> String {
        format!("live-{}@example.com", Uuid::new_v4().simple())
    }

    #[tokio::test]
    async fn register_then_sign_in() {
        let pool = live_pool().await;
        let email = unique_email();
        let created = register(&pool, &email, "secret1").await.unwrap();
        let signed_in = sign_in(&pool, &email, "secret1").await.unwrap();
        assert_eq!(created, signed_in);
        assert!(matches!(register(&pool, &email, "secret1").await, Err(AccountError::EmailTaken)));
        assert!(matches!(sign_in(&pool, &email, "wrong!!").await, Err(AccountError::InvalidCredential)));
    }

    #[tokio::test]
    async fn federated_account_cannot_password_sign_in() {
        let pool = live_pool().await;
        let email = unique_email();
        let github_id = i64::from(rand::random::<u32>());
        upsert_federated(&pool, &email, github_id).await.unwrap();
        assert!(matches!(sign_in(&pool, &email, "anything").await, Err(AccountError::InvalidCredential)));
    }
}
