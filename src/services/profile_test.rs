use super::*;
use crate::error::ErrorCode;

#[test]
fn tuple_maps_onto_profile_fields() {
    let profile = to_profile((
        "ada@example.com".into(),
        "ada".into(),
        vec!["p1".into()],
        "2026-01-02T03:04:05Z".into(),
    ));
    assert_eq!(profile.email, "ada@example.com");
    assert_eq!(profile.username, "ada");
    assert_eq!(profile.pools, vec!["p1".to_owned()]);
    assert_eq!(profile.created_at, "2026-01-02T03:04:05Z");
}

#[test]
fn not_found_has_stable_code() {
    assert_eq!(ProfileError::NotFound.error_code(), "profile/not-found");
}

#[cfg(feature = "live-db-tests")]
mod live {
    use super::*;
    use crate::state::test_helpers;

    #[tokio::test]
    async fn ensure_seeds_once_and_keeps_existing() {
        let pool = test_helpers::live_pool().await;
        let email = format!("profile-{}@example.com", uuid::Uuid::new_v4().simple());

        assert!(matches!(get_profile(&pool, &email).await, Err(ProfileError::NotFound)));

        let first = ensure_profile(&pool, &email).await.unwrap();
        assert_eq!(first.username, email.split('@').next().unwrap());
        assert!(first.pools.is_empty());
        assert!(first.created_at.ends_with('Z'));

        sqlx::query("UPDATE profiles SET username = 'renamed' WHERE email = $1")
            .bind(&email)
            .execute(&pool)
            .await
            .unwrap();
        let second = ensure_profile(&pool, &email).await.unwrap();
        assert_eq!(second.username, "renamed");
        assert_eq!(second.created_at, first.created_at);
    }
}
