use super::*;

fn email(address: &str, primary: bool, verified: bool) -> GitHubEmail {
    GitHubEmail { email: address.to_owned(), primary, verified }
}

#[test]
fn authorize_url_carries_state_and_email_scope() {
    let config = GitHubConfig {
        client_id: "cid".into(),
        client_secret: "secret".into(),
        redirect_uri: "http://localhost:3000/auth/github/callback".into(),
    };
    let url = config.authorize_url("abc123");
    assert!(url.starts_with("https://github.com/login/oauth/authorize?client_id=cid"));
    assert!(url.contains("user:email"));
    assert!(url.ends_with("&state=abc123"));
    assert!(!url.contains("secret"));
}

#[test]
fn primary_verified_email_is_selected() {
    let emails = vec![
        email("old@example.com", false, true),
        email("main@example.com", true, true),
    ];
    assert_eq!(primary_verified_email(&emails), Some("main@example.com"));
}

#[test]
fn unverified_primary_is_ignored() {
    let emails = vec![email("main@example.com", true, false), email("alt@example.com", false, true)];
    assert_eq!(primary_verified_email(&emails), None);
}

#[test]
fn empty_email_list_has_no_identity() {
    assert_eq!(primary_verified_email(&[]), None);
}

#[test]
fn email_list_deserializes_github_shape() {
    let raw = r#"[{"email":"a@x.com","primary":true,"verified":true,"visibility":"public"}]"#;
    let emails: Vec<GitHubEmail> = serde_json::from_str(raw).unwrap();
    assert_eq!(primary_verified_email(&emails), Some("a@x.com"));
}
