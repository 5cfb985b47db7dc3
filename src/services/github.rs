//! GitHub OAuth service: code exchange and verified-email lookup.
//!
//! GitHub is the federated sign-in provider. Accounts are keyed by email, so
//! a GitHub identity is only usable once it exposes a primary verified email.

/// GitHub OAuth configuration loaded from environment.
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl GitHubConfig {
    /// Load from `GITHUB_CLIENT_ID`, `GITHUB_CLIENT_SECRET`, `GITHUB_REDIRECT_URI`.
    /// Returns `None` if any are missing (federated sign-in will be disabled).
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let client_id = std::env::var("GITHUB_CLIENT_ID").ok()?;
        let client_secret = std::env::var("GITHUB_CLIENT_SECRET").ok()?;
        let redirect_uri = std::env::var("GITHUB_REDIRECT_URI").ok()?;
        Some(Self { client_id, client_secret, redirect_uri })
    }

    /// Build the GitHub authorization URL carrying the CSRF `state`.
    #[must_use]
    pub fn authorize_url(&self, state: &str) -> String {
        format!(
            "https://github.com/login/oauth/authorize?client_id={}&redirect_uri={}&scope=read:user%20user:email&state={}",
            self.client_id, self.redirect_uri, state
        )
    }
}

#[derive(Debug, serde::Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, serde::Deserialize)]
struct GitHubUser {
    id: i64,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct GitHubEmail {
    pub email: String,
    pub primary: bool,
    pub verified: bool,
}

/// Identity resolved from a GitHub access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubIdentity {
    pub github_id: i64,
    pub email: String,
}

#[derive(Debug, thiserror::Error)]
pub enum GitHubError {
    #[error("github token exchange failed: {0}")]
    TokenExchange(String),
    #[error("github api error: {0}")]
    Api(String),
    #[error("github account has no verified primary email")]
    NoVerifiedEmail,
}

impl crate::error::ErrorCode for GitHubError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::TokenExchange(_) | Self::Api(_) => "auth/federated-failed",
            Self::NoVerifiedEmail => "auth/no-email",
        }
    }
}

/// Exchange an OAuth code for an access token.
///
/// # Errors
///
/// Returns [`GitHubError::TokenExchange`] on transport failure or an
/// unexpected response body.
pub async fn exchange_code(config: &GitHubConfig, code: &str) -> Result<String, GitHubError> {
    let client = reqwest::Client::new();
    let resp = client
        .post("https://github.com/login/oauth/access_token")
        .header("Accept", "application/json")
        .json(&serde_json::json!({
            "client_id": config.client_id,
            "client_secret": config.client_secret,
            "code": code,
            "redirect_uri": config.redirect_uri,
        }))
        .send()
        .await
        .map_err(|e| GitHubError::TokenExchange(e.to_string()))?;

    let body = resp
        .text()
        .await
        .map_err(|e| GitHubError::TokenExchange(e.to_string()))?;
    let token_resp: TokenResponse =
        serde_json::from_str(&body).map_err(|_| GitHubError::TokenExchange(format!("unexpected response: {body}")))?;
    Ok(token_resp.access_token)
}

async fn github_get<T: serde::de::DeserializeOwned>(access_token: &str, url: &str) -> Result<T, GitHubError> {
    let client = reqwest::Client::new();
    let resp = client
        .get(url)
        .header("Authorization", format!("Bearer {access_token}"))
        .header("User-Agent", "workshop-pool")
        .send()
        .await
        .map_err(|e| GitHubError::Api(e.to_string()))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(GitHubError::Api(format!("{status}: {body}")));
    }

    resp.json::<T>()
        .await
        .map_err(|e| GitHubError::Api(e.to_string()))
}

/// Pick the primary verified address from GitHub's email list.
#[must_use]
pub fn primary_verified_email(emails: &[GitHubEmail]) -> Option<&str> {
    emails
        .iter()
        .find(|e| e.primary && e.verified)
        .map(|e| e.email.as_str())
}

/// Resolve the GitHub user id and primary verified email for a token.
///
/// # Errors
///
/// API failures, or [`GitHubError::NoVerifiedEmail`] when the account exposes
/// no usable address.
pub async fn fetch_identity(access_token: &str) -> Result<GitHubIdentity, GitHubError> {
    let user: GitHubUser = github_get(access_token, "https://api.github.com/user").await?;
    let emails: Vec<GitHubEmail> = github_get(access_token, "https://api.github.com/user/emails").await?;
    let email = primary_verified_email(&emails).ok_or(GitHubError::NoVerifiedEmail)?;
    Ok(GitHubIdentity { github_id: user.id, email: email.to_owned() })
}

#[cfg(test)]
#[path = "github_test.rs"]
mod tests;
