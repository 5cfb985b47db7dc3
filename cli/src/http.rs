//! reqwest implementation of the backend contracts against the
//! `workshop-pool` service.
//!
//! The session token travels as the same `session_token` cookie a browser
//! would send. A successful sign-in replaces the held token; sign-out drops
//! it.

use std::sync::RwLock;

use async_trait::async_trait;
use records::{Component, ErrorBody, Pool, SessionInfo, SignInResponse, UserProfile};
use reqwest::header::COOKIE;
use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::backend::{AuthProvider, BackendError, DocumentStore};

pub struct HttpBackend {
    base_url: Url,
    client: reqwest::Client,
    token: RwLock<Option<String>>,
}

impl HttpBackend {
    /// # Errors
    ///
    /// Fails when `base_url` is not an absolute http(s) URL.
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, BackendError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| BackendError::new(None, "config/base-url", format!("invalid base URL {base_url:?}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(BackendError::new(None, "config/base-url", format!("invalid base URL {base_url}")));
        }
        Ok(Self { base_url, client: reqwest::Client::new(), token: RwLock::new(token) })
    }

    #[must_use]
    pub fn session_token(&self) -> Option<String> {
        self.token.read().ok().and_then(|t| t.clone())
    }

    fn set_session_token(&self, token: Option<String>) {
        if let Ok(mut slot) = self.token.write() {
            *slot = token;
        }
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let request = self.client.request(method, self.url(segments));
        match self.session_token() {
            Some(token) => request.header(COOKIE, format!("session_token={token}")),
            None => request,
        }
    }

    async fn send(request: RequestBuilder) -> Result<reqwest::Response, BackendError> {
        let response = request.send().await.map_err(|e| BackendError::transport(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let code = status.as_u16();
        match response.json::<ErrorBody>().await {
            Ok(body) => Err(BackendError::new(Some(code), body.code, body.message)),
            Err(_) => Err(BackendError::new(Some(code), format!("http/{code}"), status.to_string())),
        }
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, BackendError> {
        Self::send(request)
            .await?
            .json::<T>()
            .await
            .map_err(|e| BackendError::transport(format!("unexpected response body: {e}")))
    }

    /// Like [`Self::send_json`] but a 404 is `None`.
    async fn send_optional<T: DeserializeOwned>(request: RequestBuilder) -> Result<Option<T>, BackendError> {
        match Self::send_json(request).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.status == Some(StatusCode::NOT_FOUND.as_u16()) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Check that the service answers its health endpoint.
    ///
    /// # Errors
    ///
    /// Transport failures and non-2xx responses.
    pub async fn ping(&self) -> Result<(), BackendError> {
        Self::send(self.client.get(self.url(&["healthz"]))).await.map(drop)
    }

    async fn sign_in_with(&self, request: RequestBuilder) -> Result<SignInResponse, BackendError> {
        let signed_in: SignInResponse = Self::send_json(request).await?;
        self.set_session_token(Some(signed_in.token.clone()));
        Ok(signed_in)
    }
}

#[async_trait]
impl AuthProvider for HttpBackend {
    async fn register(&self, email: &str, password: &str) -> Result<SignInResponse, BackendError> {
        let request = self
            .request(Method::POST, &["api", "auth", "register"])
            .json(&json!({ "email": email, "password": password }));
        self.sign_in_with(request).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<SignInResponse, BackendError> {
        let request = self
            .request(Method::POST, &["api", "auth", "login"])
            .json(&json!({ "email": email, "password": password }));
        self.sign_in_with(request).await
    }

    async fn sign_in_federated(&self, access_token: &str) -> Result<SignInResponse, BackendError> {
        let request = self
            .request(Method::POST, &["api", "auth", "github", "token"])
            .json(&json!({ "access_token": access_token }));
        self.sign_in_with(request).await
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), BackendError> {
        let request = self
            .request(Method::POST, &["api", "auth", "password-reset"])
            .json(&json!({ "email": email }));
        Self::send(request).await.map(drop)
    }

    async fn confirm_password_reset(&self, token: &str, password: &str) -> Result<(), BackendError> {
        let request = self
            .request(Method::POST, &["api", "auth", "password-reset", "confirm"])
            .json(&json!({ "token": token, "password": password }));
        Self::send(request).await.map(drop)
    }

    async fn current_session(&self) -> Result<Option<SessionInfo>, BackendError> {
        if self.session_token().is_none() {
            return Ok(None);
        }
        match Self::send_json(self.request(Method::GET, &["api", "auth", "me"])).await {
            Ok(info) => Ok(Some(info)),
            Err(e) if e.status == Some(StatusCode::UNAUTHORIZED.as_u16()) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        let result = Self::send(self.request(Method::POST, &["api", "auth", "logout"])).await;
        self.set_session_token(None);
        result.map(drop)
    }
}

#[async_trait]
impl DocumentStore for HttpBackend {
    async fn get_profile(&self) -> Result<Option<UserProfile>, BackendError> {
        Self::send_optional(self.request(Method::GET, &["api", "profile"])).await
    }

    async fn seed_profile(&self) -> Result<UserProfile, BackendError> {
        Self::send_json(self.request(Method::PUT, &["api", "profile"])).await
    }

    async fn list_owned_pools(&self) -> Result<Vec<Pool>, BackendError> {
        Self::send_json(self.request(Method::GET, &["api", "pools"])).await
    }

    async fn create_pool(&self, name: &str) -> Result<Pool, BackendError> {
        let request = self.request(Method::POST, &["api", "pools"]).json(&json!({ "name": name }));
        Self::send_json(request).await
    }

    async fn get_pool(&self, id: &str) -> Result<Option<Pool>, BackendError> {
        Self::send_optional(self.request(Method::GET, &["api", "pools", id])).await
    }

    async fn delete_pool(&self, id: &str) -> Result<(), BackendError> {
        Self::send(self.request(Method::DELETE, &["api", "pools", id])).await.map(drop)
    }

    async fn add_member(&self, pool_id: &str, email: &str) -> Result<Pool, BackendError> {
        let request = self
            .request(Method::POST, &["api", "pools", pool_id, "members"])
            .json(&json!({ "email": email }));
        Self::send_json(request).await
    }

    async fn remove_member(&self, pool_id: &str, email: &str) -> Result<Pool, BackendError> {
        Self::send_json(self.request(Method::DELETE, &["api", "pools", pool_id, "members", email])).await
    }

    async fn list_components(&self) -> Result<Vec<Component>, BackendError> {
        Self::send_json(self.request(Method::GET, &["api", "components"])).await
    }

    async fn create_component(&self, name: &str, description: &str) -> Result<Component, BackendError> {
        let request = self
            .request(Method::POST, &["api", "components"])
            .json(&json!({ "name": name, "description": description }));
        Self::send_json(request).await
    }

    async fn delete_component(&self, id: &str) -> Result<(), BackendError> {
        Self::send(self.request(Method::DELETE, &["api", "components", id])).await.map(drop)
    }
}

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;
