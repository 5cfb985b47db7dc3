//! In-memory backend for manager tests. Mirrors the service's rules closely
//! enough that managers see the same successes and error codes.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use records::{Component, Pool, SessionInfo, SignInResponse, UserProfile};

use crate::backend::{AuthProvider, BackendError, DocumentStore};

#[derive(Default)]
struct FakeState {
    passwords: HashMap<String, String>,
    github_tokens: HashMap<String, String>,
    signed_in: Option<String>,
    profiles: HashMap<String, UserProfile>,
    pools: Vec<Pool>,
    components: Vec<Component>,
    next_id: u32,
    failing: HashSet<&'static str>,
    calls: Vec<&'static str>,
    reset_requests: Vec<String>,
}

#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<FakeState>,
}

fn err(status: u16, code: &str) -> BackendError {
    BackendError::new(Some(status), code, code)
}

impl FakeBackend {
    pub fn with_account(self, email: &str, password: &str) -> Self {
        self.lock().passwords.insert(email.to_owned(), password.to_owned());
        self
    }

    pub fn with_github_token(self, token: &str, email: &str) -> Self {
        self.lock().github_tokens.insert(token.to_owned(), email.to_owned());
        self
    }

    pub fn with_profile(self, profile: UserProfile) -> Self {
        self.lock().profiles.insert(profile.email.clone(), profile);
        self
    }

    pub fn with_pool(self, pool: Pool) -> Self {
        self.lock().pools.push(pool);
        self
    }

    pub fn with_component(self, component: Component) -> Self {
        self.lock().components.push(component);
        self
    }

    pub fn signed_in_as(self, email: &str) -> Self {
        self.lock().signed_in = Some(email.to_owned());
        self
    }

    /// Make every call to `op` fail with a transport error.
    pub fn fail(&self, op: &'static str) {
        self.lock().failing.insert(op);
    }

    /// Operation names in call order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.lock().calls.clone()
    }

    pub fn pools(&self) -> Vec<Pool> {
        self.lock().pools.clone()
    }

    pub fn profile(&self, email: &str) -> Option<UserProfile> {
        self.lock().profiles.get(email).cloned()
    }

    pub fn reset_requests(&self) -> Vec<String> {
        self.lock().reset_requests.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake backend lock")
    }

    /// Record the call, apply failure injection, and yield once so concurrent
    /// submissions can interleave.
    async fn enter(&self, op: &'static str) -> Result<(), BackendError> {
        let failing = {
            let mut state = self.lock();
            state.calls.push(op);
            state.failing.contains(op)
        };
        tokio::task::yield_now().await;
        if failing {
            return Err(BackendError::transport(format!("{op} unavailable")));
        }
        Ok(())
    }

    fn caller(&self) -> Result<String, BackendError> {
        self.lock().signed_in.clone().ok_or_else(|| err(401, "auth/unauthenticated"))
    }

    fn next_id(&self) -> String {
        let mut state = self.lock();
        state.next_id += 1;
        format!("id-{}", state.next_id)
    }

    fn signed_in(&self, email: &str) -> SignInResponse {
        self.lock().signed_in = Some(email.to_owned());
        let info = SessionInfo::for_email(email);
        SignInResponse { token: format!("token-{email}"), email: info.email, username: info.username }
    }
}

#[async_trait]
impl AuthProvider for FakeBackend {
    async fn register(&self, email: &str, password: &str) -> Result<SignInResponse, BackendError> {
        self.enter("register").await?;
        if self.lock().passwords.contains_key(email) {
            return Err(err(409, "auth/email-taken"));
        }
        self.lock().passwords.insert(email.to_owned(), password.to_owned());
        Ok(self.signed_in(email))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<SignInResponse, BackendError> {
        self.enter("sign_in").await?;
        let matches = self.lock().passwords.get(email).is_some_and(|p| p == password);
        if !matches {
            return Err(err(401, "auth/invalid-credential"));
        }
        Ok(self.signed_in(email))
    }

    async fn sign_in_federated(&self, access_token: &str) -> Result<SignInResponse, BackendError> {
        self.enter("sign_in_federated").await?;
        let email = self.lock().github_tokens.get(access_token).cloned();
        let email = email.ok_or_else(|| err(502, "auth/federated-failed"))?;
        Ok(self.signed_in(&email))
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), BackendError> {
        self.enter("send_password_reset").await?;
        self.lock().reset_requests.push(email.to_owned());
        Ok(())
    }

    async fn confirm_password_reset(&self, token: &str, password: &str) -> Result<(), BackendError> {
        self.enter("confirm_password_reset").await?;
        let mut state = self.lock();
        let Some(email) = token.strip_prefix("reset-") else {
            return Err(err(400, "auth/invalid-reset-token"));
        };
        state.passwords.insert(email.to_owned(), password.to_owned());
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<SessionInfo>, BackendError> {
        self.enter("current_session").await?;
        Ok(self.lock().signed_in.as_deref().map(SessionInfo::for_email))
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        self.enter("sign_out").await?;
        self.lock().signed_in = None;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FakeBackend {
    async fn get_profile(&self) -> Result<Option<UserProfile>, BackendError> {
        self.enter("get_profile").await?;
        let email = self.caller()?;
        Ok(self.profile(&email))
    }

    async fn seed_profile(&self) -> Result<UserProfile, BackendError> {
        self.enter("seed_profile").await?;
        let email = self.caller()?;
        let mut state = self.lock();
        let stored = state
            .profiles
            .entry(email.clone())
            .or_insert_with(|| UserProfile::seed(&email, "2026-01-01T00:00:00Z"));
        Ok(stored.clone())
    }

    async fn list_owned_pools(&self) -> Result<Vec<Pool>, BackendError> {
        self.enter("list_owned_pools").await?;
        let email = self.caller()?;
        Ok(self.lock().pools.iter().filter(|p| p.owner == email).cloned().collect())
    }

    async fn create_pool(&self, name: &str) -> Result<Pool, BackendError> {
        self.enter("create_pool").await?;
        let owner = self.caller()?;
        let pool = Pool { id: self.next_id(), name: name.to_owned(), owner: owner.clone(), members: vec![owner] };
        self.lock().pools.push(pool.clone());
        Ok(pool)
    }

    async fn get_pool(&self, id: &str) -> Result<Option<Pool>, BackendError> {
        self.enter("get_pool").await?;
        Ok(self.lock().pools.iter().find(|p| p.id == id).cloned())
    }

    async fn delete_pool(&self, id: &str) -> Result<(), BackendError> {
        self.enter("delete_pool").await?;
        let caller = self.caller()?;
        let mut state = self.lock();
        let index = state.pools.iter().position(|p| p.id == id).ok_or_else(|| err(404, "pool/not-found"))?;
        if state.pools[index].owner != caller {
            return Err(err(403, "pool/forbidden"));
        }
        state.pools.remove(index);
        Ok(())
    }

    async fn add_member(&self, pool_id: &str, email: &str) -> Result<Pool, BackendError> {
        self.enter("add_member").await?;
        let mut state = self.lock();
        let pool = state.pools.iter_mut().find(|p| p.id == pool_id).ok_or_else(|| err(404, "pool/not-found"))?;
        if pool.members.iter().any(|m| m == email) {
            return Err(err(409, "member/duplicate"));
        }
        pool.members.push(email.to_owned());
        Ok(pool.clone())
    }

    async fn remove_member(&self, pool_id: &str, email: &str) -> Result<Pool, BackendError> {
        self.enter("remove_member").await?;
        let mut state = self.lock();
        let pool = state.pools.iter_mut().find(|p| p.id == pool_id).ok_or_else(|| err(404, "pool/not-found"))?;
        if pool.owner == email {
            return Err(err(409, "member/owner"));
        }
        pool.members.retain(|m| m != email);
        Ok(pool.clone())
    }

    async fn list_components(&self) -> Result<Vec<Component>, BackendError> {
        self.enter("list_components").await?;
        Ok(self.lock().components.clone())
    }

    async fn create_component(&self, name: &str, description: &str) -> Result<Component, BackendError> {
        self.enter("create_component").await?;
        let owner = self.caller()?;
        let component = Component {
            id: self.next_id(),
            name: name.to_owned(),
            description: description.to_owned(),
            owner,
            created_at: "2026-01-01T00:00:00Z".to_owned(),
        };
        self.lock().components.push(component.clone());
        Ok(component)
    }

    async fn delete_component(&self, id: &str) -> Result<(), BackendError> {
        self.enter("delete_component").await?;
        let mut state = self.lock();
        let before = state.components.len();
        state.components.retain(|c| c.id != id);
        if state.components.len() == before {
            return Err(err(404, "component/not-found"));
        }
        Ok(())
    }
}
