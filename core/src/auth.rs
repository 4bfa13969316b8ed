//! Auth session: owns the bearer token and the verified identity.
//!
//! The token is a process-wide credential: acquired on login, persisted in
//! the credential store, cleared on logout or failed verification. The sync
//! client only reads it. Identity changes are published on a watch channel
//! so the runtime can react when a session becomes authenticated.

use crate::{
    error::{ClickerError, ClickerResult},
    store::CredentialStore,
};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct VerifyResponse {
    pub valid: bool,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    auth_url: String,
}

/// A verified player.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub token:   String,
    pub user_id: Option<i64>,
    pub email:   Option<String>,
}

/// The remote auth service, as consumed by the client.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// URL of the provider's login page.
    async fn login_url(&self) -> ClickerResult<String>;

    async fn verify(&self, token: &str) -> ClickerResult<VerifyResponse>;
}

pub struct HttpAuthService {
    client:   reqwest::Client,
    base_url: String,
}

impl HttpAuthService {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self { client, base_url: base_url.into() }
    }
}

#[async_trait]
impl AuthService for HttpAuthService {
    async fn login_url(&self) -> ClickerResult<String> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("action", "login")])
            .send()
            .await?;
        let body: LoginResponse = check_status(&self.base_url, response)?.json().await?;
        Ok(body.auth_url)
    }

    async fn verify(&self, token: &str) -> ClickerResult<VerifyResponse> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("action", "verify")])
            .bearer_auth(token)
            .send()
            .await?;
        Ok(check_status(&self.base_url, response)?.json().await?)
    }
}

pub(crate) fn check_status(
    endpoint: &str,
    response: reqwest::Response,
) -> ClickerResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ClickerError::Status {
            endpoint: endpoint.to_string(),
            status:   status.as_u16(),
        })
    }
}

pub struct AuthSession {
    service:  Arc<dyn AuthService>,
    store:    Mutex<CredentialStore>,
    identity: watch::Sender<Option<Identity>>,
}

impl AuthSession {
    pub fn new(service: Arc<dyn AuthService>, store: CredentialStore) -> Self {
        let (identity, _) = watch::channel(None);
        Self { service, store: Mutex::new(store), identity }
    }

    /// Re-establish a session from the persisted token, if any.
    /// An invalid token, or one that cannot be verified, is cleared.
    pub async fn restore(&self) -> ClickerResult<Option<Identity>> {
        let Some(token) = self.with_store(|s| s.token())? else {
            log::debug!("no persisted auth token");
            return Ok(None);
        };
        self.verify_and_adopt(token).await
    }

    pub async fn login_url(&self) -> ClickerResult<String> {
        self.service.login_url().await
    }

    /// Accept a token handed back by the login flow.
    pub async fn complete_login(&self, token: &str) -> ClickerResult<Option<Identity>> {
        self.with_store(|s| s.set_token(token))?;
        self.verify_and_adopt(token.to_string()).await
    }

    pub fn logout(&self) -> ClickerResult<()> {
        self.with_store(|s| s.clear_token())?;
        if self.identity.send_replace(None).is_some() {
            log::info!("logged out");
        }
        Ok(())
    }

    pub fn identity(&self) -> Option<Identity> {
        self.identity.borrow().clone()
    }

    pub fn bearer_token(&self) -> Option<String> {
        self.identity.borrow().as_ref().map(|i| i.token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.borrow().is_some()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.identity.subscribe()
    }

    async fn verify_and_adopt(&self, token: String) -> ClickerResult<Option<Identity>> {
        let verdict = match self.service.verify(&token).await {
            Ok(v) => v,
            Err(e) => {
                log::warn!("token verification failed: {e}");
                self.drop_credentials()?;
                return Ok(None);
            }
        };
        if !verdict.valid {
            log::warn!("auth token rejected by the server");
            self.drop_credentials()?;
            return Ok(None);
        }

        let identity = Identity {
            token,
            user_id: verdict.user_id,
            email:   verdict.email,
        };
        log::info!(
            "authenticated as {}",
            identity.email.as_deref().unwrap_or("<unknown>")
        );
        self.identity.send_replace(Some(identity.clone()));
        Ok(Some(identity))
    }

    fn drop_credentials(&self) -> ClickerResult<()> {
        self.with_store(|s| s.clear_token())?;
        self.identity.send_replace(None);
        Ok(())
    }

    fn with_store<T>(&self, f: impl FnOnce(&CredentialStore) -> ClickerResult<T>) -> ClickerResult<T> {
        let store = self
            .store
            .lock()
            .map_err(|_| anyhow::anyhow!("credential store lock poisoned"))?;
        f(&store)
    }
}
