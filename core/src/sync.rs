//! Progress sync client: pulls and pushes the full game state.
//!
//! RULES:
//!   - Without an authenticated session, load and save do nothing.
//!   - A load either replaces the whole state or changes nothing. Transport
//!     errors and malformed bodies both count as "no data".
//!   - A failed save is logged and forgotten; the next scheduled save
//!     supersedes it.
//!   - Load and save share one gate. At most one is in flight; a save that
//!     finds the gate taken is skipped, never queued.
//!   - Nothing is pushed for an identity until its remote progress has been
//!     read once. A save before that first read would overwrite the
//!     player's saved game with the local anonymous state.

use crate::{
    auth::{check_status, AuthSession},
    error::ClickerResult,
    session::SessionHandle,
    state::{GameState, ProgressSnapshot},
    types::Generation,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};

/// The remote blob store, keyed by the bearer token's identity.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Fetch the raw saved body for this identity.
    async fn fetch(&self, token: &str) -> ClickerResult<serde_json::Value>;

    /// Overwrite the saved body for this identity.
    async fn push(&self, token: &str, state: &GameState) -> ClickerResult<()>;
}

pub struct HttpProgressStore {
    client: reqwest::Client,
    url:    String,
}

impl HttpProgressStore {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self { client, url: url.into() }
    }
}

#[async_trait]
impl ProgressStore for HttpProgressStore {
    async fn fetch(&self, token: &str) -> ClickerResult<serde_json::Value> {
        let response = self.client.get(&self.url).bearer_auth(token).send().await?;
        Ok(check_status(&self.url, response)?.json().await?)
    }

    async fn push(&self, token: &str, state: &GameState) -> ClickerResult<()> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(token)
            .json(state)
            .send()
            .await?;
        check_status(&self.url, response)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Unauthenticated,
    /// Nothing usable remotely; local state untouched.
    NoData,
    Applied { generation: Generation },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Unauthenticated,
    /// Another load or save was still running.
    Skipped,
    /// The current identity's remote progress has not been read yet.
    AwaitingLoad,
    Saved { generation: Generation, at: DateTime<Utc> },
    Failed,
}

pub struct ProgressSyncClient {
    auth:       Arc<AuthSession>,
    remote:     Arc<dyn ProgressStore>,
    session:    SessionHandle,
    gate:       tokio::sync::Mutex<()>,
    last_saved: Mutex<Option<DateTime<Utc>>>,
    /// Token whose remote progress has been read since it was adopted.
    loaded_for: Mutex<Option<String>>,
}

impl ProgressSyncClient {
    pub fn new(auth: Arc<AuthSession>, remote: Arc<dyn ProgressStore>, session: SessionHandle) -> Self {
        Self {
            auth,
            remote,
            session,
            gate: tokio::sync::Mutex::new(()),
            last_saved: Mutex::new(None),
            loaded_for: Mutex::new(None),
        }
    }

    /// Pull the remote snapshot and, if usable, replace the local state.
    pub async fn load(&self) -> ClickerResult<LoadOutcome> {
        let Some(token) = self.auth.bearer_token() else {
            return Ok(LoadOutcome::Unauthenticated);
        };
        let _gate = self.gate.lock().await;
        self.load_locked(&token).await
    }

    /// The first load for the current identity. `None` when it has already
    /// happened, including when a concurrent caller did it while this one
    /// waited for the gate.
    pub async fn initial_load(&self) -> ClickerResult<Option<LoadOutcome>> {
        let Some(token) = self.auth.bearer_token() else {
            return Ok(Some(LoadOutcome::Unauthenticated));
        };
        let _gate = self.gate.lock().await;
        if self.has_loaded(&token) {
            return Ok(None);
        }
        self.load_locked(&token).await.map(Some)
    }

    /// True while authenticated and the remote progress is still unread.
    pub fn awaiting_initial_load(&self) -> bool {
        self.auth
            .bearer_token()
            .is_some_and(|token| !self.has_loaded(&token))
    }

    /// Forget the read marker, so the next identity must load before saving.
    pub fn reset_initial_load(&self) {
        self.set_loaded_for(None);
    }

    async fn load_locked(&self, token: &str) -> ClickerResult<LoadOutcome> {
        let body = match self.remote.fetch(token).await {
            Ok(body) => body,
            Err(e) => {
                log::warn!("progress load failed, keeping local state: {e}");
                return Ok(LoadOutcome::NoData);
            }
        };
        // The remote has answered; whatever it holds, local state may now
        // be pushed over it.
        self.set_loaded_for(Some(token.to_string()));

        let snapshot = match ProgressSnapshot::from_value(body) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::warn!("ignoring remote progress: {e}");
                return Ok(LoadOutcome::NoData);
            }
        };

        let generation = self.session.load(snapshot).await?;
        log::info!("progress loaded (generation {generation})");
        Ok(LoadOutcome::Applied { generation })
    }

    /// Push the current state. Errors from the remote are logged, not returned.
    pub async fn save(&self) -> ClickerResult<SaveOutcome> {
        let Some(token) = self.auth.bearer_token() else {
            return Ok(SaveOutcome::Unauthenticated);
        };
        if !self.has_loaded(&token) {
            log::debug!("save held back: remote progress not read yet");
            return Ok(SaveOutcome::AwaitingLoad);
        }
        let Ok(_gate) = self.gate.try_lock() else {
            log::debug!("save skipped: sync already in flight");
            return Ok(SaveOutcome::Skipped);
        };

        let snapshot = self.session.snapshot().await?;
        match self.remote.push(&token, &snapshot.state).await {
            Ok(()) => {
                let at = Utc::now();
                if let Ok(mut last) = self.last_saved.lock() {
                    *last = Some(at);
                }
                log::debug!(
                    "progress saved (generation {}, {:.0} points)",
                    snapshot.generation,
                    snapshot.state.points
                );
                Ok(SaveOutcome::Saved { generation: snapshot.generation, at })
            }
            Err(e) => {
                log::warn!("progress save failed: {e}");
                Ok(SaveOutcome::Failed)
            }
        }
    }

    pub fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        self.last_saved.lock().ok().and_then(|last| *last)
    }

    pub fn is_busy(&self) -> bool {
        self.gate.try_lock().is_err()
    }

    fn has_loaded(&self, token: &str) -> bool {
        self.loaded_for
            .lock()
            .is_ok_and(|loaded| loaded.as_deref() == Some(token))
    }

    fn set_loaded_for(&self, token: Option<String>) {
        if let Ok(mut loaded) = self.loaded_for.lock() {
            *loaded = token;
        }
    }
}
