//! Runtime wiring: session, timers, auth watcher and sync.
//!
//! Started tasks:
//!   1. Game session     (single writer)
//!   2. Passive income   (every tick interval -> Tick)
//!   3. Autosave         (every save interval -> save, when authenticated;
//!                        retries the first load instead while it is pending)
//!   4. Auth watcher     (one load each time the player becomes authenticated)
//!
//! `shutdown` cancels 2-4, waits for an in-flight autosave to be torn down,
//! drains the session and hands back its final state.

use crate::{
    auth::AuthSession,
    config::ClickerConfig,
    engine::GameEngine,
    error::{ClickerError, ClickerResult},
    hooks::GameHooks,
    scheduler::{PassiveIncomeScheduler, RecurringTask},
    session::{GameSession, SessionHandle},
    state::GameState,
    sync::{ProgressStore, ProgressSyncClient},
};
use std::sync::Arc;
use tokio::task::JoinHandle;
use uuid::Uuid;

pub struct ClickerRuntime {
    pub runtime_id: Uuid,
    session:        SessionHandle,
    session_task:   JoinHandle<GameEngine>,
    passive:        PassiveIncomeScheduler,
    autosave:       RecurringTask,
    auth_watcher:   JoinHandle<()>,
    auth:           Arc<AuthSession>,
    sync:           Arc<ProgressSyncClient>,
}

impl ClickerRuntime {
    /// Start a session for a new player. Must be called inside a tokio runtime.
    pub fn start(
        config: &ClickerConfig,
        auth: Arc<AuthSession>,
        remote: Arc<dyn ProgressStore>,
        hooks: Arc<dyn GameHooks>,
    ) -> Self {
        let runtime_id = Uuid::new_v4();
        let engine = GameEngine::new(Arc::new(config.catalog.clone()));
        let (session, session_task) = GameSession::spawn(engine, hooks, config.command_buffer);

        let mut passive = PassiveIncomeScheduler::new(session.clone(), config.tick_interval());
        passive.start();

        let sync = Arc::new(ProgressSyncClient::new(auth.clone(), remote, session.clone()));

        let autosave = {
            let sync = sync.clone();
            let auth = auth.clone();
            let session = session.clone();
            RecurringTask::spawn("autosave", config.save_interval(), move || {
                let sync = sync.clone();
                let auth = auth.clone();
                let session = session.clone();
                async move {
                    if auth.is_authenticated() {
                        autosave(&sync).await;
                    }
                    !session.is_closed()
                }
            })
        };

        let auth_watcher = tokio::spawn(watch_auth(auth.clone(), sync.clone()));

        log::info!("clicker runtime {runtime_id} started");
        Self {
            runtime_id,
            session,
            session_task,
            passive,
            autosave,
            auth_watcher,
            auth,
            sync,
        }
    }

    pub fn session(&self) -> &SessionHandle { &self.session }

    pub fn auth(&self) -> &Arc<AuthSession> { &self.auth }

    pub fn sync(&self) -> &Arc<ProgressSyncClient> { &self.sync }

    /// Re-phase the passive-income timer.
    pub fn restart_passive_income(&mut self) {
        self.passive.restart();
    }

    /// Stop every timer and the session; return the final state.
    pub async fn shutdown(mut self) -> ClickerResult<GameState> {
        self.passive.stop();
        self.autosave.stop().await;
        self.auth_watcher.abort();
        self.session.shutdown().await;
        let engine = self
            .session_task
            .await
            .map_err(|e| ClickerError::Other(anyhow::anyhow!("session task failed: {e}")))?;
        log::info!("clicker runtime {} stopped", self.runtime_id);
        Ok(engine.into_state())
    }
}

/// One autosave step. Until the identity's remote progress has been read,
/// the step retries that read instead of pushing.
async fn autosave(sync: &ProgressSyncClient) {
    let result = if sync.awaiting_initial_load() {
        sync.initial_load()
            .await
            .map(|outcome| log::debug!("autosave retried first load: {outcome:?}"))
    } else {
        sync.save().await.map(|outcome| log::debug!("autosave: {outcome:?}"))
    };
    if let Err(e) = result {
        log::warn!("autosave aborted: {e}");
    }
}

/// Issue one load every time the auth state flips to authenticated.
async fn watch_auth(auth: Arc<AuthSession>, sync: Arc<ProgressSyncClient>) {
    let mut identity = auth.subscribe();
    let mut was_authenticated = false;
    loop {
        let authenticated = identity.borrow_and_update().is_some();
        if authenticated && !was_authenticated {
            match sync.initial_load().await {
                Ok(outcome) => log::debug!("initial load: {outcome:?}"),
                Err(e) => log::warn!("initial load aborted: {e}"),
            }
        } else if !authenticated && was_authenticated {
            sync.reset_initial_load();
        }
        was_authenticated = authenticated;
        if identity.changed().await.is_err() {
            break;
        }
    }
}
