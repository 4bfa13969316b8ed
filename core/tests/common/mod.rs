//! In-memory stand-ins for the remote auth and progress services.

#![allow(dead_code)]

use async_trait::async_trait;
use clicker_core::{
    auth::{AuthService, AuthSession, VerifyResponse},
    catalog::{Achievement, Catalog},
    error::{ClickerError, ClickerResult},
    event::Purchase,
    hooks::GameHooks,
    state::GameState,
    store::CredentialStore,
    types::Level,
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};
use tokio::sync::Notify;

pub const TOKEN: &str = "tok-7f3a";

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn catalog() -> Arc<Catalog> {
    Arc::new(Catalog::builtin())
}

pub fn credential_store() -> CredentialStore {
    let store = CredentialStore::in_memory().unwrap();
    store.migrate().unwrap();
    store
}

/// An auth session whose service accepts only `TOKEN`. Not yet logged in.
pub fn auth_session() -> Arc<AuthSession> {
    Arc::new(AuthSession::new(
        Arc::new(FakeAuthService::accepting(TOKEN)),
        credential_store(),
    ))
}

/// An auth session already holding a verified `TOKEN`.
pub async fn logged_in() -> Arc<AuthSession> {
    let auth = auth_session();
    auth.complete_login(TOKEN).await.unwrap().expect("token accepted");
    auth
}

/// Accepts exactly the tokens it was built with.
pub struct FakeAuthService {
    pub valid_tokens: Vec<String>,
    pub unreachable:  bool,
}

impl FakeAuthService {
    pub fn accepting(token: &str) -> Self {
        Self { valid_tokens: vec![token.to_string()], unreachable: false }
    }

    pub fn unreachable() -> Self {
        Self { valid_tokens: vec![], unreachable: true }
    }
}

#[async_trait]
impl AuthService for FakeAuthService {
    async fn login_url(&self) -> ClickerResult<String> {
        Ok("https://accounts.example.test/o/oauth2/v2/auth?client_id=test".into())
    }

    async fn verify(&self, token: &str) -> ClickerResult<VerifyResponse> {
        if self.unreachable {
            return Err(ClickerError::Status { endpoint: "auth".into(), status: 503 });
        }
        let valid = self.valid_tokens.iter().any(|t| t == token);
        Ok(VerifyResponse {
            valid,
            user_id: valid.then_some(7),
            email:   valid.then(|| "player@example.test".to_string()),
        })
    }
}

/// Remote progress store backed by a single JSON slot.
#[derive(Default)]
pub struct FakeProgressStore {
    pub saved:       Mutex<Option<serde_json::Value>>,
    pub fail_fetch:  bool,
    pub fail_push:   Mutex<bool>,
    pub push_count:  AtomicUsize,
    pub fetch_count: AtomicUsize,
    /// When set, `push` signals `push_started` and then waits on this.
    pub push_gate:    Option<Arc<Notify>>,
    pub push_started: Arc<Notify>,
    /// Every completed remote call in order: `fetch` or `push:<totalClicks>`.
    pub ops:          Mutex<Vec<String>>,
}

impl FakeProgressStore {
    pub fn with_body(body: serde_json::Value) -> Self {
        Self { saved: Mutex::new(Some(body)), ..Self::default() }
    }

    pub fn saved(&self) -> Option<serde_json::Value> {
        self.saved.lock().unwrap().clone()
    }

    pub fn pushes(&self) -> usize {
        self.push_count.load(Ordering::SeqCst)
    }

    pub fn ops(&self) -> Vec<String> {
        self.ops.lock().unwrap().clone()
    }
}

#[async_trait]
impl clicker_core::sync::ProgressStore for FakeProgressStore {
    async fn fetch(&self, _token: &str) -> ClickerResult<serde_json::Value> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        self.ops.lock().unwrap().push("fetch".into());
        if self.fail_fetch {
            return Err(ClickerError::Status { endpoint: "progress".into(), status: 500 });
        }
        Ok(self.saved().unwrap_or_else(|| serde_json::json!({})))
    }

    async fn push(&self, _token: &str, state: &GameState) -> ClickerResult<()> {
        if let Some(gate) = &self.push_gate {
            self.push_started.notify_one();
            gate.notified().await;
        }
        if *self.fail_push.lock().unwrap() {
            return Err(ClickerError::Status { endpoint: "progress".into(), status: 502 });
        }
        *self.saved.lock().unwrap() = Some(serde_json::to_value(state)?);
        self.ops.lock().unwrap().push(format!("push:{}", state.total_clicks));
        self.push_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Records every hook call as a short string.
#[derive(Default)]
pub struct RecordingHooks {
    pub calls: Mutex<Vec<String>>,
}

impl RecordingHooks {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl GameHooks for RecordingHooks {
    fn on_click(&self) {
        self.calls.lock().unwrap().push("click".into());
    }

    fn on_level_up(&self, level: Level, multiplier: f64) {
        self.calls.lock().unwrap().push(format!("level:{level}:{multiplier}"));
    }

    fn on_achievement_unlocked(&self, achievement: &Achievement) {
        self.calls.lock().unwrap().push(format!("achievement:{}", achievement.id));
    }

    fn on_purchase(&self, item: &Purchase) {
        self.calls.lock().unwrap().push(format!("purchase:{}", item.name()));
    }
}

/// Panics on every click.
pub struct PanickingHooks;

impl GameHooks for PanickingHooks {
    fn on_click(&self) {
        panic!("speaker unplugged");
    }
}
