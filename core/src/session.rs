//! The game session: single writer for the game state.
//!
//! RULE: Only the session task touches the engine. Player input, the
//! passive-income timer and the sync client all go through a
//! `SessionHandle`, whose requests queue on one channel and run to
//! completion one at a time. A buy therefore always sees every tick and
//! click committed before it, and hooks for an operation fire before the
//! next request is even looked at.

use crate::{
    command::GameCommand,
    engine::GameEngine,
    error::{ClickerError, ClickerResult},
    event::GameEvent,
    hooks::{self, GameHooks},
    state::{GameState, GameView, ProgressSnapshot},
    types::Generation,
};
use std::sync::Arc;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};

/// A copy of the state, tagged with the generation it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub generation: Generation,
    pub state:      GameState,
}

enum SessionRequest {
    Command {
        command: GameCommand,
        reply:   oneshot::Sender<Vec<GameEvent>>,
    },
    Load {
        snapshot: ProgressSnapshot,
        reply:    oneshot::Sender<Generation>,
    },
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    View {
        reply: oneshot::Sender<GameView>,
    },
    Shutdown,
}

pub struct GameSession {
    engine:     GameEngine,
    hooks:      Arc<dyn GameHooks>,
    generation: Generation,
    requests:   mpsc::Receiver<SessionRequest>,
}

impl GameSession {
    /// Start the session task. It runs until every handle is dropped or
    /// `shutdown` is called, then yields the engine back.
    pub fn spawn(
        engine: GameEngine,
        hooks: Arc<dyn GameHooks>,
        buffer: usize,
    ) -> (SessionHandle, JoinHandle<GameEngine>) {
        let (sender, requests) = mpsc::channel(buffer.max(1));
        let session = Self { engine, hooks, generation: 0, requests };
        let task = tokio::spawn(session.run());
        (SessionHandle { sender }, task)
    }

    async fn run(mut self) -> GameEngine {
        log::debug!("game session started");
        while let Some(request) = self.requests.recv().await {
            match request {
                SessionRequest::Command { command, reply } => {
                    let events = self.engine.apply(&command);
                    hooks::dispatch(self.hooks.as_ref(), &events);
                    let _ = reply.send(events);
                }
                SessionRequest::Load { snapshot, reply } => {
                    let mut events = self.engine.load(snapshot);
                    self.generation += 1;
                    events.insert(0, GameEvent::StateReplaced { generation: self.generation });
                    hooks::dispatch(self.hooks.as_ref(), &events);
                    log::info!(
                        "state replaced from remote snapshot (generation {}, {:.0} points)",
                        self.generation,
                        self.engine.state().points
                    );
                    let _ = reply.send(self.generation);
                }
                SessionRequest::Snapshot { reply } => {
                    let _ = reply.send(SessionSnapshot {
                        generation: self.generation,
                        state:      self.engine.state().clone(),
                    });
                }
                SessionRequest::View { reply } => {
                    let _ = reply.send(self.engine.view());
                }
                SessionRequest::Shutdown => break,
            }
        }
        log::debug!("game session stopped");
        self.engine
    }
}

/// Cloneable front door to a running session.
#[derive(Clone)]
pub struct SessionHandle {
    sender: mpsc::Sender<SessionRequest>,
}

impl SessionHandle {
    /// Queue a command and wait until it has committed.
    pub async fn execute(&self, command: GameCommand) -> ClickerResult<Vec<GameEvent>> {
        let (reply, rx) = oneshot::channel();
        self.request(SessionRequest::Command { command, reply }, rx).await
    }

    pub async fn click(&self) -> ClickerResult<Vec<GameEvent>> {
        self.execute(GameCommand::Click).await
    }

    pub async fn buy_upgrade(&self, id: &str) -> ClickerResult<Vec<GameEvent>> {
        self.execute(GameCommand::BuyUpgrade { id: id.into() }).await
    }

    pub async fn buy_skin(&self, id: &str) -> ClickerResult<Vec<GameEvent>> {
        self.execute(GameCommand::BuySkin { id: id.into() }).await
    }

    pub async fn select_skin(&self, id: &str) -> ClickerResult<Vec<GameEvent>> {
        self.execute(GameCommand::SelectSkin { id: id.into() }).await
    }

    pub async fn tick(&self) -> ClickerResult<Vec<GameEvent>> {
        self.execute(GameCommand::Tick).await
    }

    /// Overwrite the whole state. Returns the new generation.
    pub async fn load(&self, snapshot: ProgressSnapshot) -> ClickerResult<Generation> {
        let (reply, rx) = oneshot::channel();
        self.request(SessionRequest::Load { snapshot, reply }, rx).await
    }

    pub async fn snapshot(&self) -> ClickerResult<SessionSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.request(SessionRequest::Snapshot { reply }, rx).await
    }

    pub async fn view(&self) -> ClickerResult<GameView> {
        let (reply, rx) = oneshot::channel();
        self.request(SessionRequest::View { reply }, rx).await
    }

    /// Ask the session to stop after the requests already queued.
    pub async fn shutdown(&self) {
        let _ = self.sender.send(SessionRequest::Shutdown).await;
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    async fn request<T>(
        &self,
        request: SessionRequest,
        rx: oneshot::Receiver<T>,
    ) -> ClickerResult<T> {
        self.sender
            .send(request)
            .await
            .map_err(|_| ClickerError::SessionClosed)?;
        rx.await.map_err(|_| ClickerError::SessionClosed)
    }
}
