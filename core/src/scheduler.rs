//! Recurring timers.
//!
//! Timers never mutate game state themselves; they only enqueue commands on
//! the session. A `RecurringTask` is aborted when stopped or dropped, so a
//! torn-down runtime leaves no timer behind.

use crate::session::SessionHandle;
use std::{future::Future, time::Duration};
use tokio::{
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};

/// Passive income cadence.
pub const TICK_INTERVAL: Duration = Duration::from_millis(1_000);

/// Periodic save cadence.
pub const SAVE_INTERVAL: Duration = Duration::from_millis(5_000);

pub struct RecurringTask {
    name:   &'static str,
    handle: JoinHandle<()>,
}

impl RecurringTask {
    /// Run `step` every `period`, first firing one period from now.
    /// The loop ends early when `step` returns `false`.
    pub fn spawn<F, Fut>(name: &'static str, period: Duration, mut step: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if !step().await {
                    log::debug!("recurring task '{name}' finished");
                    break;
                }
            }
        });
        log::debug!("recurring task '{name}' started ({period:?})");
        Self { name, handle }
    }

    pub fn name(&self) -> &'static str { self.name }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Abort and wait until the task is gone, so a step that was mid-flight
    /// can no longer act.
    pub async fn stop(mut self) {
        self.handle.abort();
        let _ = (&mut self.handle).await;
    }
}

impl Drop for RecurringTask {
    fn drop(&mut self) {
        self.handle.abort();
        log::debug!("recurring task '{}' cancelled", self.name);
    }
}

/// Feeds one `Tick` into the session per interval.
///
/// Ticking runs at a fixed phase for the whole session; the engine treats a
/// tick at zero income as a no-op, so rate changes need no restart. `restart`
/// exists for callers that want to re-phase anyway.
pub struct PassiveIncomeScheduler {
    session: SessionHandle,
    period:  Duration,
    task:    Option<RecurringTask>,
}

impl PassiveIncomeScheduler {
    pub fn new(session: SessionHandle, period: Duration) -> Self {
        Self { session, period, task: None }
    }

    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        let session = self.session.clone();
        self.task = Some(RecurringTask::spawn("passive_income", self.period, move || {
            let session = session.clone();
            async move { session.tick().await.is_ok() }
        }));
    }

    /// Cancel the current timer and start a fresh one.
    pub fn restart(&mut self) {
        self.stop();
        self.start();
    }

    pub fn stop(&mut self) {
        self.task = None;
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}
