use crate::{catalog::Catalog, scheduler};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_PROGRESS_URL: &str = "http://localhost:8080/progress";
pub const DEFAULT_AUTH_URL: &str = "http://localhost:8080/auth";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickerConfig {
    #[serde(default)]
    pub catalog: Catalog,
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default = "default_save_interval_ms")]
    pub save_interval_ms: u64,
    #[serde(default = "default_progress_url")]
    pub progress_url: String,
    #[serde(default = "default_auth_url")]
    pub auth_url: String,
    /// Capacity of the session's command queue.
    #[serde(default = "default_command_buffer")]
    pub command_buffer: usize,
}

impl ClickerConfig {
    /// Compiled-in defaults.
    pub fn builtin() -> Self {
        Self {
            catalog:          Catalog::builtin(),
            tick_interval_ms: default_tick_interval_ms(),
            save_interval_ms: default_save_interval_ms(),
            progress_url:     default_progress_url(),
            auth_url:         default_auth_url(),
            command_buffer:   default_command_buffer(),
        }
    }

    /// Load from a JSON file. Missing keys fall back to the builtin values.
    /// In tests, use ClickerConfig::default_test().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.catalog.validate()?;
        if config.tick_interval_ms == 0 || config.save_interval_ms == 0 {
            anyhow::bail!("{path}: timer intervals must be positive");
        }
        Ok(config)
    }

    /// Builtin catalog with short timers, for unit tests.
    pub fn default_test() -> Self {
        Self {
            tick_interval_ms: 10,
            save_interval_ms: 50,
            command_buffer:   16,
            ..Self::builtin()
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn save_interval(&self) -> Duration {
        Duration::from_millis(self.save_interval_ms)
    }
}

impl Default for ClickerConfig {
    fn default() -> Self { Self::builtin() }
}

fn default_tick_interval_ms() -> u64 { scheduler::TICK_INTERVAL.as_millis() as u64 }
fn default_save_interval_ms() -> u64 { scheduler::SAVE_INTERVAL.as_millis() as u64 }
fn default_progress_url() -> String { DEFAULT_PROGRESS_URL.into() }
fn default_auth_url() -> String { DEFAULT_AUTH_URL.into() }
fn default_command_buffer() -> usize { 64 }
