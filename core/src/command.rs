use crate::types::CatalogId;
use serde::{Deserialize, Serialize};

/// Every state transition the player (or a timer) can request.
/// All of them travel through the session's single command stream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum GameCommand {
    // ── Player actions ────────────────────────────
    Click,
    BuyUpgrade { id: CatalogId },
    BuySkin { id: CatalogId },
    SelectSkin { id: CatalogId },

    // ── Timers ────────────────────────────────────
    Tick,
}

impl GameCommand {
    /// Stable name used in log lines.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Click             => "click",
            Self::BuyUpgrade { .. } => "buy_upgrade",
            Self::BuySkin { .. }    => "buy_skin",
            Self::SelectSkin { .. } => "select_skin",
            Self::Tick              => "tick",
        }
    }
}
