//! SQLite persistence for client-side credentials.
//!
//! RULE: Only store.rs talks to the database.
//! The auth session calls store methods; it never executes SQL directly.

use crate::error::ClickerResult;
use rusqlite::{params, Connection, OptionalExtension};

/// Fixed slot the bearer token is kept under.
pub const AUTH_TOKEN_KEY: &str = "auth_token";

pub struct CredentialStore {
    conn: Connection,
}

impl CredentialStore {
    /// Open (or create) the credential database at `path`.
    pub fn open(path: &str) -> ClickerResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode only matters for real files; :memory: ignores it.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> ClickerResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> ClickerResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_credentials.sql"))?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> ClickerResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM credential WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn put(&self, key: &str, value: &str) -> ClickerResult<()> {
        self.conn.execute(
            "INSERT INTO credential (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, chrono::Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Remove a slot. Returns whether anything was stored there.
    pub fn remove(&self, key: &str) -> ClickerResult<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM credential WHERE key = ?1", params![key])?;
        Ok(removed > 0)
    }

    // ── Auth token slot ────────────────────────────────────────

    pub fn token(&self) -> ClickerResult<Option<String>> {
        self.get(AUTH_TOKEN_KEY)
    }

    pub fn set_token(&self, token: &str) -> ClickerResult<()> {
        self.put(AUTH_TOKEN_KEY, token)
    }

    pub fn clear_token(&self) -> ClickerResult<bool> {
        self.remove(AUTH_TOKEN_KEY)
    }
}
