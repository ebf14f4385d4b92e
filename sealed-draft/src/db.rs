// SQLite persistence layer for draft state and tally exports.

use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::draft::state::DraftState;

/// Storage seam for the current draft.
///
/// The session only ever talks to this trait, so tests and alternative hosts
/// can swap the SQLite store out.
pub trait DraftStore: Send + Sync {
    /// Persist `state`, replacing whatever was saved before.
    fn save(&self, state: &DraftState) -> Result<()>;
    /// The last saved draft, if any.
    fn load(&self) -> Result<Option<DraftState>>;
    /// Forget the saved draft.
    fn clear(&self) -> Result<()>;
    /// Remember which draft the saved state belongs to.
    fn set_draft_id(&self, draft_id: &str) -> Result<()>;
}

/// A tally export recorded in the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRecord {
    pub draft_id: String,
    pub text: String,
    pub timestamp: String,
}

/// SQLite-backed persistence for the in-progress draft (key-value) and the
/// history of exported tallies.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open the database at `path`, creating the schema on first use.
    /// `":memory:"` gives a throwaway database.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS draft_state (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS exports (
                id        INTEGER PRIMARY KEY AUTOINCREMENT,
                draft_id  TEXT NOT NULL DEFAULT '',
                text      TEXT NOT NULL,
                timestamp TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );

            CREATE INDEX IF NOT EXISTS idx_exports_draft_id ON exports(draft_id);
            ",
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Lock the connection. Panics only if a previous holder panicked.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    /// Hold the connection lock, standing in for a stalled disk.
    #[cfg(test)]
    pub(crate) fn hold_connection(&self) -> MutexGuard<'_, Connection> {
        self.conn()
    }

    /// Store `value` as JSON under `key`, replacing any previous value.
    fn put_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)
            .with_context(|| format!("failed to serialize `{key}`"))?;
        self.conn()
            .execute(
                "INSERT INTO draft_state (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, json],
            )
            .with_context(|| format!("failed to write `{key}`"))?;
        Ok(())
    }

    /// Read the JSON stored under `key`. `None` when the key was never set.
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let json: Option<String> = self
            .conn()
            .query_row(
                "SELECT value FROM draft_state WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("failed to read `{key}`"))?;

        json.map(|json| {
            serde_json::from_str(&json)
                .with_context(|| format!("stored `{key}` does not match the current format"))
        })
        .transpose()
    }

    // ------------------------------------------------------------------
    // Current draft
    // ------------------------------------------------------------------

    const DRAFT_KEY: &'static str = "current_draft";
    const DRAFT_ID_KEY: &'static str = "current_draft_id";

    /// Store the full draft state, undo snapshot included.
    pub fn save_draft(&self, state: &DraftState) -> Result<()> {
        self.put_json(Self::DRAFT_KEY, state)
    }

    pub fn load_draft(&self) -> Result<Option<DraftState>> {
        self.get_json(Self::DRAFT_KEY)
    }

    /// Forget the saved draft and its id. Export history stays.
    pub fn clear_draft(&self) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin transaction")?;
        tx.execute(
            "DELETE FROM draft_state WHERE key IN (?1, ?2)",
            params![Self::DRAFT_KEY, Self::DRAFT_ID_KEY],
        )
        .context("failed to delete saved draft")?;
        tx.commit().context("failed to commit draft removal")?;
        Ok(())
    }

    pub fn get_draft_id(&self) -> Result<Option<String>> {
        self.get_json(Self::DRAFT_ID_KEY)
    }

    pub fn set_draft_id(&self, draft_id: &str) -> Result<()> {
        self.put_json(Self::DRAFT_ID_KEY, draft_id)
    }

    /// A fresh id from the current UTC time, e.g. `draft_20261019_143022_123`.
    pub fn generate_draft_id() -> String {
        chrono::Utc::now()
            .format("draft_%Y%m%d_%H%M%S_%3f")
            .to_string()
    }

    // ------------------------------------------------------------------
    // Exports
    // ------------------------------------------------------------------

    /// Append an exported tally to the history of `draft_id`.
    pub fn record_export(&self, draft_id: &str, text: &str) -> Result<()> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO exports (draft_id, text) VALUES (?1, ?2)",
            params![draft_id, text],
        )
        .context("failed to record export")?;
        Ok(())
    }

    /// All exports for `draft_id`, oldest first.
    pub fn load_exports(&self, draft_id: &str) -> Result<Vec<ExportRecord>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT draft_id, text, timestamp FROM exports
                 WHERE draft_id = ?1 ORDER BY id",
            )
            .context("failed to prepare load_exports query")?;

        let exports = stmt
            .query_map(params![draft_id], |row| {
                Ok(ExportRecord {
                    draft_id: row.get(0)?,
                    text: row.get(1)?,
                    timestamp: row.get(2)?,
                })
            })
            .context("failed to query exports")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map export rows")?;

        Ok(exports)
    }
}

impl DraftStore for Database {
    fn save(&self, state: &DraftState) -> Result<()> {
        self.save_draft(state)
    }

    fn load(&self) -> Result<Option<DraftState>> {
        self.load_draft()
    }

    fn clear(&self) -> Result<()> {
        self.clear_draft()
    }

    fn set_draft_id(&self, draft_id: &str) -> Result<()> {
        Database::set_draft_id(self, draft_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::card::{Card, Color, Rarity};
    use serde_json::json;

    fn test_db() -> Database {
        Database::open(":memory:").unwrap()
    }

    fn test_pool() -> Vec<Card> {
        (0..20)
            .map(|i| Card {
                id: i.to_string(),
                full_name: format!("Card {i}"),
                color: Color::ALL[i % 6],
                cost: Some(3),
                rarity: Some(Rarity::Rare),
                image: None,
            })
            .collect()
    }

    #[test]
    fn schema_has_state_and_export_tables() {
        let db = test_db();
        let count: i64 = db
            .conn()
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master
                 WHERE type = 'table' AND name IN ('draft_state', 'exports')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn stored_values_are_replaced() {
        let db = test_db();
        db.set_draft_id("draft_a").unwrap();
        db.set_draft_id("draft_b").unwrap();
        assert_eq!(db.get_draft_id().unwrap().as_deref(), Some("draft_b"));
    }

    // ------------------------------------------------------------------
    // Draft state
    // ------------------------------------------------------------------

    #[test]
    fn draft_round_trip_keeps_undo_snapshot() {
        let db = test_db();
        let state = DraftState::initialize(test_pool());
        let picked = state.pick(0).unwrap();

        db.save_draft(&picked).unwrap();
        let loaded = db.load_draft().unwrap().expect("draft should be stored");

        assert_eq!(loaded, picked);
        assert_eq!(loaded.undo().unwrap(), state);
    }

    #[test]
    fn load_draft_is_none_on_empty_db() {
        let db = test_db();
        assert!(db.load_draft().unwrap().is_none());
    }

    #[test]
    fn load_draft_rejects_foreign_json() {
        let db = test_db();
        db.put_json(Database::DRAFT_KEY, &json!({"not": "a draft"}))
            .unwrap();
        assert!(db.load_draft().is_err());
    }

    #[test]
    fn clear_draft_removes_state_but_keeps_exports() {
        let db = test_db();
        db.save_draft(&DraftState::initialize(test_pool())).unwrap();
        db.set_draft_id("draft_a").unwrap();
        db.record_export("draft_a", "1 Card 0").unwrap();

        db.clear_draft().unwrap();

        assert!(db.load_draft().unwrap().is_none());
        assert!(db.get_draft_id().unwrap().is_none());
        assert_eq!(db.load_exports("draft_a").unwrap().len(), 1);
    }

    #[test]
    fn new_draft_keeps_old_exports() {
        let db = test_db();
        db.set_draft_id("draft_a").unwrap();
        db.record_export("draft_a", "1 Card 0").unwrap();

        db.save_draft(&DraftState::initialize(test_pool())).unwrap();
        db.set_draft_id("draft_b").unwrap();

        assert_eq!(db.load_exports("draft_a").unwrap().len(), 1);
        assert!(db.load_exports("draft_b").unwrap().is_empty());
    }

    #[test]
    fn store_trait_delegates_to_database() {
        let db = test_db();
        let store: &dyn DraftStore = &db;
        let state = DraftState::initialize(test_pool());
        assert_eq!(store.load().unwrap(), None);
        store.save(&state).unwrap();
        store.set_draft_id("draft_a").unwrap();
        assert_eq!(store.load().unwrap(), Some(state));
        assert_eq!(db.get_draft_id().unwrap().as_deref(), Some("draft_a"));
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn draft_id_round_trip() {
        let db = test_db();
        assert!(db.get_draft_id().unwrap().is_none());
        db.set_draft_id("draft_20261019_120000_000").unwrap();
        assert_eq!(
            db.get_draft_id().unwrap().as_deref(),
            Some("draft_20261019_120000_000")
        );
    }

    #[test]
    fn generated_draft_id_has_expected_shape() {
        let id = Database::generate_draft_id();
        assert!(id.starts_with("draft_"));
        assert_eq!(id.len(), "draft_20261019_143022_123".len());
    }

    // ------------------------------------------------------------------
    // Exports
    // ------------------------------------------------------------------

    #[test]
    fn exports_are_scoped_and_ordered() {
        let db = test_db();
        db.record_export("draft_a", "2 Card A").unwrap();
        db.record_export("draft_b", "1 Card B").unwrap();
        db.record_export("draft_a", "3 Card A").unwrap();

        let exports = db.load_exports("draft_a").unwrap();
        assert_eq!(exports.len(), 2);
        assert_eq!(exports[0].text, "2 Card A");
        assert_eq!(exports[1].text, "3 Card A");
        assert!(exports[0].timestamp.contains('T'));
        assert!(exports.iter().all(|e| e.draft_id == "draft_a"));
    }
}
