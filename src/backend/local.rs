use super::{LeaderboardEntry, Profile, SaveStatus, ScoreBackend, LEADERBOARD_SIZE};
use crate::app_dirs::AppDirs;
use anyhow::{anyhow, Context};
use chrono::Local;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Best scores kept in a SQLite file, one row per player name
#[derive(Debug)]
pub struct LocalBackend {
    conn: Mutex<Connection>,
    profile: String,
}

impl LocalBackend {
    /// Open the store under $HOME/.local/state/typesprint
    pub fn open(profile: &str) -> anyhow::Result<Self> {
        let db_path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("typesprint_scores.db"));
        Self::open_at(&db_path, profile)
    }

    pub fn open_at(path: &Path, profile: &str) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open score db {}", path.display()))?;
        Self::with_connection(conn, profile)
    }

    pub fn in_memory(profile: &str) -> anyhow::Result<Self> {
        Self::with_connection(Connection::open_in_memory()?, profile)
    }

    fn with_connection(conn: Connection, profile: &str) -> anyhow::Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS scores (
                username TEXT PRIMARY KEY,
                highest_wpm INTEGER NOT NULL DEFAULT 0,
                updated_at TEXT NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_scores_highest_wpm ON scores(highest_wpm)",
            [],
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
            profile: profile.to_string(),
        })
    }

    fn conn(&self) -> anyhow::Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("score db connection poisoned"))
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub fn highest_wpm(&self, username: &str) -> anyhow::Result<Option<u32>> {
        let conn = self.conn()?;
        let wpm = conn
            .query_row(
                "SELECT highest_wpm FROM scores WHERE username = ?1",
                [username],
                |row| row.get(0),
            )
            .optional()?;
        Ok(wpm)
    }

    /// Raise `username`'s record to `wpm` if it is better; returns whether it changed
    pub fn record(&self, username: &str, wpm: u32) -> anyhow::Result<bool> {
        let conn = self.conn()?;
        let changed = conn.execute(
            r#"
            INSERT INTO scores (username, highest_wpm, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(username) DO UPDATE SET
                highest_wpm = excluded.highest_wpm,
                updated_at = excluded.updated_at
            WHERE excluded.highest_wpm > scores.highest_wpm
            "#,
            params![username, wpm, Local::now().to_rfc3339()],
        )?;
        Ok(changed > 0)
    }
}

impl ScoreBackend for LocalBackend {
    fn me(&self) -> anyhow::Result<Profile> {
        let best = self.highest_wpm(&self.profile)?.unwrap_or(0);
        Ok(Profile::user(self.profile.clone(), best))
    }

    fn save_score(&self, wpm: u32) -> anyhow::Result<SaveStatus> {
        self.record(&self.profile, wpm)?;
        Ok(SaveStatus::Saved)
    }

    fn leaderboard(&self) -> anyhow::Result<Vec<LeaderboardEntry>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT username, highest_wpm
            FROM scores
            WHERE highest_wpm > 0
            ORDER BY highest_wpm DESC, username ASC
            LIMIT ?1
            "#,
        )?;

        let rows = stmt.query_map([LEADERBOARD_SIZE as i64], |row| {
            Ok(LeaderboardEntry {
                username: row.get(0)?,
                highest_wpm: row.get(1)?,
            })
        })?;

        let mut entries = Vec::new();
        for entry in rows {
            entries.push(entry?);
        }
        Ok(entries)
    }

    fn logout(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
