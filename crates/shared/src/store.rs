use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

use crate::models::{EpisodeRecord, NewEpisode};

const EPISODE_COLUMNS: &str = "id, topics, duration, depth, script, mp3_file, created_at";

pub struct EpisodeStore {
    conn: Connection,
}

impl EpisodeStore {
    /// Open (or create) the database file and make sure the schema exists
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create database directory {}", parent.display())
            })?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Open a database that must already exist. Returns `None` instead of
    /// creating a missing file.
    pub fn open_existing(path: &Path) -> Result<Option<Self>> {
        if !path.is_file() {
            return Ok(None);
        }
        Self::open(path).map(Some)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    pub fn migrate(&self) -> Result<()> {
        self.conn
            .execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS episodes (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    topics TEXT,
                    duration INTEGER,
                    depth TEXT,
                    script TEXT,
                    mp3_file TEXT,
                    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
                );
                "#,
            )
            .context("Failed to create episodes table")?;
        Ok(())
    }

    /// Insert one episode and return its id
    pub fn insert(&self, episode: &NewEpisode) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO episodes (topics, duration, depth, script, mp3_file) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    episode.topics,
                    episode.duration,
                    episode.depth.as_str(),
                    episode.script,
                    episode.mp3_file
                ],
            )
            .context("Failed to save episode")?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get(&self, id: i64) -> Result<Option<EpisodeRecord>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM episodes WHERE id = ?1", EPISODE_COLUMNS),
                params![id],
                episode_from_row,
            )
            .optional()
            .with_context(|| format!("Failed to load episode {}", id))
    }

    /// Newest episodes first
    pub fn list_recent(&self, limit: usize) -> Result<Vec<EpisodeRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM episodes ORDER BY created_at DESC, id DESC LIMIT ?1",
            EPISODE_COLUMNS
        ))?;
        let rows = stmt.query_map(params![limit as i64], episode_from_row)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

fn episode_from_row(row: &Row<'_>) -> rusqlite::Result<EpisodeRecord> {
    Ok(EpisodeRecord {
        id: row.get(0)?,
        topics: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        duration: row.get::<_, Option<u32>>(2)?.unwrap_or_default(),
        depth: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        script: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        mp3_file: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
        created_at: row.get(6)?,
    })
}
