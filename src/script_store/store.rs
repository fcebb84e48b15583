use super::models::{NewSession, StoredSession};
use super::schema::{
    CONTENT_SESSIONS_TABLE_V_0, SCRIPT_STORE_VERSIONED_SCHEMAS, SONG_ANALYSES_TABLE_V_0,
};
use super::trait_def::{SessionStore, SongAnalysisCache};
use crate::analysis::{ContentAnalysis, SongAnalysis};
use crate::content::ContentKind;
use crate::sqlite_persistence::BASE_DB_VERSION;
use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::info;

/// SQLite-backed song cache and session history.
///
/// Reads and writes go through separate connections so that list queries do
/// not wait behind a pending insert.
#[derive(Clone)]
pub struct SqliteScriptStore {
    read_conn: Arc<Mutex<Connection>>,
    write_conn: Arc<Mutex<Connection>>,
}

impl SqliteScriptStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let path = db_path.as_ref();

        let write_conn = if path.exists() {
            Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_WRITE
                    | OpenFlags::SQLITE_OPEN_URI
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
            .with_context(|| format!("Failed to open script store at {:?}", path))?
        } else {
            info!("Creating new script store at {:?}", path);
            let conn = Connection::open(path)
                .with_context(|| format!("Failed to create script store at {:?}", path))?;
            SCRIPT_STORE_VERSIONED_SCHEMAS
                .last()
                .context("No script store schema defined")?
                .create(&conn)?;
            conn
        };
        write_conn.pragma_update(None, "journal_mode", "WAL")?;

        let db_version = write_conn
            .query_row("PRAGMA user_version;", [], |row| row.get::<usize, i64>(0))
            .context("Failed to read script store version")?
            - BASE_DB_VERSION as i64;

        if db_version < 0 {
            bail!(
                "Script store version {} is too old, does not contain base db version {}",
                db_version,
                BASE_DB_VERSION
            );
        }
        let version = db_version as usize;
        SCRIPT_STORE_VERSIONED_SCHEMAS
            .get(version)
            .with_context(|| format!("Script store version {} is too new", version))?
            .validate(&write_conn)?;

        Self::migrate_if_needed(&write_conn, version)?;

        let read_conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .context("Failed to open script store read connection")?;

        Ok(Self {
            read_conn: Arc::new(Mutex::new(read_conn)),
            write_conn: Arc::new(Mutex::new(write_conn)),
        })
    }

    fn migrate_if_needed(conn: &Connection, version: usize) -> Result<()> {
        let mut latest_from = version;
        for schema in SCRIPT_STORE_VERSIONED_SCHEMAS.iter().skip(version + 1) {
            if let Some(migration_fn) = schema.migration {
                info!(
                    "Migrating script store from version {} to {}",
                    latest_from, schema.version
                );
                migration_fn(conn)?;
                latest_from = schema.version;
            }
        }
        conn.execute(
            &format!("PRAGMA user_version = {}", BASE_DB_VERSION + latest_from),
            [],
        )?;
        Ok(())
    }

    fn row_to_session(row: &rusqlite::Row) -> rusqlite::Result<StoredSession> {
        let content_type: String = row.get("content_type")?;
        let content_analysis: String = row.get("content_analysis")?;
        let song_analysis: String = row.get("song_analysis")?;

        Ok(StoredSession {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            content_source: row.get("content_source")?,
            content_type: ContentKind::parse(Some(&content_type)).unwrap_or(ContentKind::Manual),
            content_analysis: serde_json::from_str::<ContentAnalysis>(&content_analysis)
                .unwrap_or_else(|_| ContentAnalysis::fallback()),
            artist: row.get("artist")?,
            song_title: row.get("song_title")?,
            song_analysis: serde_json::from_str::<SongAnalysis>(&song_analysis)
                .unwrap_or_else(|_| SongAnalysis::fallback()),
            selected_style: row.get("selected_style")?,
            short_script: row.get("short_script")?,
            long_script: row.get("long_script")?,
            created_at: row.get("created_at")?,
        })
    }
}

impl SongAnalysisCache for SqliteScriptStore {
    fn get(&self, artist: &str, title: &str) -> Result<Option<SongAnalysis>> {
        let conn = self.read_conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT analysis FROM {} WHERE artist = ?1 AND title = ?2",
            SONG_ANALYSES_TABLE_V_0.name
        ))?;
        let json: Option<String> = stmt
            .query_row(params![artist, title], |row| row.get(0))
            .optional()?;

        json.map(|json| {
            serde_json::from_str(&json)
                .with_context(|| format!("Corrupt cached analysis for {} - {}", artist, title))
        })
        .transpose()
    }

    fn put(&self, artist: &str, title: &str, analysis: &SongAnalysis) -> Result<()> {
        let json = serde_json::to_string(analysis)?;
        let conn = self.write_conn.lock().unwrap();
        conn.execute(
            &format!(
                "INSERT OR REPLACE INTO {} (artist, title, analysis) VALUES (?1, ?2, ?3)",
                SONG_ANALYSES_TABLE_V_0.name
            ),
            params![artist, title, json],
        )
        .with_context(|| format!("Failed to cache analysis for {} - {}", artist, title))?;
        Ok(())
    }
}

impl SessionStore for SqliteScriptStore {
    fn insert(&self, session: &NewSession) -> Result<String> {
        let id = uuid::Uuid::new_v4().to_string();
        let content_analysis = serde_json::to_string(&session.content_analysis)?;
        let song_analysis = serde_json::to_string(&session.song_analysis)?;
        let created_at = chrono::Utc::now().timestamp();

        let conn = self.write_conn.lock().unwrap();
        conn.execute(
            &format!(
                "INSERT INTO {} (id, user_id, content_source, content_type, content_analysis, \
                 artist, song_title, song_analysis, selected_style, short_script, long_script, \
                 created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                CONTENT_SESSIONS_TABLE_V_0.name
            ),
            params![
                id,
                session.user_id,
                session.content_source,
                session.content_type.as_str(),
                content_analysis,
                session.artist,
                session.song_title,
                song_analysis,
                session.selected_style,
                session.short_script,
                session.long_script,
                created_at,
            ],
        )
        .context("Failed to insert content session")?;
        Ok(id)
    }

    fn get_session(&self, user_id: &str, session_id: &str) -> Result<Option<StoredSession>> {
        let conn = self.read_conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT * FROM {} WHERE id = ?1 AND user_id = ?2",
            CONTENT_SESSIONS_TABLE_V_0.name
        ))?;
        Ok(stmt
            .query_row(params![session_id, user_id], Self::row_to_session)
            .optional()?)
    }

    fn get_user_sessions(&self, user_id: &str, limit: usize) -> Result<Vec<StoredSession>> {
        let conn = self.read_conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT * FROM {} WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC LIMIT ?2",
            CONTENT_SESSIONS_TABLE_V_0.name
        ))?;
        let sessions = stmt
            .query_map(params![user_id, limit as i64], Self::row_to_session)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(sessions)
    }
}
