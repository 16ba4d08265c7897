//! Session storage implementation.
//!
//! Provides SQLite-backed storage for tutor sessions, with a broadcast
//! change channel that live queries subscribe to.

use std::fs;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Local;
use rusqlite::{params, Connection, OptionalExtension, Row};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::debug;

use tinytutor_core::{TopicContent, TutorSession};

use crate::codec;

/// Errors that can occur during session storage operations.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Session not found: {0}")]
    NotFound(i64),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Storage path error: {0}")]
    PathError(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

impl From<StoreError> for tinytutor_core::Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => tinytutor_core::Error::NotFound(id),
            StoreError::Validation(msg) => tinytutor_core::Error::Validation(msg),
            other => tinytutor_core::Error::Storage(other.to_string()),
        }
    }
}

/// Change notification emitted after every successful mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    Inserted(i64),
    Updated(i64),
    Deleted(i64),
    Touched(i64),
}

/// Session storage trait for abstraction over storage backends.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert a session, assigning a fresh id. Returns the assigned id.
    ///
    /// Fails with [`StoreError::Validation`] when the topic is blank.
    async fn insert(&self, session: &TutorSession) -> Result<i64>;

    /// Point lookup by id. An absent id yields `Ok(None)`, never an error.
    async fn get(&self, id: i64) -> Result<Option<TutorSession>>;

    /// Replace the stored record matching `session.id`.
    ///
    /// Fails with [`StoreError::NotFound`] when the id is absent. The
    /// whole row is rewritten, so the generated content trio always
    /// lands together.
    async fn update(&self, session: &TutorSession) -> Result<()>;

    /// Remove a session by id. Silently succeeds when the id is absent.
    async fn delete(&self, id: i64) -> Result<()>;

    /// Refresh `last_accessed_at` to now.
    async fn touch(&self, id: i64) -> Result<()>;

    /// All sessions, most recently accessed first. Ties broken by id
    /// descending, so repeated reads of unchanged data are stable.
    async fn list_all(&self) -> Result<Vec<TutorSession>>;

    /// Sessions whose topic contains `query` as an ASCII
    /// case-insensitive substring (SQLite `LIKE` semantics, with `%`
    /// and `_` in the query escaped and matched literally). Same
    /// ordering as [`SessionStore::list_all`].
    async fn search(&self, query: &str) -> Result<Vec<TutorSession>>;

    /// Subscribe to change notifications.
    fn subscribe(&self) -> broadcast::Receiver<StoreEvent>;
}

/// Raw column tuple, decoded outside the rusqlite row closure.
type RawSessionRow = (
    i64,
    String,
    String,
    String,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
);

const SESSION_COLUMNS: &str = "id, topic, created_at, last_accessed_at, language, \
     thumbnail_url, content, image_urls, youtube_links";

/// SQLite-backed session storage.
pub struct SqliteSessionStore {
    /// Database connection (wrapped in mutex for thread safety).
    conn: Mutex<Connection>,
    /// Change notification channel.
    events: broadcast::Sender<StoreEvent>,
}

impl SqliteSessionStore {
    /// Create a new SQLite session store.
    ///
    /// Creates the database and runs migrations if needed.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        fs::create_dir_all(base_dir)?;

        let db_path = base_dir.join("sessions.db");
        let conn = Connection::open(&db_path)?;

        // Enable WAL mode for better concurrency
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        let (events, _) = broadcast::channel(256);

        let store = Self {
            conn: Mutex::new(conn),
            events,
        };

        store.run_migrations()?;

        Ok(store)
    }

    /// Open store at the default data directory.
    pub fn open_default() -> Result<Self> {
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| StoreError::PathError("Could not find data directory".into()))?
            .join("tinytutor");
        Self::new(data_dir)
    }

    /// Run database migrations.
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();

        // Check current version
        let current_version: i32 = conn
            .query_row(
                "SELECT COALESCE(MAX(version), 0) FROM schema_version",
                [],
                |row| row.get(0),
            )
            .unwrap_or(0);

        if current_version < 1 {
            let migration = include_str!("../migrations/001_initial.sql");
            conn.execute_batch(migration)?;
        }

        Ok(())
    }

    fn notify(&self, event: StoreEvent) {
        debug!(?event, "store change");
        // No receivers is fine; live queries come and go.
        let _ = self.events.send(event);
    }

    fn read_row(row: &Row<'_>) -> rusqlite::Result<RawSessionRow> {
        Ok((
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
            row.get(6)?,
            row.get(7)?,
            row.get(8)?,
        ))
    }

    fn decode_row(raw: RawSessionRow) -> Result<TutorSession> {
        let (
            id,
            topic,
            created_at,
            last_accessed_at,
            language,
            thumbnail_url,
            content,
            image_urls,
            youtube_links,
        ) = raw;

        // A NULL content column means "never generated", regardless of
        // stray values in the list columns.
        let generated = match content {
            Some(text) => Some(TopicContent::new(
                text,
                codec::decode_string_list(image_urls.as_deref())?.unwrap_or_default(),
                codec::decode_string_list(youtube_links.as_deref())?.unwrap_or_default(),
            )),
            None => None,
        };

        Ok(TutorSession {
            id,
            topic,
            created_at: codec::parse_datetime(&created_at)?,
            last_accessed_at: codec::parse_datetime(&last_accessed_at)?,
            language,
            thumbnail_url,
            generated,
        })
    }

    /// Encode the generated trio as its three columns: all set or all NULL.
    fn encode_generated(
        generated: Option<&TopicContent>,
    ) -> Result<(Option<String>, Option<String>, Option<String>)> {
        match generated {
            Some(g) => Ok((
                Some(g.content.clone()),
                codec::encode_string_list(Some(&g.image_urls))?,
                codec::encode_string_list(Some(&g.youtube_links))?,
            )),
            None => Ok((None, None, None)),
        }
    }

    /// Escape LIKE wildcards so user input is matched literally.
    fn escape_like(query: &str) -> String {
        query
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_")
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn insert(&self, session: &TutorSession) -> Result<i64> {
        if session.topic.trim().is_empty() {
            return Err(StoreError::Validation("topic cannot be empty".into()));
        }

        let (content, image_urls, youtube_links) = Self::encode_generated(session.generated.as_ref())?;

        let id = {
            let conn = self.conn.lock().unwrap();
            conn.execute(
                r#"
                INSERT INTO tutor_sessions (
                    topic, created_at, last_accessed_at, language,
                    thumbnail_url, content, image_urls, youtube_links
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
                params![
                    session.topic,
                    codec::format_datetime(&session.created_at),
                    codec::format_datetime(&session.last_accessed_at),
                    session.language,
                    session.thumbnail_url,
                    content,
                    image_urls,
                    youtube_links,
                ],
            )?;
            conn.last_insert_rowid()
        };

        self.notify(StoreEvent::Inserted(id));
        Ok(id)
    }

    async fn get(&self, id: i64) -> Result<Option<TutorSession>> {
        let raw = {
            let conn = self.conn.lock().unwrap();
            conn.query_row(
                &format!("SELECT {SESSION_COLUMNS} FROM tutor_sessions WHERE id = ?1"),
                params![id],
                Self::read_row,
            )
            .optional()?
        };

        raw.map(Self::decode_row).transpose()
    }

    async fn update(&self, session: &TutorSession) -> Result<()> {
        let (content, image_urls, youtube_links) = Self::encode_generated(session.generated.as_ref())?;

        let rows = {
            let conn = self.conn.lock().unwrap();
            conn.execute(
                r#"
                UPDATE tutor_sessions SET
                    topic = ?2, created_at = ?3, last_accessed_at = ?4,
                    language = ?5, thumbnail_url = ?6,
                    content = ?7, image_urls = ?8, youtube_links = ?9
                WHERE id = ?1
                "#,
                params![
                    session.id,
                    session.topic,
                    codec::format_datetime(&session.created_at),
                    codec::format_datetime(&session.last_accessed_at),
                    session.language,
                    session.thumbnail_url,
                    content,
                    image_urls,
                    youtube_links,
                ],
            )?
        };

        if rows == 0 {
            return Err(StoreError::NotFound(session.id));
        }

        self.notify(StoreEvent::Updated(session.id));
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let rows = {
            let conn = self.conn.lock().unwrap();
            conn.execute("DELETE FROM tutor_sessions WHERE id = ?1", params![id])?
        };

        if rows > 0 {
            self.notify(StoreEvent::Deleted(id));
        }
        Ok(())
    }

    async fn touch(&self, id: i64) -> Result<()> {
        let now = codec::format_datetime(&Local::now().naive_local());

        let rows = {
            let conn = self.conn.lock().unwrap();
            conn.execute(
                "UPDATE tutor_sessions SET last_accessed_at = ?2 WHERE id = ?1",
                params![id, now],
            )?
        };

        if rows == 0 {
            return Err(StoreError::NotFound(id));
        }

        self.notify(StoreEvent::Touched(id));
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<TutorSession>> {
        let raw_rows = {
            let conn = self.conn.lock().unwrap();
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM tutor_sessions \
                 ORDER BY last_accessed_at DESC, id DESC"
            ))?;
            let rows = stmt.query_map([], Self::read_row)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };

        raw_rows.into_iter().map(Self::decode_row).collect()
    }

    async fn search(&self, query: &str) -> Result<Vec<TutorSession>> {
        let pattern = format!("%{}%", Self::escape_like(query));

        let raw_rows = {
            let conn = self.conn.lock().unwrap();
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM tutor_sessions \
                 WHERE topic LIKE ?1 ESCAPE '\\' \
                 ORDER BY last_accessed_at DESC, id DESC"
            ))?;
            let rows = stmt.query_map(params![pattern], Self::read_row)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };

        raw_rows.into_iter().map(Self::decode_row).collect()
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }
}
