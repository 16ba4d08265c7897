//! # tinytutor-session
//!
//! Session persistence for TinyTutor.
//!
//! This crate provides:
//! - SQLite-backed storage for tutor sessions
//! - Row codecs for timestamps and JSON-encoded string lists
//! - Live queries that re-emit after every store mutation
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tinytutor_session::SqliteSessionStore;
//!
//! let store = Arc::new(SqliteSessionStore::open_default()?);
//!
//! // Snapshot reads
//! let sessions = store.list_all().await?;
//!
//! // Or a live view that re-emits on every change
//! let mut live = store.watch_all();
//! while let Ok(sessions) = live.next().await {
//!     // render
//! }
//! ```
//!
//! ## Storage Architecture
//!
//! Sessions are stored in a single table in
//! `~/.local/share/tinytutor/sessions.db`. Timestamps persist as
//! ISO-8601 local date-time text and the generated URL lists as
//! JSON-encoded TEXT columns; see [`codec`].

pub mod codec;
pub mod live;
pub mod store;

// Re-export commonly used types
pub use live::LiveQuery;
pub use store::{SessionStore, SqliteSessionStore, StoreError, StoreEvent};
