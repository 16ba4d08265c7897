//! Live query handles over the session store.
//!
//! A [`LiveQuery`] yields the current result set immediately, then
//! re-yields the recomputed set after every store mutation. Dropping
//! the handle unsubscribes that consumer; other subscribers are
//! unaffected. A lagged receiver collapses the missed notifications
//! into a single recompute, so consumers may see redundant re-emissions
//! of unchanged data but never a stale final state.

use std::sync::Arc;

use tokio::sync::broadcast;

use tinytutor_core::TutorSession;

use crate::store::{Result, SessionStore, SqliteSessionStore, StoreEvent};

impl SqliteSessionStore {
    /// Live view of all sessions, most recently accessed first.
    pub fn watch_all(self: &Arc<Self>) -> LiveQuery {
        LiveQuery::new(Arc::clone(self), None)
    }

    /// Live view of sessions whose topic contains `query`.
    pub fn watch_search(self: &Arc<Self>, query: impl Into<String>) -> LiveQuery {
        LiveQuery::new(Arc::clone(self), Some(query.into()))
    }
}

/// A subscription to an ordered session listing.
pub struct LiveQuery {
    store: Arc<SqliteSessionStore>,
    filter: Option<String>,
    events: broadcast::Receiver<StoreEvent>,
    primed: bool,
}

impl LiveQuery {
    fn new(store: Arc<SqliteSessionStore>, filter: Option<String>) -> Self {
        let events = store.subscribe();
        Self {
            store,
            filter,
            events,
            primed: false,
        }
    }

    /// The next result set: the current snapshot on the first call,
    /// then a recomputed set after each subsequent store mutation.
    pub async fn next(&mut self) -> Result<Vec<TutorSession>> {
        if !self.primed {
            self.primed = true;
            return self.run().await;
        }

        // A lagged receiver collapses the missed notifications into
        // this one recompute. The handle's Arc keeps the sender alive,
        // so Closed only happens in teardown.
        let _ = self.events.recv().await;

        self.run().await
    }

    async fn run(&self) -> Result<Vec<TutorSession>> {
        match self.filter {
            Some(ref query) => self.store.search(query).await,
            None => self.store.list_all().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (Arc<SqliteSessionStore>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(SqliteSessionStore::new(temp_dir.path()).unwrap());
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_initial_snapshot_is_immediate() {
        let (store, _tmp) = create_test_store();
        store.insert(&TutorSession::new("Bees")).await.unwrap();

        let mut live = store.watch_all();
        let snapshot = live.next().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].topic, "Bees");
    }

    #[tokio::test]
    async fn test_recomputes_after_mutation() {
        let (store, _tmp) = create_test_store();

        let mut live = store.watch_all();
        assert!(live.next().await.unwrap().is_empty());

        store.insert(&TutorSession::new("Ants")).await.unwrap();

        let updated = live.next().await.unwrap();
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].topic, "Ants");
    }

    #[tokio::test]
    async fn test_search_view_filters() {
        let (store, _tmp) = create_test_store();
        store.insert(&TutorSession::new("Space Rockets")).await.unwrap();

        let mut live = store.watch_search("rocket");
        assert_eq!(live.next().await.unwrap().len(), 1);

        store.insert(&TutorSession::new("Dinosaurs")).await.unwrap();

        // Recomputed, but the new session doesn't match the filter.
        let updated = live.next().await.unwrap();
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].topic, "Space Rockets");
    }

    #[tokio::test]
    async fn test_dropped_handle_leaves_others_subscribed() {
        let (store, _tmp) = create_test_store();

        let mut kept = store.watch_all();
        let dropped = store.watch_all();
        kept.next().await.unwrap();
        drop(dropped);

        store.insert(&TutorSession::new("Trains")).await.unwrap();

        let updated = kept.next().await.unwrap();
        assert_eq!(updated.len(), 1);
    }

    #[tokio::test]
    async fn test_lag_collapses_to_one_recompute() {
        let (store, _tmp) = create_test_store();

        let mut live = store.watch_all();
        live.next().await.unwrap();

        for i in 0..5 {
            store.insert(&TutorSession::new(format!("Topic {i}"))).await.unwrap();
        }

        // Several pending notifications; the next result already
        // reflects all of them.
        let updated = live.next().await.unwrap();
        assert_eq!(updated.len(), 5);
    }
}
