//! Session coordinator.
//!
//! Mediates between a UI and the session store: holds the observable
//! session list and a serialized operation state, and converts every
//! store failure into a user-facing message at this boundary. Nothing
//! panics across it.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use tinytutor_core::{Result, TutorSession};
use tinytutor_session::{SessionStore, SqliteSessionStore, StoreError};

/// UI-facing operation state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiState {
    /// An operation (or the initial load) is in progress.
    Loading,
    /// The last operation completed and the list is fresh.
    Success,
    /// The last operation failed; the message is user-facing.
    Error(String),
}

/// Coordinates the session list and operation state for a UI.
///
/// A background feed task subscribed to the store keeps the list
/// current; dropping the coordinator aborts it, so no re-deliveries
/// leak past the consumer's lifetime.
pub struct SessionCoordinator {
    store: Arc<SqliteSessionStore>,
    sessions_tx: Arc<watch::Sender<Vec<TutorSession>>>,
    state_tx: Arc<watch::Sender<UiState>>,
    feed: JoinHandle<()>,
}

impl SessionCoordinator {
    /// Create a coordinator showing the unfiltered session list.
    pub fn new(store: Arc<SqliteSessionStore>) -> Self {
        let (sessions_tx, _) = watch::channel(Vec::new());
        let (state_tx, _) = watch::channel(UiState::Loading);
        let sessions_tx = Arc::new(sessions_tx);
        let state_tx = Arc::new(state_tx);

        let feed = Self::spawn_feed(&store, None, &sessions_tx, &state_tx);

        Self {
            store,
            sessions_tx,
            state_tx,
            feed,
        }
    }

    fn spawn_feed(
        store: &Arc<SqliteSessionStore>,
        filter: Option<String>,
        sessions_tx: &Arc<watch::Sender<Vec<TutorSession>>>,
        state_tx: &Arc<watch::Sender<UiState>>,
    ) -> JoinHandle<()> {
        let store = Arc::clone(store);
        let sessions_tx = Arc::clone(sessions_tx);
        let state_tx = Arc::clone(state_tx);

        tokio::spawn(async move {
            let mut live = match filter {
                Some(query) => store.watch_search(query),
                None => store.watch_all(),
            };

            loop {
                match live.next().await {
                    Ok(sessions) => {
                        debug!(count = sessions.len(), "session list refreshed");
                        let _ = sessions_tx.send(sessions);
                        let _ = state_tx.send(UiState::Success);
                    }
                    Err(e) => {
                        error!("session feed failed: {}", e);
                        let _ = state_tx.send(UiState::Error(user_message(&e)));
                        break;
                    }
                }
            }
        })
    }

    /// Watch the session list.
    pub fn sessions(&self) -> watch::Receiver<Vec<TutorSession>> {
        self.sessions_tx.subscribe()
    }

    /// Watch the operation state.
    pub fn state(&self) -> watch::Receiver<UiState> {
        self.state_tx.subscribe()
    }

    /// The session list as of the feed's last delivery.
    pub fn current_sessions(&self) -> Vec<TutorSession> {
        self.sessions_tx.borrow().clone()
    }

    /// Insert a bare session for a topic and return its assigned id.
    ///
    /// Content generation is the caller's follow-up, never part of
    /// creation.
    pub async fn create_session(&self, topic: &str, language: &str) -> Result<i64> {
        let session = TutorSession::new(topic).with_language(language);
        self.run_op(self.store.insert(&session)).await
    }

    /// Open a session: refresh its access time, then look it up.
    /// Returns `Ok(None)` when the id does not exist.
    pub async fn open_session(&self, id: i64) -> Result<Option<TutorSession>> {
        self.run_op(async {
            match self.store.touch(id).await {
                Ok(()) => self.store.get(id).await,
                Err(StoreError::NotFound(_)) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
    }

    /// Replace a stored session.
    pub async fn update_session(&self, session: &TutorSession) -> Result<()> {
        self.run_op(self.store.update(session)).await
    }

    /// Delete a session. Succeeds silently when the id is absent.
    pub async fn delete_session(&self, id: i64) -> Result<()> {
        self.run_op(self.store.delete(id)).await
    }

    /// Switch the feed between the full listing and a topic search.
    pub fn set_filter(&mut self, filter: Option<String>) {
        self.feed.abort();
        let _ = self.state_tx.send(UiState::Loading);
        self.feed = Self::spawn_feed(&self.store, filter, &self.sessions_tx, &self.state_tx);
    }

    /// Run one mutating operation with Loading/Success/Error
    /// bookkeeping around it.
    async fn run_op<T>(
        &self,
        op: impl Future<Output = std::result::Result<T, StoreError>>,
    ) -> Result<T> {
        let _ = self.state_tx.send(UiState::Loading);
        match op.await {
            Ok(value) => {
                let _ = self.state_tx.send(UiState::Success);
                Ok(value)
            }
            Err(e) => {
                let _ = self.state_tx.send(UiState::Error(user_message(&e)));
                Err(e.into())
            }
        }
    }
}

impl Drop for SessionCoordinator {
    fn drop(&mut self) {
        self.feed.abort();
    }
}

/// Convert a store failure into a message fit for a child-facing UI.
fn user_message(err: &StoreError) -> String {
    match err {
        StoreError::NotFound(id) => format!("Session {id} was not found"),
        StoreError::Validation(msg) => msg.clone(),
        _ => "Something went wrong while saving your sessions".to_string(),
    }
}
