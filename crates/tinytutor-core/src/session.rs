//! Tutor session entity.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::content::TopicContent;

/// Default language for new sessions.
pub const DEFAULT_LANGUAGE: &str = "en";

/// A persisted tutoring session.
///
/// One row in the session store. The `id` is assigned by the store on
/// insert and is stable for the session's lifetime; `0` means the
/// session has not been stored yet. `topic` is user-supplied and
/// immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TutorSession {
    /// Store-assigned id. `0` until inserted.
    pub id: i64,
    /// What the child wants to learn about. Never empty.
    pub topic: String,
    /// Set once at creation.
    pub created_at: NaiveDateTime,
    /// Refreshed every time the session is opened.
    pub last_accessed_at: NaiveDateTime,
    /// Short language code, e.g. "en".
    pub language: String,
    /// Optional list thumbnail. Persisted but unused by the core logic.
    pub thumbnail_url: Option<String>,
    /// Generated tutorial content. `None` until the first successful
    /// generation; set as one unit so the prose and media lists can
    /// never be persisted partially.
    pub generated: Option<TopicContent>,
}

impl TutorSession {
    /// Create a bare, unstored session for a topic.
    pub fn new(topic: impl Into<String>) -> Self {
        let now = Local::now().naive_local();
        Self {
            id: 0,
            topic: topic.into(),
            created_at: now,
            last_accessed_at: now,
            language: DEFAULT_LANGUAGE.to_string(),
            thumbnail_url: None,
            generated: None,
        }
    }

    /// Override the language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Whether content has been generated for this session.
    pub fn has_content(&self) -> bool {
        self.generated.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_defaults() {
        let session = TutorSession::new("Dinosaurs");
        assert_eq!(session.id, 0);
        assert_eq!(session.topic, "Dinosaurs");
        assert_eq!(session.language, DEFAULT_LANGUAGE);
        assert_eq!(session.created_at, session.last_accessed_at);
        assert!(!session.has_content());
    }

    #[test]
    fn test_with_language() {
        let session = TutorSession::new("Planets").with_language("es");
        assert_eq!(session.language, "es");
    }

    #[test]
    fn test_has_content_after_generation() {
        let mut session = TutorSession::new("Volcanoes");
        session.generated = Some(TopicContent::text_only("Volcanoes are mountains that erupt."));
        assert!(session.has_content());
    }
}
