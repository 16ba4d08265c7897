//! Content generation service.
//!
//! Orchestrates prompt construction, the AI client call, and response
//! parsing. A single client instance is shared by all callers and is
//! not safe for unbounded concurrent use, so every call goes through a
//! request gate; the gate also covers the reconnect-then-retry window.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use tinytutor_core::{Error, Result, TopicContent};
use tinytutor_providers::{GenerateRequest, InlineImage, ModelClient};

use crate::parser;
use crate::prompts;

/// Substituted when generation succeeds but returns no text.
pub const GENERATION_EMPTY_FALLBACK: &str = "Sorry, I couldn't generate content for this topic.";

/// Returned when answering succeeds but returns no text.
pub const ANSWER_EMPTY_FALLBACK: &str = "Sorry, I couldn't answer this question.";

/// Returned when the answer call fails. Q&A never propagates remote errors.
pub const ANSWER_ERROR_FALLBACK: &str =
    "Sorry, I couldn't answer this question right now. Please try again.";

/// Returned when image description succeeds but returns no text.
pub const IMAGE_EMPTY_FALLBACK: &str = "Sorry, I couldn't explain this image.";

/// Returned when the image description call fails.
pub const IMAGE_ERROR_FALLBACK: &str =
    "Sorry, I couldn't explain this image right now. Please try again.";

/// Generates tutorial content, answers, and image descriptions
/// through a shared [`ModelClient`].
pub struct ContentService {
    client: Arc<dyn ModelClient>,
    model: Option<String>,
    /// Serializes client calls, including reconnect-on-retry.
    gate: Mutex<()>,
}

impl ContentService {
    /// Create a service around an already-constructed client handle.
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self {
            client,
            model: None,
            gate: Mutex::new(()),
        }
    }

    /// Override the model for all requests.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    fn build_request(&self, prompt: String) -> GenerateRequest {
        let mut request = GenerateRequest::text(prompt);
        request.model = self.model.clone();
        request
    }

    /// Generate a short tutorial for a topic and parse it into
    /// structured content.
    ///
    /// On client failure, reconnects and retries exactly once; a
    /// second failure surfaces as [`Error::RemoteGeneration`]. A
    /// success that carries no text is parsed as a fixed fallback
    /// sentence instead of failing.
    pub async fn generate_topic_content(
        &self,
        topic: &str,
        language: &str,
    ) -> Result<TopicContent> {
        let request = self.build_request(prompts::tutorial_prompt(topic, language));
        let request_id = Uuid::new_v4();

        let _gate = self.gate.lock().await;
        debug!(%request_id, topic, language, "generating tutorial");

        let response = match self.client.generate(request.clone()).await {
            Ok(response) => response,
            Err(first) => {
                warn!(%request_id, error = %first, "generation failed, reconnecting for one retry");
                self.client
                    .reconnect()
                    .await
                    .map_err(|e| Error::RemoteGeneration(format!("reconnect failed: {e}")))?;
                self.client
                    .generate(request)
                    .await
                    .map_err(|e| Error::RemoteGeneration(e.to_string()))?
            }
        };

        let raw = response
            .text
            .unwrap_or_else(|| GENERATION_EMPTY_FALLBACK.to_string());
        Ok(parser::parse(&raw))
    }

    /// Answer a follow-up question against stored tutorial text.
    ///
    /// Never propagates remote failures; returns a fallback sentence
    /// instead.
    pub async fn answer_question(&self, question: &str, context: &str, language: &str) -> String {
        let request = self.build_request(prompts::question_prompt(question, context, language));
        let request_id = Uuid::new_v4();

        let _gate = self.gate.lock().await;
        debug!(%request_id, language, "answering question");

        match self.client.generate(request).await {
            Ok(response) => response
                .text
                .unwrap_or_else(|| ANSWER_EMPTY_FALLBACK.to_string()),
            Err(e) => {
                warn!(%request_id, error = %e, "question answering failed");
                ANSWER_ERROR_FALLBACK.to_string()
            }
        }
    }

    /// Describe an image for a child. Same non-propagating policy as
    /// [`ContentService::answer_question`].
    pub async fn explain_image(&self, image: InlineImage, language: &str) -> String {
        let request = self
            .build_request(prompts::image_prompt(language))
            .with_image(image);
        let request_id = Uuid::new_v4();

        let _gate = self.gate.lock().await;
        debug!(%request_id, language, "explaining image");

        match self.client.generate(request).await {
            Ok(response) => response
                .text
                .unwrap_or_else(|| IMAGE_EMPTY_FALLBACK.to_string()),
            Err(e) => {
                warn!(%request_id, error = %e, "image explanation failed");
                IMAGE_ERROR_FALLBACK.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use tinytutor_providers::GenerateResponse;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    /// Scripted client: pops one outcome per call, counts calls and
    /// reconnects, and flags any overlapping entry.
    struct FakeClient {
        outcomes: std::sync::Mutex<VecDeque<anyhow::Result<GenerateResponse>>>,
        calls: AtomicUsize,
        reconnects: AtomicUsize,
        in_flight: AtomicBool,
        overlap_seen: AtomicBool,
    }

    impl FakeClient {
        fn scripted(outcomes: Vec<anyhow::Result<GenerateResponse>>) -> Arc<Self> {
            Arc::new(Self {
                outcomes: std::sync::Mutex::new(outcomes.into()),
                calls: AtomicUsize::new(0),
                reconnects: AtomicUsize::new(0),
                in_flight: AtomicBool::new(false),
                overlap_seen: AtomicBool::new(false),
            })
        }

        fn ok(text: &str) -> anyhow::Result<GenerateResponse> {
            Ok(GenerateResponse {
                text: Some(text.to_string()),
            })
        }

        fn empty() -> anyhow::Result<GenerateResponse> {
            Ok(GenerateResponse { text: None })
        }

        fn err() -> anyhow::Result<GenerateResponse> {
            Err(anyhow::anyhow!("connection reset"))
        }
    }

    #[async_trait]
    impl ModelClient for FakeClient {
        fn id(&self) -> &str {
            "fake"
        }

        fn is_configured(&self) -> bool {
            true
        }

        async fn generate(&self, _request: GenerateRequest) -> anyhow::Result<GenerateResponse> {
            if self.in_flight.swap(true, Ordering::SeqCst) {
                self.overlap_seen.store(true, Ordering::SeqCst);
            }
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.in_flight.store(false, Ordering::SeqCst);

            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Self::ok("default text"))
        }

        async fn reconnect(&self) -> anyhow::Result<()> {
            self.reconnects.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_generate_success_without_retry() {
        let client = FakeClient::scripted(vec![FakeClient::ok("Cats purr.")]);
        let service = ContentService::new(client.clone());

        let content = service.generate_topic_content("Cats", "en").await.unwrap();
        assert_eq!(content.content, "Cats purr.");
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
        assert_eq!(client.reconnects.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_generate_retries_once_after_reconnect() {
        let client = FakeClient::scripted(vec![FakeClient::err(), FakeClient::ok("Second try.")]);
        let service = ContentService::new(client.clone());

        let content = service.generate_topic_content("Cats", "en").await.unwrap();
        assert_eq!(content.content, "Second try.");
        assert_eq!(client.calls.load(Ordering::SeqCst), 2);
        assert_eq!(client.reconnects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_generate_fails_after_second_error() {
        let client = FakeClient::scripted(vec![FakeClient::err(), FakeClient::err()]);
        let service = ContentService::new(client.clone());

        let result = service.generate_topic_content("Cats", "en").await;
        assert!(matches!(result, Err(Error::RemoteGeneration(_))));
        // Exactly one retry, no more.
        assert_eq!(client.calls.load(Ordering::SeqCst), 2);
        assert_eq!(client.reconnects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_generate_empty_text_uses_fallback_sentence() {
        let client = FakeClient::scripted(vec![FakeClient::empty()]);
        let service = ContentService::new(client);

        let content = service.generate_topic_content("Cats", "en").await.unwrap();
        assert_eq!(content.content, GENERATION_EMPTY_FALLBACK);
        assert!(content.image_urls.is_empty());
    }

    #[tokio::test]
    async fn test_generate_parses_response() {
        let client = FakeClient::scripted(vec![FakeClient::ok(
            "Cats!\n\nhttps://e.com/cat.jpg\n\nhttps://youtu.be/cat42",
        )]);
        let service = ContentService::new(client);

        let content = service.generate_topic_content("Cats", "en").await.unwrap();
        assert_eq!(content.content, "Cats!");
        assert_eq!(content.image_urls, vec!["https://e.com/cat.jpg"]);
        assert_eq!(
            content.youtube_links,
            vec!["https://www.youtube.com/watch?v=cat42"]
        );
    }

    #[tokio::test]
    async fn test_answer_swallows_client_failure() {
        let client = FakeClient::scripted(vec![FakeClient::err()]);
        let service = ContentService::new(client.clone());

        let answer = service.answer_question("Why?", "Because.", "en").await;
        assert_eq!(answer, ANSWER_ERROR_FALLBACK);
        // No retry for Q&A.
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
        assert_eq!(client.reconnects.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_answer_empty_text_fallback() {
        let client = FakeClient::scripted(vec![FakeClient::empty()]);
        let service = ContentService::new(client);

        let answer = service.answer_question("Why?", "Because.", "en").await;
        assert_eq!(answer, ANSWER_EMPTY_FALLBACK);
    }

    #[tokio::test]
    async fn test_explain_image_fallbacks() {
        let image = InlineImage {
            media_type: "image/png".to_string(),
            data: vec![1],
        };

        let client = FakeClient::scripted(vec![FakeClient::err()]);
        let service = ContentService::new(client);
        assert_eq!(
            service.explain_image(image.clone(), "en").await,
            IMAGE_ERROR_FALLBACK
        );

        let client = FakeClient::scripted(vec![FakeClient::empty()]);
        let service = ContentService::new(client);
        assert_eq!(
            service.explain_image(image, "en").await,
            IMAGE_EMPTY_FALLBACK
        );
    }

    #[tokio::test]
    async fn test_concurrent_calls_are_serialized() {
        let client = FakeClient::scripted(vec![]);
        let service = Arc::new(ContentService::new(client.clone()));

        let tasks: Vec<_> = (0..4)
            .map(|i| {
                let service = Arc::clone(&service);
                tokio::spawn(async move {
                    service
                        .generate_topic_content(&format!("Topic {i}"), "en")
                        .await
                        .unwrap();
                })
            })
            .collect();
        futures::future::join_all(tasks).await;

        assert_eq!(client.calls.load(Ordering::SeqCst), 4);
        assert!(!client.overlap_seen.load(Ordering::SeqCst));
    }
}
