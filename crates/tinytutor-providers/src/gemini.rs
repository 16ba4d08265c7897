//! Gemini REST client implementation.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, error, instrument};

use tinytutor_core::Error;

use crate::traits::{GenerateRequest, GenerateResponse, ModelClient};

/// Gemini API base URL.
const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Default model when the request doesn't name one.
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Client for the Gemini `generateContent` REST API.
///
/// The HTTP client lives behind a lock so [`ModelClient::reconnect`]
/// can swap it out without racing in-flight callers.
pub struct GeminiClient {
    http: RwLock<Client>,
    api_key: String,
    default_model: String,
    base_url: String,
}

impl GeminiClient {
    /// Create a new Gemini client.
    ///
    /// An empty credential is a fatal configuration error, surfaced
    /// here rather than on first use.
    pub fn new(api_key: impl Into<String>) -> Result<Self, Error> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::Config(
                "Gemini API key is empty. Set GEMINI_API_KEY or provider.api_key".into(),
            ));
        }

        Ok(Self {
            http: RwLock::new(Client::new()),
            api_key,
            default_model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: GEMINI_API_URL.to_string(),
        })
    }

    /// Set the default model.
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Override the API base URL (for custom endpoints).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Convert a request into Gemini content parts.
    fn build_parts(request: &GenerateRequest) -> Vec<Part> {
        let mut parts = vec![Part::Text {
            text: request.prompt.clone(),
        }];

        if let Some(ref image) = request.image {
            parts.push(Part::InlineData {
                inline_data: InlineDataPayload {
                    mime_type: image.media_type.clone(),
                    data: BASE64_STANDARD.encode(&image.data),
                },
            });
        }

        parts
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    fn id(&self) -> &str {
        "gemini"
    }

    fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    #[instrument(skip(self, request), fields(model = request.model.as_deref().unwrap_or(&self.default_model)))]
    async fn generate(&self, request: GenerateRequest) -> anyhow::Result<GenerateResponse> {
        let model = request.model.as_deref().unwrap_or(&self.default_model);

        let api_request = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: Self::build_parts(&request),
            }],
        };

        debug!(
            has_image = request.image.is_some(),
            "Sending request to Gemini API"
        );

        let url = format!(
            "{}/{}:generateContent?key={}",
            self.base_url, model, self.api_key
        );

        let http = self.http.read().await.clone();
        let response = http.post(url).json(&api_request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = decode_error_body(&body);
            error!("Gemini API error: {} - {}", status, message);
            anyhow::bail!("Gemini API error: {} - {}", status, message);
        }

        let api_response: GenerateContentResponse = response.json().await?;
        Ok(GenerateResponse {
            text: extract_text(api_response),
        })
    }

    async fn reconnect(&self) -> anyhow::Result<()> {
        debug!("Rebuilding Gemini HTTP client");
        *self.http.write().await = Client::new();
        Ok(())
    }
}

/// Pull the first candidate's text out of a response.
///
/// Missing candidates or empty parts map to `None` rather than an
/// error: the service layer substitutes a fallback sentence for
/// "succeeded but said nothing".
fn extract_text(response: GenerateContentResponse) -> Option<String> {
    response
        .candidates
        .and_then(|mut candidates| {
            if candidates.is_empty() {
                None
            } else {
                Some(candidates.remove(0))
            }
        })
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
}

/// Decode the Gemini error envelope, falling back to the raw body.
fn decode_error_body(body: &str) -> String {
    serde_json::from_str::<ErrorWrapper>(body)
        .map(|wrapper| {
            let status = wrapper.error.status.unwrap_or_default();
            let message = wrapper.error.message.unwrap_or_else(|| body.to_string());
            if status.is_empty() {
                message
            } else {
                format!("{status}: {message}")
            }
        })
        .unwrap_or_else(|_| body.to_string())
}

// Gemini API types

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineDataPayload,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataPayload {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Debug, Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}
