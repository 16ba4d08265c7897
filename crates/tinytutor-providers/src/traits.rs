//! Model client trait definitions.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// An inline image attached to a generation request.
///
/// Base64-encoded on the wire; held as raw bytes here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InlineImage {
    /// MIME type, e.g. `image/jpeg`.
    pub media_type: String,
    /// Raw image bytes.
    pub data: Vec<u8>,
}

/// Request for a text generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Model to use; `None` for the client's default.
    pub model: Option<String>,
    /// The prompt text.
    pub prompt: String,
    /// Optional attached image for vision requests.
    pub image: Option<InlineImage>,
}

impl GenerateRequest {
    /// A text-only request against the default model.
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            model: None,
            prompt: prompt.into(),
            image: None,
        }
    }

    /// Attach an image.
    pub fn with_image(mut self, image: InlineImage) -> Self {
        self.image = Some(image);
        self
    }

    /// Override the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// Response from a generation.
///
/// `text: None` models "the call succeeded but produced no text",
/// which callers treat differently from an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// Generated text, if any.
    pub text: Option<String>,
}

/// Core model client trait - all AI backends implement this.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Client identifier.
    fn id(&self) -> &str;

    /// Check if the client is configured and ready.
    fn is_configured(&self) -> bool;

    /// Generate text for a request.
    async fn generate(&self, request: GenerateRequest) -> anyhow::Result<GenerateResponse>;

    /// Rebuild the underlying connection. Called by the retry path
    /// before the single permitted retry.
    async fn reconnect(&self) -> anyhow::Result<()>;
}
