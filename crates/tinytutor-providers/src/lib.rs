//! # tinytutor-providers
//!
//! AI model client abstraction for TinyTutor.
//!
//! This crate provides:
//! - The [`ModelClient`] trait the engine generates content through
//! - [`GeminiClient`], the Gemini REST implementation

pub mod gemini;
pub mod traits;

// Re-export commonly used types
pub use gemini::GeminiClient;
pub use traits::{GenerateRequest, GenerateResponse, InlineImage, ModelClient};
