//! # tinytutor-engine
//!
//! The tutoring pipeline for TinyTutor.
//!
//! This crate provides:
//! - [`parser`]: pure parsing of raw AI responses into structured content
//! - [`prompts`]: the fixed prompt templates
//! - [`ContentService`]: generation with serialized client access and
//!   a single reconnect-and-retry
//! - [`SessionCoordinator`]: observable session list and UI state machine

pub mod coordinator;
pub mod parser;
pub mod prompts;
pub mod service;

// Re-export commonly used types
pub use coordinator::{SessionCoordinator, UiState};
pub use service::ContentService;
