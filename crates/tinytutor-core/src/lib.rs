//! # tinytutor-core
//!
//! Core types and abstractions for TinyTutor - the AI tutor for kids.
//!
//! This crate provides:
//! - The `TutorSession` persisted entity and `TopicContent` value object
//! - Configuration system
//! - Common error types

pub mod config;
pub mod content;
pub mod error;
pub mod session;

pub use config::Config;
pub use content::TopicContent;
pub use error::{Error, Result};
pub use session::TutorSession;
