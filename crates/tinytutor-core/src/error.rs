//! Error types for TinyTutor.

use thiserror::Error;

/// Result type alias using the TinyTutor error.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for TinyTutor.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error (missing credential, bad config file).
    /// Fatal at startup, never retried.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The AI client call failed after the single permitted retry.
    #[error("Content generation failed: {0}")]
    RemoteGeneration(String),

    /// Underlying persistence I/O failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A mutation targeted a session id that does not exist.
    #[error("Session not found: {0}")]
    NotFound(i64),

    /// Validation error (e.g. blank topic).
    #[error("Validation error: {0}")]
    Validation(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Get a recovery suggestion for this error.
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            Error::Config(_) => {
                Some("Check your config file at ~/.config/tinytutor/config.toml or set GEMINI_API_KEY")
            }
            Error::RemoteGeneration(_) => Some("Check your network connection and try again"),
            Error::NotFound(_) => Some("Use 'tinytutor list' to see available sessions"),
            _ => None,
        }
    }
}

/// Format an error with its recovery suggestion.
pub fn format_error_with_suggestion(error: &Error) -> String {
    let mut output = error.to_string();
    if let Some(suggestion) = error.recovery_suggestion() {
        output.push_str(&format!("\n  Suggestion: {}", suggestion));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_has_suggestion() {
        let err = Error::Config("API key not set".into());
        assert!(err.to_string().contains("API key"));
        assert!(err.recovery_suggestion().is_some());
    }

    #[test]
    fn test_not_found_display() {
        let err = Error::NotFound(42);
        assert!(err.to_string().contains("42"));
        assert!(err.recovery_suggestion().unwrap().contains("list"));
    }

    #[test]
    fn test_format_with_suggestion() {
        let err = Error::Config("missing key".into());
        let formatted = format_error_with_suggestion(&err);
        assert!(formatted.contains("Suggestion:"));
    }
}
