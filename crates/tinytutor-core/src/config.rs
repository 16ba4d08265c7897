//! Configuration system for TinyTutor.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Error;

/// Environment variable consulted by default for the Gemini credential.
pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Main configuration struct for TinyTutor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,
    /// AI provider configuration
    pub provider: ProviderConfig,
    /// Storage settings
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Default model to use
    pub model: String,
    /// Default language for new sessions
    pub language: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash".to_string(),
            language: "en".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// API key (can be set directly or via environment)
    pub api_key: Option<String>,
    /// Environment variable name for the API key
    pub api_key_env: Option<String>,
    /// Base URL (optional, for custom endpoints)
    pub base_url: Option<String>,
}

impl ProviderConfig {
    /// Resolve the API key from either direct value or environment variable.
    ///
    /// Falls back to `GEMINI_API_KEY` when no variable name is configured.
    pub fn resolve_api_key(&self) -> Option<String> {
        // First try direct api_key
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }
        // Then try environment variable
        let env_var = self.api_key_env.as_deref().unwrap_or(DEFAULT_API_KEY_ENV);
        std::env::var(env_var).ok()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Override for the session database directory
    pub data_dir: Option<PathBuf>,
}

/// Validation result with multiple issues.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    /// List of validation issues
    pub issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Create a new empty validation result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if validation passed (no errors).
    pub fn is_ok(&self) -> bool {
        !self.issues.iter().any(|i| i.severity == IssueSeverity::Error)
    }

    /// Get only error-level issues.
    pub fn errors(&self) -> Vec<&ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == IssueSeverity::Error).collect()
    }

    /// Get only warning-level issues.
    pub fn warnings(&self) -> Vec<&ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == IssueSeverity::Warning).collect()
    }

    /// Add an error.
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            severity: IssueSeverity::Error,
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning.
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            severity: IssueSeverity::Warning,
            field: field.into(),
            message: message.into(),
        });
    }
}

/// A single validation issue.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Severity of the issue
    pub severity: IssueSeverity,
    /// Field path (e.g., "general.model")
    pub field: String,
    /// Human-readable message
    pub message: String,
}

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueSeverity {
    /// Warnings don't prevent loading
    Warning,
    /// Errors prevent loading
    Error,
}

impl Config {
    /// Load configuration from all sources.
    pub fn load() -> Result<Self, figment::Error> {
        let config_dir = Self::config_dir();

        Figment::new()
            // Default values
            .merge(figment::providers::Serialized::defaults(Config::default()))
            // User config
            .merge(Toml::file(config_dir.join("config.toml")))
            // Environment variables
            .merge(Env::prefixed("TINYTUTOR_").split("_"))
            .extract()
    }

    /// Load and validate configuration.
    pub fn load_validated() -> Result<Self, Error> {
        let config = Self::load().map_err(|e| Error::Config(e.to_string()))?;
        let result = config.validate();

        if !result.is_ok() {
            let errors: Vec<String> = result
                .errors()
                .iter()
                .map(|e| format!("{}: {}", e.field, e.message))
                .collect();
            return Err(Error::Config(format!(
                "Configuration validation failed:\n  {}",
                errors.join("\n  ")
            )));
        }

        // Log warnings
        for warning in result.warnings() {
            tracing::warn!("Config warning - {}: {}", warning.field, warning.message);
        }

        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();

        if self.general.model.is_empty() {
            result.add_error("general.model", "Model name cannot be empty");
        }

        if self.general.language.is_empty() {
            result.add_error("general.language", "Language code cannot be empty");
        } else if self.general.language.len() > 3
            || !self.general.language.chars().all(|c| c.is_ascii_lowercase())
        {
            result.add_warning(
                "general.language",
                format!(
                    "'{}' does not look like a short language code (e.g. 'en', 'es')",
                    self.general.language
                ),
            );
        }

        if self.provider.api_key.as_ref().map(|k| k.is_empty()).unwrap_or(false) {
            result.add_warning("provider.api_key", "API key is empty string");
        }

        if let Some(ref base_url) = self.provider.base_url {
            if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                result.add_error(
                    "provider.base_url",
                    "base_url must start with http:// or https://",
                );
            }
        }

        result
    }

    /// Get the configuration directory.
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|p| p.join("tinytutor"))
            .unwrap_or_else(|| PathBuf::from("~/.config/tinytutor"))
    }

    /// Get the data directory (for the session database).
    ///
    /// Honors the `storage.data_dir` override.
    pub fn data_dir(&self) -> PathBuf {
        if let Some(ref dir) = self.storage.data_dir {
            return dir.clone();
        }
        dirs::data_local_dir()
            .map(|p| p.join("tinytutor"))
            .unwrap_or_else(|| PathBuf::from("~/.local/share/tinytutor"))
    }
}
