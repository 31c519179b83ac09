//! Error types for pagewire
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use serde_json::Value;
use thiserror::Error;

/// The main error type for pagewire
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server unexpectedly returned {status} ({reason})")]
    UnexpectedStatus { status: u16, reason: String },

    #[error("API error {code}: {message}")]
    Api {
        code: u16,
        message: String,
        data: Value,
    },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Pagination Errors
    // ============================================================================
    #[error("Malformed link entry '{entry}': {message}")]
    LinkHeader { entry: String, message: String },

    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    #[error("Paginator '{name}' is not configured")]
    UnknownPaginator { name: String },

    // ============================================================================
    // Form Errors
    // ============================================================================
    #[error("Form has no input with id '{id}'")]
    UnknownInput { id: String },

    #[error("Form '{name}' is not configured")]
    UnknownForm { name: String },

    #[error("Invalid pattern for input '{id}': {message}")]
    Pattern { id: String, message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an unexpected status error
    pub fn unexpected_status(status: u16, reason: impl Into<String>) -> Self {
        Self::UnexpectedStatus {
            status,
            reason: reason.into(),
        }
    }

    /// Create a structured API error
    pub fn api(code: u16, message: impl Into<String>, data: Value) -> Self {
        Self::Api {
            code,
            message: message.into(),
            data,
        }
    }

    /// Create a link header error
    pub fn link_header(entry: impl Into<String>, message: impl Into<String>) -> Self {
        Self::LinkHeader {
            entry: entry.into(),
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create an unknown input error
    pub fn unknown_input(id: impl Into<String>) -> Self {
        Self::UnknownInput { id: id.into() }
    }

    /// Message suitable for an error output banner.
    ///
    /// Structured API errors show the server's message verbatim, transport
    /// failures a generic server error, everything else the full error text.
    pub fn display_message(&self) -> String {
        match self {
            Error::Api { message, .. } => message.clone(),
            Error::Http(e) => format!("Server unexpectedly returned error ({e})"),
            Error::Timeout { .. } => format!("Server unexpectedly returned error ({self})"),
            other => other.to_string(),
        }
    }
}

/// Result type alias for pagewire
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
