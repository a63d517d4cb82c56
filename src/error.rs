// src/error.rs

//! Unified error handling for the notification service.

use std::fmt;

use thiserror::Error;

/// Result type alias for service operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error (invocation-fatal)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Posting credentials rejected by the remote service
    #[error("Credential verification failed: {0}")]
    Credentials(String),

    /// Page capture failed
    #[error("Capture error for {url}: {message}")]
    Capture { url: String, message: String },

    /// Blob store operation failed
    #[error("Blob store error: {0}")]
    BlobStore(String),

    /// Publishing (media upload or post) failed
    #[error("Publish error: {0}")]
    Publish(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing failed
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a credentials error.
    pub fn credentials(message: impl fmt::Display) -> Self {
        Self::Credentials(message.to_string())
    }

    /// Create a capture error with URL context.
    pub fn capture(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Capture {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a blob store error.
    pub fn blob_store(message: impl fmt::Display) -> Self {
        Self::BlobStore(message.to_string())
    }

    /// Create a publish error.
    pub fn publish(message: impl fmt::Display) -> Self {
        Self::Publish(message.to_string())
    }

    /// Whether the next scheduled tick may succeed where this run failed.
    ///
    /// Invalid configuration and rejected credentials stay broken until an
    /// operator intervenes; everything network-shaped is worth retrying.
    pub fn retriable(&self) -> bool {
        match self {
            Self::Config(_) | Self::Credentials(_) | Self::Yaml(_) | Self::Url(_) => false,
            Self::Capture { .. }
            | Self::BlobStore(_)
            | Self::Publish(_)
            | Self::Io(_)
            | Self::Http(_)
            | Self::Json(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retriable_classification() {
        assert!(!AppError::config("bad yaml").retriable());
        assert!(!AppError::credentials("401").retriable());
        assert!(AppError::capture("https://example.com", "timeout").retriable());
        assert!(AppError::blob_store("503").retriable());
        assert!(AppError::publish("500").retriable());
    }

    #[test]
    fn test_capture_error_carries_url() {
        let err = AppError::capture("https://example.com/team", "render failure");
        assert!(err.to_string().contains("https://example.com/team"));
    }
}
