// src/config.rs

//! Configuration loading.
//!
//! The service reads a YAML file (the decrypted form of the operator's
//! `secrets.yaml`) selected by the `CONFIG_PATH` environment variable.
//! Decryption itself happens outside this process; the loader only consumes
//! plaintext bytes.

use std::path::Path;
use std::str::FromStr;

use chrono_tz::Tz;
use serde::Deserialize;
use tracing::warn;

use crate::error::{AppError, Result};

/// Default configuration file when `CONFIG_PATH` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "secrets.yaml";

/// Root configuration structure.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub aws: AwsConfig,
    pub app: AppConfig,
}

/// AWS credentials and object-store settings.
#[derive(Debug, Deserialize, Clone)]
pub struct AwsConfig {
    #[serde(default = "default_region")]
    pub region: String,
    pub s3_bucket: String,
    #[serde(default)]
    pub access_key_id: Option<String>,
    #[serde(default)]
    pub secret_access_key: Option<String>,
}

/// Application-level settings.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// IANA zone used when rendering post timestamps.
    #[serde(default = "default_timezone")]
    pub display_timezone: String,

    /// When true, a diff that deletes the entire prior schedule while adding
    /// nothing is treated as a broken capture and suppressed.
    #[serde(default)]
    pub suppress_full_wipe: bool,

    /// Per-operation deadline for page capture, in seconds.
    #[serde(default = "default_capture_timeout")]
    pub capture_timeout_secs: u64,

    /// Per-operation deadline for blob store calls, in seconds.
    #[serde(default = "default_io_timeout")]
    pub blob_timeout_secs: u64,

    /// Per-operation deadline for publisher calls, in seconds.
    #[serde(default = "default_io_timeout")]
    pub publish_timeout_secs: u64,

    pub urls: Vec<UrlConfig>,
}

/// One monitored URL with its posting identity.
#[derive(Debug, Deserialize, Clone)]
pub struct UrlConfig {
    pub url: String,

    /// Label injected into the post text ("Latest <label> Schedule as of ...").
    #[serde(default)]
    pub label: Option<String>,

    pub twitter: TwitterConfig,
}

/// OAuth 1.0a credentials plus the display handle of the posting account.
#[derive(Debug, Deserialize, Clone)]
pub struct TwitterConfig {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
    pub user_handle: String,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_timezone() -> String {
    "America/New_York".to_string()
}

fn default_capture_timeout() -> u64 {
    45
}

fn default_io_timeout() -> u64 {
    30
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| AppError::config(format!("failed to read {}: {e}", path.display())))?;
        Self::from_slice(&bytes)
    }

    /// Parse configuration from already-loaded YAML bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let config: Config = serde_yaml::from_slice(bytes)
            .map_err(|e| AppError::config(format!("failed to parse config YAML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.aws.s3_bucket.trim().is_empty() {
            return Err(AppError::config("aws.s3_bucket must not be empty"));
        }
        if self.app.urls.is_empty() {
            return Err(AppError::config("app.urls must list at least one URL"));
        }
        for target in &self.app.urls {
            if target.url.trim().is_empty() {
                return Err(AppError::config("app.urls entries must carry a url"));
            }
        }
        Ok(())
    }

    /// Resolve the configured display timezone, falling back to UTC.
    pub fn display_timezone(&self) -> Tz {
        match Tz::from_str(&self.app.display_timezone) {
            Ok(tz) => tz,
            Err(_) => {
                warn!(
                    zone = %self.app.display_timezone,
                    "unknown display timezone, falling back to UTC"
                );
                Tz::UTC
            }
        }
    }
}

impl UrlConfig {
    /// Label used in the post text. The source pages are team sites, so a
    /// generic fallback keeps unconfigured entries readable.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or("Team")
    }
}

/// Resolve the config path from `CONFIG_PATH`, defaulting to `secrets.yaml`.
pub fn config_path_from_env() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}
