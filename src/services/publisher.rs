// src/services/publisher.rs

//! Social posting.
//!
//! The orchestrator only sees the [`Publisher`] trait: upload media first,
//! then post referencing the returned media id. [`TwitterPublisher`] is the
//! production implementation; tests use the in-memory fake.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::header::AUTHORIZATION;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use tracing::info;

use crate::config::TwitterConfig;
use crate::error::{AppError, Result};
use crate::services::oauth::OAuth1Signer;

const MEDIA_UPLOAD_URL: &str = "https://upload.twitter.com/1.1/media/upload.json";
const TWEET_CREATE_URL: &str = "https://api.twitter.com/2/tweets";
const VERIFY_CREDENTIALS_URL: &str =
    "https://api.twitter.com/1.1/account/verify_credentials.json";

/// Upload-then-post publishing seam.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Check the posting credentials; returns the account handle.
    async fn verify_identity(&self) -> Result<String>;

    /// Upload PNG bytes; returns the media id to reference from a post.
    async fn upload_media(&self, png: &[u8]) -> Result<String>;

    /// Publish a post referencing previously uploaded media; returns its id.
    async fn post(&self, text: &str, media_ids: &[String]) -> Result<String>;

    /// Delete a post by id. Used by test cleanup only; failures are logged,
    /// never fatal.
    async fn delete(&self, post_id: &str) -> Result<()>;
}

/// Publisher backed by the Twitter v1.1 media and v2 tweet APIs.
pub struct TwitterPublisher {
    signer: OAuth1Signer,
    http: reqwest::Client,
}

impl TwitterPublisher {
    /// Create a publisher for one posting identity.
    pub fn new(credentials: &TwitterConfig, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            signer: OAuth1Signer::new(
                &credentials.consumer_key,
                &credentials.consumer_secret,
                &credentials.access_token,
                &credentials.access_token_secret,
            ),
            http,
        })
    }

    async fn failure(context: &str, response: Response) -> AppError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = format!("{context} failed with status {status}: {body}");
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            AppError::credentials(message)
        } else {
            AppError::publish(message)
        }
    }
}

#[async_trait]
impl Publisher for TwitterPublisher {
    async fn verify_identity(&self) -> Result<String> {
        #[derive(Deserialize)]
        struct User {
            screen_name: String,
        }

        let auth = self
            .signer
            .authorization_header("GET", VERIFY_CREDENTIALS_URL, &[])?;
        let response = self
            .http
            .get(VERIFY_CREDENTIALS_URL)
            .header(AUTHORIZATION, auth)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::failure("credential verification", response).await);
        }

        let user: User = response.json().await?;
        Ok(user.screen_name)
    }

    async fn upload_media(&self, png: &[u8]) -> Result<String> {
        #[derive(Deserialize)]
        struct MediaResponse {
            media_id_string: String,
        }

        // The v1.1 upload endpoint takes base64 bytes as a form field, and
        // form fields participate in the OAuth signature.
        let form = vec![("media_data".to_string(), BASE64.encode(png))];
        let auth = self
            .signer
            .authorization_header("POST", MEDIA_UPLOAD_URL, &form)?;

        let response = self
            .http
            .post(MEDIA_UPLOAD_URL)
            .header(AUTHORIZATION, auth)
            .form(&form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::failure("media upload", response).await);
        }

        let media: MediaResponse = response.json().await?;
        Ok(media.media_id_string)
    }

    async fn post(&self, text: &str, media_ids: &[String]) -> Result<String> {
        #[derive(Deserialize)]
        struct TweetData {
            id: String,
        }
        #[derive(Deserialize)]
        struct TweetResponse {
            data: TweetData,
        }

        let mut body = serde_json::json!({ "text": text });
        if !media_ids.is_empty() {
            body["media"] = serde_json::json!({ "media_ids": media_ids });
        }

        // JSON bodies are not form parameters; only the oauth_* set is signed.
        let auth = self
            .signer
            .authorization_header("POST", TWEET_CREATE_URL, &[])?;

        let response = self
            .http
            .post(TWEET_CREATE_URL)
            .header(AUTHORIZATION, auth)
            .json(&body)
            .send()
            .await?;

        if response.status() != StatusCode::CREATED {
            return Err(Self::failure("post creation", response).await);
        }

        let tweet: TweetResponse = response.json().await?;
        info!(post_id = %tweet.data.id, "posted schedule update");
        Ok(tweet.data.id)
    }

    async fn delete(&self, post_id: &str) -> Result<()> {
        let url = format!("https://api.twitter.com/1.1/statuses/destroy/{post_id}.json");
        let auth = self.signer.authorization_header("POST", &url, &[])?;

        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, auth)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::failure("post deletion", response).await);
        }
        Ok(())
    }
}
