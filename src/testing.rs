// src/testing.rs

//! In-memory fakes for exercising the pipeline without network access.
//!
//! The blob store, publisher, and capture fakes can share an [`EventLog`],
//! letting tests assert side-effect ordering across seams (the commit-last
//! property in particular).

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use crate::error::{AppError, Result};
use crate::services::capture::{CaptureArtifact, PageCapture};
use crate::services::publisher::Publisher;
use crate::storage::BlobStore;

/// Shared, ordered record of side effects across fakes.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<String>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, event: impl Into<String>) {
        self.events.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    /// Index of the first event starting with the given prefix.
    pub fn position_of(&self, prefix: &str) -> Option<usize> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .position(|e| e.starts_with(prefix))
    }
}

/// HashMap-backed blob store recording mutations to the shared log.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    log: EventLog,
}

impl MemoryBlobStore {
    pub fn new(log: EventLog) -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
            log,
        }
    }

    /// Seed an object without touching the event log.
    pub fn seed(&self, key: &str, bytes: Vec<u8>) {
        self.objects.lock().unwrap().insert(key.to_string(), bytes);
    }

    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        self.log.record(format!("put {key}"));
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.objects.lock().unwrap().get(key).cloned())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.objects.lock().unwrap().contains_key(key))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.log.record(format!("delete {key}"));
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Publisher fake with per-call failure switches.
#[derive(Debug, Default)]
pub struct FakePublisher {
    log: EventLog,
    pub handle: String,
    pub fail_verify: bool,
    pub fail_upload: bool,
    pub fail_post: bool,
    counter: AtomicUsize,
    posts: Mutex<Vec<(String, Vec<String>)>>,
}

impl FakePublisher {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            handle: "team12u".to_string(),
            ..Self::default()
        }
    }

    /// Posted `(text, media_ids)` pairs in order.
    pub fn posts(&self) -> Vec<(String, Vec<String>)> {
        self.posts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Publisher for FakePublisher {
    async fn verify_identity(&self) -> Result<String> {
        self.log.record("verify_identity");
        if self.fail_verify {
            return Err(AppError::credentials("fake rejection"));
        }
        Ok(self.handle.clone())
    }

    async fn upload_media(&self, png: &[u8]) -> Result<String> {
        self.log.record(format!("upload_media {} bytes", png.len()));
        if self.fail_upload {
            return Err(AppError::publish("fake upload failure"));
        }
        let id = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("media-{id}"))
    }

    async fn post(&self, text: &str, media_ids: &[String]) -> Result<String> {
        self.log.record("post");
        if self.fail_post {
            return Err(AppError::publish("fake post failure"));
        }
        self.posts
            .lock()
            .unwrap()
            .push((text.to_string(), media_ids.to_vec()));
        let id = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("post-{id}"))
    }

    async fn delete(&self, post_id: &str) -> Result<()> {
        self.log.record(format!("delete {post_id}"));
        Ok(())
    }
}

/// Capture fake returning canned HTML and PNG bytes.
#[derive(Debug, Default)]
pub struct FakeCapture {
    pub html: String,
    pub png: Vec<u8>,
    pub fail: bool,
}

impl FakeCapture {
    pub fn returning(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            png: vec![0x89, b'P', b'N', b'G'],
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl PageCapture for FakeCapture {
    async fn capture(&self, url: &str) -> Result<CaptureArtifact> {
        if self.fail {
            return Err(AppError::capture(url, "fake render failure"));
        }
        Ok(CaptureArtifact {
            html: self.html.clone(),
            png: self.png.clone(),
            captured_at: Utc::now(),
            source_url: url.to_string(),
        })
    }
}
