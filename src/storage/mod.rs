// src/storage/mod.rs

//! Blob-addressed storage.
//!
//! The blob store is the only durable memory the system has. Everything it
//! writes lives under the URL identifier prefix:
//!
//! ```text
//! <id>/previousSchedule.json                  # committed current state
//! <id>/archive/schedule-screenshot-<ts>.png   # append-only screenshots
//! <id>/archive/schedule-<ts>.json             # append-only snapshots
//! ```

pub mod local;
pub mod s3;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{deserialize_schedule, serialize_schedule, Schedule};

pub use local::LocalBlobStore;
pub use s3::S3BlobStore;

/// Blob-addressed byte storage.
///
/// Keys are opaque strings; `/` carries no semantics at this layer. `put`
/// must be atomic per key: readers see either the prior value or the new
/// one, never a partial write.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write bytes, overwriting any existing value.
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<()>;

    /// Read bytes. A missing key is `Ok(None)`, not an error.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Probe for existence.
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Delete a key. Idempotent on missing keys.
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Logical key-space shared by all backends.
pub mod paths {
    /// Filename of the committed current state, rewritten on each commit.
    pub const PREVIOUS_SCHEDULE_FILE: &str = "previousSchedule.json";

    pub fn object_key(identifier: &str, filename: &str) -> String {
        format!("{identifier}/{filename}")
    }

    pub fn previous_schedule_key(identifier: &str) -> String {
        object_key(identifier, PREVIOUS_SCHEDULE_FILE)
    }

    pub fn archive_key(identifier: &str, filename: &str) -> String {
        format!("{identifier}/archive/{filename}")
    }
}

/// Content type for a key, by extension.
pub fn content_type_for(key: &str) -> &'static str {
    match key.rsplit('.').next() {
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("html") => "text/html",
        _ => "application/octet-stream",
    }
}

/// Persist a schedule under `<identifier>/<filename>`.
pub async fn save_schedule(
    store: &dyn BlobStore,
    schedule: &Schedule,
    identifier: &str,
    filename: &str,
) -> Result<()> {
    let bytes = serialize_schedule(schedule)?;
    store.put(&paths::object_key(identifier, filename), &bytes).await
}

/// Load a schedule from `<identifier>/<filename>`.
///
/// A missing key is `Ok(None)` so callers can distinguish a first run from
/// an empty committed schedule.
pub async fn load_schedule(
    store: &dyn BlobStore,
    identifier: &str,
    filename: &str,
) -> Result<Option<Schedule>> {
    match store.get(&paths::object_key(identifier, filename)).await? {
        Some(bytes) => Ok(Some(deserialize_schedule(&bytes)?)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScheduleEntry;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_schedule_round_trip_through_store() {
        let tmp = TempDir::new().unwrap();
        let store = LocalBlobStore::new(tmp.path());

        let entry = ScheduleEntry {
            day_of_week: "TUESDAY".to_string(),
            day_of_month: "10/3".to_string(),
            location: "Warren".to_string(),
            time_block: "4:45-6:45".to_string(),
            purpose: "Practice".to_string(),
            parsed_time: None,
        };
        let mut schedule = Schedule::new();
        schedule.insert(entry.key(), entry);

        save_schedule(&store, &schedule, "team12u", paths::PREVIOUS_SCHEDULE_FILE)
            .await
            .unwrap();

        let loaded = load_schedule(&store, "team12u", paths::PREVIOUS_SCHEDULE_FILE)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded, schedule);
    }

    #[tokio::test]
    async fn test_load_schedule_missing_is_none() {
        let tmp = TempDir::new().unwrap();
        let store = LocalBlobStore::new(tmp.path());

        let loaded = load_schedule(&store, "team12u", paths::PREVIOUS_SCHEDULE_FILE)
            .await
            .unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_key_composition() {
        assert_eq!(
            paths::previous_schedule_key("team12u"),
            "team12u/previousSchedule.json"
        );
        assert_eq!(
            paths::archive_key("team12u", "schedule-2023-10-3-1696334400000.json"),
            "team12u/archive/schedule-2023-10-3-1696334400000.json"
        );
    }

    #[test]
    fn test_content_types() {
        assert_eq!(content_type_for("a/b.json"), "application/json");
        assert_eq!(content_type_for("a/b.png"), "image/png");
        assert_eq!(content_type_for("a/b.html"), "text/html");
        assert_eq!(content_type_for("a/b"), "application/octet-stream");
    }
}
