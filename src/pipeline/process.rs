// src/pipeline/process.rs

//! Per-URL orchestration.
//!
//! One invocation runs each configured URL through a flat state machine:
//! verify identity, capture, extract, load the committed prior schedule,
//! diff, and (only when something changed) archive, publish, and commit.
//!
//! `previousSchedule.json` is written LAST. A crash after archiving but
//! before the commit means the next tick re-detects the same diff and
//! republishes: notifications are at-least-once, never silently lost.

use std::path::PathBuf;

use chrono::DateTime;
use chrono_tz::Tz;
use tracing::{info, warn};

use crate::config::UrlConfig;
use crate::error::Result;
use crate::models::serialize_schedule;
use crate::pipeline::diff::{compare_schedules, ScheduleDiff};
use crate::pipeline::extract::extract_schedule;
use crate::pipeline::guard::WipeGuard;
use crate::pipeline::mode::RunMode;
use crate::services::capture::PageCapture;
use crate::services::publisher::Publisher;
use crate::storage::{load_schedule, paths, BlobStore, LocalBlobStore};
use crate::utils::{format_display_timestamp, timestamped_filename, url_identifier};

/// Default redirect directory for dry runs.
pub const DRY_RUN_ROOT: &str = "dry-run-output";

/// Invocation-level options shared by every URL in a run.
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    pub mode: RunMode,
    /// Zoned invocation timestamp; names archive files and renders in the
    /// post text.
    pub timestamp: DateTime<Tz>,
    /// Appends `-test` to the URL identifier, isolating test state.
    pub is_test: bool,
    pub guard: WipeGuard,
    /// Root directory for dry-run artifacts.
    pub dry_run_root: PathBuf,
}

impl ProcessOptions {
    pub fn new(mode: RunMode, timestamp: DateTime<Tz>) -> Self {
        Self {
            mode,
            timestamp,
            is_test: false,
            guard: WipeGuard::default(),
            dry_run_root: PathBuf::from(DRY_RUN_ROOT),
        }
    }
}

/// What happened to one URL in one invocation.
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    pub url: String,
    pub user_handle: String,
    pub url_identifier: String,
    pub changes_found: bool,
    /// Set when the suspicious-diff guard suppressed the run.
    pub suppressed: bool,
    pub post_id: Option<String>,
    pub summary: String,
}

/// Compose the post text.
pub fn compose_message(label: &str, at: &DateTime<Tz>, url: &str) -> String {
    format!(
        "Latest {} Schedule as of {}. {}",
        label,
        format_display_timestamp(at),
        url
    )
}

/// Run the full state machine for one URL.
///
/// Component failures bubble up; the caller logs them with URL context and
/// moves on to the next target. Nothing is retried within one invocation.
pub async fn process_url(
    target: &UrlConfig,
    store: &dyn BlobStore,
    capture: &dyn PageCapture,
    publisher: &dyn Publisher,
    opts: &ProcessOptions,
) -> Result<ProcessOutcome> {
    info!(url = %target.url, mode = opts.mode.as_str(), "processing URL");

    // Fail fast on dead credentials before spending a browser render.
    if opts.mode.publishes() {
        let handle = publisher.verify_identity().await?;
        info!(handle = %handle, url = %target.url, "posting identity verified");
    } else {
        info!(
            mode = opts.mode.as_str(),
            "skipping identity verification in this mode"
        );
    }

    let artifact = capture.capture(&target.url).await?;
    let current = extract_schedule(&artifact.html);
    if current.is_empty() {
        // Not an error: an empty extraction flows through the diff, where it
        // shows up as deletions against the prior schedule.
        warn!(url = %target.url, "extraction produced an empty schedule");
    }

    let identifier = url_identifier(&target.url, opts.is_test);
    let prior = load_schedule(store, &identifier, paths::PREVIOUS_SCHEDULE_FILE).await?;
    if prior.is_none() {
        info!(identifier = %identifier, "no previous schedule found (first run)");
    }
    let prior = prior.unwrap_or_default();

    let diff = compare_schedules(Some(&prior), &current);

    let mut outcome = ProcessOutcome {
        url: target.url.clone(),
        user_handle: target.twitter.user_handle.clone(),
        url_identifier: identifier.clone(),
        changes_found: diff.has_changes(),
        suppressed: false,
        post_id: None,
        summary: diff.summary(),
    };

    if !diff.has_changes() {
        info!(url = %target.url, "no schedule changes detected");
        return Ok(outcome);
    }

    info!(url = %target.url, summary = %outcome.summary, "schedule changes detected");

    if !opts.guard.allows(&prior, &diff) {
        outcome.suppressed = true;
        return Ok(outcome);
    }

    let serialized = serialize_schedule(&current)?;
    let screenshot_name = timestamped_filename("schedule-screenshot", "png", &opts.timestamp);
    let snapshot_name = timestamped_filename("schedule", "json", &opts.timestamp);

    if opts.mode == RunMode::LocalDryRun {
        write_dry_run_artifacts(
            target,
            &identifier,
            &artifact.png,
            &serialized,
            &diff,
            opts,
        )
        .await?;
        info!(
            url = %target.url,
            dir = %opts.dry_run_root.join(&identifier).display(),
            "dry run complete; blob store and publisher untouched"
        );
        return Ok(outcome);
    }

    // Archive before posting so the posted screenshot stays reproducible
    // even when the post itself fails.
    store
        .put(&paths::archive_key(&identifier, &screenshot_name), &artifact.png)
        .await?;
    store
        .put(&paths::archive_key(&identifier, &snapshot_name), &serialized)
        .await?;

    if opts.mode.publishes() {
        let media_id = publisher.upload_media(&artifact.png).await?;
        let text = compose_message(target.display_label(), &opts.timestamp, &target.url);
        let post_id = publisher.post(&text, &[media_id]).await?;
        outcome.post_id = Some(post_id);
    }

    // Commit point: from here on the change counts as seen.
    store
        .put(&paths::previous_schedule_key(&identifier), &serialized)
        .await?;

    info!(
        url = %target.url,
        summary = %outcome.summary,
        post_id = outcome.post_id.as_deref().unwrap_or("-"),
        "schedule update committed"
    );
    Ok(outcome)
}

/// Redirect would-be blob writes to `dry-run-output/<identifier>/`, plus a
/// browsable preview of the post that would have gone out.
async fn write_dry_run_artifacts(
    target: &UrlConfig,
    identifier: &str,
    png: &[u8],
    serialized_schedule: &[u8],
    diff: &ScheduleDiff,
    opts: &ProcessOptions,
) -> Result<()> {
    let local = LocalBlobStore::new(&opts.dry_run_root);

    let screenshot_name = timestamped_filename("schedule-screenshot", "png", &opts.timestamp);
    let snapshot_name = timestamped_filename("schedule", "json", &opts.timestamp);
    let preview_name = timestamped_filename("tweet-preview", "html", &opts.timestamp);

    local
        .put(&paths::object_key(identifier, &screenshot_name), png)
        .await?;
    local
        .put(&paths::object_key(identifier, &snapshot_name), serialized_schedule)
        .await?;

    let preview = render_post_preview(target, &screenshot_name, diff, opts);
    local
        .put(&paths::object_key(identifier, &preview_name), preview.as_bytes())
        .await?;

    Ok(())
}

fn render_post_preview(
    target: &UrlConfig,
    screenshot_name: &str,
    diff: &ScheduleDiff,
    opts: &ProcessOptions,
) -> String {
    let timestamp = format_display_timestamp(&opts.timestamp);
    let text = compose_message(target.display_label(), &opts.timestamp, &target.url);

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Post Preview - {handle}</title>
    <style>
        body {{ font-family: -apple-system, "Segoe UI", Roboto, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px; }}
        .post {{ border: 1px solid #e1e8ed; border-radius: 16px; padding: 20px; }}
        .post-text {{ font-size: 20px; line-height: 1.3; margin-bottom: 12px; }}
        .post-image {{ max-width: 100%; border-radius: 12px; }}
        .post-meta {{ color: #657786; font-size: 14px; margin-top: 12px; }}
    </style>
</head>
<body>
    <h1>Dry Run: Post Preview</h1>
    <div class="post">
        <div class="post-text">{text}</div>
        <img src="{screenshot_name}" alt="Schedule screenshot" class="post-image" />
        <div class="post-meta">{timestamp} &middot; would be posted as <strong>@{handle}</strong></div>
    </div>
    <p><em>This post was NOT sent; dry-run mode is enabled.</em></p>
    <h2>Schedule changes detected</h2>
    <ul>
        <li><strong>Added:</strong> {added} entries</li>
        <li><strong>Modified:</strong> {modified} entries</li>
        <li><strong>Deleted:</strong> {deleted} entries</li>
    </ul>
</body>
</html>
"#,
        handle = target.twitter.user_handle,
        text = text,
        screenshot_name = screenshot_name,
        timestamp = timestamp,
        added = diff.added.len(),
        modified = diff.modified.len(),
        deleted = diff.deleted.len(),
    )
}
