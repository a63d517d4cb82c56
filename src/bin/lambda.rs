//! AWS Lambda entry point for the schedule-change notifier.
//!
//! Deploy with `cargo lambda build --release --features lambda`. The
//! EventBridge schedule invokes this once per tick; each invocation runs the
//! same per-URL pipeline as the CLI in normal mode.

use std::time::Duration;

use chrono::Utc;
use lambda_runtime::{service_fn, Error as LambdaError, LambdaEvent};
use serde_json::Value;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use schedule_notify::config::{config_path_from_env, Config};
use schedule_notify::pipeline::{process_url, ProcessOptions, RunMode, WipeGuard};
use schedule_notify::services::{ChromeCapture, TwitterPublisher};
use schedule_notify::storage::{BlobStore, S3BlobStore};
use schedule_notify::Result;

#[tokio::main]
async fn main() -> std::result::Result<(), LambdaError> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("schedule-notify Lambda starting");
    lambda_runtime::run(service_fn(handler)).await
}

/// Handler for scheduled events.
async fn handler(event: LambdaEvent<Value>) -> std::result::Result<Value, LambdaError> {
    info!("received event: {:?}", event.payload);

    match run_check().await {
        Ok(processed) => {
            info!(processed, "Lambda execution successful");
            Ok(serde_json::json!({
                "status": "success",
                "urls_processed": processed
            }))
        }
        Err(e) => {
            error!("Lambda execution failed: {e}");
            Ok(serde_json::json!({
                "status": "error",
                "message": e.to_string()
            }))
        }
    }
}

async fn run_check() -> Result<usize> {
    // The container image mounts the decrypted config at /opt/secrets.yaml
    // and points CONFIG_PATH there.
    let config = Config::load(config_path_from_env())?;

    let store = S3BlobStore::from_config(
        &config.aws,
        Duration::from_secs(config.app.blob_timeout_secs),
    )
    .await?;
    store.exists("__credential_test__").await?;

    let capture = ChromeCapture::new(Duration::from_secs(config.app.capture_timeout_secs));
    let timestamp = Utc::now().with_timezone(&config.display_timezone());

    let mut opts = ProcessOptions::new(RunMode::Normal, timestamp);
    opts.guard = WipeGuard::new(config.app.suppress_full_wipe);

    let mut processed = 0;
    for target in &config.app.urls {
        let publisher = TwitterPublisher::new(
            &target.twitter,
            Duration::from_secs(config.app.publish_timeout_secs),
        )?;

        match process_url(target, &store, &capture, &publisher, &opts).await {
            Ok(outcome) => {
                info!(
                    url = %outcome.url,
                    summary = %outcome.summary,
                    post_id = outcome.post_id.as_deref().unwrap_or("-"),
                    "URL processed"
                );
                processed += 1;
            }
            Err(e) => {
                error!(url = %target.url, retriable = e.retriable(), "failed to process URL: {e}");
            }
        }
    }

    Ok(processed)
}
