// src/main.rs

//! Schedule-change notification CLI.
//!
//! Runs one check over every configured URL and exits; scheduling is the
//! hosting environment's job (cron, EventBridge, a shell loop).

use std::process::ExitCode;
use std::time::Duration;

use chrono::Utc;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use schedule_notify::config::{config_path_from_env, Config};
use schedule_notify::pipeline::{process_url, ProcessOptions, RunMode, WipeGuard};
use schedule_notify::services::TwitterPublisher;
use schedule_notify::storage::{BlobStore, S3BlobStore};

#[derive(Parser, Debug)]
#[command(
    name = "schedule-notify",
    version,
    about = "Monitors schedule pages and posts screenshot notifications on change"
)]
struct Cli {
    /// Write artifacts to dry-run-output/ instead of the blob store; post nothing
    #[arg(long)]
    dry_run: bool,

    /// Archive to the blob store but skip posting (takes precedence over --dry-run)
    #[arg(long = "no-tweet")]
    no_tweet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mode = RunMode::from_flags(cli.dry_run, cli.no_tweet);

    let config_path = config_path_from_env();
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!(path = %config_path, "failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let store = match S3BlobStore::from_config(
        &config.aws,
        Duration::from_secs(config.app.blob_timeout_secs),
    )
    .await
    {
        Ok(store) => store,
        Err(e) => {
            error!("failed to create blob store client: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Pre-flight: a reachability/credentials probe before any URL runs.
    if let Err(e) = store.exists("__credential_test__").await {
        error!("blob store pre-flight probe failed: {e}");
        return ExitCode::FAILURE;
    }
    info!(
        mode = mode.as_str(),
        urls = config.app.urls.len(),
        "blob store access verified"
    );

    #[cfg(feature = "chrome")]
    {
        let capture = schedule_notify::services::ChromeCapture::new(Duration::from_secs(
            config.app.capture_timeout_secs,
        ));
        run_all(&config, &store, &capture, mode).await
    }

    #[cfg(not(feature = "chrome"))]
    {
        let _ = (&config, &store, mode);
        error!("this binary was built without the `chrome` feature; page capture is unavailable");
        ExitCode::FAILURE
    }
}

#[cfg(feature = "chrome")]
async fn run_all(
    config: &Config,
    store: &S3BlobStore,
    capture: &schedule_notify::services::ChromeCapture,
    mode: RunMode,
) -> ExitCode {
    let timezone = config.display_timezone();
    let timestamp = Utc::now().with_timezone(&timezone);
    info!(
        timestamp = %timestamp,
        "starting schedule check"
    );

    let mut opts = ProcessOptions::new(mode, timestamp);
    opts.guard = WipeGuard::new(config.app.suppress_full_wipe);

    for target in &config.app.urls {
        let publisher = match TwitterPublisher::new(
            &target.twitter,
            Duration::from_secs(config.app.publish_timeout_secs),
        ) {
            Ok(publisher) => publisher,
            Err(e) => {
                error!(url = %target.url, "failed to build publisher client: {e}");
                continue;
            }
        };

        match process_url(target, store, capture, &publisher, &opts).await {
            Ok(outcome) if outcome.changes_found => {
                info!(
                    url = %outcome.url,
                    summary = %outcome.summary,
                    post_id = outcome.post_id.as_deref().unwrap_or("-"),
                    suppressed = outcome.suppressed,
                    "URL processed"
                );
            }
            Ok(outcome) => {
                info!(url = %outcome.url, "URL processed, no changes");
            }
            Err(e) => {
                // Per-URL failures never abort the invocation.
                error!(
                    url = %target.url,
                    retriable = e.retriable(),
                    "failed to process URL: {e}"
                );
            }
        }
    }

    info!("schedule check completed");
    ExitCode::SUCCESS
}
