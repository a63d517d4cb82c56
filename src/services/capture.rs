// src/services/capture.rs

//! Rendered-page capture.
//!
//! The orchestrator consumes the [`PageCapture`] seam: render a URL and hand
//! back an HTML fragment scoped to the schedule region plus a PNG of the
//! same region. [`ChromeCapture`] drives a headless browser; tests use the
//! in-memory fake.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;

/// Immutable result of one page capture.
#[derive(Debug, Clone)]
pub struct CaptureArtifact {
    /// HTML fragment scoped to the schedule region
    pub html: String,
    /// PNG screenshot of the same region
    pub png: Vec<u8>,
    /// When the capture settled
    pub captured_at: DateTime<Utc>,
    /// The URL that was rendered
    pub source_url: String,
}

/// Render a URL into a stable snapshot of its schedule region.
///
/// Failures are retriable from the caller's perspective, but the core never
/// retries within one invocation; the next scheduled tick does.
#[async_trait]
pub trait PageCapture: Send + Sync {
    async fn capture(&self, url: &str) -> Result<CaptureArtifact>;
}

#[cfg(feature = "chrome")]
pub use chrome::ChromeCapture;

#[cfg(feature = "chrome")]
mod chrome {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::Utc;
    use headless_chrome::protocol::cdp::Page;
    use headless_chrome::{Browser, LaunchOptions, Tab};
    use tracing::{debug, warn};

    use super::{CaptureArtifact, PageCapture};
    use crate::error::{AppError, Result};

    /// Heading text that anchors the schedule region on the monitored pages.
    const DEFAULT_SENTINEL: &str = "Upcoming Schedule";

    /// Clip rectangle tuned against the current page layout. The region is
    /// anchored at the sentinel heading's document-relative Y.
    const CLIP_X: f64 = 150.0;
    const CLIP_WIDTH: f64 = 340.0;
    const CLIP_HEIGHT: f64 = 470.0;

    /// Fallback Y when the sentinel heading cannot be located.
    const FALLBACK_TOP: f64 = 200.0;

    const LOCATE_SCRIPT: &str = r#"
(function() {
    const walker = document.createTreeWalker(document.body, NodeFilter.SHOW_TEXT, null, false);
    let node;
    while ((node = walker.nextNode())) {
        const text = node.textContent.trim();
        if (text === '__SENTINEL__' || text.startsWith('__SENTINEL__')) {
            const rect = node.parentElement.getBoundingClientRect();
            const scrollY = window.pageYOffset || document.documentElement.scrollTop;
            return rect.top + scrollY;
        }
    }
    return null;
})()
"#;

    const EXTRACT_SCRIPT: &str = r#"
(function() {
    const clipTop = __TOP__;
    const clipBottom = clipTop + __HEIGHT__;
    const clipLeft = __LEFT__;
    const clipRight = clipLeft + __WIDTH__;
    const scrollY = window.pageYOffset || document.documentElement.scrollTop;
    const all = document.querySelectorAll('*');

    let heading = null;
    for (const el of all) {
        if (el.tagName === 'H5' && el.textContent.trim().includes('__SENTINEL__')) {
            heading = el;
            break;
        }
    }
    if (!heading) {
        for (const el of all) {
            const text = el.textContent.trim();
            if (text.startsWith('__SENTINEL__') && el.children.length === 0) {
                heading = el;
                break;
            }
        }
    }
    if (!heading) {
        return '';
    }
    const headingTop = heading.getBoundingClientRect().top + scrollY;

    const picked = [];
    for (const el of all) {
        const rect = el.getBoundingClientRect();
        const top = rect.top + scrollY;
        if (top <= headingTop) {
            continue;
        }
        const centerY = top + rect.height / 2;
        const centerX = rect.left + rect.width / 2;
        if (centerY < clipTop || centerY > clipBottom || centerX < clipLeft || centerX > clipRight) {
            continue;
        }
        const text = el.textContent.trim();
        if (text.length === 0 || text.length >= 500) {
            continue;
        }
        const lower = text.toLowerCase();
        const relevant = /\d+:\d+/.test(text) || /\d+\/\d+/.test(text) ||
            ['game', 'practice', 'vs', 'am', 'pm', 'tbd', 'field'].some(function(w) { return lower.includes(w); });
        if (relevant || el.children.length === 0) {
            picked.push(el);
        }
    }

    const leaves = picked.filter(function(el) {
        return !picked.some(function(other) { return other !== el && other.contains(el); });
    });
    const container = document.createElement('div');
    for (const el of leaves) {
        container.appendChild(el.cloneNode(true));
    }
    return container.innerHTML;
})()
"#;

    /// Headless-browser page capture anchored on a sentinel heading.
    #[derive(Debug, Clone)]
    pub struct ChromeCapture {
        sentinel: String,
        timeout: Duration,
        settle: Duration,
    }

    impl ChromeCapture {
        /// Create a capture client with the given per-page deadline.
        pub fn new(timeout: Duration) -> Self {
            Self {
                sentinel: DEFAULT_SENTINEL.to_string(),
                timeout,
                // The pages hydrate client-side; give dynamic content a
                // moment to settle before snapshotting.
                settle: Duration::from_secs(2),
            }
        }

        /// Override the sentinel heading text.
        pub fn with_sentinel(mut self, sentinel: impl Into<String>) -> Self {
            self.sentinel = sentinel.into();
            self
        }

        fn capture_blocking(&self, url: &str) -> Result<CaptureArtifact> {
            let options = LaunchOptions::default_builder()
                .headless(true)
                .sandbox(false)
                .window_size(Some((1200, 800)))
                .build()
                .map_err(|e| AppError::capture(url, e))?;

            let browser = Browser::new(options).map_err(|e| AppError::capture(url, e))?;
            let tab = browser.new_tab().map_err(|e| AppError::capture(url, e))?;
            tab.set_default_timeout(self.timeout);

            tab.navigate_to(url).map_err(|e| AppError::capture(url, e))?;
            tab.wait_until_navigated()
                .map_err(|e| AppError::capture(url, e))?;
            std::thread::sleep(self.settle);

            let top = match self.locate_sentinel_top(&tab) {
                Some(top) => top,
                None => {
                    warn!(url, sentinel = %self.sentinel, "sentinel heading not found, using fallback clip position");
                    FALLBACK_TOP
                }
            };

            let html = self.extract_fragment(&tab, top, url)?;
            let png = tab
                .capture_screenshot(
                    Page::CaptureScreenshotFormatOption::Png,
                    None,
                    Some(Page::Viewport {
                        x: CLIP_X,
                        y: top,
                        width: CLIP_WIDTH,
                        height: CLIP_HEIGHT,
                        scale: 1.0,
                    }),
                    true,
                )
                .map_err(|e| AppError::capture(url, e))?;

            debug!(url, fragment_bytes = html.len(), png_bytes = png.len(), "capture complete");

            Ok(CaptureArtifact {
                html,
                png,
                captured_at: Utc::now(),
                source_url: url.to_string(),
            })
        }

        fn locate_sentinel_top(&self, tab: &Arc<Tab>) -> Option<f64> {
            let script = LOCATE_SCRIPT.replace("__SENTINEL__", &self.sentinel);
            tab.evaluate(&script, false)
                .ok()
                .and_then(|result| result.value)
                .and_then(|value| value.as_f64())
        }

        fn extract_fragment(&self, tab: &Arc<Tab>, top: f64, url: &str) -> Result<String> {
            let script = EXTRACT_SCRIPT
                .replace("__SENTINEL__", &self.sentinel)
                .replace("__TOP__", &top.to_string())
                .replace("__HEIGHT__", &CLIP_HEIGHT.to_string())
                .replace("__LEFT__", &CLIP_X.to_string())
                .replace("__WIDTH__", &CLIP_WIDTH.to_string());

            let fragment = tab
                .evaluate(&script, false)
                .map_err(|e| AppError::capture(url, e))?
                .value
                .and_then(|value| value.as_str().map(str::to_string))
                .unwrap_or_default();

            if !fragment.is_empty() {
                return Ok(fragment);
            }

            // No scoped fragment: fall back to the full document and let the
            // extractor's region handling cope.
            warn!(url, "schedule fragment extraction returned nothing, falling back to full page HTML");
            tab.get_content().map_err(|e| AppError::capture(url, e))
        }
    }

    #[async_trait]
    impl PageCapture for ChromeCapture {
        async fn capture(&self, url: &str) -> Result<CaptureArtifact> {
            let capture = self.clone();
            let owned_url = url.to_string();
            let join_url = url.to_string();

            tokio::task::spawn_blocking(move || capture.capture_blocking(&owned_url))
                .await
                .map_err(|e| AppError::capture(join_url, e))?
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_scripts_inject_sentinel() {
            let capture = ChromeCapture::new(Duration::from_secs(45)).with_sentinel("Game Days");
            let script = LOCATE_SCRIPT.replace("__SENTINEL__", &capture.sentinel);
            assert!(script.contains("Game Days"));
            assert!(!script.contains("__SENTINEL__"));
        }

        #[test]
        fn test_extract_script_placeholders_resolve() {
            let script = EXTRACT_SCRIPT
                .replace("__SENTINEL__", DEFAULT_SENTINEL)
                .replace("__TOP__", "200")
                .replace("__HEIGHT__", &CLIP_HEIGHT.to_string())
                .replace("__LEFT__", &CLIP_X.to_string())
                .replace("__WIDTH__", &CLIP_WIDTH.to_string());
            assert!(!script.contains("__"));
        }
    }
}
