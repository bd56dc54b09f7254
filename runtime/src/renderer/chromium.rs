//! Chromium-based renderer using chromiumoxide.
//!
//! Each session launches its own headless browser with a throwaway profile,
//! so concurrent scrape calls never share cookies, storage or tabs. A
//! semaphore caps how many of these browsers run at once.

use super::{NavigationResult, RenderContext, Renderer};
use crate::config::RenderConfig;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::{EventDomContentEventFired, NavigateParams};
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;

/// Find the Chromium binary path.
pub fn find_chromium() -> Option<PathBuf> {
    // 1. SIFT_CHROMIUM_PATH env
    if let Ok(p) = std::env::var("SIFT_CHROMIUM_PATH") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. ~/.sift/chromium/
    if let Some(home) = dirs::home_dir() {
        let candidates = if cfg!(target_os = "macos") {
            vec![
                home.join(".sift/chromium/chrome-mac-arm64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".sift/chromium/chrome-mac-x64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".sift/chromium/chrome"),
            ]
        } else {
            vec![
                home.join(".sift/chromium/chrome-linux64/chrome"),
                home.join(".sift/chromium/chrome"),
            ]
        };
        if let Some(c) = candidates.into_iter().find(|c| c.exists()) {
            return Some(c);
        }
    }

    // 3. System PATH
    for name in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    // 4. Common macOS location
    if cfg!(target_os = "macos") {
        let common =
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// Chromium-based renderer. Launches one browser per session.
pub struct ChromiumRenderer {
    chrome_path: PathBuf,
    config: RenderConfig,
    sessions: Arc<Semaphore>,
    active_count: Arc<AtomicUsize>,
}

impl ChromiumRenderer {
    /// Locate Chromium and build a renderer around it.
    pub fn new(config: RenderConfig) -> Result<Self> {
        let chrome_path = find_chromium()
            .context("Chromium not found. Set SIFT_CHROMIUM_PATH or install Chrome.")?;
        Ok(Self::with_executable(chrome_path, config))
    }

    pub fn with_executable(chrome_path: PathBuf, config: RenderConfig) -> Self {
        let permits = config.max_sessions.max(1);
        Self {
            chrome_path,
            config,
            sessions: Arc::new(Semaphore::new(permits)),
            active_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of sessions currently open.
    pub fn active_contexts(&self) -> usize {
        self.active_count.load(Ordering::Relaxed)
    }

    fn browser_config(&self, profile_dir: &Path) -> Result<BrowserConfig> {
        let cfg = &self.config;
        BrowserConfig::builder()
            .chrome_executable(&self.chrome_path)
            .user_data_dir(profile_dir)
            .window_size(cfg.viewport_width, cfg.viewport_height)
            .viewport(Viewport {
                width: cfg.viewport_width,
                height: cfg.viewport_height,
                ..Default::default()
            })
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-blink-features=AutomationControlled")
            .arg(format!("--user-agent={}", cfg.user_agent))
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        let permit = Arc::clone(&self.sessions)
            .acquire_owned()
            .await
            .context("browser session pool closed")?;

        let profile_dir =
            std::env::temp_dir().join(format!("sift-profile-{}", uuid::Uuid::new_v4()));
        // From here on every exit path, including cancellation, cleans up.
        let mut guard = SessionGuard::open(profile_dir, Arc::clone(&self.active_count), permit);
        let config = self.browser_config(&guard.profile_dir)?;

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch Chromium")?;

        // Spawn the handler task
        guard.handler_task = Some(tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        }));

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let _ = browser.close().await;
                let _ = browser.wait().await;
                bail!("failed to create new page: {e}");
            }
        };

        tracing::debug!(active = self.active_contexts(), "browser session opened");

        Ok(Box::new(ChromiumContext {
            browser,
            page,
            guard,
        }))
    }
}

/// Process-local resources of one session: the active-session count, the
/// CDP handler task, the profile directory and the session permit.
///
/// Released on drop, so a session whose owner is cancelled mid-render
/// still gives everything back.
struct SessionGuard {
    handler_task: Option<JoinHandle<()>>,
    profile_dir: PathBuf,
    active_count: Arc<AtomicUsize>,
    _permit: OwnedSemaphorePermit,
}

impl SessionGuard {
    fn open(
        profile_dir: PathBuf,
        active_count: Arc<AtomicUsize>,
        permit: OwnedSemaphorePermit,
    ) -> Self {
        active_count.fetch_add(1, Ordering::Relaxed);
        Self {
            handler_task: None,
            profile_dir,
            active_count,
            _permit: permit,
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.active_count.fetch_sub(1, Ordering::Relaxed);
        if let Some(task) = self.handler_task.take() {
            task.abort();
        }
        match std::fs::remove_dir_all(&self.profile_dir) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                dir = %self.profile_dir.display(),
                error = %e,
                "failed to remove browser profile"
            ),
        }
    }
}

/// One browser process with a single page.
///
/// `close()` shuts the browser down gracefully. Dropping the context
/// without closing it kills the browser process and releases the guard.
pub struct ChromiumContext {
    // Dropped first: the browser is told to exit before the guard removes
    // its profile directory.
    browser: Browser,
    page: Page,
    guard: SessionGuard,
}

#[async_trait]
impl RenderContext for ChromiumContext {
    /// Navigate and wait for DOMContentLoaded, not the full `load` event,
    /// so slow subresources do not hold the render.
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationResult> {
        let start = Instant::now();

        // Subscribe before navigating so the event cannot be missed.
        let mut dom_ready = self
            .page
            .event_listener::<EventDomContentEventFired>()
            .await
            .context("failed to subscribe to DOMContentLoaded")?;

        let page = &self.page;
        let load = async {
            let resp = page
                .execute(NavigateParams::new(url))
                .await
                .context("navigation request failed")?;
            if let Some(err) = resp.result.error_text.as_deref() {
                bail!("navigation failed: {err}");
            }
            dom_ready
                .next()
                .await
                .context("page closed before DOMContentLoaded")?;
            Ok(())
        };

        match tokio::time::timeout(Duration::from_millis(timeout_ms), load).await {
            Ok(Ok(())) => {
                let final_url = self
                    .page
                    .url()
                    .await
                    .unwrap_or_default()
                    .unwrap_or_else(|| url.to_string());

                Ok(NavigationResult {
                    final_url,
                    load_time_ms: start.elapsed().as_millis() as u64,
                })
            }
            Ok(Err(e)) => Err(e),
            Err(_) => {
                bail!("navigation timed out after {timeout_ms}ms waiting for DOMContentLoaded")
            }
        }
    }

    async fn execute_js(&self, script: &str) -> Result<serde_json::Value> {
        let result = self
            .page
            .evaluate(script)
            .await
            .context("JS execution failed")?;

        result
            .into_value()
            .map_err(|e| anyhow::anyhow!("failed to convert JS result: {e:?}"))
    }

    async fn get_html(&self) -> Result<String> {
        self.page.content().await.context("failed to get HTML")
    }

    async fn get_url(&self) -> Result<String> {
        let url = self
            .page
            .url()
            .await
            .context("failed to get URL")?
            .map(|u| u.to_string())
            .unwrap_or_default();
        Ok(url)
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let ChromiumContext {
            mut browser,
            page,
            guard,
        } = *self;

        let _ = page.close().await;
        let closed = browser.close().await;
        let _ = browser.wait().await;
        drop(guard);

        closed.context("failed to close browser")?;
        Ok(())
    }
}
