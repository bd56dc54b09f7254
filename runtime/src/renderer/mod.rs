//! Renderer abstraction for browser-based page rendering.
//!
//! Defines the `Renderer` and `RenderContext` traits that abstract over
//! the browser engine (currently Chromium via chromiumoxide), plus the
//! bounded scroll loop that drives a context to load lazy content.

pub mod chromium;
pub mod interaction;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use interaction::{render_dynamic, StopReason};

/// Result of navigating to a URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationResult {
    /// The final URL after any redirects.
    pub final_url: String,
    /// Time taken to load the page in milliseconds.
    pub load_time_ms: u64,
}

/// Failure of the dynamic rendering step.
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("browser launch failed: {0:#}")]
    Launch(anyhow::Error),

    #[error("navigation to {url} failed: {cause:#}")]
    Navigation { url: String, cause: anyhow::Error },

    #[error("timed out after {timeout_ms}ms waiting for content marker {selector:?}")]
    MarkerTimeout { selector: String, timeout_ms: u64 },

    #[error("browser automation failed: {0:#}")]
    Automation(#[from] anyhow::Error),
}

/// A browser engine that hands out isolated rendering sessions.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Open a new isolated session. The caller must `close()` it.
    async fn new_context(&self) -> Result<Box<dyn RenderContext>>;
}

/// A single browser session (one page) used for one scrape call.
#[async_trait]
pub trait RenderContext: Send + Sync {
    /// Navigate to a URL with a timeout.
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationResult>;
    /// Execute JavaScript in the page context and return the result.
    async fn execute_js(&self, script: &str) -> Result<serde_json::Value>;
    /// Get the full page HTML.
    async fn get_html(&self) -> Result<String>;
    /// Get the current URL.
    async fn get_url(&self) -> Result<String>;
    /// Tear the session down, including the browser process behind it.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// A renderer used when Chromium is unavailable.
///
/// Every session request fails, so the pipeline falls back to static
/// results and records a render error.
pub struct NoopRenderer;

#[async_trait]
impl Renderer for NoopRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        Err(anyhow::anyhow!("browser not available, static-only mode"))
    }
}
