//! CLI subcommand implementations for the Sift binary.

pub mod doctor;
pub mod scrape_cmd;
pub mod serve_cmd;

use crate::config::ScrapeConfig;
use crate::renderer::chromium::ChromiumRenderer;
use crate::renderer::{NoopRenderer, Renderer};
use std::sync::Arc;
use tracing::{info, warn};

/// Pick the renderer for this process: Chromium when it can be found,
/// otherwise the no-op renderer (static-only results plus a render error).
pub fn build_renderer(config: &ScrapeConfig, no_render: bool) -> Arc<dyn Renderer> {
    if no_render {
        info!("dynamic rendering disabled");
        return Arc::new(NoopRenderer);
    }
    match ChromiumRenderer::new(config.render.clone()) {
        Ok(renderer) => {
            info!(max_sessions = config.render.max_sessions, "Chromium renderer initialized");
            Arc::new(renderer)
        }
        Err(e) => {
            warn!("Chromium unavailable ({e:#}), running static-only");
            Arc::new(NoopRenderer)
        }
    }
}
