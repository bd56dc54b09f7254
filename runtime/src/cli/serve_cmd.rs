//! `sift serve`: host the REST API.

use crate::config::ScrapeConfig;
use crate::pipeline::Scraper;
use crate::rest;
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

/// Start the HTTP server and block until it exits.
pub async fn run(host: &str, port: u16, no_render: bool) -> Result<()> {
    let config = ScrapeConfig::from_env();
    info!(
        fetch_timeout_ms = config.fetch_timeout_ms,
        render_timeout_ms = config.render.timeout_ms,
        content_marker = %config.render.content_marker,
        "starting Sift v{}",
        env!("CARGO_PKG_VERSION")
    );

    let renderer = super::build_renderer(&config, no_render);
    let scraper = Arc::new(Scraper::with_http(renderer, config));
    rest::start(host, port, scraper).await
}
