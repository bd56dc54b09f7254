//! `sift scrape <url>`: run the pipeline once and print the result.

use crate::config::ScrapeConfig;
use crate::pipeline::Scraper;
use anyhow::{Context, Result};

/// Run the scrape command.
pub async fn run(url: &str, compact: bool, no_render: bool) -> Result<()> {
    let config = ScrapeConfig::from_env();
    let renderer = super::build_renderer(&config, no_render);
    let scraper = Scraper::with_http(renderer, config);

    let result = scraper.scrape(url).await;

    let serialized = if compact {
        serde_json::to_string(&result)
    } else {
        serde_json::to_string_pretty(&result)
    };
    let json = serialized.context("failed to serialize scrape result")?;
    println!("{json}");

    Ok(())
}
